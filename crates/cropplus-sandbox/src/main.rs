//! Headless host for the CropPlus harvest engine.
//!
//! The sandbox stands in for a game server: it loads `cropplus-config.yaml`,
//! starts the cooldown sweeper, wires a [`HarvestService`] to an in-memory
//! farm, replays a scripted session, and shuts everything down again.
//!
//! # Usage
//!
//! ```text
//! cropplus-sandbox [path/to/cropplus-config.yaml]
//! ```
//!
//! The config path falls back to `CROPPLUS_CONFIG`, then to
//! `cropplus-config.yaml` in the working directory. `RUST_LOG` overrides the
//! configured `settings.log-level`.

mod error;
mod memory;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use cropplus_core::{CooldownSweeper, HarvestService, SweepSettings, YamlConfigView};
use cropplus_harvest::{ConfigurationView, CooldownStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::SandboxError;
use crate::session::Session;

/// World the scripted session plays in.
const SANDBOX_WORLD: &str = "world";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the harvest
/// engine reports an integration fault.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    let config = Arc::new(YamlConfigView::from_file(&path).map_err(SandboxError::from)?);

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.get_string("settings.log-level", "info"))
        }))
        .with_target(true)
        .init();

    info!(path = %path.display(), "cropplus-sandbox starting");

    let view: Arc<dyn ConfigurationView> = config;
    let cooldowns = Arc::new(CooldownStore::monotonic());
    let settings = SweepSettings::from_view(view.as_ref());
    let sweeper = CooldownSweeper::spawn(Arc::clone(&cooldowns), settings);

    let service = HarvestService::new(Arc::clone(&view), cooldowns);
    let summary = Session::new(service.clone(), view, SANDBOX_WORLD)
        .run()
        .await?;
    info!(
        steps = summary.steps,
        harvested = summary.harvested,
        denied = summary.denied,
        earned = %summary.earned,
        messages = summary.messages,
        "Scripted session complete"
    );

    sweeper.stop().await;
    service.shutdown();
    Ok(())
}

/// Resolve the configuration path from the first argument, then the
/// environment, then the default file name.
fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CROPPLUS_CONFIG").ok())
        .map_or_else(|| PathBuf::from("cropplus-config.yaml"), PathBuf::from)
}
