//! Host-facing integration layer for the CropPlus harvest engine.
//!
//! This crate wires the pure decision engine in `cropplus-harvest` to a
//! host: it loads the YAML configuration, defines the ports a host
//! implements (world, inventory, economy, messages), applies allowed
//! harvests through them, and runs the background cooldown sweeper.
//!
//! # Modules
//!
//! - [`config`] -- [`YamlConfigView`]: reloadable YAML-backed
//!   [`ConfigurationView`](cropplus_harvest::ConfigurationView).
//! - [`executor`] -- [`HarvestExecutor`]: drops, delivery, replanting,
//!   and reward payout for one allowed site.
//! - [`messages`] -- template rendering for [`Notification`]s.
//! - [`ports`] -- collaborator traits implemented by the host.
//! - [`service`] -- [`HarvestService`]: the process-lifetime facade.
//! - [`sweeper`] -- [`CooldownSweeper`]: periodic expiry of stale
//!   cooldown entries on a tokio task.
//!
//! [`Notification`]: cropplus_types::Notification

pub mod config;
pub mod executor;
pub mod messages;
pub mod ports;
pub mod service;
pub mod sweeper;

// Re-export primary types at crate root.
pub use config::{ConfigError, YamlConfigView};
pub use executor::{HarvestExecutor, SiteHarvest, apply_drop_multiplier};
pub use ports::{BlockInspector, EconomyError, EconomyPort, HostPorts, InventoryPort, MessagePort};
pub use service::{BONE_MEAL, HarvestMode, HarvestReport, HarvestService, InteractionOutcome};
pub use sweeper::{CooldownSweeper, SweepSettings};
