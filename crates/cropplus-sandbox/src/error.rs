//! Error types for the sandbox host.

use cropplus_core::ConfigError;
use cropplus_harvest::HarvestError;

/// Errors that can end a sandbox run.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The harvest engine reported an integration fault.
    #[error("harvest error: {0}")]
    Harvest(#[from] HarvestError),

    /// A decision could not be serialized for the audit log.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
