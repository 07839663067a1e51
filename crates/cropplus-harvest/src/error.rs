//! Error types for the `cropplus-harvest` crate.
//!
//! Policy outcomes (permission, tool, world, cooldown, seeds, disabled) are
//! never errors; they are [`HarvestDecision`] variants. A [`HarvestError`]
//! means the host or its configuration handed the engine something it
//! cannot reason about.
//!
//! [`HarvestDecision`]: cropplus_types::HarvestDecision

/// Integration faults raised at the engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// A numeric policy value is NaN or infinite.
    #[error("malformed policy value at `{key}`: {value}")]
    MalformedPolicy {
        /// Dotted configuration path.
        key: String,
        /// The offending value, as read.
        value: String,
    },

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow in harvest calculation: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: String,
    },
}
