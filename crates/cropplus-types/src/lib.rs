//! Shared value types for the CropPlus harvest engine.
//!
//! Every type here is a plain value constructed per call by the host or by
//! the harvest engine. Nothing in this crate owns long-lived state.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for player identities
//! - [`enums`] -- Crop catalogue, hoe materials, capabilities, cooldown kinds
//! - [`structs`] -- Positions, items, player context, crop sites, notifications
//! - [`decision`] -- Harvest decisions, mass-harvest plans, reward results

pub mod decision;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use decision::{HarvestDecision, HarvestMultipliers, MassHarvestPlan, RewardResult};
pub use enums::{
    Capability, CooldownKind, CropKind, DisabledReason, DropLocation, HarvestOutcome,
    HoeMaterial,
};
pub use ids::PlayerId;
pub use structs::{
    BlockPos, CooldownSubject, CropSite, ItemId, ItemStack, Notification, PlayerContext,
    message_keys,
};
