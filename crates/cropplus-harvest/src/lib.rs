//! Harvest decision and policy-resolution engine for CropPlus.
//!
//! This crate decides whether a player may harvest a crop, which multipliers
//! apply, how a mass harvest is planned, and what the harvest pays. It never
//! touches world or inventory state: the host supplies nodes and inventory
//! lookups and applies the returned decisions itself.
//!
//! # Modules
//!
//! - [`cooldown`] -- [`CooldownStore`]: TTL state for the global, location,
//!   and mass cooldown spaces, with an injectable [`Clock`].
//! - [`eligibility`] -- [`HarvestEligibilityEngine`]: the ordered check
//!   pipeline producing one [`HarvestDecision`] per request, plus the
//!   once-per-click mass-harvest gate.
//! - [`error`] -- [`HarvestError`] for integration faults (never for policy
//!   outcomes).
//! - [`planner`] -- [`AreaHarvestPlanner`]: bounded cuboid scan and cap.
//! - [`policy`] -- [`HarvestPolicy`]: global, world, and group configuration
//!   resolved with precedence on every call.
//! - [`reward`] -- [`RewardCalculator`]: base rate, tool multiplier, and
//!   mass bonus composed into a [`RewardResult`].
//! - [`tools`] -- [`ToolPolicyResolver`]: hoe classification, tiers, and
//!   allow-list matching.
//! - [`view`] -- [`ConfigurationView`] trait and the in-memory
//!   [`StaticConfigView`].
//!
//! [`HarvestDecision`]: cropplus_types::HarvestDecision
//! [`RewardResult`]: cropplus_types::RewardResult

pub mod cooldown;
pub mod eligibility;
pub mod error;
pub mod planner;
pub mod policy;
pub mod reward;
pub mod tools;
pub mod view;

// Re-export primary types at crate root.
pub use cooldown::{Clock, CooldownStore, ManualClock, MonotonicClock, SweepReport};
pub use eligibility::{HarvestEligibilityEngine, MassHarvestGate, SeedInventory};
pub use error::HarvestError;
pub use planner::{AreaHarvestPlanner, NodeLookup, candidate_cells};
pub use policy::{
    CollectionPolicy, CooldownPolicy, EconomyPolicy, HarvestPolicy, MassHarvestPolicy,
    ToolPolicy, WorldPolicy, resolve_group,
};
pub use reward::RewardCalculator;
pub use tools::{ANY_HOE, ToolPolicyResolver, ToolVerdict};
pub use view::{ConfigValue, ConfigurationView, MissingKeys, StaticConfigView};
