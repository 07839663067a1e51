//! Policy resolution: global, world, and group configuration with precedence.
//!
//! A [`HarvestPolicy`] is built from a [`ConfigurationView`] for one
//! `(world, group)` pair every time a decision needs it. Nothing here is
//! cached, so a configuration reload is visible to the very next evaluation.
//!
//! Precedence is group over world over global. Group settings apply only
//! when `groups.enabled` is on, and a group tool policy (when its own
//! `tool-restrictions.enabled` is set) fully replaces the world tool policy
//! rather than merging with it.

use cropplus_types::{CooldownKind, CropKind, DropLocation, ItemId};

use crate::error::HarvestError;
use crate::view::ConfigurationView;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Global cooldown between single harvests, seconds.
pub const DEFAULT_GLOBAL_COOLDOWN: f64 = 0.5;
/// Per-location cooldown, seconds.
pub const DEFAULT_LOCATION_COOLDOWN: f64 = 2.0;
/// Mass-harvest cooldown, seconds.
pub const DEFAULT_MASS_COOLDOWN: f64 = 5.0;
/// Mass-harvest range without bonuses.
pub const DEFAULT_RANGE: i64 = 3;
/// Mass-harvest range with the unlimited-range capability.
pub const DEFAULT_MAX_RANGE: i64 = 5;
/// Cap on crops per mass harvest.
pub const DEFAULT_MAX_CROPS: i64 = 50;
/// Minimum hoe tier for mass harvesting when tier restrictions are on.
pub const DEFAULT_MINIMUM_TIER: &str = "IRON";
/// Economy reward per crop.
pub const DEFAULT_REWARD_PER_CROP: f64 = 0.1;
/// Crop-count bonus for mass harvests.
pub const DEFAULT_MASS_BONUS: f64 = 1.5;

// ---------------------------------------------------------------------------
// Sub-policies
// ---------------------------------------------------------------------------

/// The effective tool policy for one player in one world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPolicy {
    /// Whether tool restrictions apply at all.
    pub restricted: bool,
    /// Whether an empty hand passes.
    pub allow_bare_hands: bool,
    /// Accepted item identifiers; empty means any tool.
    pub allowed_tools: Vec<String>,
    /// Name of the group whose policy replaced the world policy, if any.
    pub group: Option<String>,
}

/// Where harvested drops go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionPolicy {
    /// Put drops straight into the inventory.
    pub auto_collect: bool,
    /// Where drops land when auto-collect is off.
    pub drop_location: DropLocation,
}

/// World allow/deny lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldPolicy {
    /// Whether world restrictions are enabled.
    pub restricted: bool,
    /// If non-empty, only these worlds are allowed.
    pub allowed: Vec<String>,
    /// These worlds are always rejected.
    pub disabled: Vec<String>,
}

impl WorldPolicy {
    /// Whether harvesting is permitted in `world`. The deny list wins.
    pub fn permits(&self, world: &str) -> bool {
        if !self.restricted {
            return true;
        }
        if self.disabled.iter().any(|w| w == world) {
            return false;
        }
        self.allowed.is_empty() || self.allowed.iter().any(|w| w == world)
    }
}

/// Cooldown durations, before and after the group multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownPolicy {
    /// `cooldowns.enabled`.
    pub enabled: bool,
    /// Global per-player duration, seconds.
    pub global_secs: f64,
    /// Per-location duration, seconds.
    pub location_secs: f64,
    /// Per-player mass duration, seconds.
    pub mass_secs: f64,
    /// Group cooldown multiplier (1.0 without a group).
    pub multiplier: f64,
}

impl CooldownPolicy {
    /// Effective duration for `kind` in seconds. Zero or less means the
    /// cooldown is disabled and the store must not be consulted.
    pub fn effective_secs(&self, kind: CooldownKind) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        let base = match kind {
            CooldownKind::Global => self.global_secs,
            CooldownKind::Location => self.location_secs,
            CooldownKind::Mass => self.mass_secs,
        };
        base * self.multiplier
    }
}

/// Mass-harvest gating and sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MassHarvestPolicy {
    /// `mass-harvesting.enabled`.
    pub enabled: bool,
    /// Mass harvest only while sneaking.
    pub require_sneak: bool,
    /// Range without the unlimited-range capability.
    pub default_range: u32,
    /// Range with the unlimited-range capability.
    pub max_range: u32,
    /// Group range bonus (may be negative).
    pub range_bonus: i64,
    /// Cap on crops per mass harvest.
    pub max_crops: usize,
    /// Whether the minimum hoe tier applies.
    pub tier_restricted: bool,
    /// Minimum tier name as configured.
    pub minimum_tier: String,
}

impl MassHarvestPolicy {
    /// Effective range: the base range plus the group bonus, never below 0.
    pub fn range(&self, unlimited: bool) -> u32 {
        let base = if unlimited {
            self.max_range
        } else {
            self.default_range
        };
        let total = i64::from(base).saturating_add(self.range_bonus).max(0);
        u32::try_from(total).unwrap_or(u32::MAX)
    }
}

/// Economy reward settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EconomyPolicy {
    /// `economy.enabled`.
    pub enabled: bool,
    /// Reward per harvested crop.
    pub reward_per_crop: f64,
    /// Crop-count multiplier for mass harvests.
    pub mass_bonus: f64,
}

impl EconomyPolicy {
    /// Read the economy section. Economy settings are global only.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MalformedPolicy`] for NaN or infinite values.
    pub fn resolve(view: &dyn ConfigurationView) -> Result<Self, HarvestError> {
        Ok(Self {
            enabled: view.get_bool("economy.enabled", false),
            reward_per_crop: finite(view, "economy.reward-per-crop", DEFAULT_REWARD_PER_CROP)?,
            mass_bonus: finite(view, "economy.mass-harvest-bonus", DEFAULT_MASS_BONUS)?,
        })
    }
}

// ---------------------------------------------------------------------------
// HarvestPolicy
// ---------------------------------------------------------------------------

/// The fully resolved policy for one `(world, group)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestPolicy {
    /// `settings.enabled && harvesting.enabled`.
    pub harvesting_enabled: bool,
    /// Seed-requiring mode.
    pub require_seeds: bool,
    /// Whether per-harvest logs are raised to `info`.
    pub debug: bool,
    /// The group that applied, if groups are enabled and one matched.
    pub group: Option<String>,
    /// Effective tool policy.
    pub tools: ToolPolicy,
    /// Effective drop handling.
    pub collection: CollectionPolicy,
    /// World restrictions.
    pub worlds: WorldPolicy,
    /// Cooldown durations.
    pub cooldowns: CooldownPolicy,
    /// Mass-harvest settings.
    pub mass: MassHarvestPolicy,
    /// Economy settings.
    pub economy: EconomyPolicy,
}

impl HarvestPolicy {
    /// Resolve the policy for `world`, applying `group` only when group
    /// settings are enabled.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MalformedPolicy`] if a numeric value is NaN
    /// or infinite.
    pub fn resolve(
        view: &dyn ConfigurationView,
        world: &str,
        group: Option<&str>,
    ) -> Result<Self, HarvestError> {
        let group = group
            .filter(|_| view.get_bool("groups.enabled", false))
            .map(str::to_owned);
        let group_path = group
            .as_deref()
            .map(|g| format!("groups.configurations.{g}"));

        let multiplier = match group_path.as_deref() {
            Some(path) => finite(view, &format!("{path}.cooldown-multiplier"), 1.0)?,
            None => 1.0,
        };
        let range_bonus = group_path
            .as_deref()
            .map_or(0, |path| view.get_int(&format!("{path}.range-bonus"), 0));

        Ok(Self {
            harvesting_enabled: view.get_bool("settings.enabled", true)
                && view.get_bool("harvesting.enabled", true),
            require_seeds: view.get_bool("harvesting.require-seeds", true),
            debug: view.get_bool("settings.debug", false),
            tools: resolve_tools(view, world, group.as_deref()),
            collection: resolve_collection(view, world, group_path.as_deref()),
            worlds: WorldPolicy {
                restricted: view.get_bool("worlds.enabled", false),
                allowed: view.get_string_list("worlds.allowed"),
                disabled: view.get_string_list("worlds.disabled"),
            },
            cooldowns: CooldownPolicy {
                enabled: view.get_bool("cooldowns.enabled", true),
                global_secs: finite(view, "cooldowns.global", DEFAULT_GLOBAL_COOLDOWN)?,
                location_secs: finite(view, "cooldowns.per-crop", DEFAULT_LOCATION_COOLDOWN)?,
                mass_secs: finite(view, "cooldowns.mass-harvest", DEFAULT_MASS_COOLDOWN)?,
                multiplier,
            },
            mass: MassHarvestPolicy {
                enabled: view.get_bool("mass-harvesting.enabled", true),
                require_sneak: view.get_bool("mass-harvesting.require-sneak", true),
                default_range: non_negative_u32(
                    view.get_int("mass-harvesting.default-range", DEFAULT_RANGE),
                ),
                max_range: non_negative_u32(
                    view.get_int("mass-harvesting.max-range", DEFAULT_MAX_RANGE),
                ),
                range_bonus,
                max_crops: usize::try_from(
                    view.get_int("mass-harvesting.max-crops", DEFAULT_MAX_CROPS)
                        .max(0),
                )
                .unwrap_or(usize::MAX),
                tier_restricted: view.get_bool("mass-harvesting.tool-restrictions.enabled", false),
                minimum_tier: view.get_string(
                    "mass-harvesting.tool-restrictions.minimum-tier",
                    DEFAULT_MINIMUM_TIER,
                ),
            },
            economy: EconomyPolicy::resolve(view)?,
            group,
        })
    }
}

fn resolve_tools(view: &dyn ConfigurationView, world: &str, group: Option<&str>) -> ToolPolicy {
    let world_specific = view.get_bool("tool-restrictions.world-specific.enabled", false);
    let world_path = format!("tool-restrictions.world-specific.worlds.{world}");

    let global_restricted = view.get_bool("tool-restrictions.enabled", true);
    let global_bare = view.get_bool("tool-restrictions.allow-bare-hands", false);
    let global_tools = view.get_string_list("tool-restrictions.allowed-tools");

    let (restricted, world_bare, world_tools) = if world_specific {
        let tools = view.get_string_list(&format!("{world_path}.allowed-tools"));
        (
            view.get_bool(&format!("{world_path}.enabled"), global_restricted),
            view.get_bool(&format!("{world_path}.allow-bare-hands"), global_bare),
            if tools.is_empty() { global_tools } else { tools },
        )
    } else {
        (global_restricted, global_bare, global_tools)
    };

    if let Some(group) = group {
        let path = format!("groups.configurations.{group}.tool-restrictions");
        if view.get_bool(&format!("{path}.enabled"), false) {
            return ToolPolicy {
                restricted,
                allow_bare_hands: view.get_bool(&format!("{path}.allow-bare-hands"), false),
                allowed_tools: view.get_string_list(&format!("{path}.allowed-tools")),
                group: Some(group.to_owned()),
            };
        }
    }

    ToolPolicy {
        restricted,
        allow_bare_hands: world_bare,
        allowed_tools: world_tools,
        group: None,
    }
}

fn resolve_collection(
    view: &dyn ConfigurationView,
    world: &str,
    group_path: Option<&str>,
) -> CollectionPolicy {
    if let Some(path) = group_path {
        return CollectionPolicy {
            auto_collect: view.get_bool(&format!("{path}.auto-collect.enabled"), true),
            drop_location: DropLocation::parse(
                &view.get_string(&format!("{path}.auto-collect.drop-location"), "CROP"),
            ),
        };
    }

    let auto_collect = view.get_bool("harvesting.auto-collect.enabled", true);
    let drop_location = view.get_string("harvesting.auto-collect.drop-location", "CROP");
    if !view.get_bool("harvesting.auto-collect.world-specific.enabled", false) {
        return CollectionPolicy {
            auto_collect,
            drop_location: DropLocation::parse(&drop_location),
        };
    }

    let world_path = format!("harvesting.auto-collect.world-specific.worlds.{world}");
    CollectionPolicy {
        auto_collect: view.get_bool(&format!("{world_path}.auto-collect"), auto_collect),
        drop_location: DropLocation::parse(
            &view.get_string(&format!("{world_path}.drop-location"), &drop_location),
        ),
    }
}

// ---------------------------------------------------------------------------
// Per-crop and per-tool lookups
// ---------------------------------------------------------------------------

/// Whether `crops.<kind>.enabled` is on.
pub fn crop_enabled(view: &dyn ConfigurationView, kind: CropKind) -> bool {
    view.get_bool(&format!("crops.{}.enabled", kind.config_key()), true)
}

/// `crops.<kind>.drop-multiplier`.
///
/// # Errors
///
/// Returns [`HarvestError::MalformedPolicy`] for NaN or infinite values.
pub fn drop_multiplier(view: &dyn ConfigurationView, kind: CropKind) -> Result<f64, HarvestError> {
    finite(
        view,
        &format!("crops.{}.drop-multiplier", kind.config_key()),
        1.0,
    )
}

/// `crops.<kind>.tool-multipliers.<TOOL>`.
///
/// # Errors
///
/// Returns [`HarvestError::MalformedPolicy`] for NaN or infinite values.
pub fn crop_tool_multiplier(
    view: &dyn ConfigurationView,
    kind: CropKind,
    tool: &ItemId,
) -> Result<f64, HarvestError> {
    finite(
        view,
        &format!("crops.{}.tool-multipliers.{tool}", kind.config_key()),
        1.0,
    )
}

/// `economy.tool-multipliers.<TOOL>`.
///
/// # Errors
///
/// Returns [`HarvestError::MalformedPolicy`] for NaN or infinite values.
pub fn economy_tool_multiplier(
    view: &dyn ConfigurationView,
    tool: &ItemId,
) -> Result<f64, HarvestError> {
    finite(view, &format!("economy.tool-multipliers.{tool}"), 1.0)
}

/// Pick the first configured group (in configuration order) that the
/// player belongs to. Returns `None` when group settings are off.
pub fn resolve_group<'a, I>(view: &dyn ConfigurationView, memberships: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    if !view.get_bool("groups.enabled", false) {
        return None;
    }
    view.section_keys("groups.configurations")
        .into_iter()
        .find(|group| memberships.clone().into_iter().any(|m| m == group))
}

fn finite(view: &dyn ConfigurationView, key: &str, default: f64) -> Result<f64, HarvestError> {
    let value = view.get_float(key, default);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(HarvestError::MalformedPolicy {
            key: key.to_owned(),
            value: value.to_string(),
        })
    }
}

fn non_negative_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
