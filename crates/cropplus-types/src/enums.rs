//! Enumeration types for the harvest engine.
//!
//! The crop catalogue, hoe materials, player capabilities, and the
//! classification enums attached to harvest decisions.

use serde::{Deserialize, Serialize};

use crate::structs::ItemId;

// ---------------------------------------------------------------------------
// Crop catalogue
// ---------------------------------------------------------------------------

/// A recognised renewable resource node.
///
/// Each kind has an associated seed item (consumed on replant and required
/// when seed-requiring mode is on) and a default maximum growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropKind {
    /// Wheat, replanted with wheat seeds.
    Wheat,
    /// Carrots, replanted with a carrot.
    Carrots,
    /// Potatoes, replanted with a potato.
    Potatoes,
    /// Beetroots, replanted with beetroot seeds.
    Beetroots,
    /// Nether wart, replanted with itself.
    NetherWart,
    /// Cocoa pods, replanted with cocoa beans.
    Cocoa,
    /// Sweet berry bush, replanted with sweet berries.
    SweetBerryBush,
}

impl CropKind {
    /// Every recognised crop kind, in catalogue order.
    pub const ALL: [Self; 7] = [
        Self::Wheat,
        Self::Carrots,
        Self::Potatoes,
        Self::Beetroots,
        Self::NetherWart,
        Self::Cocoa,
        Self::SweetBerryBush,
    ];

    /// The host block identifier for this crop (e.g. `WHEAT`, `CARROTS`).
    pub const fn block_name(self) -> &'static str {
        match self {
            Self::Wheat => "WHEAT",
            Self::Carrots => "CARROTS",
            Self::Potatoes => "POTATOES",
            Self::Beetroots => "BEETROOTS",
            Self::NetherWart => "NETHER_WART",
            Self::Cocoa => "COCOA",
            Self::SweetBerryBush => "SWEET_BERRY_BUSH",
        }
    }

    /// The section name under `crops.` in the configuration.
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Wheat => "wheat",
            Self::Carrots => "carrots",
            Self::Potatoes => "potatoes",
            Self::Beetroots => "beetroots",
            Self::NetherWart => "nether_wart",
            Self::Cocoa => "cocoa",
            Self::SweetBerryBush => "sweet_berry_bush",
        }
    }

    /// Item identifier of the seed that replants this crop.
    pub const fn seed_item_name(self) -> &'static str {
        match self {
            Self::Wheat => "WHEAT_SEEDS",
            Self::Carrots => "CARROT",
            Self::Potatoes => "POTATO",
            Self::Beetroots => "BEETROOT_SEEDS",
            Self::NetherWart => "NETHER_WART",
            Self::Cocoa => "COCOA_BEANS",
            Self::SweetBerryBush => "SWEET_BERRIES",
        }
    }

    /// The seed item as an [`ItemId`].
    pub fn seed_item(self) -> ItemId {
        ItemId::new(self.seed_item_name())
    }

    /// Maximum growth stage of this crop in the vanilla block model.
    #[allow(clippy::match_same_arms)] // One row per crop keeps the catalogue readable.
    pub const fn default_max_stage(self) -> u8 {
        match self {
            Self::Wheat => 7,
            Self::Carrots => 7,
            Self::Potatoes => 7,
            Self::Beetroots => 3,
            Self::NetherWart => 3,
            Self::Cocoa => 2,
            Self::SweetBerryBush => 3,
        }
    }

    /// Human-readable name used in notifications (e.g. `sweet berry bush`).
    pub fn display_name(self) -> String {
        self.config_key().replace('_', " ")
    }

    /// Parse a host block identifier, case-insensitively.
    ///
    /// Returns `None` for blocks that are not harvestable crops.
    pub fn from_block_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.block_name().eq_ignore_ascii_case(name.trim()))
    }
}

// ---------------------------------------------------------------------------
// Hoe materials
// ---------------------------------------------------------------------------

/// Material of a hoe, the only implement class with a tier.
///
/// Tier order is `Wooden == Golden < Stone < Iron < Diamond < Netherite`.
/// Golden hoes are fast but weak and rank with wood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoeMaterial {
    /// `WOODEN_HOE`, tier 0.
    Wooden,
    /// `GOLDEN_HOE`, tier 0.
    Golden,
    /// `STONE_HOE`, tier 1.
    Stone,
    /// `IRON_HOE`, tier 2.
    Iron,
    /// `DIAMOND_HOE`, tier 3.
    Diamond,
    /// `NETHERITE_HOE`, tier 4.
    Netherite,
}

impl HoeMaterial {
    /// Every hoe material.
    pub const ALL: [Self; 6] = [
        Self::Wooden,
        Self::Golden,
        Self::Stone,
        Self::Iron,
        Self::Diamond,
        Self::Netherite,
    ];

    /// Numeric tier used for minimum-tier comparisons.
    #[allow(clippy::match_same_arms)] // Gold deliberately shares wood's tier.
    pub const fn tier(self) -> u8 {
        match self {
            Self::Wooden => 0,
            Self::Golden => 0,
            Self::Stone => 1,
            Self::Iron => 2,
            Self::Diamond => 3,
            Self::Netherite => 4,
        }
    }

    /// Tier name as written in configuration (`WOODEN`, `IRON`, ...).
    pub const fn tier_name(self) -> &'static str {
        match self {
            Self::Wooden => "WOODEN",
            Self::Golden => "GOLDEN",
            Self::Stone => "STONE",
            Self::Iron => "IRON",
            Self::Diamond => "DIAMOND",
            Self::Netherite => "NETHERITE",
        }
    }

    /// Item identifier of the hoe made from this material.
    pub const fn item_name(self) -> &'static str {
        match self {
            Self::Wooden => "WOODEN_HOE",
            Self::Golden => "GOLDEN_HOE",
            Self::Stone => "STONE_HOE",
            Self::Iron => "IRON_HOE",
            Self::Diamond => "DIAMOND_HOE",
            Self::Netherite => "NETHERITE_HOE",
        }
    }

    /// Classify a held item. Returns `None` for anything that is not a hoe.
    pub fn from_item(item: &ItemId) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|material| material.item_name() == item.as_str())
    }

    /// Parse a tier name from configuration, case-insensitively.
    pub fn from_tier_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|material| material.tier_name().eq_ignore_ascii_case(name.trim()))
    }
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// A harvesting capability granted to a player.
///
/// The host resolves its permission system into this set once per event,
/// so the engine never performs string permission queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Base permission to harvest at all (`cropplus.use`).
    UseHarvest,
    /// Skip every cooldown check (`cropplus.bypass.cooldown`).
    BypassCooldown,
    /// Skip world restrictions (`cropplus.bypass.world`).
    BypassWorld,
    /// Use the maximum mass-harvest range (`cropplus.mass.unlimited`).
    UnlimitedRange,
}

impl Capability {
    /// Every capability.
    pub const ALL: [Self; 4] = [
        Self::UseHarvest,
        Self::BypassCooldown,
        Self::BypassWorld,
        Self::UnlimitedRange,
    ];

    /// The permission node a host typically maps to this capability.
    pub const fn permission_node(self) -> &'static str {
        match self {
            Self::UseHarvest => "cropplus.use",
            Self::BypassCooldown => "cropplus.bypass.cooldown",
            Self::BypassWorld => "cropplus.bypass.world",
            Self::UnlimitedRange => "cropplus.mass.unlimited",
        }
    }

    /// Reverse lookup from a permission node.
    pub fn from_permission_node(node: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cap| cap.permission_node() == node)
    }
}

// ---------------------------------------------------------------------------
// Cooldowns
// ---------------------------------------------------------------------------

/// One of the three independent cooldown subject spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownKind {
    /// Per-player cooldown between any two single harvests.
    Global,
    /// Per-location cooldown on a single crop site.
    Location,
    /// Per-player cooldown between mass harvests.
    Mass,
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Where drops land when auto-collect is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropLocation {
    /// At the harvested crop.
    #[default]
    Crop,
    /// At the player's position.
    Player,
    /// One block below the player's position.
    Feet,
}

impl DropLocation {
    /// Parse the configuration value; anything unrecognised means `Crop`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PLAYER" => Self::Player,
            "FEET" => Self::Feet,
            _ => Self::Crop,
        }
    }
}

// ---------------------------------------------------------------------------
// Decision classification
// ---------------------------------------------------------------------------

/// Flat classification of a [`HarvestDecision`](crate::HarvestDecision).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestOutcome {
    /// All checks passed.
    Allowed,
    /// Missing the base harvest capability.
    DeniedPermission,
    /// Held tool rejected by the effective tool policy.
    DeniedTool,
    /// World excluded by world restrictions.
    DeniedWorld,
    /// A global or location cooldown is active.
    DeniedCooldown,
    /// Seed-requiring mode is on and the player holds no seed.
    DeniedNoSeeds,
    /// Harvesting is off, the node is unknown or disabled, or not grown.
    DeniedDisabled,
}

/// Why a node was treated as not harvestable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledReason {
    /// `settings.enabled` or `harvesting.enabled` is off.
    HarvestingDisabled,
    /// The block is not a recognised crop.
    UnrecognizedNode,
    /// The crop kind is disabled in `crops.<kind>.enabled`.
    CropDisabled,
    /// The crop has not reached its maximum growth stage.
    NotFullyGrown,
}
