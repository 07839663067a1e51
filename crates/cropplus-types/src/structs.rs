//! Core value structs: positions, items, player context, crop sites.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::{Capability, CooldownKind, CropKind};
use crate::ids::PlayerId;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A block coordinate in a named world. Used as the stable key of a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// World name.
    pub world: String,
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Create a position in `world`.
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Offset this position, returning `None` if any coordinate overflows.
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Some(Self {
            world: self.world.clone(),
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            z: self.z.checked_add(dz)?,
        })
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}_{}_{}_{}", self.world, self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Item or block identifier, normalised to upper case (`IRON_HOE`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Create an identifier, trimming and upper-casing the name.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_uppercase())
    }

    /// The empty hand.
    pub fn air() -> Self {
        Self(String::from("AIR"))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is an empty hand (any of the air variants).
    pub fn is_air(&self) -> bool {
        matches!(self.0.as_str(), "AIR" | "CAVE_AIR" | "VOID_AIR" | "")
    }

    /// Lower-case, space-separated form for messages (`iron hoe`).
    pub fn humanize(&self) -> String {
        humanize(&self.0)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case an identifier and replace underscores with spaces.
pub(crate) fn humanize(raw: &str) -> String {
    raw.to_ascii_lowercase().replace('_', " ")
}

/// A quantity of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item.
    pub item: ItemId,
    /// Number of units.
    pub amount: u32,
}

impl ItemStack {
    /// Create a stack.
    pub const fn new(item: ItemId, amount: u32) -> Self {
        Self { item, amount }
    }
}

// ---------------------------------------------------------------------------
// Player context
// ---------------------------------------------------------------------------

/// Everything the engine needs to know about the acting player.
///
/// Built fresh by the host for every interaction event and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerContext {
    /// Stable identity of the player.
    pub player_id: PlayerId,
    /// Display name, used only for logging.
    pub player_name: String,
    /// Name of the world the player is in.
    pub world: String,
    /// Whether the player is sneaking.
    pub sneaking: bool,
    /// Identifier of the item in the main hand (`AIR` for bare hands).
    pub held_tool: ItemId,
    /// Resolved harvest group, if any.
    pub group: Option<String>,
    /// Capabilities granted to the player.
    pub capabilities: BTreeSet<Capability>,
}

impl PlayerContext {
    /// Create a context with no group and no capabilities.
    pub fn new(player_id: PlayerId, player_name: &str, world: &str, held_tool: ItemId) -> Self {
        Self {
            player_id,
            player_name: player_name.to_owned(),
            world: world.to_owned(),
            sneaking: false,
            held_tool,
            group: None,
            capabilities: BTreeSet::new(),
        }
    }

    /// Add a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Set the resolved group.
    #[must_use]
    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_owned());
        self
    }

    /// Set the sneaking flag.
    #[must_use]
    pub const fn sneaking(mut self, sneaking: bool) -> Self {
        self.sneaking = sneaking;
        self
    }

    /// Whether the player holds `capability`.
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

// ---------------------------------------------------------------------------
// Crop sites
// ---------------------------------------------------------------------------

/// A node as reported by the host for a single decision or plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSite {
    /// Position of the node.
    pub pos: BlockPos,
    /// Crop kind, or `None` if the block is not a recognised crop.
    pub kind: Option<CropKind>,
    /// Current growth stage.
    pub growth_stage: u8,
    /// Maximum growth stage of the node.
    pub max_growth_stage: u8,
}

impl CropSite {
    /// A recognised crop at `stage`, using the kind's default maximum stage.
    pub const fn crop(pos: BlockPos, kind: CropKind, stage: u8) -> Self {
        Self {
            pos,
            kind: Some(kind),
            growth_stage: stage,
            max_growth_stage: kind.default_max_stage(),
        }
    }

    /// A fully grown crop.
    pub const fn ripe(pos: BlockPos, kind: CropKind) -> Self {
        Self::crop(pos, kind, kind.default_max_stage())
    }

    /// Whether the node has reached its maximum stage.
    pub const fn is_fully_grown(&self) -> bool {
        self.growth_stage >= self.max_growth_stage
    }
}

// ---------------------------------------------------------------------------
// Cooldown subjects
// ---------------------------------------------------------------------------

/// Key of a cooldown entry; the variant selects the subject space.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CooldownSubject {
    /// A player's global harvest cooldown.
    Global(PlayerId),
    /// A crop location's cooldown.
    Location(BlockPos),
    /// A player's mass-harvest cooldown.
    Mass(PlayerId),
}

impl CooldownSubject {
    /// The subject space this key belongs to.
    pub const fn kind(&self) -> CooldownKind {
        match self {
            Self::Global(_) => CooldownKind::Global,
            Self::Location(_) => CooldownKind::Location,
            Self::Mass(_) => CooldownKind::Mass,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Message keys delivered through the host's message port.
pub mod message_keys {
    /// Missing the base harvest capability.
    pub const NO_PERMISSION: &str = "no-permission";
    /// Held tool not in the allow-list. Param: `{tool}`.
    pub const TOOL_REQUIRED: &str = "tool-required";
    /// Bare hands are not allowed.
    pub const BARE_HANDS_NOT_ALLOWED: &str = "bare-hands-not-allowed";
    /// Harvesting is not allowed in this world.
    pub const WORLD_NOT_ALLOWED: &str = "world-not-allowed";
    /// A cooldown is active.
    pub const COOLDOWN_ACTIVE: &str = "cooldown-active";
    /// No seed to replant with.
    pub const NO_SEEDS: &str = "no-seeds";
    /// Mass harvest needs a better hoe. Param: `{tier}`.
    pub const TOOL_TIER_TOO_LOW: &str = "tool-tier-too-low";
    /// Single crop harvested. Params: `{amount}`, `{crop}`.
    pub const CROP_HARVESTED: &str = "crop-harvested";
    /// Mass harvest finished. Param: `{amount}`.
    pub const MASS_HARVEST_SUCCESS: &str = "mass-harvest-success";
    /// Some drops did not fit in the inventory.
    pub const INVENTORY_FULL: &str = "inventory-full";
    /// Drops went straight to the inventory (debug mode only).
    pub const AUTO_COLLECTED: &str = "auto-collected";
    /// Economy payout. Param: `{amount}`.
    pub const ECONOMY_REWARD: &str = "economy-reward";
}

/// A keyed, parameterised notification for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Message key under `messages.` in configuration.
    pub key: String,
    /// Placeholder values, keyed without braces (`tool`, `amount`).
    pub params: BTreeMap<String, String>,
}

impl Notification {
    /// A notification without parameters.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            params: BTreeMap::new(),
        }
    }

    /// Attach a placeholder value.
    #[must_use]
    pub fn with(mut self, param: &str, value: impl Into<String>) -> Self {
        self.params.insert(param.to_owned(), value.into());
        self
    }
}
