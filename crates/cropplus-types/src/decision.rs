//! Harvest decisions, mass-harvest plans, and reward results.
//!
//! These are the values the engine hands back to the host. Each carries
//! enough detail to explain itself: a denial names the failing check, a
//! plan reports how many candidates were cut, and a reward records the
//! multiplier chain that produced its amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{CooldownKind, DisabledReason, HarvestOutcome};
use crate::structs::{BlockPos, CropSite, ItemId, Notification, message_keys};

// ---------------------------------------------------------------------------
// HarvestDecision
// ---------------------------------------------------------------------------

/// Multipliers attached to an allowed harvest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarvestMultipliers {
    /// `crops.<kind>.drop-multiplier`.
    pub crop_base: f64,
    /// `crops.<kind>.tool-multipliers.<TOOL>`.
    pub crop_tool: f64,
    /// `crop_base * crop_tool`, applied to drop amounts.
    pub drop: f64,
    /// `economy.tool-multipliers.<TOOL>`, applied to rewards.
    pub economy: f64,
}

/// The single outcome of one eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HarvestDecision {
    /// Every check passed.
    Allowed(HarvestMultipliers),
    /// The player lacks the base harvest capability.
    DeniedPermission,
    /// The held tool is not allowed.
    DeniedTool {
        /// Human label of what would be accepted (`hoe`, `any tool`, ...).
        required_tool: String,
        /// Whether the denial was for an empty hand.
        bare_hands: bool,
    },
    /// Harvesting is restricted in this world.
    DeniedWorld {
        /// The rejected world.
        world: String,
    },
    /// A global or location cooldown is still running.
    DeniedCooldown {
        /// Which cooldown blocked the harvest.
        kind: CooldownKind,
        /// Milliseconds until it expires.
        remaining_ms: u64,
    },
    /// Seed-requiring mode is on and the player has no seed.
    DeniedNoSeeds {
        /// The seed the player would need.
        seed: ItemId,
    },
    /// The node is not harvestable right now.
    DeniedDisabled {
        /// Which condition disabled the node.
        reason: DisabledReason,
    },
}

impl HarvestDecision {
    /// Flat classification of this decision.
    pub const fn outcome(&self) -> HarvestOutcome {
        match self {
            Self::Allowed(_) => HarvestOutcome::Allowed,
            Self::DeniedPermission => HarvestOutcome::DeniedPermission,
            Self::DeniedTool { .. } => HarvestOutcome::DeniedTool,
            Self::DeniedWorld { .. } => HarvestOutcome::DeniedWorld,
            Self::DeniedCooldown { .. } => HarvestOutcome::DeniedCooldown,
            Self::DeniedNoSeeds { .. } => HarvestOutcome::DeniedNoSeeds,
            Self::DeniedDisabled { .. } => HarvestOutcome::DeniedDisabled,
        }
    }

    /// Whether the harvest may proceed.
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Multipliers of an allowed decision.
    pub const fn multipliers(&self) -> Option<&HarvestMultipliers> {
        match self {
            Self::Allowed(m) => Some(m),
            _ => None,
        }
    }

    /// The notification the player should see, if any.
    ///
    /// Allowed decisions and disabled nodes are silent: for a disabled node
    /// the host lets its native interaction proceed.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            Self::Allowed(_) | Self::DeniedDisabled { .. } => None,
            Self::DeniedPermission => Some(Notification::new(message_keys::NO_PERMISSION)),
            Self::DeniedTool {
                bare_hands: true, ..
            } => Some(Notification::new(message_keys::BARE_HANDS_NOT_ALLOWED)),
            Self::DeniedTool { required_tool, .. } => Some(
                Notification::new(message_keys::TOOL_REQUIRED).with("tool", required_tool.clone()),
            ),
            Self::DeniedWorld { .. } => Some(Notification::new(message_keys::WORLD_NOT_ALLOWED)),
            Self::DeniedCooldown { .. } => Some(Notification::new(message_keys::COOLDOWN_ACTIVE)),
            Self::DeniedNoSeeds { .. } => Some(Notification::new(message_keys::NO_SEEDS)),
        }
    }
}

// ---------------------------------------------------------------------------
// MassHarvestPlan
// ---------------------------------------------------------------------------

/// Ordered candidate sites for one mass harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MassHarvestPlan {
    /// Centre of the scanned cuboid.
    pub center: BlockPos,
    /// Horizontal half-extent that was scanned.
    pub range: u32,
    /// Cap applied to the plan.
    pub max_crops: usize,
    /// Planned sites in scan order, at most `max_crops` long.
    pub sites: Vec<CropSite>,
    /// Every eligible candidate found before truncation.
    pub candidates_found: usize,
}

impl MassHarvestPlan {
    /// Number of planned sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether nothing was planned.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Candidates dropped by the cap.
    pub fn truncated(&self) -> usize {
        self.candidates_found.saturating_sub(self.sites.len())
    }

    /// Whether the cap cut any candidates.
    pub fn is_truncated(&self) -> bool {
        self.truncated() > 0
    }
}

// ---------------------------------------------------------------------------
// RewardResult
// ---------------------------------------------------------------------------

/// A computed payout and the chain that produced it.
///
/// `amount = base_rate * effective_count * tool_multiplier`, where
/// `effective_count = floor(crop_count * mass_bonus)`, clamped at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardResult {
    /// Configured reward per crop.
    pub base_rate: Decimal,
    /// Crops actually harvested.
    pub crop_count: u32,
    /// Mass-harvest bonus applied to the count (1 for single harvests).
    pub mass_bonus: Decimal,
    /// Crop count after the bonus, rounded down.
    pub effective_count: u32,
    /// Economy multiplier of the held tool.
    pub tool_multiplier: Decimal,
    /// Final non-negative amount.
    pub amount: Decimal,
}

impl RewardResult {
    /// Whether this reward should reach the economy. Zero never does.
    pub fn is_payable(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multipliers() -> HarvestMultipliers {
        HarvestMultipliers {
            crop_base: 1.0,
            crop_tool: 1.5,
            drop: 1.5,
            economy: 2.0,
        }
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(
            HarvestDecision::Allowed(multipliers()).outcome(),
            HarvestOutcome::Allowed
        );
        assert_eq!(
            HarvestDecision::DeniedDisabled {
                reason: DisabledReason::NotFullyGrown
            }
            .outcome(),
            HarvestOutcome::DeniedDisabled
        );
        assert!(!HarvestDecision::DeniedPermission.is_allowed());
    }

    #[test]
    fn tool_denials_pick_message() {
        let bare = HarvestDecision::DeniedTool {
            required_tool: String::from("hoe"),
            bare_hands: true,
        };
        assert_eq!(
            bare.notification().map(|n| n.key),
            Some(String::from("bare-hands-not-allowed"))
        );

        let tool = HarvestDecision::DeniedTool {
            required_tool: String::from("hoe"),
            bare_hands: false,
        };
        let note = tool.notification();
        assert_eq!(note.as_ref().map(|n| n.key.as_str()), Some("tool-required"));
        assert_eq!(
            note.as_ref().and_then(|n| n.params.get("tool")).map(String::as_str),
            Some("hoe")
        );
    }

    #[test]
    fn allowed_and_disabled_are_silent() {
        assert!(HarvestDecision::Allowed(multipliers()).notification().is_none());
        assert!(
            HarvestDecision::DeniedDisabled {
                reason: DisabledReason::CropDisabled
            }
            .notification()
            .is_none()
        );
    }

    #[test]
    fn plan_truncation_counts() {
        let plan = MassHarvestPlan {
            center: BlockPos::new("world", 0, 64, 0),
            range: 3,
            max_crops: 2,
            sites: vec![
                CropSite::ripe(BlockPos::new("world", 0, 64, 0), crate::CropKind::Wheat),
                CropSite::ripe(BlockPos::new("world", 1, 64, 0), crate::CropKind::Wheat),
            ],
            candidates_found: 5,
        };
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.truncated(), 3);
        assert!(plan.is_truncated());
    }

    #[test]
    fn decision_serializes_with_outcome_tag() {
        let json = serde_json::to_value(HarvestDecision::DeniedWorld {
            world: String::from("nether"),
        })
        .ok();
        assert_eq!(
            json.as_ref().and_then(|v| v.get("outcome")).and_then(|v| v.as_str()),
            Some("denied_world")
        );
    }

    #[test]
    fn zero_reward_is_not_payable() {
        let reward = RewardResult {
            base_rate: Decimal::ZERO,
            crop_count: 4,
            mass_bonus: Decimal::ONE,
            effective_count: 4,
            tool_multiplier: Decimal::ONE,
            amount: Decimal::ZERO,
        };
        assert!(!reward.is_payable());
    }
}
