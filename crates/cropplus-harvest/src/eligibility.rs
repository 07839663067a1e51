//! The harvest eligibility pipeline.
//!
//! [`HarvestEligibilityEngine::evaluate`] runs a fixed sequence of checks
//! and returns the first failure as a [`HarvestDecision`]. The order is
//! part of the contract: each stage has its own message and the cooldown
//! stage has side effects.
//!
//! 1. Harvesting switched off, unrecognised node, or crop disabled.
//! 2. Node not fully grown.
//! 3. Missing [`Capability::UseHarvest`].
//! 4. Tool policy (group policy replaces world policy when it applies).
//! 5. World restrictions, unless [`Capability::BypassWorld`].
//! 6. Global then location cooldown, unless [`Capability::BypassCooldown`].
//! 7. Seed requirement.
//!
//! Mass harvests pass through [`HarvestEligibilityEngine::mass_gate`] once
//! per click, then each planned site is re-checked in member mode, which
//! skips stage 6 because the mass cooldown already gated the batch.

use std::sync::Arc;
use std::time::Duration;

use cropplus_types::{
    Capability, CooldownKind, CooldownSubject, CropSite, DisabledReason, HarvestDecision,
    HarvestMultipliers, ItemId, Notification, PlayerContext, message_keys,
};
use tracing::debug;

use crate::cooldown::CooldownStore;
use crate::error::HarvestError;
use crate::policy::{self, HarvestPolicy};
use crate::tools::{ToolPolicyResolver, ToolVerdict};
use crate::view::ConfigurationView;

/// Read access to the acting player's inventory for the seed check.
pub trait SeedInventory {
    /// Whether the inventory holds at least one `item`.
    fn has_item(&self, item: &ItemId) -> bool;
}

/// Outcome of the once-per-click mass-harvest gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MassHarvestGate {
    /// Mass harvesting does not apply; harvest the clicked node only.
    Single,
    /// The held tool is below the minimum tier; notify and harvest the
    /// clicked node only.
    TierTooLow {
        /// Configured minimum tier name.
        minimum_tier: String,
    },
    /// The mass cooldown is active; nothing is harvested.
    CoolingDown {
        /// Milliseconds until the mass cooldown expires.
        remaining_ms: u64,
    },
    /// Plan a mass harvest.
    Proceed {
        /// Horizontal half-extent of the scan.
        range: u32,
        /// Cap on planned sites.
        max_crops: usize,
    },
}

impl MassHarvestGate {
    /// The notification this gate outcome produces, if any.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            Self::TierTooLow { minimum_tier } => Some(
                Notification::new(message_keys::TOOL_TIER_TOO_LOW)
                    .with("tier", minimum_tier.to_ascii_lowercase()),
            ),
            Self::CoolingDown { .. } => Some(Notification::new(message_keys::COOLDOWN_ACTIVE)),
            Self::Single | Self::Proceed { .. } => None,
        }
    }

    /// Whether the clicked node should still be harvested on its own.
    pub const fn falls_back_to_single(&self) -> bool {
        matches!(self, Self::Single | Self::TierTooLow { .. })
    }
}

/// The central policy resolver.
///
/// Holds the configuration view and the shared cooldown store. Policy is
/// resolved from the view on every call.
#[derive(Debug, Clone)]
pub struct HarvestEligibilityEngine {
    config: Arc<dyn ConfigurationView>,
    cooldowns: Arc<CooldownStore>,
}

impl HarvestEligibilityEngine {
    /// Create an engine over `config` and `cooldowns`.
    pub fn new(config: Arc<dyn ConfigurationView>, cooldowns: Arc<CooldownStore>) -> Self {
        Self { config, cooldowns }
    }

    /// The configuration view.
    pub fn config(&self) -> &dyn ConfigurationView {
        self.config.as_ref()
    }

    /// The shared cooldown store.
    pub const fn cooldowns(&self) -> &Arc<CooldownStore> {
        &self.cooldowns
    }

    /// Resolve the policy for the player's world and group.
    pub fn policy(&self, ctx: &PlayerContext) -> Result<HarvestPolicy, HarvestError> {
        HarvestPolicy::resolve(self.config(), &ctx.world, ctx.group.as_deref())
    }

    /// Evaluate a single harvest of `site` by `ctx`.
    ///
    /// Permitted cooldown checks stamp the global and location timers, so a
    /// single call may arm both.
    pub fn evaluate<I>(
        &self,
        ctx: &PlayerContext,
        site: &CropSite,
        inventory: &I,
    ) -> Result<HarvestDecision, HarvestError>
    where
        I: SeedInventory + ?Sized,
    {
        self.run(ctx, site, inventory, true)
    }

    /// Re-check one member of a mass-harvest plan. Identical to
    /// [`evaluate`](Self::evaluate) except that cooldowns are skipped.
    pub fn evaluate_member<I>(
        &self,
        ctx: &PlayerContext,
        site: &CropSite,
        inventory: &I,
    ) -> Result<HarvestDecision, HarvestError>
    where
        I: SeedInventory + ?Sized,
    {
        self.run(ctx, site, inventory, false)
    }

    fn run<I>(
        &self,
        ctx: &PlayerContext,
        site: &CropSite,
        inventory: &I,
        with_cooldowns: bool,
    ) -> Result<HarvestDecision, HarvestError>
    where
        I: SeedInventory + ?Sized,
    {
        let policy = self.policy(ctx)?;
        let decision = self.decide(&policy, ctx, site, inventory, with_cooldowns)?;
        debug!(
            player = %ctx.player_id,
            pos = %site.pos,
            outcome = ?decision.outcome(),
            "Harvest evaluated"
        );
        Ok(decision)
    }

    fn decide<I>(
        &self,
        policy: &HarvestPolicy,
        ctx: &PlayerContext,
        site: &CropSite,
        inventory: &I,
        with_cooldowns: bool,
    ) -> Result<HarvestDecision, HarvestError>
    where
        I: SeedInventory + ?Sized,
    {
        let disabled = |reason| Ok(HarvestDecision::DeniedDisabled { reason });

        // 1. Switches and node recognition.
        if !policy.harvesting_enabled {
            return disabled(DisabledReason::HarvestingDisabled);
        }
        let Some(kind) = site.kind else {
            return disabled(DisabledReason::UnrecognizedNode);
        };
        if !policy::crop_enabled(self.config(), kind) {
            return disabled(DisabledReason::CropDisabled);
        }

        // 2. Growth.
        if !site.is_fully_grown() {
            return disabled(DisabledReason::NotFullyGrown);
        }

        // 3. Permission.
        if !ctx.has(Capability::UseHarvest) {
            return Ok(HarvestDecision::DeniedPermission);
        }

        // 4. Tool.
        match ToolPolicyResolver::check(&ctx.held_tool, &policy.tools) {
            ToolVerdict::Allowed => {}
            ToolVerdict::BareHandsDenied { required } => {
                return Ok(HarvestDecision::DeniedTool {
                    required_tool: required,
                    bare_hands: true,
                });
            }
            ToolVerdict::ToolDenied { required } => {
                return Ok(HarvestDecision::DeniedTool {
                    required_tool: required,
                    bare_hands: false,
                });
            }
        }

        // 5. World.
        if !ctx.has(Capability::BypassWorld) && !policy.worlds.permits(&site.pos.world) {
            return Ok(HarvestDecision::DeniedWorld {
                world: site.pos.world.clone(),
            });
        }

        // 6. Cooldowns.
        if with_cooldowns && !ctx.has(Capability::BypassCooldown) {
            let subjects = [
                (
                    CooldownKind::Global,
                    CooldownSubject::Global(ctx.player_id),
                ),
                (
                    CooldownKind::Location,
                    CooldownSubject::Location(site.pos.clone()),
                ),
            ];
            for (kind, subject) in subjects {
                let secs = policy.cooldowns.effective_secs(kind);
                if secs > 0.0 && self.cooldowns.check_and_record(&subject, secs) {
                    return Ok(HarvestDecision::DeniedCooldown {
                        kind,
                        remaining_ms: millis(self.cooldowns.remaining(&subject, secs)),
                    });
                }
            }
        }

        // 7. Seeds.
        let seed = kind.seed_item();
        if policy.require_seeds && !inventory.has_item(&seed) {
            return Ok(HarvestDecision::DeniedNoSeeds { seed });
        }

        let crop_base = policy::drop_multiplier(self.config(), kind)?;
        let crop_tool = policy::crop_tool_multiplier(self.config(), kind, &ctx.held_tool)?;
        Ok(HarvestDecision::Allowed(HarvestMultipliers {
            crop_base,
            crop_tool,
            drop: crop_base * crop_tool,
            economy: policy::economy_tool_multiplier(self.config(), &ctx.held_tool)?,
        }))
    }

    /// Decide once per click whether a sneaking player gets a mass harvest.
    ///
    /// Arms the mass cooldown when it lets the harvest proceed.
    pub fn mass_gate(&self, ctx: &PlayerContext) -> Result<MassHarvestGate, HarvestError> {
        let policy = self.policy(ctx)?;
        let mass = &policy.mass;

        if !mass.enabled || (mass.require_sneak && !ctx.sneaking) {
            return Ok(MassHarvestGate::Single);
        }
        if mass.tier_restricted
            && !ToolPolicyResolver::tier_meets(&ctx.held_tool, &mass.minimum_tier)
        {
            return Ok(MassHarvestGate::TierTooLow {
                minimum_tier: mass.minimum_tier.clone(),
            });
        }
        if !ctx.has(Capability::BypassCooldown) {
            let secs = policy.cooldowns.effective_secs(CooldownKind::Mass);
            let subject = CooldownSubject::Mass(ctx.player_id);
            if secs > 0.0 && self.cooldowns.check_and_record(&subject, secs) {
                return Ok(MassHarvestGate::CoolingDown {
                    remaining_ms: millis(self.cooldowns.remaining(&subject, secs)),
                });
            }
        }

        let range = mass.range(ctx.has(Capability::UnlimitedRange));
        debug!(player = %ctx.player_id, range, max_crops = mass.max_crops, "Mass harvest gated");
        Ok(MassHarvestGate::Proceed {
            range,
            max_crops: mass.max_crops,
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
