//! The host-facing harvest service.
//!
//! [`HarvestService`] is constructed once per process and owns the wiring
//! between the configuration view, the cooldown store, the eligibility
//! engine, the planner, and the executor. The host translates each native
//! interaction into a [`PlayerContext`] plus [`CropSite`] and calls
//! [`HarvestService::handle_interaction`]; lower-level hosts can call the
//! individual operations directly.

use std::sync::Arc;

use cropplus_harvest::{
    AreaHarvestPlanner, ConfigurationView, CooldownStore, EconomyPolicy, HarvestEligibilityEngine,
    HarvestError, HarvestPolicy, MassHarvestGate, NodeLookup, RewardCalculator, SeedInventory,
};
use cropplus_types::{
    BlockPos, CropSite, HarvestDecision, ItemId, MassHarvestPlan, Notification, PlayerContext,
    PlayerId, RewardResult, message_keys,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::executor::HarvestExecutor;
use crate::ports::HostPorts;

/// Held item that never triggers a harvest.
pub const BONE_MEAL: &str = "BONE_MEAL";

/// How a successful interaction was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestMode {
    /// Only the clicked node.
    Single,
    /// Every eligible node in the planned area.
    Mass,
}

/// Summary of an applied harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// Single or mass.
    pub mode: HarvestMode,
    /// Nodes actually harvested.
    pub harvested: u32,
    /// Candidates the planner found (1 for single harvests).
    pub candidates_found: usize,
    /// Nodes that were planned (1 for single harvests).
    pub planned: usize,
    /// Total amount paid out.
    pub rewarded: Decimal,
}

/// Result of one player interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    /// Not a harvest attempt; the host should proceed natively.
    Ignored,
    /// The clicked node failed eligibility.
    Denied(HarvestDecision),
    /// Mass harvest blocked by its cooldown; nothing was harvested.
    MassCoolingDown {
        /// Milliseconds until the mass cooldown expires.
        remaining_ms: u64,
    },
    /// One or more nodes were harvested.
    Harvested(HarvestReport),
}

impl InteractionOutcome {
    /// Whether the host should cancel its native interaction.
    ///
    /// Denials only notify the player; the native interaction still runs.
    pub const fn cancels_native(&self) -> bool {
        matches!(self, Self::MassCoolingDown { .. } | Self::Harvested(_))
    }
}

/// Process-lifetime harvest service.
#[derive(Debug, Clone)]
pub struct HarvestService {
    config: Arc<dyn ConfigurationView>,
    cooldowns: Arc<CooldownStore>,
    engine: HarvestEligibilityEngine,
    planner: AreaHarvestPlanner,
}

impl HarvestService {
    /// Wire a service over `config` and a shared cooldown store.
    pub fn new(config: Arc<dyn ConfigurationView>, cooldowns: Arc<CooldownStore>) -> Self {
        Self {
            engine: HarvestEligibilityEngine::new(Arc::clone(&config), Arc::clone(&cooldowns)),
            planner: AreaHarvestPlanner::new(Arc::clone(&config)),
            config,
            cooldowns,
        }
    }

    /// The eligibility engine.
    pub const fn engine(&self) -> &HarvestEligibilityEngine {
        &self.engine
    }

    /// The shared cooldown store.
    pub const fn cooldowns(&self) -> &Arc<CooldownStore> {
        &self.cooldowns
    }

    // -----------------------------------------------------------------------
    // Exposed operations
    // -----------------------------------------------------------------------

    /// Evaluate a single harvest without applying it.
    pub fn evaluate_harvest<I>(
        &self,
        ctx: &PlayerContext,
        site: &CropSite,
        inventory: &I,
    ) -> Result<HarvestDecision, HarvestError>
    where
        I: SeedInventory + ?Sized,
    {
        self.engine.evaluate(ctx, site, inventory)
    }

    /// Plan a mass harvest around `center`, capped at the configured
    /// `mass-harvesting.max-crops`.
    pub fn plan_mass_harvest<L>(
        &self,
        ctx: &PlayerContext,
        center: &BlockPos,
        range: u32,
        lookup: &L,
    ) -> Result<MassHarvestPlan, HarvestError>
    where
        L: NodeLookup + ?Sized,
    {
        let policy = self.engine.policy(ctx)?;
        Ok(self.planner.plan(center, range, policy.mass.max_crops, lookup))
    }

    /// Compute a reward at the configured per-crop rate.
    pub fn compute_reward(
        &self,
        crop_count: u32,
        tool_multiplier: f64,
        mass_bonus: f64,
    ) -> Result<RewardResult, HarvestError> {
        let economy = EconomyPolicy::resolve(self.config.as_ref())?;
        RewardCalculator::from_policy(&economy)?.compute(crop_count, tool_multiplier, mass_bonus)
    }

    /// Forget a departing player's global and mass cooldowns.
    pub fn on_subject_disconnect(&self, player: PlayerId) {
        self.cooldowns.clear_subject(player);
    }

    /// Tear down process-lifetime state.
    pub fn shutdown(&self) {
        self.cooldowns.clear_all();
        info!("Harvest service shut down, cooldowns cleared");
    }

    // -----------------------------------------------------------------------
    // Full interaction
    // -----------------------------------------------------------------------

    /// Handle a right-click on `site`: evaluate, gate, plan, and apply.
    pub fn handle_interaction(
        &self,
        ctx: &PlayerContext,
        site: &CropSite,
        ports: &mut HostPorts<'_>,
    ) -> Result<InteractionOutcome, HarvestError> {
        if ctx.held_tool == ItemId::new(BONE_MEAL) {
            return Ok(InteractionOutcome::Ignored);
        }

        let decision = self.engine.evaluate(ctx, site, &*ports.inventory)?;
        let (Some(kind), HarvestDecision::Allowed(multipliers)) = (site.kind, &decision) else {
            if let Some(note) = decision.notification() {
                ports.messages.send(ctx.player_id, &note);
            }
            return Ok(InteractionOutcome::Denied(decision));
        };

        let gate = self.engine.mass_gate(ctx)?;
        if let Some(note) = gate.notification() {
            ports.messages.send(ctx.player_id, &note);
        }
        let policy = self.engine.policy(ctx)?;

        match gate {
            MassHarvestGate::CoolingDown { remaining_ms } => {
                Ok(InteractionOutcome::MassCoolingDown { remaining_ms })
            }
            MassHarvestGate::Proceed { range, max_crops } => {
                let plan = self.planner.plan(&site.pos, range, max_crops, &*ports.world);
                self.harvest_plan(ctx, &policy, &plan, ports)
                    .map(InteractionOutcome::Harvested)
            }
            MassHarvestGate::Single | MassHarvestGate::TierTooLow { .. } => {
                let done =
                    HarvestExecutor::harvest_site(ctx, site, kind, multipliers, &policy, ports)?;
                ports.messages.send(
                    ctx.player_id,
                    &Notification::new(message_keys::CROP_HARVESTED)
                        .with("amount", "1")
                        .with("crop", kind.display_name()),
                );
                Ok(InteractionOutcome::Harvested(HarvestReport {
                    mode: HarvestMode::Single,
                    harvested: 1,
                    candidates_found: 1,
                    planned: 1,
                    rewarded: done.reward.map_or(Decimal::ZERO, |r| r.amount),
                }))
            }
        }
    }

    /// Re-check and harvest every planned site, then pay the mass bonus.
    fn harvest_plan(
        &self,
        ctx: &PlayerContext,
        policy: &HarvestPolicy,
        plan: &MassHarvestPlan,
        ports: &mut HostPorts<'_>,
    ) -> Result<HarvestReport, HarvestError> {
        let mut harvested: u32 = 0;
        let mut rewarded = Decimal::ZERO;
        let mut economy_multiplier = 1.0;

        for member in &plan.sites {
            let decision = self.engine.evaluate_member(ctx, member, &*ports.inventory)?;
            let (Some(kind), HarvestDecision::Allowed(multipliers)) = (member.kind, &decision)
            else {
                debug!(pos = %member.pos, outcome = ?decision.outcome(), "Mass member skipped");
                continue;
            };
            economy_multiplier = multipliers.economy;
            let done =
                HarvestExecutor::harvest_site(ctx, member, kind, multipliers, policy, ports)?;
            harvested = harvested.saturating_add(1);
            if let Some(reward) = done.reward {
                rewarded = rewarded.saturating_add(reward.amount);
            }
        }

        let bonus = if harvested > 1 {
            HarvestExecutor::pay(
                ctx,
                policy,
                harvested,
                economy_multiplier,
                policy.economy.mass_bonus,
                ports,
            )?
        } else {
            None
        };
        if let Some(bonus) = bonus {
            rewarded = rewarded.saturating_add(bonus.amount);
        }

        if harvested > 0 {
            ports.messages.send(
                ctx.player_id,
                &Notification::new(message_keys::MASS_HARVEST_SUCCESS)
                    .with("amount", harvested.to_string()),
            );
        }
        if policy.debug {
            info!(
                player = %ctx.player_name,
                harvested,
                found = plan.candidates_found,
                center = %plan.center,
                "Mass harvest finished"
            );
        }

        Ok(HarvestReport {
            mode: HarvestMode::Mass,
            harvested,
            candidates_found: plan.candidates_found,
            planned: plan.len(),
            rewarded,
        })
    }
}
