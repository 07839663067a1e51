//! The scripted harvest session.
//!
//! One player walks a freshly planted field: a plain harvest, a click too
//! soon after it, a bare-handed attempt, a sneaking mass harvest, and a
//! click on a node that was just replanted. Every outcome is logged.

use std::sync::Arc;
use std::time::Duration;

use cropplus_core::{HarvestService, HostPorts, InteractionOutcome};
use cropplus_harvest::{ConfigurationView, NodeLookup};
use cropplus_types::{
    BlockPos, Capability, CooldownKind, CropKind, ItemId, PlayerContext, PlayerId,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::SandboxError;
use crate::memory::{LoggingInbox, MemoryBank, MemoryFarm, MemoryInventory};

/// Rows of the planted field, repeated across its width.
const FIELD_ROWS: [CropKind; 4] = [
    CropKind::Wheat,
    CropKind::Carrots,
    CropKind::Potatoes,
    CropKind::Beetroots,
];

/// Half-extent of the planted field.
const FIELD_RADIUS: i32 = 3;

/// Totals for a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Clicks replayed.
    pub steps: usize,
    /// Nodes harvested across all clicks.
    pub harvested: u32,
    /// Clicks that were denied.
    pub denied: usize,
    /// The player's final balance.
    pub earned: Decimal,
    /// Notification lines the player saw.
    pub messages: usize,
}

/// A single-player host around a [`HarvestService`].
#[derive(Debug)]
pub struct Session {
    service: HarvestService,
    world: String,
    farm: MemoryFarm,
    inventory: MemoryInventory,
    bank: MemoryBank,
    inbox: LoggingInbox,
    summary: SessionSummary,
}

impl Session {
    /// Build a session with an empty farm in `world`.
    pub fn new(service: HarvestService, config: Arc<dyn ConfigurationView>, world: &str) -> Self {
        Self {
            service,
            world: world.to_owned(),
            farm: MemoryFarm::default(),
            inventory: MemoryInventory::with_capacity(36 * 64),
            bank: MemoryBank::default(),
            inbox: LoggingInbox::new(config),
            summary: SessionSummary::default(),
        }
    }

    fn at(&self, x: i32, z: i32) -> BlockPos {
        BlockPos::new(self.world.as_str(), x, 64, z)
    }

    /// Replay one right-click at `(x, z)` and log what happened.
    fn click(
        &mut self,
        step: &str,
        ctx: &PlayerContext,
        x: i32,
        z: i32,
    ) -> Result<InteractionOutcome, SandboxError> {
        let pos = self.at(x, z);
        let Some(site) = self.farm.site_at(&pos) else {
            warn!(step, pos = %pos, "Nothing planted here");
            return Ok(InteractionOutcome::Ignored);
        };

        let mut ports = HostPorts {
            world: &mut self.farm,
            inventory: &mut self.inventory,
            economy: Some(&mut self.bank),
            messages: &mut self.inbox,
        };
        let outcome = self.service.handle_interaction(ctx, &site, &mut ports)?;
        self.summary.steps = self.summary.steps.saturating_add(1);

        match &outcome {
            InteractionOutcome::Ignored => info!(step, "Not a harvest"),
            InteractionOutcome::Denied(decision) => {
                self.summary.denied = self.summary.denied.saturating_add(1);
                let audit = serde_json::to_string(decision)?;
                info!(
                    step,
                    decision = %audit,
                    cancelled = outcome.cancels_native(),
                    "Harvest denied"
                );
            }
            InteractionOutcome::MassCoolingDown { remaining_ms } => {
                self.summary.denied = self.summary.denied.saturating_add(1);
                info!(step, remaining_ms, "Mass harvest cooling down");
            }
            InteractionOutcome::Harvested(report) => {
                self.summary.harvested = self.summary.harvested.saturating_add(report.harvested);
                info!(
                    step,
                    mode = ?report.mode,
                    harvested = report.harvested,
                    found = report.candidates_found,
                    rewarded = %report.rewarded,
                    "Harvest applied"
                );
            }
        }
        Ok(outcome)
    }

    /// Wait out the acting player's global cooldown.
    async fn pause_for_cooldown(&self, ctx: &PlayerContext) -> Result<(), SandboxError> {
        let secs = self
            .service
            .engine()
            .policy(ctx)?
            .cooldowns
            .effective_secs(CooldownKind::Global);
        if secs > 0.0 {
            let wait = Duration::try_from_secs_f64(secs)
                .unwrap_or_default()
                .saturating_add(Duration::from_millis(50));
            info!(wait_ms = wait.as_millis(), "Waiting out the global cooldown");
            tokio::time::sleep(wait).await;
        }
        Ok(())
    }

    /// Plant the field and replay the script.
    pub async fn run(mut self) -> Result<SessionSummary, SandboxError> {
        let center = self.at(0, 0);
        self.farm.plant_field(&center, FIELD_RADIUS, &FIELD_ROWS);
        for kind in FIELD_ROWS {
            self.inventory.give(kind.seed_item_name(), 1);
        }
        info!(ripe = self.farm.ripe_count(), "Field planted");

        let player = PlayerContext::new(
            PlayerId::new(),
            "Farmer",
            self.world.as_str(),
            ItemId::new("IRON_HOE"),
        )
        .with_capability(Capability::UseHarvest);

        self.click("single harvest", &player, 0, 0)?;
        self.click("second click too soon", &player, 1, 0)?;
        self.pause_for_cooldown(&player).await?;

        let mut bare = player.clone();
        bare.held_tool = ItemId::air();
        self.click("bare hands", &bare, -3, -3)?;

        self.click("sneaking mass harvest", &player.clone().sneaking(true), 2, 2)?;
        self.click("replanted node", &player, 0, 0)?;

        self.service.on_subject_disconnect(player.player_id);
        self.summary.earned = self.bank.balance(player.player_id);
        self.summary.messages = self.inbox.lines().len();

        info!(
            ripe_left = self.farm.ripe_count(),
            dropped = self.farm.dropped().len(),
            wheat = self.inventory.count("WHEAT"),
            seeds = self.inventory.count("WHEAT_SEEDS"),
            "Session finished"
        );
        Ok(self.summary)
    }
}
