//! Applying allowed harvests through the host ports.
//!
//! For each allowed site the executor collects drops for the held tool,
//! scales them by the drop multiplier, delivers them (inventory or world),
//! replants or clears the node, and pays the per-crop reward.

use cropplus_harvest::{HarvestError, HarvestPolicy, RewardCalculator};
use cropplus_types::{
    CropKind, CropSite, DropLocation, HarvestMultipliers, ItemStack, Notification, PlayerContext,
    RewardResult, message_keys,
};
use tracing::{debug, info, warn};

use crate::ports::HostPorts;

/// What happened at one harvested site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteHarvest {
    /// Drops after the multiplier.
    pub drops: Vec<ItemStack>,
    /// Some drops did not fit in the inventory and fell at the player.
    pub overflowed: bool,
    /// The node was replanted (otherwise it was cleared).
    pub replanted: bool,
    /// The per-crop reward that was paid, if any.
    pub reward: Option<RewardResult>,
}

/// Drives world, inventory, economy, and message ports for allowed sites.
///
/// All settings come from the [`HarvestPolicy`] resolved for the click.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarvestExecutor;

impl HarvestExecutor {
    /// Harvest one site that has already been allowed.
    pub fn harvest_site(
        ctx: &PlayerContext,
        site: &CropSite,
        kind: CropKind,
        multipliers: &HarvestMultipliers,
        policy: &HarvestPolicy,
        ports: &mut HostPorts<'_>,
    ) -> Result<SiteHarvest, HarvestError> {
        let drops = apply_drop_multiplier(
            ports.world.drops(&site.pos, &ctx.held_tool),
            multipliers.drop,
        );

        let mut overflowed = false;
        if policy.collection.auto_collect {
            for stack in &drops {
                if let Some(leftover) = ports.inventory.add_or_overflow(stack.clone()) {
                    ports
                        .world
                        .drop_items(DropLocation::Player, &site.pos, &[leftover]);
                    overflowed = true;
                }
            }
            if overflowed {
                ports.messages.send(
                    ctx.player_id,
                    &Notification::new(message_keys::INVENTORY_FULL),
                );
            } else if policy.debug {
                ports.messages.send(
                    ctx.player_id,
                    &Notification::new(message_keys::AUTO_COLLECTED),
                );
            }
        } else {
            ports
                .world
                .drop_items(policy.collection.drop_location, &site.pos, &drops);
        }

        // Without the seed requirement a held seed is still spent, but the
        // node is replanted either way.
        let seed = kind.seed_item();
        let replanted = if policy.require_seeds {
            ports.inventory.has_item(&seed) && ports.inventory.remove_one(&seed)
        } else {
            ports.inventory.remove_one(&seed);
            true
        };
        if replanted {
            ports.world.replant(&site.pos, kind);
        } else {
            ports.world.clear(&site.pos);
        }

        let reward = Self::pay(ctx, policy, 1, multipliers.economy, 1.0, ports)?;

        let crop = kind.display_name();
        if policy.debug {
            info!(player = %ctx.player_name, %crop, pos = %site.pos, replanted, "Crop harvested");
        } else {
            debug!(player = %ctx.player_name, %crop, pos = %site.pos, replanted, "Crop harvested");
        }

        Ok(SiteHarvest {
            drops,
            overflowed,
            replanted,
            reward,
        })
    }

    /// Compute and deposit a reward for `crop_count` crops.
    ///
    /// Does nothing when the economy is disabled, no provider is present,
    /// or the amount is zero. Provider failures are logged and swallowed.
    pub fn pay(
        ctx: &PlayerContext,
        policy: &HarvestPolicy,
        crop_count: u32,
        tool_multiplier: f64,
        mass_bonus: f64,
        ports: &mut HostPorts<'_>,
    ) -> Result<Option<RewardResult>, HarvestError> {
        if !policy.economy.enabled {
            return Ok(None);
        }
        let Some(economy) = ports.economy.as_deref_mut() else {
            return Ok(None);
        };
        if !economy.is_available() {
            debug!("Economy provider unavailable, reward skipped");
            return Ok(None);
        }

        let reward = RewardCalculator::from_policy(&policy.economy)?.compute(
            crop_count,
            tool_multiplier,
            mass_bonus,
        )?;
        if !reward.is_payable() {
            return Ok(None);
        }

        if let Err(e) = economy.deposit(ctx.player_id, reward.amount) {
            warn!(player = %ctx.player_name, error = %e, "Economy deposit failed");
            return Ok(None);
        }

        let formatted = economy.format(reward.amount);
        ports.messages.send(
            ctx.player_id,
            &Notification::new(message_keys::ECONOMY_REWARD).with("amount", formatted),
        );
        if policy.debug {
            info!(
                player = %ctx.player_name,
                amount = %reward.amount,
                crops = crop_count,
                "Harvest reward paid"
            );
        }
        Ok(Some(reward))
    }
}

/// Scale each stack by `multiplier`, rounding up. A multiplier of exactly
/// one leaves the drops untouched.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped to u32 range first.
pub fn apply_drop_multiplier(drops: Vec<ItemStack>, multiplier: f64) -> Vec<ItemStack> {
    if (multiplier - 1.0).abs() < f64::EPSILON || !multiplier.is_finite() {
        return drops;
    }
    drops
        .into_iter()
        .map(|stack| {
            let scaled = (f64::from(stack.amount) * multiplier)
                .ceil()
                .clamp(0.0, f64::from(u32::MAX));
            ItemStack::new(stack.item, scaled as u32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use cropplus_types::ItemId;

    use super::*;

    fn stack(name: &str, amount: u32) -> ItemStack {
        ItemStack::new(ItemId::new(name), amount)
    }

    #[test]
    fn multiplier_rounds_up() {
        let out = apply_drop_multiplier(vec![stack("WHEAT", 1), stack("WHEAT_SEEDS", 3)], 1.5);
        assert_eq!(out, vec![stack("WHEAT", 2), stack("WHEAT_SEEDS", 5)]);
    }

    #[test]
    fn unit_multiplier_is_identity() {
        let drops = vec![stack("CARROT", 4)];
        assert_eq!(apply_drop_multiplier(drops.clone(), 1.0), drops);
    }

    #[test]
    fn negative_multiplier_floors_at_zero() {
        assert_eq!(apply_drop_multiplier(vec![stack("POTATO", 2)], -1.0), vec![stack("POTATO", 0)]);
    }
}
