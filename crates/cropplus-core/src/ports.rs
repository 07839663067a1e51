//! Collaborator ports implemented by the host.
//!
//! The engine never mutates world or inventory state itself. After a
//! decision is `Allowed`, the [`HarvestExecutor`](crate::HarvestExecutor)
//! drives these ports to apply it.

use cropplus_harvest::{NodeLookup, SeedInventory};
use cropplus_types::{BlockPos, CropKind, DropLocation, ItemId, ItemStack, Notification, PlayerId};
use rust_decimal::Decimal;

/// World access: node lookup plus the mutations a harvest needs.
pub trait BlockInspector: NodeLookup {
    /// The items `pos` would drop when broken with `tool`.
    fn drops(&self, pos: &BlockPos, tool: &ItemId) -> Vec<ItemStack>;

    /// Replace the node with empty space.
    fn clear(&mut self, pos: &BlockPos);

    /// Replant `kind` at `pos` at growth stage zero.
    fn replant(&mut self, pos: &BlockPos, kind: CropKind);

    /// Drop `items` in the world. `crop` is the harvested node, used when
    /// `location` is [`DropLocation::Crop`].
    fn drop_items(&mut self, location: DropLocation, crop: &BlockPos, items: &[ItemStack]);
}

/// The acting player's inventory.
pub trait InventoryPort: SeedInventory {
    /// Remove one unit of `item`. Returns whether one was removed.
    fn remove_one(&mut self, item: &ItemId) -> bool;

    /// Add `stack`, returning whatever did not fit.
    fn add_or_overflow(&mut self, stack: ItemStack) -> Option<ItemStack>;
}

/// Failures reported by an economy provider.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// No economy provider is installed or it is offline.
    #[error("economy provider unavailable")]
    Unavailable,

    /// The provider refused the transaction.
    #[error("deposit rejected: {reason}")]
    Rejected {
        /// Provider-supplied reason.
        reason: String,
    },
}

/// Economy provider.
pub trait EconomyPort {
    /// Whether a provider is installed and usable.
    fn is_available(&self) -> bool;

    /// Credit `amount` to `player`.
    fn deposit(&mut self, player: PlayerId, amount: Decimal) -> Result<(), EconomyError>;

    /// Currency formatting for messages.
    fn format(&self, amount: Decimal) -> String {
        amount.to_string()
    }
}

/// Delivery of keyed, parameterised notifications to a player.
pub trait MessagePort {
    /// Deliver `notification` to `player`.
    fn send(&mut self, player: PlayerId, notification: &Notification);
}

/// The ports for one interaction, borrowed from the host.
pub struct HostPorts<'a> {
    /// World access.
    pub world: &'a mut dyn BlockInspector,
    /// The acting player's inventory.
    pub inventory: &'a mut dyn InventoryPort,
    /// Economy provider, if one is installed.
    pub economy: Option<&'a mut dyn EconomyPort>,
    /// Notification delivery.
    pub messages: &'a mut dyn MessagePort,
}

impl core::fmt::Debug for HostPorts<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostPorts")
            .field("economy", &self.economy.is_some())
            .finish_non_exhaustive()
    }
}
