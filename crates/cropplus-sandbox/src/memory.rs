//! In-memory implementations of the host ports.
//!
//! The farm is a map of block positions to crop sites, the inventory is a
//! capacity-bounded item count, the bank keeps per-player balances, and the
//! inbox renders every notification through the configured templates and
//! logs it.

use std::collections::BTreeMap;
use std::sync::Arc;

use cropplus_core::{
    BlockInspector, EconomyError, EconomyPort, InventoryPort, MessagePort, messages,
};
use cropplus_harvest::{ConfigurationView, NodeLookup, SeedInventory};
use cropplus_types::{
    BlockPos, CropKind, CropSite, DropLocation, ItemId, ItemStack, Notification, PlayerId,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Farm
// ---------------------------------------------------------------------------

/// A flat world of crop nodes.
#[derive(Debug, Default)]
pub struct MemoryFarm {
    nodes: BTreeMap<BlockPos, CropSite>,
    dropped: Vec<(DropLocation, BlockPos, ItemStack)>,
}

impl MemoryFarm {
    /// Place `site` at its own position, replacing whatever was there.
    pub fn place(&mut self, site: CropSite) {
        self.nodes.insert(site.pos.clone(), site);
    }

    /// Plant a square field of ripe crops with half-extent `radius` around
    /// `center`, cycling through `kinds` row by row.
    pub fn plant_field(&mut self, center: &BlockPos, radius: i32, kinds: &[CropKind]) {
        let mut rows = kinds.iter().copied().cycle();
        for dx in radius.saturating_neg()..=radius {
            let Some(kind) = rows.next() else {
                return;
            };
            for dz in radius.saturating_neg()..=radius {
                if let Some(pos) = center.offset(dx, 0, dz) {
                    self.place(CropSite::ripe(pos, kind));
                }
            }
        }
    }

    /// Number of nodes that are ripe right now.
    pub fn ripe_count(&self) -> usize {
        self.nodes.values().filter(|s| s.is_fully_grown()).count()
    }

    /// Items that were dropped in the world instead of collected.
    pub fn dropped(&self) -> &[(DropLocation, BlockPos, ItemStack)] {
        &self.dropped
    }
}

impl NodeLookup for MemoryFarm {
    fn site_at(&self, pos: &BlockPos) -> Option<CropSite> {
        self.nodes.get(pos).cloned()
    }
}

impl BlockInspector for MemoryFarm {
    fn drops(&self, pos: &BlockPos, _tool: &ItemId) -> Vec<ItemStack> {
        let Some(kind) = self.nodes.get(pos).and_then(|s| s.kind) else {
            return Vec::new();
        };
        let produce = ItemStack::new(ItemId::new(kind.block_name()), 1);
        let seed = kind.seed_item();
        if seed.as_str() == kind.block_name() {
            vec![ItemStack::new(seed, 2)]
        } else {
            vec![produce, ItemStack::new(seed, 1)]
        }
    }

    fn clear(&mut self, pos: &BlockPos) {
        self.nodes.remove(pos);
    }

    fn replant(&mut self, pos: &BlockPos, kind: CropKind) {
        self.place(CropSite::crop(pos.clone(), kind, 0));
    }

    fn drop_items(&mut self, location: DropLocation, crop: &BlockPos, items: &[ItemStack]) {
        for stack in items {
            debug!(
                ?location,
                pos = %crop,
                item = %stack.item,
                amount = stack.amount,
                "Item dropped"
            );
            self.dropped.push((location, crop.clone(), stack.clone()));
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A capacity-bounded bag of items.
#[derive(Debug)]
pub struct MemoryInventory {
    items: BTreeMap<ItemId, u32>,
    capacity: u32,
}

impl MemoryInventory {
    /// An empty inventory holding at most `capacity` items in total.
    pub const fn with_capacity(capacity: u32) -> Self {
        Self {
            items: BTreeMap::new(),
            capacity,
        }
    }

    /// Add `amount` of `item`, ignoring capacity.
    pub fn give(&mut self, item: &str, amount: u32) {
        let slot = self.items.entry(ItemId::new(item)).or_insert(0);
        *slot = slot.saturating_add(amount);
    }

    /// How many of `item` are held.
    pub fn count(&self, item: &str) -> u32 {
        self.items.get(&ItemId::new(item)).copied().unwrap_or(0)
    }

    fn total(&self) -> u32 {
        self.items
            .values()
            .fold(0_u32, |acc, n| acc.saturating_add(*n))
    }
}

impl SeedInventory for MemoryInventory {
    fn has_item(&self, item: &ItemId) -> bool {
        self.items.get(item).is_some_and(|n| *n > 0)
    }
}

impl InventoryPort for MemoryInventory {
    fn remove_one(&mut self, item: &ItemId) -> bool {
        match self.items.get_mut(item) {
            Some(n) if *n > 0 => {
                *n = n.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    fn add_or_overflow(&mut self, stack: ItemStack) -> Option<ItemStack> {
        let room = self.capacity.saturating_sub(self.total());
        let fits = stack.amount.min(room);
        if fits > 0 {
            self.give(stack.item.as_str(), fits);
        }
        let left = stack.amount.saturating_sub(fits);
        (left > 0).then(|| ItemStack::new(stack.item, left))
    }
}

// ---------------------------------------------------------------------------
// Bank
// ---------------------------------------------------------------------------

/// Per-player balances.
#[derive(Debug, Default)]
pub struct MemoryBank {
    balances: BTreeMap<PlayerId, Decimal>,
}

impl MemoryBank {
    /// Current balance of `player`.
    pub fn balance(&self, player: PlayerId) -> Decimal {
        self.balances.get(&player).copied().unwrap_or(Decimal::ZERO)
    }
}

impl EconomyPort for MemoryBank {
    fn is_available(&self) -> bool {
        true
    }

    fn deposit(&mut self, player: PlayerId, amount: Decimal) -> Result<(), EconomyError> {
        let balance = self.balances.entry(player).or_insert(Decimal::ZERO);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| EconomyError::Rejected {
                reason: "balance overflow".to_owned(),
            })?;
        Ok(())
    }

    fn format(&self, amount: Decimal) -> String {
        format!("${}", amount.round_dp(2))
    }
}

// ---------------------------------------------------------------------------
// Inbox
// ---------------------------------------------------------------------------

/// Renders and logs notifications, keeping the rendered lines.
#[derive(Debug)]
pub struct LoggingInbox {
    config: Arc<dyn ConfigurationView>,
    lines: Vec<String>,
}

impl LoggingInbox {
    /// An inbox rendering against `config`.
    pub const fn new(config: Arc<dyn ConfigurationView>) -> Self {
        Self {
            config,
            lines: Vec::new(),
        }
    }

    /// Every rendered line so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl MessagePort for LoggingInbox {
    fn send(&mut self, player: PlayerId, notification: &Notification) {
        if let Some(line) = messages::render(self.config.as_ref(), notification) {
            info!(%player, key = %notification.key, "{line}");
            self.lines.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_overflows_past_capacity() {
        let mut inv = MemoryInventory::with_capacity(3);
        inv.give("WHEAT_SEEDS", 1);
        let left = inv.add_or_overflow(ItemStack::new(ItemId::new("WHEAT"), 5));
        assert_eq!(left, Some(ItemStack::new(ItemId::new("WHEAT"), 3)));
        assert_eq!(inv.count("WHEAT"), 2);
        assert!(inv.remove_one(&ItemId::new("WHEAT_SEEDS")));
        assert!(!inv.remove_one(&ItemId::new("WHEAT_SEEDS")));
    }

    #[test]
    fn field_cycles_kinds_by_row() {
        let mut farm = MemoryFarm::default();
        let center = BlockPos::new("world", 0, 64, 0);
        farm.plant_field(&center, 1, &[CropKind::Wheat, CropKind::Carrots]);
        assert_eq!(farm.ripe_count(), 9);
        let kind_at = |x| {
            farm.site_at(&BlockPos::new("world", x, 64, 0))
                .and_then(|s| s.kind)
        };
        assert_eq!(kind_at(-1), Some(CropKind::Wheat));
        assert_eq!(kind_at(0), Some(CropKind::Carrots));
        assert_eq!(kind_at(1), Some(CropKind::Wheat));
    }

    #[test]
    fn self_seeding_crops_drop_only_seed() {
        let mut farm = MemoryFarm::default();
        let pos = BlockPos::new("world", 0, 64, 0);
        farm.place(CropSite::ripe(pos.clone(), CropKind::NetherWart));
        let drops = farm.drops(&pos, &ItemId::air());
        assert_eq!(drops, vec![ItemStack::new(ItemId::new("NETHER_WART"), 2)]);
    }
}
