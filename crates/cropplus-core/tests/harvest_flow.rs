//! End-to-end harvest flows through [`HarvestService`].
//!
//! The host side is an in-memory world, inventory, bank, and inbox. Time
//! comes from a [`ManualClock`] so cooldown expiry is deterministic.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use cropplus_core::{
    BlockInspector, EconomyError, EconomyPort, HarvestMode, HarvestService, HostPorts,
    InteractionOutcome, InventoryPort, MessagePort, YamlConfigView,
};
use cropplus_harvest::{CooldownStore, ManualClock, NodeLookup, SeedInventory};
use cropplus_types::{
    BlockPos, Capability, CooldownKind, CropKind, CropSite, DisabledReason, DropLocation,
    HarvestDecision, ItemId, ItemStack, Notification, PlayerContext, PlayerId, message_keys,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const CONFIG: &str = r#"
settings:
  enabled: true
tool-restrictions:
  enabled: true
  allow-bare-hands: false
  allowed-tools:
    - ANY_HOE
cooldowns:
  enabled: true
  global: 0.5
  per-crop: 0
  mass-harvest: 5
mass-harvesting:
  enabled: true
  require-sneak: true
  default-range: 3
  max-range: 5
  max-crops: 50
economy:
  enabled: true
  reward-per-crop: 0.1
  mass-harvest-bonus: 1.5
messages:
  prefix: "[CropPlus] "
  crop-harvested: "Harvested {amount} {crop}"
  mass-harvest-success: "Mass harvested {amount} crops"
"#;

const SEEDS_OPTIONAL: &str = r#"
harvesting:
  require-seeds: false
  auto-collect:
    enabled: false
    drop-location: FEET
"#;

// ---------------------------------------------------------------------------
// In-memory host
// ---------------------------------------------------------------------------

#[derive(Default)]
struct World {
    nodes: BTreeMap<BlockPos, CropSite>,
    dropped: Vec<(DropLocation, ItemStack)>,
}

impl World {
    fn plant_ripe(&mut self, pos: BlockPos, kind: CropKind) {
        self.nodes.insert(pos.clone(), CropSite::ripe(pos, kind));
    }
}

impl NodeLookup for World {
    fn site_at(&self, pos: &BlockPos) -> Option<CropSite> {
        self.nodes.get(pos).cloned()
    }
}

impl BlockInspector for World {
    fn drops(&self, pos: &BlockPos, _tool: &ItemId) -> Vec<ItemStack> {
        self.nodes
            .get(pos)
            .and_then(|site| site.kind)
            .map(|kind| {
                vec![
                    ItemStack::new(ItemId::new(kind.block_name()), 1),
                    ItemStack::new(kind.seed_item(), 1),
                ]
            })
            .unwrap_or_default()
    }

    fn clear(&mut self, pos: &BlockPos) {
        self.nodes.remove(pos);
    }

    fn replant(&mut self, pos: &BlockPos, kind: CropKind) {
        self.nodes
            .insert(pos.clone(), CropSite::crop(pos.clone(), kind, 0));
    }

    fn drop_items(&mut self, location: DropLocation, _crop: &BlockPos, items: &[ItemStack]) {
        self.dropped
            .extend(items.iter().cloned().map(|stack| (location, stack)));
    }
}

struct Inventory {
    items: BTreeMap<ItemId, u32>,
    capacity: u32,
}

impl Inventory {
    fn with(items: &[(&str, u32)]) -> Self {
        Self {
            items: items
                .iter()
                .map(|(name, n)| (ItemId::new(name), *n))
                .collect(),
            capacity: 1_000,
        }
    }

    fn count(&self, name: &str) -> u32 {
        self.items.get(&ItemId::new(name)).copied().unwrap_or(0)
    }

    fn total(&self) -> u32 {
        self.items.values().sum()
    }
}

impl SeedInventory for Inventory {
    fn has_item(&self, item: &ItemId) -> bool {
        self.items.get(item).is_some_and(|n| *n > 0)
    }
}

impl InventoryPort for Inventory {
    fn remove_one(&mut self, item: &ItemId) -> bool {
        match self.items.get_mut(item) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    fn add_or_overflow(&mut self, stack: ItemStack) -> Option<ItemStack> {
        let room = self.capacity.saturating_sub(self.total());
        let fits = stack.amount.min(room);
        *self.items.entry(stack.item.clone()).or_insert(0) += fits;
        let left = stack.amount - fits;
        (left > 0).then(|| ItemStack::new(stack.item, left))
    }
}

#[derive(Default)]
struct Bank {
    balances: BTreeMap<PlayerId, Decimal>,
    offline: bool,
}

impl EconomyPort for Bank {
    fn is_available(&self) -> bool {
        !self.offline
    }

    fn deposit(&mut self, player: PlayerId, amount: Decimal) -> Result<(), EconomyError> {
        *self.balances.entry(player).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }
}

#[derive(Default)]
struct Inbox(Vec<Notification>);

impl Inbox {
    fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|n| n.key.as_str()).collect()
    }

    fn last(&self, key: &str) -> Option<&Notification> {
        self.0.iter().rev().find(|n| n.key == key)
    }
}

impl MessagePort for Inbox {
    fn send(&mut self, _player: PlayerId, notification: &Notification) {
        self.0.push(notification.clone());
    }
}

struct Host {
    world: World,
    inventory: Inventory,
    bank: Bank,
    inbox: Inbox,
}

impl Host {
    fn new() -> Self {
        Self {
            world: World::default(),
            inventory: Inventory::with(&[("WHEAT_SEEDS", 1)]),
            bank: Bank::default(),
            inbox: Inbox::default(),
        }
    }

    fn ports(&mut self) -> HostPorts<'_> {
        HostPorts {
            world: &mut self.world,
            inventory: &mut self.inventory,
            economy: Some(&mut self.bank),
            messages: &mut self.inbox,
        }
    }
}

fn service() -> (HarvestService, ManualClock) {
    service_with(Arc::new(YamlConfigView::parse(CONFIG).unwrap()))
}

fn service_with(config: Arc<YamlConfigView>) -> (HarvestService, ManualClock) {
    let clock = ManualClock::starting_at(10_000);
    let store = Arc::new(CooldownStore::new(clock.clone()));
    (HarvestService::new(config, store), clock)
}

fn farmer(tool: &str) -> PlayerContext {
    PlayerContext::new(PlayerId::new(), "Steve", "world", ItemId::new(tool))
        .with_capability(Capability::UseHarvest)
}

fn at(x: i32, z: i32) -> BlockPos {
    BlockPos::new("world", x, 64, z)
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

#[test]
fn iron_hoe_on_ripe_wheat_is_allowed() {
    let (service, _) = service();
    let host = Host::new();
    let site = CropSite::ripe(at(0, 0), CropKind::Wheat);

    let decision = service
        .evaluate_harvest(&farmer("IRON_HOE"), &site, &host.inventory)
        .unwrap();
    let multipliers = decision.multipliers().unwrap();
    assert!((multipliers.drop - 1.0).abs() < f64::EPSILON);
    assert!((multipliers.economy - 1.0).abs() < f64::EPSILON);
}

#[test]
fn repeat_within_global_cooldown_is_denied() {
    let (service, clock) = service();
    let host = Host::new();
    let ctx = farmer("IRON_HOE");
    let site = CropSite::ripe(at(0, 0), CropKind::Wheat);

    assert!(service.evaluate_harvest(&ctx, &site, &host.inventory).unwrap().is_allowed());
    clock.advance(Duration::from_millis(100));
    let denied = service.evaluate_harvest(&ctx, &site, &host.inventory).unwrap();
    assert_eq!(
        denied,
        HarvestDecision::DeniedCooldown {
            kind: CooldownKind::Global,
            remaining_ms: 400,
        }
    );

    clock.advance(Duration::from_millis(400));
    assert!(service.evaluate_harvest(&ctx, &site, &host.inventory).unwrap().is_allowed());
}

#[test]
fn permission_is_checked_before_tool() {
    let (service, _) = service();
    let host = Host::new();
    let ctx = PlayerContext::new(PlayerId::new(), "Alex", "world", ItemId::new("DIAMOND_SWORD"));
    let site = CropSite::ripe(at(0, 0), CropKind::Wheat);

    let decision = service.evaluate_harvest(&ctx, &site, &host.inventory).unwrap();
    assert_eq!(decision, HarvestDecision::DeniedPermission);
}

#[test]
fn reloaded_config_reaches_the_next_evaluation() {
    let config = Arc::new(YamlConfigView::parse(CONFIG).unwrap());
    let (service, clock) = service_with(Arc::clone(&config));
    let host = Host::new();
    let ctx = farmer("IRON_HOE");
    let site = CropSite::ripe(at(0, 0), CropKind::Wheat);
    assert!(service.evaluate_harvest(&ctx, &site, &host.inventory).unwrap().is_allowed());

    let path = std::env::temp_dir().join(format!("cropplus-reload-{}.yaml", std::process::id()));
    let diamond_only = CONFIG.replace("    - ANY_HOE", "    - DIAMOND_HOE");
    std::fs::write(&path, diamond_only).unwrap();
    config.reload_from(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    clock.advance(Duration::from_secs(1));
    let denied = service.evaluate_harvest(&ctx, &site, &host.inventory).unwrap();
    assert_eq!(
        denied,
        HarvestDecision::DeniedTool {
            required_tool: String::from("diamond hoe"),
            bare_hands: false,
        }
    );
}

#[test]
fn plan_is_capped_at_max_crops() {
    let (service, _) = service();
    let mut world = World::default();
    for x in -4..4 {
        for z in -5..5 {
            world.plant_ripe(at(x, z), CropKind::Carrots);
        }
    }
    assert_eq!(world.nodes.len(), 80);

    let plan = service
        .plan_mass_harvest(&farmer("IRON_HOE"), &at(0, 0), 5, &world)
        .unwrap();
    assert_eq!(plan.len(), 50);
    assert_eq!(plan.candidates_found, 80);
    assert!(plan.is_truncated());
}

#[test]
fn reward_uses_configured_rate() {
    let (service, _) = service();
    let reward = service.compute_reward(4, 2.0, 1.0).unwrap();
    assert_eq!(reward.amount, dec!(0.8));
    assert_eq!(reward.base_rate, dec!(0.1));
}

// ---------------------------------------------------------------------------
// Full interactions
// ---------------------------------------------------------------------------

#[test]
fn single_harvest_collects_replants_and_pays() {
    let (service, _) = service();
    let mut host = Host::new();
    let ctx = farmer("IRON_HOE");
    host.world.plant_ripe(at(0, 0), CropKind::Wheat);
    let site = host.world.site_at(&at(0, 0)).unwrap();

    let outcome = service.handle_interaction(&ctx, &site, &mut host.ports()).unwrap();
    let InteractionOutcome::Harvested(report) = outcome else {
        panic!("expected a harvest, got {outcome:?}");
    };
    assert_eq!(report.mode, HarvestMode::Single);
    assert_eq!(report.harvested, 1);
    assert_eq!(report.rewarded, dec!(0.1));

    assert_eq!(host.inventory.count("WHEAT"), 1);
    assert_eq!(host.inventory.count("WHEAT_SEEDS"), 1);
    assert_eq!(host.world.site_at(&at(0, 0)).unwrap().growth_stage, 0);
    assert!(host.world.dropped.is_empty());
    assert_eq!(host.bank.balances.get(&ctx.player_id), Some(&dec!(0.1)));

    let harvested = host.inbox.last(message_keys::CROP_HARVESTED).unwrap();
    assert_eq!(harvested.params.get("amount").map(String::as_str), Some("1"));
    assert_eq!(harvested.params.get("crop").map(String::as_str), Some("wheat"));
    assert!(host.inbox.keys().contains(&message_keys::ECONOMY_REWARD));
}

#[test]
fn sneaking_harvests_the_area_and_pays_the_bonus() {
    let (service, clock) = service();
    let mut host = Host::new();
    let ctx = farmer("IRON_HOE").sneaking(true);
    for x in -2..=2 {
        host.world.plant_ripe(at(x, 0), CropKind::Wheat);
    }
    let site = host.world.site_at(&at(0, 0)).unwrap();

    let outcome = service.handle_interaction(&ctx, &site, &mut host.ports()).unwrap();
    let InteractionOutcome::Harvested(report) = outcome else {
        panic!("expected a harvest, got {outcome:?}");
    };
    assert_eq!(report.mode, HarvestMode::Mass);
    assert_eq!(report.harvested, 5);
    assert_eq!(report.candidates_found, 5);
    // 5 * 0.1 per crop, plus floor(5 * 1.5) * 0.1 bonus.
    assert_eq!(report.rewarded, dec!(1.2));
    assert_eq!(host.bank.balances.get(&ctx.player_id), Some(&dec!(1.2)));

    let success = host.inbox.last(message_keys::MASS_HARVEST_SUCCESS).unwrap();
    assert_eq!(success.params.get("amount").map(String::as_str), Some("5"));
    assert!(host.world.nodes.values().all(|s| s.growth_stage == 0));
    assert_eq!(service.cooldowns().len(CooldownKind::Mass), 1);

    // A second sneaking click within the mass cooldown harvests nothing.
    clock.advance(Duration::from_secs(1));
    host.world.plant_ripe(at(0, 3), CropKind::Wheat);
    let next = host.world.site_at(&at(0, 3)).unwrap();
    let blocked = service.handle_interaction(&ctx, &next, &mut host.ports()).unwrap();
    assert!(matches!(blocked, InteractionOutcome::MassCoolingDown { .. }));
    assert!(host.world.site_at(&at(0, 3)).unwrap().is_fully_grown());
    assert_eq!(host.inbox.keys().last(), Some(&message_keys::COOLDOWN_ACTIVE));

    service.on_subject_disconnect(ctx.player_id);
    assert_eq!(service.cooldowns().len(CooldownKind::Mass), 0);
    assert_eq!(service.cooldowns().len(CooldownKind::Global), 0);
}

#[test]
fn full_inventory_drops_at_player() {
    let (service, _) = service();
    let mut host = Host::new();
    host.inventory.capacity = 1;
    let ctx = farmer("IRON_HOE");
    host.world.plant_ripe(at(0, 0), CropKind::Wheat);
    let site = host.world.site_at(&at(0, 0)).unwrap();

    service.handle_interaction(&ctx, &site, &mut host.ports()).unwrap();
    assert_eq!(host.world.dropped.len(), 2);
    assert!(host.world.dropped.iter().all(|(loc, _)| *loc == DropLocation::Player));
    assert!(host.inbox.keys().contains(&message_keys::INVENTORY_FULL));
    // The held seed was still used to replant.
    assert_eq!(host.world.site_at(&at(0, 0)).unwrap().growth_stage, 0);
}

#[test]
fn replants_for_free_when_seeds_are_not_required() {
    let yaml = format!("{CONFIG}{SEEDS_OPTIONAL}");
    let (service, _) = service_with(Arc::new(YamlConfigView::parse(&yaml).unwrap()));
    let mut host = Host::new();
    host.inventory = Inventory::with(&[]);
    host.world.plant_ripe(at(0, 0), CropKind::Wheat);
    let site = host.world.site_at(&at(0, 0)).unwrap();

    let outcome = service
        .handle_interaction(&farmer("IRON_HOE"), &site, &mut host.ports())
        .unwrap();
    assert!(matches!(
        outcome,
        InteractionOutcome::Harvested(ref r) if r.harvested == 1
    ));
    let replanted = host.world.site_at(&at(0, 0)).unwrap();
    assert_eq!(replanted.kind, Some(CropKind::Wheat));
    assert_eq!(replanted.growth_stage, 0);
    assert_eq!(host.world.dropped.len(), 2);
    assert!(host.world.dropped.iter().all(|(loc, _)| *loc == DropLocation::Feet));
    assert_eq!(host.inventory.total(), 0);
}

#[test]
fn no_economy_provider_pays_nothing() {
    let (service, _) = service();
    let mut host = Host::new();
    host.bank.offline = true;
    host.world.plant_ripe(at(0, 0), CropKind::Wheat);
    let site = host.world.site_at(&at(0, 0)).unwrap();

    let outcome = service
        .handle_interaction(&farmer("IRON_HOE"), &site, &mut host.ports())
        .unwrap();
    assert!(matches!(
        outcome,
        InteractionOutcome::Harvested(ref r) if r.rewarded == Decimal::ZERO
    ));
    assert!(host.bank.balances.is_empty());
    assert!(!host.inbox.keys().contains(&message_keys::ECONOMY_REWARD));
}

#[test]
fn bone_meal_and_unripe_crops_pass_through() {
    let (service, _) = service();
    let mut host = Host::new();
    let site = CropSite::crop(at(0, 0), CropKind::Wheat, 3);

    let ignored = service
        .handle_interaction(&farmer("BONE_MEAL"), &site, &mut host.ports())
        .unwrap();
    assert_eq!(ignored, InteractionOutcome::Ignored);
    assert!(!ignored.cancels_native());

    let unripe = service
        .handle_interaction(&farmer("IRON_HOE"), &site, &mut host.ports())
        .unwrap();
    assert_eq!(
        unripe,
        InteractionOutcome::Denied(HarvestDecision::DeniedDisabled {
            reason: DisabledReason::NotFullyGrown,
        })
    );
    assert!(!unripe.cancels_native());
    assert!(host.inbox.0.is_empty());
}

#[test]
fn bare_hands_are_denied_with_message() {
    let (service, _) = service();
    let mut host = Host::new();
    let site = CropSite::ripe(at(0, 0), CropKind::Wheat);

    let outcome = service
        .handle_interaction(&farmer("AIR"), &site, &mut host.ports())
        .unwrap();
    assert!(!outcome.cancels_native());
    assert_eq!(host.inbox.keys(), vec![message_keys::BARE_HANDS_NOT_ALLOWED]);
}
