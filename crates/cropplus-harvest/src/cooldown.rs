//! Cooldown tracking for the three independent subject spaces.
//!
//! Each space (player-global, location, player-mass) maps a subject key to
//! the millisecond timestamp of its last permitted use. The store answers
//! "is this still cooling down" and stamps a new use in one atomic step per
//! key: a permitted check re-arms the timer from now, a blocked check
//! leaves the entry untouched.
//!
//! # Concurrency
//!
//! Every space sits behind its own [`Mutex`], so the store is `Send + Sync`
//! and is shared as `Arc<CooldownStore>` between the request path and the
//! background sweeper. No method blocks beyond the short map operation.
//!
//! Zero or negative durations are the caller's business: a disabled
//! cooldown must not reach the store at all.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use cropplus_types::{BlockPos, CooldownKind, CooldownSubject, PlayerId};
use tracing::debug;

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Monotonic millisecond time source.
pub trait Clock: Send + Sync + core::fmt::Debug {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> u64;
}

/// Wall-independent clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start a clock at zero now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for deterministic tests and scripted sessions.
///
/// Clones share the same time, so a test can keep a handle after moving
/// one into a [`CooldownStore`].
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock reading `start_ms`.
    pub fn starting_at(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Move time forward by `by`, saturating at `u64::MAX` milliseconds.
    pub fn advance(&self, by: Duration) {
        let step = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        // fetch_update never fails when the closure always returns Some.
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(step))
            });
    }

    /// Jump to `ms`. Moving backwards is ignored to keep the clock monotonic.
    pub fn set(&self, ms: u64) {
        self.now.fetch_max(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// CooldownStore
// ---------------------------------------------------------------------------

/// Entries removed by one [`CooldownStore::sweep_expired`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Player-global entries removed.
    pub global: usize,
    /// Location entries removed.
    pub location: usize,
    /// Player-mass entries removed.
    pub mass: usize,
}

impl SweepReport {
    /// Entries removed across all spaces.
    pub const fn total(&self) -> usize {
        self.global
            .saturating_add(self.location)
            .saturating_add(self.mass)
    }
}

/// Process-lifetime cooldown state.
#[derive(Debug)]
pub struct CooldownStore {
    global: Mutex<BTreeMap<PlayerId, u64>>,
    location: Mutex<BTreeMap<BlockPos, u64>>,
    mass: Mutex<BTreeMap<PlayerId, u64>>,
    clock: Box<dyn Clock>,
}

impl CooldownStore {
    /// Create an empty store reading time from `clock`.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            global: Mutex::new(BTreeMap::new()),
            location: Mutex::new(BTreeMap::new()),
            mass: Mutex::new(BTreeMap::new()),
            clock: Box::new(clock),
        }
    }

    /// Create an empty store on a [`MonotonicClock`].
    pub fn monotonic() -> Self {
        Self::new(MonotonicClock::new())
    }

    /// Check whether `subject` is still cooling down for `duration_secs`.
    ///
    /// Returns `true` if it is (the caller must not proceed; the entry is
    /// unchanged). Returns `false` if there is no entry or it has expired,
    /// in which case the current time is recorded as the new last use.
    pub fn check_and_record(&self, subject: &CooldownSubject, duration_secs: f64) -> bool {
        let duration = secs_to_ms(duration_secs);
        let now = self.clock.now_ms();
        let cooling = match subject {
            CooldownSubject::Global(player) => stamp(&self.global, *player, now, duration),
            CooldownSubject::Location(pos) => stamp(&self.location, pos.clone(), now, duration),
            CooldownSubject::Mass(player) => stamp(&self.mass, *player, now, duration),
        };
        debug!(
            kind = ?subject.kind(),
            duration_ms = duration,
            cooling,
            "Cooldown checked"
        );
        cooling
    }

    /// Time left before `subject` may act again, without mutating anything.
    pub fn remaining(&self, subject: &CooldownSubject, duration_secs: f64) -> Duration {
        let duration = secs_to_ms(duration_secs);
        let now = self.clock.now_ms();
        let last = self.last_use(subject);
        let left = last.map_or(0, |last| {
            duration.saturating_sub(now.saturating_sub(last))
        });
        Duration::from_millis(left)
    }

    /// Timestamp of the last recorded use of `subject`, in clock milliseconds.
    pub fn last_use(&self, subject: &CooldownSubject) -> Option<u64> {
        match subject {
            CooldownSubject::Global(player) => lock(&self.global).get(player).copied(),
            CooldownSubject::Location(pos) => lock(&self.location).get(pos).copied(),
            CooldownSubject::Mass(player) => lock(&self.mass).get(player).copied(),
        }
    }

    /// Drop a player's global and mass entries. Location entries are
    /// shared by everyone and stay.
    pub fn clear_subject(&self, player: PlayerId) {
        let global = lock(&self.global).remove(&player).is_some();
        let mass = lock(&self.mass).remove(&player).is_some();
        debug!(%player, global, mass, "Cleared player cooldowns");
    }

    /// Remove entries whose last use is older than `max_age`.
    pub fn sweep_expired(&self, max_age: Duration) -> SweepReport {
        let max_age = u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX);
        let cutoff = self.clock.now_ms().saturating_sub(max_age);
        SweepReport {
            global: retain_recent(&self.global, cutoff),
            location: retain_recent(&self.location, cutoff),
            mass: retain_recent(&self.mass, cutoff),
        }
    }

    /// Drop every entry in every space.
    pub fn clear_all(&self) {
        lock(&self.global).clear();
        lock(&self.location).clear();
        lock(&self.mass).clear();
    }

    /// Number of live entries in one space.
    pub fn len(&self, kind: CooldownKind) -> usize {
        match kind {
            CooldownKind::Global => lock(&self.global).len(),
            CooldownKind::Location => lock(&self.location).len(),
            CooldownKind::Mass => lock(&self.mass).len(),
        }
    }

    /// Whether every space is empty.
    pub fn is_empty(&self) -> bool {
        [CooldownKind::Global, CooldownKind::Location, CooldownKind::Mass]
            .into_iter()
            .all(|kind| self.len(kind) == 0)
    }
}

fn lock<K>(table: &Mutex<BTreeMap<K, u64>>) -> std::sync::MutexGuard<'_, BTreeMap<K, u64>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Check-and-stamp on one table, atomically under its lock.
fn stamp<K: Ord>(table: &Mutex<BTreeMap<K, u64>>, key: K, now: u64, duration: u64) -> bool {
    let mut map = lock(table);
    match map.get(&key).copied() {
        Some(last) if now.saturating_sub(last) < duration => true,
        previous => {
            map.insert(key, previous.map_or(now, |last| last.max(now)));
            false
        }
    }
}

fn retain_recent<K: Ord>(table: &Mutex<BTreeMap<K, u64>>, cutoff: u64) -> usize {
    let mut map = lock(table);
    let before = map.len();
    map.retain(|_, last| *last >= cutoff);
    before.saturating_sub(map.len())
}

fn secs_to_ms(secs: f64) -> u64 {
    let duration = Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX);
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
