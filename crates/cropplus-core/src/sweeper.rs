//! Periodic cooldown cleanup.
//!
//! The sweeper runs on its own tokio task and removes cooldown entries
//! older than `cooldowns.max-age-seconds` every
//! `cooldowns.sweep-interval-seconds`. It never runs inline with an
//! eligibility check.

use std::sync::Arc;
use std::time::Duration;

use cropplus_harvest::{ConfigurationView, CooldownStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Default pause between sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: i64 = 300;

/// Default age after which an entry is removed.
pub const DEFAULT_MAX_AGE_SECS: i64 = 3600;

/// Sweeper timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSettings {
    /// Pause between sweeps.
    pub interval: Duration,
    /// Entries older than this are removed.
    pub max_age: Duration,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            interval: secs_or(DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_SWEEP_INTERVAL_SECS),
            max_age: secs_or(DEFAULT_MAX_AGE_SECS, DEFAULT_MAX_AGE_SECS),
        }
    }
}

impl SweepSettings {
    /// Read timing from the `cooldowns` section. Non-positive values fall
    /// back to the defaults.
    pub fn from_view(view: &dyn ConfigurationView) -> Self {
        Self {
            interval: secs_or(
                view.get_int("cooldowns.sweep-interval-seconds", DEFAULT_SWEEP_INTERVAL_SECS),
                DEFAULT_SWEEP_INTERVAL_SECS,
            ),
            max_age: secs_or(
                view.get_int("cooldowns.max-age-seconds", DEFAULT_MAX_AGE_SECS),
                DEFAULT_MAX_AGE_SECS,
            ),
        }
    }
}

fn secs_or(value: i64, default: i64) -> Duration {
    let secs = if value > 0 { value } else { default };
    Duration::from_secs(u64::try_from(secs).unwrap_or(0))
}

/// Handle to a running sweeper task.
#[derive(Debug)]
pub struct CooldownSweeper {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl CooldownSweeper {
    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// The first sweep happens one interval after spawning.
    pub fn spawn(store: Arc<CooldownStore>, settings: SweepSettings) -> Self {
        let (shutdown, mut stop) = watch::channel(false);
        let period = settings.interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            info!(
                interval_secs = period.as_secs(),
                max_age_secs = settings.max_age.as_secs(),
                "Cooldown sweeper started"
            );
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = store.sweep_expired(settings.max_age);
                        if report.total() > 0 {
                            info!(
                                global = report.global,
                                location = report.location,
                                mass = report.mass,
                                "Swept expired cooldowns"
                            );
                        } else {
                            debug!("Cooldown sweep found nothing to remove");
                        }
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Cooldown sweeper stopped");
        });

        Self { handle, shutdown }
    }

    /// Signal the loop to stop and wait for it to finish.
    pub async fn stop(self) {
        // The receiver may already be gone if the task ended.
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            debug!(error = %e, "Cooldown sweeper task ended abnormally");
        }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use cropplus_harvest::{ManualClock, StaticConfigView};
    use cropplus_types::{CooldownKind, CooldownSubject, PlayerId};

    use super::*;

    #[test]
    fn settings_from_view_with_defaults() {
        let view = StaticConfigView::new().with("cooldowns.sweep-interval-seconds", 60_i64);
        let settings = SweepSettings::from_view(&view);
        assert_eq!(settings.interval, Duration::from_secs(60));
        assert_eq!(settings.max_age, Duration::from_secs(3600));
    }

    #[test]
    fn non_positive_settings_fall_back() {
        let view = StaticConfigView::new()
            .with("cooldowns.sweep-interval-seconds", 0_i64)
            .with("cooldowns.max-age-seconds", -5_i64);
        assert_eq!(SweepSettings::from_view(&view), SweepSettings::default());
    }

    #[tokio::test]
    async fn sweeps_stale_entries_and_stops() {
        let clock = ManualClock::starting_at(1_000);
        let store = Arc::new(CooldownStore::new(clock.clone()));
        assert!(!store.check_and_record(&CooldownSubject::Global(PlayerId::new()), 0.5));
        assert_eq!(store.len(CooldownKind::Global), 1);

        clock.advance(Duration::from_secs(10));
        let sweeper = CooldownSweeper::spawn(
            Arc::clone(&store),
            SweepSettings {
                interval: Duration::from_millis(10),
                max_age: Duration::from_secs(5),
            },
        );

        for _ in 0..100 {
            if store.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.is_empty());

        sweeper.stop().await;
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let store = Arc::new(CooldownStore::new(ManualClock::starting_at(0)));
        let sweeper = CooldownSweeper::spawn(store, SweepSettings::default());
        assert!(!sweeper.is_finished());
        sweeper.stop().await;
    }
}
