//! Periodic driving of the three engines.
//!
//! Three independent loops, each spawned as a long-lived Tokio task and
//! stopped via a [`CancellationToken`]. Awaiting the job inside its own
//! loop guarantees at-most-one-in-flight per job kind; the loops run
//! concurrently with each other.
//!
//! Cadences: rotation every 8 hours, sweep every hour, statistics daily
//! at 00:00 UTC. A failed run is logged and waits for the next tick --
//! there is no mid-cycle retry.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::rotation::RotationEngine;
use crate::statistics::StatisticsAggregator;
use crate::sweep::SweepEngine;

/// Default rotation cadence: every 8 hours.
pub const DEFAULT_ROTATION_EVERY: Duration = Duration::from_secs(8 * 60 * 60);

/// Default sweep cadence: hourly.
pub const DEFAULT_SWEEP_EVERY: Duration = Duration::from_secs(60 * 60);

/// Cadences for the interval-driven jobs. Statistics is fixed at
/// midnight UTC and has no knob here.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub rotation_every: Duration,
    pub sweep_every: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rotation_every: DEFAULT_ROTATION_EVERY,
            sweep_every: DEFAULT_SWEEP_EVERY,
        }
    }
}

/// Owns the three engines and spawns their loops.
pub struct Scheduler {
    rotation: RotationEngine,
    sweep: SweepEngine,
    statistics: StatisticsAggregator,
    config: ScheduleConfig,
}

impl Scheduler {
    pub fn new(
        rotation: RotationEngine,
        sweep: SweepEngine,
        statistics: StatisticsAggregator,
        config: ScheduleConfig,
    ) -> Self {
        Self {
            rotation,
            sweep,
            statistics,
            config,
        }
    }

    /// Spawn the three job loops. They run until `cancel` is triggered;
    /// in-flight work finishes on its own (cooperative shutdown).
    pub fn spawn(self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        vec![
            tokio::spawn(run_rotation_loop(
                self.rotation,
                self.config.rotation_every,
                cancel.clone(),
            )),
            tokio::spawn(run_sweep_loop(
                self.sweep,
                self.config.sweep_every,
                cancel.clone(),
            )),
            tokio::spawn(run_statistics_loop(self.statistics, cancel.clone())),
        ]
    }
}

/// Rotation loop: every `every`, starting one period after spawn.
async fn run_rotation_loop(engine: RotationEngine, every: Duration, cancel: CancellationToken) {
    tracing::info!(every_secs = every.as_secs(), "Rotation job started");
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval fires immediately; consume that so the first rotation
    // waits a full period instead of re-keying the fleet at boot.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rotation job stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = engine.rotate_all().await {
                    tracing::error!(error = %e, "Rotation run failed");
                }
            }
        }
    }
}

/// Sweep loop: every `every`, first run immediately after spawn.
async fn run_sweep_loop(engine: SweepEngine, every: Duration, cancel: CancellationToken) {
    tracing::info!(every_secs = every.as_secs(), "Sweep job started");
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Sweep job stopping");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = engine.sweep().await {
                    tracing::error!(error = %e, "Sweep run failed");
                }
            }
        }
    }
}

/// Statistics loop: fires at every UTC midnight.
async fn run_statistics_loop(engine: StatisticsAggregator, cancel: CancellationToken) {
    tracing::info!("Statistics job started");
    loop {
        let wait = duration_until_next_midnight(Utc::now());
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Statistics job stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                let today = Utc::now().date_naive();
                if let Err(e) = engine.aggregate(today).await {
                    tracing::error!(error = %e, "Statistics run failed");
                }
            }
        }
    }
}

/// Time remaining until the next UTC midnight. At exactly midnight this
/// is a full day, so each boundary fires once.
pub fn duration_until_next_midnight(now: DateTime<Utc>) -> Duration {
    let next = (now.date_naive() + chrono::Days::new(1))
        .and_time(NaiveTime::MIN)
        .and_utc();
    (next - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_midnight_from_midday() {
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            duration_until_next_midnight(now),
            Duration::from_secs(12 * 60 * 60)
        );
    }

    #[test]
    fn next_midnight_from_midnight_is_a_full_day() {
        let now = DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            duration_until_next_midnight(now),
            Duration::from_secs(24 * 60 * 60)
        );
    }

    #[test]
    fn next_midnight_just_before_boundary() {
        let now = DateTime::parse_from_rfc3339("2024-05-01T23:59:59Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(duration_until_next_midnight(now), Duration::from_secs(1));
    }
}
