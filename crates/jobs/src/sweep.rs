//! Fleet-wide reachability sweep.
//!
//! Loads a point-in-time snapshot of the fleet, fans the prober out with
//! bounded concurrency, and reconciles each outcome into the host's
//! status. Per-host failures never abort the sweep; the job's result is
//! the summary.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use hostfleet_core::probe::ProbeOutcome;
use hostfleet_core::status::reconcile;
use hostfleet_db::models::host::Host;
use hostfleet_db::repositories::HostRepo;

use crate::error::JobError;
use crate::probe::Prober;

/// Default worker-pool size for concurrent probes.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Tuning for one sweep engine.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Maximum in-flight probes. Bounds process/socket usage against a
    /// large fleet.
    pub concurrency: usize,
    /// Network wait handed to each probe.
    pub net_timeout: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            net_timeout: crate::probe::DEFAULT_NET_TIMEOUT,
        }
    }
}

/// Outcome counts for one sweep.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SweepSummary {
    /// Hosts probed (the whole snapshot, regardless of outcome).
    pub probed: usize,
    /// Probes that reported the host reachable.
    pub reachable: usize,
    /// Status transitions written.
    pub transitions: usize,
    /// Per-host faults: spawn failures and status-write errors.
    /// Timeouts are ordinary unreachable outcomes, not faults.
    pub failed: usize,
}

/// Probes the fleet and reconciles host status.
pub struct SweepEngine {
    pool: PgPool,
    prober: Arc<dyn Prober>,
    config: SweepConfig,
}

impl SweepEngine {
    pub fn new(pool: PgPool, prober: Arc<dyn Prober>, config: SweepConfig) -> Self {
        Self {
            pool,
            prober,
            config,
        }
    }

    /// Run one full sweep. Completes only after every dispatched probe
    /// has finished or timed out; there is no early cancellation of
    /// stragglers.
    pub async fn sweep(&self) -> Result<SweepSummary, JobError> {
        let hosts = HostRepo::list(&self.pool).await?;
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut probes: JoinSet<(Host, ProbeOutcome)> = JoinSet::new();

        for host in hosts {
            let semaphore = Arc::clone(&semaphore);
            let prober = Arc::clone(&self.prober);
            let net_timeout = self.config.net_timeout;
            probes.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore is never closed while probes run.
                    Err(_) => return (host, ProbeOutcome::failed("probe pool closed")),
                };
                let outcome = prober.probe(&host.ip_address, net_timeout).await;
                (host, outcome)
            });
        }

        let mut summary = SweepSummary::default();
        while let Some(joined) = probes.join_next().await {
            let (host, outcome) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!(error = %e, "Probe task panicked");
                    summary.failed += 1;
                    continue;
                }
            };
            self.reconcile_host(&host, &outcome, &mut summary).await;
        }

        tracing::info!(
            probed = summary.probed,
            reachable = summary.reachable,
            transitions = summary.transitions,
            failed = summary.failed,
            "Sweep complete",
        );
        Ok(summary)
    }

    /// Fold one probe outcome into host state and the summary.
    async fn reconcile_host(&self, host: &Host, outcome: &ProbeOutcome, summary: &mut SweepSummary) {
        summary.probed += 1;
        if outcome.reachable {
            summary.reachable += 1;
        }

        if let Some(error) = &outcome.error {
            if outcome.is_timeout() {
                tracing::debug!(host = %host.name, ip = %host.ip_address, "Probe timed out");
            } else {
                tracing::warn!(
                    host = %host.name,
                    ip = %host.ip_address,
                    error = %error,
                    "Probe failed to execute",
                );
                summary.failed += 1;
                return;
            }
        }

        let current = match host.status() {
            Some(status) => status,
            None => {
                tracing::error!(
                    host = %host.name,
                    status_id = host.status_id,
                    "Host has unknown status id; skipping reconciliation",
                );
                summary.failed += 1;
                return;
            }
        };

        let Some(next) = reconcile(current, outcome.reachable) else {
            return;
        };

        match HostRepo::update_status(&self.pool, host.id, next).await {
            Ok(true) => {
                summary.transitions += 1;
                tracing::info!(
                    host = %host.name,
                    ip = %host.ip_address,
                    from = current.as_str(),
                    to = next.as_str(),
                    latency_ms = outcome.latency_ms,
                    "Host status transition",
                );
            }
            Ok(false) => {
                // Host deleted between snapshot and write; nothing to do.
                tracing::debug!(host = %host.name, "Host vanished mid-sweep");
            }
            Err(e) => {
                tracing::error!(host = %host.name, error = %e, "Status write failed");
                summary.failed += 1;
            }
        }
    }
}
