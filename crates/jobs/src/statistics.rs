//! Daily health statistics aggregation.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use hostfleet_db::repositories::{HostRepo, StatisticsRepo};

use crate::error::JobError;

/// Outcome counts for one aggregation run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatsSummary {
    /// Snapshot rows created or overwritten.
    pub snapshots: usize,
    /// Locations whose upsert failed.
    pub failed: usize,
}

/// Computes per-(city, data-center) health counts and upserts snapshots.
pub struct StatisticsAggregator {
    pool: PgPool,
}

impl StatisticsAggregator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Aggregate the fleet into snapshots for `stat_date`.
    ///
    /// Idempotent per key: re-running overwrites counts so the snapshot
    /// reflects the fleet at the time of the last run. Data-centers with
    /// zero hosts are skipped entirely -- no all-zero rows.
    pub async fn aggregate(&self, stat_date: NaiveDate) -> Result<StatsSummary, JobError> {
        let locations = HostRepo::status_counts_by_location(&self.pool).await?;
        let mut summary = StatsSummary::default();

        for counts in &locations {
            match StatisticsRepo::upsert(&self.pool, counts, stat_date).await {
                Ok(snapshot) => {
                    summary.snapshots += 1;
                    tracing::debug!(
                        city_id = snapshot.city_id,
                        datacenter_id = snapshot.datacenter_id,
                        total = snapshot.total_hosts,
                        active = snapshot.active_hosts,
                        inactive = snapshot.inactive_hosts,
                        maintenance = snapshot.maintenance_hosts,
                        "Statistics snapshot upserted",
                    );
                }
                Err(e) => {
                    tracing::error!(
                        city_id = counts.city_id,
                        datacenter_id = counts.datacenter_id,
                        error = %e,
                        "Snapshot upsert failed",
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            stat_date = %stat_date,
            snapshots = summary.snapshots,
            failed = summary.failed,
            "Statistics aggregation complete",
        );
        Ok(summary)
    }
}
