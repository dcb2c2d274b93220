//! Repository for the `host_statistics` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use hostfleet_core::types::DbId;

use crate::models::statistics::{LocationStatusCounts, StatisticsSnapshot};

/// Column list for `host_statistics` queries.
const COLUMNS: &str = "\
    id, city_id, datacenter_id, stat_date, total_hosts, active_hosts, \
    inactive_hosts, maintenance_hosts, created_at, updated_at";

/// Idempotent upsert and reads for daily health snapshots.
pub struct StatisticsRepo;

impl StatisticsRepo {
    /// Upsert one snapshot keyed by (city, data-center, date).
    ///
    /// Re-running the aggregation for the same key overwrites the counts
    /// in place; it never creates a duplicate row.
    pub async fn upsert(
        pool: &PgPool,
        counts: &LocationStatusCounts,
        stat_date: NaiveDate,
    ) -> Result<StatisticsSnapshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO host_statistics \
                (city_id, datacenter_id, stat_date, total_hosts, active_hosts, \
                 inactive_hosts, maintenance_hosts)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (city_id, datacenter_id, stat_date) DO UPDATE SET
                total_hosts = EXCLUDED.total_hosts,
                active_hosts = EXCLUDED.active_hosts,
                inactive_hosts = EXCLUDED.inactive_hosts,
                maintenance_hosts = EXCLUDED.maintenance_hosts,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StatisticsSnapshot>(&query)
            .bind(counts.city_id)
            .bind(counts.datacenter_id)
            .bind(stat_date)
            .bind(counts.total_hosts)
            .bind(counts.active_hosts)
            .bind(counts.inactive_hosts)
            .bind(counts.maintenance_hosts)
            .fetch_one(pool)
            .await
    }

    /// Fetch the snapshot for one (city, data-center, date) key.
    pub async fn find(
        pool: &PgPool,
        city_id: DbId,
        datacenter_id: DbId,
        stat_date: NaiveDate,
    ) -> Result<Option<StatisticsSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM host_statistics \
             WHERE city_id = $1 AND datacenter_id = $2 AND stat_date = $3"
        );
        sqlx::query_as::<_, StatisticsSnapshot>(&query)
            .bind(city_id)
            .bind(datacenter_id)
            .bind(stat_date)
            .fetch_optional(pool)
            .await
    }

    /// List all snapshots for one date, ordered by location.
    pub async fn list_for_date(
        pool: &PgPool,
        stat_date: NaiveDate,
    ) -> Result<Vec<StatisticsSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM host_statistics \
             WHERE stat_date = $1 \
             ORDER BY city_id, datacenter_id"
        );
        sqlx::query_as::<_, StatisticsSnapshot>(&query)
            .bind(stat_date)
            .fetch_all(pool)
            .await
    }
}
