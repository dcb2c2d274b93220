//! Repository for the `hosts` table.
//!
//! Credential (token + rotation timestamp) and status are written by
//! disjoint single-row statements, so a rotation and a sweep touching the
//! same host can both proceed without clobbering each other's fields.

use sqlx::PgPool;

use hostfleet_core::status::HostStatus;
use hostfleet_core::types::{DbId, Timestamp};

use crate::models::host::{CreateHost, Host};
use crate::models::statistics::LocationStatusCounts;

/// Column list for `hosts` queries.
const COLUMNS: &str = "\
    id, name, ip_address, datacenter_id, status_id, \
    encrypted_credential, credential_rotated_at, created_at, updated_at";

/// Provides fleet reads and the per-host field updates the engines need.
pub struct HostRepo;

impl HostRepo {
    // ── Provisioning ─────────────────────────────────────────────────────

    /// Insert a new host. The initial credential token must already be
    /// encrypted; `credential_rotated_at` starts at NOW().
    pub async fn create(pool: &PgPool, input: &CreateHost) -> Result<Host, sqlx::Error> {
        let query = format!(
            "INSERT INTO hosts (name, ip_address, datacenter_id, status_id, encrypted_credential)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Host>(&query)
            .bind(&input.name)
            .bind(&input.ip_address)
            .bind(input.datacenter_id)
            .bind(input.status.unwrap_or(HostStatus::Active).id())
            .bind(&input.encrypted_credential)
            .fetch_one(pool)
            .await
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Find a host by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Host>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hosts WHERE id = $1");
        sqlx::query_as::<_, Host>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the whole fleet, ordered by name. Each engine calls this once
    /// at job start to get its point-in-time host snapshot.
    pub async fn list(pool: &PgPool) -> Result<Vec<Host>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hosts ORDER BY name ASC");
        sqlx::query_as::<_, Host>(&query).fetch_all(pool).await
    }

    /// List hosts in one data-center.
    pub async fn list_by_datacenter(
        pool: &PgPool,
        datacenter_id: DbId,
    ) -> Result<Vec<Host>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hosts WHERE datacenter_id = $1 ORDER BY name ASC"
        );
        sqlx::query_as::<_, Host>(&query)
            .bind(datacenter_id)
            .fetch_all(pool)
            .await
    }

    /// List hosts across all data-centers of one city.
    pub async fn list_by_city(pool: &PgPool, city_id: DbId) -> Result<Vec<Host>, sqlx::Error> {
        let query = format!(
            "SELECT h.id, h.name, h.ip_address, h.datacenter_id, h.status_id, \
                    h.encrypted_credential, h.credential_rotated_at, h.created_at, h.updated_at \
             FROM hosts h \
             JOIN datacenters d ON d.id = h.datacenter_id \
             WHERE d.city_id = $1 \
             ORDER BY h.name ASC"
        );
        sqlx::query_as::<_, Host>(&query)
            .bind(city_id)
            .fetch_all(pool)
            .await
    }

    // ── Engine writes ────────────────────────────────────────────────────

    /// Write a new credential token and rotation timestamp in one
    /// statement (no torn writes). `GREATEST` keeps the rotation
    /// timestamp monotonically non-decreasing even under clock skew.
    ///
    /// Returns `false` when the host no longer exists.
    pub async fn update_credential(
        pool: &PgPool,
        id: DbId,
        token: &str,
        rotated_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE hosts \
             SET encrypted_credential = $2, \
                 credential_rotated_at = GREATEST(credential_rotated_at, $3), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(rotated_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write a new status. Returns `false` when the host no longer exists.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: HostStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE hosts SET status_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Aggregation ──────────────────────────────────────────────────────

    /// Count hosts by status per (city, data-center) in one pass.
    /// Data-centers with no hosts produce no row.
    pub async fn status_counts_by_location(
        pool: &PgPool,
    ) -> Result<Vec<LocationStatusCounts>, sqlx::Error> {
        sqlx::query_as::<_, LocationStatusCounts>(
            "SELECT d.city_id, h.datacenter_id, \
                    COUNT(*)::INT AS total_hosts, \
                    COUNT(*) FILTER (WHERE h.status_id = $1)::INT AS active_hosts, \
                    COUNT(*) FILTER (WHERE h.status_id = $2)::INT AS inactive_hosts, \
                    COUNT(*) FILTER (WHERE h.status_id = $3)::INT AS maintenance_hosts \
             FROM hosts h \
             JOIN datacenters d ON d.id = h.datacenter_id \
             GROUP BY d.city_id, h.datacenter_id \
             ORDER BY d.city_id, h.datacenter_id",
        )
        .bind(HostStatus::Active.id())
        .bind(HostStatus::Inactive.id())
        .bind(HostStatus::Maintenance.id())
        .fetch_all(pool)
        .await
    }
}
