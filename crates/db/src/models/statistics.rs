//! Daily per-(city, data-center) health snapshot entities.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use hostfleet_core::types::{DbId, Timestamp};

/// A row from the `host_statistics` table.
///
/// Unique per (city, data-center, date); re-aggregation overwrites the
/// counts in place.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatisticsSnapshot {
    pub id: DbId,
    pub city_id: DbId,
    pub datacenter_id: DbId,
    pub stat_date: NaiveDate,
    pub total_hosts: i32,
    pub active_hosts: i32,
    pub inactive_hosts: i32,
    pub maintenance_hosts: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Per-location status counts produced by one GROUP BY over the fleet.
///
/// Locations with zero hosts never appear; absence of a row means absence
/// of inventory.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationStatusCounts {
    pub city_id: DbId,
    pub datacenter_id: DbId,
    pub total_hosts: i32,
    pub active_hosts: i32,
    pub inactive_hosts: i32,
    pub maintenance_hosts: i32,
}
