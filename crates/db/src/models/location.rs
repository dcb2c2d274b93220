//! City and data-center entities.
//!
//! Both are immutable from the core's perspective; the create DTOs exist
//! for the surrounding provisioning layer and for tests.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hostfleet_core::types::{DbId, Timestamp};

/// A city row from the `cities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct City {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A data-center row from the `datacenters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DataCenter {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub city_id: DbId,
    pub address: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a city.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCity {
    pub name: String,
    pub code: String,
}

/// DTO for creating a data-center.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDataCenter {
    pub name: String,
    pub code: String,
    pub city_id: DbId,
    pub address: Option<String>,
}
