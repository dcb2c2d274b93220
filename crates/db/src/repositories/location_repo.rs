//! Repository for the `cities` and `datacenters` tables.
//!
//! The core only reads these; creation exists for the provisioning layer
//! and tests.

use sqlx::PgPool;

use hostfleet_core::types::DbId;

use crate::models::location::{City, CreateCity, CreateDataCenter, DataCenter};

/// Column list for `cities` queries.
const CITY_COLUMNS: &str = "id, name, code, created_at, updated_at";

/// Column list for `datacenters` queries.
const DC_COLUMNS: &str = "id, name, code, city_id, address, created_at, updated_at";

/// Read (and provisioning-only write) access to cities and data-centers.
pub struct LocationRepo;

impl LocationRepo {
    /// Insert a new city.
    pub async fn create_city(pool: &PgPool, input: &CreateCity) -> Result<City, sqlx::Error> {
        let query = format!(
            "INSERT INTO cities (name, code) VALUES ($1, $2) RETURNING {CITY_COLUMNS}"
        );
        sqlx::query_as::<_, City>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .fetch_one(pool)
            .await
    }

    /// Insert a new data-center.
    pub async fn create_datacenter(
        pool: &PgPool,
        input: &CreateDataCenter,
    ) -> Result<DataCenter, sqlx::Error> {
        let query = format!(
            "INSERT INTO datacenters (name, code, city_id, address)
             VALUES ($1, $2, $3, COALESCE($4, ''))
             RETURNING {DC_COLUMNS}"
        );
        sqlx::query_as::<_, DataCenter>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .bind(input.city_id)
            .bind(&input.address)
            .fetch_one(pool)
            .await
    }

    /// List all cities ordered by name.
    pub async fn list_cities(pool: &PgPool) -> Result<Vec<City>, sqlx::Error> {
        let query = format!("SELECT {CITY_COLUMNS} FROM cities ORDER BY name ASC");
        sqlx::query_as::<_, City>(&query).fetch_all(pool).await
    }

    /// List all data-centers ordered by city then name.
    pub async fn list_datacenters(pool: &PgPool) -> Result<Vec<DataCenter>, sqlx::Error> {
        let query = format!("SELECT {DC_COLUMNS} FROM datacenters ORDER BY city_id, name ASC");
        sqlx::query_as::<_, DataCenter>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the data-centers of one city.
    pub async fn list_datacenters_by_city(
        pool: &PgPool,
        city_id: DbId,
    ) -> Result<Vec<DataCenter>, sqlx::Error> {
        let query = format!(
            "SELECT {DC_COLUMNS} FROM datacenters WHERE city_id = $1 ORDER BY name ASC"
        );
        sqlx::query_as::<_, DataCenter>(&query)
            .bind(city_id)
            .fetch_all(pool)
            .await
    }
}
