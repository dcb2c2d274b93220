//! Database layer: entity models and sqlx repositories for the fleet.
//!
//! Repositories are unit structs with static async methods taking a
//! `&PgPool`. Migrations live at `db/migrations` in the workspace root.

pub mod models;
pub mod repositories;

use sqlx::PgPool;

/// Verify database connectivity with a trivial query.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
