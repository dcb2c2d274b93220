//! Integration tests for the fleet repository layer.
//!
//! Exercises the repositories against a real database:
//! - Location/host hierarchy creation and listing
//! - Unique constraint on host IP addresses
//! - Disjoint per-host field updates (credential vs status)
//! - Per-location status counts and snapshot upserts

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use hostfleet_core::status::HostStatus;
use hostfleet_db::models::host::CreateHost;
use hostfleet_db::models::location::{CreateCity, CreateDataCenter};
use hostfleet_db::repositories::{HostRepo, LocationRepo, StatisticsRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_city(name: &str, code: &str) -> CreateCity {
    CreateCity {
        name: name.to_string(),
        code: code.to_string(),
    }
}

fn new_datacenter(city_id: i64, name: &str, code: &str) -> CreateDataCenter {
    CreateDataCenter {
        name: name.to_string(),
        code: code.to_string(),
        city_id,
        address: None,
    }
}

fn new_host(datacenter_id: i64, name: &str, ip: &str, status: HostStatus) -> CreateHost {
    CreateHost {
        name: name.to_string(),
        ip_address: ip.to_string(),
        datacenter_id,
        status: Some(status),
        encrypted_credential: "opaque-test-token".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn bootstrap_schema_and_seed(pool: PgPool) {
    hostfleet_db::health_check(&pool).await.unwrap();

    let names: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM host_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    let names: Vec<&str> = names.iter().map(|(n,)| n.as_str()).collect();
    assert_eq!(names, ["active", "inactive", "maintenance"]);
}

// ---------------------------------------------------------------------------
// Hierarchy CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_list_hierarchy(pool: PgPool) {
    let city = LocationRepo::create_city(&pool, &new_city("Shanghai", "SH"))
        .await
        .unwrap();
    let dc = LocationRepo::create_datacenter(&pool, &new_datacenter(city.id, "SH-East", "SHE"))
        .await
        .unwrap();
    assert_eq!(dc.city_id, city.id);
    assert_eq!(dc.address, "");

    let host = HostRepo::create(
        &pool,
        &new_host(dc.id, "web-01", "10.0.0.1", HostStatus::Active),
    )
    .await
    .unwrap();
    assert_eq!(host.status(), Some(HostStatus::Active));

    let found = HostRepo::find_by_id(&pool, host.id).await.unwrap().unwrap();
    assert_eq!(found.ip_address, "10.0.0.1");

    let by_dc = HostRepo::list_by_datacenter(&pool, dc.id).await.unwrap();
    assert_eq!(by_dc.len(), 1);

    let by_city = HostRepo::list_by_city(&pool, city.id).await.unwrap();
    assert_eq!(by_city.len(), 1);
    assert_eq!(by_city[0].id, host.id);

    let cities = LocationRepo::list_cities(&pool).await.unwrap();
    assert_eq!(cities.len(), 1);
    let dcs = LocationRepo::list_datacenters_by_city(&pool, city.id)
        .await
        .unwrap();
    assert_eq!(dcs.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_ip_is_rejected(pool: PgPool) {
    let city = LocationRepo::create_city(&pool, &new_city("Beijing", "BJ"))
        .await
        .unwrap();
    let dc = LocationRepo::create_datacenter(&pool, &new_datacenter(city.id, "BJ-1", "BJ1"))
        .await
        .unwrap();

    HostRepo::create(
        &pool,
        &new_host(dc.id, "a", "192.168.0.1", HostStatus::Active),
    )
    .await
    .unwrap();

    let dup = HostRepo::create(
        &pool,
        &new_host(dc.id, "b", "192.168.0.1", HostStatus::Active),
    )
    .await;
    assert!(dup.is_err(), "second host with the same IP must be rejected");
}

// ---------------------------------------------------------------------------
// Per-host field updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn credential_and_status_updates_are_disjoint(pool: PgPool) {
    let city = LocationRepo::create_city(&pool, &new_city("Chengdu", "CD"))
        .await
        .unwrap();
    let dc = LocationRepo::create_datacenter(&pool, &new_datacenter(city.id, "CD-1", "CD1"))
        .await
        .unwrap();
    let host = HostRepo::create(
        &pool,
        &new_host(dc.id, "db-01", "10.1.0.1", HostStatus::Active),
    )
    .await
    .unwrap();

    let rotated_at = Utc::now();
    assert!(
        HostRepo::update_credential(&pool, host.id, "new-token", rotated_at)
            .await
            .unwrap()
    );
    assert!(HostRepo::update_status(&pool, host.id, HostStatus::Maintenance)
        .await
        .unwrap());

    let after = HostRepo::find_by_id(&pool, host.id).await.unwrap().unwrap();
    // Both updates landed; neither clobbered the other's fields.
    assert_eq!(after.encrypted_credential, "new-token");
    assert_eq!(after.status(), Some(HostStatus::Maintenance));
    assert!(after.credential_rotated_at >= host.credential_rotated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rotation_timestamp_never_goes_backwards(pool: PgPool) {
    let city = LocationRepo::create_city(&pool, &new_city("Xian", "XA"))
        .await
        .unwrap();
    let dc = LocationRepo::create_datacenter(&pool, &new_datacenter(city.id, "XA-1", "XA1"))
        .await
        .unwrap();
    let host = HostRepo::create(
        &pool,
        &new_host(dc.id, "cache-01", "10.2.0.1", HostStatus::Active),
    )
    .await
    .unwrap();

    // A write carrying a stale timestamp still lands the token, but the
    // rotation timestamp holds its ground.
    let stale = Utc::now() - chrono::Duration::hours(1);
    assert!(
        HostRepo::update_credential(&pool, host.id, "stale-token", stale)
            .await
            .unwrap()
    );
    let after = HostRepo::find_by_id(&pool, host.id).await.unwrap().unwrap();
    assert_eq!(after.encrypted_credential, "stale-token");
    assert!(after.credential_rotated_at >= host.credential_rotated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn updates_against_missing_host_report_not_found(pool: PgPool) {
    assert!(!HostRepo::update_status(&pool, 424242, HostStatus::Inactive)
        .await
        .unwrap());
    assert!(
        !HostRepo::update_credential(&pool, 424242, "token", Utc::now())
            .await
            .unwrap()
    );
}

// ---------------------------------------------------------------------------
// Aggregation queries and snapshot upsert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_counts_skip_empty_datacenters(pool: PgPool) {
    let city = LocationRepo::create_city(&pool, &new_city("Shenzhen", "SZ"))
        .await
        .unwrap();
    let dc = LocationRepo::create_datacenter(&pool, &new_datacenter(city.id, "SZ-1", "SZ1"))
        .await
        .unwrap();
    let empty_dc =
        LocationRepo::create_datacenter(&pool, &new_datacenter(city.id, "SZ-2", "SZ2"))
            .await
            .unwrap();

    for (i, status) in [
        HostStatus::Active,
        HostStatus::Active,
        HostStatus::Active,
        HostStatus::Inactive,
        HostStatus::Maintenance,
        HostStatus::Maintenance,
    ]
    .iter()
    .enumerate()
    {
        HostRepo::create(
            &pool,
            &new_host(dc.id, &format!("h-{i}"), &format!("10.3.0.{i}"), *status),
        )
        .await
        .unwrap();
    }

    let counts = HostRepo::status_counts_by_location(&pool).await.unwrap();
    assert_eq!(counts.len(), 1, "empty datacenter must produce no row");
    let row = &counts[0];
    assert_eq!(row.city_id, city.id);
    assert_eq!(row.datacenter_id, dc.id);
    assert_ne!(row.datacenter_id, empty_dc.id);
    assert_eq!(row.total_hosts, 6);
    assert_eq!(row.active_hosts, 3);
    assert_eq!(row.inactive_hosts, 1);
    assert_eq!(row.maintenance_hosts, 2);
    assert_eq!(
        row.active_hosts + row.inactive_hosts + row.maintenance_hosts,
        row.total_hosts
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn snapshot_upsert_is_idempotent(pool: PgPool) {
    let city = LocationRepo::create_city(&pool, &new_city("Hangzhou", "HZ"))
        .await
        .unwrap();
    let dc = LocationRepo::create_datacenter(&pool, &new_datacenter(city.id, "HZ-1", "HZ1"))
        .await
        .unwrap();
    HostRepo::create(
        &pool,
        &new_host(dc.id, "h-0", "10.4.0.1", HostStatus::Active),
    )
    .await
    .unwrap();

    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let counts = HostRepo::status_counts_by_location(&pool).await.unwrap();
    let first = StatisticsRepo::upsert(&pool, &counts[0], date).await.unwrap();
    assert_eq!(first.total_hosts, 1);
    assert_eq!(first.active_hosts, 1);

    // Change the fleet and re-aggregate: same row, new counts.
    HostRepo::create(
        &pool,
        &new_host(dc.id, "h-1", "10.4.0.2", HostStatus::Inactive),
    )
    .await
    .unwrap();
    let counts = HostRepo::status_counts_by_location(&pool).await.unwrap();
    let second = StatisticsRepo::upsert(&pool, &counts[0], date).await.unwrap();

    assert_eq!(second.id, first.id, "upsert must overwrite, not duplicate");
    assert_eq!(second.total_hosts, 2);
    assert_eq!(second.inactive_hosts, 1);

    let for_date = StatisticsRepo::list_for_date(&pool, date).await.unwrap();
    assert_eq!(for_date.len(), 1);

    let found = StatisticsRepo::find(&pool, city.id, dc.id, date)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.total_hosts, 2);
}
