//! Fleet worker binary: wires the cipher, database pool, engines, and
//! scheduler together and runs until interrupted.

mod config;

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostfleet_core::crypto::CredentialCipher;
use hostfleet_jobs::credentials::CredentialStore;
use hostfleet_jobs::probe::PingProber;
use hostfleet_jobs::rotation::RotationEngine;
use hostfleet_jobs::scheduler::{ScheduleConfig, Scheduler};
use hostfleet_jobs::statistics::StatisticsAggregator;
use hostfleet_jobs::sweep::{SweepConfig, SweepEngine};

use crate::config::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostfleet_worker=info,hostfleet_jobs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env()?;

    // Key problems are systemic: nothing can run without the cipher.
    let cipher = Arc::new(
        CredentialCipher::from_base64(&config.encryption_key)
            .context("FLEET_ENCRYPTION_KEY is unusable")?,
    );

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("../../db/migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;
    hostfleet_db::health_check(&pool).await?;

    let store = CredentialStore::new(pool.clone(), Arc::clone(&cipher));
    let rotation = RotationEngine::new(pool.clone(), store);
    let sweep = SweepEngine::new(
        pool.clone(),
        Arc::new(PingProber::new(config.probe_hard_timeout())),
        SweepConfig {
            concurrency: config.sweep_concurrency,
            net_timeout: config.probe_net_timeout(),
        },
    );
    let statistics = StatisticsAggregator::new(pool.clone());

    let scheduler = Scheduler::new(
        rotation,
        sweep,
        statistics,
        ScheduleConfig {
            rotation_every: config.rotation_every(),
            sweep_every: config.sweep_every(),
        },
    );

    let cancel = CancellationToken::new();
    let handles = scheduler.spawn(&cancel);
    tracing::info!("Fleet worker started");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("Shutdown requested; stopping jobs");
    cancel.cancel();
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
