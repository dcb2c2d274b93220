//! Worker configuration loaded from environment variables.

use std::time::Duration;

use anyhow::Context;

/// Configuration for the fleet worker.
///
/// The encryption key is the one setting with no default: without it no
/// job can run, so startup fails fast instead of limping along.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Base64-encoded 32-byte symmetric key for the credential cipher.
    pub encryption_key: String,
    /// Maximum concurrent probes during a sweep (default: `16`).
    pub sweep_concurrency: usize,
    /// Network wait per probe in seconds (default: `1`).
    pub probe_timeout_secs: u64,
    /// Hard ceiling per probe in seconds (default: `5`).
    pub probe_hard_timeout_secs: u64,
    /// Hours between credential rotations (default: `8`).
    pub rotation_interval_hours: u64,
    /// Minutes between reachability sweeps (default: `60`).
    pub sweep_interval_mins: u64,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                   | Default    |
    /// |---------------------------|------------|
    /// | `DATABASE_URL`            | *required* |
    /// | `FLEET_ENCRYPTION_KEY`    | *required* |
    /// | `SWEEP_CONCURRENCY`       | `16`       |
    /// | `PROBE_TIMEOUT_SECS`      | `1`        |
    /// | `PROBE_HARD_TIMEOUT_SECS` | `5`        |
    /// | `ROTATION_INTERVAL_HOURS` | `8`        |
    /// | `SWEEP_INTERVAL_MINS`     | `60`       |
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let encryption_key = std::env::var("FLEET_ENCRYPTION_KEY")
            .context("FLEET_ENCRYPTION_KEY must be set (base64, 32 bytes)")?;

        Ok(Self {
            database_url,
            encryption_key,
            sweep_concurrency: env_parse("SWEEP_CONCURRENCY", 16)?,
            probe_timeout_secs: env_parse("PROBE_TIMEOUT_SECS", 1)?,
            probe_hard_timeout_secs: env_parse("PROBE_HARD_TIMEOUT_SECS", 5)?,
            rotation_interval_hours: env_parse("ROTATION_INTERVAL_HOURS", 8)?,
            sweep_interval_mins: env_parse("SWEEP_INTERVAL_MINS", 60)?,
        })
    }

    pub fn probe_net_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn probe_hard_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_hard_timeout_secs)
    }

    pub fn rotation_every(&self) -> Duration {
        Duration::from_secs(self.rotation_interval_hours * 60 * 60)
    }

    pub fn sweep_every(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_mins * 60)
    }
}

/// Parse an optional env var, falling back to `default` when unset.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
