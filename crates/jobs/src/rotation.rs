//! Fleet-wide credential rotation.

use serde::Serialize;
use sqlx::PgPool;

use hostfleet_core::secret::generate_secret;
use hostfleet_db::repositories::HostRepo;

use crate::credentials::CredentialStore;
use crate::error::JobError;

/// Outcome counts for one rotation run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RotationSummary {
    pub attempted: usize,
    pub rotated: usize,
    pub failed: usize,
}

/// Re-issues every host's credential through the credential store.
pub struct RotationEngine {
    pool: PgPool,
    store: CredentialStore,
}

impl RotationEngine {
    pub fn new(pool: PgPool, store: CredentialStore) -> Self {
        Self { pool, store }
    }

    /// Rotate every host's credential.
    ///
    /// A per-host database failure is recorded in the summary and the run
    /// continues. A systemic failure (cipher/key) aborts immediately --
    /// every remaining host would fail identically.
    pub async fn rotate_all(&self) -> Result<RotationSummary, JobError> {
        let hosts = HostRepo::list(&self.pool).await?;
        let mut summary = RotationSummary::default();

        for host in &hosts {
            summary.attempted += 1;
            let secret = generate_secret();
            match self.store.set_credential(host.id, &secret).await {
                Ok(true) => {
                    summary.rotated += 1;
                    tracing::debug!(host = %host.name, ip = %host.ip_address, "Credential rotated");
                }
                Ok(false) => {
                    tracing::warn!(host = %host.name, "Host vanished before rotation");
                    summary.failed += 1;
                }
                Err(e) if e.is_systemic() => {
                    tracing::error!(error = %e, "Systemic rotation failure; aborting run");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(host = %host.name, error = %e, "Rotation failed for host");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            rotated = summary.rotated,
            failed = summary.failed,
            "Rotation complete",
        );
        Ok(summary)
    }
}
