//! Job-level error type and the systemic/per-host split.

use hostfleet_core::error::CipherError;

/// Errors surfaced by the engines.
///
/// Per-host failures inside a job are aggregated into the job's summary;
/// only systemic errors (bad key, unusable configuration) abort a job,
/// since retrying the remaining hosts would fail identically.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Configuration the whole job depends on is missing or invalid.
    #[error("systemic configuration error: {0}")]
    Config(String),

    /// A credential failed to encrypt or decrypt.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// A database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Caller-supplied input was rejected.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl JobError {
    /// True when every subsequent host would fail the same way, so the
    /// job should abort instead of continuing host by host.
    pub fn is_systemic(&self) -> bool {
        matches!(self, JobError::Config(_) | JobError::Cipher(_))
    }
}
