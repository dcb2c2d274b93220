//! Credential store: the only path that reads or writes host credentials.
//!
//! Wraps the cipher and the host repository so that token + rotation
//! timestamp always change together, and decryption failures always reach
//! the caller instead of degrading into "no password".

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;

use hostfleet_core::crypto::CredentialCipher;
use hostfleet_core::secret::generate_secret;
use hostfleet_core::types::DbId;
use hostfleet_db::models::host::Host;
use hostfleet_db::repositories::HostRepo;

use crate::error::JobError;

/// Per-host encrypted credential access.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    pool: PgPool,
    cipher: Arc<CredentialCipher>,
}

impl CredentialStore {
    pub fn new(pool: PgPool, cipher: Arc<CredentialCipher>) -> Self {
        Self { pool, cipher }
    }

    /// Encrypt `plaintext` and store token + rotation timestamp for the
    /// host in one statement. Empty secrets are rejected.
    ///
    /// Returns `Ok(false)` when the host no longer exists.
    pub async fn set_credential(&self, host_id: DbId, plaintext: &str) -> Result<bool, JobError> {
        if plaintext.is_empty() {
            return Err(JobError::Validation("credential must not be empty".into()));
        }
        let token = self.cipher.encrypt(plaintext)?;
        let updated = HostRepo::update_credential(&self.pool, host_id, &token, Utc::now()).await?;
        Ok(updated)
    }

    /// Decrypt a host's stored credential.
    ///
    /// Cipher errors propagate unchanged: a corrupted or tampered token is
    /// fatal to this read, never an empty credential.
    pub fn get_credential(&self, host: &Host) -> Result<String, JobError> {
        Ok(self.cipher.decrypt(&host.encrypted_credential)?)
    }

    /// Generate a policy-conformant secret and its encrypted token, for
    /// the host-provisioning path. The plaintext is returned so it can be
    /// handed to the operator exactly once.
    pub fn issue_credential(&self) -> Result<(String, String), JobError> {
        let secret = generate_secret();
        let token = self.cipher.encrypt(&secret)?;
        Ok((secret, token))
    }
}
