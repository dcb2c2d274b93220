//! Error types for credential encryption and decryption.

/// Failure modes of the credential cipher.
///
/// `Integrity` and `Format` are deliberately distinct: a token that fails
/// authentication (tampered, or encrypted under a different key) is a
/// security-relevant event, while a token that is not even a well-formed
/// versioned blob points at data corruption in the surrounding store.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// The authentication tag did not verify. Covers tampered tokens and
    /// tokens produced under a different key.
    #[error("credential token failed authentication")]
    Integrity,

    /// The token is not a well-formed versioned blob.
    #[error("malformed credential token: {0}")]
    Format(String),

    /// The configured encryption key could not be used.
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    /// Encryption itself failed. With a valid key this does not happen in
    /// practice; treated as systemic by callers.
    #[error("credential encryption failed")]
    Encrypt,
}
