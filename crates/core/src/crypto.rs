//! Authenticated encryption for host credentials.
//!
//! [`CredentialCipher`] wraps AES-256-GCM behind a small string-in /
//! string-out API. Tokens are versioned, carry the encryption timestamp,
//! and are base64-encoded so the persistence layer can treat them as
//! opaque text.
//!
//! Token layout (before base64):
//!
//! ```text
//! [ version: 1 byte ][ unix seconds: 8 bytes BE ][ nonce: 12 bytes ][ ciphertext || tag ]
//! ```
//!
//! The version and timestamp bytes are bound as associated data, so
//! editing the header invalidates the tag just like editing the
//! ciphertext does.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::CipherError;
use crate::types::Timestamp;

/// Token format version. Bump if the layout ever changes.
const TOKEN_VERSION: u8 = 1;

/// Length of the version + timestamp header.
const HEADER_LEN: usize = 9;

/// AES-GCM nonce length.
const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
const TAG_LEN: usize = 16;

/// Symmetric key length (AES-256).
pub const KEY_LEN: usize = 32;

/// Process-wide credential cipher holding the symmetric key.
///
/// Constructed once at startup from configuration and passed by reference
/// (or `Arc`) to everything that encrypts or decrypts credentials. There
/// is no ambient global key.
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose key material, even in debug output.
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

impl CredentialCipher {
    /// Build a cipher from a raw 32-byte key.
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        Self { cipher }
    }

    /// Build a cipher from a base64-encoded 32-byte key, as loaded from
    /// the environment.
    pub fn from_base64(encoded: &str) -> Result<Self, CipherError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| CipherError::InvalidKey(format!("key is not valid base64: {e}")))?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            CipherError::InvalidKey(format!("key must be {KEY_LEN} bytes, got {}", v.len()))
        })?;
        Ok(Self::new(key))
    }

    /// Encrypt a plaintext secret into an opaque token.
    ///
    /// A fresh random nonce and the current timestamp go into every token,
    /// so two encryptions of the same plaintext never compare equal.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        self.encrypt_at(plaintext, Utc::now())
    }

    /// Encrypt with an explicit timestamp. Split out for tests.
    fn encrypt_at(&self, plaintext: &str, now: Timestamp) -> Result<String, CipherError> {
        let mut header = [0u8; HEADER_LEN];
        header[0] = TOKEN_VERSION;
        header[1..].copy_from_slice(&now.timestamp().to_be_bytes());

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: &header,
                },
            )
            .map_err(|_| CipherError::Encrypt)?;

        let mut blob = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&header);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(blob))
    }

    /// Decrypt a token produced by [`encrypt`](Self::encrypt).
    ///
    /// Returns [`CipherError::Format`] for blobs that are structurally
    /// invalid and [`CipherError::Integrity`] when the tag does not verify
    /// (tampering, or a token from a different key). Never returns garbage
    /// plaintext.
    pub fn decrypt(&self, token: &str) -> Result<String, CipherError> {
        let blob = decode_blob(token)?;
        let (header, rest) = blob.split_at(HEADER_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map_err(|_| CipherError::Integrity)?;

        String::from_utf8(plaintext)
            .map_err(|_| CipherError::Format("decrypted payload is not UTF-8".into()))
    }
}

/// Extract the embedded encryption timestamp without decrypting.
///
/// The timestamp is only authenticated by a successful [`CredentialCipher::
/// decrypt`]; treat this value as informational until the token verifies.
pub fn token_timestamp(token: &str) -> Result<Timestamp, CipherError> {
    let blob = decode_blob(token)?;
    let secs = i64::from_be_bytes(
        blob[1..HEADER_LEN]
            .try_into()
            .expect("header slice is 8 bytes"),
    );
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| CipherError::Format(format!("timestamp {secs} out of range")))
}

/// Base64-decode and structurally validate a token.
fn decode_blob(token: &str) -> Result<Vec<u8>, CipherError> {
    let blob = BASE64
        .decode(token)
        .map_err(|e| CipherError::Format(format!("not valid base64: {e}")))?;
    if blob.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
        return Err(CipherError::Format(format!(
            "token too short: {} bytes",
            blob.len()
        )));
    }
    if blob[0] != TOKEN_VERSION {
        return Err(CipherError::Format(format!(
            "unknown token version {}",
            blob[0]
        )));
    }
    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn cipher() -> CredentialCipher {
        CredentialCipher::new([7u8; KEY_LEN])
    }

    #[test]
    fn round_trip_recovers_plaintext() {
        let c = cipher();
        let token = c.encrypt("s3cr3t-p@ss").expect("encrypt");
        assert_eq!(c.decrypt(&token).expect("decrypt"), "s3cr3t-p@ss");
    }

    #[test]
    fn encrypt_is_nondeterministic() {
        let c = cipher();
        let a = c.encrypt("same plaintext").expect("encrypt");
        let b = c.encrypt("same plaintext").expect("encrypt");
        assert_ne!(a, b, "fresh nonce per call must vary the token");
    }

    #[test]
    fn token_never_contains_plaintext() {
        let c = cipher();
        let token = c.encrypt("hunter2hunter").expect("encrypt");
        assert!(!token.contains("hunter2"));
    }

    #[test]
    fn wrong_key_fails_with_integrity() {
        let token = cipher().encrypt("secret").expect("encrypt");
        let other = CredentialCipher::new([8u8; KEY_LEN]);
        assert_matches!(other.decrypt(&token), Err(CipherError::Integrity));
    }

    #[test]
    fn tampered_ciphertext_fails_with_integrity() {
        let c = cipher();
        let token = c.encrypt("secret").expect("encrypt");
        let mut blob = BASE64.decode(&token).expect("decode");
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let tampered = BASE64.encode(blob);
        assert_matches!(c.decrypt(&tampered), Err(CipherError::Integrity));
    }

    #[test]
    fn tampered_timestamp_fails_with_integrity() {
        let c = cipher();
        let token = c.encrypt("secret").expect("encrypt");
        let mut blob = BASE64.decode(&token).expect("decode");
        blob[5] ^= 0xFF; // inside the AAD-bound header
        let tampered = BASE64.encode(blob);
        assert_matches!(c.decrypt(&tampered), Err(CipherError::Integrity));
    }

    #[test]
    fn garbage_fails_with_format() {
        let c = cipher();
        assert_matches!(c.decrypt("%%% not base64 %%%"), Err(CipherError::Format(_)));
        assert_matches!(c.decrypt(&BASE64.encode(b"short")), Err(CipherError::Format(_)));
    }

    #[test]
    fn unknown_version_fails_with_format() {
        let c = cipher();
        let token = c.encrypt("secret").expect("encrypt");
        let mut blob = BASE64.decode(&token).expect("decode");
        blob[0] = 99;
        assert_matches!(
            c.decrypt(&BASE64.encode(blob)),
            Err(CipherError::Format(_))
        );
    }

    #[test]
    fn token_embeds_encryption_timestamp() {
        let c = cipher();
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let token = c.encrypt_at("secret", at).expect("encrypt");
        assert_eq!(token_timestamp(&token).expect("timestamp"), at);
    }

    #[test]
    fn key_parsing_rejects_bad_input() {
        assert_matches!(
            CredentialCipher::from_base64("!!!"),
            Err(CipherError::InvalidKey(_))
        );
        // Valid base64, wrong length.
        assert_matches!(
            CredentialCipher::from_base64(&BASE64.encode([1u8; 16])),
            Err(CipherError::InvalidKey(_))
        );
        assert!(CredentialCipher::from_base64(&BASE64.encode([1u8; KEY_LEN])).is_ok());
    }
}
