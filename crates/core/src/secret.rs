//! Credential generation policy.
//!
//! One policy, shared by the rotation engine and the host-provisioning
//! path: 12 characters drawn uniformly from letters, digits, and a fixed
//! punctuation set, from a cryptographically secure RNG.

use rand::Rng;

/// Generated secret length.
pub const SECRET_LEN: usize = 12;

/// Allowed characters: ASCII letters, digits, and `!@#$%^&*`.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Generate a fresh credential.
///
/// `rand::rng()` is a CSPRNG; predictable output here would be a security
/// defect, not a cosmetic one.
pub fn generate_secret() -> String {
    let mut rng = rand::rng();
    (0..SECRET_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_has_policy_length() {
        assert_eq!(generate_secret().len(), SECRET_LEN);
    }

    #[test]
    fn secret_stays_within_charset() {
        let secret = generate_secret();
        for c in secret.bytes() {
            assert!(
                CHARSET.contains(&c),
                "character {:?} outside the policy charset",
                c as char
            );
        }
    }

    #[test]
    fn consecutive_secrets_differ() {
        // 71^12 possibilities; a collision here means the RNG is broken.
        assert_ne!(generate_secret(), generate_secret());
    }
}
