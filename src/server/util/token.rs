//! Random secrets and their stored digests.

use rand::Rng;
use sha2::{Digest, Sha256};

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                              abcdefghijklmnopqrstuvwxyz\
                              0123456789";
const UPPER_ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of bearer token secrets handed to clients.
pub const BEARER_TOKEN_LENGTH: usize = 48;
/// Length of order tracking ids.
pub const TRACKING_ID_LENGTH: usize = 12;

fn random_from(charset: &[u8], length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..charset.len());
            charset[idx] as char
        })
        .collect()
}

/// Generates a new bearer token secret.
pub fn generate_bearer_token() -> String {
    random_from(ALPHANUMERIC, BEARER_TOKEN_LENGTH)
}

/// Generates an uppercase alphanumeric order tracking id.
pub fn generate_tracking_id() -> String {
    random_from(UPPER_ALPHANUMERIC, TRACKING_ID_LENGTH)
}

/// Generates a numeric one-time code of `length` digits.
pub fn generate_digits(length: usize) -> String {
    random_from(b"0123456789", length)
}

/// SHA-256 hex digest of a token; only digests are persisted.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_tokens_of_expected_shape() {
        let token = generate_bearer_token();
        assert_eq!(token.len(), BEARER_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

        let tracking = generate_tracking_id();
        assert_eq!(tracking.len(), TRACKING_ID_LENGTH);
        assert!(tracking
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        let code = generate_digits(6);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn hashes_deterministically() {
        let hash = hash_token("secret");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("secret"));
        assert_ne!(hash, hash_token("Secret"));
    }
}
