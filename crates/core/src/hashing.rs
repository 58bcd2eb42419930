//! One-way digests and random secret generation.
//!
//! Refresh tokens are only ever persisted as their SHA-256 digest, so a
//! database leak does not expose usable credentials.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated refresh-token secrets (alphanumeric characters).
pub const SECRET_TOKEN_LENGTH: usize = 48;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Generate a random alphanumeric secret of [`SECRET_TOKEN_LENGTH`] characters.
///
/// Drawn from the thread-local CSPRNG.
pub fn generate_secret_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SECRET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
