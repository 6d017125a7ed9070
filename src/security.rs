use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::constants::{PASSWORD_SALT_BYTES, SESSION_TOKEN_BYTES};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Password Hashing
// =============================================================================

/// Generate a fresh random salt for a new credential (hex string)
pub fn generate_salt() -> String {
    let mut bytes = [0u8; PASSWORD_SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password with a per-user salt
///
/// Credentials are never stored in the clear: the stored digest is
/// `HMAC-SHA256(key = salt, message = password)`, hex-encoded. The salt is
/// stored alongside the digest, so a leaked database still requires a
/// per-record brute force.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a password attempt against the stored salt and digest
///
/// Uses `Mac::verify_slice` for a constant-time comparison.
pub fn verify_password(password: &str, salt: &str, expected_hex: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(salt.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };
    mac.update(password.as_bytes());

    let expected = match hex::decode(expected_hex) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Stored password digest is not valid hex");
            return false;
        }
    };

    mac.verify_slice(&expected).is_ok()
}

// =============================================================================
// Session Tokens
// =============================================================================

/// Generate an opaque session token (256 bits of OS randomness, hex-encoded)
pub fn generate_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
