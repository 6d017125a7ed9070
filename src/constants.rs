/// Points granted to every new account at registration
pub const SIGNUP_BONUS_POINTS: i64 = 200;

/// Points credited to the referrer for each verified signup
pub const REFERRAL_BONUS_POINTS: i64 = 500;

/// Minimum withdrawal amount in PKR
pub const MIN_WITHDRAWAL_RS: i64 = 1000;

/// Fixed conversion rate: 10 points = Rs. 1
pub const POINTS_PER_RUPEE: i64 = 10;

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// Random bytes in a session token (hex-encoded to 64 chars)
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Random bytes in a password salt
pub const PASSWORD_SALT_BYTES: usize = 16;

// =============================================================================
// Error Messages
// =============================================================================

/// Generic credential failure message. Shared by unknown-email and
/// wrong-password paths so the response does not leak account existence.
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Error message for a registration attempt with mismatched passwords
pub const ERR_PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Error message for an invalid email address
pub const ERR_INVALID_EMAIL: &str = "Invalid email address";
