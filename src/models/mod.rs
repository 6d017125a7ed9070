pub mod session;
pub mod task;
pub mod user;
pub mod withdrawal;

pub use session::SessionRecord;
pub use task::{Task, TaskCategory, TaskRecord, TaskStatus};
pub use user::{CompletedTask, User, UserRecord, UserRole};
pub use withdrawal::{PaymentMethod, Withdrawal, WithdrawalRecord, WithdrawalStatus};

use chrono::{DateTime, Utc};

/// Convert a stored Unix timestamp to an RFC3339 string, defaulting to now
/// if out of range
pub fn timestamp_to_rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}
