use redb::TableDefinition;

/// Users table: user_id (UUID) -> UserRecord (serialized)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Email index: lowercased email -> user_id
/// Backs the duplicate-email check at registration and the login lookup
pub const EMAILS: TableDefinition<&str, &str> = TableDefinition::new("emails");

/// Task catalog: task_id (UUID) -> TaskRecord (serialized)
pub const TASKS: TableDefinition<&str, &[u8]> = TableDefinition::new("tasks");

/// Withdrawal requests: withdrawal_id (UUID) -> WithdrawalRecord (serialized)
pub const WITHDRAWALS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("withdrawals");

/// Sessions: token -> SessionRecord (serialized)
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// In-progress verification timers: "user_id/task_id" -> started_at
pub const TASK_STARTS: TableDefinition<&str, i64> = TableDefinition::new("task_starts");

/// Store metadata (schema version)
pub const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Key of the schema version entry in META
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Composite key for TASK_STARTS
pub fn task_start_key(user_id: &str, task_id: &str) -> String {
    format!("{}/{}", user_id, task_id)
}
