use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::SIGNUP_BONUS_POINTS;
use crate::models::timestamp_to_rfc3339;
use crate::security::{generate_salt, hash_password};

/// Account role. Assigned at registration from the operator allowlist,
/// never inferred from the email contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
}

/// One claimed task, kept on the user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTask {
    pub task_id: String,
    /// Unix timestamp of the claim
    pub completed_at: i64,
}

/// User record stored in redb
///
/// Uses Unix timestamps for compact storage with bincode. The password is
/// stored as a salted HMAC-SHA256 digest, never in the clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub full_name: String,
    /// Login key, normalized to lowercase
    pub email: String,
    pub mobile: String,
    pub password_salt: String,
    pub password_hash: String,
    pub role: UserRole,
    /// Point balance. Invariant: never negative; every debit re-checks the
    /// balance inside the same write transaction.
    pub points: i64,
    pub completed_tasks: Vec<CompletedTask>,
    /// Share code handed to invitees; equals the user's own id
    pub referral_code: String,
    pub referral_count: u32,
    pub referred_by: Option<String>,
    pub created_at: i64,
}

impl UserRecord {
    /// Build a new account with the signup bonus already applied
    pub fn new(
        full_name: String,
        email: String,
        mobile: String,
        password: &str,
        role: UserRole,
        referred_by: Option<String>,
        now: i64,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        let salt = generate_salt();
        let digest = hash_password(password, &salt);

        Self {
            referral_code: id.clone(),
            id,
            full_name,
            email,
            mobile,
            password_salt: salt,
            password_hash: digest,
            role,
            points: SIGNUP_BONUS_POINTS,
            completed_tasks: Vec::new(),
            referral_count: 0,
            referred_by,
            created_at: now,
        }
    }

    /// Whether this user already holds a completion record for the task
    pub fn has_completed(&self, task_id: &str) -> bool {
        self.completed_tasks.iter().any(|c| c.task_id == task_id)
    }

    /// Minimal syntactic email check: one '@' with characters on both sides
    pub fn validate_email(email: &str) -> bool {
        let mut parts = email.splitn(2, '@');
        match (parts.next(), parts.next()) {
            (Some(local), Some(domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            _ => false,
        }
    }
}

/// Public user view for API responses. Carries no credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub role: UserRole,
    pub points: i64,
    pub completed_tasks: Vec<CompletedTaskView>,
    pub referral_code: String,
    pub referral_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    pub created_at: String,
}

/// Completion record as rendered in API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTaskView {
    pub task_id: String,
    pub completed_at: String,
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            full_name: record.full_name.clone(),
            email: record.email.clone(),
            mobile: record.mobile.clone(),
            role: record.role,
            points: record.points,
            completed_tasks: record
                .completed_tasks
                .iter()
                .map(|c| CompletedTaskView {
                    task_id: c.task_id.clone(),
                    completed_at: timestamp_to_rfc3339(c.completed_at),
                })
                .collect(),
            referral_code: record.referral_code.clone(),
            referral_count: record.referral_count,
            referred_by: record.referred_by.clone(),
            created_at: timestamp_to_rfc3339(record.created_at),
        }
    }
}
