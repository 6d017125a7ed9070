use axum::extract::Path;
use axum::http::HeaderMap;
use axum::{extract::State, Json};
use chrono::Utc;
use redb::{ReadableTable, ReadableTableMetadata};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::db::{decode, encode, tables};
use crate::error::{AppError, Result};
use crate::models::{
    SessionRecord, Task, TaskCategory, TaskRecord, User, UserRecord, Withdrawal,
    WithdrawalRecord, WithdrawalStatus,
};
use crate::routes::session::authenticate_admin;
use crate::routes::validation::validate_new_task;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub category: TaskCategory,
    pub points: i64,
    pub link: String,
    #[serde(rename = "timerSeconds")]
    pub timer_seconds: u32,
}

#[derive(Debug, Deserialize)]
pub struct ResolveWithdrawalRequest {
    /// Target status: APPROVED or REJECTED
    pub status: WithdrawalStatus,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Platform statistics response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub total_users: u64,
    pub total_task_completions: u64,
    /// Sum of approved payouts in PKR
    pub total_payouts_rs: i64,
    pub active_tasks: u64,
    pub pending_withdrawals: u64,
    pub database_size_bytes: u64,
    pub database_size_human: String,
}

/// Format bytes into human-readable string
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// List all registered users (public views, no credential material)
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<User>>> {
    authenticate_admin(&state, &headers).await?;

    let db = state.db.clone();
    let records = tokio::task::spawn_blocking(move || -> Result<Vec<UserRecord>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::USERS)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, v) = entry?;
            records.push(decode(v.value())?);
        }
        records.sort_by(|a: &UserRecord, b: &UserRecord| a.created_at.cmp(&b.created_at));
        Ok(records)
    })
    .await??;

    Ok(Json(records.iter().map(User::from).collect()))
}

/// Hard-delete a user
///
/// Removes the user record, the email index entry, any live sessions, and
/// any in-progress task timers in one transaction. Withdrawal records are
/// kept as the audit trail; their denormalized display name survives the
/// deletion.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>> {
    authenticate_admin(&state, &headers).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut users = write_txn.open_table(tables::USERS)?;
            let user: UserRecord = users
                .remove(user_id.as_str())?
                .map(|b| decode(b.value()))
                .transpose()?
                .ok_or(AppError::UserNotFound)?;

            let mut emails = write_txn.open_table(tables::EMAILS)?;
            emails.remove(user.email.as_str())?;

            let mut sessions = write_txn.open_table(tables::SESSIONS)?;
            let mut stale_tokens = Vec::new();
            for entry in sessions.iter()? {
                let (k, v) = entry?;
                let session: SessionRecord = decode(v.value())?;
                if session.user_id == user_id {
                    stale_tokens.push(k.value().to_string());
                }
            }
            for token in stale_tokens {
                sessions.remove(token.as_str())?;
            }

            let mut starts = write_txn.open_table(tables::TASK_STARTS)?;
            let prefix = format!("{}/", user_id);
            let mut stale_starts = Vec::new();
            for entry in starts.iter()? {
                let (k, _) = entry?;
                if k.value().starts_with(&prefix) {
                    stale_starts.push(k.value().to_string());
                }
            }
            for key in stale_starts {
                starts.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;

        tracing::info!("Admin deleted user {}", user_id);
        Ok(())
    })
    .await??;

    Ok(Json(DeleteResponse { success: true }))
}

/// List the full task catalog, including INACTIVE entries
pub async fn list_all_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>> {
    authenticate_admin(&state, &headers).await?;

    let db = state.db.clone();
    let records = tokio::task::spawn_blocking(move || -> Result<Vec<TaskRecord>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::TASKS)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, v) = entry?;
            records.push(decode(v.value())?);
        }
        records.sort_by(|a: &TaskRecord, b: &TaskRecord| {
            a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
        });
        Ok(records)
    })
    .await??;

    Ok(Json(records.iter().map(Task::from).collect()))
}

/// Create a new catalog entry
pub async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<Json<Task>> {
    authenticate_admin(&state, &headers).await?;
    validate_new_task(&payload.title, payload.points, &payload.link)?;

    let db = state.db.clone();
    let record = tokio::task::spawn_blocking(move || -> Result<TaskRecord> {
        let now = Utc::now().timestamp();
        let record = TaskRecord::new(
            payload.title.trim().to_string(),
            payload.description.trim().to_string(),
            payload.category,
            payload.points,
            payload.link.trim().to_string(),
            payload.timer_seconds,
            now,
        );

        let write_txn = db.begin_write()?;
        {
            let mut tasks = write_txn.open_table(tables::TASKS)?;
            let bytes = encode(&record)?;
            tasks.insert(record.id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        tracing::info!("Admin created task {} ({} points)", record.id, record.points);
        Ok(record)
    })
    .await??;

    Ok(Json(Task::from(&record)))
}

/// Hard-delete a catalog entry and any in-progress timers for it
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>> {
    authenticate_admin(&state, &headers).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut tasks = write_txn.open_table(tables::TASKS)?;
            if tasks.remove(task_id.as_str())?.is_none() {
                return Err(AppError::TaskNotFound);
            }

            let mut starts = write_txn.open_table(tables::TASK_STARTS)?;
            let suffix = format!("/{}", task_id);
            let mut stale = Vec::new();
            for entry in starts.iter()? {
                let (k, _) = entry?;
                if k.value().ends_with(&suffix) {
                    stale.push(k.value().to_string());
                }
            }
            for key in stale {
                starts.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;

        tracing::info!("Admin deleted task {}", task_id);
        Ok(())
    })
    .await??;

    Ok(Json(DeleteResponse { success: true }))
}

/// List every withdrawal request, newest first
pub async fn list_withdrawals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Withdrawal>>> {
    authenticate_admin(&state, &headers).await?;

    let db = state.db.clone();
    let records = tokio::task::spawn_blocking(move || -> Result<Vec<WithdrawalRecord>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::WITHDRAWALS)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, v) = entry?;
            records.push(decode(v.value())?);
        }
        records.sort_by(|a: &WithdrawalRecord, b: &WithdrawalRecord| {
            b.requested_at.cmp(&a.requested_at)
        });
        Ok(records)
    })
    .await??;

    Ok(Json(records.iter().map(Withdrawal::from).collect()))
}

/// Resolve a PENDING withdrawal: APPROVED or REJECTED
///
/// Only PENDING requests can transition; re-resolving is a 409. Rejection
/// refunds the debited points in the same transaction, since the payout
/// never happened. If the requester was deleted in the meantime the
/// rejection stands and the refund is skipped with a warning.
pub async fn resolve_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ResolveWithdrawalRequest>,
) -> Result<Json<Withdrawal>> {
    authenticate_admin(&state, &headers).await?;

    if payload.status == WithdrawalStatus::Pending {
        return Err(AppError::InvalidInput(
            "Target status must be APPROVED or REJECTED".to_string(),
        ));
    }

    let db = state.db.clone();
    let target = payload.status;
    let record = tokio::task::spawn_blocking(move || -> Result<WithdrawalRecord> {
        let now = Utc::now().timestamp();
        let write_txn = db.begin_write()?;
        let record = {
            let mut withdrawals = write_txn.open_table(tables::WITHDRAWALS)?;
            let mut record: WithdrawalRecord = withdrawals
                .get(withdrawal_id.as_str())?
                .map(|b| decode(b.value()))
                .transpose()?
                .ok_or(AppError::WithdrawalNotFound)?;

            if record.status != WithdrawalStatus::Pending {
                return Err(AppError::WithdrawalAlreadyResolved);
            }

            record.status = target;
            record.resolved_at = Some(now);

            if target == WithdrawalStatus::Rejected {
                let mut users = write_txn.open_table(tables::USERS)?;
                let requester: Option<UserRecord> = users
                    .get(record.user_id.as_str())?
                    .map(|b| decode(b.value()))
                    .transpose()?;
                match requester {
                    Some(mut requester) => {
                        requester.points += record.points_redeemed;
                        let bytes = encode(&requester)?;
                        users.insert(requester.id.as_str(), bytes.as_slice())?;
                        tracing::info!(
                            "Refunded {} points to {} for rejected withdrawal {}",
                            record.points_redeemed,
                            requester.id,
                            record.id
                        );
                    }
                    None => {
                        tracing::warn!(
                            "Requester {} of withdrawal {} no longer exists; refund skipped",
                            record.user_id,
                            record.id
                        );
                    }
                }
            }

            let bytes = encode(&record)?;
            withdrawals.insert(withdrawal_id.as_str(), bytes.as_slice())?;
            record
        };
        write_txn.commit()?;

        tracing::info!("Withdrawal {} resolved to {:?}", record.id, record.status);
        Ok(record)
    })
    .await??;

    Ok(Json(Withdrawal::from(&record)))
}

/// Platform statistics for the admin overview
pub async fn admin_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminStatsResponse>> {
    authenticate_admin(&state, &headers).await?;

    let db_path = state.config.database_path.clone();
    let database_size_bytes = fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let db = state.db.clone();
    let stats = tokio::task::spawn_blocking(move || -> Result<(u64, u64, i64, u64, u64)> {
        let read_txn = db.begin_read()?;

        let users = read_txn.open_table(tables::USERS)?;
        let total_users = users.len()?;
        let mut total_completions: u64 = 0;
        for entry in users.iter()? {
            let (_, v) = entry?;
            let user: UserRecord = decode(v.value())?;
            total_completions += user.completed_tasks.len() as u64;
        }

        let tasks = read_txn.open_table(tables::TASKS)?;
        let mut active_tasks: u64 = 0;
        for entry in tasks.iter()? {
            let (_, v) = entry?;
            let task: TaskRecord = decode(v.value())?;
            if task.is_active() {
                active_tasks += 1;
            }
        }

        let withdrawals = read_txn.open_table(tables::WITHDRAWALS)?;
        let mut total_payouts: i64 = 0;
        let mut pending: u64 = 0;
        for entry in withdrawals.iter()? {
            let (_, v) = entry?;
            let record: WithdrawalRecord = decode(v.value())?;
            match record.status {
                WithdrawalStatus::Approved => total_payouts += record.amount,
                WithdrawalStatus::Pending => pending += 1,
                WithdrawalStatus::Rejected => {}
            }
        }

        Ok((
            total_users,
            total_completions,
            total_payouts,
            active_tasks,
            pending,
        ))
    })
    .await??;

    let (total_users, total_task_completions, total_payouts_rs, active_tasks, pending_withdrawals) =
        stats;

    tracing::info!(
        "Admin stats requested: {} users, {} completions, {} database",
        total_users,
        total_task_completions,
        format_bytes(database_size_bytes)
    );

    Ok(Json(AdminStatsResponse {
        total_users,
        total_task_completions,
        total_payouts_rs,
        active_tasks,
        pending_withdrawals,
        database_size_bytes,
        database_size_human: format_bytes(database_size_bytes),
    }))
}
