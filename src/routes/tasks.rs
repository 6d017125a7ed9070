use axum::extract::Path;
use axum::http::HeaderMap;
use axum::{extract::State, Json};
use chrono::Utc;
use redb::ReadableTable;
use serde::Serialize;

use crate::db::{decode, encode, tables};
use crate::error::{AppError, Result};
use crate::models::{CompletedTask, Task, TaskRecord, UserRecord};
use crate::routes::session::authenticate;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StartTaskResponse {
    #[serde(rename = "taskId")]
    pub task_id: String,
    /// External URL the client opens in a new context
    pub link: String,
    #[serde(rename = "timerSeconds")]
    pub timer_seconds: u32,
}

#[derive(Debug, Serialize)]
pub struct CancelTaskResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ClaimTaskResponse {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "pointsAwarded")]
    pub points_awarded: i64,
    /// Balance after the credit
    pub balance: i64,
}

/// List the ACTIVE task catalog
pub async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>> {
    authenticate(&state, &headers).await?;

    let db = state.db.clone();
    let tasks = tokio::task::spawn_blocking(move || -> Result<Vec<TaskRecord>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::TASKS)?;

        let mut tasks = Vec::new();
        for entry in table.iter()? {
            let (_, v) = entry?;
            let task: TaskRecord = decode(v.value())?;
            if task.is_active() {
                tasks.push(task);
            }
        }
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tasks)
    })
    .await??;

    Ok(Json(tasks.iter().map(Task::from).collect()))
}

/// Start a task: Idle -> Started
///
/// Records the verification start time and hands the client the outbound
/// link plus the timer duration for its countdown. Restarting an
/// in-progress task resets the timer.
pub async fn start_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StartTaskResponse>> {
    let user = authenticate(&state, &headers).await?;

    if user.has_completed(&task_id) {
        return Err(AppError::TaskAlreadyCompleted);
    }

    let db = state.db.clone();
    let user_id = user.id.clone();
    let task = tokio::task::spawn_blocking(move || -> Result<TaskRecord> {
        let now = Utc::now().timestamp();
        let write_txn = db.begin_write()?;
        let task = {
            let tasks = write_txn.open_table(tables::TASKS)?;
            let task: TaskRecord = tasks
                .get(task_id.as_str())?
                .map(|b| decode(b.value()))
                .transpose()?
                .ok_or(AppError::TaskNotFound)?;
            if !task.is_active() {
                return Err(AppError::TaskInactive);
            }

            let mut starts = write_txn.open_table(tables::TASK_STARTS)?;
            let key = tables::task_start_key(&user_id, &task_id);
            starts.insert(key.as_str(), now)?;
            task
        };
        write_txn.commit()?;

        tracing::info!("User {} started task {}", user_id, task.id);
        Ok(task)
    })
    .await??;

    Ok(Json(StartTaskResponse {
        task_id: task.id,
        link: task.link,
        timer_seconds: task.timer_seconds,
    }))
}

/// Cancel an in-progress task: discards the start record, nothing else
///
/// Idempotent; cancelling a task that was never started is a no-op.
pub async fn cancel_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CancelTaskResponse>> {
    let user = authenticate(&state, &headers).await?;

    let db = state.db.clone();
    let user_id = user.id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut starts = write_txn.open_table(tables::TASK_STARTS)?;
            let key = tables::task_start_key(&user_id, &task_id);
            starts.remove(key.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(CancelTaskResponse { success: true }))
}

/// Claim a verified task: Verified -> Claimed
///
/// Requires a start record whose minimum dwell has elapsed. Double
/// completion is blocked at the data layer, not just in the client: a
/// repeat claim for an already-completed task is a 409 regardless of how
/// the request was produced. Credit, completion record, and start-record
/// consumption happen in one write transaction.
pub async fn claim_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ClaimTaskResponse>> {
    let user = authenticate(&state, &headers).await?;

    let db = state.db.clone();
    let user_id = user.id.clone();
    let (task, balance) = tokio::task::spawn_blocking(move || -> Result<(TaskRecord, i64)> {
        let now = Utc::now().timestamp();
        let write_txn = db.begin_write()?;
        let result = {
            let mut starts = write_txn.open_table(tables::TASK_STARTS)?;
            let key = tables::task_start_key(&user_id, &task_id);
            let started_at = starts
                .get(key.as_str())?
                .map(|v| v.value())
                .ok_or(AppError::TaskNotStarted)?;

            let tasks = write_txn.open_table(tables::TASKS)?;
            let task: TaskRecord = tasks
                .get(task_id.as_str())?
                .map(|b| decode(b.value()))
                .transpose()?
                // Task deleted while the timer was running
                .ok_or(AppError::TaskNotFound)?;
            if !task.is_active() {
                return Err(AppError::TaskInactive);
            }

            if now - started_at < i64::from(task.timer_seconds) {
                return Err(AppError::VerificationPending);
            }

            // Re-read the user inside the transaction; the session copy may
            // be stale.
            let mut users = write_txn.open_table(tables::USERS)?;
            let mut user: UserRecord = users
                .get(user_id.as_str())?
                .map(|b| decode(b.value()))
                .transpose()?
                .ok_or(AppError::Unauthorized)?;

            if user.has_completed(&task_id) {
                return Err(AppError::TaskAlreadyCompleted);
            }

            user.points += task.points;
            user.completed_tasks.push(CompletedTask {
                task_id: task_id.clone(),
                completed_at: now,
            });
            let bytes = encode(&user)?;
            users.insert(user_id.as_str(), bytes.as_slice())?;

            starts.remove(key.as_str())?;
            (task, user.points)
        };
        write_txn.commit()?;

        tracing::info!(
            "User {} claimed task {} for {} points",
            user_id,
            result.0.id,
            result.0.points
        );
        Ok(result)
    })
    .await??;

    Ok(Json(ClaimTaskResponse {
        task_id: task.id,
        points_awarded: task.points,
        balance,
    }))
}
