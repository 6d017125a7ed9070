use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use chrono::Utc;
use redb::ReadableTable;

use crate::db::{decode, tables};
use crate::error::{AppError, Result};
use crate::models::{SessionRecord, UserRecord, UserRole};
use crate::AppState;

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or(AppError::Unauthorized)
}

/// Resolve the session token to the authoritative user record
///
/// The session stores only the user id; the user record is re-read on every
/// request, so balances and roles are never served from a stale cached copy.
/// Expired or dangling sessions are rejected with 401.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserRecord> {
    let token = bearer_token(headers)?;
    let db = state.db.clone();

    tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let now = Utc::now().timestamp();
        let read_txn = db.begin_read()?;

        let sessions = read_txn.open_table(tables::SESSIONS)?;
        let session: SessionRecord = sessions
            .get(token.as_str())?
            .map(|b| decode(b.value()))
            .transpose()?
            .ok_or(AppError::Unauthorized)?;

        if session.is_expired(now) {
            tracing::debug!("Rejected expired session for user {}", session.user_id);
            return Err(AppError::Unauthorized);
        }

        let users = read_txn.open_table(tables::USERS)?;
        let user: UserRecord = users
            .get(session.user_id.as_str())?
            .map(|b| decode(b.value()))
            .transpose()?
            // Account deleted while the session was live
            .ok_or(AppError::Unauthorized)?;

        Ok(user)
    })
    .await?
}

/// Authenticate and require the ADMIN role
pub async fn authenticate_admin(state: &AppState, headers: &HeaderMap) -> Result<UserRecord> {
    let user = authenticate(state, headers).await?;
    if user.role != UserRole::Admin {
        tracing::warn!("Non-admin user {} hit an admin route", user.id);
        return Err(AppError::Forbidden);
    }
    Ok(user)
}
