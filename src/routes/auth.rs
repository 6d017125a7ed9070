use axum::http::HeaderMap;
use axum::{extract::State, Json};
use chrono::Utc;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::constants::REFERRAL_BONUS_POINTS;
use crate::db::{decode, encode, tables};
use crate::error::{AppError, Result};
use crate::models::{SessionRecord, User, UserRecord, UserRole};
use crate::routes::session::{authenticate, bearer_token};
use crate::routes::validation::validate_registration;
use crate::security::{generate_token, verify_password};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    #[serde(rename = "referralCode")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Register a new account
///
/// New users start with the signup bonus. The role comes from the operator
/// allowlist in configuration, never from the email contents. When a
/// referral code matches an existing user id, the referrer's bonus and
/// referral count are credited in the same write transaction as the new
/// user record; an unknown code is logged and ignored.
///
/// Returns 409 Conflict if the email is already registered.
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    validate_registration(
        &payload.full_name,
        &payload.email,
        &payload.mobile,
        &payload.password,
        &payload.confirm_password,
    )?;

    let email = payload.email.trim().to_lowercase();
    let role = if state.config.is_admin_email(&email) {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let referral_code = payload
        .referral_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let db = state.db.clone();
    let ttl = state.config.session_ttl_secs;
    let token = generate_token();
    let session_token = token.clone();

    let user = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let now = Utc::now().timestamp();
        let new_user = UserRecord::new(
            payload.full_name.trim().to_string(),
            email.clone(),
            payload.mobile.trim().to_string(),
            &payload.password,
            role,
            referral_code.clone(),
            now,
        );

        let write_txn = db.begin_write()?;
        {
            let mut emails = write_txn.open_table(tables::EMAILS)?;
            if emails.get(email.as_str())?.is_some() {
                tracing::info!("Registration rejected: email already taken");
                return Err(AppError::EmailTaken);
            }
            emails.insert(email.as_str(), new_user.id.as_str())?;

            let mut users = write_txn.open_table(tables::USERS)?;

            // Referral crediting happens in this same transaction, so the
            // new account and the referrer bonus land together or not at
            // all.
            if let Some(code) = &referral_code {
                let referrer: Option<UserRecord> = users
                    .get(code.as_str())?
                    .map(|b| decode(b.value()))
                    .transpose()?;
                match referrer {
                    Some(mut referrer) => {
                        referrer.points += REFERRAL_BONUS_POINTS;
                        referrer.referral_count += 1;
                        let bytes = encode(&referrer)?;
                        users.insert(referrer.id.as_str(), bytes.as_slice())?;
                        tracing::info!(
                            "Credited referral bonus to {} (total referrals: {})",
                            referrer.id,
                            referrer.referral_count
                        );
                    }
                    None => {
                        tracing::warn!("Ignoring unknown referral code at registration");
                    }
                }
            }

            let bytes = encode(&new_user)?;
            users.insert(new_user.id.as_str(), bytes.as_slice())?;

            let mut sessions = write_txn.open_table(tables::SESSIONS)?;
            let session = SessionRecord::new(new_user.id.clone(), now, ttl);
            let session_bytes = encode(&session)?;
            sessions.insert(session_token.as_str(), session_bytes.as_slice())?;
        }
        write_txn.commit()?;

        tracing::info!("New user registered: {}", new_user.id);
        Ok(new_user)
    })
    .await??;

    Ok(Json(AuthResponse {
        token,
        user: User::from(&user),
    }))
}

/// Log in with email and password
///
/// Both the unknown-email and wrong-password paths return the same generic
/// 401 so the response never reveals whether an account exists.
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let email = payload.email.trim().to_lowercase();
    let db = state.db.clone();
    let ttl = state.config.session_ttl_secs;
    let token = generate_token();
    let session_token = token.clone();

    let user = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let user: UserRecord = {
            let read_txn = db.begin_read()?;
            let emails = read_txn.open_table(tables::EMAILS)?;
            let user_id = emails
                .get(email.as_str())?
                .map(|v| v.value().to_string())
                .ok_or(AppError::InvalidCredentials)?;

            let users = read_txn.open_table(tables::USERS)?;
            users
                .get(user_id.as_str())?
                .map(|b| decode(b.value()))
                .transpose()?
                .ok_or(AppError::InvalidCredentials)?
        };

        if !verify_password(&payload.password, &user.password_salt, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let now = Utc::now().timestamp();
        let write_txn = db.begin_write()?;
        {
            let mut sessions = write_txn.open_table(tables::SESSIONS)?;

            // Expired sessions are purged here rather than by a background
            // job; login already holds the write lock on the table.
            let mut stale = Vec::new();
            for entry in sessions.iter()? {
                let (k, v) = entry?;
                let record: SessionRecord = decode(v.value())?;
                if record.is_expired(now) {
                    stale.push(k.value().to_string());
                }
            }
            for expired in &stale {
                sessions.remove(expired.as_str())?;
            }
            if !stale.is_empty() {
                tracing::debug!("Purged {} expired sessions", stale.len());
            }

            let session = SessionRecord::new(user.id.clone(), now, ttl);
            let bytes = encode(&session)?;
            sessions.insert(session_token.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        tracing::info!("User logged in: {}", user.id);
        Ok(user)
    })
    .await??;

    Ok(Json(AuthResponse {
        token,
        user: User::from(&user),
    }))
}

/// Log out: delete the session record
///
/// Idempotent; an already-deleted token still gets a success response.
pub async fn logout_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>> {
    let token = bearer_token(&headers)?;
    let db = state.db.clone();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut sessions = write_txn.open_table(tables::SESSIONS)?;
            sessions.remove(token.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(LogoutResponse { success: true }))
}

/// Return the authoritative record for the calling session
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<User>> {
    let user = authenticate(&state, &headers).await?;
    Ok(Json(User::from(&user)))
}
