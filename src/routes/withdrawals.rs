use axum::http::HeaderMap;
use axum::{extract::State, Json};
use chrono::Utc;
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::constants::MIN_WITHDRAWAL_RS;
use crate::db::{decode, encode, tables};
use crate::error::{AppError, Result};
use crate::models::withdrawal::points_required;
use crate::models::{PaymentMethod, UserRecord, Withdrawal, WithdrawalRecord};
use crate::routes::session::authenticate;
use crate::routes::validation::support_deep_link;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    /// Requested payout in PKR
    pub amount: i64,
    pub method: PaymentMethod,
    #[serde(rename = "accountDetails")]
    pub account_details: String,
}

#[derive(Debug, Serialize)]
pub struct WithdrawResponse {
    pub withdrawal: Withdrawal,
    /// Balance after the debit
    pub balance: i64,
    /// Prefilled support deep link for the client to open
    #[serde(rename = "contactUrl")]
    pub contact_url: String,
}

/// Submit a withdrawal request
///
/// Points are debited at submission (optimistic debit), in the same write
/// transaction that appends the PENDING record. The balance check runs
/// against the freshly-read user record, so the balance can never go
/// negative even if the caller raced another debit.
pub async fn request_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WithdrawRequest>,
) -> Result<Json<WithdrawResponse>> {
    if payload.amount < MIN_WITHDRAWAL_RS {
        return Err(AppError::AmountBelowMinimum);
    }
    let required = points_required(payload.amount)
        .ok_or_else(|| AppError::InvalidInput("Amount is too large".to_string()))?;
    let account_details = payload.account_details.trim().to_string();
    if account_details.is_empty() {
        return Err(AppError::InvalidInput(
            "Account details are required".to_string(),
        ));
    }

    let user = authenticate(&state, &headers).await?;

    let db = state.db.clone();
    let user_id = user.id.clone();
    let amount = payload.amount;
    let method = payload.method;

    let (record, balance) = tokio::task::spawn_blocking(
        move || -> Result<(WithdrawalRecord, i64)> {
            let now = Utc::now().timestamp();

            let write_txn = db.begin_write()?;
            let result = {
                let mut users = write_txn.open_table(tables::USERS)?;
                let mut user: UserRecord = users
                    .get(user_id.as_str())?
                    .map(|b| decode(b.value()))
                    .transpose()?
                    .ok_or(AppError::Unauthorized)?;

                if user.points < required {
                    tracing::info!(
                        "Withdrawal rejected for {}: balance {} < required {}",
                        user.id,
                        user.points,
                        required
                    );
                    return Err(AppError::InsufficientBalance);
                }

                user.points -= required;
                let bytes = encode(&user)?;
                users.insert(user_id.as_str(), bytes.as_slice())?;

                let record = WithdrawalRecord::new(
                    user.id.clone(),
                    user.full_name.clone(),
                    amount,
                    required,
                    method,
                    account_details,
                    now,
                );
                let mut withdrawals = write_txn.open_table(tables::WITHDRAWALS)?;
                let record_bytes = encode(&record)?;
                withdrawals.insert(record.id.as_str(), record_bytes.as_slice())?;

                (record, user.points)
            };
            write_txn.commit()?;

            tracing::info!(
                "Withdrawal {} submitted by {}: Rs. {} ({} points)",
                result.0.id,
                user_id,
                amount,
                required
            );
            Ok(result)
        },
    )
    .await??;

    let contact_url = support_deep_link(
        &state.config.support_contact,
        record.amount,
        record.method.label(),
        &record.account_details,
    );

    Ok(Json(WithdrawResponse {
        withdrawal: Withdrawal::from(&record),
        balance,
        contact_url,
    }))
}

/// List the caller's own withdrawal requests, newest first
pub async fn list_own_withdrawals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Withdrawal>>> {
    let user = authenticate(&state, &headers).await?;

    let db = state.db.clone();
    let user_id = user.id.clone();
    let records = tokio::task::spawn_blocking(move || -> Result<Vec<WithdrawalRecord>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::WITHDRAWALS)?;

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, v) = entry?;
            let record: WithdrawalRecord = decode(v.value())?;
            if record.user_id == user_id {
                records.push(record);
            }
        }
        records.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(records)
    })
    .await??;

    Ok(Json(records.iter().map(Withdrawal::from).collect()))
}
