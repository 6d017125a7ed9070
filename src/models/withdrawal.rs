use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::POINTS_PER_RUPEE;
use crate::models::timestamp_to_rfc3339;

/// Supported payout channels. Wire names match the labels the payment
/// partners use, including the space in "Bank Transfer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    EasyPaisa,
    JazzCash,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::EasyPaisa => "EasyPaisa",
            PaymentMethod::JazzCash => "JazzCash",
            PaymentMethod::BankTransfer => "Bank Transfer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Withdrawal request stored in redb
///
/// The requester's display name is denormalized at creation time so the
/// record stays readable after the account is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    /// Requested payout in PKR
    pub amount: i64,
    /// Points debited at submission: amount x 10
    pub points_redeemed: i64,
    pub method: PaymentMethod,
    pub account_details: String,
    pub status: WithdrawalStatus,
    pub requested_at: i64,
    pub resolved_at: Option<i64>,
}

impl WithdrawalRecord {
    pub fn new(
        user_id: String,
        user_name: String,
        amount: i64,
        points_redeemed: i64,
        method: PaymentMethod,
        account_details: String,
        now: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            user_name,
            amount,
            points_redeemed,
            method,
            account_details,
            status: WithdrawalStatus::Pending,
            requested_at: now,
            resolved_at: None,
        }
    }
}

/// Points needed to redeem the given PKR amount
///
/// Returns `None` when the conversion would overflow, so an oversized
/// request can never wrap into a negative debit.
pub fn points_required(amount: i64) -> Option<i64> {
    amount.checked_mul(POINTS_PER_RUPEE)
}

/// Withdrawal view for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub amount: i64,
    pub points_redeemed: i64,
    pub method: PaymentMethod,
    pub account_details: String,
    pub status: WithdrawalStatus,
    pub requested_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
}

impl From<&WithdrawalRecord> for Withdrawal {
    fn from(record: &WithdrawalRecord) -> Self {
        Self {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            user_name: record.user_name.clone(),
            amount: record.amount,
            points_redeemed: record.points_redeemed,
            method: record.method,
            account_details: record.account_details.clone(),
            status: record.status,
            requested_at: timestamp_to_rfc3339(record.requested_at),
            resolved_at: record.resolved_at.map(timestamp_to_rfc3339),
        }
    }
}
