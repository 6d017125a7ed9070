//! EarnTask Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState with the given database and configuration
    pub fn new(db: Arc<redb::Database>, config: Config) -> Self {
        Self { db, config }
    }
}

/// Build the application router
///
/// Shared between the binary and the integration tests so both always
/// exercise the same routing table.
pub fn router(state: AppState) -> Router {
    use routes::*;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(register_user))
        .route("/api/login", post(login_user))
        .route("/api/logout", post(logout_user))
        .route("/api/me", get(current_user))
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks/:id/start", post(start_task).delete(cancel_task))
        .route("/api/tasks/:id/claim", post(claim_task))
        .route(
            "/api/withdrawals",
            post(request_withdrawal).get(list_own_withdrawals),
        )
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:id", delete(delete_user))
        .route("/api/admin/tasks", get(list_all_tasks).post(create_task))
        .route("/api/admin/tasks/:id", delete(delete_task))
        .route("/api/admin/withdrawals", get(list_withdrawals))
        .route("/api/admin/withdrawals/:id", post(resolve_withdrawal))
        .route("/api/admin/stats", get(admin_stats))
        .with_state(state)
}
