pub mod admin;
pub mod auth;
pub mod health;
pub mod session;
pub mod tasks;
pub mod validation;
pub mod withdrawals;

pub use admin::{
    admin_stats, create_task, delete_task, delete_user, list_all_tasks, list_users,
    list_withdrawals, resolve_withdrawal,
};
pub use auth::{current_user, login_user, logout_user, register_user};
pub use health::health_check;
pub use tasks::{cancel_task, claim_task, list_tasks, start_task};
pub use withdrawals::{list_own_withdrawals, request_withdrawal};
