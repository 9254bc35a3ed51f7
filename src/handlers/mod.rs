mod contact;
mod health;
mod logs;
mod metrics;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::state::AppState;

pub use contact::{contact_handler, feedback_lock_key};
pub use health::health_handler;
pub use logs::{log_download_handler, log_view_handler};
pub use metrics::metrics_handler;

// Router with all routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/contact", post(contact_handler))
        .route("/api/logs", get(log_view_handler))
        .route("/api/logs/download", get(log_download_handler))
        .with_state(state)
}
