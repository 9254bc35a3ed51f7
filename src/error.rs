use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of the shared cooldown store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("ttl {0:?} cannot be represented")]
    TtlOverflow(Duration),
}

/// Failures of a single `RateLimitedAction::attempt` call.
#[derive(Error, Debug)]
pub enum AttemptError {
    /// Empty key, zero or unrepresentable window. Caller bug, never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store could not be reached; the action was not run.
    #[error("cooldown store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// The action ran and failed. The cooldown entry stays in place.
    #[error("action failed: {0}")]
    ActionFailed(#[source] BoxError),
}

// HTTP-facing errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AttemptError> for ApiError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            AttemptError::StoreUnavailable(_) => {
                ApiError::Unavailable("Service temporarily unavailable, try again later".to_string())
            }
            AttemptError::ActionFailed(_) => {
                ApiError::Internal("Failed to send message".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "status": "error",
            "detail": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
