use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::ApiError;
use crate::metrics::CONTACT_REQUESTS;
use crate::models::{ContactRequest, ContactResponse, FeedbackMail};
use crate::rate_limit::AttemptOutcome;
use crate::state::AppState;

const MAIL_LOCK_PREFIX: &str = "mail_feedback_lock_";

// One cooldown key per user
pub fn feedback_lock_key(user_id: &str) -> String {
    format!("{}{}", MAIL_LOCK_PREFIX, user_id)
}

// "1 second", "3 seconds", "1500 ms"
fn describe_window(window: Duration) -> String {
    if window == Duration::from_secs(1) {
        "1 second".to_string()
    } else if window.subsec_millis() == 0 {
        format!("{} seconds", window.as_secs())
    } else {
        format!("{} ms", window.as_millis())
    }
}

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactRequest>,
) -> Result<Response, ApiError> {
    CONTACT_REQUESTS.inc();

    let user_id = payload.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let mail = FeedbackMail {
        subject: state.mail_subject.clone(),
        message: payload.message,
        from: state.mail_from.clone(),
        to: state.mail_to.clone(),
    };
    let mail_tx = state.mail_tx.clone();

    let outcome = state
        .limiter
        .attempt(&feedback_lock_key(user_id), state.cooldown_window, || async move {
            mail_tx
                .try_send(mail)
                .map_err(|e| format!("mail queue: {}", e))
        })
        .await?;

    let response = match outcome {
        AttemptOutcome::Executed(()) => {
            info!(user_id, "Feedback mail queued");
            let body = ContactResponse {
                status: "sent".to_string(),
                detail: "Message sended".to_string(),
                retry_after_ms: None,
            };
            (StatusCode::ACCEPTED, Json(body)).into_response()
        }
        AttemptOutcome::Suppressed(remaining) => {
            let body = ContactResponse {
                status: "suppressed".to_string(),
                detail: format!(
                    "You can send only one message per {}",
                    describe_window(state.cooldown_window)
                ),
                retry_after_ms: Some(remaining.as_millis() as u64),
            };
            let retry_after = remaining.as_millis().div_ceil(1000).max(1);
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.to_string())],
                Json(body),
            )
                .into_response()
        }
    };

    Ok(response)
}
