use serde::{Deserialize, Serialize};

// Contact form submission
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ContactRequest {
    pub user_id: String,
    pub message: String,
}

// Contact form answer
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ContactResponse {
    pub status: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

// Mail handed to the worker, also the relay payload
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FeedbackMail {
    pub subject: String,
    pub message: String,
    pub from: String,
    pub to: Vec<String>,
}
