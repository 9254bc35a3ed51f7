use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use crate::models::FeedbackMail;
use crate::rate_limit::RateLimitedAction;
// app's shared state

pub struct AppState {
    pub limiter: RateLimitedAction,
    pub cooldown_window: Duration, // one message per user per window
    pub mail_tx: mpsc::Sender<FeedbackMail>,
    pub mail_from: String,
    pub mail_to: Vec<String>,
    pub mail_subject: String,
    pub log_file: PathBuf,
    pub log_max_lines: usize,
}
