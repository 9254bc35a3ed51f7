use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref CONTACT_REQUESTS: Counter =
        register_counter!("portal_contact_requests_total", "Total contact form submissions").unwrap();
    pub static ref ATTEMPTS_EXECUTED: Counter =
        register_counter!("portal_attempts_executed_total", "Attempts that won the cooldown window").unwrap();
    pub static ref ATTEMPTS_SUPPRESSED: Counter =
        register_counter!("portal_attempts_suppressed_total", "Attempts suppressed by a live cooldown").unwrap();
    pub static ref STORE_ERRORS: Counter =
        register_counter!("portal_store_errors_total", "Cooldown store failures and timeouts").unwrap();
    pub static ref ACTION_FAILURES: Counter =
        register_counter!("portal_action_failures_total", "Actions that failed after winning the window").unwrap();
    pub static ref ATTEMPT_LATENCY: Histogram = register_histogram!(
        "portal_store_claim_latency_seconds",
        "Latency of the set-if-absent store call in seconds"
    )
    .unwrap();
    pub static ref COOLDOWN_ENTRIES: Gauge =
        register_gauge!("portal_cooldown_entries", "Current number of entries in the cooldown store").unwrap();
    pub static ref MAILS_SENT: Counter =
        register_counter!("portal_mails_sent_total", "Feedback mails delivered").unwrap();
    pub static ref MAILS_FAILED: Counter =
        register_counter!("portal_mails_failed_total", "Feedback mails that could not be delivered").unwrap();
}
