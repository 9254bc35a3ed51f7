use clap::Parser;
use std::path::PathBuf;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "portal-mailer")]
#[command(about = "Rate-limited contact mail service for the portal")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // One message per user per window, in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub cooldown_window_ms: u64,

    // Give up on the cooldown store after this many milliseconds
    #[arg(long, default_value_t = 500)]
    pub store_timeout_ms: u64,

    // Expired cooldown sweep interval in seconds
    #[arg(long, default_value_t = 30)]
    pub sweep_interval: u64,

    // Capacity of the outgoing mail queue
    #[arg(long, default_value_t = 100)]
    pub mail_queue: usize,

    // HTTP mail relay; mails are only logged when unset
    #[arg(long)]
    pub mail_relay_url: Option<String>,

    #[arg(long, default_value = "hypermail@yandex.ru")]
    pub mail_from: String,

    // Recipients (comma-separated)
    #[arg(long, default_value = "mack55@mail.ru")]
    pub mail_to: String,

    #[arg(long, default_value = "ed_portal support message")]
    pub mail_subject: String,

    // Log file, also served by the log viewer
    #[arg(long, default_value = "portal-mailer.log")]
    pub log_file: PathBuf,

    // Max lines the log viewer reads
    #[arg(long, default_value_t = 1_000_000)]
    pub log_max_lines: usize,
}

impl Args {
    pub fn recipients(&self) -> Vec<String> {
        split_recipients(&self.mail_to)
    }
}

// "a@x, b@y" -> ["a@x", "b@y"]
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
