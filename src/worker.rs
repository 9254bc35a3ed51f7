use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::metrics::{MAILS_FAILED, MAILS_SENT};
use crate::models::FeedbackMail;

/// Delivers queued feedback mails one by one.
///
/// Fire-and-forget: failures are logged and counted, nobody waits on them.
/// Without a relay URL mails are written to the log instead.
pub async fn mail_worker(
    mut rx: mpsc::Receiver<FeedbackMail>,
    client: reqwest::Client,
    relay_url: Option<String>,
) {
    match &relay_url {
        Some(url) => info!(relay = %url, "Mail worker started"),
        None => info!("Mail worker started without relay, mails go to the log"),
    }

    while let Some(mail) = rx.recv().await {
        // Debug keeps a multi-line message on one log line
        info!(to = ?mail.to, message = ?mail.message, "Message send");

        let Some(url) = &relay_url else {
            MAILS_SENT.inc();
            continue;
        };

        let result = client.post(url).json(&mail).send().await;

        match result {
            Ok(res) if res.status().is_success() => {
                MAILS_SENT.inc();
            }
            Ok(res) => {
                MAILS_FAILED.inc();
                warn!(status = %res.status(), "Mail relay rejected message");
            }
            Err(e) => {
                MAILS_FAILED.inc();
                error!(error = %e, "Mail relay request failed");
            }
        }
    }

    info!("Mail queue closed, worker stopping");
}
