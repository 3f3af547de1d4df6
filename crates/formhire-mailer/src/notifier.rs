use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use formhire_types::events::Notification;

use crate::sender::EmailSender;
use crate::templates;

/// Handle for queueing notifications. Cloning is cheap; every clone feeds
/// the same background worker.
///
/// `notify` never blocks and never fails: delivery happens on the worker,
/// and send errors are logged there.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Start the delivery worker on the current runtime. The worker exits
    /// once every `Notifier` clone has been dropped and the queue drained.
    pub fn spawn(sender: Arc<dyn EmailSender>, public_url: String) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(rx, sender, public_url));
        (Self { tx }, handle)
    }

    pub fn notify(&self, notification: Notification) {
        let kind = notification.kind();
        if self.tx.send(notification).is_err() {
            warn!(kind, "Notification worker is gone, dropping notification");
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    sender: Arc<dyn EmailSender>,
    public_url: String,
) {
    while let Some(notification) = rx.recv().await {
        let kind = notification.kind();
        let Some(email) = templates::render(&notification, &public_url) else {
            debug!(kind, "Notification has no recipients, skipping");
            continue;
        };

        // SMTP is blocking; keep it off the async workers
        let sender = sender.clone();
        let result = tokio::task::spawn_blocking(move || sender.send(&email)).await;

        match result {
            Ok(Ok(())) => debug!(kind, "Notification delivered"),
            Ok(Err(e)) => warn!(kind, error = %e, "Failed to send notification email"),
            Err(e) => error!(kind, error = %e, "Notification send task panicked"),
        }
    }

    debug!("Notification worker stopped");
}
