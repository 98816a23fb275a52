//! Background delivery so slow webhooks never hold up log reading.

use poeha_core::{DeliveryError, EventSink, Notification};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::Client;

/// Events waiting beyond this are dropped rather than queued.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Delivery outcome counts, returned when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Sending half of the delivery queue.
///
/// Dropping every `Notifier` lets the worker drain the queue and exit.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notification>,
}

impl EventSink for Notifier {
    fn send(&mut self, notification: Notification) -> Result<(), DeliveryError> {
        self.tx.try_send(notification).map_err(|err| match err {
            TrySendError::Full(notification) => DeliveryError::QueueFull {
                event: notification.event,
            },
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Starts the delivery worker on the current tokio runtime.
///
/// Events are sent one at a time in queue order, with a single attempt each.
/// `capacity` is clamped to at least one.
pub fn spawn(client: Client, capacity: usize) -> (Notifier, JoinHandle<WorkerStats>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(run(client, rx));
    (Notifier { tx }, handle)
}

async fn run(client: Client, mut rx: mpsc::Receiver<Notification>) -> WorkerStats {
    let mut stats = WorkerStats::default();

    while let Some(notification) = rx.recv().await {
        match client.send_event(&notification).await {
            Ok(()) => {
                stats.delivered += 1;
                tracing::info!(
                    event = %notification.event,
                    payload = ?notification.payload,
                    "sent notification"
                );
            }
            Err(err) => {
                stats.failed += 1;
                tracing::warn!(
                    event = %notification.event,
                    error = %err,
                    "failed to send to Home Assistant"
                );
            }
        }
    }

    tracing::debug!(?stats, "delivery worker stopped");
    stats
}
