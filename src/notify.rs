use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub participant_id: String,
    pub message: String,
}

/// Outbound notification queue. Keeps a per-participant unread counter and
/// forwards each message on a broadcast channel; push/email delivery is an
/// external consumer of that channel.
pub struct Notifier {
    unread: DashMap<String, u64>,
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            unread: DashMap::new(),
            tx,
        }
    }

    pub fn notify(&self, participant_id: &str, message: impl Into<String>) {
        let message = message.into();
        *self.unread.entry(participant_id.to_string()).or_insert(0) += 1;
        tracing::debug!(participant_id, %message, "notification queued");
        // Best effort; no subscriber just means nobody is delivering yet.
        let _ = self.tx.send(Notification {
            participant_id: participant_id.to_string(),
            message,
        });
    }

    pub fn unread_count(&self, participant_id: &str) -> u64 {
        self.unread.get(participant_id).map(|c| *c).unwrap_or(0)
    }

    pub fn clear(&self, participant_id: &str) {
        self.unread.remove(participant_id);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}
