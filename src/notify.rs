// Live notification
// Pushes each newly stored segment to the subscriber group of the upload's
// owner. Best-effort: a failed publish is logged by the orchestrator and
// never disturbs segment processing. The actual WebSocket transport is an
// external concern; this stops at an in-process broadcast channel per group.

use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt;
use tokio::sync::broadcast;

use crate::database::models::SegmentPayload;

const GROUP_CHANNEL_CAPACITY: usize = 256;

/// Error type for notification failures
#[derive(Debug, Clone)]
pub struct NotifyError(pub String);

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Notification failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Sink for segment-created events, addressed by group key
#[async_trait]
pub trait SegmentNotifier: Send + Sync {
    async fn publish(&self, group: &str, payload: &SegmentPayload) -> Result<(), NotifyError>;
}

/// In-process notifier: one broadcast channel per subscriber group
#[derive(Default)]
pub struct GroupChannelNotifier {
    groups: DashMap<String, broadcast::Sender<SegmentPayload>>,
}

impl GroupChannelNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a group, receiving every segment published to it from now on
    pub fn subscribe(&self, group: &str) -> broadcast::Receiver<SegmentPayload> {
        self.groups
            .entry(group.to_string())
            .or_insert_with(|| broadcast::channel(GROUP_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Number of live subscribers in a group
    pub fn subscriber_count(&self, group: &str) -> usize {
        self.groups
            .get(group)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SegmentNotifier for GroupChannelNotifier {
    async fn publish(&self, group: &str, payload: &SegmentPayload) -> Result<(), NotifyError> {
        let sender = match self.groups.get(group) {
            Some(sender) => sender,
            None => {
                // Nobody ever joined this group; nothing to deliver
                log::debug!("No subscriber group '{}', dropping segment event", group);
                return Ok(());
            }
        };

        match sender.send(payload.clone()) {
            Ok(delivered) => {
                log::debug!("Published segment {} to {} subscriber(s) in '{}'", payload.id, delivered, group);
                Ok(())
            }
            // All receivers hung up; the group is simply empty now
            Err(_) => {
                log::debug!("Subscriber group '{}' is empty, dropping segment event", group);
                Ok(())
            }
        }
    }
}
