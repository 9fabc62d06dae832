//! Per-chat change feed.
//!
//! Every chat instance owns one `EventBus`. Its message store and typing
//! indicator publish into it, and observers such as the CLI typing spinner
//! subscribe to it. A chat with no observers still runs; its events are
//! simply dropped.

use shopchat_types::event::ChatEvent;
use tokio::sync::broadcast;

/// Broadcast channel of [`ChatEvent`]s for one chat instance.
///
/// Clones share the channel. An observer that falls more than `capacity`
/// events behind gets `RecvError::Lagged` and skips ahead.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    /// `capacity` is clamped to at least one slot.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Observe changes published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ChatEvent) {
        let _ = self.sender.send(event);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.sender.receiver_count())
            .finish()
    }
}
