//! Holder for the server-side conversation id of a chat instance.
//!
//! For signed-in members the conversation is created asynchronously by
//! another part of the storefront; the slot lets an exchange wait for it.

use std::time::Duration;

use tokio::sync::watch;

/// Current conversation id, observable by waiting exchanges.
pub struct ConversationSlot {
    tx: watch::Sender<Option<i64>>,
}

impl ConversationSlot {
    pub fn new(initial: Option<i64>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// The conversation id currently known, if any.
    pub fn get(&self) -> Option<i64> {
        *self.tx.borrow()
    }

    /// Record the conversation id (or clear it) and wake waiters.
    pub fn set(&self, conversation_id: Option<i64>) {
        self.tx.send_replace(conversation_id);
    }

    /// Wait at most `limit` for a conversation id to become known.
    ///
    /// Returns immediately when one is already set; otherwise returns
    /// whatever is known once `limit` elapses.
    pub async fn wait_for(&self, limit: Duration) -> Option<i64> {
        let mut rx = self.tx.subscribe();
        match tokio::time::timeout(limit, rx.wait_for(Option::is_some)).await {
            Ok(Ok(id)) => *id,
            _ => self.get(),
        }
    }
}

impl Default for ConversationSlot {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_and_set() {
        let slot = ConversationSlot::default();
        assert_eq!(slot.get(), None);
        slot.set(Some(3));
        assert_eq!(slot.get(), Some(3));
        slot.set(None);
        assert_eq!(slot.get(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_immediately_when_known() {
        let slot = ConversationSlot::new(Some(8));
        let started = tokio::time::Instant::now();
        assert_eq!(slot.wait_for(Duration::from_secs(1)).await, Some(8));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_without_id() {
        let slot = ConversationSlot::default();
        let started = tokio::time::Instant::now();
        assert_eq!(slot.wait_for(Duration::from_secs(1)).await, None);
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_wakes_when_id_arrives() {
        let slot = Arc::new(ConversationSlot::default());
        let setter = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            setter.set(Some(21));
        });

        assert_eq!(slot.wait_for(Duration::from_secs(1)).await, Some(21));
    }
}
