//! Ordered, in-memory message list of one chat instance.
//!
//! The store is the only shared mutable state of a chat. Messages are
//! appended whole and finalized by whole-message replacement keyed by
//! their temporary id, so readers never observe a half-updated entry.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use shopchat_types::error::StoreError;
use shopchat_types::event::ChatEvent;
use shopchat_types::message::ChatMessage;
use tracing::{debug, warn};

use crate::event::bus::EventBus;

/// Ordered message list with append and replace-by-temp-id.
pub struct MessageStore {
    messages: RwLock<Vec<ChatMessage>>,
    events: EventBus,
}

impl MessageStore {
    /// Create an empty store publishing changes on `events`.
    pub fn new(events: EventBus) -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Append a message to the end of the list.
    ///
    /// Rejects a pending message whose temp id is already pending, keeping
    /// temp ids unique among pending messages.
    pub fn append(&self, message: ChatMessage) -> Result<(), StoreError> {
        {
            let mut messages = self.write();
            if let Some(temp_id) = &message.temp_id {
                if messages.iter().any(|m| m.temp_id.as_ref() == Some(temp_id)) {
                    return Err(StoreError::DuplicateTempId(temp_id.clone()));
                }
            }
            messages.push(message.clone());
        }

        debug!(id = %message.id, status = %message.status, "Message appended");
        self.events.publish(ChatEvent::MessageAppended { message });
        Ok(())
    }

    /// Replace the pending message carrying `temp_id` with `updater(old)`.
    ///
    /// The status change must move forward (see
    /// [`MessageStatus::can_transition_to`](shopchat_types::message::MessageStatus::can_transition_to)).
    /// Returns the replacement.
    pub fn replace_by_temp_id<F>(
        &self,
        temp_id: &str,
        updater: F,
    ) -> Result<ChatMessage, StoreError>
    where
        F: FnOnce(&ChatMessage) -> ChatMessage,
    {
        let replaced = {
            let mut messages = self.write();
            let slot = messages
                .iter_mut()
                .find(|m| m.temp_id.as_deref() == Some(temp_id))
                .ok_or_else(|| StoreError::NotFound(temp_id.to_string()))?;

            let next = updater(slot);
            if !slot.status.can_transition_to(next.status) {
                warn!(
                    temp_id,
                    from = %slot.status,
                    to = %next.status,
                    "Rejected illegal message status transition"
                );
                return Err(StoreError::IllegalTransition {
                    from: slot.status,
                    to: next.status,
                });
            }
            *slot = next.clone();
            next
        };

        debug!(temp_id, id = %replaced.id, status = %replaced.status, "Message finalized");
        self.events.publish(ChatEvent::MessageReplaced {
            temp_id: temp_id.to_string(),
            message: replaced.clone(),
        });
        Ok(replaced)
    }

    /// Replace the whole list (history load).
    ///
    /// Pending messages survive the reset and are moved after the new
    /// entries, so an exchange in flight can still finalize its placeholder.
    pub fn reset(&self, messages: Vec<ChatMessage>) {
        let count = {
            let mut current = self.write();
            let pending: Vec<ChatMessage> = current.drain(..).filter(|m| m.is_pending()).collect();
            if !pending.is_empty() {
                debug!(pending = pending.len(), "Keeping pending messages across reset");
            }
            *current = messages;
            current.extend(pending);
            current.len()
        };
        self.events.publish(ChatEvent::MessagesReset { count });
    }

    /// Find a message by its temporary id.
    pub fn find_by_temp_id(&self, temp_id: &str) -> Option<ChatMessage> {
        self.read()
            .iter()
            .find(|m| m.temp_id.as_deref() == Some(temp_id))
            .cloned()
    }

    /// Copy of the current list, in order.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.read().clone()
    }

    /// Number of messages still carrying a temporary id.
    pub fn pending_count(&self) -> usize {
        self.read()
            .iter()
            .filter(|m| m.is_pending())
            .count()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every write is a whole-element push or assignment, so the list is
    // consistent even after a panic inside an updater.
    fn read(&self) -> RwLockReadGuard<'_, Vec<ChatMessage>> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<ChatMessage>> {
        self.messages.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("len", &self.len())
            .finish()
    }
}
