//! Read-only chat history: service trait, record conversion, and loader.
//!
//! History is peripheral to the send/finalize flow. A fetch failure never
//! reaches the chat; it is logged and treated as "no history".

use std::sync::{Arc, PoisonError, RwLock};

use shopchat_types::error::HistoryError;
use shopchat_types::history::HistoryRecord;
use shopchat_types::message::{ChatMessage, MessageStatus, SenderType};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::chat::ids::{history_bot_id, history_user_id};
use crate::chat::store::MessageStore;

/// Trait for fetching past exchanges from the completion provider.
pub trait HistoryService: Send + Sync {
    fn fetch_history(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<HistoryRecord>, HistoryError>> + Send;
}

/// Convert history records into chat messages.
///
/// Each record yields its user message (GUEST) and bot reply (BOT), when
/// present, both `sent` and tagged with `conversation_id`. The result is
/// ordered by creation time; the sort is stable so a user message stays
/// ahead of the reply that shares its timestamp.
pub fn convert_history(
    records: &[HistoryRecord],
    conversation_id: Option<i64>,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(records.len() * 2);

    for record in records {
        if let Some(text) = record.user_message.as_deref().filter(|t| !t.is_empty()) {
            messages.push(ChatMessage {
                id: history_user_id(record.id),
                sender_type: SenderType::Guest,
                message: text.to_string(),
                conversation_id,
                session_id: record.session_id.clone(),
                created_at: record.created_at,
                temp_id: None,
                status: MessageStatus::Sent,
            });
        }

        if let Some(text) = record.ai_response.as_deref().filter(|t| !t.is_empty()) {
            messages.push(ChatMessage {
                id: history_bot_id(record.id),
                sender_type: SenderType::Bot,
                message: text.to_string(),
                conversation_id,
                session_id: record.session_id.clone(),
                created_at: record.created_at,
                temp_id: None,
                status: MessageStatus::Sent,
            });
        }
    }

    messages.sort_by_key(|m| m.created_at);
    messages
}

/// Fetches history and loads it into a chat's message store.
///
/// The latest successful fetch is kept as a snapshot. Besides explicit
/// loads, the snapshot can be refreshed in the background after a reply.
pub struct HistoryLoader<H: HistoryService> {
    service: Arc<H>,
    snapshot: Arc<RwLock<Vec<HistoryRecord>>>,
    background: TaskTracker,
}

impl<H: HistoryService + 'static> HistoryLoader<H> {
    pub fn new(service: Arc<H>) -> Self {
        Self {
            service,
            snapshot: Arc::new(RwLock::new(Vec::new())),
            background: TaskTracker::new(),
        }
    }

    /// Fetch the provider's history, caching it as the latest snapshot.
    ///
    /// Returns an empty list on failure and leaves the snapshot untouched.
    pub async fn fetch(&self) -> Vec<HistoryRecord> {
        fetch_into(&*self.service, &self.snapshot).await
    }

    /// Refetch the snapshot without waiting for the result.
    pub fn refresh_in_background(&self) {
        let service = Arc::clone(&self.service);
        let snapshot = Arc::clone(&self.snapshot);
        self.background.spawn(async move {
            let records = fetch_into(&*service, &snapshot).await;
            debug!(records = records.len(), "History snapshot refreshed");
        });
    }

    /// Wait for background refreshes started so far.
    pub async fn flush_background(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }

    /// The most recently fetched history.
    pub fn snapshot(&self) -> Vec<HistoryRecord> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace `store`'s contents with the converted history.
    ///
    /// An empty history leaves the store as it is.
    pub async fn load_into(
        &self,
        store: &MessageStore,
        conversation_id: Option<i64>,
    ) -> Vec<ChatMessage> {
        let records = self.fetch().await;
        if records.is_empty() {
            return Vec::new();
        }

        let messages = convert_history(&records, conversation_id);
        info!(records = records.len(), messages = messages.len(), "Chat history loaded");
        store.reset(messages.clone());
        messages
    }
}

async fn fetch_into<H: HistoryService>(
    service: &H,
    snapshot: &RwLock<Vec<HistoryRecord>>,
) -> Vec<HistoryRecord> {
    match service.fetch_history().await {
        Ok(records) => {
            *snapshot.write().unwrap_or_else(PoisonError::into_inner) = records.clone();
            records
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch chat history");
            Vec::new()
        }
    }
}
