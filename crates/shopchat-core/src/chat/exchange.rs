//! ChatExchange -- one user message in, one finalized bot message out.
//!
//! An exchange appends a bot placeholder, pauses briefly, asks the
//! completion service for a reply, and replaces the placeholder with the
//! reply or a failure text. At most one exchange runs per chat instance;
//! a message submitted while one is in flight is dropped, not queued.
//!
//! Member replies are persisted in the background. Persistence outcome
//! never changes what the chat shows.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use shopchat_types::config::ExchangeConfig;
use shopchat_types::error::{CompletionError, ExchangeError, FailureKind};
use shopchat_types::event::ChatEvent;
use shopchat_types::message::{
    ChatMessage, EMPTY_REPLY_FALLBACK, MessageStatus, PLACEHOLDER_TEXT, SaveBotMessage, SenderType,
};
use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::chat::conversation::ConversationSlot;
use crate::chat::ids;
use crate::chat::store::MessageStore;
use crate::chat::typing::TypingIndicator;
use crate::event::bus::EventBus;
use crate::service::completion::CompletionService;
use crate::service::persistence::PersistenceService;

/// Who is chatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatIdentity {
    /// Unauthenticated visitor: nothing is persisted server-side.
    pub is_guest: bool,
    pub session_id: Option<String>,
}

impl ChatIdentity {
    pub fn guest(session_id: Option<String>) -> Self {
        Self {
            is_guest: true,
            session_id,
        }
    }

    pub fn member(session_id: Option<String>) -> Self {
        Self {
            is_guest: false,
            session_id,
        }
    }
}

/// Result of [`ChatExchange::send_message`].
#[derive(Debug, Clone)]
pub enum ExchangeOutcome {
    /// Another exchange was in flight; nothing happened.
    Skipped,
    /// The placeholder was finalized with the service's reply.
    Answered(ChatMessage),
    /// The placeholder was finalized with a failure text.
    Failed { message: ChatMessage, kind: FailureKind },
}

impl ExchangeOutcome {
    /// The finalized bot message, if the exchange ran.
    pub fn message(&self) -> Option<&ChatMessage> {
        match self {
            ExchangeOutcome::Skipped => None,
            ExchangeOutcome::Answered(message) | ExchangeOutcome::Failed { message, .. } => {
                Some(message)
            }
        }
    }

    /// Short machine-readable name: `skipped`, `answered` or `failed`.
    pub fn label(&self) -> &'static str {
        match self {
            ExchangeOutcome::Skipped => "skipped",
            ExchangeOutcome::Answered(_) => "answered",
            ExchangeOutcome::Failed { .. } => "failed",
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExchangeOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Clears the busy gate and the typing flag when the exchange ends,
/// including when its future is dropped mid-flight.
///
/// While armed with a placeholder, dropping the guard finalizes that
/// placeholder with the generic failure text.
struct InFlight<'a> {
    busy: &'a AtomicBool,
    typing: &'a TypingIndicator,
    store: &'a MessageStore,
    placeholder: Option<(String, bool)>,
}

impl InFlight<'_> {
    fn arm(&mut self, temp_id: &str, is_guest: bool) {
        self.placeholder = Some((temp_id.to_string(), is_guest));
    }

    fn disarm(&mut self) {
        self.placeholder = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some((temp_id, is_guest)) = self.placeholder.take() {
            let finalized = self.store.replace_by_temp_id(&temp_id, |old| ChatMessage {
                message: FailureKind::Other.user_message().to_string(),
                temp_id: None,
                status: if is_guest {
                    MessageStatus::Local
                } else {
                    MessageStatus::Failed
                },
                ..old.clone()
            });
            match finalized {
                Ok(_) => warn!(temp_id = %temp_id, "Exchange cancelled, placeholder marked failed"),
                Err(e) => {
                    debug!(temp_id = %temp_id, error = %e, "Cancelled placeholder already gone")
                }
            }
        }
        self.typing.set_typing(false);
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// The message exchange state machine of one chat instance.
///
/// Owns the instance's message list, typing flag, conversation slot and
/// busy gate, so separate instances never share state.
pub struct ChatExchange<C: CompletionService, P: PersistenceService> {
    completion: Arc<C>,
    persistence: Arc<P>,
    identity: ChatIdentity,
    config: ExchangeConfig,
    events: EventBus,
    store: MessageStore,
    typing: TypingIndicator,
    conversation: ConversationSlot,
    busy: AtomicBool,
    background: TaskTracker,
}

impl<C, P> ChatExchange<C, P>
where
    C: CompletionService + 'static,
    P: PersistenceService + 'static,
{
    /// Create a chat instance with an empty message list.
    pub fn new(
        completion: Arc<C>,
        persistence: Arc<P>,
        identity: ChatIdentity,
        config: ExchangeConfig,
    ) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self {
            completion,
            persistence,
            identity,
            store: MessageStore::new(events.clone()),
            typing: TypingIndicator::new(events.clone()),
            events,
            config,
            conversation: ConversationSlot::default(),
            busy: AtomicBool::new(false),
            background: TaskTracker::new(),
        }
    }

    pub fn identity(&self) -> &ChatIdentity {
        &self.identity
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn typing(&self) -> &TypingIndicator {
        &self.typing
    }

    pub fn conversation(&self) -> &ConversationSlot {
        &self.conversation
    }

    /// Subscribe to message-list and typing changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Whether an exchange is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Send `text` to the completion service and finalize one bot message.
    ///
    /// Returns [`ExchangeOutcome::Skipped`] without side effects when an
    /// exchange is already in flight. The only error returned after the
    /// placeholder exists is [`ExchangeError::MissingCredential`], and by
    /// then the placeholder has already been finalized as a failure.
    pub async fn send_message(
        &self,
        text: &str,
        explicit_conversation_id: Option<i64>,
    ) -> Result<ExchangeOutcome, ExchangeError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(session_id = ?self.identity.session_id, "Exchange in flight, message dropped");
            return Ok(ExchangeOutcome::Skipped);
        }
        self.typing.set_typing(true);
        let mut in_flight = InFlight {
            busy: &self.busy,
            typing: &self.typing,
            store: &self.store,
            placeholder: None,
        };

        let is_guest = self.identity.is_guest;
        let session_id = self.identity.session_id.clone();
        let conversation_id = self.resolve_conversation(explicit_conversation_id).await;

        let temp_id = ids::temp_id(is_guest);
        self.store.append(ChatMessage {
            id: temp_id.clone(),
            sender_type: SenderType::Bot,
            message: PLACEHOLDER_TEXT.to_string(),
            conversation_id: if is_guest { None } else { conversation_id },
            session_id: session_id.clone(),
            created_at: Utc::now(),
            temp_id: Some(temp_id.clone()),
            status: if is_guest {
                MessageStatus::Local
            } else {
                MessageStatus::Sending
            },
        })?;
        in_flight.arm(&temp_id, is_guest);

        tokio::time::sleep(self.config.pacing_delay()).await;

        let result = match tokio::time::timeout(
            self.config.completion_timeout(),
            self.completion.complete(text, session_id.as_deref()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout),
        };

        match result {
            Ok(reply) => {
                let reply = reply
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());

                let finalized = self.store.replace_by_temp_id(&temp_id, |old| ChatMessage {
                    id: ids::final_id(is_guest),
                    message: reply.clone(),
                    temp_id: None,
                    status: if is_guest {
                        MessageStatus::Local
                    } else {
                        MessageStatus::Sent
                    },
                    ..old.clone()
                })?;
                in_flight.disarm();

                info!(
                    session_id = ?session_id,
                    id = %finalized.id,
                    is_guest,
                    "Bot reply received"
                );

                if !is_guest && reply != PLACEHOLDER_TEXT {
                    match conversation_id {
                        Some(conversation_id) => self.persist(SaveBotMessage {
                            conversation_id,
                            message: reply,
                            session_id,
                        }),
                        None => info!("No conversation yet, reply shown but not persisted"),
                    }
                }

                Ok(ExchangeOutcome::Answered(finalized))
            }
            Err(e) => {
                let kind = e.kind();
                warn!(session_id = ?session_id, error = %e, kind = ?kind, "Chat completion failed");

                let finalized = self.store.replace_by_temp_id(&temp_id, |old| ChatMessage {
                    message: kind.user_message().to_string(),
                    temp_id: None,
                    status: if is_guest {
                        MessageStatus::Local
                    } else {
                        MessageStatus::Failed
                    },
                    ..old.clone()
                })?;
                in_flight.disarm();

                if matches!(e, CompletionError::MissingCredential) {
                    return Err(ExchangeError::MissingCredential);
                }
                Ok(ExchangeOutcome::Failed {
                    message: finalized,
                    kind,
                })
            }
        }
    }

    /// Wait for background persistence calls started so far.
    pub async fn flush_background(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }

    /// Explicit id first, then the slot; members without either wait once
    /// for the conversation to be created elsewhere.
    async fn resolve_conversation(&self, explicit: Option<i64>) -> Option<i64> {
        let known = explicit.or_else(|| self.conversation.get());
        if known.is_some() || self.identity.is_guest {
            return known;
        }

        debug!("Waiting for conversation to be created");
        self.conversation
            .wait_for(self.config.conversation_wait())
            .await
    }

    fn persist(&self, payload: SaveBotMessage) {
        let persistence = Arc::clone(&self.persistence);
        self.background.spawn(async move {
            match persistence.save_bot_message(&payload).await {
                Ok(()) => debug!(conversation_id = payload.conversation_id, "Bot reply persisted"),
                Err(e) => warn!(
                    conversation_id = payload.conversation_id,
                    error = %e,
                    "Failed to persist bot reply"
                ),
            }
        });
    }
}
