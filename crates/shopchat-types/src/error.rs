use thiserror::Error;

use crate::message::{
    CONNECTIVITY_TEXT, GENERIC_FAILURE_TEXT, MessageStatus, UNAUTHORIZED_TEXT,
};

/// Errors from the chat completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion API token is not configured")]
    MissingCredential,

    #[error("completion API rejected credentials ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("completion request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("completion API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl CompletionError {
    /// Classify this error for user-facing reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            CompletionError::MissingCredential => FailureKind::Configuration,
            CompletionError::Unauthorized { .. } => FailureKind::Unauthorized,
            CompletionError::Timeout | CompletionError::Network(_) => FailureKind::Connectivity,
            CompletionError::Status { .. } | CompletionError::Deserialization(_) => {
                FailureKind::Other
            }
        }
    }
}

/// Coarse failure class of a chat exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unauthorized,
    Connectivity,
    /// The completion credential is missing; reported with the generic text.
    Configuration,
    Other,
}

impl FailureKind {
    /// The Vietnamese text that replaces the placeholder.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::Unauthorized => UNAUTHORIZED_TEXT,
            FailureKind::Connectivity => CONNECTIVITY_TEXT,
            FailureKind::Configuration | FailureKind::Other => GENERIC_FAILURE_TEXT,
        }
    }
}

/// Errors from the bot-message persistence endpoint.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend error {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors from the chat history endpoint.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("network error: {0}")]
    Network(String),

    #[error("history request failed with status {0}")]
    Status(u16),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors from the in-memory message store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no pending message with temp id '{0}'")]
    NotFound(String),

    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition {
        from: MessageStatus,
        to: MessageStatus,
    },

    #[error("temp id '{0}' is already pending")]
    DuplicateTempId(String),
}

/// Errors surfaced by `send_message` itself.
///
/// Every other failure is absorbed into the finalized bot message.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("completion API token is not configured")]
    MissingCredential,

    #[error("message store error: {0}")]
    Store(#[from] StoreError),
}
