//! Chat instance state and the message exchange state machine.
//!
//! A chat instance owns a `MessageStore`, a `TypingIndicator`, and a
//! `ConversationSlot`; `ChatExchange` drives one user message through
//! placeholder, remote completion, and finalization.

pub mod conversation;
pub mod exchange;
pub mod ids;
pub mod store;
pub mod typing;
