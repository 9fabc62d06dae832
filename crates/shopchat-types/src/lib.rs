//! Shared domain types for the storefront chat widget.
//!
//! Chat messages, observer events, history records, configuration, and
//! the error enums shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod message;
