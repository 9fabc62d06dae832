//! Service traits for the remote collaborators of a chat.
//!
//! Implementations live in shopchat-infra (HTTP clients) and in test
//! modules (in-process fakes).

pub mod completion;
pub mod history;
pub mod persistence;
