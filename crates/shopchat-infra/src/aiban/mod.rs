//! Chat completion provider (aiban.vn) integration.
//!
//! - `client`: `AibanClient` implementing `CompletionService` and `HistoryService`
//! - `types`: wire request/response shapes

pub mod client;
pub mod types;

pub use client::AibanClient;
