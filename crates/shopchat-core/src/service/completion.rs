//! CompletionService trait definition.
//!
//! The remote chat-reply API. Uses RPITIT (native async fn in traits,
//! Rust 2024 edition) like the other service traits in this crate.

use shopchat_types::error::CompletionError;

/// Trait for the remote chat completion backend.
///
/// Implementations live in shopchat-infra (e.g., `AibanClient`).
pub trait CompletionService: Send + Sync {
    /// Ask for a reply to `message` within `session_id`.
    ///
    /// `Ok(None)` means the service answered without a reply text; the
    /// caller substitutes its fallback. Non-2xx responses, transport
    /// failures, and a missing credential are errors.
    fn complete(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Option<String>, CompletionError>> + Send;
}
