//! PersistenceService trait definition.

use shopchat_types::error::PersistenceError;
use shopchat_types::message::SaveBotMessage;

/// Durable storage of finalized bot replies (members only).
///
/// Implementations live in shopchat-infra (e.g., `BackendClient`).
/// Callers treat this as fire-and-forget.
pub trait PersistenceService: Send + Sync {
    fn save_bot_message(
        &self,
        payload: &SaveBotMessage,
    ) -> impl std::future::Future<Output = Result<(), PersistenceError>> + Send;
}
