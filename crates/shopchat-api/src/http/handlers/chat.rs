//! Chat widget HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/chat/{session_id}/messages     - Run one exchange
//! - GET  /api/v1/chat/{session_id}/messages     - Current message list
//! - GET  /api/v1/chat/{session_id}/typing       - Typing and busy flags
//! - PUT  /api/v1/chat/{session_id}/conversation - Fill the conversation slot
//! - GET  /api/v1/chat/{session_id}/history      - Cached provider history
//! - POST /api/v1/chat/{session_id}/history      - Load provider history
//!
//! A chat instance is created on first use by any mutating endpoint. The
//! `guest` flag only applies at creation and defaults to true.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shopchat_types::history::HistoryRecord;
use shopchat_types::message::ChatMessage;

use crate::cli::chat::renderer::outcome_json;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub guest: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetConversationRequest {
    pub conversation_id: i64,
    #[serde(default)]
    pub guest: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GuestQuery {
    #[serde(default)]
    pub guest: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TypingView {
    pub bot: bool,
    pub busy: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub conversation_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub loaded: usize,
    pub messages: Vec<ChatMessage>,
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// POST /api/v1/chat/{session_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let chat = state.chat(&session_id, body.guest.unwrap_or(true));
    let outcome = chat.send(&body.message, body.conversation_id).await?;

    tracing::info!(
        session_id = %session_id,
        outcome = outcome.label(),
        "Chat exchange finished"
    );

    Ok(Json(ApiResponse::success(
        outcome_json(&outcome),
        request_id,
        elapsed_ms(start),
    )))
}

/// GET /api/v1/chat/{session_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chat = state
        .existing_chat(&session_id)
        .ok_or_else(|| AppError::ChatNotFound(session_id.clone()))?;

    Ok(Json(ApiResponse::success(
        chat.exchange.store().snapshot(),
        request_id,
        elapsed_ms(start),
    )))
}

/// GET /api/v1/chat/{session_id}/typing
pub async fn get_typing(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<TypingView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chat = state
        .existing_chat(&session_id)
        .ok_or_else(|| AppError::ChatNotFound(session_id.clone()))?;

    let view = TypingView {
        bot: chat.exchange.typing().is_typing(),
        busy: chat.exchange.is_busy(),
    };
    Ok(Json(ApiResponse::success(view, request_id, elapsed_ms(start))))
}

/// PUT /api/v1/chat/{session_id}/conversation
pub async fn set_conversation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<SetConversationRequest>,
) -> Result<Json<ApiResponse<ConversationView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chat = state.chat(&session_id, body.guest.unwrap_or(true));
    chat.exchange.conversation().set(Some(body.conversation_id));
    tracing::debug!(
        session_id = %session_id,
        conversation_id = body.conversation_id,
        "Conversation attached"
    );

    let view = ConversationView {
        conversation_id: chat.exchange.conversation().get(),
    };
    Ok(Json(ApiResponse::success(view, request_id, elapsed_ms(start))))
}

/// GET /api/v1/chat/{session_id}/history
///
/// The last fetched records, refreshed after every answered exchange.
pub async fn history_snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<HistoryRecord>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chat = state
        .existing_chat(&session_id)
        .ok_or_else(|| AppError::ChatNotFound(session_id.clone()))?;

    Ok(Json(ApiResponse::success(
        chat.history.snapshot(),
        request_id,
        elapsed_ms(start),
    )))
}

/// POST /api/v1/chat/{session_id}/history
pub async fn load_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<GuestQuery>,
) -> Result<Json<ApiResponse<HistoryView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chat = state.chat(&session_id, query.guest.unwrap_or(true));
    let conversation_id = chat.exchange.conversation().get();
    let messages = chat
        .history
        .load_into(chat.exchange.store(), conversation_id)
        .await;

    let view = HistoryView {
        loaded: messages.len(),
        messages,
    };
    Ok(Json(ApiResponse::success(view, request_id, elapsed_ms(start))))
}
