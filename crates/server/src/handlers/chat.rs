//! # Chat Route Handlers
//!
//! The public room is anonymous and keyed by a session id the server issues.
//! The private room requires a bearer token and is keyed by the token's user id.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::{
    auth::middleware::AuthenticatedUser,
    types::{ChatRequest, ChatResponse},
};
use askpti::{AssistantReply, ChatOutcome, ConversationTurn};
use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

fn validated_query(payload: &ChatRequest) -> Result<&str, AppError> {
    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("query must not be empty.".to_string()));
    }
    Ok(query)
}

fn reply_debug_info(reply: &AssistantReply) -> Value {
    json!({
        "variant": reply.variant,
        "prompt": reply.prompt,
        "snippets": reply.snippets,
        "index_answer": reply.index_answer,
        "degraded": reply.degraded,
    })
}

fn chat_response(
    outcome: ChatOutcome,
    session_id: Option<String>,
    debug_params: Query<DebugParams>,
) -> Json<ApiResponse<ChatResponse>> {
    let debug_info = reply_debug_info(&outcome.reply);
    let response = ChatResponse {
        text: outcome.reply.text,
        session_id,
        warning: outcome.warning,
    };
    wrap_response(response, debug_params, Some(debug_info))
}

/// The handler for `POST /chat/public`.
///
/// A new session id is issued when the request carries none, or one this
/// server does not hold (never issued, or evicted).
pub async fn public_chat_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let query = validated_query(&payload)?;
    let requested = payload
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let known = match requested {
        Some(id) => app_state.public_sessions.contains(id).await,
        None => false,
    };
    let session_id = match requested {
        Some(id) if known => id.to_string(),
        Some(id) => {
            debug!(session_id = %id, "Unknown or expired session id, issuing a new one.");
            Uuid::new_v4().to_string()
        }
        None => Uuid::new_v4().to_string(),
    };
    info!(session_id = %session_id, "Received public chat query.");

    let outcome = app_state
        .public_room
        .send(&app_state.assistant, &session_id, query)
        .await?;

    Ok(chat_response(outcome, Some(session_id), debug_params))
}

/// The handler for `POST /chat/private`.
pub async fn private_chat_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let query = validated_query(&payload)?;
    info!(user_id = %user.user_id, "Received private chat query.");

    let outcome = app_state
        .private_room
        .send(&app_state.assistant, &user.user_id, query)
        .await?;

    Ok(chat_response(outcome, None, debug_params))
}

/// The handler for `GET /chat/private/history`.
pub async fn private_history_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<Vec<ConversationTurn>>>, AppError> {
    let history = app_state.private_room.history(&user.user_id).await?;
    let debug_info = json!({ "user_id": user.user_id, "turns": history.len() });
    Ok(wrap_response(history, debug_params, Some(debug_info)))
}
