//! Conversation handlers.
//!
//! Conversations the caller does not take part in answer 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::auth::{AppState, CurrentUser};
use crate::web::dto::{
    ApiResponse, ConversationResponse, CreateConversationRequest, CreateMessageRequest,
    ListResponse, MessageResponse, ValidatedJson,
};
use crate::web::error::ApiError;

/// POST /api/conversations - Start a conversation.
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ConversationResponse>>), ApiError> {
    let conversation = state
        .conversations()
        .create(&caller, req.conversation_type, req.topic, &req.participants)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(conversation.into())),
    ))
}

/// GET /api/conversations - List the caller's conversations.
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ListResponse<ConversationResponse>>, ApiError> {
    let conversations = state.conversations().list_for_user(&caller).await?;
    Ok(Json(ListResponse::new(
        conversations.into_iter().map(Into::into).collect(),
    )))
}

/// GET /api/conversations/:id - Get one of the caller's conversations.
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ConversationResponse>>, ApiError> {
    let conversation = state
        .conversations()
        .get_for_participant(&caller, id)
        .await?;
    Ok(Json(ApiResponse::new(conversation.into())))
}

/// GET /api/conversations/:id/messages - List messages, oldest first.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ListResponse<MessageResponse>>, ApiError> {
    let messages = state.conversations().list_messages(&caller, id).await?;
    Ok(Json(ListResponse::new(
        messages.into_iter().map(Into::into).collect(),
    )))
}

/// POST /api/conversations/:id/messages - Post a message.
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    let message = state
        .conversations()
        .add_message(&caller, id, &req.content)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(message.into()))))
}
