//! Chat panel route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use nexus_core::{AccessScope, ConversationId};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireChatUser, current_conversation};
use crate::models::{ChatMessage, Conversation, CurrentUser, UploadedFile};
use crate::services::ChatError;
use crate::state::AppState;

/// Message sent from the chat input.
#[derive(Debug, Deserialize)]
pub struct SendMessage {
    pub message: String,
}

/// The user's message and the reply, as appended to the conversation.
#[derive(Debug, Serialize)]
pub struct ChatExchange {
    pub user: ChatMessage,
    pub ai: ChatMessage,
}

/// Chat panel template.
#[derive(Template, WebTemplate)]
#[template(path = "chat.html")]
pub struct ChatTemplate {
    pub user: CurrentUser,
    pub scope: AccessScope,
    pub resources: Vec<UploadedFile>,
}

/// Display the chat panel. Each visit starts a new conversation.
pub async fn index(
    State(state): State<AppState>,
    RequireChatUser(user): RequireChatUser,
    session: Session,
) -> Result<impl IntoResponse> {
    let id = conversation_id(&session).await?;
    state.conversations().reset(id).await.map_err(ChatError::from)?;

    let scope = user.chat_scope();
    let resources = state.uploads().list_visible(&scope).await;

    Ok(ChatTemplate {
        user,
        scope,
        resources,
    })
}

/// The conversation so far.
pub async fn messages(
    State(state): State<AppState>,
    RequireChatUser(_user): RequireChatUser,
    session: Session,
) -> Result<Json<Conversation>> {
    let id = conversation_id(&session).await?;
    let conversation = state
        .conversations()
        .get(id)
        .await
        .ok_or(ChatError::ConversationEnded)?;
    Ok(Json(conversation))
}

/// Send a message and wait for the simulated reply.
///
/// Only reads the session: the messages go to the conversation store, so a
/// logout that lands while the reply is pending stays in effect.
pub async fn send_message(
    State(state): State<AppState>,
    RequireChatUser(user): RequireChatUser,
    session: Session,
    Json(request): Json<SendMessage>,
) -> Result<Json<ChatExchange>> {
    let scope = user.chat_scope();
    let id = conversation_id(&session).await?;

    let (user_message, ai_message) = state
        .chat()
        .reply(&state.conversations(), id, &scope, &request.message)
        .await?;

    add_breadcrumb(
        "chat",
        "Chat message answered",
        Some(&[("scope", scope.domain_label())]),
    );

    Ok(Json(ChatExchange {
        user: user_message,
        ai: ai_message,
    }))
}

async fn conversation_id(session: &Session) -> Result<ConversationId> {
    Ok(current_conversation(session)
        .await?
        .ok_or(ChatError::ConversationEnded)?)
}
