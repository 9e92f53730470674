//! Authentication middleware and extractors.
//!
//! Pages reject by redirecting to sign-up; the JSON endpoints under `/admin/`
//! and `/chat/` reject with 401 (no session) or 403 (wrong role).

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use nexus_core::ConversationId;

use crate::models::{CurrentUser, session_keys};

/// Where rejected page requests are sent.
const SIGNUP_PATH: &str = "/signup";

/// Extractor that requires an admin session.
///
/// # Example
///
/// ```rust,ignore
/// async fn panel(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.display_name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that requires a session allowed to chat (user or guest).
pub struct RequireChatUser(pub CurrentUser);

/// Error returned when a request lacks a suitable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to the sign-up page (for HTML requests).
    RedirectToSignup,
    /// No session (for API requests).
    Unauthorized,
    /// Signed in under the wrong role (for API requests).
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignup => Redirect::to(SIGNUP_PATH).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Please sign in first." })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "You do not have access to this page." })),
            )
                .into_response(),
        }
    }
}

/// JSON endpoints live below the page paths.
fn is_api_path(path: &str) -> bool {
    path.starts_with("/admin/") || path.starts_with("/chat/")
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Load the session user and check it with `allowed`.
async fn require(
    parts: &Parts,
    allowed: impl FnOnce(&CurrentUser) -> bool,
) -> Result<CurrentUser, AuthRejection> {
    let api = is_api_path(parts.uri.path());
    let Some(user) = current_user(parts).await else {
        return Err(if api {
            AuthRejection::Unauthorized
        } else {
            AuthRejection::RedirectToSignup
        });
    };

    if allowed(&user) {
        return Ok(user);
    }

    tracing::info!(
        email = %user.email,
        role = user.role.as_str(),
        path = parts.uri.path(),
        "Role not allowed"
    );
    Err(if api {
        AuthRejection::Forbidden
    } else {
        AuthRejection::RedirectToSignup
    })
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts, |user| user.role.is_admin()).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireChatUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require(parts, |user| user.role.can_chat()).await.map(Self)
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to record the session's conversation slot.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_conversation(
    session: &Session,
    id: ConversationId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CONVERSATION, id).await
}

/// The session's conversation slot, if one was opened at sign-in.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn current_conversation(
    session: &Session,
) -> Result<Option<ConversationId>, tower_sessions::session::Error> {
    session.get(session_keys::CONVERSATION).await
}

/// Helper to end the session (logout).
///
/// Drops every key and expires the cookie.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_paths() {
        assert!(is_api_path("/admin/files"));
        assert!(is_api_path("/chat/messages"));
        assert!(!is_api_path("/admin"));
        assert!(!is_api_path("/chat"));
    }

    #[test]
    fn test_rejection_responses() {
        let redirect = AuthRejection::RedirectToSignup.into_response();
        assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect.headers()["location"], SIGNUP_PATH);

        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
