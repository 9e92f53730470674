//! Authentication route handlers.
//!
//! Sign-up, sign-in, guest entry, the simulated password reset and logout.
//! Failed forms are re-rendered with every problem listed and the visitor's
//! input kept.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tower_sessions::cookie::{Cookie, SameSite, time::Duration as CookieDuration};

use nexus_core::Role;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    clear_current_user, current_conversation, set_conversation, set_current_user,
};
use crate::models::CurrentUser;
use crate::services::{AuthError, Registration};
use crate::state::AppState;

/// Cookie holding the remembered sign-in email.
pub const REMEMBER_COOKIE: &str = "remember_email";

/// How long a remembered email is kept.
const REMEMBER_DAYS: i64 = 30;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-up form data. Checkboxes are absent when unchecked.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub role: String,
    pub general_access: Option<String>,
    pub domain: Option<String>,
}

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub remember: Option<String>,
}

/// Forgot password form data. Submitted from the sign-in form, so the other
/// sign-in fields may come along.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
    pub remember: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub errors: Vec<String>,
    pub email: String,
    pub role: Role,
    pub general_access: bool,
    pub domain: String,
    pub domains: Vec<String>,
}

impl SignupTemplate {
    /// The "General User" checkbox is only offered to the user role.
    #[must_use]
    pub fn show_general_access(&self) -> bool {
        self.role == Role::User
    }

    /// The domain selector is hidden for admins and for general users.
    #[must_use]
    pub fn show_domain(&self) -> bool {
        self.role == Role::User && !self.general_access
    }

    fn is_selected(&self, domain: &str) -> bool {
        self.domain.eq_ignore_ascii_case(domain)
    }
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "signin.html")]
pub struct SigninTemplate {
    pub errors: Vec<String>,
    pub success: Option<String>,
    pub email: String,
    pub remember: bool,
}

// =============================================================================
// Sign-up
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(State(state): State<AppState>) -> impl IntoResponse {
    SignupTemplate {
        errors: Vec::new(),
        email: String::new(),
        role: Role::User,
        general_access: false,
        domain: String::new(),
        domains: state.domains().names(),
    }
}

/// Handle sign-up form submission.
///
/// A new account is signed in straight away and sent to its home page.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let registration = Registration {
        email: &form.email,
        password: &form.password,
        confirm_password: &form.confirm_password,
        role: &form.role,
        general_access: form.general_access.is_some(),
        domain: form.domain.as_deref(),
    };

    match state.auth().register(registration).await {
        Ok(account) => match start_session(&state, &session, &account.to_session()).await {
            Ok(home) => Redirect::to(home).into_response(),
            Err(e) => e.into_response(),
        },
        Err(err) => {
            let status = failure_status(&err);
            let template = SignupTemplate {
                errors: err.user_messages(),
                email: form.email.trim().to_string(),
                role: form.role.parse().unwrap_or_default(),
                general_access: form.general_access.is_some(),
                domain: form.domain.unwrap_or_default(),
                domains: state.domains().names(),
            };
            (status, template).into_response()
        }
    }
}

// =============================================================================
// Sign-in
// =============================================================================

/// Display the sign-in page, pre-filling a remembered email.
pub async fn signin_page(headers: HeaderMap) -> impl IntoResponse {
    let remembered = remembered_email(&headers);
    SigninTemplate {
        errors: Vec::new(),
        success: None,
        remember: remembered.is_some(),
        email: remembered.unwrap_or_default(),
    }
}

/// Handle sign-in form submission.
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Response {
    let remember = form.remember.is_some();

    match state.auth().login(&form.email, &form.password).await {
        Ok(account) => {
            let home = match start_session(&state, &session, &account.to_session()).await {
                Ok(home) => home,
                Err(e) => return e.into_response(),
            };

            let mut response = Redirect::to(home).into_response();
            if let Some(cookie) = remember_cookie(account.email.as_str(), remember) {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            response
        }
        Err(err) => {
            tracing::info!(error = %err, "Sign-in failed");
            let status = failure_status(&err);
            let template = SigninTemplate {
                errors: err.user_messages(),
                success: None,
                email: form.email.trim().to_string(),
                remember,
            };
            (status, template).into_response()
        }
    }
}

/// Enter as a guest: general access, no account.
pub async fn guest(State(state): State<AppState>, session: Session) -> Response {
    match start_session(&state, &session, &CurrentUser::guest()).await {
        Ok(home) => Redirect::to(home).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Simulated password reset. Nothing is sent.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let remember = form.remember.is_some();
    let email = form.email.trim().to_string();

    match state.auth().request_password_reset(&email) {
        Ok(email) => SigninTemplate {
            errors: Vec::new(),
            success: Some(format!(
                "Password reset link sent to {email}. Check your inbox!"
            )),
            email: email.into_inner(),
            remember,
        }
        .into_response(),
        Err(err) => {
            let status = failure_status(&err);
            let template = SigninTemplate {
                errors: err.user_messages(),
                success: None,
                email,
                remember,
            };
            (status, template).into_response()
        }
    }
}

/// End the session and return to sign-up.
///
/// The conversation slot is closed first, so a reply still pending for this
/// session is dropped.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    match current_conversation(&session).await {
        Ok(Some(id)) => state.conversations().remove(id).await,
        Ok(None) => {}
        Err(e) => tracing::error!("Failed to read session: {}", e),
    }
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/signup").into_response()
}

// =============================================================================
// Helpers
// =============================================================================

/// Write `user` into a fresh session with a new conversation slot and return
/// where it lands.
async fn start_session(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> Result<&'static str, AppError> {
    if let Some(previous) = current_conversation(session).await? {
        state.conversations().remove(previous).await;
    }

    // New identity, new session id
    session.cycle_id().await?;
    set_current_user(session, user).await?;
    set_conversation(session, state.conversations().create().await).await?;
    set_sentry_user(user.email.as_str(), user.role.as_str());
    tracing::info!(role = user.role.as_str(), "Signed in");
    Ok(user.home_path())
}

const fn failure_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::UserAlreadyExists => StatusCode::CONFLICT,
        AuthError::Repository(_) | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Cookie values cannot carry quotes, separators or backslashes.
fn is_cookie_safe(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '\\'))
}

/// `Set-Cookie` value that remembers `email`, or forgets it when `remember`
/// is off.
fn remember_cookie(email: &str, remember: bool) -> Option<HeaderValue> {
    let cookie = if remember {
        if !is_cookie_safe(email) {
            return None;
        }
        Cookie::build((REMEMBER_COOKIE, email.to_owned()))
            .path("/")
            .max_age(CookieDuration::days(REMEMBER_DAYS))
            .same_site(SameSite::Lax)
            .http_only(true)
            .build()
    } else {
        let mut cookie = Cookie::new(REMEMBER_COOKIE, "");
        cookie.set_path("/");
        cookie.make_removal();
        cookie
    };
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// Email stored by a previous "remember me" sign-in.
fn remembered_email(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == REMEMBER_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|email| !email.is_empty())
}
