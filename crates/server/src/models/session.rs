//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use nexus_core::{AccessScope, Email, Role};

/// Email used for every guest session.
pub const GUEST_EMAIL: &str = "guest@nexus.ai";

/// Session-stored user identity.
///
/// Everything a page needs to know about the visitor, so handlers never
/// touch the account store after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account email (or the shared guest address).
    pub email: Email,
    /// Role the session acts under.
    pub role: Role,
    /// Sector lock or general access. `None` for admins.
    pub access: Option<AccessScope>,
    /// Name shown in the UI.
    pub display_name: String,
}

impl CurrentUser {
    /// A guest session: general access, no account behind it.
    ///
    /// # Panics
    ///
    /// Never: the guest address is a valid constant.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn guest() -> Self {
        Self {
            email: Email::parse(GUEST_EMAIL).expect("guest email is valid"),
            role: Role::Guest,
            access: Some(AccessScope::General),
            display_name: "Guest".to_string(),
        }
    }

    /// Upper-cased first letter of the display name, for the avatar.
    #[must_use]
    pub fn initial(&self) -> String {
        self.display_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }

    /// Where this session lands after signing in.
    #[must_use]
    pub const fn home_path(&self) -> &'static str {
        if self.role.is_admin() { "/admin" } else { "/chat" }
    }

    /// Access scope used for chat; chatting roles without one fall back to
    /// general access.
    #[must_use]
    pub fn chat_scope(&self) -> AccessScope {
        self.access.clone().unwrap_or(AccessScope::General)
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the ID of the session's conversation slot.
    pub const CONVERSATION: &str = "conversation";
}
