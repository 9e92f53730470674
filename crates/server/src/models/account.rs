//! Account domain type.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use nexus_core::{AccessScope, AccountId, Email, Role};

use super::session::CurrentUser;

/// A registered account.
///
/// Accounts are created on sign-up and read on sign-in; they are never
/// updated or deleted.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Email address (unique key).
    pub email: Email,
    /// Argon2 PHC-format hash of the password.
    pub password_hash: SecretString,
    /// Account role (`user` or `admin`).
    pub role: Role,
    /// Sector lock or general access. `None` for admins.
    pub access: Option<AccessScope>,
    /// Name shown in the UI (the email's local part).
    pub display_name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The session record written when this account signs in.
    #[must_use]
    pub fn to_session(&self) -> CurrentUser {
        CurrentUser {
            email: self.email.clone(),
            role: self.role,
            access: self.access.clone(),
            display_name: self.display_name.clone(),
        }
    }
}
