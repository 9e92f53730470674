//! Account roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a role name is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct RoleError(pub String);

/// What an account or session is allowed to do.
///
/// - `User` chats within its access scope.
/// - `Admin` uploads sector resources; it never chats.
/// - `Guest` is a session-only role created by guest entry. It chats with
///   general access and never exists in the account store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
    Guest,
}

impl Role {
    /// Returns the lowercase name used in forms and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Guest => "guest",
        }
    }

    /// Whether this role may open the chat panel.
    #[must_use]
    pub const fn can_chat(self) -> bool {
        matches!(self, Self::User | Self::Guest)
    }

    /// Whether this role may manage uploaded resources.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role can be chosen on the sign-up form.
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        !matches!(self, Self::Guest)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "guest" => Ok(Self::Guest),
            other => Err(RoleError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("guest".parse::<Role>().unwrap(), Role::Guest);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(Role::User.can_chat());
        assert!(Role::Guest.can_chat());
        assert!(!Role::Admin.can_chat());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Guest.is_selectable());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"guest\"").unwrap();
        assert_eq!(role, Role::Guest);
    }
}
