//! Sector names and the domain-scoped access model.
//!
//! Every chatting account is either locked to a single sector (its knowledge
//! domain) or holds general access across all sectors. Uploaded resources are
//! tagged with the sector they belong to, and [`AccessScope::permits`] is the
//! one place that decides whether a scope may see a sector's resources.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DomainName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The name is empty after trimming.
    #[error("domain name cannot be empty")]
    Empty,
    /// The name is too long.
    #[error("domain name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The name collides with the general-access marker.
    #[error("\"general\" is reserved for general access")]
    Reserved,
}

/// The name of a sector, e.g. `Legal` or `Medical`.
///
/// Names are trimmed and kept in their display casing. Whether a name is
/// actually registered is the server's domain registry's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Maximum length of a sector name.
    pub const MAX_LENGTH: usize = 64;

    /// Marker stored instead of a sector for general-access accounts.
    pub const GENERAL: &'static str = "general";

    /// Parse a `DomainName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 64
    /// characters, or equal to `general` in any casing.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(DomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if trimmed.eq_ignore_ascii_case(Self::GENERAL) {
            return Err(DomainError::Reserved);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against raw input.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which sectors a chatting session can see.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "domain", rename_all = "snake_case")]
pub enum AccessScope {
    /// Cross-domain visibility.
    General,
    /// Locked to one sector's knowledge base.
    Locked(DomainName),
}

impl AccessScope {
    /// Whether resources of `domain` are visible to this scope.
    #[must_use]
    pub fn permits(&self, domain: &DomainName) -> bool {
        match self {
            Self::General => true,
            Self::Locked(own) => own == domain,
        }
    }

    /// The locked sector, if any.
    #[must_use]
    pub const fn domain(&self) -> Option<&DomainName> {
        match self {
            Self::General => None,
            Self::Locked(domain) => Some(domain),
        }
    }

    #[must_use]
    pub const fn is_general(&self) -> bool {
        matches!(self, Self::General)
    }

    /// The value stored in an account's domain column: the sector name, or
    /// `general`.
    #[must_use]
    pub fn domain_label(&self) -> &str {
        match self {
            Self::General => DomainName::GENERAL,
            Self::Locked(domain) => domain.as_str(),
        }
    }

    /// Badge shown in the chat header.
    #[must_use]
    pub fn badge(&self) -> String {
        match self {
            Self::General => "🌍 General Access".to_owned(),
            Self::Locked(domain) => format!("🔒 {domain} Domain"),
        }
    }

    /// Instruction line shown above the conversation.
    #[must_use]
    pub fn instruction(&self) -> String {
        match self {
            Self::General => {
                "You have access to resources across all organizational domains.".to_owned()
            }
            Self::Locked(domain) => {
                format!("I am locked to the {domain} knowledge base provided by your Admin.")
            }
        }
    }

    /// Placeholder text for the chat input.
    #[must_use]
    pub fn placeholder(&self) -> String {
        match self {
            Self::General => "Ask anything across all domains...".to_owned(),
            Self::Locked(domain) => format!("Ask about {domain}..."),
        }
    }
}
