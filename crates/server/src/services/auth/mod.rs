//! Authentication service.
//!
//! Sign-up, sign-in and the simulated password reset. Validation collects
//! every problem with a form before reporting, so the visitor sees all of
//! them at once.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use nexus_core::{AccessScope, AccountId, Email, Role};

use crate::db::{AccountRepository, MemoryDb, RepositoryError};
use crate::models::account::Account;
use crate::services::domains::DomainRegistry;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const MSG_INVALID_EMAIL: &str = "Please enter a valid email address.";
const MSG_SHORT_PASSWORD: &str = "Password must be at least 8 characters long.";
const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match.";
const MSG_DOMAIN_REQUIRED: &str = "Please select a domain or check \"General User\".";
const MSG_UNKNOWN_DOMAIN: &str = "Please select one of the listed domains.";
const MSG_UNKNOWN_ROLE: &str = "Please choose either the User or the Admin role.";
const MSG_PASSWORD_REQUIRED: &str = "Password is required.";
const MSG_RESET_EMAIL_REQUIRED: &str = "Please enter your email address to reset your password.";

/// Sign-up form input, as submitted.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub email: &'r str,
    pub password: &'r str,
    pub confirm_password: &'r str,
    pub role: &'r str,
    pub general_access: bool,
    pub domain: Option<&'r str>,
}

/// Authentication service.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
    domains: &'a DomainRegistry,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(db: &'a MemoryDb, domains: &'a DomainRegistry) -> Self {
        Self {
            accounts: AccountRepository::new(db),
            domains,
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every form problem.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration<'_>) -> Result<Account, AuthError> {
        let (email, role, access) = self.validate_registration(registration)?;

        let password_hash = hash_password(registration.password)?;

        let account = Account {
            id: AccountId::generate(),
            display_name: email.local_part().to_string(),
            email,
            password_hash,
            role,
            access,
            created_at: Utc::now(),
        };

        let account = self.accounts.create(account).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other @ RepositoryError::NotFound => AuthError::Repository(other),
        })?;

        tracing::info!(
            account_id = %account.id,
            role = %account.role,
            domain = account.access.as_ref().map_or("-", AccessScope::domain_label),
            "Account registered"
        );

        Ok(account)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the email is malformed or the
    /// password is empty.
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let mut problems = Vec::new();
        let email = Email::parse(email.trim()).ok();
        if email.is_none() {
            problems.push(MSG_INVALID_EMAIL.to_string());
        }
        if password.is_empty() {
            problems.push(MSG_PASSWORD_REQUIRED.to_string());
        }
        let Some(email) = email.filter(|_| problems.is_empty()) else {
            return Err(AuthError::Validation(problems));
        };

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        Ok(account)
    }

    /// Simulated password reset: validates the address and pretends to send
    /// a reset link.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the email is empty or malformed.
    pub fn request_password_reset(&self, email: &str) -> Result<Email, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation(vec![
                MSG_RESET_EMAIL_REQUIRED.to_string(),
            ]));
        }
        let email = Email::parse(email)
            .map_err(|_| AuthError::Validation(vec![MSG_INVALID_EMAIL.to_string()]))?;

        tracing::info!(email_domain = email.domain(), "Password reset requested (simulated)");
        Ok(email)
    }

    fn validate_registration(
        &self,
        registration: Registration<'_>,
    ) -> Result<(Email, Role, Option<AccessScope>), AuthError> {
        let mut problems = Vec::new();

        let email = Email::parse(registration.email.trim()).ok();
        if email.is_none() {
            problems.push(MSG_INVALID_EMAIL.to_string());
        }

        if registration.password.chars().count() < MIN_PASSWORD_LENGTH {
            problems.push(MSG_SHORT_PASSWORD.to_string());
        }

        if registration.password != registration.confirm_password {
            problems.push(MSG_PASSWORD_MISMATCH.to_string());
        }

        let role = registration
            .role
            .parse::<Role>()
            .ok()
            .filter(|role| role.is_selectable());

        let access = match role {
            Some(Role::User) => self.resolve_access(registration, &mut problems),
            Some(_) => None,
            None => {
                problems.push(MSG_UNKNOWN_ROLE.to_string());
                None
            }
        };

        match (email, role) {
            (Some(email), Some(role)) if problems.is_empty() => Ok((email, role, access)),
            _ => Err(AuthError::Validation(problems)),
        }
    }

    fn resolve_access(
        &self,
        registration: Registration<'_>,
        problems: &mut Vec<String>,
    ) -> Option<AccessScope> {
        if registration.general_access {
            return Some(AccessScope::General);
        }

        let raw = registration.domain.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            problems.push(MSG_DOMAIN_REQUIRED.to_string());
            return None;
        }

        if let Some(domain) = self.domains.resolve(raw) {
            Some(AccessScope::Locked(domain.clone()))
        } else {
            problems.push(MSG_UNKNOWN_DOMAIN.to_string());
            None
        }
    }
}

/// Hash a password with Argon2id, returning the PHC string.
fn hash_password(password: &str) -> Result<SecretString, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(SecretString::from(hash.to_string()))
}

/// Verify a password against a stored PHC string.
fn verify_password(password: &str, hash: &SecretString) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash.expose_secret()).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}
