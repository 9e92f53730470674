//! Account repository.

use std::collections::hash_map::Entry;

use nexus_core::Email;

use super::{MemoryDb, RepositoryError};
use crate::models::account::Account;

/// Repository for account operations.
pub struct AccountRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(&self, account: Account) -> Result<Account, RepositoryError> {
        let mut accounts = self.db.accounts.write().await;
        match accounts.entry(account.email.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                account.email
            ))),
            Entry::Vacant(slot) => Ok(slot.insert(account).clone()),
        }
    }

    /// Get an account by its email address.
    ///
    /// # Errors
    ///
    /// Infallible today; kept fallible so callers treat storage uniformly.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        Ok(self.db.accounts.read().await.get(email).cloned())
    }

    /// Number of registered accounts.
    pub async fn count(&self) -> usize {
        self.db.accounts.read().await.len()
    }
}
