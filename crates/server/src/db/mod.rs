//! In-memory storage for accounts and uploaded-file metadata.
//!
//! Nothing here survives a restart: accounts live for the lifetime of the
//! process and uploaded files are metadata only (their bytes are never kept).
//!
//! ## Collections
//!
//! - `accounts` - Keyed by email; unique, never updated or deleted
//! - `files` - Uploaded resource metadata, in upload order
//! - `conversations` - One chat conversation per signed-in session
//!
//! Each collection sits behind its own `tokio::sync::RwLock`; repositories
//! borrow the [`MemoryDb`] the way a SQL repository borrows a pool.

pub mod accounts;
pub mod conversations;
pub mod files;

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::RwLock;

use nexus_core::{ConversationId, Email};

use crate::models::account::Account;
use crate::models::chat::Conversation;
use crate::models::upload::UploadedFile;

pub use accounts::AccountRepository;
pub use conversations::ConversationRepository;
pub use files::FileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Process-local storage shared by all repositories.
#[derive(Debug, Default)]
pub struct MemoryDb {
    accounts: RwLock<HashMap<Email, Account>>,
    files: RwLock<Vec<UploadedFile>>,
    conversations: RwLock<HashMap<ConversationId, ConversationSlot>>,
}

/// A conversation and the number of times it has been reset.
#[derive(Debug, Default)]
struct ConversationSlot {
    generation: u64,
    conversation: Conversation,
}

impl MemoryDb {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
