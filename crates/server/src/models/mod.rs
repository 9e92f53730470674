//! Domain models for the Nexus service.
//!
//! - [`account`] - Registered accounts (in-memory store rows)
//! - [`session`] - What the session cookie resolves to
//! - [`upload`] - Uploaded resource metadata
//! - [`chat`] - Chat messages and the per-page conversation

pub mod account;
pub mod chat;
pub mod session;
pub mod upload;

pub use account::Account;
pub use chat::{ChatMessage, Conversation, Sender};
pub use session::{CurrentUser, keys as session_keys};
pub use upload::UploadedFile;
