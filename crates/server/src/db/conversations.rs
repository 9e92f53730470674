//! Chat conversation repository.
//!
//! A session owns one conversation slot for as long as it is signed in.
//! Loading the chat page empties the slot and bumps its generation, so a
//! reply that was still pending for the previous page is dropped instead of
//! landing in the new conversation.

use nexus_core::ConversationId;

use super::{ConversationSlot, MemoryDb, RepositoryError};
use crate::models::chat::{ChatMessage, Conversation};

/// Repository for per-session chat conversations.
pub struct ConversationRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> ConversationRepository<'a> {
    /// Create a new conversation repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Open an empty conversation slot.
    pub async fn create(&self) -> ConversationId {
        let id = ConversationId::generate();
        self.db
            .conversations
            .write()
            .await
            .insert(id, ConversationSlot::default());
        id
    }

    /// The conversation so far, or `None` if the slot was closed.
    pub async fn get(&self, id: ConversationId) -> Option<Conversation> {
        self.db
            .conversations
            .read()
            .await
            .get(&id)
            .map(|slot| slot.conversation.clone())
    }

    /// Empty the conversation and start a new generation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slot was closed.
    pub async fn reset(&self, id: ConversationId) -> Result<(), RepositoryError> {
        let mut conversations = self.db.conversations.write().await;
        let slot = conversations.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        slot.generation += 1;
        slot.conversation = Conversation::default();
        Ok(())
    }

    /// Append a message and return the generation it landed in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slot was closed.
    pub async fn append(
        &self,
        id: ConversationId,
        message: ChatMessage,
    ) -> Result<u64, RepositoryError> {
        let mut conversations = self.db.conversations.write().await;
        let slot = conversations.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        slot.conversation.push(message);
        Ok(slot.generation)
    }

    /// Append a message only if the conversation is still at `generation`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slot was closed or reset
    /// since `generation` was handed out.
    pub async fn append_in(
        &self,
        id: ConversationId,
        generation: u64,
        message: ChatMessage,
    ) -> Result<(), RepositoryError> {
        let mut conversations = self.db.conversations.write().await;
        match conversations.get_mut(&id) {
            Some(slot) if slot.generation == generation => {
                slot.conversation.push(message);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    /// Close the slot. Closing an unknown slot is a no-op.
    pub async fn remove(&self, id: ConversationId) {
        self.db.conversations.write().await.remove(&id);
    }
}
