//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::{ConversationRepository, MemoryDb};
use crate::services::{
    AuthService, ChatResponder, DomainRegistry, UploadPolicy, UploadService,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// in-memory store, the sector registry and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    db: MemoryDb,
    domains: DomainRegistry,
    chat: ChatResponder,
    upload_policy: UploadPolicy,
}

impl AppState {
    /// Create a new application state with an empty store.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let domains = DomainRegistry::new(config.domains.clone());
        let chat = ChatResponder::new(&config.latency);
        let upload_policy = UploadPolicy::new(config.max_upload_bytes);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db: MemoryDb::new(),
                domains,
                chat,
                upload_policy,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the in-memory store.
    #[must_use]
    pub fn db(&self) -> &MemoryDb {
        &self.inner.db
    }

    /// Get a reference to the sector registry.
    #[must_use]
    pub fn domains(&self) -> &DomainRegistry {
        &self.inner.domains
    }

    /// Get the chat responder.
    #[must_use]
    pub fn chat(&self) -> &ChatResponder {
        &self.inner.chat
    }

    /// Account service bound to this state's store.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.db, &self.inner.domains)
    }

    /// Conversation store bound to this state's store.
    #[must_use]
    pub fn conversations(&self) -> ConversationRepository<'_> {
        ConversationRepository::new(&self.inner.db)
    }

    /// Upload service bound to this state's store.
    #[must_use]
    pub fn uploads(&self) -> UploadService<'_> {
        UploadService::new(
            &self.inner.db,
            self.inner.upload_policy,
            self.inner.config.latency.upload,
        )
    }
}
