//! Simulated chat responder.
//!
//! There is no model behind the chat panel. A reply is an opener picked
//! uniformly at random from a fixed pool keyed by the session's access scope,
//! plus a note that the answer is simulated, delivered after a randomized
//! delay that stands in for inference latency.

use std::time::Duration;

use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use nexus_core::{AccessScope, ConversationId};

use crate::config::LatencyConfig;
use crate::db::{ConversationRepository, RepositoryError};
use crate::models::chat::{ChatMessage, Sender};

const GENERAL_OPENERS: &[&str] = &[
    "I can help you with that. Based on resources across all domains, here's what I found...",
    "Searching through organizational knowledge... Here's the most relevant information:",
    "I've accessed multiple domain resources to provide you with comprehensive information:",
    "Drawing from various organizational domains, I can provide this insight:",
];

const LEGAL_OPENERS: &[&str] = &[
    "Based on legal resources and compliance documents:",
    "From the legal knowledge base:",
    "According to organizational legal guidelines:",
];

const MEDICAL_OPENERS: &[&str] = &[
    "Based on medical protocols and research data:",
    "From healthcare documentation:",
    "According to medical guidelines and protocols:",
];

const TECHNOLOGY_OPENERS: &[&str] = &[
    "Based on technical documentation and system architecture:",
    "From IT resources and documentation:",
    "According to technical specifications:",
];

const FALLBACK_OPENER: &str = "Based on available resources:";

const FALLBACK_OPENERS: &[&str] = &[FALLBACK_OPENER];

const GENERAL_NOTE: &str =
    "[Simulated response - In production, this would query the actual knowledge base]";

const DOMAIN_NOTE: &str = "[Simulated domain-specific response - In production, this would query the domain's knowledge base]";

/// Errors from the chat service.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The message was empty after trimming.
    #[error("message cannot be empty")]
    EmptyMessage,

    /// The conversation was closed or restarted before the reply was ready.
    #[error("conversation has ended")]
    ConversationEnded,
}

impl From<RepositoryError> for ChatError {
    fn from(_: RepositoryError) -> Self {
        Self::ConversationEnded
    }
}

/// Picks canned replies and the delay before they are delivered.
#[derive(Debug, Clone, Copy)]
pub struct ChatResponder {
    min_delay: Duration,
    jitter: Duration,
}

impl ChatResponder {
    #[must_use]
    pub const fn new(latency: &LatencyConfig) -> Self {
        Self {
            min_delay: latency.chat_min,
            jitter: latency.chat_jitter,
        }
    }

    /// Opener pool for a scope. Sectors without a dedicated pool share the
    /// fallback pool.
    #[must_use]
    pub fn pool(scope: &AccessScope) -> &'static [&'static str] {
        match scope {
            AccessScope::General => GENERAL_OPENERS,
            AccessScope::Locked(domain) => match domain.as_str().to_ascii_lowercase().as_str() {
                "legal" => LEGAL_OPENERS,
                "medical" => MEDICAL_OPENERS,
                "technology" => TECHNOLOGY_OPENERS,
                _ => FALLBACK_OPENERS,
            },
        }
    }

    /// Compose a reply for `scope`. The user's message does not influence it.
    pub fn compose<R: Rng + ?Sized>(scope: &AccessScope, rng: &mut R) -> String {
        let opener = Self::pool(scope)
            .choose(rng)
            .copied()
            .unwrap_or(FALLBACK_OPENER);
        let note = if scope.is_general() { GENERAL_NOTE } else { DOMAIN_NOTE };
        format!("{opener}\n\n{note}")
    }

    /// Delay before a reply: the minimum plus a uniform draw from
    /// `[0, jitter)`.
    pub fn delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        let extra = if jitter_ms == 0 {
            0
        } else {
            rng.random_range(0..jitter_ms)
        };
        self.min_delay + Duration::from_millis(extra)
    }

    /// Append the user's message, wait out the simulated latency, then append
    /// the reply and return both messages.
    ///
    /// Each message is appended under the store's lock, so overlapping sends
    /// on one conversation all land in it.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::EmptyMessage` if the message is blank; the
    /// conversation is left untouched. Returns `ChatError::ConversationEnded`
    /// if the conversation was closed, or reset by a new page load, before
    /// the reply was appended.
    pub async fn reply(
        &self,
        conversations: &ConversationRepository<'_>,
        id: ConversationId,
        scope: &AccessScope,
        message: &str,
    ) -> Result<(ChatMessage, ChatMessage), ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let user_message = ChatMessage::new(Sender::User, message);
        let generation = conversations.append(id, user_message.clone()).await?;

        // ThreadRng is not Send; draw everything before awaiting.
        let (delay, content) = {
            let mut rng = rand::rng();
            (self.delay(&mut rng), Self::compose(scope, &mut rng))
        };

        tracing::debug!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            scope = scope.domain_label(),
            "Simulating chat latency"
        );
        tokio::time::sleep(delay).await;

        let ai_message = ChatMessage::new(Sender::Ai, content);
        conversations
            .append_in(id, generation, ai_message.clone())
            .await?;

        Ok((user_message, ai_message))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use nexus_core::DomainName;

    use crate::db::MemoryDb;

    use super::*;

    fn locked(domain: &str) -> AccessScope {
        AccessScope::Locked(DomainName::parse(domain).unwrap())
    }

    fn opener(reply: &str) -> &str {
        reply.split("\n\n").next().unwrap()
    }

    #[test]
    fn test_general_reply_comes_from_general_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let reply = ChatResponder::compose(&AccessScope::General, &mut rng);
            assert!(GENERAL_OPENERS.contains(&opener(&reply)));
            assert!(reply.ends_with(GENERAL_NOTE));
        }
    }

    #[test]
    fn test_locked_reply_comes_from_domain_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let reply = ChatResponder::compose(&locked("Medical"), &mut rng);
            assert!(MEDICAL_OPENERS.contains(&opener(&reply)));
            assert!(reply.ends_with(DOMAIN_NOTE));
        }
    }

    #[test]
    fn test_unknown_domain_falls_back() {
        let mut rng = StdRng::seed_from_u64(1);
        let reply = ChatResponder::compose(&locked("Finance"), &mut rng);
        assert_eq!(opener(&reply), "Based on available resources:");
        assert!(reply.ends_with(DOMAIN_NOTE));
    }

    #[test]
    fn test_pool_lookup_ignores_case() {
        assert_eq!(ChatResponder::pool(&locked("legal")), LEGAL_OPENERS);
        assert_eq!(ChatResponder::pool(&locked("TECHNOLOGY")), TECHNOLOGY_OPENERS);
    }

    #[test]
    fn test_pool_lookup_needs_full_sector_name() {
        assert_eq!(ChatResponder::pool(&locked("Tech")), FALLBACK_OPENERS);
    }

    #[test]
    fn test_delay_stays_in_window() {
        let responder = ChatResponder::new(&LatencyConfig::default());
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let delay = responder.delay(&mut rng);
            assert!(delay >= Duration::from_millis(1500));
            assert!(delay < Duration::from_millis(2500));
        }
    }

    #[test]
    fn test_zero_jitter_is_fixed_delay() {
        let responder = ChatResponder::new(&LatencyConfig::none());
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(responder.delay(&mut rng), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_reply_appends_both_messages() {
        let db = MemoryDb::new();
        let conversations = ConversationRepository::new(&db);
        let id = conversations.create().await;
        let responder = ChatResponder::new(&LatencyConfig::none());

        let (user, ai) = responder
            .reply(&conversations, id, &locked("Legal"), "  What is our NDA policy?  ")
            .await
            .unwrap();

        assert_eq!(user.sender, Sender::User);
        assert_eq!(user.content, "What is our NDA policy?");
        assert_eq!(ai.sender, Sender::Ai);
        assert!(LEGAL_OPENERS.contains(&opener(&ai.content)));
        assert_eq!(conversations.get(id).await.unwrap().messages(), [user, ai]);
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let db = MemoryDb::new();
        let conversations = ConversationRepository::new(&db);
        let id = conversations.create().await;
        let responder = ChatResponder::new(&LatencyConfig::none());

        let err = responder
            .reply(&conversations, id, &AccessScope::General, "   \n ")
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::EmptyMessage));
        assert!(conversations.get(id).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_latency() {
        let db = MemoryDb::new();
        let conversations = ConversationRepository::new(&db);
        let id = conversations.create().await;
        let responder = ChatResponder::new(&LatencyConfig::default());
        let started = tokio::time::Instant::now();

        responder
            .reply(&conversations, id, &AccessScope::General, "hello")
            .await
            .unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed < Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_replies_keep_every_message() {
        let db = MemoryDb::new();
        let conversations = ConversationRepository::new(&db);
        let id = conversations.create().await;
        let responder = ChatResponder::new(&LatencyConfig::default());

        let (first, second) = tokio::join!(
            responder.reply(&conversations, id, &AccessScope::General, "first"),
            responder.reply(&conversations, id, &AccessScope::General, "second"),
        );
        first.unwrap();
        second.unwrap();

        let conversation = conversations.get(id).await.unwrap();
        let senders: Vec<Sender> = conversation.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders.len(), 4);
        assert_eq!(senders.iter().filter(|s| **s == Sender::Ai).count(), 2);
        assert_eq!(conversation.messages()[0].content, "first");
        assert_eq!(conversation.messages()[1].content, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_after_close_is_dropped() {
        let db = MemoryDb::new();
        let conversations = ConversationRepository::new(&db);
        let id = conversations.create().await;
        let responder = ChatResponder::new(&LatencyConfig::default());

        let (reply, ()) = tokio::join!(
            responder.reply(&conversations, id, &AccessScope::General, "hello"),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                conversations.remove(id).await;
            },
        );

        assert!(matches!(reply, Err(ChatError::ConversationEnded)));
        assert!(conversations.get(id).await.is_none());
    }
}
