//! ResponseEngine: classify, pick a reply, record the exchange.
//!
//! The engine holds only immutable data (the rule table and the catalog).
//! Everything that changes over a session lives in `SessionState`.

use crate::session::SessionState;
use chrono::{DateTime, Utc};
use rand::Rng;
use robo_core::{CompanionError, ConversationRecord, IntentClassifier, ResponseCatalog, TopicKey};

/// Outcome of one exchange.
#[derive(Debug)]
pub struct Reply {
    /// Topic the input was classified as.
    pub topic: TopicKey,
    /// Topic the reply was actually drawn from; `Default` when `topic` had
    /// no replies in the catalog.
    pub resolved: TopicKey,
    pub text: String,
    /// Set when the exchange is held in memory but could not be persisted.
    pub persistence_failure: Option<CompanionError>,
}

pub struct ResponseEngine {
    classifier: IntentClassifier,
    catalog: ResponseCatalog,
}

impl ResponseEngine {
    pub fn new(catalog: ResponseCatalog) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            catalog,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn catalog(&self) -> &ResponseCatalog {
        &self.catalog
    }

    pub fn respond(
        &self,
        state: &mut SessionState,
        input: &str,
        now: DateTime<Utc>,
    ) -> Result<Reply, CompanionError> {
        self.respond_with(state, input, now, &mut rand::thread_rng())
    }

    /// Answer `input` at `now`.
    ///
    /// Blank input fails with `EmptyInput` and leaves the session untouched.
    /// A failed history write does not fail the exchange; it is returned in
    /// `Reply::persistence_failure`.
    pub fn respond_with<R: Rng + ?Sized>(
        &self,
        state: &mut SessionState,
        input: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Reply, CompanionError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(CompanionError::EmptyInput);
        }

        state.engagement_mut().reset(now);

        let topic = self.classifier.classify(text);
        let (resolved, reply) = self.select(topic, rng)?;
        tracing::debug!("Classified as {}, replying from {}", topic, resolved);

        let record = ConversationRecord::new(text, reply.as_str(), now)?;
        let persistence_failure = state.history_mut().append(record).err();

        Ok(Reply {
            topic,
            resolved,
            text: reply,
            persistence_failure,
        })
    }

    fn select<R: Rng + ?Sized>(
        &self,
        topic: TopicKey,
        rng: &mut R,
    ) -> Result<(TopicKey, String), CompanionError> {
        match self.catalog.pick_reply_with(topic, rng) {
            Ok(reply) => Ok((topic, reply.to_string())),
            Err(CompanionError::MissingTopic(missing)) => {
                tracing::debug!("Catalog has no '{}' replies, using default", missing);
                let reply = self.catalog.pick_reply_with(TopicKey::Default, rng)?;
                Ok((TopicKey::Default, reply.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for ResponseEngine {
    fn default() -> Self {
        Self::new(ResponseCatalog::builtin())
    }
}
