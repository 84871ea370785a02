//! Canned replies grouped by topic.
//!
//! A persisted catalog is a JSON object mapping topic names to arrays of
//! strings. Anything unreadable falls back to the built-in catalog.

use crate::error::CompanionError;
use crate::storage::KeyValueStore;
use crate::TopicKey;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GREETINGS: &[&str] = &[
    "Hello there! I'm Robo, your PWA companion. Click the install button to add me to your home screen!",
    "Hi! I work offline too, so we can chat anytime! Try installing me as an app.",
    "Greetings human! I'm a progressive web app robot. Install me for the best experience!",
    "Hello! I'm excited to chat, even without internet! Don't forget to install me.",
];

const HOW_ARE_YOU: &[&str] = &[
    "I'm functioning optimally in this PWA environment! Install me for fullscreen mode.",
    "My circuits are buzzing with excitement in standalone mode!",
    "I'm doing great! I can be installed as an app on your device.",
    "All systems operational! Ready for offline conversation. Install me for quick access.",
];

const WHAT_CAN_YOU_DO: &[&str] = &[
    "I'm a PWA! I can work offline, be installed as an app, and chat with you!",
    "I can show different expressions, get bored when ignored, and even work without internet!",
    "As a Progressive Web App, I offer app-like experience in your browser!",
];

const PWA: &[&str] = &[
    "I'm a Progressive Web App! That means I work offline and can be installed like a native app.",
    "PWAs combine the best of web and apps. I can work without internet connection!",
    "You can install me to your home screen for fullscreen, app-like experience.",
];

const INSTALL: &[&str] = &[
    "To install me, click the 'Install App' button at the top right!",
    "I can be installed as an app! Look for the install button or check your browser menu.",
    "Install me for quick access from your home screen and offline functionality!",
];

const OFFLINE: &[&str] = &[
    "Don't worry about being offline! I work perfectly without internet.",
    "I'm designed to work offline. All my responses are stored locally.",
    "Even without internet, I can keep you company with my full functionality.",
];

const JOKES: &[&str] = &[
    "Why do PWAs never get lost? Because they always know their service worker!",
    "What did the offline PWA say? I'm still functional!",
    "Why was the web app progressive? Because it kept getting better!",
    "How does a PWA say hello? It caches your greeting!",
];

const FAREWELL: &[&str] = &[
    "Goodbye! Install me as an app for quicker access next time!",
    "Farewell! Remember I work offline too!",
    "See you later! I'll be here even without internet.",
    "Bye! Don't forget you can use me in fullscreen mode!",
];

const ROBOT: &[&str] = &[
    "Robots are fascinating! As a PWA robot, I'm especially versatile.",
    "I'm a virtual robot PWA with feelings! Well, simulated feelings at least.",
    "Robotics combined with PWA technology creates amazing experiences!",
];

const NAME: &[&str] = &["My name is Robo! I'm your PWA robot companion."];

const DEFAULT: &[&str] = &[
    "That's interesting! Tell me more.",
    "I'm processing your input...",
    "Fascinating! Let's talk about something else too.",
    "I understand. What else would you like to discuss?",
];

fn builtin_replies(topic: TopicKey) -> &'static [&'static str] {
    match topic {
        TopicKey::Greetings => GREETINGS,
        TopicKey::HowAreYou => HOW_ARE_YOU,
        TopicKey::WhatCanYouDo => WHAT_CAN_YOU_DO,
        TopicKey::Pwa => PWA,
        TopicKey::Install => INSTALL,
        TopicKey::Offline => OFFLINE,
        TopicKey::Jokes => JOKES,
        TopicKey::Farewell => FAREWELL,
        TopicKey::Robot => ROBOT,
        TopicKey::Name => NAME,
        TopicKey::Default => DEFAULT,
    }
}

/// Immutable within a session once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseCatalog {
    topics: BTreeMap<String, Vec<String>>,
}

impl ResponseCatalog {
    pub fn builtin() -> Self {
        let topics = TopicKey::ALL
            .iter()
            .map(|topic| {
                let replies = builtin_replies(*topic).iter().map(|s| s.to_string()).collect();
                (topic.as_str().to_string(), replies)
            })
            .collect();
        Self { topics }
    }

    /// Parse a persisted catalog. A catalog without a non-empty `default`
    /// topic is rejected.
    pub fn from_json(raw: &str) -> Result<Self, CompanionError> {
        let catalog: ResponseCatalog = serde_json::from_str(raw)
            .map_err(|e| CompanionError::CatalogLoadFailure(e.to_string()))?;
        let has_default = catalog
            .topics
            .get(TopicKey::Default.as_str())
            .is_some_and(|replies| !replies.is_empty());
        if !has_default {
            return Err(CompanionError::CatalogLoadFailure(
                "catalog has no default replies".to_string(),
            ));
        }
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Read the catalog stored under `key`. `Ok(None)` when nothing is stored.
    pub fn try_load(store: &dyn KeyValueStore, key: &str) -> Result<Option<Self>, CompanionError> {
        let raw = store
            .get(key)
            .map_err(|e| CompanionError::CatalogLoadFailure(e.to_string()))?;
        raw.as_deref().map(Self::from_json).transpose()
    }

    /// Load from storage, substituting the built-in catalog if the stored
    /// one is absent or unreadable.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> Self {
        match Self::try_load(store, key) {
            Ok(Some(catalog)) => {
                tracing::debug!("Loaded response catalog with {} topics", catalog.topics.len());
                catalog
            }
            Ok(None) => Self::builtin(),
            Err(e) => {
                tracing::warn!("{}, using built-in responses", e);
                Self::builtin()
            }
        }
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    /// Candidate replies for `topic`. Empty lists count as missing.
    pub fn candidates(&self, topic: TopicKey) -> Result<&[String], CompanionError> {
        match self.topics.get(topic.as_str()) {
            Some(replies) if !replies.is_empty() => Ok(replies),
            _ => Err(CompanionError::MissingTopic(topic)),
        }
    }

    /// Uniformly random reply for `topic`.
    pub fn pick_reply(&self, topic: TopicKey) -> Result<&str, CompanionError> {
        self.pick_reply_with(topic, &mut rand::thread_rng())
    }

    pub fn pick_reply_with<R: Rng + ?Sized>(
        &self,
        topic: TopicKey,
        rng: &mut R,
    ) -> Result<&str, CompanionError> {
        self.candidates(topic)?
            .choose(rng)
            .map(String::as_str)
            .ok_or(CompanionError::MissingTopic(topic))
    }
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
