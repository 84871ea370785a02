//! Keyword-based intent classification.
//!
//! Rules are checked in declaration order and the first rule whose keywords
//! appear anywhere in the lower-cased input wins. Matching is plain substring
//! search, so "hi" also matches inside "this".

use crate::TopicKey;

/// One keyword rule.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub topic: TopicKey,
    pub keywords: &'static [&'static str],
    /// Phrases that veto this rule so a later, more specific rule can claim
    /// the input.
    pub unless: &'static [&'static str],
}

impl IntentRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
            && !self.unless.iter().any(|u| lowered.contains(u))
    }
}

const HOW_ARE_YOU: &[&str] = &["how are you"];

const RULES: &[IntentRule] = &[
    IntentRule {
        topic: TopicKey::Greetings,
        keywords: &["hello", "hi", "hey"],
        unless: HOW_ARE_YOU,
    },
    IntentRule {
        topic: TopicKey::HowAreYou,
        keywords: HOW_ARE_YOU,
        unless: &[],
    },
    IntentRule {
        topic: TopicKey::WhatCanYouDo,
        keywords: &["what can you do", "capabilities"],
        unless: &[],
    },
    IntentRule {
        topic: TopicKey::Install,
        keywords: &["pwa", "progressive", "install"],
        unless: &[],
    },
    IntentRule {
        topic: TopicKey::Offline,
        keywords: &["offline", "internet", "connection"],
        unless: &[],
    },
    IntentRule {
        topic: TopicKey::Jokes,
        keywords: &["joke", "funny"],
        unless: &[],
    },
    IntentRule {
        topic: TopicKey::Farewell,
        keywords: &["bye", "goodbye", "farewell"],
        unless: &[],
    },
    IntentRule {
        topic: TopicKey::Robot,
        keywords: &["robot", "technology"],
        unless: &[],
    },
    IntentRule {
        topic: TopicKey::Name,
        keywords: &["name"],
        unless: &[],
    },
];

/// Maps free text to a topic. Stateless.
#[derive(Debug, Clone, Copy)]
pub struct IntentClassifier {
    rules: &'static [IntentRule],
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self { rules: RULES }
    }

    /// The fixed rule table, in evaluation order.
    pub fn rules(&self) -> &'static [IntentRule] {
        self.rules
    }

    /// Topic of the first matching rule, or `TopicKey::Default`.
    pub fn classify(&self, input: &str) -> TopicKey {
        let lowered = input.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.topic)
            .unwrap_or(TopicKey::Default)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
