//! Property-based tests for robo_core.
//!
//! Uses proptest to verify invariants that must hold for ALL possible inputs,
//! not just hand-picked examples.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use robo_core::{ConversationRecord, IntentClassifier, ResponseCatalog, TopicKey};

// ============================================================================
// Strategies
// ============================================================================

fn arb_record() -> impl Strategy<Value = ConversationRecord> {
    ("[a-zA-Z0-9 ,.!?]{0,40}[a-z]", "\\PC{0,40}[a-z]", 0i64..4_000_000_000)
        .prop_map(|(user, robot, secs)| {
            let at = Utc.timestamp_opt(secs, 0).unwrap();
            ConversationRecord::new(user, robot, at).unwrap()
        })
}

// ============================================================================
// Classification Properties
// ============================================================================

proptest! {
    /// Classification is total and deterministic.
    #[test]
    fn classify_is_deterministic(input in "\\PC{0,80}") {
        let classifier = IntentClassifier::new();
        prop_assert_eq!(classifier.classify(&input), classifier.classify(&input));
    }

    /// Case never changes the outcome.
    #[test]
    fn classify_ignores_ascii_case(input in "[a-zA-Z ,!?]{0,60}") {
        let classifier = IntentClassifier::new();
        prop_assert_eq!(
            classifier.classify(&input.to_uppercase()),
            classifier.classify(&input.to_lowercase())
        );
    }

    /// "how are you" is never swallowed by the broader greeting rule.
    #[test]
    fn how_are_you_wins_over_greetings(prefix in "(hello|hi|hey)[ ,!]{0,3}", suffix in "[a-z ]{0,10}") {
        let input = format!("{}how are you{}", prefix, suffix);
        prop_assert_eq!(IntentClassifier::new().classify(&input), TopicKey::HowAreYou);
    }

    /// Whatever topic is chosen, the built-in catalog can answer it.
    #[test]
    fn every_classified_topic_has_replies(input in "\\PC{0,80}") {
        let topic = IntentClassifier::new().classify(&input);
        let catalog = ResponseCatalog::builtin();
        let reply = catalog.pick_reply(topic).unwrap();
        prop_assert!(!reply.is_empty());
        prop_assert!(catalog.candidates(topic).unwrap().iter().any(|c| c == reply));
    }
}

// ============================================================================
// Serialization Properties
// ============================================================================

proptest! {
    #[test]
    fn record_sequence_roundtrips(records in prop::collection::vec(arb_record(), 0..20)) {
        let json = serde_json::to_string(&records).unwrap();
        let back: Vec<ConversationRecord> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, records);
    }
}
