pub mod catalog;
pub mod config;
pub mod error;
pub mod intent;
pub mod storage;

pub use catalog::ResponseCatalog;
pub use config::RoboConfig;
pub use error::{CompanionError, StorageError};
pub use intent::{IntentClassifier, IntentRule};
pub use storage::{FileStore, InMemoryStore, KeyValueStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of canned replies. Serialized names match the keys of a
/// persisted catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopicKey {
    Greetings,
    HowAreYou,
    WhatCanYouDo,
    Pwa,
    Install,
    Offline,
    Jokes,
    Farewell,
    Robot,
    Name,
    Default,
}

impl TopicKey {
    pub const ALL: [TopicKey; 11] = [
        TopicKey::Greetings,
        TopicKey::HowAreYou,
        TopicKey::WhatCanYouDo,
        TopicKey::Pwa,
        TopicKey::Install,
        TopicKey::Offline,
        TopicKey::Jokes,
        TopicKey::Farewell,
        TopicKey::Robot,
        TopicKey::Name,
        TopicKey::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopicKey::Greetings => "greetings",
            TopicKey::HowAreYou => "howAreYou",
            TopicKey::WhatCanYouDo => "whatCanYouDo",
            TopicKey::Pwa => "pwa",
            TopicKey::Install => "install",
            TopicKey::Offline => "offline",
            TopicKey::Jokes => "jokes",
            TopicKey::Farewell => "farewell",
            TopicKey::Robot => "robot",
            TopicKey::Name => "name",
            TopicKey::Default => "default",
        }
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed exchange between the user and the robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(rename = "user")]
    pub user_text: String,
    #[serde(rename = "robot")]
    pub robot_text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationRecord {
    /// Both sides of the exchange must carry some non-whitespace text.
    pub fn new(
        user_text: impl Into<String>,
        robot_text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, CompanionError> {
        let user_text = user_text.into();
        let robot_text = robot_text.into();
        if user_text.trim().is_empty() || robot_text.trim().is_empty() {
            return Err(CompanionError::EmptyInput);
        }
        Ok(Self {
            user_text,
            robot_text,
            timestamp,
        })
    }
}

/// Who authored a rendered chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Robot,
}

/// Attentiveness of the user, derived from time since the last interaction.
///
/// Ordering follows the only permitted direction of travel between resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementState {
    #[default]
    Active,
    Idle,
    Bored,
}

/// Face shown by the robot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    #[default]
    Neutral,
    Idle,
    Bored,
    Talking,
    Excited,
}

impl From<EngagementState> for Expression {
    fn from(state: EngagementState) -> Self {
        match state {
            EngagementState::Active => Expression::Neutral,
            EngagementState::Idle => Expression::Idle,
            EngagementState::Bored => Expression::Bored,
        }
    }
}

/// Short ambient animation requested from the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationCue {
    Blink { duration_ms: u64 },
    /// Pupil offset in pixels from the resting position, held for `hold_ms`.
    LookAround { dx: f32, dy: f32, hold_ms: u64 },
}

/// Approximate persisted footprint, used for the storage indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUsage {
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLevel {
    Low,
    Moderate,
    High,
}

impl StorageUsage {
    pub fn kilobytes(&self) -> f64 {
        self.bytes as f64 / 1024.0
    }

    pub fn level(&self) -> StorageLevel {
        let kb = self.kilobytes();
        if kb > 100.0 {
            StorageLevel::High
        } else if kb > 50.0 {
            StorageLevel::Moderate
        } else {
            StorageLevel::Low
        }
    }
}

impl fmt::Display for StorageUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} KB used", self.kilobytes())
    }
}

/// What the storage indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    Used(StorageUsage),
    Error,
}

/// Typed events published by a display surface (or timers) into a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    UserSubmitted { text: String, at: DateTime<Utc> },
    VoiceTranscript { text: String, at: DateTime<Utc> },
    Tick(DateTime<Utc>),
    InputFocused(DateTime<Utc>),
    SpeakLastReply,
    SpeechFinished,
    ClearHistory,
}

/// Rendering side of a session. Implementations must not block.
pub trait DisplaySurface: Send + Sync {
    fn render_message(&self, text: &str, sender: Sender);
    fn show_expression(&self, expression: Expression);
    fn show_engagement(&self, state: EngagementState);
    /// Transient toast-style notice; the surface dismisses it on its own.
    fn notify(&self, notice: &str);
    fn show_storage(&self, status: StorageStatus);
    fn animate(&self, _cue: AnimationCue) {}
}

/// Optional speech synthesis.
pub trait VoiceOutput: Send + Sync {
    fn speak(&self, text: &str) -> anyhow::Result<()>;
    fn cancel(&self);
}
