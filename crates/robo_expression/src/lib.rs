use robo_core::config::HumanizerConfig;
use std::time::Duration;

mod face;
mod profile;
pub use face::Face;
pub use profile::{profile, ExpressionProfile};

/// Timing model that makes the robot feel less instantaneous.
#[derive(Debug, Clone)]
pub struct Humanizer {
    thinking_delay: Duration,
    talking_duration: Duration,
}

impl Humanizer {
    pub fn new() -> Self {
        Self::from_config(&HumanizerConfig::default())
    }

    pub fn from_config(config: &HumanizerConfig) -> Self {
        Self {
            thinking_delay: Duration::from_millis(config.thinking_delay_ms),
            talking_duration: Duration::from_millis(config.talking_duration_ms),
        }
    }

    /// No pauses at all; replies appear immediately.
    pub fn instant() -> Self {
        Self {
            thinking_delay: Duration::ZERO,
            talking_duration: Duration::ZERO,
        }
    }

    /// Pause between a message arriving and the reply appearing
    pub fn thinking_delay(&self) -> Duration {
        self.thinking_delay
    }

    /// How long the mouth keeps moving after a reply
    pub fn talking_duration(&self) -> Duration {
        self.talking_duration
    }
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new()
    }
}
