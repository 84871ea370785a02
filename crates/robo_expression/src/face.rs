//! The face currently shown, and how it settles back after talking.
//!
//! Settling is level-triggered: on every tick the wanted expression is
//! recomputed from engagement, speech, and the talking window, and only a
//! change is reported.

use chrono::{DateTime, Utc};
use robo_core::{EngagementState, Expression};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Face {
    current: Expression,
    talking_until: Option<DateTime<Utc>>,
}

impl Face {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Expression {
        self.current
    }

    /// Show `expression`. Returns true when it differs from what was shown.
    pub fn set(&mut self, expression: Expression) -> bool {
        let changed = self.current != expression;
        self.current = expression;
        changed
    }

    /// Show the talking face for `duration` from `now`.
    pub fn start_talking(&mut self, now: DateTime<Utc>, duration: Duration) {
        let duration = chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        self.talking_until = Some(now + duration);
        self.current = Expression::Talking;
    }

    /// Drop any talking window and show the resting face for `engagement`.
    pub fn rest(&mut self, engagement: EngagementState) -> Option<Expression> {
        self.talking_until = None;
        let resting = Expression::from(engagement);
        self.set(resting).then_some(resting)
    }

    pub fn is_talking(&self, now: DateTime<Utc>) -> bool {
        self.talking_until.is_some_and(|until| now < until)
    }

    /// Expression wanted at `now`.
    pub fn wanted(&self, now: DateTime<Utc>, engagement: EngagementState, speaking: bool) -> Expression {
        if speaking || self.is_talking(now) {
            Expression::Talking
        } else {
            Expression::from(engagement)
        }
    }

    /// Move to the wanted expression; `Some` when the face changed.
    pub fn settle(
        &mut self,
        now: DateTime<Utc>,
        engagement: EngagementState,
        speaking: bool,
    ) -> Option<Expression> {
        if !self.is_talking(now) {
            self.talking_until = None;
        }
        let wanted = self.wanted(now, engagement, speaking);
        if self.set(wanted) {
            tracing::debug!("Face -> {:?}", wanted);
            Some(wanted)
        } else {
            None
        }
    }
}
