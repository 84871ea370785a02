//! Engagement state machine.
//!
//! The state is derived from the time elapsed since the last interaction and
//! only moves forward (Active → Idle → Bored) until `reset`. The machine owns
//! no clock; callers pass `now` in.

use chrono::{DateTime, Utc};
use robo_core::config::EngagementConfig;
use robo_core::EngagementState;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngagementStateMachine {
    idle_after: Duration,
    bored_after: Duration,
    last_interaction: DateTime<Utc>,
    state: EngagementState,
}

impl EngagementStateMachine {
    /// Default thresholds: idle after 10s, bored after 20s.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::from_config(&EngagementConfig::default(), now)
    }

    pub fn from_config(config: &EngagementConfig, now: DateTime<Utc>) -> Self {
        Self::with_thresholds(
            Duration::from_secs(config.idle_after_secs),
            Duration::from_secs(config.bored_after_secs),
            now,
        )
    }

    /// `bored_after` is raised to `idle_after` if configured below it.
    pub fn with_thresholds(idle_after: Duration, bored_after: Duration, now: DateTime<Utc>) -> Self {
        Self {
            idle_after,
            bored_after: bored_after.max(idle_after),
            last_interaction: now,
            state: EngagementState::Active,
        }
    }

    pub fn state(&self) -> EngagementState {
        self.state
    }

    pub fn last_interaction(&self) -> DateTime<Utc> {
        self.last_interaction
    }

    /// Time since the last interaction. A `now` earlier than the last
    /// interaction counts as zero.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_interaction).to_std().unwrap_or(Duration::ZERO)
    }

    /// State implied by elapsed time alone.
    pub fn evaluate(&self, now: DateTime<Utc>) -> EngagementState {
        let elapsed = self.elapsed(now);
        if elapsed >= self.bored_after {
            EngagementState::Bored
        } else if elapsed >= self.idle_after {
            EngagementState::Idle
        } else {
            EngagementState::Active
        }
    }

    /// Re-evaluate at `now`. Never moves backwards without a `reset`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> EngagementState {
        let next = self.state.max(self.evaluate(now));
        if next != self.state {
            tracing::debug!(
                "Engagement {:?} -> {:?} after {:.1}s",
                self.state,
                next,
                self.elapsed(now).as_secs_f32()
            );
            self.state = next;
        }
        self.state
    }

    /// Record an interaction at `now`.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.last_interaction = now;
        self.state = EngagementState::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    fn millis(n: i64) -> chrono::Duration {
        chrono::Duration::milliseconds(n)
    }

    #[test]
    fn test_starts_active() {
        let mut machine = EngagementStateMachine::new(t0());
        assert_eq!(machine.state(), EngagementState::Active);
        assert_eq!(machine.tick(t0()), EngagementState::Active);
    }

    #[test]
    fn test_threshold_boundaries() {
        let machine = EngagementStateMachine::new(t0());
        assert_eq!(machine.evaluate(t0() + millis(9_999)), EngagementState::Active);
        assert_eq!(machine.evaluate(t0() + secs(10)), EngagementState::Idle);
        assert_eq!(machine.evaluate(t0() + millis(19_999)), EngagementState::Idle);
        assert_eq!(machine.evaluate(t0() + secs(20)), EngagementState::Bored);
        assert_eq!(machine.evaluate(t0() + secs(3600)), EngagementState::Bored);
    }

    #[test]
    fn test_reset_returns_to_active() {
        let mut machine = EngagementStateMachine::new(t0());
        assert_eq!(machine.tick(t0() + secs(25)), EngagementState::Bored);
        machine.reset(t0() + secs(25));
        assert_eq!(machine.state(), EngagementState::Active);
        assert_eq!(machine.tick(t0() + secs(30)), EngagementState::Active);
        assert_eq!(machine.tick(t0() + secs(35)), EngagementState::Idle);
        assert_eq!(machine.last_interaction(), t0() + secs(25));
    }

    #[test]
    fn test_bored_sticks_even_if_clock_goes_back() {
        let mut machine = EngagementStateMachine::new(t0());
        assert_eq!(machine.tick(t0() + secs(21)), EngagementState::Bored);
        assert_eq!(machine.tick(t0() + secs(5)), EngagementState::Bored);
        assert_eq!(machine.tick(t0() - secs(5)), EngagementState::Bored);
    }

    #[test]
    fn test_now_before_last_interaction_is_active() {
        let machine = EngagementStateMachine::new(t0());
        assert_eq!(machine.elapsed(t0() - secs(60)), Duration::ZERO);
        assert_eq!(machine.evaluate(t0() - secs(60)), EngagementState::Active);
    }

    #[test]
    fn test_custom_thresholds() {
        let machine = EngagementStateMachine::with_thresholds(
            Duration::from_secs(2),
            Duration::from_secs(1),
            t0(),
        );
        // bored threshold clamped up to idle threshold
        assert_eq!(machine.evaluate(t0() + secs(1)), EngagementState::Active);
        assert_eq!(machine.evaluate(t0() + secs(2)), EngagementState::Bored);
    }
}
