//! Ambient animation scheduling.
//!
//! Blink and look-around each run on their own period, drawn once at
//! construction. A period that comes due while the robot is speaking is
//! consumed without emitting a cue.

use chrono::{DateTime, Utc};
use rand::Rng;
use robo_core::config::AnimationConfig;
use robo_core::{AnimationCue, EngagementState};
use std::time::Duration;

/// Largest horizontal pupil offset in pixels.
const LOOK_RANGE_X: f32 = 10.0;
/// Largest vertical pupil offset in pixels.
const LOOK_RANGE_Y: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct AmbientAnimator {
    blink_period: Duration,
    look_period: Duration,
    blink_duration_ms: u64,
    look_hold_ms: u64,
    next_blink: DateTime<Utc>,
    next_look: DateTime<Utc>,
}

fn draw_period<R: Rng + ?Sized>(min_ms: u64, max_ms: u64, rng: &mut R) -> Duration {
    let ms = if max_ms > min_ms {
        rng.gen_range(min_ms..max_ms)
    } else {
        min_ms
    };
    Duration::from_millis(ms.max(1))
}

fn after(at: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    at + chrono::Duration::from_std(period).unwrap_or_else(|_| chrono::Duration::seconds(1))
}

impl AmbientAnimator {
    pub fn new(config: &AnimationConfig, now: DateTime<Utc>) -> Self {
        Self::with_rng(config, now, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(config: &AnimationConfig, now: DateTime<Utc>, rng: &mut R) -> Self {
        let blink_period = draw_period(config.blink_min_ms, config.blink_max_ms, rng);
        let look_period = draw_period(config.look_min_ms, config.look_max_ms, rng);
        Self {
            blink_period,
            look_period,
            blink_duration_ms: config.blink_duration_ms,
            look_hold_ms: config.look_hold_ms,
            next_blink: after(now, blink_period),
            next_look: after(now, look_period),
        }
    }

    pub fn blink_period(&self) -> Duration {
        self.blink_period
    }

    pub fn look_period(&self) -> Duration {
        self.look_period
    }

    pub fn tick(&mut self, now: DateTime<Utc>, state: EngagementState, speaking: bool) -> Vec<AnimationCue> {
        self.tick_with_rng(now, state, speaking, &mut rand::thread_rng())
    }

    /// Cues due at `now`. Glances only happen while the user is idle or bored.
    pub fn tick_with_rng<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        state: EngagementState,
        speaking: bool,
        rng: &mut R,
    ) -> Vec<AnimationCue> {
        let mut cues = Vec::new();

        if now >= self.next_blink {
            self.next_blink = after(now, self.blink_period);
            if !speaking {
                cues.push(AnimationCue::Blink {
                    duration_ms: self.blink_duration_ms,
                });
            }
        }

        if now >= self.next_look {
            self.next_look = after(now, self.look_period);
            if !speaking && state != EngagementState::Active {
                cues.push(AnimationCue::LookAround {
                    dx: rng.gen_range(-LOOK_RANGE_X..=LOOK_RANGE_X),
                    dy: rng.gen_range(-LOOK_RANGE_Y..=LOOK_RANGE_Y),
                    hold_ms: self.look_hold_ms,
                });
            }
        }

        cues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn fixed_config() -> AnimationConfig {
        AnimationConfig {
            blink_min_ms: 3000,
            blink_max_ms: 3000,
            blink_duration_ms: 300,
            look_min_ms: 5000,
            look_max_ms: 5000,
            look_hold_ms: 1000,
        }
    }

    fn at_secs(n: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::seconds(n)
    }

    #[test]
    fn test_periods_within_configured_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let animator = AmbientAnimator::with_rng(&AnimationConfig::default(), t0(), &mut rng);
            assert!(animator.blink_period() >= Duration::from_millis(3000));
            assert!(animator.blink_period() < Duration::from_millis(6000));
            assert!(animator.look_period() >= Duration::from_millis(3000));
            assert!(animator.look_period() < Duration::from_millis(7000));
        }
    }

    #[test]
    fn test_blink_fires_once_per_period() {
        let mut animator = AmbientAnimator::new(&fixed_config(), t0());
        assert!(animator.tick(at_secs(2), EngagementState::Active, false).is_empty());
        assert_eq!(
            animator.tick(at_secs(3), EngagementState::Active, false),
            vec![AnimationCue::Blink { duration_ms: 300 }]
        );
        assert!(animator.tick(at_secs(4), EngagementState::Active, false).is_empty());
        assert_eq!(animator.tick(at_secs(6), EngagementState::Active, false).len(), 1);
    }

    #[test]
    fn test_no_glance_while_active() {
        let mut animator = AmbientAnimator::new(&fixed_config(), t0());
        let cues = animator.tick(at_secs(5), EngagementState::Active, false);
        assert!(cues
            .iter()
            .all(|c| matches!(c, AnimationCue::Blink { .. })));
    }

    #[test]
    fn test_glance_when_idle_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut animator = AmbientAnimator::with_rng(&fixed_config(), t0(), &mut rng);
        let cues = animator.tick_with_rng(at_secs(5), EngagementState::Idle, false, &mut rng);
        let glance = cues
            .iter()
            .find_map(|c| match c {
                AnimationCue::LookAround { dx, dy, hold_ms } => Some((*dx, *dy, *hold_ms)),
                _ => None,
            })
            .expect("expected a glance");
        assert!((-10.0f32..=10.0).contains(&glance.0));
        assert!((-5.0f32..=5.0).contains(&glance.1));
        assert_eq!(glance.2, 1000);
    }

    #[test]
    fn test_speaking_suppresses_cues_but_consumes_period() {
        let mut animator = AmbientAnimator::new(&fixed_config(), t0());
        assert!(animator.tick(at_secs(5), EngagementState::Bored, true).is_empty());
        // Both periods were consumed; nothing is due until the next one
        assert!(animator.tick(at_secs(6), EngagementState::Bored, false).is_empty());
        assert!(!animator.tick(at_secs(8), EngagementState::Bored, false).is_empty());
    }
}
