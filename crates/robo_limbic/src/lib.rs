//! # Robo Limbic System
//!
//! Fast, non-verbal state regulation for the companion:
//!
//! - **Engagement**: Active → Idle → Bored as the user goes quiet, recomputed
//!   from elapsed time on every tick and reset by any interaction
//! - **Heartbeat**: the external clock that publishes ticks on a fixed period
//! - **Ambient animation**: blinks and glances that keep the face alive
//!
//! None of these own the session; they are driven by `SessionEvent::Tick`.

mod animation;
mod engagement;
mod heartbeat;

pub use animation::AmbientAnimator;
pub use engagement::EngagementStateMachine;
pub use heartbeat::{spawn_heartbeat, HeartbeatConfig};
