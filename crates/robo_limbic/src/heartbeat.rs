//! Heartbeat for the engagement clock.
//!
//! The heartbeat determines how often engagement and ambient animation are
//! re-evaluated even when the user does nothing.

use chrono::Utc;
use robo_core::config::EngagementConfig;
use robo_core::SessionEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Configuration for the heartbeat
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// How often to publish a tick (default: 1s)
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

impl HeartbeatConfig {
    pub fn from_engagement(config: &EngagementConfig) -> Self {
        Self {
            interval: config.tick_interval().max(Duration::from_millis(1)),
        }
    }

    /// Very fast heartbeat for testing
    pub fn testing() -> Self {
        Self {
            interval: Duration::from_millis(10),
        }
    }
}

/// Publish `SessionEvent::Tick` on a fixed period until the receiver is dropped.
pub fn spawn_heartbeat(config: HeartbeatConfig, tx: mpsc::Sender<SessionEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if tx.send(SessionEvent::Tick(Utc::now())).await.is_err() {
                tracing::debug!("Heartbeat receiver closed, stopping");
                break;
            }
        }
    })
}
