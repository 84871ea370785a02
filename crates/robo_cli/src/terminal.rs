//! Terminal rendering for a session, plus an optional printed "voice".

use robo_core::{
    AnimationCue, DisplaySurface, EngagementState, Expression, Sender, SessionEvent, StorageLevel,
    StorageStatus, VoiceOutput,
};
use robo_expression::profile;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Prints every display request as a line on stdout.
pub struct TerminalDisplay;

impl DisplaySurface for TerminalDisplay {
    fn render_message(&self, text: &str, sender: Sender) {
        match sender {
            Sender::User => tracing::debug!("Rendered user line ({} chars)", text.chars().count()),
            Sender::Robot => println!("\nRobo: {}\n", text),
        }
    }

    fn show_expression(&self, expression: Expression) {
        let face = profile(expression);
        println!("  ({}) {}", expression_glyph(expression), face.text);
    }

    fn show_engagement(&self, state: EngagementState) {
        tracing::info!("Engagement is now {:?}", state);
    }

    fn notify(&self, notice: &str) {
        println!("  * {}", notice);
    }

    fn show_storage(&self, status: StorageStatus) {
        match status {
            StorageStatus::Used(usage) => {
                let level = match usage.level() {
                    StorageLevel::Low => "low",
                    StorageLevel::Moderate => "moderate",
                    StorageLevel::High => "high",
                };
                tracing::debug!("Storage: {} ({})", usage, level);
            }
            StorageStatus::Error => println!("  * Storage error"),
        }
    }

    fn animate(&self, cue: AnimationCue) {
        tracing::trace!("Animation cue: {:?}", cue);
    }
}

fn expression_glyph(expression: Expression) -> &'static str {
    match expression {
        Expression::Neutral => "^_^",
        Expression::Idle => "-_-",
        Expression::Bored => "=_=",
        Expression::Talking => "^o^",
        Expression::Excited => "*o*",
    }
}

/// Rough speaking time for `text`, at about three words per second.
pub fn speaking_time(text: &str) -> Duration {
    let words = text.split_whitespace().count().max(1) as u64;
    Duration::from_millis(words * 330)
}

/// Voice that prints the spoken line and reports `SpeechFinished` once the
/// estimated speaking time has passed. Must be used inside a tokio runtime.
pub struct PrintedVoice {
    events: mpsc::Sender<SessionEvent>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl PrintedVoice {
    pub fn new(events: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            events,
            pending: Mutex::new(None),
        }
    }

    fn replace_pending(&self, next: Option<JoinHandle<()>>) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = next;
    }
}

impl VoiceOutput for PrintedVoice {
    fn speak(&self, text: &str) -> anyhow::Result<()> {
        let handle = tokio::runtime::Handle::try_current()?;
        println!("  ~ \"{}\"", text);

        let events = self.events.clone();
        let duration = speaking_time(text);
        let task = handle.spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = events.send(SessionEvent::SpeechFinished).await;
        });
        self.replace_pending(Some(task));
        tracing::debug!("Speaking for {:?}", duration);
        Ok(())
    }

    fn cancel(&self) {
        self.replace_pending(None);
    }
}
