//! A running companion session.
//!
//! `SessionState` holds everything that changes while the companion is
//! open. `Session` wires it to a display surface and consumes typed
//! `SessionEvent`s through a single `dispatch`, so the core never touches a
//! UI event loop.

use crate::engine::{Reply, ResponseEngine};
use chrono::{DateTime, Utc};
use robo_core::{
    CompanionError, DisplaySurface, EngagementState, Expression, KeyValueStore, ResponseCatalog,
    RoboConfig, Sender, SessionEvent, StorageStatus, VoiceOutput,
};
use robo_expression::{Face, Humanizer};
use robo_limbic::{AmbientAnimator, EngagementStateMachine};
use robo_memory::ConversationStore;
use std::sync::Arc;

pub const WELCOME_MESSAGE: &str =
    "I'm a Progressive Web App! Click the Install button to add me to your home screen.";

const NOTICE_HISTORY_CLEARED: &str = "Chat history cleared!";
const NOTICE_CLEAR_FAILED: &str = "Could not clear chat history";
const NOTICE_SAVE_FAILED: &str = "Could not save conversation";
const NOTICE_NO_VOICE: &str = "Voice output is not available";
const NOTICE_SPEAK_FAILED: &str = "Could not speak the reply";

/// Mutable per-session state.
pub struct SessionState {
    engagement: EngagementStateMachine,
    history: ConversationStore,
    face: Face,
    animator: AmbientAnimator,
    speaking: bool,
    last_reply: Option<String>,
}

impl SessionState {
    pub fn new(
        engagement: EngagementStateMachine,
        history: ConversationStore,
        animator: AmbientAnimator,
    ) -> Self {
        Self {
            engagement,
            history,
            face: Face::new(),
            animator,
            speaking: false,
            last_reply: None,
        }
    }

    pub fn from_config(config: &RoboConfig, store: Arc<dyn KeyValueStore>, now: DateTime<Utc>) -> Self {
        Self::new(
            EngagementStateMachine::from_config(&config.engagement, now),
            ConversationStore::open(store, &config.storage, &config.conversation),
            AmbientAnimator::new(&config.animation, now),
        )
    }

    pub fn engagement(&self) -> &EngagementStateMachine {
        &self.engagement
    }

    pub fn engagement_mut(&mut self) -> &mut EngagementStateMachine {
        &mut self.engagement
    }

    pub fn history(&self) -> &ConversationStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut ConversationStore {
        &mut self.history
    }

    pub fn expression(&self) -> Expression {
        self.face.current()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Most recent robot line, including the welcome message.
    pub fn last_reply(&self) -> Option<&str> {
        self.last_reply.as_deref()
    }
}

pub struct Session {
    engine: ResponseEngine,
    state: SessionState,
    humanizer: Humanizer,
    display: Arc<dyn DisplaySurface>,
    voice: Option<Arc<dyn VoiceOutput>>,
}

impl Session {
    pub fn new(
        engine: ResponseEngine,
        state: SessionState,
        humanizer: Humanizer,
        display: Arc<dyn DisplaySurface>,
    ) -> Self {
        Self {
            engine,
            state,
            humanizer,
            display,
            voice: None,
        }
    }

    /// Build a session from config, loading the catalog and history from `store`.
    pub fn from_config(
        config: &RoboConfig,
        store: Arc<dyn KeyValueStore>,
        display: Arc<dyn DisplaySurface>,
        now: DateTime<Utc>,
    ) -> Self {
        let catalog = ResponseCatalog::load(store.as_ref(), &config.storage.catalog_key());
        let state = SessionState::from_config(config, store, now);
        Self::new(
            ResponseEngine::new(catalog),
            state,
            Humanizer::from_config(&config.humanizer),
            display,
        )
    }

    pub fn with_voice(mut self, voice: Arc<dyn VoiceOutput>) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn engine(&self) -> &ResponseEngine {
        &self.engine
    }

    /// Greet the user and paint the initial indicators.
    pub fn start(&mut self) {
        self.state.face.set(Expression::Neutral);
        self.display.show_expression(Expression::Neutral);
        self.display.show_engagement(self.state.engagement.state());
        self.display.show_storage(self.state.history.storage_status());
        self.display.render_message(WELCOME_MESSAGE, Sender::Robot);
        self.state.last_reply = Some(WELCOME_MESSAGE.to_string());
        tracing::info!(
            "Session started with {} remembered exchanges",
            self.state.history.size()
        );
    }

    /// Single entry point for everything the outside world can do.
    ///
    /// Returns the reply for submitted text. `EmptyInput` means the event was
    /// ignored; other errors have already been shown as a notice.
    pub async fn dispatch(&mut self, event: SessionEvent) -> Result<Option<Reply>, CompanionError> {
        match event {
            SessionEvent::UserSubmitted { text, at } | SessionEvent::VoiceTranscript { text, at } => {
                self.submit(&text, at).await.map(Some)
            }
            SessionEvent::Tick(now) => {
                self.tick(now);
                Ok(None)
            }
            SessionEvent::InputFocused(now) => {
                self.focus(now);
                Ok(None)
            }
            SessionEvent::SpeakLastReply => {
                self.toggle_speech();
                Ok(None)
            }
            SessionEvent::SpeechFinished => {
                self.stop_speaking();
                Ok(None)
            }
            SessionEvent::ClearHistory => self.clear_history().map(|_| None),
        }
    }

    async fn submit(&mut self, text: &str, at: DateTime<Utc>) -> Result<Reply, CompanionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CompanionError::EmptyInput);
        }

        self.mark_interaction(at);
        self.show_face(Expression::Excited);
        self.display.render_message(text, Sender::User);

        let delay = self.humanizer.thinking_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = self.engine.respond(&mut self.state, text, at)?;
        self.display.render_message(&reply.text, Sender::Robot);
        self.state.last_reply = Some(reply.text.clone());
        // The mouth moves from the moment the reply appears
        let replied_at = at + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        self.state.face.start_talking(replied_at, self.humanizer.talking_duration());
        self.display.show_expression(Expression::Talking);

        if reply.persistence_failure.is_some() {
            self.display.notify(NOTICE_SAVE_FAILED);
            self.display.show_storage(StorageStatus::Error);
        } else {
            self.display.show_storage(self.state.history.storage_status());
        }
        Ok(reply)
    }

    fn tick(&mut self, now: DateTime<Utc>) {
        let before = self.state.engagement.state();
        let engagement = self.state.engagement.tick(now);
        if engagement != before {
            self.display.show_engagement(engagement);
        }

        let speaking = self.state.speaking;
        if let Some(expression) = self.state.face.settle(now, engagement, speaking) {
            self.display.show_expression(expression);
        }
        for cue in self.state.animator.tick(now, engagement, speaking) {
            self.display.animate(cue);
        }
    }

    /// Focusing the input wakes an idle or bored robot.
    fn focus(&mut self, now: DateTime<Utc>) {
        if self.state.engagement.state() != EngagementState::Active {
            self.mark_interaction(now);
            self.show_face(Expression::Neutral);
        }
    }

    fn toggle_speech(&mut self) {
        if self.state.speaking {
            if let Some(voice) = &self.voice {
                voice.cancel();
            }
            self.stop_speaking();
            return;
        }

        let Some(voice) = self.voice.clone() else {
            self.display.notify(NOTICE_NO_VOICE);
            return;
        };
        let Some(text) = self.state.last_reply.clone() else {
            return;
        };

        match voice.speak(&text) {
            Ok(()) => {
                self.state.speaking = true;
                self.show_face(Expression::Talking);
            }
            Err(e) => {
                tracing::warn!("Speech synthesis failed: {}", e);
                self.display.notify(NOTICE_SPEAK_FAILED);
            }
        }
    }

    fn stop_speaking(&mut self) {
        self.state.speaking = false;
        if let Some(expression) = self.state.face.rest(self.state.engagement.state()) {
            self.display.show_expression(expression);
        }
    }

    fn clear_history(&mut self) -> Result<(), CompanionError> {
        let cleared = self.state.history.clear();
        match &cleared {
            Ok(()) => {
                self.display.notify(NOTICE_HISTORY_CLEARED);
                self.display.show_storage(self.state.history.storage_status());
            }
            Err(e) => {
                tracing::warn!("Could not clear history: {}", e);
                self.display.notify(NOTICE_CLEAR_FAILED);
                self.display.show_storage(StorageStatus::Error);
            }
        }
        cleared
    }

    fn mark_interaction(&mut self, now: DateTime<Utc>) {
        let before = self.state.engagement.state();
        self.state.engagement.reset(now);
        if before != EngagementState::Active {
            self.display.show_engagement(EngagementState::Active);
        }
    }

    fn show_face(&mut self, expression: Expression) {
        if self.state.face.set(expression) {
            self.display.show_expression(expression);
        }
    }
}
