//! Per-session state and effect execution

use crate::state_machine::{transition, DialogueState, Effect, Event, Transcript, TransitionError};
use std::time::Duration;
use tokio::time::Instant;

/// Text returned to the caller for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub message: String,
    pub selfie_hint: Option<String>,
}

/// Model call the runtime must make before the turn can finish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_messages: Vec<String>,
}

/// Work left for the runtime after the synchronous effects are applied
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub generation: Option<GenerationRequest>,
    pub pause: bool,
    pub reply: Option<Reply>,
    pub failure: Option<String>,
}

/// One caller's conversation
#[derive(Debug)]
pub struct Session {
    state: DialogueState,
    transcript: Transcript,
    last_active: Instant,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: DialogueState::Greeting,
            transcript: Transcript::new(),
            last_active: Instant::now(),
        }
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Idle for longer than `ttl` as of `now`. A pending generation keeps the session alive.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        !self.state.is_generating() && now.saturating_duration_since(self.last_active) > ttl
    }

    /// Run one event through the state machine and apply its effects
    pub fn handle(&mut self, event: Event) -> Result<Outcome, TransitionError> {
        let result = transition(&self.state, &self.transcript, event)?;
        tracing::debug!(
            from = ?self.state,
            to = ?result.new_state,
            effects = result.effects.len(),
            "Dialogue transition"
        );
        self.state = result.new_state;
        Ok(self.apply(result.effects))
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Outcome {
        let mut outcome = Outcome::default();
        for effect in effects {
            match effect {
                Effect::RecordResponse { index, text } => self.transcript.record(index, text),
                Effect::ResetTranscript => self.transcript.clear(),
                Effect::RequestGeneration {
                    system_prompt,
                    user_messages,
                } => {
                    outcome.generation = Some(GenerationRequest {
                        system_prompt,
                        user_messages,
                    });
                }
                Effect::Pause => outcome.pause = true,
                Effect::Reply {
                    message,
                    selfie_hint,
                } => {
                    outcome.reply = Some(Reply {
                        message,
                        selfie_hint,
                    });
                }
                Effect::ReportFailure { message } => outcome.failure = Some(message),
            }
        }
        outcome
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
