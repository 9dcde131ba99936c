//! Pure state transition function
//!
//! Given the same state, transcript and event, `transition` always produces
//! the same new state and effects. Model calls, delays and storage happen in
//! the runtime.

use super::{DialogueState, Effect, Event, Generation, Transcript};
use crate::system_prompt::{AFFIRMATION_PROMPT, GREETING_PROMPT};
use thiserror::Error;

pub const FOLLOW_UP_MESSAGE: &str =
    "Thank you for sharing. Can you tell me more about what's on your mind?";
pub const SELFIE_QUESTION: &str = " Would you like to take a selfie today?";
pub const SELFIE_ACCEPTED_MESSAGE: &str = "Great! Let's take a selfie.";
pub const SELFIE_DECLINED_MESSAGE: &str = "No problem! Have a wonderful day!";
pub const SELFIE_ROUTE: &str = "/take-selfie";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogueState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogueState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is still being generated for this session, try again shortly")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &DialogueState,
    transcript: &Transcript,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        // Step 0: record the feeling and ask the model for a greeting
        (DialogueState::Greeting, Event::UserMessage { text }) => Ok(TransitionResult::new(
            DialogueState::Generating {
                purpose: Generation::Greeting,
            },
        )
        .with_effect(Effect::record(0, text.clone()))
        .with_effect(Effect::RequestGeneration {
            system_prompt: GREETING_PROMPT.to_string(),
            user_messages: vec![text],
        })),

        (
            DialogueState::Generating {
                purpose: Generation::Greeting,
            },
            Event::ReplyGenerated { text },
        ) => Ok(TransitionResult::new(DialogueState::FollowUp).with_effect(Effect::reply(text))),

        // Step 1: static follow-up, no model call
        (DialogueState::FollowUp, Event::UserMessage { text }) => {
            Ok(TransitionResult::new(DialogueState::Affirmation)
                .with_effect(Effect::record(1, text))
                .with_effect(Effect::Pause)
                .with_effect(Effect::reply(FOLLOW_UP_MESSAGE)))
        }

        // Step 2: affirmation from everything the user said this cycle
        (DialogueState::Affirmation, Event::UserMessage { text }) => {
            let user_messages = transcript
                .responses()
                .iter()
                .take(2)
                .cloned()
                .chain(std::iter::once(text.clone()))
                .collect();

            Ok(TransitionResult::new(DialogueState::Generating {
                purpose: Generation::Affirmation,
            })
            .with_effect(Effect::record(2, text))
            .with_effect(Effect::RequestGeneration {
                system_prompt: AFFIRMATION_PROMPT.to_string(),
                user_messages,
            }))
        }

        (
            DialogueState::Generating {
                purpose: Generation::Affirmation,
            },
            Event::ReplyGenerated { text },
        ) => Ok(TransitionResult::new(DialogueState::SelfieOffer)
            .with_effect(Effect::reply(format!("{text}{SELFIE_QUESTION}")))),

        // Step 3: selfie answer, then start over
        (DialogueState::SelfieOffer, Event::UserMessage { text }) => {
            let reply = if wants_selfie(&text) {
                Effect::reply_with_hint(SELFIE_ACCEPTED_MESSAGE, SELFIE_ROUTE)
            } else {
                Effect::reply(SELFIE_DECLINED_MESSAGE)
            };

            Ok(TransitionResult::new(DialogueState::Greeting)
                .with_effect(Effect::Pause)
                .with_effect(Effect::ResetTranscript)
                .with_effect(reply))
        }

        // A failed call leaves the session on the step that issued it. The
        // answer recorded for that step stays and is replaced on retry.
        (DialogueState::Generating { purpose }, Event::GenerationFailed { message }) => {
            let back = match purpose {
                Generation::Greeting => DialogueState::Greeting,
                Generation::Affirmation => DialogueState::Affirmation,
            };
            Ok(TransitionResult::new(back).with_effect(Effect::ReportFailure { message }))
        }

        (DialogueState::Generating { .. }, Event::UserMessage { .. }) => {
            Err(TransitionError::Busy)
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}

/// Case-insensitive substring match on "yes"
pub fn wants_selfie(text: &str) -> bool {
    text.to_lowercase().contains("yes")
}
