//! Effects produced by state transitions

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Store the utterance as the answer for step `index`
    RecordResponse { index: usize, text: String },

    /// Ask the model gateway for text
    RequestGeneration {
        system_prompt: String,
        user_messages: Vec<String>,
    },

    /// Wait for the configured reply delay before answering
    Pause,

    /// Answer the caller
    Reply {
        message: String,
        selfie_hint: Option<String>,
    },

    /// Forget all recorded answers (cycle complete)
    ResetTranscript,

    /// Answer the caller with a failure
    ReportFailure { message: String },
}

impl Effect {
    pub fn reply(message: impl Into<String>) -> Self {
        Effect::Reply {
            message: message.into(),
            selfie_hint: None,
        }
    }

    pub fn reply_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Effect::Reply {
            message: message.into(),
            selfie_hint: Some(hint.into()),
        }
    }

    pub fn record(index: usize, text: impl Into<String>) -> Self {
        Effect::RecordResponse {
            index,
            text: text.into(),
        }
    }
}
