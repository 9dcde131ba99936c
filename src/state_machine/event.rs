//! Events that drive the dialogue

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The caller submitted an utterance
    UserMessage { text: String },

    /// The model gateway returned text for the pending generation
    ReplyGenerated { text: String },

    /// The model gateway call failed
    GenerationFailed { message: String },
}

impl Event {
    pub fn user_message(text: impl Into<String>) -> Self {
        Event::UserMessage { text: text.into() }
    }

    pub fn reply_generated(text: impl Into<String>) -> Self {
        Event::ReplyGenerated { text: text.into() }
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        Event::GenerationFailed {
            message: message.into(),
        }
    }
}
