//! Dialogue state types

/// Which model call a `Generating` state is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Step 0: greet the user based on how they feel
    Greeting,
    /// Step 2: affirmation built from all three answers
    Affirmation,
}

/// Position in the four-step script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogueState {
    /// Step 0: waiting for the user's first answer
    #[default]
    Greeting,
    /// Step 1: waiting for more detail
    FollowUp,
    /// Step 2: waiting for the last answer before the affirmation
    Affirmation,
    /// Step 3: waiting for the answer to the selfie question
    SelfieOffer,
    /// A model call is in flight for this session
    Generating { purpose: Generation },
}

impl DialogueState {
    /// Script step index (0..=3). `Generating` reports the step that issued the call.
    pub fn step(self) -> usize {
        match self {
            DialogueState::Greeting
            | DialogueState::Generating {
                purpose: Generation::Greeting,
            } => 0,
            DialogueState::FollowUp => 1,
            DialogueState::Affirmation
            | DialogueState::Generating {
                purpose: Generation::Affirmation,
            } => 2,
            DialogueState::SelfieOffer => 3,
        }
    }

    pub fn is_generating(self) -> bool {
        matches!(self, DialogueState::Generating { .. })
    }
}

/// User answers collected during the current cycle, in step order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    responses: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` as the answer for step `index`.
    ///
    /// Anything recorded at or after `index` is dropped first, so a retried
    /// step replaces its earlier answer instead of growing the list.
    pub fn record(&mut self, index: usize, text: String) {
        self.responses.truncate(index);
        self.responses.push(text);
    }

    pub fn clear(&mut self) {
        self.responses.clear();
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    #[allow(dead_code)] // Used by tests
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
