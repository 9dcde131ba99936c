//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// Apply the transcript effects the runtime would apply
fn apply(transcript: &mut Transcript, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::RecordResponse { index, text } => transcript.record(*index, text.clone()),
            Effect::ResetTranscript => transcript.clear(),
            _ => {}
        }
    }
}

/// One caller turn: user message, then the model outcome if one was requested
fn drive(
    state: DialogueState,
    transcript: &mut Transcript,
    text: String,
    model_ok: bool,
) -> (DialogueState, Vec<Effect>) {
    let result = transition(&state, transcript, Event::UserMessage { text }).unwrap();
    apply(transcript, &result.effects);
    let mut effects = result.effects;

    if result.new_state.is_generating() {
        let event = if model_ok {
            Event::reply_generated("generated")
        } else {
            Event::generation_failed("upstream down")
        };
        let follow = transition(&result.new_state, transcript, event).unwrap();
        apply(transcript, &follow.effects);
        effects.extend(follow.effects);
        (follow.new_state, effects)
    } else {
        (result.new_state, effects)
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_utterance() -> impl Strategy<Value = String> {
    "[a-zA-Z ,.!?]{0,40}"
}

/// "yes" in random case, embedded in arbitrary text
fn arb_yes_utterance() -> impl Strategy<Value = String> {
    (
        "[a-zA-Z ]{0,10}",
        proptest::collection::vec(any::<bool>(), 3),
        "[a-zA-Z ]{0,10}",
    )
        .prop_map(|(prefix, upper, suffix)| {
            let yes: String = "yes"
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect();
            format!("{prefix}{yes}{suffix}")
        })
}

fn arb_non_yes_utterance() -> impl Strategy<Value = String> {
    arb_utterance().prop_filter("must not contain yes", |s| !wants_selfie(s))
}

fn arb_stable_state() -> impl Strategy<Value = DialogueState> {
    prop_oneof![
        Just(DialogueState::Greeting),
        Just(DialogueState::FollowUp),
        Just(DialogueState::Affirmation),
        Just(DialogueState::SelfieOffer),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn yes_anywhere_takes_selfie_branch(text in arb_yes_utterance()) {
        let result = transition(
            &DialogueState::SelfieOffer,
            &Transcript::new(),
            Event::user_message(text),
        ).unwrap();

        prop_assert_eq!(result.new_state, DialogueState::Greeting);
        prop_assert!(result.effects.contains(
            &Effect::reply_with_hint(SELFIE_ACCEPTED_MESSAGE, SELFIE_ROUTE)
        ));
    }

    #[test]
    fn four_turns_without_yes_return_to_start(
        first in arb_utterance(),
        second in arb_utterance(),
        third in arb_utterance(),
        last in arb_non_yes_utterance(),
    ) {
        let mut transcript = Transcript::new();
        let mut state = DialogueState::Greeting;
        for text in [first, second, third] {
            state = drive(state, &mut transcript, text, true).0;
        }
        prop_assert_eq!(state, DialogueState::SelfieOffer);

        let (state, effects) = drive(state, &mut transcript, last, true);
        prop_assert_eq!(state, DialogueState::Greeting);
        prop_assert!(transcript.responses().is_empty());
        prop_assert_eq!(effects.last(), Some(&Effect::reply(SELFIE_DECLINED_MESSAGE)));
    }

    #[test]
    fn transcript_tracks_step_under_failures(
        turns in proptest::collection::vec((arb_utterance(), any::<bool>()), 1..40)
    ) {
        let mut transcript = Transcript::new();
        let mut state = DialogueState::Greeting;

        for (text, model_ok) in turns {
            let before = state;
            let (after, effects) = drive(state, &mut transcript, text, model_ok);
            state = after;

            let failed = effects.iter().any(|e| matches!(e, Effect::ReportFailure { .. }));
            if failed {
                // The failing call recorded exactly its own answer
                prop_assert_eq!(state, before);
                prop_assert_eq!(transcript.len(), state.step() + 1);
            } else {
                match state {
                    DialogueState::Greeting => prop_assert_eq!(transcript.len(), 0),
                    DialogueState::FollowUp => prop_assert_eq!(transcript.len(), 1),
                    DialogueState::Affirmation => prop_assert_eq!(transcript.len(), 2),
                    DialogueState::SelfieOffer => prop_assert_eq!(transcript.len(), 3),
                    DialogueState::Generating { .. } => prop_assert!(false, "left generating"),
                }
            }
        }
    }

    #[test]
    fn model_calls_only_at_generative_steps(
        state in arb_stable_state(),
        text in arb_utterance(),
    ) {
        let mut transcript = Transcript::new();
        for i in 0..state.step() {
            transcript.record(i, format!("answer {i}"));
        }

        let result = transition(&state, &transcript, Event::user_message(text)).unwrap();
        let requests = result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::RequestGeneration { .. }))
            .count();

        let expected = usize::from(matches!(
            state,
            DialogueState::Greeting | DialogueState::Affirmation
        ));
        prop_assert_eq!(requests, expected);
        prop_assert_eq!(result.new_state.is_generating(), expected == 1);
    }

    #[test]
    fn every_user_turn_answers_once(
        state in arb_stable_state(),
        text in arb_utterance(),
        model_ok in any::<bool>(),
    ) {
        let mut transcript = Transcript::new();
        for i in 0..state.step() {
            transcript.record(i, format!("answer {i}"));
        }

        let (_, effects) = drive(state, &mut transcript, text, model_ok);
        let answers = effects
            .iter()
            .filter(|e| matches!(e, Effect::Reply { .. } | Effect::ReportFailure { .. }))
            .count();
        prop_assert_eq!(answers, 1);
    }
}
