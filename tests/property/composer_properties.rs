//! Property-based tests for the composer state machine.
//!
//! Uses proptest to verify:
//! 1. A successful submit clears exactly the body, whatever the draft.
//! 2. A failed submit leaves the draft exactly as it was.
//! 3. Cancel always yields a closed composer, whatever came before.
//! 4. Arbitrary key sequences never leave a pending submission behind.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;
use topicchat::composer::{Composer, ComposerState, DraftField};
use topicchat::sender::loopback::LoopbackSender;
use topicchat_proto::request::SendOutcome;

// --- Strategies ---

/// A draft as the composer would hold it after some typing.
#[derive(Debug, Clone)]
enum Draft {
    Private {
        recipient: String,
        body: String,
    },
    Stream {
        stream: String,
        topic: String,
        body: String,
    },
}

/// Non-blank printable text, so validation accepts it.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9@.,]{1,12}( [a-zA-Z0-9@.,!?]{0,12}){0,3}"
}

fn arb_draft() -> impl Strategy<Value = Draft> {
    prop_oneof![
        (arb_text(), arb_text()).prop_map(|(recipient, body)| Draft::Private { recipient, body }),
        (arb_text(), arb_text(), arb_text()).prop_map(|(stream, topic, body)| Draft::Stream {
            stream,
            topic,
            body,
        }),
    ]
}

fn open(draft: &Draft) -> Composer {
    let mut composer = Composer::new();
    match draft {
        Draft::Private { recipient, body } => {
            composer.open_private(recipient.as_str());
            if let Some(field) = composer.field_mut(DraftField::Body) {
                field.set_text(body.as_str());
            }
        }
        Draft::Stream {
            stream,
            topic,
            body,
        } => {
            composer.open_stream(stream.as_str(), topic.as_str());
            if let Some(field) = composer.field_mut(DraftField::Body) {
                field.set_text(body.as_str());
            }
        }
    }
    composer
}

/// Keys a user might press while composing.
fn arb_key() -> impl Strategy<Value = KeyEvent> {
    prop_oneof![
        4 => any::<char>()
            .prop_filter("printable", |c| !c.is_control())
            .prop_map(|c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)),
        1 => Just(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
        1 => Just(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
        1 => Just(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
        1 => Just(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)),
        1 => Just(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)),
        1 => Just(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE)),
        1 => Just(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
        1 => Just(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)),
        1 => Just(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
    ]
}

// --- Property tests ---

proptest! {
    /// Success clears the body and nothing else.
    #[test]
    fn success_clears_exactly_body(draft in arb_draft()) {
        let mut composer = open(&draft);
        let before = composer.clone();

        let submission = composer.begin_submit().expect("valid draft should be accepted");
        composer.finish_submit(submission.id, &SendOutcome::Success);

        prop_assert_eq!(composer.mode(), before.mode());
        prop_assert_eq!(composer.text(DraftField::Body), Some(""));
        for field in [DraftField::Recipient, DraftField::Stream, DraftField::Topic] {
            prop_assert_eq!(composer.text(field), before.text(field));
        }
    }

    /// Failure leaves the draft unchanged.
    #[test]
    fn failure_leaves_draft_unchanged(draft in arb_draft(), reason in ".{0,40}") {
        let mut composer = open(&draft);
        let before = composer.state().clone();

        let submission = composer.begin_submit().expect("valid draft should be accepted");
        composer.finish_submit(submission.id, &SendOutcome::Failure(reason));

        prop_assert_eq!(composer.state(), &before);
        prop_assert!(!composer.is_pending());
    }

    /// Cancel always closes the composer.
    #[test]
    fn cancel_always_closes(
        draft in arb_draft(),
        keys in prop::collection::vec(arb_key(), 0..40),
        pending in any::<bool>(),
    ) {
        let sender = LoopbackSender::default();
        let mut composer = open(&draft);
        for key in keys {
            composer.handle_key_event(key, &sender);
        }
        if pending {
            let _ = composer.begin_submit();
        }

        composer.cancel();

        prop_assert_eq!(composer.state(), &ComposerState::Closed);
        prop_assert_eq!(composer.focus(), None);
        prop_assert!(!composer.is_pending());
    }

    /// Blocking submits through key events always complete.
    #[test]
    fn key_sequences_never_leave_pending(
        draft in arb_draft(),
        keys in prop::collection::vec(arb_key(), 0..60),
    ) {
        let sender = LoopbackSender::default();
        let mut composer = open(&draft);
        for key in keys {
            composer.handle_key_event(key, &sender);
            prop_assert!(!composer.is_pending());
        }
    }
}
