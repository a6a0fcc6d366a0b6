//! Integration tests for the terminal host.
//!
//! Drives [`App`] with key and mouse events the way the binary does and
//! renders it into a `TestBackend`.
//!
//! # Verification Focus
//!
//! - Selection movement and narrowing keep the right message selected
//! - Replies open the composer and move focus to it
//! - Sent messages are echoed back into the list
//! - Send failures surface on the status line and keep the draft
//! - Mouse clicks hit the message drawn under the pointer
//! - The full UI renders headers, hints, and status

use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{Terminal, backend::TestBackend};
use topicchat::app::{self, App, Focus, MessageHit, Narrow, Viewer};
use topicchat::composer::{ComposerMode, DraftField};
use topicchat::sender::loopback::LoopbackSender;
use topicchat::ui;
use topicchat_proto::message::MessageKind;

fn viewer() -> Viewer {
    Viewer {
        full_name: "Me".to_string(),
        email: "me@example.com".to_string(),
    }
}

fn demo_app() -> App<LoopbackSender> {
    let viewer = viewer();
    let messages = app::demo_messages(&viewer);
    App::new(LoopbackSender::default(), viewer).with_messages(messages)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut App<LoopbackSender>, text: &str) {
    for c in text.chars() {
        app.handle_key_event(key(KeyCode::Char(c)));
    }
}

fn echo_sent(app: &mut App<LoopbackSender>) {
    for request in app.sender.take_sent() {
        app.echo_sent(request, 1_700_001_000);
    }
}

fn selected_id(app: &App<LoopbackSender>) -> u64 {
    app.selected_message().map(|m| m.id).unwrap()
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width);
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Selection and narrowing
// =============================================================================

#[test]
fn test_starts_on_newest_message() {
    let app = demo_app();
    assert_eq!(app.focus, Focus::Messages);
    assert_eq!(app.visible_messages().len(), 4);
    assert_eq!(selected_id(&app), 4);
}

#[test]
fn test_selection_moves_and_stops_at_ends() {
    let mut app = demo_app();

    app.handle_key_event(key(KeyCode::Char('j')));
    assert_eq!(selected_id(&app), 4);

    for _ in 0..10 {
        app.handle_key_event(key(KeyCode::Up));
    }
    assert_eq!(selected_id(&app), 1);

    app.handle_key_event(key(KeyCode::Down));
    assert_eq!(selected_id(&app), 2);
}

#[test]
fn test_narrow_to_topic_and_back_keeps_message_selected() {
    let mut app = demo_app();
    app.handle_key_event(key(KeyCode::Char('k')));
    assert_eq!(selected_id(&app), 3);

    app.handle_key_event(key(KeyCode::Char('s')));
    assert_eq!(
        app.view.narrow,
        Narrow::Topic {
            stream_id: 2,
            name: "dev".to_string(),
            topic: "ratatui".to_string(),
        }
    );
    assert_eq!(app.visible_messages().len(), 1);
    assert_eq!(selected_id(&app), 3);

    app.handle_key_event(key(KeyCode::Esc));
    assert_eq!(app.view.narrow, Narrow::All);
    assert_eq!(app.visible_messages().len(), 4);
    assert_eq!(selected_id(&app), 3);
    assert_eq!(app.focus, Focus::Messages);
}

#[test]
fn test_narrow_to_stream_filters_other_streams() {
    let mut app = demo_app();
    for _ in 0..3 {
        app.handle_key_event(key(KeyCode::Char('k')));
    }
    assert_eq!(selected_id(&app), 1);

    app.handle_key_event(KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT));

    let ids: Vec<u64> = app.visible_messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(app.view.narrow.describe(), "#general");
}

// =============================================================================
// Composing from the host
// =============================================================================

#[test]
fn test_reply_send_and_echo() {
    let mut app = demo_app();
    app.handle_key_event(key(KeyCode::Char('k')));

    app.handle_key_event(key(KeyCode::Enter));
    assert_eq!(app.focus, Focus::Composer);
    assert_eq!(app.composer.text(DraftField::Topic), Some("ratatui"));

    type_text(&mut app, "looks good");
    app.handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

    let status = app.status.clone().unwrap();
    assert_eq!(status.text, "Message sent");
    assert!(!status.is_error);
    assert_eq!(app.composer.text(DraftField::Body), Some(""));

    echo_sent(&mut app);
    let echoed = app.messages.last().unwrap();
    assert_eq!(echoed.id, 5);
    assert_eq!(echoed.sender_email, "me@example.com");
    assert_eq!(echoed.content, "looks good");
    assert_eq!(echoed.stream_name(), Some("dev"));
    assert_eq!(echoed.topic(), Some("ratatui"));
    assert!(matches!(
        echoed.kind,
        MessageKind::Stream { stream_id: 2, .. }
    ));
}

#[test]
fn test_new_private_message_from_list() {
    let mut app = demo_app();

    app.handle_key_event(key(KeyCode::Char('p')));
    assert_eq!(app.focus, Focus::Composer);
    assert_eq!(app.composer.mode(), ComposerMode::PrivateDraft);
    assert_eq!(app.composer.focus(), Some(DraftField::Recipient));

    type_text(&mut app, "alice@example.com");
    app.handle_key_event(key(KeyCode::Enter));
    type_text(&mut app, "hey");
    app.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));

    echo_sent(&mut app);
    let echoed = app.messages.last().unwrap();
    let names: Vec<&str> = echoed
        .recipients()
        .iter()
        .map(|r| r.full_name.as_str())
        .collect();
    assert_eq!(names, vec!["Alice", "Me"]);
    // Selection follows the new message when it was on the newest one.
    assert_eq!(selected_id(&app), 5);
}

#[test]
fn test_new_draft_from_list_replaces_open_draft() {
    let mut app = demo_app();
    app.handle_key_event(key(KeyCode::Char('p')));
    type_text(&mut app, "x@example.com");
    app.handle_key_event(key(KeyCode::Esc));
    assert_eq!(app.focus, Focus::Messages);

    app.handle_key_event(key(KeyCode::Char('n')));

    assert_eq!(app.composer.mode(), ComposerMode::StreamDraft);
    assert_eq!(app.composer.text(DraftField::Stream), Some(""));
    assert_eq!(app.composer.focus(), Some(DraftField::Stream));
}

#[test]
fn test_send_failure_shows_error_and_keeps_draft() {
    let mut app = demo_app();
    app.sender.fail_with("not subscribed");
    app.handle_key_event(key(KeyCode::Char('R')));
    type_text(&mut app, "ping");

    app.handle_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

    let status = app.status.clone().unwrap();
    assert_eq!(status.text, "Send failed: not subscribed");
    assert!(status.is_error);
    assert_eq!(app.composer.text(DraftField::Recipient), Some("bob@example.com"));
    assert_eq!(app.composer.text(DraftField::Body), Some("ping"));
    assert_eq!(app.focus, Focus::Composer);
    assert_eq!(app.sender.pending(), 0);
}

#[test]
fn test_escape_in_composer_returns_to_list() {
    let mut app = demo_app();
    app.handle_key_event(key(KeyCode::Enter));
    assert_eq!(app.focus, Focus::Composer);

    app.handle_key_event(key(KeyCode::Esc));

    assert_eq!(app.focus, Focus::Messages);
    assert!(!app.composer.is_open());
}

// =============================================================================
// Quit
// =============================================================================

#[test]
fn test_q_quits_only_from_list() {
    let mut app = demo_app();
    app.handle_key_event(key(KeyCode::Char('p')));
    app.handle_key_event(key(KeyCode::Char('q')));
    assert!(!app.should_quit);
    assert_eq!(app.composer.text(DraftField::Recipient), Some("q"));

    app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
}

// =============================================================================
// Mouse
// =============================================================================

#[test]
fn test_click_selects_and_replies_to_hit_message() {
    let mut app = demo_app();
    app.hits = vec![
        MessageHit {
            top: 1,
            bottom: 5,
            index: 0,
        },
        MessageHit {
            top: 5,
            bottom: 10,
            index: 1,
        },
    ];

    app.handle_mouse_event(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 10,
        row: 6,
        modifiers: KeyModifiers::NONE,
    });

    assert_eq!(selected_id(&app), 2);
    assert_eq!(app.focus, Focus::Composer);
    assert_eq!(app.composer.text(DraftField::Stream), Some("general"));
    assert_eq!(app.composer.text(DraftField::Topic), Some("welcome"));
}

#[test]
fn test_click_outside_messages_does_nothing() {
    let mut app = demo_app();
    app.hits = vec![MessageHit {
        top: 1,
        bottom: 5,
        index: 0,
    }];

    app.handle_mouse_event(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 10,
        row: 20,
        modifiers: KeyModifiers::NONE,
    });

    assert_eq!(selected_id(&app), 4);
    assert!(!app.composer.is_open());
}

#[test]
fn test_pointer_motion_and_other_buttons_leave_selection() {
    let mut app = demo_app();
    app.hits = vec![MessageHit {
        top: 1,
        bottom: 5,
        index: 0,
    }];
    let at_first = |kind| MouseEvent {
        kind,
        column: 10,
        row: 2,
        modifiers: KeyModifiers::NONE,
    };

    for kind in [
        MouseEventKind::Moved,
        MouseEventKind::Down(MouseButton::Right),
        MouseEventKind::Up(MouseButton::Left),
        MouseEventKind::Drag(MouseButton::Left),
    ] {
        app.handle_mouse_event(at_first(kind));
        assert_eq!(selected_id(&app), 4, "{kind:?} changed the selection");
    }
    assert!(!app.composer.is_open());
    assert_eq!(app.focus, Focus::Messages);
}

#[test]
fn test_scroll_wheel_moves_selection() {
    let mut app = demo_app();
    let scroll = |kind| MouseEvent {
        kind,
        column: 0,
        row: 0,
        modifiers: KeyModifiers::NONE,
    };

    app.handle_mouse_event(scroll(MouseEventKind::ScrollUp));
    assert_eq!(selected_id(&app), 3);
    app.handle_mouse_event(scroll(MouseEventKind::ScrollDown));
    assert_eq!(selected_id(&app), 4);
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_draw_renders_messages_composer_and_status() {
    let app = demo_app();
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

    let mut hits = Vec::new();
    terminal
        .draw(|frame| hits = ui::draw(frame, &app))
        .unwrap();

    let screen = screen_text(&terminal);
    assert!(screen.contains("general > welcome"));
    assert!(screen.contains("Private Message : Alice, Bob, Me"));
    assert!(screen.contains("[p] New Private Message"));
    assert!(screen.contains("All messages"));

    assert_eq!(hits.len(), 4);
    assert_eq!(hits[0].top, 1);
    assert_eq!(hits[0].bottom, 5);
    assert_eq!(hits[1].top, 5);
}

#[test]
fn test_draw_open_composer_shows_fields() {
    let mut app = demo_app();
    app.handle_key_event(key(KeyCode::Char('k')));
    app.handle_key_event(key(KeyCode::Enter));
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

    terminal.draw(|frame| {
        ui::draw(frame, &app);
    })
    .unwrap();

    let screen = screen_text(&terminal);
    assert!(screen.contains("Stream: dev"));
    assert!(screen.contains("Topic: ratatui"));
    assert!(screen.contains("Alt+Enter/Ctrl+S: send"));
}
