//! Application state and event handling.
//!
//! [`App`] is the host around the core components: it owns the message
//! list, the selection, the current [`Narrow`], and the [`Composer`], and
//! routes key and mouse events to whichever of the message list or the
//! composer has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use topicchat_proto::message::{Message, MessageKind, Reaction, Recipient};
use topicchat_proto::request::SendRequest;

use crate::composer::{Composer, ComposerEvent, SubmitOutcome};
use crate::presenter::{DEFAULT_TIMESTAMP_FORMAT, MessagePresenter, Navigation};
use crate::sender::MessageSender;

/// Which region receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The message list (default).
    Messages,
    /// The composer.
    Composer,
}

/// The current message filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Narrow {
    /// Every message.
    #[default]
    All,
    /// One stream, by id.
    Stream {
        /// Stream id.
        stream_id: u64,
        /// Stream name, for display.
        name: String,
    },
    /// One topic of one stream.
    Topic {
        /// Stream id.
        stream_id: u64,
        /// Stream name, for display.
        name: String,
        /// Topic.
        topic: String,
    },
    /// Private messages involving one user.
    User {
        /// The user's email.
        email: String,
    },
}

impl Narrow {
    /// Returns `true` if `message` passes this filter.
    #[must_use]
    pub fn matches(&self, message: &Message) -> bool {
        match (self, &message.kind) {
            (Self::All, _) => true,
            (Self::Stream { stream_id, .. }, MessageKind::Stream { stream_id: id, .. }) => {
                id == stream_id
            }
            (
                Self::Topic {
                    stream_id, topic, ..
                },
                MessageKind::Stream {
                    stream_id: id,
                    topic: t,
                    ..
                },
            ) => id == stream_id && t == topic,
            (Self::User { email }, MessageKind::Private { recipients }) => {
                message.sender_email == *email || recipients.iter().any(|r| r.email == *email)
            }
            _ => false,
        }
    }

    /// Short description for the status bar.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::All => "All messages".to_string(),
            Self::Stream { name, .. } => format!("#{name}"),
            Self::Topic { name, topic, .. } => format!("#{name} > {topic}"),
            Self::User { email } => format!("PMs with {email}"),
        }
    }
}

/// The host's [`Navigation`] implementation: a filter plus the message
/// that triggered the last change, so the selection can follow it.
#[derive(Debug, Default)]
pub struct ViewFilter {
    /// Current filter.
    pub narrow: Narrow,
    /// Message to keep selected after the filter changes.
    anchor: Option<u64>,
}

impl ViewFilter {
    fn set(&mut self, narrow: Narrow, message: &Message) {
        tracing::debug!(narrow = %narrow.describe(), message_id = message.id, "narrow changed");
        self.narrow = narrow;
        self.anchor = Some(message.id);
    }
}

impl Navigation for ViewFilter {
    fn narrow_to_user(&mut self, message: &Message) {
        self.set(
            Narrow::User {
                email: message.sender_email.clone(),
            },
            message,
        );
    }

    fn narrow_to_stream(&mut self, message: &Message) {
        if let MessageKind::Stream {
            stream_display_name,
            stream_id,
            ..
        } = &message.kind
        {
            self.set(
                Narrow::Stream {
                    stream_id: *stream_id,
                    name: stream_display_name.clone(),
                },
                message,
            );
        }
    }

    fn narrow_to_topic(&mut self, message: &Message) {
        if let MessageKind::Stream {
            stream_display_name,
            stream_id,
            topic,
        } = &message.kind
        {
            self.set(
                Narrow::Topic {
                    stream_id: *stream_id,
                    name: stream_display_name.clone(),
                    topic: topic.clone(),
                },
                message,
            );
        }
    }

    fn show_all_messages(&mut self, message: &Message) {
        self.set(Narrow::All, message);
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    /// Display name, used for echoed messages.
    pub full_name: String,
    /// Email, excluded from reply-all recipient lists.
    pub email: String,
}

/// A line of feedback for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Text to show.
    pub text: String,
    /// Whether it reports a failure.
    pub is_error: bool,
}

/// Row range of one rendered message, recorded by the UI for mouse hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHit {
    /// First screen row (inclusive).
    pub top: u16,
    /// Last screen row (exclusive).
    pub bottom: u16,
    /// Index into the visible message list.
    pub index: usize,
}

/// Main application state.
pub struct App<S: MessageSender> {
    /// All loaded messages, oldest first.
    pub messages: Vec<Message>,
    /// Selected index into [`visible_messages`](Self::visible_messages).
    pub selected: usize,
    /// Current filter.
    pub view: ViewFilter,
    /// Which region has input focus.
    pub focus: Focus,
    /// The composer.
    pub composer: Composer,
    /// Submission service.
    pub sender: S,
    /// The signed-in user.
    pub viewer: Viewer,
    /// chrono format for message timestamps.
    pub timestamp_format: String,
    /// Latest feedback line.
    pub status: Option<StatusLine>,
    /// Screen rows of the messages drawn last frame.
    pub hits: Vec<MessageHit>,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl<S: MessageSender> App<S> {
    /// Create an application with no messages.
    pub fn new(sender: S, viewer: Viewer) -> Self {
        Self {
            messages: Vec::new(),
            selected: 0,
            view: ViewFilter::default(),
            focus: Focus::Messages,
            composer: Composer::new(),
            sender,
            viewer,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            status: None,
            hits: Vec::new(),
            should_quit: false,
        }
    }

    /// Use a chrono format string for message timestamps.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Replace the message list and select the newest message.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self.select_last();
        self
    }

    /// Messages passing the current filter.
    #[must_use]
    pub fn visible_messages(&self) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| self.view.narrow.matches(m))
            .collect()
    }

    /// The selected message, if any is visible.
    #[must_use]
    pub fn selected_message(&self) -> Option<&Message> {
        self.visible_messages().get(self.selected).copied()
    }

    /// A presenter for `message` as seen by the viewer.
    #[must_use]
    pub fn presenter<'a>(&'a self, message: &'a Message) -> MessagePresenter<'a> {
        MessagePresenter::new(message, &self.viewer.email)
            .with_timestamp_format(&self.timestamp_format)
    }

    /// Set the status line.
    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error,
        });
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Composer => self.handle_composer_key(key),
            Focus::Messages => self.handle_messages_key(key),
        }
    }

    /// Handle pasted text; only the composer accepts it.
    pub fn handle_paste(&mut self, text: &str) {
        if self.focus == Focus::Composer {
            self.composer.paste(text);
        }
    }

    /// Handle a mouse event.
    ///
    /// The wheel moves the selection; a left click selects the message under
    /// the pointer and hands the click to its presenter. Anything else,
    /// including plain pointer motion, is ignored.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.select_prev(),
            MouseEventKind::ScrollDown => self.select_next(),
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(hit) = self
                    .hits
                    .iter()
                    .find(|h| (h.top..h.bottom).contains(&mouse.row))
                    .copied()
                else {
                    return;
                };
                self.selected = hit.index;
                self.dispatch_to_selected(|presenter, view, composer| {
                    presenter.handle_mouse_event(mouse, view, composer)
                });
            }
            _ => {}
        }
    }

    /// Key handling while the composer is focused.
    fn handle_composer_key(&mut self, key: KeyEvent) {
        match self.composer.handle_key_event(key, &self.sender) {
            ComposerEvent::Submit(outcome) => self.report_submit(outcome),
            ComposerEvent::Cancelled => self.focus = Focus::Messages,
            ComposerEvent::Unhandled if matches!(key.code, KeyCode::Esc | KeyCode::Tab) => {
                self.focus = Focus::Messages;
            }
            ComposerEvent::Opened | ComposerEvent::Edited | ComposerEvent::Unhandled => {}
        }
    }

    /// Key handling while the message list is focused.
    fn handle_messages_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Tab if self.composer.is_open() => self.focus = Focus::Composer,
            KeyCode::Char('p') if key.modifiers.is_empty() => {
                self.composer.open_private("");
                self.focus = Focus::Composer;
            }
            KeyCode::Char('n') if key.modifiers.is_empty() => {
                self.composer.open_stream("", "");
                self.focus = Focus::Composer;
            }
            _ => {
                self.dispatch_to_selected(|presenter, view, composer| {
                    presenter.handle_key_event(key, view, composer)
                });
            }
        }
    }

    /// Run a presenter call on the selected message, then follow up on
    /// whatever it changed (composer opened, narrow changed).
    fn dispatch_to_selected<F>(&mut self, f: F)
    where
        F: FnOnce(&MessagePresenter<'_>, &mut ViewFilter, &mut Composer) -> bool,
    {
        let Some(index) = self
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| self.view.narrow.matches(m))
            .nth(self.selected)
            .map(|(i, _)| i)
        else {
            return;
        };

        let presenter = MessagePresenter::new(&self.messages[index], &self.viewer.email)
            .with_timestamp_format(&self.timestamp_format);
        if !f(&presenter, &mut self.view, &mut self.composer) {
            return;
        }

        // Navigation leaves an anchor behind; compose actions do not.
        if let Some(anchor) = self.view.anchor.take() {
            let visible = self.visible_messages();
            self.selected = visible
                .iter()
                .position(|m| m.id == anchor)
                .unwrap_or_else(|| visible.len().saturating_sub(1));
        } else if self.composer.is_open() {
            self.focus = Focus::Composer;
        }
    }

    fn report_submit(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Sent => self.set_status("Message sent", false),
            SubmitOutcome::Failed(reason) => {
                self.set_status(format!("Send failed: {reason}"), true);
            }
            SubmitOutcome::Rejected(rejection) => self.set_status(rejection.to_string(), true),
            SubmitOutcome::Discarded => {}
        }
    }

    /// Append a message, keeping the selection on the newest one if it was
    /// already there.
    pub fn push_message(&mut self, message: Message) {
        let follow = self.selected + 1 >= self.visible_messages().len();
        self.messages.push(message);
        if follow {
            self.select_last();
        }
    }

    /// Append a message built from a request the server accepted.
    pub fn echo_sent(&mut self, request: SendRequest, timestamp: i64) {
        let id = self.messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let kind = match request {
            SendRequest::Stream { ref to, ref subject, .. } => MessageKind::Stream {
                stream_id: self.stream_id_for(to),
                stream_display_name: to.clone(),
                topic: subject.clone(),
            },
            SendRequest::Private { ref to, .. } => {
                let mut recipients: Vec<Recipient> = to
                    .split(',')
                    .map(str::trim)
                    .filter(|email| !email.is_empty())
                    .map(|email| Recipient::new(self.name_for(email), email))
                    .collect();
                if !recipients.iter().any(|r| r.email == self.viewer.email) {
                    recipients.push(Recipient::new(
                        self.viewer.full_name.as_str(),
                        self.viewer.email.as_str(),
                    ));
                }
                MessageKind::Private { recipients }
            }
        };
        self.push_message(Message {
            id,
            kind,
            sender_name: self.viewer.full_name.clone(),
            sender_email: self.viewer.email.clone(),
            sender_id: 0,
            content: request.content().to_string(),
            timestamp,
            reactions: Vec::new(),
        });
    }

    /// Id of a known stream by name, or a fresh one.
    fn stream_id_for(&self, name: &str) -> u64 {
        let mut max = 0;
        for message in &self.messages {
            if let MessageKind::Stream {
                stream_display_name,
                stream_id,
                ..
            } = &message.kind
            {
                if stream_display_name == name {
                    return *stream_id;
                }
                max = max.max(*stream_id);
            }
        }
        max + 1
    }

    /// Best known display name for an email.
    fn name_for(&self, email: &str) -> String {
        self.messages
            .iter()
            .find_map(|m| {
                if m.sender_email == email {
                    return Some(m.sender_name.clone());
                }
                m.recipients()
                    .iter()
                    .find(|r| r.email == email)
                    .map(|r| r.full_name.clone())
            })
            .unwrap_or_else(|| email.to_string())
    }

    const fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.visible_messages().len() {
            self.selected += 1;
        }
    }

    fn select_last(&mut self) {
        self.selected = self.visible_messages().len().saturating_sub(1);
    }
}

/// Sample conversation for offline use.
#[must_use]
pub fn demo_messages(viewer: &Viewer) -> Vec<Message> {
    let me = Recipient::new(viewer.full_name.as_str(), viewer.email.as_str());
    let stream = |stream_id, name: &str, topic: &str| MessageKind::Stream {
        stream_display_name: name.to_string(),
        stream_id,
        topic: topic.to_string(),
    };
    vec![
        Message {
            id: 1,
            kind: stream(1, "general", "welcome"),
            sender_name: "Alice".to_string(),
            sender_email: "alice@example.com".to_string(),
            sender_id: 2,
            content: "Welcome to the terminal client!".to_string(),
            timestamp: 1_700_000_000,
            reactions: vec![
                Reaction::unicode("1f44b"),
                Reaction::unicode("1f44b"),
                Reaction::custom("tada"),
            ],
        },
        Message {
            id: 2,
            kind: stream(1, "general", "welcome"),
            sender_name: "Bob".to_string(),
            sender_email: "bob@example.com".to_string(),
            sender_id: 3,
            content: "Press Enter on a message to reply,\nR to reply privately to its author."
                .to_string(),
            timestamp: 1_700_000_060,
            reactions: vec![Reaction::unicode("1f642")],
        },
        Message {
            id: 3,
            kind: stream(2, "dev", "ratatui"),
            sender_name: "Alice".to_string(),
            sender_email: "alice@example.com".to_string(),
            sender_id: 2,
            content: "S narrows to this stream, s to this topic, Esc shows everything."
                .to_string(),
            timestamp: 1_700_000_120,
            reactions: Vec::new(),
        },
        Message {
            id: 4,
            kind: MessageKind::Private {
                recipients: vec![
                    Recipient::new("Alice", "alice@example.com"),
                    Recipient::new("Bob", "bob@example.com"),
                    me,
                ],
            },
            sender_name: "Bob".to_string(),
            sender_email: "bob@example.com".to_string(),
            sender_id: 3,
            content: "Lunch at noon?".to_string(),
            timestamp: 1_700_000_180,
            reactions: vec![Reaction::unicode("1f355"), Reaction::custom("yum")],
        },
    ]
}
