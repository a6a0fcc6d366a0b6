//! Message presentation and per-message key dispatch.
//!
//! [`MessagePresenter`] turns one [`Message`] into render instructions
//! (spans tagged with a semantic [`Role`], no colors) and maps keypresses on
//! that message to [`MessageAction`]s. Compose actions open the
//! [`Composer`] directly; everything else goes to the host's
//! [`Navigation`] implementation. The presenter keeps no state of its own.

use chrono::{Local, LocalResult, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use topicchat_proto::message::{Message, MessageKind};

use crate::composer::{Composer, DraftField};
use crate::reactions;

/// ctime-style timestamp, e.g. `Tue Nov 14 22:13:20 2023`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// View filtering operations provided by the host application.
pub trait Navigation {
    /// Show only messages exchanged with the message's sender.
    fn narrow_to_user(&mut self, message: &Message);
    /// Show only messages in the message's stream.
    fn narrow_to_stream(&mut self, message: &Message);
    /// Show only messages in the message's stream and topic.
    fn narrow_to_topic(&mut self, message: &Message);
    /// Drop any filter and show every message.
    fn show_all_messages(&mut self, message: &Message);
}

/// Semantic role of a rendered span; the rendering backend picks the style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Fixed header text ("Private Message").
    Header,
    /// Separator between header parts (`>` or `:`).
    HeaderSeparator,
    /// Stream, topic, and recipient names in the header.
    Custom,
    /// The right-aligned message time.
    Timestamp,
    /// The sender's name above the content.
    SenderName,
    /// Message text.
    Content,
    /// Reaction summary line.
    Reactions,
}

/// A run of text with a semantic role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// The text.
    pub text: String,
    /// How it should be styled.
    pub role: Role,
}

impl StyledSpan {
    /// Create a span.
    pub fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

/// Header region: left-aligned title plus right-aligned timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Title spans.
    pub title: Vec<StyledSpan>,
    /// Formatted message time.
    pub timestamp: StyledSpan,
}

/// Render instructions for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Header region.
    pub header: Header,
    /// Body lines: the sender's name, then the content.
    pub body: Vec<Vec<StyledSpan>>,
    /// Reaction summary, absent when there is nothing to show.
    pub reactions: Option<StyledSpan>,
}

impl RenderedMessage {
    /// The header title as plain text.
    #[must_use]
    pub fn title_text(&self) -> String {
        self.header.title.iter().map(|s| s.text.as_str()).collect()
    }

    /// Number of terminal rows the message occupies.
    #[must_use]
    pub fn height(&self) -> usize {
        1 + self.body.len() + usize::from(self.reactions.is_some())
    }
}

/// A contextual action triggered on a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageAction {
    /// Open a stream draft.
    ComposeStream {
        /// Stream to post to.
        stream: String,
        /// Topic, possibly empty.
        topic: String,
    },
    /// Open a private draft.
    ComposePrivate {
        /// Comma-separated recipient emails.
        recipients: String,
    },
    /// Reply in the same conversation with the message quoted in the body.
    QuoteReply,
    /// Narrow to the message's stream.
    NarrowToStream,
    /// Narrow to the message's topic.
    NarrowToTopic,
    /// Narrow to the message's sender.
    NarrowToUser,
    /// Return to the unfiltered view.
    ShowAll,
}

/// Presents one message for a given viewer.
#[derive(Debug, Clone, Copy)]
pub struct MessagePresenter<'a> {
    message: &'a Message,
    own_email: &'a str,
    timestamp_format: &'a str,
}

impl<'a> MessagePresenter<'a> {
    /// Create a presenter for `message` as seen by the user `own_email`.
    #[must_use]
    pub const fn new(message: &'a Message, own_email: &'a str) -> Self {
        Self {
            message,
            own_email,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT,
        }
    }

    /// Use a chrono format string for the header timestamp.
    #[must_use]
    pub const fn with_timestamp_format(mut self, format: &'a str) -> Self {
        self.timestamp_format = format;
        self
    }

    /// The presented message.
    #[must_use]
    pub const fn message(&self) -> &'a Message {
        self.message
    }

    /// Produce header, body, and reaction regions.
    #[must_use]
    pub fn render(&self) -> RenderedMessage {
        RenderedMessage {
            header: self.header(),
            body: self.body(),
            reactions: self.reaction_summary(),
        }
    }

    /// Header region for the message kind.
    #[must_use]
    pub fn header(&self) -> Header {
        let title = match &self.message.kind {
            MessageKind::Stream {
                stream_display_name,
                topic,
                ..
            } => vec![
                StyledSpan::new(stream_display_name.as_str(), Role::Custom),
                StyledSpan::new(" > ", Role::HeaderSeparator),
                StyledSpan::new(topic.as_str(), Role::Custom),
            ],
            MessageKind::Private { recipients } => {
                // Display lists everyone, the viewer included.
                let names = recipients
                    .iter()
                    .map(|r| r.full_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    StyledSpan::new("Private Message", Role::Header),
                    StyledSpan::new(" : ", Role::HeaderSeparator),
                    StyledSpan::new(names, Role::Custom),
                ]
            }
        };
        Header {
            title,
            timestamp: StyledSpan::new(
                format_timestamp(self.message.timestamp, self.timestamp_format),
                Role::Timestamp,
            ),
        }
    }

    /// Body region: sender name line, then content lines.
    ///
    /// Every newline starts a line, so empty content still takes one row and
    /// trailing blank lines are kept.
    #[must_use]
    pub fn body(&self) -> Vec<Vec<StyledSpan>> {
        let mut lines = vec![vec![StyledSpan::new(
            self.message.sender_name.as_str(),
            Role::SenderName,
        )]];
        lines.extend(self.message.content.split('\n').map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            vec![StyledSpan::new(line, Role::Content)]
        }));
        lines
    }

    /// Reaction summary region, `None` when empty.
    #[must_use]
    pub fn reaction_summary(&self) -> Option<StyledSpan> {
        let text = reactions::summary_text(&self.message.reactions);
        (!text.is_empty()).then(|| StyledSpan::new(text, Role::Reactions))
    }

    /// Recipient emails for reply-all, without the viewer's own address.
    #[must_use]
    pub fn reply_all_recipients(&self) -> String {
        self.message
            .recipients()
            .iter()
            .filter(|r| r.email != self.own_email)
            .map(|r| r.email.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Body text for a quote-reply.
    #[must_use]
    pub fn quoted_body(&self) -> String {
        let mut quoted = format!("@_**{}** said:\n```quote\n", self.message.sender_name);
        quoted.push_str(&self.message.content);
        if !self.message.content.ends_with('\n') {
            quoted.push('\n');
        }
        quoted.push_str("```\n");
        quoted
    }

    /// The reply action (Enter, mouse click).
    #[must_use]
    pub fn reply_action(&self) -> MessageAction {
        match &self.message.kind {
            MessageKind::Stream {
                stream_display_name,
                topic,
                ..
            } => MessageAction::ComposeStream {
                stream: stream_display_name.clone(),
                topic: topic.clone(),
            },
            MessageKind::Private { .. } => MessageAction::ComposePrivate {
                recipients: self.reply_all_recipients(),
            },
        }
    }

    /// Map a keypress to an action, if the key means anything here.
    #[must_use]
    pub fn action_for_key(&self, key: KeyEvent) -> Option<MessageAction> {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        let is_stream = self.message.is_stream();
        let action = match key.code {
            KeyCode::Enter => self.reply_action(),
            KeyCode::Char('c') => match &self.message.kind {
                MessageKind::Stream {
                    stream_display_name,
                    ..
                } => MessageAction::ComposeStream {
                    stream: stream_display_name.clone(),
                    topic: String::new(),
                },
                MessageKind::Private { .. } => MessageAction::ComposePrivate {
                    recipients: self.reply_all_recipients(),
                },
            },
            KeyCode::Char('R') => MessageAction::ComposePrivate {
                recipients: self.message.sender_email.clone(),
            },
            KeyCode::Char('>') => MessageAction::QuoteReply,
            KeyCode::Char('S') if is_stream => MessageAction::NarrowToStream,
            KeyCode::Char('s') if is_stream => MessageAction::NarrowToTopic,
            KeyCode::Char('S' | 's') => MessageAction::NarrowToUser,
            KeyCode::Esc => MessageAction::ShowAll,
            _ => return None,
        };
        Some(action)
    }

    /// Map a mouse event to an action; a left press acts like Enter.
    #[must_use]
    pub fn action_for_mouse(&self, mouse: MouseEvent) -> Option<MessageAction> {
        matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)).then(|| self.reply_action())
    }

    /// Carry out `action` against the host and the composer.
    pub fn apply<N: Navigation + ?Sized>(
        &self,
        action: MessageAction,
        nav: &mut N,
        composer: &mut Composer,
    ) {
        tracing::debug!(message_id = self.message.id, ?action, "message action");
        match action {
            MessageAction::ComposeStream { stream, topic } => composer.open_stream(stream, topic),
            MessageAction::ComposePrivate { recipients } => composer.open_private(recipients),
            MessageAction::QuoteReply => {
                self.apply(self.reply_action(), nav, composer);
                if let Some(body) = composer.field_mut(DraftField::Body) {
                    body.set_text(self.quoted_body());
                }
            }
            MessageAction::NarrowToStream => nav.narrow_to_stream(self.message),
            MessageAction::NarrowToTopic => nav.narrow_to_topic(self.message),
            MessageAction::NarrowToUser => nav.narrow_to_user(self.message),
            MessageAction::ShowAll => nav.show_all_messages(self.message),
        }
    }

    /// Handle a keypress on this message. Returns `false` if unmapped.
    pub fn handle_key_event<N: Navigation + ?Sized>(
        &self,
        key: KeyEvent,
        nav: &mut N,
        composer: &mut Composer,
    ) -> bool {
        self.action_for_key(key)
            .map(|action| self.apply(action, nav, composer))
            .is_some()
    }

    /// Handle a mouse event on this message. Returns `false` if unmapped.
    pub fn handle_mouse_event<N: Navigation + ?Sized>(
        &self,
        mouse: MouseEvent,
        nav: &mut N,
        composer: &mut Composer,
    ) -> bool {
        self.action_for_mouse(mouse)
            .map(|action| self.apply(action, nav, composer))
            .is_some()
    }
}

/// Format epoch seconds in local time with a chrono format string.
#[must_use]
pub fn format_timestamp(secs: i64, format: &str) -> String {
    match Local.timestamp_opt(secs, 0) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.format(format).to_string(),
        LocalResult::None => "??".to_string(),
    }
}
