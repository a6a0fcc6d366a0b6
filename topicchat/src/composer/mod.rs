//! Message composer: the draft state machine behind the input region.
//!
//! The composer is either closed or holds exactly one draft, private or
//! stream. Every compose trigger (new message, reply, reply-all, quote)
//! replaces the draft wholesale. Submitting hands a [`SendRequest`] to a
//! [`MessageSender`]:
//!
//! - on success only the body is cleared, so the next message goes to the
//!   same recipient or topic;
//! - on failure nothing is touched, so no typed text is lost;
//! - `Esc` closes the composer and discards the draft.
//!
//! Submission is split into [`Composer::begin_submit`] and
//! [`Composer::finish_submit`] so a host can run the send off the input
//! thread. [`Composer::begin_submit`] hands out a [`Submission`] with a
//! fresh id; only the completion carrying the current id touches the draft.
//! While a submission is pending, further submits are rejected.

pub mod field;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use topicchat_proto::request::{SendOutcome, SendRequest, ValidationError};

use crate::sender::MessageSender;

pub use field::TextField;

/// Draft state owned by the [`Composer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ComposerState {
    /// No draft open.
    #[default]
    Closed,
    /// A private message draft.
    PrivateDraft {
        /// Comma-separated recipient emails.
        recipient: TextField,
        /// Message text.
        body: TextField,
    },
    /// A stream message draft.
    StreamDraft {
        /// Stream name.
        stream: TextField,
        /// Topic.
        topic: TextField,
        /// Message text.
        body: TextField,
    },
}

/// Which kind of draft is open, without the field contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerMode {
    /// No draft open.
    Closed,
    /// Private message draft.
    PrivateDraft,
    /// Stream message draft.
    StreamDraft,
}

/// An editable field of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Private draft recipients.
    Recipient,
    /// Stream draft stream name.
    Stream,
    /// Stream draft topic.
    Topic,
    /// Message text (both draft kinds).
    Body,
}

impl DraftField {
    /// Caption shown in front of the field.
    #[must_use]
    pub const fn caption(self) -> &'static str {
        match self {
            Self::Recipient => "To: ",
            Self::Stream => "Stream: ",
            Self::Topic => "Topic: ",
            Self::Body => "> ",
        }
    }
}

/// Why a submit was not attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejection {
    /// No draft is open.
    #[error("no draft open")]
    Closed,
    /// An earlier submission has not completed yet.
    #[error("a message is already being sent")]
    Pending,
    /// The draft failed validation.
    #[error("{0}")]
    Invalid(#[from] ValidationError),
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The message was posted and the body cleared.
    Sent,
    /// The server rejected the message; the draft is unchanged.
    Failed(String),
    /// The submit was not attempted; the draft is unchanged.
    Rejected(SubmitRejection),
    /// A completion arrived for a submission the composer no longer tracks.
    Discarded,
}

/// A submission handed out by [`Composer::begin_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Identifies this submission to [`Composer::finish_submit`].
    pub id: u64,
    /// The request to send.
    pub request: SendRequest,
}

/// What a keypress did to the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerEvent {
    /// A submit was attempted.
    Submit(SubmitOutcome),
    /// The draft was discarded and the composer closed.
    Cancelled,
    /// A new empty draft was opened.
    Opened,
    /// Field text, cursor, or field focus changed.
    Edited,
    /// The key means nothing to the composer.
    Unhandled,
}

/// The message composer.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    state: ComposerState,
    focus: Option<DraftField>,
    pending: Option<u64>,
    next_submission: u64,
}

impl Composer {
    /// Create a closed composer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current draft state.
    #[must_use]
    pub const fn state(&self) -> &ComposerState {
        &self.state
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> ComposerMode {
        match self.state {
            ComposerState::Closed => ComposerMode::Closed,
            ComposerState::PrivateDraft { .. } => ComposerMode::PrivateDraft,
            ComposerState::StreamDraft { .. } => ComposerMode::StreamDraft,
        }
    }

    /// Returns `true` if a draft is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.state, ComposerState::Closed)
    }

    /// Returns `true` while a submission is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The field receiving text input, if a draft is open.
    #[must_use]
    pub const fn focus(&self) -> Option<DraftField> {
        self.focus
    }

    /// The fields of the open draft, in focus order.
    #[must_use]
    pub const fn fields(&self) -> &'static [DraftField] {
        match self.state {
            ComposerState::Closed => &[],
            ComposerState::PrivateDraft { .. } => &[DraftField::Recipient, DraftField::Body],
            ComposerState::StreamDraft { .. } => {
                &[DraftField::Stream, DraftField::Topic, DraftField::Body]
            }
        }
    }

    /// A field of the open draft.
    #[must_use]
    pub const fn field(&self, which: DraftField) -> Option<&TextField> {
        match (&self.state, which) {
            (ComposerState::PrivateDraft { recipient, .. }, DraftField::Recipient) => {
                Some(recipient)
            }
            (ComposerState::StreamDraft { stream, .. }, DraftField::Stream) => Some(stream),
            (ComposerState::StreamDraft { topic, .. }, DraftField::Topic) => Some(topic),
            (
                ComposerState::PrivateDraft { body, .. } | ComposerState::StreamDraft { body, .. },
                DraftField::Body,
            ) => Some(body),
            _ => None,
        }
    }

    /// Mutable access to a field of the open draft.
    pub fn field_mut(&mut self, which: DraftField) -> Option<&mut TextField> {
        match (&mut self.state, which) {
            (ComposerState::PrivateDraft { recipient, .. }, DraftField::Recipient) => {
                Some(recipient)
            }
            (ComposerState::StreamDraft { stream, .. }, DraftField::Stream) => Some(stream),
            (ComposerState::StreamDraft { topic, .. }, DraftField::Topic) => Some(topic),
            (
                ComposerState::PrivateDraft { body, .. } | ComposerState::StreamDraft { body, .. },
                DraftField::Body,
            ) => Some(body),
            _ => None,
        }
    }

    /// Text of a field, or `None` if the open draft has no such field.
    #[must_use]
    pub fn text(&self, which: DraftField) -> Option<&str> {
        self.field(which).map(TextField::text)
    }

    /// Open a private draft addressed to `seed_email`.
    pub fn open_private(&mut self, seed_email: impl Into<String>) {
        let recipient = TextField::new(seed_email);
        self.focus = Some(if recipient.is_empty() {
            DraftField::Recipient
        } else {
            DraftField::Body
        });
        tracing::debug!(to = recipient.text(), "composer: private draft opened");
        self.state = ComposerState::PrivateDraft {
            recipient,
            body: TextField::default(),
        };
        self.pending = None;
    }

    /// Open a stream draft for `seed_stream`, optionally under `seed_topic`.
    pub fn open_stream(&mut self, seed_stream: impl Into<String>, seed_topic: impl Into<String>) {
        let stream = TextField::new(seed_stream);
        let topic = TextField::new(seed_topic);
        self.focus = Some(if stream.is_empty() {
            DraftField::Stream
        } else if topic.is_empty() {
            DraftField::Topic
        } else {
            DraftField::Body
        });
        tracing::debug!(
            stream = stream.text(),
            topic = topic.text(),
            "composer: stream draft opened"
        );
        self.state = ComposerState::StreamDraft {
            stream,
            topic,
            body: TextField::default(),
        };
        self.pending = None;
    }

    /// Close the composer and discard the draft.
    pub fn cancel(&mut self) {
        if self.is_open() {
            tracing::debug!("composer: draft discarded");
        }
        self.state = ComposerState::Closed;
        self.focus = None;
        self.pending = None;
    }

    /// Build the request for the open draft without sending it.
    #[must_use]
    pub fn request(&self) -> Option<SendRequest> {
        match &self.state {
            ComposerState::Closed => None,
            ComposerState::PrivateDraft { recipient, body } => Some(SendRequest::Private {
                to: recipient.text().to_string(),
                content: body.text().to_string(),
            }),
            ComposerState::StreamDraft {
                stream,
                topic,
                body,
            } => Some(SendRequest::Stream {
                to: stream.text().to_string(),
                subject: topic.text().to_string(),
                content: body.text().to_string(),
            }),
        }
    }

    /// Start a submission: validate the draft and mark it pending.
    ///
    /// The returned id must be passed back to [`Composer::finish_submit`].
    ///
    /// # Errors
    ///
    /// Returns [`SubmitRejection`] if no draft is open, a submission is
    /// already pending, or the draft fails validation. The draft is left
    /// unchanged in every case.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitRejection> {
        if self.pending.is_some() {
            tracing::debug!("composer: submit ignored, previous submission pending");
            return Err(SubmitRejection::Pending);
        }
        let Some(request) = self.request() else {
            tracing::debug!("composer: submit ignored, no draft open");
            return Err(SubmitRejection::Closed);
        };
        request.validate()?;
        self.next_submission = self.next_submission.wrapping_add(1);
        let id = self.next_submission;
        self.pending = Some(id);
        tracing::debug!(id, "composer: submission started");
        Ok(Submission { id, request })
    }

    /// Complete submission `id` with the sender's outcome.
    ///
    /// Success clears the body and keeps the rest of the draft. Failure
    /// leaves the draft exactly as it was. A completion for any id other
    /// than the pending one is discarded without touching the draft.
    pub fn finish_submit(&mut self, id: u64, outcome: &SendOutcome) -> SubmitOutcome {
        if self.pending != Some(id) {
            tracing::debug!(id, "composer: completion for an untracked submission dropped");
            return SubmitOutcome::Discarded;
        }
        self.pending = None;
        match outcome {
            SendOutcome::Success => {
                if let Some(body) = self.field_mut(DraftField::Body) {
                    body.clear();
                }
                tracing::info!(mode = ?self.mode(), "message sent");
                SubmitOutcome::Sent
            }
            SendOutcome::Failure(reason) => {
                tracing::warn!(%reason, "message rejected, draft kept");
                SubmitOutcome::Failed(reason.clone())
            }
        }
    }

    /// Submit the open draft through `sender`, blocking until it answers.
    pub fn submit<S: MessageSender + ?Sized>(&mut self, sender: &S) -> SubmitOutcome {
        match self.begin_submit() {
            Ok(Submission { id, request }) => {
                let response = sender.send(&request);
                self.finish_submit(id, &response.outcome())
            }
            Err(rejection) => SubmitOutcome::Rejected(rejection),
        }
    }

    /// Handle a key event while the composer has input focus.
    ///
    /// `Alt+Enter` or `Ctrl+S` submits, `Esc` cancels, `Tab`/`Shift+Tab`
    /// move between fields. With no draft open, `p` starts a private
    /// message and `n` a new topic.
    pub fn handle_key_event<S: MessageSender + ?Sized>(
        &mut self,
        key: KeyEvent,
        sender: &S,
    ) -> ComposerEvent {
        if is_submit_key(key) {
            return ComposerEvent::Submit(self.submit(sender));
        }

        if !self.is_open() {
            return match key.code {
                KeyCode::Char('p') => {
                    self.open_private("");
                    ComposerEvent::Opened
                }
                KeyCode::Char('n') => {
                    self.open_stream("", "");
                    ComposerEvent::Opened
                }
                _ => ComposerEvent::Unhandled,
            };
        }

        match key.code {
            KeyCode::Esc => {
                self.cancel();
                return ComposerEvent::Cancelled;
            }
            KeyCode::Tab => self.cycle_focus(true),
            KeyCode::BackTab => self.cycle_focus(false),
            KeyCode::Enter if self.focus != Some(DraftField::Body) => self.cycle_focus(true),
            _ => return self.edit_focused(key),
        }
        ComposerEvent::Edited
    }

    /// Insert pasted text into the focused field.
    ///
    /// Header fields are single-line, so newlines there become spaces.
    pub fn paste(&mut self, text: &str) -> ComposerEvent {
        let Some(focus) = self.focus else {
            return ComposerEvent::Unhandled;
        };
        let Some(field) = self.field_mut(focus) else {
            return ComposerEvent::Unhandled;
        };
        if focus == DraftField::Body {
            field.insert_str(text);
        } else {
            field.insert_str(&text.replace(['\r', '\n'], " "));
        }
        ComposerEvent::Edited
    }

    /// Apply an editing key to the focused field.
    fn edit_focused(&mut self, key: KeyEvent) -> ComposerEvent {
        let Some(focus) = self.focus else {
            return ComposerEvent::Unhandled;
        };
        let Some(field) = self.field_mut(focus) else {
            return ComposerEvent::Unhandled;
        };
        match key.code {
            KeyCode::Enter => field.insert_char('\n'),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                field.insert_char(c);
            }
            KeyCode::Backspace => field.backspace(),
            KeyCode::Delete => field.delete(),
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Home => field.home(),
            KeyCode::End => field.end(),
            _ => return ComposerEvent::Unhandled,
        }
        ComposerEvent::Edited
    }

    /// Move focus to the next (or previous) field, wrapping around.
    fn cycle_focus(&mut self, forward: bool) {
        let fields = self.fields();
        if fields.is_empty() {
            return;
        }
        let current = self
            .focus
            .and_then(|f| fields.iter().position(|&x| x == f))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.focus = Some(fields[next]);
    }
}

/// Returns `true` for the submit chords (`Alt+Enter`, `Ctrl+S`).
#[must_use]
pub fn is_submit_key(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => key.modifiers.contains(KeyModifiers::ALT),
        KeyCode::Char('s') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
