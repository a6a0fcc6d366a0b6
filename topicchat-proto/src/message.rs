//! Chat message records as delivered by the server.
//!
//! A [`Message`] is immutable once decoded: the client renders it and
//! dispatches keypresses against it but never mutates it. Decoding goes
//! through [`RawMessage`], which mirrors the server's JSON shape, and is
//! then checked for a consistent stream/private layout.

use serde::{Deserialize, Serialize};

/// Errors that can occur when decoding message records.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The input was not valid JSON for a message record.
    #[error("malformed message json: {0}")]
    Json(#[from] serde_json::Error),

    /// A stream message is missing a field that every stream message carries.
    #[error("stream message {id} is missing `{field}`")]
    MissingStreamField {
        /// Server-side message id.
        id: u64,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The `display_recipient` field does not match the message type.
    #[error("message {id} has a {kind} type but a mismatched display_recipient")]
    RecipientMismatch {
        /// Server-side message id.
        id: u64,
        /// The declared message type.
        kind: &'static str,
    },
}

/// One participant of a private conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Display name.
    pub full_name: String,
    /// Account email, used for addressing replies.
    pub email: String,
}

impl Recipient {
    /// Create a recipient from a display name and an email.
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
        }
    }
}

/// Where a message was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// A message posted to a stream under a topic.
    Stream {
        /// Stream name as shown to users.
        stream_display_name: String,
        /// Server-side stream id.
        stream_id: u64,
        /// Topic (the server calls it `subject`).
        topic: String,
    },
    /// A private message between the listed participants.
    Private {
        /// All participants, in server order.
        recipients: Vec<Recipient>,
    },
}

/// Which emoji namespace a reaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionType {
    /// A standard unicode emoji identified by its code point(s).
    UnicodeEmoji,
    /// A server-defined emoji identified by its name.
    CustomEmoji,
}

/// A single user's emoji reaction on a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reaction {
    /// Emoji namespace.
    pub reaction_type: ReactionType,
    /// Hex code point string for unicode emoji, symbolic name otherwise.
    pub code_or_name: String,
    /// The reacting user, when known.
    pub user_id: Option<u64>,
}

impl Reaction {
    /// A unicode emoji reaction from a hex code point string (e.g. `"1f642"`).
    pub fn unicode(code: impl Into<String>) -> Self {
        Self {
            reaction_type: ReactionType::UnicodeEmoji,
            code_or_name: code.into(),
            user_id: None,
        }
    }

    /// A custom emoji reaction from its symbolic name (e.g. `"tada"`).
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            reaction_type: ReactionType::CustomEmoji,
            code_or_name: name.into(),
            user_id: None,
        }
    }
}

/// A chat message ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Server-side message id.
    pub id: u64,
    /// Stream or private, with the kind-specific fields.
    pub kind: MessageKind,
    /// Sender's full name.
    pub sender_name: String,
    /// Sender's email.
    pub sender_email: String,
    /// Sender's user id.
    pub sender_id: u64,
    /// Raw message text.
    pub content: String,
    /// Seconds since the UNIX epoch.
    pub timestamp: i64,
    /// Per-user reactions, in server order.
    pub reactions: Vec<Reaction>,
}

impl Message {
    /// Returns `true` for stream messages.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self.kind, MessageKind::Stream { .. })
    }

    /// The stream name, for stream messages.
    #[must_use]
    pub fn stream_name(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Stream {
                stream_display_name,
                ..
            } => Some(stream_display_name),
            MessageKind::Private { .. } => None,
        }
    }

    /// The topic, for stream messages.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Stream { topic, .. } => Some(topic),
            MessageKind::Private { .. } => None,
        }
    }

    /// The participants, for private messages (empty for stream messages).
    #[must_use]
    pub fn recipients(&self) -> &[Recipient] {
        match &self.kind {
            MessageKind::Private { recipients } => recipients,
            MessageKind::Stream { .. } => &[],
        }
    }

    /// Decode a single message record from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError`] if the JSON is malformed or the record's
    /// recipient fields do not match its declared type.
    pub fn from_json(json: &str) -> Result<Self, MessageError> {
        let raw: RawMessage = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Decode a list of message records from JSON.
    ///
    /// Accepts either a bare array or a `{"messages": [...]}` response body.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError`] for the first record that fails to decode.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, MessageError> {
        let list: RawMessageList = serde_json::from_str(json)?;
        let raw = match list {
            RawMessageList::Bare(messages) | RawMessageList::Wrapped { messages } => messages,
        };
        raw.into_iter().map(Self::try_from).collect()
    }
}

// ---------------------------------------------------------------------------
// Server JSON shape
// ---------------------------------------------------------------------------

/// Message record exactly as the server encodes it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    id: u64,
    #[serde(rename = "type")]
    kind: RawKind,
    sender_full_name: String,
    sender_email: String,
    sender_id: u64,
    content: String,
    timestamp: i64,
    display_recipient: RawDisplayRecipient,
    #[serde(default)]
    stream_id: Option<u64>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    reactions: Vec<RawReaction>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Stream,
    Private,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawDisplayRecipient {
    Stream(String),
    Private(Vec<Recipient>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawMessageList {
    Bare(Vec<RawMessage>),
    Wrapped { messages: Vec<RawMessage> },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawReactionType {
    UnicodeEmoji,
    RealmEmoji,
    ZulipExtraEmoji,
}

#[derive(Debug, Clone, Deserialize)]
struct RawReaction {
    reaction_type: RawReactionType,
    emoji_code: String,
    emoji_name: String,
    #[serde(default)]
    user_id: Option<u64>,
}

impl From<RawReaction> for Reaction {
    fn from(raw: RawReaction) -> Self {
        // Unicode reactions are identified by code point, everything else by name.
        let (reaction_type, code_or_name) = match raw.reaction_type {
            RawReactionType::UnicodeEmoji => (ReactionType::UnicodeEmoji, raw.emoji_code),
            RawReactionType::RealmEmoji | RawReactionType::ZulipExtraEmoji => {
                (ReactionType::CustomEmoji, raw.emoji_name)
            }
        };
        Self {
            reaction_type,
            code_or_name,
            user_id: raw.user_id,
        }
    }
}

impl TryFrom<RawMessage> for Message {
    type Error = MessageError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        let id = raw.id;
        let kind = match (raw.kind, raw.display_recipient) {
            (RawKind::Stream, RawDisplayRecipient::Stream(name)) => MessageKind::Stream {
                stream_display_name: name,
                stream_id: raw.stream_id.ok_or(MessageError::MissingStreamField {
                    id,
                    field: "stream_id",
                })?,
                topic: raw.subject.ok_or(MessageError::MissingStreamField {
                    id,
                    field: "subject",
                })?,
            },
            (RawKind::Private, RawDisplayRecipient::Private(recipients)) => {
                MessageKind::Private { recipients }
            }
            (RawKind::Stream, RawDisplayRecipient::Private(_)) => {
                return Err(MessageError::RecipientMismatch { id, kind: "stream" });
            }
            (RawKind::Private, RawDisplayRecipient::Stream(_)) => {
                return Err(MessageError::RecipientMismatch {
                    id,
                    kind: "private",
                });
            }
        };

        Ok(Self {
            id,
            kind,
            sender_name: raw.sender_full_name,
            sender_email: raw.sender_email,
            sender_id: raw.sender_id,
            content: raw.content,
            timestamp: raw.timestamp,
            reactions: raw.reactions.into_iter().map(Reaction::from).collect(),
        })
    }
}
