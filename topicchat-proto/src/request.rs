//! Message submission request and response shapes.
//!
//! These are the only externally visible schema owned by the client core:
//! a [`SendRequest`] goes out, a [`SendResponse`] comes back, and callers
//! only ever look at its success/error tag via [`SendResponse::outcome`].

use serde::{Deserialize, Serialize};

/// Maximum allowed message content size in bytes (64 KB).
pub const MAX_CONTENT_SIZE: usize = 64 * 1024;

/// A request to post a new message.
///
/// Serializes as `{"type": "stream", "to", "subject", "content"}` or
/// `{"type": "private", "to", "content"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SendRequest {
    /// Post to a stream under a topic.
    Stream {
        /// Stream name.
        to: String,
        /// Topic.
        subject: String,
        /// Message text.
        content: String,
    },
    /// Send a private message.
    Private {
        /// Comma-separated recipient emails.
        to: String,
        /// Message text.
        content: String,
    },
}

/// Error returned when a request fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Message content is empty or whitespace.
    #[error("message content is empty")]
    EmptyContent,
    /// No stream or recipient given.
    #[error("no recipient given")]
    EmptyRecipient,
    /// Message content exceeds the maximum allowed size.
    #[error("message too large ({size} bytes, max {max} bytes)")]
    TooLarge {
        /// Actual size of the content in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },
}

impl SendRequest {
    /// The `to` field (stream name or recipient list).
    #[must_use]
    pub fn to(&self) -> &str {
        match self {
            Self::Stream { to, .. } | Self::Private { to, .. } => to,
        }
    }

    /// The message text.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Stream { content, .. } | Self::Private { content, .. } => content,
        }
    }

    /// Validates this request before it is handed to a sender.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRecipient`] if `to` is blank,
    /// [`ValidationError::EmptyContent`] if the content is blank, or
    /// [`ValidationError::TooLarge`] if it exceeds [`MAX_CONTENT_SIZE`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.to().trim().is_empty() {
            return Err(ValidationError::EmptyRecipient);
        }
        let content = self.content();
        if content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if content.len() > MAX_CONTENT_SIZE {
            return Err(ValidationError::TooLarge {
                size: content.len(),
                max: MAX_CONTENT_SIZE,
            });
        }
        Ok(())
    }
}

/// The `result` tag of a server response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultTag {
    /// The request was accepted.
    Success,
    /// The request was rejected.
    Error,
}

/// Response to a [`SendRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    /// Success/error tag.
    pub result: ResultTag,
    /// Human-readable reason, usually only present on error.
    #[serde(default)]
    pub msg: String,
    /// Id of the created message, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl SendResponse {
    /// A success response for a newly created message.
    #[must_use]
    pub const fn success(id: u64) -> Self {
        Self {
            result: ResultTag::Success,
            msg: String::new(),
            id: Some(id),
        }
    }

    /// An error response carrying a reason.
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            result: ResultTag::Error,
            msg: msg.into(),
            id: None,
        }
    }

    /// Collapse the response to its success/failure outcome.
    #[must_use]
    pub fn outcome(&self) -> SendOutcome {
        match self.result {
            ResultTag::Success => SendOutcome::Success,
            ResultTag::Error => SendOutcome::Failure(self.msg.clone()),
        }
    }
}

/// Tagged submission outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was posted.
    Success,
    /// The message was not posted, with the server's reason.
    Failure(String),
}

impl SendOutcome {
    /// Returns `true` if the message was posted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
