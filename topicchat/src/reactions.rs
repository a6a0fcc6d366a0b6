//! Reaction aggregation.
//!
//! Collapses per-user [`Reaction`] records into per-emoji counts and renders
//! them as a one-line summary such as `"🙂 2 👍 1 tada 1"`. Unicode emoji
//! come first, then custom emoji, each group in first-seen order.

use indexmap::IndexMap;
use topicchat_proto::message::{Reaction, ReactionType};

/// Longest hex code point the 32-bit escape form can carry.
const CODE_POINT_WIDTH: usize = 8;

/// Errors that can occur when decoding a unicode emoji code point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReactionError {
    /// The code point string (or one of its `-` separated parts) is empty.
    #[error("empty emoji code point in {0:?}")]
    EmptyCodePoint(String),

    /// The code point contains non-hex characters.
    #[error("emoji code point {0:?} is not hexadecimal")]
    InvalidHex(String),

    /// The code point is longer than eight hex digits.
    #[error("emoji code point {0:?} is longer than 8 hex digits")]
    TooLong(String),

    /// The value is not a unicode scalar value (surrogate or out of range).
    #[error("emoji code point {0:?} is not a valid unicode scalar value")]
    InvalidScalar(String),
}

/// Per-emoji reaction counts, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionCounts {
    /// Unicode emoji counts keyed by hex code point string.
    pub unicode: IndexMap<String, usize>,
    /// Custom emoji counts keyed by symbolic name.
    pub custom: IndexMap<String, usize>,
}

impl ReactionCounts {
    /// Returns `true` if no reactions were counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unicode.is_empty() && self.custom.is_empty()
    }

    /// Total number of reactions across all emoji.
    #[must_use]
    pub fn total(&self) -> usize {
        self.unicode.values().chain(self.custom.values()).sum()
    }

    /// Render the counts as a display string.
    ///
    /// Each unicode entry contributes `"<glyph> <count> "`; custom entries
    /// contribute `"<name> <count>"` separated by single spaces.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReactionError`] hit while decoding a code point.
    pub fn render(&self) -> Result<String, ReactionError> {
        let mut out = String::new();
        for (code, count) in &self.unicode {
            out.push_str(&decode_emoji(code)?);
            out.push(' ');
            out.push_str(&count.to_string());
            out.push(' ');
        }
        let custom = self
            .custom
            .iter()
            .map(|(name, count)| format!("{name} {count}"))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&custom);
        Ok(out)
    }
}

/// Count reactions per emoji identity.
#[must_use]
pub fn aggregate(reactions: &[Reaction]) -> ReactionCounts {
    let mut counts = ReactionCounts::default();
    for reaction in reactions {
        let bucket = match reaction.reaction_type {
            ReactionType::UnicodeEmoji => &mut counts.unicode,
            ReactionType::CustomEmoji => &mut counts.custom,
        };
        *bucket.entry(reaction.code_or_name.clone()).or_insert(0) += 1;
    }
    counts
}

/// Decode a hex code point string into its emoji glyph.
///
/// Each part is left-padded with zeros to eight hex digits before it is
/// read as a 32-bit code point. Multi-codepoint emoji arrive as `-` joined
/// parts (`"1f468-200d-1f469"`) and decode to the full sequence.
///
/// # Errors
///
/// Returns a [`ReactionError`] describing the first malformed part.
pub fn decode_emoji(code: &str) -> Result<String, ReactionError> {
    code.split('-').map(|part| decode_code_point(code, part)).collect()
}

fn decode_code_point(code: &str, part: &str) -> Result<char, ReactionError> {
    if part.is_empty() {
        return Err(ReactionError::EmptyCodePoint(code.to_string()));
    }
    if !part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ReactionError::InvalidHex(part.to_string()));
    }
    if part.len() > CODE_POINT_WIDTH {
        return Err(ReactionError::TooLong(part.to_string()));
    }
    let padded = format!("{part:0>width$}", width = CODE_POINT_WIDTH);
    let value =
        u32::from_str_radix(&padded, 16).map_err(|_| ReactionError::InvalidHex(part.to_string()))?;
    char::from_u32(value).ok_or_else(|| ReactionError::InvalidScalar(part.to_string()))
}

/// Aggregate and render in one step.
///
/// # Errors
///
/// Returns a [`ReactionError`] if any unicode code point is malformed.
pub fn render_summary(reactions: &[Reaction]) -> Result<String, ReactionError> {
    aggregate(reactions).render()
}

/// Aggregate and render, degrading to an empty summary on decode errors.
///
/// A malformed code point is logged and yields an empty summary.
#[must_use]
pub fn summary_text(reactions: &[Reaction]) -> String {
    if reactions.is_empty() {
        return String::new();
    }
    match render_summary(reactions) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, count = reactions.len(), "dropping reaction summary");
            String::new()
        }
    }
}
