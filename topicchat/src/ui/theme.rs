//! Theme and styling for the TUI.
//!
//! Rendered messages carry semantic [`Role`]s instead of styles; the
//! [`Theme`] decides what each role looks like.

use ratatui::style::{Color, Modifier, Style};

use crate::presenter::{Role, StyledSpan};

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success indicator color.
pub const SUCCESS: Color = Color::Green;

/// Error indicator color.
pub const ERROR: Color = Color::Red;

/// Background of message headers.
pub const HEADER_BG: Color = Color::Rgb(30, 30, 50);

/// Color for sender names in chat.
pub const SENDER_COLORS: [Color; 12] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::LightCyan,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightRed,
    Color::Rgb(255, 165, 0),
    Color::Rgb(180, 120, 255),
];

/// Styles per semantic role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Fixed header text.
    pub header: Style,
    /// Header separators.
    pub header_separator: Style,
    /// Stream, topic, and recipient names.
    pub custom: Style,
    /// Header timestamp.
    pub timestamp: Style,
    /// Sender name; the foreground is replaced per sender.
    pub sender_name: Style,
    /// Message text.
    pub content: Style,
    /// Reaction summary.
    pub reactions: Style,
    /// Highlight for the selected message's header.
    pub selected: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let header_bg = Style::default().bg(HEADER_BG);
        Self {
            header: header_bg.fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
            header_separator: header_bg.fg(HIGHLIGHT).add_modifier(Modifier::BOLD),
            custom: header_bg.fg(Color::LightBlue),
            timestamp: header_bg.fg(Color::Rgb(120, 120, 120)),
            sender_name: Style::default().add_modifier(Modifier::BOLD),
            content: normal(),
            reactions: dimmed(),
            selected: Style::default()
                .fg(Color::Black)
                .bg(HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        }
    }
}

impl Theme {
    /// Style for a role.
    #[must_use]
    pub const fn style(&self, role: Role) -> Style {
        match role {
            Role::Header => self.header,
            Role::HeaderSeparator => self.header_separator,
            Role::Custom => self.custom,
            Role::Timestamp => self.timestamp,
            Role::SenderName => self.sender_name,
            Role::Content => self.content,
            Role::Reactions => self.reactions,
        }
    }

    /// Style for a span, coloring sender names by sender.
    #[must_use]
    pub fn span_style(&self, span: &StyledSpan) -> Style {
        let style = self.style(span.role);
        if span.role == Role::SenderName {
            style.fg(sender_color(&span.text))
        } else {
            style
        }
    }
}

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (hints, metadata).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused panel borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Get a color for a sender based on their name.
#[must_use]
pub fn sender_color(name: &str) -> Color {
    let hash = name.bytes().fold(0u32, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(u32::from(b))
    });
    SENDER_COLORS[(hash as usize) % SENDER_COLORS.len()]
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(HEADER_BG)
}
