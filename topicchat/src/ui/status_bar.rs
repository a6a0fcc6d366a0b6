//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Focus};
use crate::sender::MessageSender;

/// Render the status bar at the bottom of the screen.
pub fn render<S: MessageSender>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let help_text = match app.focus {
        Focus::Messages => {
            "Enter/c: reply | R: reply to author | >: quote | S/s: narrow | Esc: all | p/n: new | q: quit"
        }
        Focus::Composer => "Alt+Enter/Ctrl+S: send | Tab: next field | Esc: discard draft",
    };

    let mut spans = vec![
        Span::styled("TopicChat", theme::bold()),
        Span::raw(" | "),
        Span::styled(app.view.narrow.describe(), theme::highlighted()),
        Span::raw(" | "),
    ];
    if let Some(status) = &app.status {
        let color = if status.is_error {
            theme::ERROR
        } else {
            theme::SUCCESS
        };
        spans.push(Span::styled("●", theme::normal().fg(color)));
        spans.push(Span::raw(format!(" {} | ", status.text)));
    }
    spans.push(Span::styled(help_text, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
