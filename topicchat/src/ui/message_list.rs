//! Message list rendering.
//!
//! Draws [`RenderedMessage`]s produced by the presenter: a header row with
//! the title on the left and the time on the right, then the body lines and
//! the reaction summary. The list scrolls so the selected message is always
//! on screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme::{self, Theme};
use crate::app::{App, Focus, MessageHit};
use crate::presenter::{RenderedMessage, StyledSpan};
use crate::sender::MessageSender;

/// Render the visible messages and return their screen rows.
pub fn render<S: MessageSender>(
    frame: &mut Frame,
    area: Rect,
    app: &App<S>,
    theme: &Theme,
) -> Vec<MessageHit> {
    let is_focused = app.focus == Focus::Messages;
    let block = Block::default()
        .title("Messages")
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rendered: Vec<RenderedMessage> = app
        .visible_messages()
        .into_iter()
        .map(|m| app.presenter(m).render())
        .collect();
    if rendered.is_empty() {
        let empty = Paragraph::new(Span::styled("No messages", theme::dimmed()));
        frame.render_widget(empty, inner);
        return Vec::new();
    }

    let selected = app.selected.min(rendered.len() - 1);
    let start = first_visible(&rendered, selected, usize::from(inner.height));
    let bottom = inner.y + inner.height;
    let mut y = inner.y;
    let mut hits = Vec::new();

    for (index, message) in rendered.iter().enumerate().skip(start) {
        if y >= bottom {
            break;
        }
        let height = u16::try_from(message.height())
            .unwrap_or(u16::MAX)
            .min(bottom - y);
        let rect = Rect::new(inner.x, y, inner.width, height);
        render_message(frame, rect, message, theme, index == selected);
        hits.push(MessageHit {
            top: y,
            bottom: y + height,
            index,
        });
        y += height;
    }
    hits
}

/// Index of the first message to draw so that `selected` fits in `rows`.
fn first_visible(rendered: &[RenderedMessage], selected: usize, rows: usize) -> usize {
    let mut used = 0;
    let mut start = selected;
    for i in (0..=selected).rev() {
        used += rendered[i].height();
        if used > rows && i != selected {
            break;
        }
        start = i;
    }
    start
}

/// Draw one message into `area`.
fn render_message(
    frame: &mut Frame,
    area: Rect,
    message: &RenderedMessage,
    theme: &Theme,
    is_selected: bool,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let row_style = if is_selected {
        theme.selected
    } else {
        theme.header
    };
    let timestamp = header_span(&message.header.timestamp, theme, is_selected);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(u16::try_from(timestamp.width()).unwrap_or(u16::MAX)),
        ])
        .split(rows[0]);

    let title = Paragraph::new(header_line(&message.header.title, theme, is_selected))
        .style(row_style);
    frame.render_widget(title, columns[0]);
    let time = Paragraph::new(Line::from(timestamp))
        .style(row_style)
        .alignment(Alignment::Right);
    frame.render_widget(time, columns[1]);

    let mut lines: Vec<Line> = message
        .body
        .iter()
        .map(|line| spans_line(line, theme))
        .collect();
    if let Some(reactions) = &message.reactions {
        lines.push(Line::from(Span::styled(
            reactions.text.as_str(),
            theme.span_style(reactions),
        )));
    }
    frame.render_widget(Paragraph::new(lines), rows[1]);
}

/// Header spans in their role styles, with the selection highlight on top.
fn header_line<'a>(spans: &'a [StyledSpan], theme: &Theme, is_selected: bool) -> Line<'a> {
    Line::from(
        spans
            .iter()
            .map(|s| header_span(s, theme, is_selected))
            .collect::<Vec<_>>(),
    )
}

fn header_span<'a>(span: &'a StyledSpan, theme: &Theme, is_selected: bool) -> Span<'a> {
    let style = theme.span_style(span);
    let style = if is_selected {
        style.patch(theme.selected)
    } else {
        style
    };
    Span::styled(span.text.as_str(), style)
}

fn spans_line<'a>(spans: &'a [StyledSpan], theme: &Theme) -> Line<'a> {
    Line::from(
        spans
            .iter()
            .map(|s| Span::styled(s.text.as_str(), theme.span_style(s)))
            .collect::<Vec<_>>(),
    )
}
