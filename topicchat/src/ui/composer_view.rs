//! Composer rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, Focus};
use crate::composer::{Composer, DraftField, TextField};
use crate::sender::MessageSender;

/// Most body rows shown before the body box stops growing.
const MAX_BODY_ROWS: u16 = 6;

/// Rows the composer needs for its current state.
#[must_use]
pub fn height(composer: &Composer) -> u16 {
    if !composer.is_open() {
        return 3;
    }
    let body_rows = composer
        .field(DraftField::Body)
        .map_or(1, |body| body.text().split('\n').count());
    let body_rows = u16::try_from(body_rows)
        .unwrap_or(MAX_BODY_ROWS)
        .clamp(1, MAX_BODY_ROWS);
    // Header field box (3) + body box (rows + 2 borders)
    3 + body_rows + 2
}

/// Render the composer.
pub fn render<S: MessageSender>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let is_focused = app.focus == Focus::Composer;
    let composer = &app.composer;

    if !composer.is_open() {
        let hint = Line::from(vec![
            Span::styled("[p]", theme::highlighted()),
            Span::styled(" New Private Message   ", theme::normal()),
            Span::styled("[n]", theme::highlighted()),
            Span::styled(" New Topic", theme::normal()),
        ]);
        let block = Block::default().title("Compose").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(hint).block(block), area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    // Header fields side by side, body below
    let header_fields: Vec<DraftField> = composer
        .fields()
        .iter()
        .copied()
        .filter(|f| *f != DraftField::Body)
        .collect();
    let columns_count = u32::try_from(header_fields.len()).unwrap_or(1).max(1);
    let constraints = vec![Constraint::Ratio(1, columns_count); header_fields.len()];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(rows[0]);

    for (field, rect) in header_fields.iter().zip(columns.iter()) {
        render_field(frame, *rect, composer, *field, is_focused, None);
    }
    let title = if composer.is_pending() {
        "Sending..."
    } else {
        "Message"
    };
    render_field(frame, rows[1], composer, DraftField::Body, is_focused, Some(title));
}

/// Render one field in a bordered box with its caption.
fn render_field(
    frame: &mut Frame,
    area: Rect,
    composer: &Composer,
    field: DraftField,
    composer_focused: bool,
    title: Option<&str>,
) {
    let Some(text_field) = composer.field(field) else {
        return;
    };
    let has_cursor = composer_focused && composer.focus() == Some(field);

    let mut lines: Vec<Line> = display_text(text_field, has_cursor)
        .split('\n')
        .map(|l| Line::from(Span::styled(l.to_string(), theme::normal())))
        .collect();
    if let Some(first) = lines.first_mut() {
        first
            .spans
            .insert(0, Span::styled(field.caption(), theme::dimmed()));
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(if has_cursor {
            theme::highlighted()
        } else {
            theme::normal()
        });
    if let Some(title) = title {
        block = block.title(title);
    }

    // Keep the cursor line in view for long bodies
    let inner_rows = usize::from(area.height.saturating_sub(2));
    let skip = lines.len().saturating_sub(inner_rows);
    let paragraph = Paragraph::new(lines.split_off(skip)).block(block);
    frame.render_widget(paragraph, area);
}

/// Field text with a block cursor inserted when focused.
fn display_text(field: &TextField, has_cursor: bool) -> String {
    let mut text = field.text().to_string();
    if has_cursor {
        let at = text
            .char_indices()
            .nth(field.cursor())
            .map_or(text.len(), |(i, _)| i);
        text.insert(at, '█');
    }
    text
}
