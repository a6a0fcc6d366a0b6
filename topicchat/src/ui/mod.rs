//! Terminal UI rendering.

pub mod composer_view;
pub mod message_list;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::{App, MessageHit};
use crate::sender::MessageSender;

/// Main draw function for the entire UI.
///
/// Returns the screen rows of the drawn messages so the host can map
/// mouse clicks back to messages.
pub fn draw<S: MessageSender>(frame: &mut Frame, app: &App<S>) -> Vec<MessageHit> {
    let theme = theme::Theme::default();

    // Messages on top, composer below, status bar at the bottom
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(composer_view::height(&app.composer)),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let hits = message_list::render(frame, chunks[0], app, &theme);
    composer_view::render(frame, chunks[1], app);
    status_bar::render(frame, chunks[2], app);
    hits
}
