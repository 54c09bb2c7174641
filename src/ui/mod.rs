//! UI rendering components

pub mod layout;
pub mod menu;
pub mod quiz_panel;
pub mod results;

use ratatui::{Frame, style::Style, widgets::Block};

use crate::app::state::{AppState, Screen};
use crate::theme::Theme;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg_primary)), area);

    let (body, status) = layout::with_status_bar(area);

    match state.screen {
        Screen::Menu => menu::draw(frame, body, state, theme),
        Screen::Quiz => quiz_panel::draw(frame, body, &state.quiz, theme),
        Screen::Results => match &state.results {
            Some((summary, report)) => results::draw(frame, body, summary, report, theme),
            None => menu::draw(frame, body, state, theme),
        },
    }

    layout::draw_status(frame, status, state, theme);
    layout::draw_toast(frame, body, state, theme);
}
