//! Layout utilities and common components

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::state::AppState;
use crate::theme::Theme;

/// Create a centered rectangle with the given percentage of width and height
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Split the screen into a body and a one-line status bar
pub fn with_status_bar(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
    (chunks[0], chunks[1])
}

/// Draw the status line at the bottom of the screen
pub fn draw_status(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let line = match &state.status {
        Some(status) => Line::from(Span::styled(status.as_str(), Style::default().fg(theme.warning))),
        None => Line::from(Span::styled(
            format!(" {}  [q] Keluar", state.learner_name),
            Style::default().fg(theme.fg_muted),
        )),
    };
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg_secondary)), area);
}

/// Draw the toast, if any, in the top right corner
pub fn draw_toast(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(toast) = &state.toast else {
        return;
    };

    let width = (toast.text.chars().count() as u16 + 4).min(area.width);
    let toast_area = Rect { x: area.x + area.width.saturating_sub(width), y: area.y, width, height: 3.min(area.height) };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.success))
        .style(Style::default().bg(theme.bg_secondary));
    let para = Paragraph::new(Span::styled(
        toast.text.as_str(),
        Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(para, toast_area);
}
