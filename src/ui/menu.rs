//! Menu screen

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::layout::centered_rect;
use crate::app::state::{AppState, MenuItem};
use crate::theme::Theme;

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let menu_area = centered_rect(50, 50, area);

    let block = Block::default()
        .title(" Hafalan ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Assalamualaikum, {}!", state.learner_name),
            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("Latihan sambung ayat", Style::default().fg(theme.fg_muted))),
        Line::from(""),
    ];

    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let is_selected = i == state.menu_selected % MenuItem::ALL.len();
        let prefix = if is_selected { "\u{25B6}" } else { " " };
        let style = if is_selected {
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg_secondary)
        };
        lines.push(Line::from(Span::styled(format!("{} {}", prefix, item.label()), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[j/k] Pilih    [Enter] Mulai",
        Style::default().fg(theme.fg_muted),
    )));

    let para = Paragraph::new(lines).alignment(Alignment::Center).block(block);
    frame.render_widget(para, menu_area);
}
