//! Session results screen

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::layout::centered_rect;
use crate::quiz::{Outcome, SessionSummary};
use crate::scoring::FinalizeReport;
use crate::theme::Theme;

pub fn draw(frame: &mut Frame, area: Rect, summary: &SessionSummary, report: &FinalizeReport, theme: &Theme) {
    let overlay_area = centered_rect(70, 70, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Hasil Latihan ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));

    let grade = report.grade;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} {}", grade.icon(), grade.title()),
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(grade.message(), Style::default().fg(theme.fg_secondary))),
        Line::from(""),
        Line::from(Span::styled(
            format!("Skor: {}", summary.score),
            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Benar {}/{} ({}%)    Combo terbaik {}",
            summary.correct_count,
            summary.total_questions,
            summary.percentage(),
            summary.best_streak
        )),
        Line::from(""),
    ];

    let mut marks = Vec::new();
    for (i, outcome) in summary.outcomes.iter().enumerate() {
        let (marker, color) = match outcome {
            Outcome::Correct => ("\u{2713}", theme.success),
            Outcome::Incorrect => ("\u{2717}", theme.error),
            Outcome::TimedOut => ("\u{23F1}", theme.warning),
        };
        marks.push(Span::styled(format!(" {}{} ", i + 1, marker), Style::default().fg(color)));
    }
    lines.push(Line::from(marks));
    lines.push(Line::from(""));

    if report.leveled_up {
        lines.push(Line::from(Span::styled(
            format!("Naik ke level {}!", report.new_level),
            Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(badge) = report.new_badge {
        lines.push(Line::from(Span::styled(
            format!("{} Lencana baru: {}", badge.icon(), badge.name()),
            Style::default().fg(theme.accent_secondary),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("Total skor {}    Tingkat berikutnya: {}", report.new_cumulative_score, report.next_difficulty.label()),
        Style::default().fg(theme.fg_muted),
    )));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("[Enter] Kembali ke menu", Style::default().fg(theme.fg_muted))));

    let para = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(para, overlay_area);
}
