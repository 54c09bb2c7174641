//! Quiz screen: prompt ayah, answer options and countdown

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use super::layout::centered_rect;
use crate::app::state::{Feedback, QuizState};
use crate::quiz::{Outcome, QuestionItem};
use crate::theme::Theme;

/// Draw the quiz for the current question
pub fn draw(frame: &mut Frame, area: Rect, quiz: &QuizState, theme: &Theme) {
    let Some(question) = &quiz.question else {
        return;
    };

    let panel_area = centered_rect(80, 90, area);
    let block = Block::default()
        .title(format!(" {} ", question.surah_name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(panel_area);
    frame.render_widget(block, panel_area);

    let [header, timer, body] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(1)]).areas(inner);

    draw_header(frame, header, quiz, theme);
    draw_timer(frame, timer, quiz, theme);

    let mut lines = question_lines(question, quiz.selected_option, quiz.feedback.as_ref(), theme);
    match &quiz.feedback {
        Some(feedback) => lines.extend(feedback_lines(feedback, theme)),
        None => lines.push(Line::from(Span::styled(
            "[1-4/a-d] Jawab    [j/k] Pilih    [Enter] Konfirmasi    [Esc] Menu",
            Style::default().fg(theme.fg_muted),
        ))),
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(para, body);
}

fn draw_header(frame: &mut Frame, area: Rect, quiz: &QuizState, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(format!("Soal {} dari {}", quiz.index + 1, quiz.total), Style::default().fg(theme.fg_muted)),
        Span::raw("    "),
        Span::styled(format!("Skor {}", quiz.score), Style::default().fg(theme.accent_primary)),
        Span::raw("    "),
        Span::styled(format!("Combo {}", quiz.streak), Style::default().fg(theme.accent_secondary)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_timer(frame: &mut Frame, area: Rect, quiz: &QuizState, theme: &Theme) {
    let ratio = if quiz.countdown_seconds == 0 {
        0.0
    } else {
        f64::from(quiz.remaining) / f64::from(quiz.countdown_seconds)
    };
    let color = if quiz.remaining <= 5 { theme.error } else { theme.success };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(theme.bg_primary))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{} detik", quiz.remaining));
    frame.render_widget(gauge, area);
}

/// Lines for the prompt and options. Once answered, the correct option is
/// marked and a wrong pick is shown in the error color.
fn question_lines<'a>(
    question: &'a QuestionItem,
    selected: usize,
    feedback: Option<&Feedback>,
    theme: &Theme,
) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Ayat {}, apa ayat selanjutnya?", question.prompt_ayah_number),
            Style::default().fg(theme.fg_muted),
        )),
        Line::from(Span::styled(
            question.prompt_text.as_str(),
            Style::default().fg(theme.ayah).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right),
        Line::from(""),
    ];

    for (i, option) in question.options.iter().enumerate() {
        let letter = (b'A' + i as u8) as char;
        let (prefix, style) = match feedback {
            Some(_) if i == question.correct_option_index => {
                ("\u{2713}", Style::default().fg(theme.success).add_modifier(Modifier::BOLD))
            }
            Some(f) if f.resolution.selected == Some(i) => ("\u{2717}", Style::default().fg(theme.error)),
            Some(_) => ("\u{25CB}", Style::default().fg(theme.fg_muted)),
            None if i == selected => {
                ("\u{25CF}", Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD))
            }
            None => ("\u{25CB}", Style::default().fg(theme.fg_secondary)),
        };
        lines.push(Line::from(Span::styled(format!("  {} {}) {}", prefix, letter, option.text), style)));
        lines.push(Line::from(""));
    }

    lines
}

fn feedback_lines<'a>(feedback: &'a Feedback, theme: &Theme) -> Vec<Line<'a>> {
    let color = match feedback.resolution.outcome {
        Outcome::Correct => theme.success,
        Outcome::Incorrect => theme.error,
        Outcome::TimedOut => theme.warning,
    };

    let mut lines = Vec::new();
    if let Some(combo) = feedback.combo {
        lines.push(Line::from(Span::styled(
            combo.banner(feedback.resolution.streak),
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        )));
    }
    let points = match feedback.resolution.points {
        0 => String::new(),
        p => format!("  +{p}"),
    };
    lines.push(Line::from(Span::styled(
        format!("{}{}", feedback.message, points),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled("[Enter] Lanjut", Style::default().fg(theme.fg_muted))));
    lines
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::quiz::Resolution;
    use crate::quiz::session::tests::question;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn highlights_selected_option_before_answering() {
        let q = question(112, 2);
        let lines = question_lines(&q, 2, None, &Theme::default());
        let marked: Vec<String> = lines.iter().map(line_text).filter(|t| t.contains('\u{25CF}')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("C)"));
    }

    #[test]
    fn marks_correct_and_wrong_after_answering() {
        let q = question(112, 2);
        let feedback = Feedback {
            resolution: Resolution {
                outcome: Outcome::Incorrect,
                points: 0,
                streak: 0,
                selected: Some(0),
                correct_option_index: 1,
                correct_answer: None,
            },
            combo: None,
            message: "Coba lagi".into(),
            shown_at: Instant::now(),
        };
        let texts: Vec<String> =
            question_lines(&q, 0, Some(&feedback), &Theme::default()).iter().map(line_text).collect();
        assert!(texts.iter().any(|t| t.contains("\u{2717} A)")));
        assert!(texts.iter().any(|t| t.contains("\u{2713} B)")));
    }
}
