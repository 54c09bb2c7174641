//! Application state definitions

use std::time::{Duration, Instant};

use crate::game::GameEvent;
use crate::progress::SurahMastered;
use crate::quiz::{QuestionItem, Resolution, SessionSummary};
use crate::scoring::{ComboTier, FinalizeReport};

/// How long a toast stays on screen
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Which screen is currently displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Menu,
    Quiz,
    Results,
}

/// Entries on the menu screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Start,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Start, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Start => "Mulai latihan",
            MenuItem::Quit => "Keluar",
        }
    }
}

/// Answer feedback shown between questions
#[derive(Debug, Clone)]
pub struct Feedback {
    pub resolution: Resolution,
    pub combo: Option<ComboTier>,
    pub message: String,
    pub shown_at: Instant,
}

/// State for the quiz screen
#[derive(Debug, Clone, Default)]
pub struct QuizState {
    pub question: Option<QuestionItem>,
    pub index: usize,
    pub total: usize,
    pub remaining: u32,
    pub countdown_seconds: u32,
    pub selected_option: usize,
    pub score: u32,
    pub streak: u32,
    pub feedback: Option<Feedback>,
}

impl QuizState {
    /// Move the highlighted option, wrapping around
    pub fn move_selection(&mut self, down: bool) {
        let count = self.question.as_ref().map_or(0, |q| q.options.len());
        if count == 0 {
            return;
        }
        self.selected_option = if down {
            (self.selected_option + 1) % count
        } else {
            (self.selected_option + count - 1) % count
        };
    }

    /// Check if answers are accepted right now
    pub fn awaiting_answer(&self) -> bool {
        self.question.is_some() && self.feedback.is_none()
    }
}

/// A short-lived notice
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub shown_at: Instant,
}

/// Complete application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub screen: Screen,
    pub learner_name: String,
    pub menu_selected: usize,
    pub quiz: QuizState,
    pub results: Option<(SessionSummary, FinalizeReport)>,
    pub toast: Option<Toast>,
    /// Bottom line message, e.g. why a session could not start
    pub status: Option<String>,
}

impl AppState {
    pub fn new(learner_name: impl Into<String>) -> Self {
        Self { learner_name: learner_name.into(), ..Self::default() }
    }

    /// Fold engine events into what is drawn
    pub fn apply(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::QuestionShown { index, total, question, countdown_seconds } => {
                    self.screen = Screen::Quiz;
                    self.quiz.index = index;
                    self.quiz.total = total;
                    self.quiz.question = Some(question);
                    self.quiz.remaining = countdown_seconds;
                    self.quiz.countdown_seconds = countdown_seconds;
                    self.quiz.selected_option = 0;
                    self.quiz.feedback = None;
                    if index == 0 {
                        self.quiz.score = 0;
                        self.quiz.streak = 0;
                    }
                }
                GameEvent::CountdownTick { remaining } => self.quiz.remaining = remaining,
                GameEvent::AnswerResolved { resolution, combo, message } => {
                    self.quiz.score += resolution.points;
                    self.quiz.streak = resolution.streak;
                    self.quiz.feedback =
                        Some(Feedback { resolution, combo, message, shown_at: Instant::now() });
                }
                GameEvent::SurahMastered(SurahMastered { surah_name, .. }) => {
                    self.show_toast(format!("Surah {surah_name} sudah hafal!"));
                }
                GameEvent::SessionFinished { summary, report } => {
                    self.screen = Screen::Results;
                    self.quiz = QuizState::default();
                    self.results = Some((summary, report));
                }
                GameEvent::PersistencePending { pending } => {
                    self.status = Some(format!("{pending} perubahan belum tersimpan, dicoba lagi nanti"));
                }
            }
        }
    }

    pub fn show_toast(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast { text: text.into(), shown_at: Instant::now() });
    }

    /// Drop the toast once it has been up long enough
    pub fn expire_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|t| t.shown_at.elapsed() >= TOAST_DURATION) {
            self.toast = None;
        }
    }

    /// Check if answer feedback has been visible for at least `delay`
    pub fn feedback_elapsed(&self, delay: Duration) -> bool {
        self.quiz.feedback.as_ref().is_some_and(|f| f.shown_at.elapsed() >= delay)
    }

    pub fn selected_menu_item(&self) -> MenuItem {
        MenuItem::ALL[self.menu_selected % MenuItem::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::quiz::Outcome;
    use crate::quiz::session::tests::question;

    fn resolution(points: u32, streak: u32) -> Resolution {
        Resolution {
            outcome: if points > 0 { Outcome::Correct } else { Outcome::Incorrect },
            points,
            streak,
            selected: Some(1),
            correct_option_index: 1,
            correct_answer: None,
        }
    }

    #[test]
    fn question_event_opens_quiz() {
        let mut state = AppState::new("Amina");
        state.apply(vec![GameEvent::QuestionShown {
            index: 0,
            total: 5,
            question: question(112, 2),
            countdown_seconds: 30,
        }]);
        assert_eq!(state.screen, Screen::Quiz);
        assert_eq!(state.quiz.remaining, 30);
        assert!(state.quiz.awaiting_answer());
    }

    #[test]
    fn resolution_adds_score_and_blocks_answers() {
        let mut state = AppState::new("Amina");
        state.apply(vec![
            GameEvent::QuestionShown { index: 0, total: 5, question: question(112, 2), countdown_seconds: 30 },
            GameEvent::AnswerResolved { resolution: resolution(16, 1), combo: None, message: "ok".into() },
        ]);
        assert_eq!(state.quiz.score, 16);
        assert_eq!(state.quiz.streak, 1);
        assert!(!state.quiz.awaiting_answer());
        assert!(state.feedback_elapsed(Duration::ZERO));
    }

    #[test]
    fn selection_wraps() {
        let mut quiz = QuizState { question: Some(question(112, 2)), ..QuizState::default() };
        quiz.move_selection(false);
        assert_eq!(quiz.selected_option, 2);
        quiz.move_selection(true);
        assert_eq!(quiz.selected_option, 0);
    }

    #[test]
    fn mastery_shows_toast() {
        let mut state = AppState::new("Amina");
        state.apply(vec![GameEvent::SurahMastered(SurahMastered {
            learner_id: "amina".into(),
            surah_number: 112,
            surah_name: "Al-Ikhlas".into(),
            completed_at: 0,
        })]);
        assert_eq!(state.toast.unwrap().text, "Surah Al-Ikhlas sudah hafal!");
    }
}
