//! Session state machine
//!
//! A session walks its question list one item at a time:
//!
//! ```text
//! NotStarted -> AwaitingAnswer(0) -> Resolved(0) -> AwaitingAnswer(1) -> ... -> Finished
//! ```
//!
//! Every operation checks the current phase first. A late timeout after an
//! answer, a second answer, or an advance before resolution is rejected with
//! [`QuizError::InvalidStateTransition`] and leaves the score untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::QuizError;
use super::generator::QuestionItem;
use crate::scoring::FinalizeReport;

/// Shortest countdown a question can get
pub const MIN_COUNTDOWN_SECONDS: u32 = 3;

/// Difficulty tier, derived from cumulative score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Cumulative score needed for medium
    pub const MEDIUM_SCORE: u64 = 200;
    /// Cumulative score needed for hard
    pub const HARD_SCORE: u64 = 500;

    /// Tier for a learner's cumulative score
    pub fn from_cumulative_score(score: u64) -> Self {
        if score >= Self::HARD_SCORE {
            Difficulty::Hard
        } else if score >= Self::MEDIUM_SCORE {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }

    /// Seconds taken off the base countdown
    pub fn timer_penalty(self) -> u32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 2,
            Difficulty::Hard => 5,
        }
    }

    /// Points for a correct answer before bonuses
    pub fn base_points(self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 20,
        }
    }

    /// Learner-facing label
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Mudah",
            Difficulty::Medium => "Sedang",
            Difficulty::Hard => "Sulit",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Default countdown for a level when no override is set
pub fn base_time_for_level(level: u32) -> u32 {
    if level < 5 {
        30
    } else if level < 10 {
        25
    } else {
        20
    }
}

/// Countdown length for one question
pub fn countdown_seconds(level: u32, timer_override: Option<u32>, difficulty: Difficulty) -> u32 {
    let base = timer_override.unwrap_or_else(|| base_time_for_level(level));
    base.saturating_sub(difficulty.timer_penalty()).max(MIN_COUNTDOWN_SECONDS)
}

/// How a question was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Incorrect,
    TimedOut,
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    AwaitingAnswer,
    Resolved(Outcome),
    Finished,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::NotStarted => "not started",
            Phase::AwaitingAnswer => "awaiting an answer",
            Phase::Resolved(_) => "resolved",
            Phase::Finished => "finished",
        }
    }
}

/// Emitted for every correct answer, consumed by the progress tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAnswer {
    pub surah_number: u32,
    pub surah_name: String,
    pub ayah_number: u32,
    /// Seconds between the question appearing and the answer
    pub response_time_seconds: Option<u32>,
}

/// Result of answering or timing out a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// Points awarded for this question
    pub points: u32,
    /// Streak after this question
    pub streak: u32,
    /// Option the learner picked, if any
    pub selected: Option<usize>,
    /// Index of the right option, for highlighting
    pub correct_option_index: usize,
    /// Present only when the answer was correct
    pub correct_answer: Option<CorrectAnswer>,
}

/// Result of moving past a resolved question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The next question is now awaiting an answer
    Question(usize),
    /// There are no more questions
    Finished(SessionSummary),
}

/// Totals for a finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub score: u32,
    pub correct_count: u32,
    pub total_questions: u32,
    pub best_streak: u32,
    pub difficulty: Difficulty,
    pub outcomes: Vec<Outcome>,
}

impl SessionSummary {
    /// Percentage of correct answers, rounded down
    pub fn percentage(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        self.correct_count * 100 / self.total_questions
    }
}

/// Parameters fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub difficulty: Difficulty,
    pub countdown_seconds: u32,
}

impl SessionSettings {
    /// Settings for a learner's level, timer override and cumulative score
    pub fn for_learner(level: u32, timer_override: Option<u32>, cumulative_score: u64) -> Self {
        let difficulty = Difficulty::from_cumulative_score(cumulative_score);
        Self { difficulty, countdown_seconds: countdown_seconds(level, timer_override, difficulty) }
    }
}

/// A single play-through of a question list
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    settings: SessionSettings,
    questions: Vec<QuestionItem>,
    current_index: usize,
    phase: Phase,
    score: u32,
    streak: u32,
    best_streak: u32,
    correct_count: u32,
    time_left: u32,
    outcomes: Vec<Outcome>,
    report: Option<FinalizeReport>,
}

impl Session {
    /// Create a session that has not started yet
    pub fn new(id: impl Into<String>, settings: SessionSettings) -> Self {
        Self {
            id: id.into(),
            settings,
            questions: Vec::new(),
            current_index: 0,
            phase: Phase::NotStarted,
            score: 0,
            streak: 0,
            best_streak: 0,
            correct_count: 0,
            time_left: settings.countdown_seconds,
            outcomes: Vec::new(),
            report: None,
        }
    }

    /// Load the questions and arm the countdown for the first one
    pub fn start(&mut self, questions: Vec<QuestionItem>) -> Result<&QuestionItem, QuizError> {
        self.expect_phase("start", |p| p == Phase::NotStarted)?;
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        self.questions = questions;
        self.current_index = 0;
        self.score = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.correct_count = 0;
        self.outcomes.clear();
        self.arm();

        Ok(&self.questions[0])
    }

    /// Answer the current question with the option at `selected`
    pub fn submit_answer(&mut self, selected: usize) -> Result<Resolution, QuizError> {
        self.expect_phase("submit an answer", |p| p == Phase::AwaitingAnswer)?;

        let question = &self.questions[self.current_index];
        let correct_option_index = question.correct_option_index;

        if !question.is_correct(selected) {
            return Ok(self.resolve_wrong(Outcome::Incorrect, Some(selected)));
        }

        let points = self.settings.difficulty.base_points() + self.streak * 2 + self.time_left / 5;
        let correct_answer = CorrectAnswer {
            surah_number: question.surah_number,
            surah_name: question.surah_name.clone(),
            ayah_number: question.answer_ayah_number,
            response_time_seconds: Some(self.elapsed_seconds()),
        };

        self.score += points;
        self.streak += 1;
        self.correct_count += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.phase = Phase::Resolved(Outcome::Correct);
        self.outcomes.push(Outcome::Correct);

        Ok(Resolution {
            outcome: Outcome::Correct,
            points,
            streak: self.streak,
            selected: Some(selected),
            correct_option_index,
            correct_answer: Some(correct_answer),
        })
    }

    /// The countdown reached zero before an answer arrived
    pub fn timeout(&mut self) -> Result<Resolution, QuizError> {
        self.expect_phase("time out", |p| p == Phase::AwaitingAnswer)?;
        self.time_left = 0;
        Ok(self.resolve_wrong(Outcome::TimedOut, None))
    }

    /// One second passed on the current question's countdown.
    ///
    /// Returns the seconds left. Reaching zero does not resolve the
    /// question; the countdown owner follows up with [`Session::timeout`].
    pub fn tick(&mut self) -> Result<u32, QuizError> {
        self.expect_phase("tick the countdown", |p| p == Phase::AwaitingAnswer)?;
        self.time_left = self.time_left.saturating_sub(1);
        Ok(self.time_left)
    }

    /// Move past a resolved question
    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        self.expect_phase("advance", |p| matches!(p, Phase::Resolved(_)))?;

        self.current_index += 1;
        if self.current_index < self.questions.len() {
            self.arm();
            Ok(Advance::Question(self.current_index))
        } else {
            self.phase = Phase::Finished;
            Ok(Advance::Finished(self.build_summary()))
        }
    }

    /// Totals, available once the session is finished
    pub fn summary(&self) -> Option<SessionSummary> {
        (self.phase == Phase::Finished).then(|| self.build_summary())
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The question currently shown (or last shown, once resolved)
    pub fn current_question(&self) -> Option<&QuestionItem> {
        match self.phase {
            Phase::AwaitingAnswer | Phase::Resolved(_) => self.questions.get(self.current_index),
            _ => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Check if the session has run out of questions
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub(crate) fn report(&self) -> Option<&FinalizeReport> {
        self.report.as_ref()
    }

    pub(crate) fn set_report(&mut self, report: FinalizeReport) {
        self.report = Some(report);
    }

    fn arm(&mut self) {
        self.time_left = self.settings.countdown_seconds;
        self.phase = Phase::AwaitingAnswer;
    }

    fn elapsed_seconds(&self) -> u32 {
        self.settings.countdown_seconds.saturating_sub(self.time_left)
    }

    fn resolve_wrong(&mut self, outcome: Outcome, selected: Option<usize>) -> Resolution {
        self.streak = 0;
        self.phase = Phase::Resolved(outcome);
        self.outcomes.push(outcome);

        Resolution {
            outcome,
            points: 0,
            streak: 0,
            selected,
            correct_option_index: self.questions[self.current_index].correct_option_index,
            correct_answer: None,
        }
    }

    fn expect_phase(
        &self,
        operation: &'static str,
        allowed: impl Fn(Phase) -> bool,
    ) -> Result<(), QuizError> {
        if allowed(self.phase) {
            Ok(())
        } else {
            Err(QuizError::InvalidStateTransition { operation, state: self.phase.name() })
        }
    }

    fn build_summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            score: self.score,
            correct_count: self.correct_count,
            total_questions: self.questions.len() as u32,
            best_streak: self.best_streak,
            difficulty: self.settings.difficulty,
            outcomes: self.outcomes.clone(),
        }
    }
}
