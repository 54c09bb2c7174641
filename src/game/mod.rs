//! Game orchestration
//!
//! [`GameEngine`] owns the curriculum, the active learner, their running
//! session and the repository. The front-end sends it commands (start,
//! answer, tick, timeout, advance) and renders the [`GameEvent`]s it
//! returns. Commands that arrive in the wrong session state are logged and
//! dropped, so a late countdown expiry can never touch the score.

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::curriculum::Curriculum;
use crate::profile::{LearnerProfile, ProfileRepository, RepositoryError, ResilientRepository, ScoreEntry};
use crate::progress::{ProgressTracker, SurahMastered};
use crate::quiz::{
    self, Advance, CorrectAnswer, Outcome, QuestionItem, QuizError, Resolution, Session, SessionSummary,
};
use crate::scoring::{self, ComboTier, FinalizeReport, MessageKind, motivational_message};
use crate::voice::{self, VoiceQuestion, VoiceSummary};

/// Errors that stop a command outright
#[derive(Debug, Error)]
pub enum GameError {
    #[error("No learner loaded")]
    NoLearner,

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Something the front-end should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    QuestionShown { index: usize, total: usize, question: QuestionItem, countdown_seconds: u32 },
    CountdownTick { remaining: u32 },
    AnswerResolved { resolution: Resolution, combo: Option<ComboTier>, message: String },
    SurahMastered(SurahMastered),
    SessionFinished { summary: SessionSummary, report: FinalizeReport },
    /// Some writes are held in memory until the store is reachable again
    PersistencePending { pending: usize },
}

/// Drives sessions for one learner at a time
pub struct GameEngine<R> {
    curriculum: Curriculum,
    repository: ResilientRepository<R>,
    tracker: ProgressTracker,
    rng: StdRng,
    learner: Option<LearnerProfile>,
    session: Option<Session>,
    sessions_started: u64,
}

impl<R: ProfileRepository> GameEngine<R> {
    /// Create an engine. A fixed seed makes question order reproducible.
    pub fn new(curriculum: Curriculum, repository: R, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            curriculum,
            repository: ResilientRepository::new(repository),
            tracker: ProgressTracker::new(),
            rng,
            learner: None,
            session: None,
            sessions_started: 0,
        }
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn repository(&self) -> &ResilientRepository<R> {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut ResilientRepository<R> {
        &mut self.repository
    }

    pub fn learner(&self) -> Option<&LearnerProfile> {
        self.learner.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Make `id` the active learner
    pub fn load_learner(&mut self, id: &str) -> Result<&LearnerProfile, GameError> {
        let profile = self.repository.load_learner(id)?;
        self.tracker.load(&profile.id, profile.mastery.clone());
        self.session = None;
        tracing::debug!("Loaded learner {} at level {}", profile.id, profile.level);
        Ok(self.learner.insert(profile))
    }

    /// Generate questions and show the first one
    pub fn start_session(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let learner = self.learner.as_ref().ok_or(GameError::NoLearner)?;

        let questions = quiz::generate(&self.curriculum, &learner.scope, learner.level, &mut self.rng)?;
        self.sessions_started += 1;
        let id = format!("{}-{}", learner.id, self.sessions_started);

        let mut session = Session::new(id, learner.session_settings());
        session.start(questions)?;
        let event = question_shown(&session);
        tracing::info!(
            "Session {} started: {} questions, {} difficulty",
            session.id(),
            session.total_questions(),
            session.settings().difficulty
        );
        self.session = Some(session);
        Ok(event.into_iter().collect())
    }

    /// Answer the current question
    pub fn submit_answer(&mut self, selected: usize) -> Vec<GameEvent> {
        let Some(session) = self.session.as_mut() else {
            tracing::warn!("Answer received with no session running");
            return Vec::new();
        };
        match session.submit_answer(selected) {
            Ok(resolution) => self.resolved(resolution),
            Err(e) => ignore_stale(e),
        }
    }

    /// The countdown for the current question expired
    pub fn timeout(&mut self) -> Vec<GameEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        match session.timeout() {
            Ok(resolution) => self.resolved(resolution),
            Err(e) => ignore_stale(e),
        }
    }

    /// One second of the current countdown passed
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        match session.tick() {
            Ok(remaining) => vec![GameEvent::CountdownTick { remaining }],
            Err(e) => ignore_stale(e),
        }
    }

    /// Move to the next question, or finish and persist the session
    pub fn advance(&mut self) -> Vec<GameEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        match session.advance() {
            Ok(Advance::Question(_)) => question_shown(session).into_iter().collect(),
            Ok(Advance::Finished(summary)) => self.finish(summary),
            Err(e) => ignore_stale(e),
        }
    }

    /// Draw recitation prompts for a voice session
    pub fn voice_questions(&mut self, count: usize) -> Result<Vec<VoiceQuestion>, GameError> {
        let learner = self.learner.as_ref().ok_or(GameError::NoLearner)?;
        Ok(voice::voice_questions(&self.curriculum, &learner.scope, count, &mut self.rng)?)
    }

    /// Feed a finished voice session's correct recitations into progress
    pub fn record_voice_summary(&mut self, summary: &VoiceSummary) -> Vec<GameEvent> {
        let mut events: Vec<GameEvent> =
            summary.correct_answers.iter().filter_map(|answer| self.record_progress(answer)).collect();
        events.extend(self.pending_event());
        events
    }

    fn resolved(&mut self, resolution: Resolution) -> Vec<GameEvent> {
        let mut events = Vec::new();

        if let Some(answer) = &resolution.correct_answer {
            events.extend(self.record_progress(answer));
        }

        let combo = match resolution.outcome {
            Outcome::Correct => ComboTier::from_streak(resolution.streak),
            _ => None,
        };
        let kind = match (resolution.outcome, combo) {
            (Outcome::Correct, Some(_)) => MessageKind::Combo(resolution.streak),
            (Outcome::Correct, None) => MessageKind::Correct,
            (Outcome::Incorrect, _) => MessageKind::Incorrect,
            (Outcome::TimedOut, _) => MessageKind::TimedOut,
        };
        let message = motivational_message(kind, &mut self.rng);

        // Mastery toasts follow the answer feedback
        events.insert(0, GameEvent::AnswerResolved { resolution, combo, message });
        events
    }

    /// Update mastery for a correct answer and persist the surah record
    fn record_progress(&mut self, answer: &CorrectAnswer) -> Option<GameEvent> {
        let learner = self.learner.as_mut()?;
        let total_ayahs = self.curriculum.surah_ayah_count(answer.surah_number);
        let update = self.tracker.record_correct_answer(&learner.id, answer, total_ayahs);

        learner.mastery.insert(update.surah_number, update.record.clone());
        if let Err(e) = self.repository.update_mastery_record(&learner.id, update.surah_number, &update.record) {
            tracing::warn!("Failed to save mastery for {}: {}", learner.id, e);
        }

        update.mastered.map(GameEvent::SurahMastered)
    }

    fn finish(&mut self, summary: SessionSummary) -> Vec<GameEvent> {
        let (Some(session), Some(learner)) = (self.session.as_mut(), self.learner.as_mut()) else {
            return Vec::new();
        };

        let report = match scoring::finalize(session, learner) {
            Ok(report) => report,
            Err(e) => return ignore_stale(e),
        };

        if report.leveled_up {
            if let Err(e) = self.repository.update_level(&learner.id, report.new_level) {
                tracing::warn!("Failed to save level for {}: {}", learner.id, e);
            }
        }
        let entry = ScoreEntry::from_summary(learner, &summary);
        if let Err(e) = self.repository.append_score_entry(&entry) {
            tracing::warn!("Failed to save score for {}: {}", learner.id, e);
        }

        tracing::info!(
            "Session {} finished: {}/{} correct, {} points",
            summary.session_id,
            summary.correct_count,
            summary.total_questions,
            summary.score
        );

        let mut events = vec![GameEvent::SessionFinished { summary, report }];
        events.extend(self.pending_event());
        events
    }

    fn pending_event(&self) -> Option<GameEvent> {
        let pending = self.repository.pending_count();
        (pending > 0).then_some(GameEvent::PersistencePending { pending })
    }
}

fn question_shown(session: &Session) -> Option<GameEvent> {
    session.current_question().map(|question| GameEvent::QuestionShown {
        index: session.current_index(),
        total: session.total_questions(),
        question: question.clone(),
        countdown_seconds: session.time_left(),
    })
}

fn ignore_stale(e: QuizError) -> Vec<GameEvent> {
    tracing::warn!("Ignoring out-of-order command: {}", e);
    Vec::new()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::curriculum::{Juz, Surah};
    use crate::profile::MemoryRepository;
    use crate::quiz::{ScopeSelection, SurahFilter};

    fn engine_with(learner: LearnerProfile, curriculum: Curriculum) -> GameEngine<MemoryRepository> {
        let repo = MemoryRepository::new().with_learner(learner);
        let mut engine = GameEngine::new(curriculum, repo, Some(11));
        engine.load_learner("amina").unwrap();
        engine
    }

    fn engine() -> GameEngine<MemoryRepository> {
        engine_with(LearnerProfile::new("amina", "Amina"), Curriculum::builtin().unwrap())
    }

    fn correct_index(events: &[GameEvent]) -> usize {
        events
            .iter()
            .find_map(|e| match e {
                GameEvent::QuestionShown { question, .. } => Some(question.correct_option_index),
                _ => None,
            })
            .unwrap()
    }

    /// Answer every question right, returning the final events
    fn play_perfect(engine: &mut GameEngine<MemoryRepository>) -> Vec<GameEvent> {
        let mut events = engine.start_session().unwrap();
        loop {
            engine.submit_answer(correct_index(&events));
            events = engine.advance();
            if events.iter().any(|e| matches!(e, GameEvent::SessionFinished { .. })) {
                return events;
            }
        }
    }

    #[test]
    fn start_requires_learner() {
        let mut engine = GameEngine::new(Curriculum::builtin().unwrap(), MemoryRepository::new(), Some(1));
        assert!(matches!(engine.start_session(), Err(GameError::NoLearner)));
    }

    #[test]
    fn perfect_session_levels_up_and_persists() {
        let mut engine = engine();
        let events = play_perfect(&mut engine);

        let Some(GameEvent::SessionFinished { summary, report }) = events.first() else {
            panic!("expected session finished, got {events:?}");
        };
        assert_eq!(summary.total_questions, 5);
        // No ticks: 30 seconds left on each, 6 bonus points
        assert_eq!(summary.score, 16 + 18 + 20 + 22 + 24);
        assert!(report.leveled_up);

        let stored = &engine.repository().inner().store().learners["amina"];
        assert_eq!(stored.level, 2);
        assert_eq!(stored.cumulative_score, 100);
        assert_eq!(engine.learner().unwrap().cumulative_score, 100);
        assert_eq!(engine.repository().inner().store().scores.len(), 1);
    }

    #[test]
    fn late_timeout_is_ignored() {
        let mut engine = engine();
        let events = engine.start_session().unwrap();
        let answered = engine.submit_answer(correct_index(&events));
        assert!(matches!(answered.first(), Some(GameEvent::AnswerResolved { .. })));

        let score = engine.session().unwrap().score();
        assert!(engine.timeout().is_empty());
        assert!(engine.tick().is_empty());
        assert_eq!(engine.session().unwrap().score(), score);
    }

    #[test]
    fn ticks_count_down() {
        let mut engine = engine();
        engine.start_session().unwrap();
        assert_eq!(engine.tick(), vec![GameEvent::CountdownTick { remaining: 29 }]);
    }

    #[test]
    fn timeout_resolves_without_progress() {
        let mut engine = engine();
        engine.start_session().unwrap();
        let events = engine.timeout();
        let Some(GameEvent::AnswerResolved { resolution, combo, .. }) = events.first() else {
            panic!("expected resolution");
        };
        assert_eq!(resolution.outcome, Outcome::TimedOut);
        assert_eq!(*combo, None);
        assert!(engine.learner().unwrap().mastery.is_empty());
    }

    #[test]
    fn offline_store_does_not_block_finishing() {
        let mut engine = engine();
        engine.repository_mut().inner_mut().set_offline(true);

        let events = play_perfect(&mut engine);
        assert!(
            events.iter().any(|e| matches!(e, GameEvent::PersistencePending { .. })),
            "{events:?}"
        );
        assert_eq!(engine.learner().unwrap().level, 2);

        engine.repository_mut().inner_mut().set_offline(false);
        assert_eq!(engine.repository_mut().flush(), 0);
        let stored = &engine.repository().inner().store().learners["amina"];
        assert_eq!(stored.level, 2);
        assert_eq!(stored.cumulative_score, 100);
    }

    #[test]
    fn surah_mastered_fires_once() {
        let curriculum = Curriculum::new().with_juz(
            Juz::new(30).with_surah(
                Surah::new("Al-Kautsar", 108)
                    .with_ayah("innaa a'thainaaka")
                    .with_ayah("fashalli lirabbika")
                    .with_ayah("inna syaaniaka"),
            ),
        );
        let learner = LearnerProfile::new("amina", "Amina")
            .with_scope(ScopeSelection::new().with_juz(30, SurahFilter::only([108])));
        let mut engine = engine_with(learner, curriculum);

        let mut mastered = Vec::new();
        for _ in 0..3 {
            let mut events = engine.start_session().unwrap();
            loop {
                let resolved = engine.submit_answer(correct_index(&events));
                mastered.extend(resolved.into_iter().filter_map(|e| match e {
                    GameEvent::SurahMastered(m) => Some(m.surah_number),
                    _ => None,
                }));
                events = engine.advance();
                if events.iter().any(|e| matches!(e, GameEvent::SessionFinished { .. })) {
                    break;
                }
            }
        }

        assert_eq!(mastered, vec![108]);
        let stored = &engine.repository().inner().store().learners["amina"];
        assert!(stored.mastery[&108].is_completed);
    }

    #[test]
    fn surah_split_across_juz_can_be_completed() {
        let part = |range: std::ops::RangeInclusive<u32>| Surah {
            name: "Al-Baqarah".into(),
            number: 2,
            ayahs: range.map(|n| crate::curriculum::Ayah::new(n, format!("baqarah {n}"))).collect(),
        };
        let curriculum = Curriculum::new()
            .with_juz(Juz::new(1).with_surah(part(1..=4)))
            .with_juz(Juz::new(2).with_surah(part(5..=8)));
        let learner = LearnerProfile::new("amina", "Amina").with_scope(
            ScopeSelection::new().with_juz(1, SurahFilter::All).with_juz(2, SurahFilter::All),
        );
        let mut engine = engine_with(learner, curriculum);

        // From level 5 on every one of the seven pairs is asked each session
        for _ in 0..8 {
            play_perfect(&mut engine);
        }

        let record = &engine.learner().unwrap().mastery[&2];
        assert!(record.ayahs[&5].is_mastered(), "{:?}", record.ayahs);
        assert!(record.is_completed);
    }

    #[test]
    fn voice_results_feed_progress() {
        let mut engine = engine();
        let summary = VoiceSummary {
            correct_answers: vec![CorrectAnswer {
                surah_number: 112,
                surah_name: "Al-Ikhlas".into(),
                ayah_number: 2,
                response_time_seconds: Some(6),
            }],
            ..VoiceSummary::default()
        };
        assert!(engine.record_voice_summary(&summary).is_empty());
        let record = &engine.learner().unwrap().mastery[&112];
        assert_eq!(record.ayahs[&2].correct_count, 1);
    }
}
