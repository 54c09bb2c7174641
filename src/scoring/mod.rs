//! Score and level aggregation
//!
//! Folds a finished session into the learner's cumulative score and level.
//! Level and difficulty move on separate axes: level gates question count,
//! option count and timer bands, while cumulative score picks the
//! easy/medium/hard tier.

pub mod badges;
pub mod feedback;

pub use badges::{Badge, ComboTier, ResultGrade};
pub use feedback::{MessageKind, motivational_message};

use crate::profile::LearnerProfile;
use crate::quiz::{Difficulty, QuizError, Session};

/// Percentage of correct answers needed to level up
pub const LEVEL_UP_PERCENT: u32 = 80;

/// What finishing a session changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    pub session_id: String,
    pub delta_score: u64,
    pub new_cumulative_score: u64,
    pub leveled_up: bool,
    pub previous_level: u32,
    pub new_level: u32,
    /// Badge unlocked by this level-up
    pub new_badge: Option<Badge>,
    pub grade: ResultGrade,
    /// Tier the next session will be played at
    pub next_difficulty: Difficulty,
}

/// Check the level-up rule without floating point
pub fn qualifies_for_level_up(correct: u32, total: u32) -> bool {
    total > 0 && correct * 100 >= total * LEVEL_UP_PERCENT
}

/// Apply a finished session to `profile`.
///
/// Calling this again for the same session returns the first report and
/// leaves the profile alone.
pub fn finalize(session: &mut Session, profile: &mut LearnerProfile) -> Result<FinalizeReport, QuizError> {
    if let Some(report) = session.report() {
        return Ok(report.clone());
    }

    let summary = session.summary().ok_or(QuizError::InvalidStateTransition {
        operation: "finalize",
        state: "unfinished",
    })?;

    let delta_score = u64::from(summary.score);
    let previous_level = profile.level;
    profile.cumulative_score += delta_score;

    let leveled_up = qualifies_for_level_up(summary.correct_count, summary.total_questions);
    if leveled_up {
        profile.level += 1;
        tracing::info!("Learner {} reached level {}", profile.id, profile.level);
    }

    let report = FinalizeReport {
        session_id: summary.session_id.clone(),
        delta_score,
        new_cumulative_score: profile.cumulative_score,
        leveled_up,
        previous_level,
        new_level: profile.level,
        new_badge: leveled_up.then(|| Badge::unlocked_at(profile.level)).flatten(),
        grade: ResultGrade::from_percentage(summary.percentage()),
        next_difficulty: Difficulty::from_cumulative_score(profile.cumulative_score),
    };

    session.set_report(report.clone());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::quiz::SessionSettings;
    use crate::quiz::session::tests::questions;

    /// Play `total` questions answering the first `correct` of them right
    fn finished_session(correct: u32, total: u32) -> Session {
        let mut session = Session::new("S-1", SessionSettings::for_learner(1, None, 0));
        session.start(questions(total)).unwrap();
        for i in 0..total {
            for _ in 0..20 {
                session.tick().unwrap();
            }
            session.submit_answer(if i < correct { 1 } else { 0 }).unwrap();
            session.advance().unwrap();
        }
        session
    }

    #[test]
    fn level_up_boundary() {
        assert!(qualifies_for_level_up(4, 5));
        assert!(!qualifies_for_level_up(3, 4));
        assert!(qualifies_for_level_up(12, 15));
        assert!(!qualifies_for_level_up(0, 0));
    }

    #[test]
    fn perfect_session_levels_up_once() {
        let mut session = finished_session(5, 5);
        let mut profile = LearnerProfile::new("amina", "Amina");

        let report = finalize(&mut session, &mut profile).unwrap();
        assert_eq!(report.delta_score, 80);
        assert_eq!(report.new_cumulative_score, 80);
        assert!(report.leveled_up);
        assert_eq!(report.previous_level, 1);
        assert_eq!(report.new_level, 2);
        assert_eq!(report.grade, ResultGrade::Mumtaz);
        assert_eq!(report.new_badge, None);
        assert_eq!(profile.level, 2);
    }

    #[test]
    fn finalize_twice_does_not_double_count() {
        let mut session = finished_session(5, 5);
        let mut profile = LearnerProfile::new("amina", "Amina");

        let first = finalize(&mut session, &mut profile).unwrap();
        let second = finalize(&mut session, &mut profile).unwrap();
        assert_eq!(first, second);
        assert_eq!(profile.cumulative_score, 80);
        assert_eq!(profile.level, 2);
    }

    #[test]
    fn below_threshold_keeps_level() {
        let mut session = finished_session(3, 4);
        let mut profile = LearnerProfile::new("amina", "Amina");
        profile.level = 6;

        let report = finalize(&mut session, &mut profile).unwrap();
        assert!(!report.leveled_up);
        assert_eq!(report.new_level, 6);
        assert_eq!(report.grade, ResultGrade::JayyidJiddan);
    }

    #[test]
    fn zero_correct_still_finalizes() {
        let mut session = finished_session(0, 3);
        let mut profile = LearnerProfile::new("amina", "Amina");
        profile.cumulative_score = 150;

        let report = finalize(&mut session, &mut profile).unwrap();
        assert_eq!(report.delta_score, 0);
        assert_eq!(report.new_cumulative_score, 150);
        assert_eq!(report.grade, ResultGrade::TetapSemangat);
    }

    #[test]
    fn reaching_badge_level_reports_badge() {
        let mut session = finished_session(5, 5);
        let mut profile = LearnerProfile::new("amina", "Amina");
        profile.level = 2;

        let report = finalize(&mut session, &mut profile).unwrap();
        assert_eq!(report.new_badge, Some(Badge::BintangHafalan));
    }

    #[test]
    fn crossing_score_band_changes_next_difficulty() {
        let mut session = finished_session(5, 5);
        let mut profile = LearnerProfile::new("amina", "Amina");
        profile.cumulative_score = 150;

        let report = finalize(&mut session, &mut profile).unwrap();
        assert_eq!(report.new_cumulative_score, 230);
        assert_eq!(report.next_difficulty, Difficulty::Medium);
    }

    #[test]
    fn unfinished_session_is_rejected() {
        let mut session = Session::new("S-2", SessionSettings::for_learner(1, None, 0));
        session.start(questions(2)).unwrap();
        let mut profile = LearnerProfile::new("amina", "Amina");

        assert!(matches!(
            finalize(&mut session, &mut profile),
            Err(QuizError::InvalidStateTransition { operation: "finalize", .. })
        ));
        assert_eq!(profile.cumulative_score, 0);
    }
}
