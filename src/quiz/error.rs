//! Error types for question generation and session play

use thiserror::Error;

/// Errors raised by the question generator and session state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The learner's scope yields no ayah pairs
    #[error("No questions available for the selected juz and surahs")]
    EmptyCandidatePool,

    /// The learner has no juz assigned
    #[error("No juz assigned. Assign at least one juz before playing")]
    EmptyScope,

    /// A session was started with an empty question list
    #[error("Cannot start a session without questions")]
    NoQuestions,

    /// An operation arrived while the session was in the wrong state
    #[error("Cannot {operation} while the session is {state}")]
    InvalidStateTransition {
        /// Operation that was attempted
        operation: &'static str,
        /// State the session was in
        state: &'static str,
    },
}

impl QuizError {
    /// Check if this is a "no content" condition the learner can fix by
    /// changing their assignment, as opposed to a UI sync bug
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuizError::EmptyCandidatePool | QuizError::EmptyScope)
    }
}
