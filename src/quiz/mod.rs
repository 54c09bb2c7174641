//! Quiz engine: question generation, session state and countdown
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `scope`     | Which juz and surahs a learner is assigned |
//! | `generator` | Builds question lists with distractors from the curriculum |
//! | `session`   | Session state machine, timer rules and scoring |
//! | `countdown` | Cancellable async per-question countdown |
//! | `error`     | `QuizError` |

pub mod countdown;
pub mod error;
pub mod generator;
pub mod scope;
pub mod session;

pub use countdown::{Countdown, CountdownEvent, CountdownOutcome};
pub use error::QuizError;
pub use generator::{AnswerOption, QuestionItem, generate};
pub use scope::{DEFAULT_JUZ, ScopeSelection, SurahFilter};
pub use session::{
    Advance, CorrectAnswer, Difficulty, Outcome, Phase, Resolution, Session, SessionSettings,
    SessionSummary,
};
