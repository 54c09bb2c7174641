//! Per-learner memorization progress and leaderboards

pub mod history;
pub mod leaderboard;
pub mod mastery;

pub use history::ScoreHistory;
pub use leaderboard::{HafalanEntry, ScoreEntryRow, best_surah, hafalan_leaderboard, score_leaderboard};
pub use mastery::{
    AyahMastery, MASTERY_THRESHOLD, MasteryBook, ProgressTracker, ProgressUpdate, SurahMastered,
    SurahMastery,
};
