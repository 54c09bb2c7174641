//! A learner's past sessions, summarized from the score log

use crate::profile::ScoreEntry;

/// Totals over every logged session plus the most recent few
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreHistory {
    pub sessions: usize,
    pub total_score: u64,
    pub best_score: u32,
    pub correct: u64,
    pub answered: u64,
    /// Newest first
    pub recent: Vec<ScoreEntry>,
}

impl ScoreHistory {
    /// Summarize a log ordered oldest first, keeping at most `limit` recent entries
    pub fn from_entries(entries: &[ScoreEntry], limit: usize) -> Self {
        let mut history = Self { sessions: entries.len(), ..Self::default() };
        for entry in entries {
            history.total_score += u64::from(entry.score);
            history.best_score = history.best_score.max(entry.score);
            history.correct += u64::from(entry.correct);
            history.answered += u64::from(entry.total);
        }
        history.recent = entries.iter().rev().take(limit).cloned().collect();
        history
    }

    /// Share of questions answered correctly, rounded down
    pub fn accuracy_percent(&self) -> u32 {
        if self.answered == 0 {
            return 0;
        }
        (self.correct * 100 / self.answered) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.sessions == 0
    }
}
