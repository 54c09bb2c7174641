//! Learner profile and score log entries

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::progress::MasteryBook;
use crate::quiz::{Difficulty, ScopeSelection, SessionSettings, SessionSummary};

fn default_level() -> u32 {
    1
}

/// A learner and everything the engine remembers about them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub id: String,
    pub name: String,

    /// Skill level, starting at 1. Never decreases.
    #[serde(default = "default_level")]
    pub level: u32,

    #[serde(default)]
    pub cumulative_score: u64,

    /// Assigned juz and surahs. Profiles saved without one get juz 30.
    #[serde(default = "ScopeSelection::default_assignment")]
    pub scope: ScopeSelection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_override_seconds: Option<u32>,

    #[serde(default)]
    pub voice_enabled: bool,

    #[serde(default)]
    pub mastery: MasteryBook,
}

impl LearnerProfile {
    /// A level 1 learner assigned the default scope
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: default_level(),
            cumulative_score: 0,
            scope: ScopeSelection::default_assignment(),
            timer_override_seconds: None,
            voice_enabled: false,
            mastery: MasteryBook::new(),
        }
    }

    pub fn with_scope(mut self, scope: ScopeSelection) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_timer_override(mut self, seconds: Option<u32>) -> Self {
        self.timer_override_seconds = seconds;
        self
    }

    /// Session parameters for this learner's next session
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings::for_learner(self.level, self.timer_override_seconds, self.cumulative_score)
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_cumulative_score(self.cumulative_score)
    }
}

/// Changes to a learner's settings. A `None` field keeps what the learner has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearnerEdit {
    pub name: Option<String>,
    pub scope: Option<ScopeSelection>,
    /// `Some(None)` clears the override
    pub timer_override_seconds: Option<Option<u32>>,
    pub voice_enabled: Option<bool>,
}

impl LearnerEdit {
    /// Apply to an existing learner, or to a new one with the default scope
    pub fn apply(self, id: &str, existing: Option<LearnerProfile>) -> LearnerProfile {
        let mut profile = match existing {
            Some(profile) => profile,
            None => LearnerProfile::new(id, self.name.clone().unwrap_or_else(|| id.to_string())),
        };
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(scope) = self.scope {
            profile.scope = scope;
        }
        if let Some(timer) = self.timer_override_seconds {
            profile.timer_override_seconds = timer;
        }
        if let Some(voice) = self.voice_enabled {
            profile.voice_enabled = voice;
        }
        profile
    }
}

/// One finished session, as appended to the score log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub learner_id: String,
    pub name: String,
    pub score: u32,
    pub correct: u32,
    pub total: u32,
    pub best_streak: u32,
    pub difficulty: Difficulty,
    /// Juz the learner was assigned when playing
    pub juz: Vec<u32>,
    /// Unix timestamp
    pub recorded_at: i64,
}

impl ScoreEntry {
    pub fn from_summary(profile: &LearnerProfile, summary: &SessionSummary) -> Self {
        Self {
            learner_id: profile.id.clone(),
            name: profile.name.clone(),
            score: summary.score,
            correct: summary.correct_count,
            total: summary.total_questions,
            best_streak: summary.best_streak,
            difficulty: summary.difficulty,
            juz: profile.scope.juz_numbers(),
            recorded_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or_default(),
        }
    }
}
