//! Per-ayah mastery tracking
//!
//! Each learner has one [`SurahMastery`] per surah they have answered
//! correctly at least once. A surah is completed when every ayah from 2
//! through the last has been answered correctly [`MASTERY_THRESHOLD`] times.

use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::quiz::CorrectAnswer;

/// Correct answers needed before an ayah counts as memorized
pub const MASTERY_THRESHOLD: u32 = 2;

/// Current on-disk record version
pub const RECORD_VERSION: u32 = 2;

/// Best time value older records used to mean "never timed"
const LEGACY_NO_TIME: f64 = 999.0;

/// Counters for one ayah transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AyahMastery {
    /// Times this ayah was picked correctly. Never decreases.
    pub correct_count: u32,
    /// Fastest correct response. Only ever decreases.
    pub best_response_time_seconds: Option<u32>,
}

impl AyahMastery {
    /// Check if this ayah has reached the mastery threshold
    pub fn is_mastered(&self) -> bool {
        self.correct_count >= MASTERY_THRESHOLD
    }

    fn record(&mut self, response_time_seconds: Option<u32>) {
        self.correct_count += 1;
        if let Some(time) = response_time_seconds {
            self.best_response_time_seconds =
                Some(self.best_response_time_seconds.map_or(time, |best| best.min(time)));
        }
    }
}

/// Mastery state for one surah
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSurahMastery")]
pub struct SurahMastery {
    /// Record format version
    pub version: u32,
    /// Surah display name
    pub surah_name: String,
    /// Counters keyed by ayah number
    pub ayahs: BTreeMap<u32, AyahMastery>,
    /// Set once every transition is mastered
    pub is_completed: bool,
    /// Unix timestamp of completion
    pub completed_at: Option<i64>,
}

impl SurahMastery {
    /// Create an empty record
    pub fn new(surah_name: impl Into<String>) -> Self {
        Self {
            version: RECORD_VERSION,
            surah_name: surah_name.into(),
            ayahs: BTreeMap::new(),
            is_completed: false,
            completed_at: None,
        }
    }

    /// Number of ayahs at or above the mastery threshold
    pub fn mastered_count(&self) -> usize {
        self.ayahs.values().filter(|a| a.is_mastered()).count()
    }

    /// Sum of best times of the mastered ayahs
    pub fn mastered_best_time(&self) -> u32 {
        self.ayahs
            .values()
            .filter(|a| a.is_mastered())
            .filter_map(|a| a.best_response_time_seconds)
            .sum()
    }

    /// Check whether every transition 2..=`total_ayahs` is mastered
    pub fn all_transitions_mastered(&self, total_ayahs: u32) -> bool {
        total_ayahs >= 2
            && (2..=total_ayahs).all(|n| self.ayahs.get(&n).is_some_and(AyahMastery::is_mastered))
    }
}

/// All of one learner's surah records, keyed by surah number
pub type MasteryBook = BTreeMap<u32, SurahMastery>;

/// Ayah entry as found on disk: a bare count in early records, a
/// structured record later
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StoredAyah {
    Count(u32),
    Record {
        #[serde(alias = "count")]
        correct_count: u32,
        #[serde(default, alias = "bestTime")]
        best_response_time_seconds: Option<f64>,
    },
}

impl From<StoredAyah> for AyahMastery {
    fn from(stored: StoredAyah) -> Self {
        match stored {
            StoredAyah::Count(correct_count) => {
                AyahMastery { correct_count, best_response_time_seconds: None }
            }
            StoredAyah::Record { correct_count, best_response_time_seconds } => AyahMastery {
                correct_count,
                best_response_time_seconds: best_response_time_seconds
                    .filter(|t| *t >= 0.0 && *t < LEGACY_NO_TIME)
                    .map(|t| t.round() as u32),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct StoredSurahMastery {
    #[serde(default)]
    version: u32,
    #[serde(default, alias = "surahName")]
    surah_name: String,
    #[serde(default)]
    ayahs: BTreeMap<u32, StoredAyah>,
    #[serde(default, alias = "isCompleted")]
    is_completed: bool,
    #[serde(default, alias = "completedAt")]
    completed_at: Option<serde_json::Value>,
}

impl From<StoredSurahMastery> for SurahMastery {
    fn from(stored: StoredSurahMastery) -> Self {
        if stored.version < RECORD_VERSION {
            tracing::debug!("Migrating mastery record for {} from v{}", stored.surah_name, stored.version);
        }
        Self {
            version: RECORD_VERSION,
            surah_name: stored.surah_name,
            ayahs: stored.ayahs.into_iter().map(|(n, a)| (n, a.into())).collect(),
            is_completed: stored.is_completed,
            // Older records stored an ISO string here; only unix seconds are kept
            completed_at: stored.completed_at.and_then(|v| v.as_i64()),
        }
    }
}

/// Notification that a learner finished memorizing a surah
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurahMastered {
    pub learner_id: String,
    pub surah_number: u32,
    pub surah_name: String,
    pub completed_at: i64,
}

/// Result of recording one correct answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub surah_number: u32,
    /// The surah record after the update, ready to persist
    pub record: SurahMastery,
    /// Present only when this answer completed the surah
    pub mastered: Option<SurahMastered>,
}

/// Tracks mastery for every learner, each in its own book
#[derive(Debug, Default)]
pub struct ProgressTracker {
    learners: HashMap<String, MasteryBook>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a learner's book with one loaded from storage
    pub fn load(&mut self, learner_id: &str, book: MasteryBook) {
        self.learners.insert(learner_id.to_string(), book);
    }

    /// A learner's current book
    pub fn book(&self, learner_id: &str) -> Option<&MasteryBook> {
        self.learners.get(learner_id)
    }

    /// Record a correct answer.
    ///
    /// `total_ayahs` is the surah's ayah count from the curriculum. Without
    /// it, completion is not evaluated.
    pub fn record_correct_answer(
        &mut self,
        learner_id: &str,
        answer: &CorrectAnswer,
        total_ayahs: Option<u32>,
    ) -> ProgressUpdate {
        self.record_correct_answer_at(learner_id, answer, total_ayahs, unix_now())
    }

    /// [`ProgressTracker::record_correct_answer`] with an explicit clock
    pub fn record_correct_answer_at(
        &mut self,
        learner_id: &str,
        answer: &CorrectAnswer,
        total_ayahs: Option<u32>,
        now: i64,
    ) -> ProgressUpdate {
        let book = self.learners.entry(learner_id.to_string()).or_default();
        let record = book
            .entry(answer.surah_number)
            .or_insert_with(|| SurahMastery::new(answer.surah_name.clone()));

        record.ayahs.entry(answer.ayah_number).or_default().record(answer.response_time_seconds);

        let mut mastered = None;
        if let Some(total) = total_ayahs {
            if !record.is_completed && record.all_transitions_mastered(total) {
                record.is_completed = true;
                record.completed_at = Some(now);
                tracing::info!("Learner {} completed surah {}", learner_id, record.surah_name);
                mastered = Some(SurahMastered {
                    learner_id: learner_id.to_string(),
                    surah_number: answer.surah_number,
                    surah_name: record.surah_name.clone(),
                    completed_at: now,
                });
            }
        }

        ProgressUpdate { surah_number: answer.surah_number, record: record.clone(), mastered }
    }
}

fn unix_now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or_default()
}
