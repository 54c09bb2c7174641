//! Profile repository interface and the in-memory implementation

use std::collections::BTreeMap;

use super::error::RepositoryError;
use super::model::{LearnerProfile, ScoreEntry};
use crate::progress::SurahMastery;

/// Storage for learner profiles and the score log.
///
/// Writes are last-writer-wins per learner; nothing is merged.
pub trait ProfileRepository {
    fn get_learner(&self, id: &str) -> Result<LearnerProfile, RepositoryError>;

    /// All learners, ordered by id
    fn list_learners(&self) -> Result<Vec<LearnerProfile>, RepositoryError>;

    /// Insert or replace a whole profile
    fn save_learner(&mut self, profile: &LearnerProfile) -> Result<(), RepositoryError>;

    fn update_level(&mut self, id: &str, level: u32) -> Result<(), RepositoryError>;

    fn update_mastery_record(
        &mut self,
        id: &str,
        surah_number: u32,
        record: &SurahMastery,
    ) -> Result<(), RepositoryError>;

    /// Append to the score log and add the score to the learner's total
    fn append_score_entry(&mut self, entry: &ScoreEntry) -> Result<(), RepositoryError>;

    /// Score log entries for one learner, oldest first
    fn score_entries(&self, id: &str) -> Result<Vec<ScoreEntry>, RepositoryError>;
}

/// Profiles and score log held in plain collections.
///
/// Shared by the in-memory and JSON-file repositories.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ProfileStore {
    #[serde(default)]
    pub learners: BTreeMap<String, LearnerProfile>,
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
}

impl ProfileStore {
    pub fn get(&self, id: &str) -> Result<LearnerProfile, RepositoryError> {
        self.learners.get(id).cloned().ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut LearnerProfile, RepositoryError> {
        self.learners.get_mut(id).ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    pub fn save(&mut self, profile: &LearnerProfile) {
        self.learners.insert(profile.id.clone(), profile.clone());
    }

    pub fn set_level(&mut self, id: &str, level: u32) -> Result<(), RepositoryError> {
        let learner = self.get_mut(id)?;
        // Levels never go down, even if a stale write arrives late
        learner.level = learner.level.max(level);
        Ok(())
    }

    pub fn set_mastery(
        &mut self,
        id: &str,
        surah_number: u32,
        record: &SurahMastery,
    ) -> Result<(), RepositoryError> {
        self.get_mut(id)?.mastery.insert(surah_number, record.clone());
        Ok(())
    }

    pub fn append_score(&mut self, entry: &ScoreEntry) -> Result<(), RepositoryError> {
        self.get_mut(&entry.learner_id)?.cumulative_score += u64::from(entry.score);
        self.scores.push(entry.clone());
        Ok(())
    }

    pub fn scores_for(&self, id: &str) -> Vec<ScoreEntry> {
        self.scores.iter().filter(|e| e.learner_id == id).cloned().collect()
    }
}

/// Repository kept entirely in memory.
///
/// Can be switched offline to simulate an unreachable store.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    store: ProfileStore,
    offline: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learner(mut self, profile: LearnerProfile) -> Self {
        self.store.save(&profile);
        self
    }

    /// Make every call fail with [`RepositoryError::Unavailable`] until
    /// switched back
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Direct view of the stored data
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut ProfileStore {
        &mut self.store
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline {
            Err(RepositoryError::Unavailable("memory repository is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ProfileRepository for MemoryRepository {
    fn get_learner(&self, id: &str) -> Result<LearnerProfile, RepositoryError> {
        self.check()?;
        self.store.get(id)
    }

    fn list_learners(&self) -> Result<Vec<LearnerProfile>, RepositoryError> {
        self.check()?;
        Ok(self.store.learners.values().cloned().collect())
    }

    fn save_learner(&mut self, profile: &LearnerProfile) -> Result<(), RepositoryError> {
        self.check()?;
        self.store.save(profile);
        Ok(())
    }

    fn update_level(&mut self, id: &str, level: u32) -> Result<(), RepositoryError> {
        self.check()?;
        self.store.set_level(id, level)
    }

    fn update_mastery_record(
        &mut self,
        id: &str,
        surah_number: u32,
        record: &SurahMastery,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        self.store.set_mastery(id, surah_number, record)
    }

    fn append_score_entry(&mut self, entry: &ScoreEntry) -> Result<(), RepositoryError> {
        self.check()?;
        self.store.append_score(entry)
    }

    fn score_entries(&self, id: &str) -> Result<Vec<ScoreEntry>, RepositoryError> {
        self.check()?;
        Ok(self.store.scores_for(id))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::quiz::Difficulty;

    pub(crate) fn entry(learner_id: &str, score: u32) -> ScoreEntry {
        ScoreEntry {
            learner_id: learner_id.to_string(),
            name: learner_id.to_uppercase(),
            score,
            correct: 4,
            total: 5,
            best_streak: 3,
            difficulty: Difficulty::Easy,
            juz: vec![30],
            recorded_at: 1_700_000_000,
        }
    }

    #[test]
    fn score_entries_fold_into_total() {
        let mut repo = MemoryRepository::new().with_learner(LearnerProfile::new("amina", "Amina"));
        repo.append_score_entry(&entry("amina", 40)).unwrap();
        repo.append_score_entry(&entry("amina", 25)).unwrap();

        assert_eq!(repo.get_learner("amina").unwrap().cumulative_score, 65);
        assert_eq!(repo.score_entries("amina").unwrap().len(), 2);
    }

    #[test]
    fn unknown_learner_is_not_found() {
        let mut repo = MemoryRepository::new();
        assert!(matches!(repo.get_learner("ghost"), Err(RepositoryError::NotFound(_))));
        assert!(matches!(repo.update_level("ghost", 3), Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn level_never_decreases() {
        let mut profile = LearnerProfile::new("amina", "Amina");
        profile.level = 4;
        let mut repo = MemoryRepository::new().with_learner(profile);
        repo.update_level("amina", 2).unwrap();
        assert_eq!(repo.get_learner("amina").unwrap().level, 4);
    }

    #[test]
    fn offline_rejects_everything() {
        let mut repo = MemoryRepository::new().with_learner(LearnerProfile::new("amina", "Amina"));
        repo.set_offline(true);
        let err = repo.get_learner("amina").unwrap_err();
        assert!(err.is_retryable());
        assert!(repo.update_level("amina", 2).is_err());

        repo.set_offline(false);
        assert!(repo.get_learner("amina").is_ok());
    }
}
