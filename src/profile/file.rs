//! Profile repository backed by one JSON file

use std::path::{Path, PathBuf};

use super::error::RepositoryError;
use super::model::{LearnerProfile, ScoreEntry};
use super::repository::{ProfileRepository, ProfileStore};
use crate::progress::SurahMastery;

/// Stores every learner and the score log in a single `profiles.json`.
///
/// The whole file is rewritten after each change.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    store: ProfileStore,
}

impl JsonFileRepository {
    /// File name inside the data directory
    pub const FILE_NAME: &'static str = "profiles.json";

    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let store = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| RepositoryError::Io { path: path.clone(), source })?;
            serde_json::from_str(&contents)?
        } else {
            ProfileStore::default()
        };
        Ok(Self { path, store })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), RepositoryError> {
        let io_err = |source| RepositoryError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = serde_json::to_string_pretty(&self.store)?;
        std::fs::write(&self.path, contents).map_err(io_err)
    }

    /// Apply a change and write the file, rolling back if the write fails
    fn write_with(
        &mut self,
        change: impl FnOnce(&mut ProfileStore) -> Result<(), RepositoryError>,
    ) -> Result<(), RepositoryError> {
        let before = self.store.clone();
        change(&mut self.store)?;
        if let Err(e) = self.persist() {
            self.store = before;
            return Err(e);
        }
        Ok(())
    }
}

impl ProfileRepository for JsonFileRepository {
    fn get_learner(&self, id: &str) -> Result<LearnerProfile, RepositoryError> {
        self.store.get(id)
    }

    fn list_learners(&self) -> Result<Vec<LearnerProfile>, RepositoryError> {
        Ok(self.store.learners.values().cloned().collect())
    }

    fn save_learner(&mut self, profile: &LearnerProfile) -> Result<(), RepositoryError> {
        self.write_with(|store| {
            store.save(profile);
            Ok(())
        })
    }

    fn update_level(&mut self, id: &str, level: u32) -> Result<(), RepositoryError> {
        self.write_with(|store| store.set_level(id, level))
    }

    fn update_mastery_record(
        &mut self,
        id: &str,
        surah_number: u32,
        record: &SurahMastery,
    ) -> Result<(), RepositoryError> {
        self.write_with(|store| store.set_mastery(id, surah_number, record))
    }

    fn append_score_entry(&mut self, entry: &ScoreEntry) -> Result<(), RepositoryError> {
        self.write_with(|store| store.append_score(entry))
    }

    fn score_entries(&self, id: &str) -> Result<Vec<ScoreEntry>, RepositoryError> {
        Ok(self.store.scores_for(id))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::profile::repository::tests::entry;
    use crate::progress::AyahMastery;

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("profiles.json")).unwrap();
        assert!(repo.list_learners().unwrap().is_empty());
    }

    #[test]
    fn changes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(JsonFileRepository::FILE_NAME);

        let mut repo = JsonFileRepository::open(&path).unwrap();
        repo.save_learner(&LearnerProfile::new("amina", "Amina")).unwrap();
        repo.update_level("amina", 3).unwrap();
        let mut record = SurahMastery::new("An-Nas");
        record.ayahs.insert(2, AyahMastery { correct_count: 2, best_response_time_seconds: Some(5) });
        repo.update_mastery_record("amina", 114, &record).unwrap();
        repo.append_score_entry(&entry("amina", 55)).unwrap();

        let reopened = JsonFileRepository::open(&path).unwrap();
        let profile = reopened.get_learner("amina").unwrap();
        assert_eq!(profile.level, 3);
        assert_eq!(profile.cumulative_score, 55);
        assert_eq!(profile.mastery[&114], record);
        assert_eq!(reopened.score_entries("amina").unwrap(), vec![entry("amina", 55)]);
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileRepository::open(&path).unwrap_err();
        assert!(matches!(err, RepositoryError::Json(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn migrates_legacy_mastery_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(
            &path,
            r#"{"learners":{"amina":{"id":"amina","name":"Amina","level":2,
                "mastery":{"112":{"surahName":"Al-Ikhlas","ayahs":{"2":2,"3":{"count":1,"bestTime":999}}}}}}}"#,
        )
        .unwrap();

        let repo = JsonFileRepository::open(&path).unwrap();
        let profile = repo.get_learner("amina").unwrap();
        let record = &profile.mastery[&112];
        assert_eq!(record.ayahs[&2].correct_count, 2);
        assert_eq!(record.ayahs[&3].best_response_time_seconds, None);
    }
}
