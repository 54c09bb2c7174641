//! Best-effort wrapper that keeps gameplay going when the store is down

use std::collections::{BTreeMap, VecDeque};

use super::error::RepositoryError;
use super::model::{LearnerProfile, ScoreEntry};
use super::repository::ProfileRepository;
use crate::progress::SurahMastery;

/// A write that has not reached the inner repository yet
#[derive(Debug, Clone, PartialEq)]
enum PendingWrite {
    Learner(LearnerProfile),
    Level { id: String, level: u32 },
    Mastery { id: String, surah_number: u32, record: SurahMastery },
    Score(ScoreEntry),
}

impl PendingWrite {
    /// Check if `newer` makes this write redundant
    fn superseded_by(&self, newer: &PendingWrite) -> bool {
        match (self, newer) {
            (PendingWrite::Learner(a), PendingWrite::Learner(b)) => a.id == b.id,
            (PendingWrite::Level { id: a, .. }, PendingWrite::Level { id: b, .. }) => a == b,
            (
                PendingWrite::Mastery { id: a, surah_number: sa, .. },
                PendingWrite::Mastery { id: b, surah_number: sb, .. },
            ) => a == b && sa == sb,
            _ => false,
        }
    }

    fn apply<R: ProfileRepository>(&self, inner: &mut R) -> Result<(), RepositoryError> {
        match self {
            PendingWrite::Learner(profile) => inner.save_learner(profile),
            PendingWrite::Level { id, level } => inner.update_level(id, *level),
            PendingWrite::Mastery { id, surah_number, record } => {
                inner.update_mastery_record(id, *surah_number, record)
            }
            PendingWrite::Score(entry) => inner.append_score_entry(entry),
        }
    }
}

/// Wraps a repository with a profile cache and a retry queue.
///
/// Reads fall back to the cache when the inner store fails. Writes that
/// fail with a retryable error are queued and reported as success; the
/// queue is flushed before each later write. Score entries keep their
/// order, other writes coalesce last-writer-wins.
#[derive(Debug)]
pub struct ResilientRepository<R> {
    inner: R,
    cache: BTreeMap<String, LearnerProfile>,
    pending: VecDeque<PendingWrite>,
}

impl<R: ProfileRepository> ResilientRepository<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, cache: BTreeMap::new(), pending: VecDeque::new() }
    }

    /// Writes waiting for the store to come back
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Retry queued writes in order, stopping at the first retryable
    /// failure. Returns how many are still queued.
    pub fn flush(&mut self) -> usize {
        while let Some(write) = self.pending.front() {
            match write.apply(&mut self.inner) {
                Ok(()) => {
                    self.pending.pop_front();
                }
                Err(e) if e.is_retryable() => {
                    tracing::debug!("Profile store still unavailable: {}", e);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Dropping queued profile write: {}", e);
                    self.pending.pop_front();
                }
            }
        }
        self.pending.len()
    }

    fn enqueue(&mut self, write: PendingWrite) {
        self.pending.retain(|queued| !queued.superseded_by(&write));
        self.pending.push_back(write);
    }

    fn write(&mut self, write: PendingWrite) -> Result<(), RepositoryError> {
        if self.flush() > 0 {
            self.enqueue(write);
            return Ok(());
        }

        match write.apply(&mut self.inner) {
            Ok(()) => Ok(()),
            Err(e) if e.is_retryable() => {
                tracing::warn!("Profile write failed, keeping it in memory: {}", e);
                self.enqueue(write);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn cached(&self, id: &str) -> Option<&LearnerProfile> {
        self.cache.get(id)
    }
}

impl<R: ProfileRepository> ProfileRepository for ResilientRepository<R> {
    fn get_learner(&self, id: &str) -> Result<LearnerProfile, RepositoryError> {
        // The store is behind while writes are queued
        if !self.pending.is_empty() {
            if let Some(profile) = self.cached(id) {
                return Ok(profile.clone());
            }
        }

        match self.inner.get_learner(id) {
            Ok(profile) => Ok(profile),
            Err(e) if e.is_retryable() => {
                if let Some(profile) = self.cached(id) {
                    tracing::warn!("Using cached profile for {}: {}", id, e);
                    Ok(profile.clone())
                } else {
                    Err(e)
                }
            }
            Err(e) => Err(e),
        }
    }

    fn list_learners(&self) -> Result<Vec<LearnerProfile>, RepositoryError> {
        match self.inner.list_learners() {
            Ok(learners) if self.pending.is_empty() => Ok(learners),
            Ok(learners) => {
                let mut merged: BTreeMap<String, LearnerProfile> =
                    learners.into_iter().map(|p| (p.id.clone(), p)).collect();
                merged.extend(self.cache.iter().map(|(id, p)| (id.clone(), p.clone())));
                Ok(merged.into_values().collect())
            }
            Err(e) if e.is_retryable() && !self.cache.is_empty() => {
                tracing::warn!("Listing cached profiles: {}", e);
                Ok(self.cache.values().cloned().collect())
            }
            Err(e) => Err(e),
        }
    }

    fn save_learner(&mut self, profile: &LearnerProfile) -> Result<(), RepositoryError> {
        self.write(PendingWrite::Learner(profile.clone()))?;
        self.cache.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    fn update_level(&mut self, id: &str, level: u32) -> Result<(), RepositoryError> {
        self.write(PendingWrite::Level { id: id.to_string(), level })?;
        if let Some(profile) = self.cache.get_mut(id) {
            profile.level = profile.level.max(level);
        }
        Ok(())
    }

    fn update_mastery_record(
        &mut self,
        id: &str,
        surah_number: u32,
        record: &SurahMastery,
    ) -> Result<(), RepositoryError> {
        self.write(PendingWrite::Mastery { id: id.to_string(), surah_number, record: record.clone() })?;
        if let Some(profile) = self.cache.get_mut(id) {
            profile.mastery.insert(surah_number, record.clone());
        }
        Ok(())
    }

    fn append_score_entry(&mut self, entry: &ScoreEntry) -> Result<(), RepositoryError> {
        self.write(PendingWrite::Score(entry.clone()))?;
        // A queued write counts as accepted; a rejected one leaves the cache alone
        if let Some(profile) = self.cache.get_mut(&entry.learner_id) {
            profile.cumulative_score += u64::from(entry.score);
        }
        Ok(())
    }

    fn score_entries(&self, id: &str) -> Result<Vec<ScoreEntry>, RepositoryError> {
        let mut entries = self.inner.score_entries(id).or_else(|e| {
            if e.is_retryable() { Ok(Vec::new()) } else { Err(e) }
        })?;
        entries.extend(self.pending.iter().filter_map(|write| match write {
            PendingWrite::Score(entry) if entry.learner_id == id => Some(entry.clone()),
            _ => None,
        }));
        Ok(entries)
    }
}

impl<R: ProfileRepository> ResilientRepository<R> {
    /// Fetch a learner and remember the result for offline reads
    pub fn load_learner(&mut self, id: &str) -> Result<LearnerProfile, RepositoryError> {
        let profile = self.get_learner(id)?;
        self.cache.insert(id.to_string(), profile.clone());
        Ok(profile)
    }
}
