//! Learner curriculum assignment

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::QuizError;

/// Juz assigned when a learner has never been given an explicit scope
pub const DEFAULT_JUZ: u32 = 30;

/// Which surahs of a juz are included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurahFilter {
    /// Every surah in the juz
    All,
    /// Only the listed surah numbers
    Only(BTreeSet<u32>),
}

impl SurahFilter {
    /// Build an explicit filter from surah numbers
    pub fn only(surahs: impl IntoIterator<Item = u32>) -> Self {
        SurahFilter::Only(surahs.into_iter().collect())
    }

    /// Check whether a surah passes this filter
    pub fn allows(&self, surah_number: u32) -> bool {
        match self {
            SurahFilter::All => true,
            SurahFilter::Only(set) => set.contains(&surah_number),
        }
    }
}

/// A learner's assigned subset of the curriculum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSelection {
    juz: BTreeMap<u32, SurahFilter>,
}

impl ScopeSelection {
    /// Create an empty selection (invalid until a juz is assigned)
    pub fn new() -> Self {
        Self::default()
    }

    /// The default assignment: all of juz 30
    pub fn default_assignment() -> Self {
        Self::new().with_juz(DEFAULT_JUZ, SurahFilter::All)
    }

    /// Assign a juz with the given surah filter, replacing any previous filter
    pub fn assign(&mut self, juz: u32, filter: SurahFilter) {
        self.juz.insert(juz, filter);
    }

    /// Builder form of [`ScopeSelection::assign`]
    pub fn with_juz(mut self, juz: u32, filter: SurahFilter) -> Self {
        self.assign(juz, filter);
        self
    }

    /// Remove a juz from the selection
    pub fn unassign(&mut self, juz: u32) -> bool {
        self.juz.remove(&juz).is_some()
    }

    /// Ensure at least one juz is assigned
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.juz.is_empty() { Err(QuizError::EmptyScope) } else { Ok(()) }
    }

    /// Iterate assigned juz with their filters, ascending by juz number
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SurahFilter)> {
        self.juz.iter().map(|(n, f)| (*n, f))
    }

    /// Assigned juz numbers, ascending
    pub fn juz_numbers(&self) -> Vec<u32> {
        self.juz.keys().copied().collect()
    }

    /// Check if nothing is assigned
    pub fn is_empty(&self) -> bool {
        self.juz.is_empty()
    }
}
