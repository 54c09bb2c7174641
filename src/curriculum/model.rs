//! Content model for the memorization curriculum
//!
//! The curriculum is a read-only tree of juz, surahs and ordered ayahs.
//! It is loaded once at startup and only ever borrowed afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single verse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ayah {
    /// Verse number within its surah (1-indexed)
    #[serde(rename = "num")]
    pub number: u32,
    /// Verse text
    pub text: String,
}

impl Ayah {
    /// Create a new ayah
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self { number, text: text.into() }
    }
}

/// A chapter with its ayahs in reading order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surah {
    /// Display name (e.g., "Al-Ikhlas")
    #[serde(rename = "surah")]
    pub name: String,
    /// Surah number (1-114)
    pub number: u32,
    /// Ayahs in order, contiguous by number
    pub ayahs: Vec<Ayah>,
}

impl Surah {
    /// Create a surah without ayahs
    pub fn new(name: impl Into<String>, number: u32) -> Self {
        Self { name: name.into(), number, ayahs: Vec::new() }
    }

    /// Append an ayah, numbered after the current last one
    pub fn with_ayah(mut self, text: impl Into<String>) -> Self {
        let number = self.ayahs.last().map_or(1, |a| a.number + 1);
        self.ayahs.push(Ayah::new(number, text));
        self
    }

    /// Every (prompt, next ayah) pair in this surah
    pub fn transitions(&self) -> impl Iterator<Item = (&Ayah, &Ayah)> {
        self.ayahs.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Number of the last ayah, if any
    pub fn last_ayah_number(&self) -> Option<u32> {
        self.ayahs.last().map(|a| a.number)
    }
}

/// One of the thirty textual divisions, used as an assignment unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Juz {
    /// Juz number (1-30). Filled from the map key when loading.
    #[serde(default)]
    pub number: u32,
    /// Surahs (or surah fragments) in this juz
    pub surahs: Vec<Surah>,
}

impl Juz {
    /// Create an empty juz
    pub fn new(number: u32) -> Self {
        Self { number, surahs: Vec::new() }
    }

    /// Add a surah
    pub fn with_surah(mut self, surah: Surah) -> Self {
        self.surahs.push(surah);
        self
    }
}

/// The full curriculum dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Curriculum {
    juz: BTreeMap<u32, Juz>,
}

impl Curriculum {
    /// Create an empty curriculum
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a juz
    pub fn insert(&mut self, juz: Juz) {
        self.juz.insert(juz.number, juz);
    }

    /// Builder form of [`Curriculum::insert`]
    pub fn with_juz(mut self, juz: Juz) -> Self {
        self.insert(juz);
        self
    }

    /// Look up a juz by number
    pub fn get_juz(&self, number: u32) -> Option<&Juz> {
        self.juz.get(&number)
    }

    /// All juz numbers available, ascending
    pub fn juz_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.juz.keys().copied()
    }

    /// Total number of ayahs in a surah, taken as the highest ayah number
    /// seen across every juz that carries part of it
    pub fn surah_ayah_count(&self, surah_number: u32) -> Option<u32> {
        self.juz
            .values()
            .flat_map(|j| j.surahs.iter())
            .filter(|s| s.number == surah_number)
            .filter_map(Surah::last_ayah_number)
            .max()
    }

    /// Display name of a surah
    pub fn surah_name(&self, surah_number: u32) -> Option<&str> {
        self.juz
            .values()
            .flat_map(|j| j.surahs.iter())
            .find(|s| s.number == surah_number)
            .map(|s| s.name.as_str())
    }

    /// Every surah in the curriculum (number -> name), ascending by number
    pub fn surahs(&self) -> BTreeMap<u32, &str> {
        self.juz
            .values()
            .flat_map(|j| j.surahs.iter())
            .map(|s| (s.number, s.name.as_str()))
            .collect()
    }

    /// Check if the curriculum holds no juz at all
    pub fn is_empty(&self) -> bool {
        self.juz.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_surah_curriculum() -> Curriculum {
        let first = Surah {
            name: "Al-Mulk".into(),
            number: 67,
            ayahs: vec![Ayah::new(1, "a"), Ayah::new(2, "b")],
        };
        let second = Surah {
            name: "Al-Mulk".into(),
            number: 67,
            ayahs: vec![Ayah::new(3, "c"), Ayah::new(4, "d")],
        };
        Curriculum::new()
            .with_juz(Juz::new(28).with_surah(first))
            .with_juz(Juz::new(29).with_surah(second))
    }

    #[test]
    fn with_ayah_numbers_sequentially() {
        let surah = Surah::new("Al-Kautsar", 108).with_ayah("a").with_ayah("b").with_ayah("c");
        let numbers: Vec<u32> = surah.ayahs.iter().map(|a| a.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn transitions_skip_last_ayah() {
        let surah = Surah::new("Al-Kautsar", 108).with_ayah("a").with_ayah("b").with_ayah("c");
        let pairs: Vec<(u32, u32)> = surah.transitions().map(|(p, a)| (p.number, a.number)).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn single_ayah_surah_has_no_transitions() {
        let surah = Surah::new("Solo", 1).with_ayah("only");
        assert_eq!(surah.transitions().count(), 0);
    }

    #[test]
    fn ayah_count_spans_juz_boundaries() {
        let curriculum = split_surah_curriculum();
        assert_eq!(curriculum.surah_ayah_count(67), Some(4));
        assert_eq!(curriculum.surah_ayah_count(1), None);
    }

    #[test]
    fn surah_lookup_by_number() {
        let curriculum = split_surah_curriculum();
        assert_eq!(curriculum.surah_name(67), Some("Al-Mulk"));
        assert_eq!(curriculum.surahs().len(), 1);
        assert!(curriculum.get_juz(30).is_none());
    }
}
