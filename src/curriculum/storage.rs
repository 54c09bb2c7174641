//! Curriculum loading
//!
//! The on-disk format is a JSON object keyed by juz number:
//! `{ "30": { "surahs": [ { "surah": "An-Naba", "number": 78, "ayahs": [ { "num": 1, "text": "..." } ] } ] } }`

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use super::model::{Curriculum, Juz, Surah};

/// Bundled sample covering the short surahs of juz 30
const BUILTIN_JUZ_30: &str = include_str!("juz30.json");

/// Errors raised while loading a curriculum file
#[derive(Debug, Error)]
pub enum CurriculumError {
    /// File could not be read
    #[error("Failed to read curriculum from {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid curriculum JSON
    #[error("Failed to parse curriculum: {0}")]
    Json(#[from] serde_json::Error),

    /// A top-level key is not a juz number
    #[error("Invalid juz key {0:?}, expected a number")]
    InvalidJuzKey(String),

    /// A surah carries no ayahs
    #[error("Surah {surah} in juz {juz} has no ayahs")]
    EmptySurah {
        /// Juz number
        juz: u32,
        /// Surah number
        surah: u32,
    },

    /// Ayahs are out of order or have gaps
    #[error("Surah {surah}: expected ayah {expected}, found {found}")]
    NonContiguous {
        /// Surah number
        surah: u32,
        /// Ayah number that should have come next
        expected: u32,
        /// Ayah number actually found
        found: u32,
    },
}

/// Parse a curriculum from its JSON representation
pub fn parse_curriculum(json: &str) -> Result<Curriculum, CurriculumError> {
    let raw: BTreeMap<String, Juz> = serde_json::from_str(json)?;
    let mut curriculum = Curriculum::new();

    for (key, mut juz) in raw {
        let number: u32 =
            key.trim().parse().map_err(|_| CurriculumError::InvalidJuzKey(key.clone()))?;
        juz.number = number;
        for surah in &juz.surahs {
            validate_surah(number, surah)?;
        }
        curriculum.insert(juz);
    }

    tracing::debug!("Loaded curriculum with {} juz", curriculum.juz_numbers().count());
    Ok(curriculum)
}

/// Load a curriculum file from disk
pub fn load_curriculum(path: &Path) -> Result<Curriculum, CurriculumError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| CurriculumError::Io { path: path.display().to_string(), source })?;
    parse_curriculum(&contents)
}

impl Curriculum {
    /// The bundled juz 30 sample
    pub fn builtin() -> Result<Self, CurriculumError> {
        parse_curriculum(BUILTIN_JUZ_30)
    }
}

fn validate_surah(juz: u32, surah: &Surah) -> Result<(), CurriculumError> {
    let Some(first) = surah.ayahs.first() else {
        return Err(CurriculumError::EmptySurah { juz, surah: surah.number });
    };

    let mut expected = first.number;
    for ayah in &surah.ayahs {
        if ayah.number != expected {
            return Err(CurriculumError::NonContiguous {
                surah: surah.number,
                expected,
                found: ayah.number,
            });
        }
        expected += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_sample_loads() {
        let curriculum = Curriculum::builtin().unwrap();
        let juz = curriculum.get_juz(30).unwrap();
        assert_eq!(juz.number, 30);
        assert!(juz.surahs.iter().any(|s| s.number == 112));
        assert_eq!(curriculum.surah_ayah_count(114), Some(6));
    }

    #[test]
    fn parses_juz_keys_into_numbers() {
        let json = r#"{"29": {"surahs": [{"surah": "Al-Mulk", "number": 67, "ayahs": [
            {"num": 1, "text": "a"}, {"num": 2, "text": "b"}]}]}}"#;
        let curriculum = parse_curriculum(json).unwrap();
        assert_eq!(curriculum.get_juz(29).unwrap().number, 29);
    }

    #[test]
    fn rejects_non_numeric_juz_key() {
        let json = r#"{"thirty": {"surahs": []}}"#;
        assert!(matches!(parse_curriculum(json), Err(CurriculumError::InvalidJuzKey(_))));
    }

    #[test]
    fn rejects_gaps_between_ayahs() {
        let json = r#"{"30": {"surahs": [{"surah": "X", "number": 1, "ayahs": [
            {"num": 1, "text": "a"}, {"num": 3, "text": "c"}]}]}}"#;
        assert!(matches!(
            parse_curriculum(json),
            Err(CurriculumError::NonContiguous { surah: 1, expected: 2, found: 3 })
        ));
    }

    #[test]
    fn rejects_empty_surah() {
        let json = r#"{"30": {"surahs": [{"surah": "X", "number": 1, "ayahs": []}]}}"#;
        assert!(matches!(parse_curriculum(json), Err(CurriculumError::EmptySurah { .. })));
    }

    #[test]
    fn fragments_may_start_mid_surah() {
        let json = r#"{"1": {"surahs": [{"surah": "Al-Baqarah", "number": 2, "ayahs": [
            {"num": 140, "text": "a"}, {"num": 141, "text": "b"}]}]}}"#;
        assert!(parse_curriculum(json).is_ok());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"30": {{"surahs": [{{"surah": "Al-Kautsar", "number": 108, "ayahs": [
                {{"num": 1, "text": "a"}}, {{"num": 2, "text": "b"}}]}}]}}}}"#
        )
        .unwrap();

        let curriculum = load_curriculum(file.path()).unwrap();
        assert_eq!(curriculum.surah_name(108), Some("Al-Kautsar"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_curriculum(Path::new("/nonexistent/quran.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/quran.json"));
    }
}
