//! Offline recitation check by edit distance

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Verification, VerificationSource};

/// Similarity needed to accept a recitation
pub const ACCEPT_SIMILARITY: f64 = 0.7;

/// Arabic harakat and related marks
static HARAKAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{064B}-\u{065F}]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip diacritics and collapse whitespace
pub fn normalize_arabic(text: &str) -> String {
    let stripped = HARAKAT.replace_all(text, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Edit distance over chars
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Similarity in `0.0..=1.0`: one minus edit distance over the longer length
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let longer = a.chars().count().max(b.chars().count());
    let distance = levenshtein(a, b);
    (longer - distance) as f64 / longer as f64
}

/// Judge a recitation without the remote verifier
pub fn verify_locally(expected: &str, spoken: &str) -> Verification {
    let score = similarity(&normalize_arabic(expected), &normalize_arabic(spoken));
    let correct = score >= ACCEPT_SIMILARITY;

    Verification {
        correct,
        score: (score * 100.0).round() as u8,
        feedback: if correct {
            "Masyaallah, bagus sekali!".to_string()
        } else {
            "Coba diulang lagi ya...".to_string()
        },
        source: VerificationSource::Local,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn strips_harakat_and_spaces() {
        assert_eq!(normalize_arabic("  قُلْ   هُوَ  "), "قل هو");
    }

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn similarity_edges() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("", "abc"), 0.0);
        assert_eq!(similarity("abcd", "abce"), 0.75);
    }

    #[test]
    fn diacritics_do_not_count_against_the_learner() {
        let verdict = verify_locally("قُلْ هُوَ اللَّهُ أَحَدٌ", "قل هو الله احد");
        // Only the hamza seat differs
        assert!(verdict.correct);
        assert!(verdict.score >= 90);
        assert_eq!(verdict.source, VerificationSource::Local);
    }

    #[test]
    fn unrelated_text_is_rejected() {
        let verdict = verify_locally("قُلْ أَعُوذُ بِرَبِّ النَّاسِ", "الحمد لله");
        assert!(!verdict.correct);
        assert!(verdict.score < 70);
    }

    #[test]
    fn empty_recitation_scores_zero() {
        let verdict = verify_locally("قُلْ هُوَ", "   ");
        assert!(!verdict.correct);
        assert_eq!(verdict.score, 0);
    }
}
