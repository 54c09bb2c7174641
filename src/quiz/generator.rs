//! Question generation
//!
//! Builds a session's question list from the curriculum:
//!
//! 1. Collect every (ayah, next ayah) pair allowed by the learner's scope.
//! 2. Shuffle the pool and pick one pair per surah first, then fill any
//!    remaining slots from the rest of the pool.
//! 3. For each pick, draw distractors from the answers of the whole pool,
//!    skipping any whose text matches the correct answer.
//!
//! All randomness comes from the caller's RNG, so a seeded `StdRng`
//! reproduces the same session.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::error::QuizError;
use super::scope::ScopeSelection;
use crate::curriculum::{Ayah, Curriculum, Surah};

/// Upper bound on questions per session
pub const MAX_QUESTIONS: usize = 15;

/// Questions per session at level 1
pub const BASE_QUESTIONS: usize = 5;

/// Level from which a fourth option is offered
pub const FOUR_OPTION_LEVEL: u32 = 5;

/// One selectable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Surah the option's ayah comes from
    pub surah_number: u32,
    /// Ayah number within that surah
    pub ayah_number: u32,
    /// Ayah text shown to the learner
    pub text: String,
}

impl AnswerOption {
    fn from_ayah(surah: &Surah, ayah: &Ayah) -> Self {
        Self { surah_number: surah.number, ayah_number: ayah.number, text: ayah.text.clone() }
    }
}

/// A generated "continue the ayah" question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    /// Surah display name
    pub surah_name: String,
    /// Surah number
    pub surah_number: u32,
    /// Juz the question was drawn from
    pub juz_number: u32,
    /// Number of the prompt ayah
    pub prompt_ayah_number: u32,
    /// Text of the prompt ayah
    pub prompt_text: String,
    /// Number of the ayah the learner must identify
    pub answer_ayah_number: u32,
    /// Options in display order, unique by text
    pub options: Vec<AnswerOption>,
    /// Index of the correct option in `options`
    pub correct_option_index: usize,
}

impl QuestionItem {
    /// The correct option
    pub fn correct_option(&self) -> &AnswerOption {
        &self.options[self.correct_option_index]
    }

    /// Check if the given option index is the right answer
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_option_index
    }
}

/// A raw (prompt, answer) pair before options are built
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Juz the pair was found in
    pub juz_number: u32,
    /// Owning surah
    pub surah: &'a Surah,
    /// Prompt ayah
    pub prompt: &'a Ayah,
    /// The ayah that follows the prompt
    pub answer: &'a Ayah,
}

/// Number of questions for a learner level
pub fn question_count(level: u32) -> usize {
    let steps = (level.max(1) - 1) / 2;
    (BASE_QUESTIONS + steps as usize).min(MAX_QUESTIONS)
}

/// Total options (correct answer included) for a learner level
pub fn option_count(level: u32) -> usize {
    if level >= FOUR_OPTION_LEVEL { 4 } else { 3 }
}

/// Compare ayah texts ignoring surrounding and repeated whitespace
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collect every ayah pair allowed by the scope.
///
/// Juz missing from the curriculum are skipped rather than failing. When a
/// surah continues into another assigned juz, the pair across the boundary
/// is included and belongs to the juz holding the answer.
pub fn candidate_pool<'a>(curriculum: &'a Curriculum, scope: &ScopeSelection) -> Vec<Candidate<'a>> {
    let mut parts: Vec<(u32, &'a Surah)> = Vec::new();

    for (juz_number, filter) in scope.iter() {
        let Some(juz) = curriculum.get_juz(juz_number) else {
            tracing::warn!("Juz {} is assigned but not in the curriculum, skipping", juz_number);
            continue;
        };
        parts.extend(juz.surahs.iter().filter(|s| filter.allows(s.number)).map(|s| (juz_number, s)));
    }

    let mut pool = Vec::new();
    for &(juz_number, surah) in &parts {
        if let Some(first) = surah.ayahs.first() {
            let before = parts
                .iter()
                .filter(|(_, other)| other.number == surah.number)
                .find_map(|(_, other)| other.ayahs.last().filter(|last| last.number + 1 == first.number));
            if let Some(prompt) = before {
                pool.push(Candidate { juz_number, surah, prompt, answer: first });
            }
        }

        pool.extend(surah.transitions().map(|(prompt, answer)| Candidate {
            juz_number,
            surah,
            prompt,
            answer,
        }));
    }

    pool
}

/// Generate an ordered question list for a learner
pub fn generate<R: Rng + ?Sized>(
    curriculum: &Curriculum,
    scope: &ScopeSelection,
    level: u32,
    rng: &mut R,
) -> Result<Vec<QuestionItem>, QuizError> {
    scope.validate()?;

    let mut pool = candidate_pool(curriculum, scope);
    if pool.is_empty() {
        return Err(QuizError::EmptyCandidatePool);
    }
    pool.shuffle(rng);

    let mut picks = pick_distinct_surahs(&pool, question_count(level));
    picks.shuffle(rng);

    let distractors = distinct_answers(&pool);
    let total_options = option_count(level);

    let questions: Vec<QuestionItem> = picks
        .into_iter()
        .map(|idx| build_question(&pool[idx], &distractors, total_options, rng))
        .collect();

    tracing::debug!(
        "Generated {} questions from a pool of {} (level {})",
        questions.len(),
        pool.len(),
        level
    );
    Ok(questions)
}

/// Choose up to `count` pool indices, one per surah first, then any.
fn pick_distinct_surahs(pool: &[Candidate<'_>], count: usize) -> Vec<usize> {
    let mut picks = Vec::with_capacity(count);
    let mut used_surahs = HashSet::new();

    for (idx, candidate) in pool.iter().enumerate() {
        if picks.len() >= count {
            break;
        }
        if used_surahs.insert(candidate.surah.number) {
            picks.push(idx);
        }
    }

    if picks.len() < count {
        let taken: HashSet<usize> = picks.iter().copied().collect();
        let remaining = (0..pool.len()).filter(|idx| !taken.contains(idx));
        picks.extend(remaining.take(count - picks.len()));
    }

    picks
}

/// Answers of the whole pool, one representative per distinct text
fn distinct_answers(pool: &[Candidate<'_>]) -> Vec<(String, AnswerOption)> {
    let mut seen = HashSet::new();
    pool.iter()
        .filter_map(|c| {
            let key = normalize_text(&c.answer.text);
            seen.insert(key.clone()).then(|| (key, AnswerOption::from_ayah(c.surah, c.answer)))
        })
        .collect()
}

fn build_question<R: Rng + ?Sized>(
    candidate: &Candidate<'_>,
    distractors: &[(String, AnswerOption)],
    total_options: usize,
    rng: &mut R,
) -> QuestionItem {
    let correct_key = normalize_text(&candidate.answer.text);

    let mut wrong: Vec<&AnswerOption> =
        distractors.iter().filter(|(key, _)| *key != correct_key).map(|(_, opt)| opt).collect();
    wrong.shuffle(rng);

    let mut options = vec![AnswerOption::from_ayah(candidate.surah, candidate.answer)];
    options.extend(wrong.into_iter().take(total_options - 1).cloned());
    options.shuffle(rng);

    let correct_option_index =
        options.iter().position(|o| normalize_text(&o.text) == correct_key).unwrap_or_default();

    QuestionItem {
        surah_name: candidate.surah.name.clone(),
        surah_number: candidate.surah.number,
        juz_number: candidate.juz_number,
        prompt_ayah_number: candidate.prompt.number,
        prompt_text: candidate.prompt.text.clone(),
        answer_ayah_number: candidate.answer.number,
        options,
        correct_option_index,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::curriculum::{Ayah, Juz, Surah};
    use crate::quiz::scope::SurahFilter;

    fn sample() -> Curriculum {
        Curriculum::builtin().unwrap()
    }

    fn juz_30() -> ScopeSelection {
        ScopeSelection::default_assignment()
    }

    fn next_ayah_text(curriculum: &Curriculum, q: &QuestionItem) -> String {
        let juz = curriculum.get_juz(q.juz_number).unwrap();
        let surah = juz.surahs.iter().find(|s| s.number == q.surah_number).unwrap();
        let pos = surah.ayahs.iter().position(|a| a.number == q.prompt_ayah_number).unwrap();
        surah.ayahs[pos + 1].text.clone()
    }

    #[test]
    fn question_count_grows_every_two_levels() {
        assert_eq!(question_count(1), 5);
        assert_eq!(question_count(2), 5);
        assert_eq!(question_count(3), 6);
        assert_eq!(question_count(7), 8);
        assert_eq!(question_count(21), 15);
        assert_eq!(question_count(100), 15);
    }

    #[test]
    fn level_zero_is_treated_as_level_one() {
        assert_eq!(question_count(0), 5);
    }

    #[test]
    fn option_count_steps_up_at_level_five() {
        assert_eq!(option_count(4), 3);
        assert_eq!(option_count(5), 4);
    }

    #[test]
    fn empty_scope_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = generate(&sample(), &ScopeSelection::new(), 1, &mut rng);
        assert_eq!(result, Err(QuizError::EmptyScope));
    }

    #[test]
    fn single_ayah_surahs_yield_empty_pool() {
        let curriculum = Curriculum::new().with_juz(
            Juz::new(30).with_surah(Surah::new("A", 1).with_ayah("x")).with_surah(Surah::new("B", 2).with_ayah("y")),
        );
        let mut rng = StdRng::seed_from_u64(1);
        let result = generate(&curriculum, &juz_30(), 1, &mut rng);
        assert_eq!(result, Err(QuizError::EmptyCandidatePool));
    }

    #[test]
    fn absent_juz_is_skipped() {
        let scope = ScopeSelection::new().with_juz(1, SurahFilter::All).with_juz(30, SurahFilter::All);
        let mut rng = StdRng::seed_from_u64(3);
        let questions = generate(&sample(), &scope, 1, &mut rng).unwrap();
        assert!(questions.iter().all(|q| q.juz_number == 30));
    }

    #[test]
    fn only_absent_juz_yields_empty_pool() {
        let scope = ScopeSelection::new().with_juz(1, SurahFilter::All);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(generate(&sample(), &scope, 1, &mut rng), Err(QuizError::EmptyCandidatePool));
    }

    #[test]
    fn surah_filter_restricts_questions() {
        let scope = ScopeSelection::new().with_juz(30, SurahFilter::only([112]));
        let mut rng = StdRng::seed_from_u64(9);
        let questions = generate(&sample(), &scope, 1, &mut rng).unwrap();
        // Al-Ikhlas has only three transitions
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.surah_number == 112));
    }

    #[test]
    fn first_pass_prefers_distinct_surahs() {
        let mut rng = StdRng::seed_from_u64(11);
        let questions = generate(&sample(), &juz_30(), 1, &mut rng).unwrap();
        let surahs: HashSet<u32> = questions.iter().map(|q| q.surah_number).collect();
        assert_eq!(surahs.len(), questions.len());
    }

    #[test]
    fn second_pass_fills_from_repeated_surahs() {
        let scope = ScopeSelection::new().with_juz(30, SurahFilter::only([113, 114]));
        let mut rng = StdRng::seed_from_u64(5);
        let questions = generate(&sample(), &scope, 1, &mut rng).unwrap();
        assert_eq!(questions.len(), 5);

        let pairs: HashSet<(u32, u32)> =
            questions.iter().map(|q| (q.surah_number, q.prompt_ayah_number)).collect();
        assert_eq!(pairs.len(), 5, "no pair may be picked twice");
    }

    #[test]
    fn repeated_ayah_text_never_appears_as_distractor() {
        // Al-Kafirun ayahs 3 and 5 are identical
        let scope = ScopeSelection::new().with_juz(30, SurahFilter::only([109]));
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            for q in generate(&sample(), &scope, 5, &mut rng).unwrap() {
                let correct = normalize_text(&q.correct_option().text);
                let matches = q.options.iter().filter(|o| normalize_text(&o.text) == correct).count();
                assert_eq!(matches, 1, "seed {seed}: duplicate correct text in options");
            }
        }
    }

    #[test]
    fn small_pool_degrades_option_count() {
        let curriculum = Curriculum::new()
            .with_juz(Juz::new(30).with_surah(Surah::new("A", 1).with_ayah("x").with_ayah("y").with_ayah("z")));
        let mut rng = StdRng::seed_from_u64(2);
        let questions = generate(&curriculum, &juz_30(), 5, &mut rng).unwrap();
        assert_eq!(questions.len(), 2);
        for q in &questions {
            assert_eq!(q.options.len(), 2);
        }
    }

    #[test]
    fn same_seed_reproduces_session() {
        let a = generate(&sample(), &juz_30(), 6, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = generate(&sample(), &juz_30(), 6, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }

    fn split_surah() -> Curriculum {
        let part = |range: std::ops::RangeInclusive<u32>| Surah {
            name: "Al-Baqarah".into(),
            number: 2,
            ayahs: range.map(|n| Ayah::new(n, format!("baqarah {n}"))).collect(),
        };
        Curriculum::new()
            .with_juz(Juz::new(1).with_surah(part(1..=4)))
            .with_juz(Juz::new(2).with_surah(part(5..=8)))
    }

    #[test]
    fn pool_bridges_surah_split_across_juz() {
        let curriculum = split_surah();
        let scope = ScopeSelection::new().with_juz(1, SurahFilter::All).with_juz(2, SurahFilter::All);
        let pairs: Vec<(u32, u32, u32)> = candidate_pool(&curriculum, &scope)
            .iter()
            .map(|c| (c.juz_number, c.prompt.number, c.answer.number))
            .collect();
        assert_eq!(pairs.len(), 7);
        assert!(pairs.contains(&(2, 4, 5)));
    }

    #[test]
    fn bridge_needs_both_juz_assigned() {
        let curriculum = split_surah();
        let scope = ScopeSelection::new().with_juz(2, SurahFilter::All);
        let answers: Vec<u32> = candidate_pool(&curriculum, &scope).iter().map(|c| c.answer.number).collect();
        assert_eq!(answers, vec![6, 7, 8]);
    }

    #[test]
    fn candidate_pool_excludes_last_ayahs() {
        let curriculum = sample();
        let pool = candidate_pool(&curriculum, &ScopeSelection::new().with_juz(30, SurahFilter::only([108])));
        let prompts: Vec<u32> = pool.iter().map(|c| c.prompt.number).collect();
        assert_eq!(prompts, vec![1, 2]);
    }

    proptest! {
        #[test]
        fn options_always_contain_canonical_answer(seed in any::<u64>(), level in 1u32..25) {
            let curriculum = sample();
            let mut rng = StdRng::seed_from_u64(seed);
            let questions = generate(&curriculum, &juz_30(), level, &mut rng).unwrap();

            for q in &questions {
                prop_assert_eq!(&q.correct_option().text, &next_ayah_text(&curriculum, q));
                let texts: HashSet<String> = q.options.iter().map(|o| normalize_text(&o.text)).collect();
                prop_assert_eq!(texts.len(), q.options.len());
                prop_assert_eq!(q.options.len(), option_count(level));
            }
        }

        #[test]
        fn question_count_capped_by_pool(seed in any::<u64>(), level in 1u32..40) {
            let curriculum = sample();
            let pool_size = candidate_pool(&curriculum, &juz_30()).len();
            let mut rng = StdRng::seed_from_u64(seed);
            let questions = generate(&curriculum, &juz_30(), level, &mut rng).unwrap();
            prop_assert_eq!(questions.len(), question_count(level).min(pool_size));
        }
    }
}
