//! Leaderboards built from learner profiles

use std::cmp::Reverse;

use crate::profile::LearnerProfile;

/// Rows kept on the per-surah hafalan board
pub const HAFALAN_LIMIT: usize = 10;
/// Rows kept on the cumulative score board
pub const SCORE_LIMIT: usize = 20;
/// Surah reported when a learner has mastered nothing yet
pub const DEFAULT_BEST_SURAH: u32 = 1;

/// One row of the hafalan leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HafalanEntry {
    pub learner_id: String,
    pub name: String,
    /// Ayahs of the surah at or above the mastery threshold
    pub mastered_ayahs: usize,
    /// Sum of best response times over those ayahs
    pub total_best_time_seconds: u32,
}

/// One row of the score leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntryRow {
    pub learner_id: String,
    pub name: String,
    pub cumulative_score: u64,
}

/// Rank learners on one surah: most mastered ayahs first, then fastest
pub fn hafalan_leaderboard<'a>(
    learners: impl IntoIterator<Item = &'a LearnerProfile>,
    surah_number: u32,
) -> Vec<HafalanEntry> {
    let mut rows: Vec<HafalanEntry> = learners
        .into_iter()
        .filter_map(|learner| {
            let record = learner.mastery.get(&surah_number)?;
            let mastered_ayahs = record.mastered_count();
            (mastered_ayahs > 0).then(|| HafalanEntry {
                learner_id: learner.id.clone(),
                name: learner.name.clone(),
                mastered_ayahs,
                total_best_time_seconds: record.mastered_best_time(),
            })
        })
        .collect();

    rows.sort_by_key(|row| (Reverse(row.mastered_ayahs), row.total_best_time_seconds));
    rows.truncate(HAFALAN_LIMIT);
    rows
}

/// Rank learners by cumulative score, skipping those who have not scored
pub fn score_leaderboard<'a>(
    learners: impl IntoIterator<Item = &'a LearnerProfile>,
) -> Vec<ScoreEntryRow> {
    let mut rows: Vec<ScoreEntryRow> = learners
        .into_iter()
        .filter(|learner| learner.cumulative_score > 0)
        .map(|learner| ScoreEntryRow {
            learner_id: learner.id.clone(),
            name: learner.name.clone(),
            cumulative_score: learner.cumulative_score,
        })
        .collect();

    rows.sort_by_key(|row| Reverse(row.cumulative_score));
    rows.truncate(SCORE_LIMIT);
    rows
}

/// The surah where a learner has mastered the most ayahs
pub fn best_surah(learner: &LearnerProfile) -> u32 {
    learner
        .mastery
        .iter()
        .map(|(number, record)| (*number, record.mastered_count()))
        .filter(|(_, count)| *count > 0)
        // Lowest surah number wins a tie
        .max_by_key(|(number, count)| (*count, Reverse(*number)))
        .map_or(DEFAULT_BEST_SURAH, |(number, _)| number)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::progress::{AyahMastery, SurahMastery};

    fn learner(id: &str, score: u64) -> LearnerProfile {
        let mut profile = LearnerProfile::new(id, id.to_uppercase());
        profile.cumulative_score = score;
        profile
    }

    fn with_ayahs(mut profile: LearnerProfile, surah: u32, ayahs: &[(u32, u32, Option<u32>)]) -> LearnerProfile {
        let record = profile.mastery.entry(surah).or_insert_with(|| SurahMastery::new("Al-Ikhlas"));
        for &(number, count, time) in ayahs {
            record.ayahs.insert(
                number,
                AyahMastery { correct_count: count, best_response_time_seconds: time },
            );
        }
        profile
    }

    #[test]
    fn hafalan_orders_by_count_then_time() {
        let learners = vec![
            with_ayahs(learner("a", 0), 112, &[(2, 2, Some(9)), (3, 2, Some(9))]),
            with_ayahs(learner("b", 0), 112, &[(2, 3, Some(4)), (3, 2, Some(5))]),
            with_ayahs(learner("c", 0), 112, &[(2, 2, Some(3)), (3, 2, Some(3)), (4, 2, Some(3))]),
            with_ayahs(learner("d", 0), 112, &[(2, 1, Some(1))]),
            learner("e", 0),
        ];

        let ids: Vec<_> = hafalan_leaderboard(&learners, 112)
            .into_iter()
            .map(|row| (row.learner_id, row.mastered_ayahs, row.total_best_time_seconds))
            .collect();
        assert_eq!(
            ids,
            vec![("c".to_string(), 3, 9), ("b".to_string(), 2, 9), ("a".to_string(), 2, 18)]
        );
    }

    #[test]
    fn hafalan_keeps_top_ten() {
        let learners: Vec<_> = (0..15)
            .map(|i| with_ayahs(learner(&format!("l{i}"), 0), 114, &[(2, 2, Some(i))]))
            .collect();
        let board = hafalan_leaderboard(&learners, 114);
        assert_eq!(board.len(), HAFALAN_LIMIT);
        assert_eq!(board[0].learner_id, "l0");
    }

    #[test]
    fn score_board_drops_zero_and_sorts_descending() {
        let learners = vec![learner("a", 120), learner("b", 0), learner("c", 450), learner("d", 80)];
        let ids: Vec<_> = score_leaderboard(&learners).into_iter().map(|r| r.learner_id).collect();
        assert_eq!(ids, vec!["c", "a", "d"]);
    }

    #[test]
    fn score_board_keeps_top_twenty() {
        let learners: Vec<_> = (1..=25).map(|i| learner(&format!("l{i}"), i * 10)).collect();
        let board = score_leaderboard(&learners);
        assert_eq!(board.len(), SCORE_LIMIT);
        assert_eq!(board[0].cumulative_score, 250);
    }

    #[test]
    fn best_surah_picks_most_mastered() {
        let profile = with_ayahs(learner("a", 0), 112, &[(2, 2, None)]);
        let profile = with_ayahs(profile, 114, &[(2, 2, None), (3, 4, None)]);
        assert_eq!(best_surah(&profile), 114);
    }

    #[test]
    fn best_surah_defaults_without_mastery() {
        let profile = with_ayahs(learner("a", 0), 112, &[(2, 1, None)]);
        assert_eq!(best_surah(&profile), DEFAULT_BEST_SURAH);
    }
}
