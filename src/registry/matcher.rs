use rusqlite::Connection;

use crate::db::{get_all_professionals, get_professional_by_rpps, DatabaseError};
use crate::models::Professional;
use crate::text::normalize;

/// Minimum per-term score for a record to match.
pub const DEFAULT_MATCH_SCORE: u32 = 80;

/// True when the identifier is exactly 11 ASCII digits.
pub fn is_valid_rpps(rpps_id: &str) -> bool {
    rpps_id.len() == 11 && rpps_id.bytes().all(|b| b.is_ascii_digit())
}

/// Resolves a professional by exact identifier. A malformed identifier
/// short-circuits to "not found" without touching storage.
pub fn get_by_id(
    conn: &Connection,
    rpps_id: &str,
) -> Result<Option<Professional>, DatabaseError> {
    if !is_valid_rpps(rpps_id) {
        tracing::warn!(rpps_id, "Invalid RPPS ID format");
        return Ok(None);
    }
    get_professional_by_rpps(conn, rpps_id)
}

/// Scores one normalized query term against one normalized stored value on
/// a 0..=100 scale. An empty query term is a wildcard and scores 100.
pub trait NameMatchStrategy {
    fn score(&self, query: &str, stored: &str) -> u32;
    fn name(&self) -> &'static str;
}

/// Partial-ratio scoring: the best similarity between the query and any
/// same-length window of the stored value. An exact substring scores 100,
/// so this mode never misses what [`SubstringMatcher`] would find.
#[derive(Debug, Default)]
pub struct FuzzyMatcher;

impl NameMatchStrategy for FuzzyMatcher {
    fn score(&self, query: &str, stored: &str) -> u32 {
        if query.is_empty() {
            return 100;
        }
        if stored.is_empty() {
            return 0;
        }
        partial_ratio(query, stored)
    }

    fn name(&self) -> &'static str {
        "fuzzy"
    }
}

/// Plain substring containment, all-or-nothing.
#[derive(Debug, Default)]
pub struct SubstringMatcher;

impl NameMatchStrategy for SubstringMatcher {
    fn score(&self, query: &str, stored: &str) -> u32 {
        if query.is_empty() || stored.contains(query) {
            100
        } else {
            0
        }
    }

    fn name(&self) -> &'static str {
        "substring"
    }
}

fn partial_ratio(a: &str, b: &str) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    let short_str: String = short.iter().collect();
    let mut best = 0.0f64;

    for window in long.windows(short.len()) {
        let candidate: String = window.iter().collect();
        let similarity = strsim::normalized_levenshtein(&short_str, &candidate);
        if similarity > best {
            best = similarity;
            if best >= 1.0 {
                break;
            }
        }
    }

    (best * 100.0).round() as u32
}

/// Searches professionals by last name and optionally first name. Query and
/// stored values are normalized (lowercased, diacritics stripped) before
/// scoring; a record matches when both terms reach `min_score`.
pub fn search_by_name(
    conn: &Connection,
    last_name: &str,
    first_name: &str,
    strategy: &dyn NameMatchStrategy,
    min_score: u32,
) -> Result<Vec<Professional>, DatabaseError> {
    let q_last = normalize(last_name);
    let q_first = normalize(first_name);

    let results: Vec<Professional> = get_all_professionals(conn)?
        .into_iter()
        .filter(|p| {
            let db_last = normalize(p.last_name.as_deref().unwrap_or_default());
            let db_first = normalize(p.first_name.as_deref().unwrap_or_default());

            strategy.score(&q_last, &db_last) >= min_score
                && strategy.score(&q_first, &db_first) >= min_score
        })
        .collect();

    tracing::info!(
        strategy = strategy.name(),
        last_name,
        first_name,
        results = results.len(),
        "Name search complete"
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_professionals, open_memory_registry};

    fn professional(rpps_id: &str, last: &str, first: &str) -> Professional {
        Professional {
            rpps_id: rpps_id.to_string(),
            last_name: Some(last.to_string()),
            first_name: Some(first.to_string()),
            ..Default::default()
        }
    }

    fn seeded_registry() -> Connection {
        let conn = open_memory_registry().unwrap();
        insert_professionals(
            &conn,
            &[
                professional("10000000001", "DUPONT", "Marie"),
                professional("10000000002", "DUPONT-MARTIN", "Hélène"),
                professional("10000000003", "BERNARD", "Luc"),
            ],
        )
        .unwrap();
        conn
    }

    #[test]
    fn valid_rpps_is_exactly_eleven_ascii_digits() {
        assert!(is_valid_rpps("12345678901"));
        assert!(!is_valid_rpps("1234567890"));
        assert!(!is_valid_rpps("123456789012"));
        assert!(!is_valid_rpps("1234567890a"));
        assert!(!is_valid_rpps("12345 78901"));
        assert!(!is_valid_rpps(""));
    }

    #[test]
    fn invalid_id_short_circuits_without_querying() {
        let conn = seeded_registry();
        assert!(get_by_id(&conn, "123").unwrap().is_none());
        assert!(get_by_id(&conn, "contains11!").unwrap().is_none());
    }

    #[test]
    fn valid_id_resolves_the_record() {
        let conn = seeded_registry();
        let found = get_by_id(&conn, "10000000001").unwrap().unwrap();
        assert_eq!(found.last_name.as_deref(), Some("DUPONT"));
    }

    #[test]
    fn exact_substring_scores_one_hundred_in_both_modes() {
        for pair in [("dupont", "dupont-martin"), ("mar", "marie"), ("b", "bernard")] {
            assert_eq!(FuzzyMatcher.score(pair.0, pair.1), 100);
            assert_eq!(SubstringMatcher.score(pair.0, pair.1), 100);
        }
    }

    #[test]
    fn empty_query_term_is_a_wildcard() {
        assert_eq!(FuzzyMatcher.score("", "anything"), 100);
        assert_eq!(SubstringMatcher.score("", "anything"), 100);
    }

    #[test]
    fn near_miss_scores_above_threshold_only_in_fuzzy_mode() {
        let score = FuzzyMatcher.score("duponr", "dupont");
        assert!(score >= DEFAULT_MATCH_SCORE, "got {score}");
        assert_eq!(SubstringMatcher.score("duponr", "dupont"), 0);
    }

    #[test]
    fn unrelated_names_score_low() {
        assert!(FuzzyMatcher.score("bernard", "dupont") < DEFAULT_MATCH_SCORE);
    }

    #[test]
    fn search_is_accent_and_case_insensitive() {
        let conn = seeded_registry();

        let results =
            search_by_name(&conn, "dupont", "HÉLÈNE", &FuzzyMatcher, DEFAULT_MATCH_SCORE)
                .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rpps_id, "10000000002");
    }

    #[test]
    fn empty_first_name_matches_every_first_name() {
        let conn = seeded_registry();

        let results =
            search_by_name(&conn, "dupont", "", &FuzzyMatcher, DEFAULT_MATCH_SCORE).unwrap();

        assert_eq!(results.len(), 2);
    }

    #[test]
    fn both_strategies_agree_on_substring_queries() {
        let conn = seeded_registry();

        let fuzzy =
            search_by_name(&conn, "bern", "", &FuzzyMatcher, DEFAULT_MATCH_SCORE).unwrap();
        let substring =
            search_by_name(&conn, "bern", "", &SubstringMatcher, DEFAULT_MATCH_SCORE).unwrap();

        let ids = |rows: &[Professional]| {
            rows.iter().map(|p| p.rpps_id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&fuzzy), ids(&substring));
        assert_eq!(fuzzy.len(), 1);
    }

    #[test]
    fn no_match_returns_empty_not_error() {
        let conn = seeded_registry();
        let results =
            search_by_name(&conn, "zzzzz", "", &FuzzyMatcher, DEFAULT_MATCH_SCORE).unwrap();
        assert!(results.is_empty());
    }
}
