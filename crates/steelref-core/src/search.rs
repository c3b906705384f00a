//! In-memory fuzzy search over the steel catalog.
//!
//! [`SearchIndex::build`] derives one normalized key per record (name +
//! aliases + manufacturer); [`SearchIndex::query`] ranks records against a
//! normalized free-text query. Scoring per candidate, highest wins:
//!
//! | Rule                              | Score            |
//! |-----------------------------------|------------------|
//! | key contains query (contiguous)   | 3.0              |
//! | whitespace token sets intersect   | 2.0 + 0.25·n     |
//! | key starts with query             | 2.0              |
//! | otherwise                         | 0 (dropped)      |
//!
//! Scores are independent per entry (no global normalization). The final
//! sort is stable and descending, so equal-score records keep catalog
//! order. Both build and query are pure: the same inputs always produce the
//! same output.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::SteelRecord;
use crate::normalize::normalize;

/// Score for a contiguous substring match.
const SUBSTRING_SCORE: f32 = 3.0;
/// Base score when token sets intersect.
const TOKEN_BASE_SCORE: f32 = 2.0;
/// Added per overlapping token.
const TOKEN_OVERLAP_BONUS: f32 = 0.25;
/// Score for a prefix-only match.
const PREFIX_SCORE: f32 = 2.0;

/// One derived lookup row: the normalized key plus the position of the
/// record it was derived from. Rebuilt wholesale with the index.
#[derive(Debug, Clone)]
struct IndexEntry {
    key: String,
    pos: usize,
}

/// Normalized lookup structure over a catalog snapshot.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    records: Arc<[SteelRecord]>,
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    /// Build the index over a catalog snapshot.
    #[must_use]
    pub fn build(records: Arc<[SteelRecord]>) -> Self {
        let entries = records
            .iter()
            .enumerate()
            .map(|(pos, record)| IndexEntry {
                key: search_key(record),
                pos,
            })
            .collect();
        debug!(record_count = records.len(), "search index built");
        Self { records, entries }
    }

    /// Build from an owned record list.
    #[must_use]
    pub fn from_records(records: Vec<SteelRecord>) -> Self {
        Self::build(records.into())
    }

    /// The catalog snapshot this index was built over.
    #[must_use]
    pub fn records(&self) -> &[SteelRecord] {
        &self.records
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank records against a free-text query.
    ///
    /// An empty (or whitespace/punctuation-only) query returns no results.
    /// At most `limit` records are returned, best first; ties keep catalog
    /// order.
    #[must_use]
    pub fn query(&self, text: &str, limit: usize) -> Vec<&SteelRecord> {
        let query = normalize(text);
        if query.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let s = score(&entry.key, &query);
                (s > 0.0).then_some((s, entry.pos))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);

        debug!(
            query_len = query.len(),
            result_count = scored.len(),
            "query ranked"
        );
        scored
            .into_iter()
            .map(|(_, pos)| &self.records[pos])
            .collect()
    }
}

/// Derive a record's normalized search key: name + aliases + manufacturer,
/// joined and normalized.
#[must_use]
pub fn search_key(record: &SteelRecord) -> String {
    let joined = std::iter::once(record.name.as_str())
        .chain(record.aliases.iter().map(String::as_str))
        .chain(std::iter::once(record.mfg.as_str()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&joined)
}

/// Score one normalized key against a normalized query.
///
/// Both arguments must already be normalized; [`SearchIndex::query`] takes
/// care of that for callers.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(key: &str, query: &str) -> f32 {
    if key.contains(query) {
        return SUBSTRING_SCORE;
    }

    let key_tokens: BTreeSet<&str> = key.split_whitespace().collect();
    let query_tokens: BTreeSet<&str> = query.split_whitespace().collect();
    let overlap = query_tokens.intersection(&key_tokens).count();
    if overlap > 0 {
        return TOKEN_OVERLAP_BONUS.mul_add(overlap as f32, TOKEN_BASE_SCORE);
    }

    if key.starts_with(query) {
        return PREFIX_SCORE;
    }
    0.0
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::catalog::Finish;

    fn steel(name: &str, aliases: &[&str], mfg: &str) -> SteelRecord {
        SteelRecord {
            name: name.into(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
            mfg: mfg.into(),
            finish: Finish::Balanced,
            ..SteelRecord::default()
        }
    }

    fn sample_index() -> SearchIndex {
        SearchIndex::from_records(vec![
            steel("CPM-154", &["154CM"], "Crucible"),
            steel("VG-10", &[], "Takefu"),
            steel("MagnaCut", &["CPM MagnaCut"], "Crucible"),
            steel("N690", &["N690Co"], "B\u{f6}hler"),
        ])
    }

    // --- keys ---

    #[test]
    fn key_concatenates_name_aliases_manufacturer() {
        let record = steel("CPM-154", &["154CM"], "Crucible");
        assert_eq!(search_key(&record), "cpm154 154cm crucible");
    }

    #[test]
    fn key_skips_empty_parts() {
        let record = steel("VG-10", &[], "");
        assert_eq!(search_key(&record), "vg10");
    }

    // --- scoring rules ---

    #[test]
    fn substring_scores_three() {
        assert!((score("cpm154 154cm crucible", "154") - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn token_overlap_scores_base_plus_bonus() {
        // "crucible" is a whole token of the key; "999" is not.
        assert!((score("cpm154 154cm crucible", "crucible 999") - 2.25).abs() < f32::EPSILON);
    }

    #[test]
    fn two_token_overlap() {
        assert!((score("cpm154 154cm crucible", "crucible 154cm 999") - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn no_match_scores_zero() {
        assert!(score("vg10 takefu", "magnacut").abs() < f32::EPSILON);
    }

    #[test]
    fn substring_outranks_token_overlap() {
        // The query is both a contiguous substring and a full token of the
        // key: the substring rule fires first.
        let key = "vg10 takefu";
        assert!((score(key, "vg10") - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn token_overlap_outranks_prefix_value() {
        // A one-token overlap (2.25) beats the prefix score (2.0), so a
        // shared token ranks a key above any prefix-only candidate could be.
        assert!(TOKEN_BASE_SCORE + TOKEN_OVERLAP_BONUS > PREFIX_SCORE);
        assert!(SUBSTRING_SCORE > TOKEN_BASE_SCORE + TOKEN_OVERLAP_BONUS);
    }

    // --- query behavior ---

    #[test]
    fn empty_query_returns_nothing() {
        let index = sample_index();
        assert!(index.query("", 50).is_empty());
        assert!(index.query("   ", 50).is_empty());
        // Normalizes to empty: folded punctuation only.
        assert!(index.query("-.", 50).is_empty());
    }

    #[test]
    fn query_matches_alias() {
        let index = sample_index();
        let results = index.query("154cm", 50);
        assert_eq!(results[0].name, "CPM-154");
    }

    #[test]
    fn query_matches_manufacturer() {
        let index = sample_index();
        let names: Vec<&str> = index.query("crucible", 50).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["CPM-154", "MagnaCut"]);
    }

    #[test]
    fn query_is_accent_insensitive() {
        let index = sample_index();
        let results = index.query("bohler", 50);
        assert_eq!(results[0].name, "N690");
    }

    #[test]
    fn query_folds_hyphens() {
        let index = sample_index();
        let results = index.query("vg10", 50);
        assert_eq!(results[0].name, "VG-10");
    }

    #[test]
    fn limit_truncates() {
        let index = sample_index();
        let results = index.query("crucible", 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "CPM-154");
    }

    #[test]
    fn ties_keep_catalog_order() {
        let index = SearchIndex::from_records(vec![
            steel("First 14C28N", &[], "Sandvik"),
            steel("Second 14C28N", &[], "Sandvik"),
            steel("Third 14C28N", &[], "Sandvik"),
        ]);
        let names: Vec<&str> = index
            .query("14c28n", 50)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["First 14C28N", "Second 14C28N", "Third 14C28N"]);
    }

    #[test]
    fn higher_score_ranks_first_regardless_of_catalog_order() {
        let index = SearchIndex::from_records(vec![
            // Token overlap only (2.5): both tokens match, wrong order.
            steel("XR7", &[], "forge crucible"),
            // Contiguous substring (3.0).
            steel("crucible forge special", &[], ""),
        ]);
        let names: Vec<&str> = index
            .query("crucible forge", 50)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["crucible forge special", "XR7"]);
    }

    #[test]
    fn query_is_deterministic() {
        let index = sample_index();
        let a: Vec<String> = index.query("crucible", 50).iter().map(|r| r.name.clone()).collect();
        let b: Vec<String> = index.query("crucible", 50).iter().map(|r| r.name.clone()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_index_answers_empty() {
        let index = SearchIndex::from_records(Vec::new());
        assert!(index.is_empty());
        assert!(index.query("anything", 50).is_empty());
    }

    // --- property invariants ---

    proptest! {
        #[test]
        fn results_are_bounded_sorted_and_positive(query in ".{0,32}", limit in 0usize..8) {
            let index = sample_index();
            let results = index.query(&query, limit);
            prop_assert!(results.len() <= limit);

            let normalized = normalize(&query);
            let mut previous = f32::INFINITY;
            for record in results {
                let s = score(&search_key(record), &normalized);
                prop_assert!(s > 0.0);
                prop_assert!(s <= previous);
                previous = s;
            }
        }
    }
}
