//! Trigram similarity index over a fixed list of weighted strings.
//!
//! Candidates are normalized once at construction time and every
//! trigram is mapped to the sorted ids of the candidates containing it.
//! A query walks only the posting lists of its own trigrams, so the cost
//! of a lookup is proportional to the number of candidates sharing at
//! least one trigram with the query.

use std::collections::HashMap;

use address_typeahead_models::{IndexStats, Match};

use crate::normalize::normalize;
use crate::select_top;
use crate::trigram::{Trigram, trigrams};

/// Similarity above which an exact whole-token match is rewarded.
const EXACT_TOKEN_GATE: f64 = 0.5;

/// Multiplier applied when query and candidate share a whole token.
const EXACT_TOKEN_BONUS: f64 = 1.33;

/// Minimum normalized length of anything that is scored.
pub const MIN_TRIGRAM_LEN: usize = 3;

#[derive(Debug, Clone)]
struct Candidate {
    text: String,
    weight: f64,
    /// Number of trigram positions, `len - 2`; zero for candidates too
    /// short to score.
    span: usize,
}

impl Candidate {
    fn len(&self) -> usize {
        self.text.len()
    }
}

/// Answers "which candidates are most similar to this query string".
#[derive(Debug, Clone, Default)]
pub struct TrigramIndex {
    candidates: Vec<Candidate>,
    postings: HashMap<Trigram, Vec<u32>>,
}

impl TrigramIndex {
    /// Builds an index over `(string, weight)` pairs. The position of a
    /// pair in the input becomes its candidate id.
    ///
    /// Candidates whose normalized form is shorter than three characters
    /// keep their id but never appear in a result.
    pub fn build<S: AsRef<str>>(candidates: impl IntoIterator<Item = (S, f64)>) -> Self {
        let mut index = Self::default();

        for (idx, (text, weight)) in candidates.into_iter().enumerate() {
            let Ok(id) = u32::try_from(idx) else {
                log::warn!("Trigram index is full, ignoring candidates past {idx}");
                break;
            };

            let text = normalize(text.as_ref());
            let span = trigram_span(&text);

            if span > 0 {
                for t in trigrams(&text) {
                    let list = index.postings.entry(t).or_default();
                    if list.last() != Some(&id) {
                        list.push(id);
                    }
                }
            }

            index.candidates.push(Candidate { text, weight, span });
        }

        index.postings.shrink_to_fit();
        index
    }

    /// Number of candidates, short ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the index has no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Normalized text of a candidate.
    #[must_use]
    pub fn candidate_text(&self, id: u32) -> Option<&str> {
        self.candidates.get(id as usize).map(|c| c.text.as_str())
    }

    /// Size of the index.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            candidates: self.candidates.len(),
            trigrams: self.postings.len(),
            postings: self.postings.values().map(Vec::len).sum(),
        }
    }

    /// Returns at most `count` matches, best first (descending
    /// similarity, ties by ascending id).
    ///
    /// Queries shorter than three normalized characters return nothing.
    #[must_use]
    pub fn guess_match(&self, query: &str, count: usize) -> Vec<Match> {
        let mut matches = self.score_all(query);
        select_top(&mut matches, count, Match::rank_cmp);
        matches
    }

    /// Returns every match with similarity `>= threshold`, padded with the
    /// next best matches until at least `min` are returned (or the
    /// matches run out). Best first.
    #[must_use]
    pub fn guess_threshold(&self, query: &str, threshold: f64, min: usize) -> Vec<Match> {
        let mut matches = self.score_all(query);
        matches.sort_unstable_by(Match::rank_cmp);
        let above = matches.partition_point(|m| m.similarity >= threshold);
        matches.truncate(above.max(min));
        matches
    }

    /// Scores every candidate sharing at least one trigram with `query`.
    /// The result is unordered.
    fn score_all(&self, query: &str) -> Vec<Match> {
        let query = normalize(query);
        if query.len() < MIN_TRIGRAM_LEN || self.candidates.is_empty() {
            return Vec::new();
        }

        let mut query_trigrams: Vec<Trigram> = trigrams(&query).collect();
        query_trigrams.sort_unstable();
        query_trigrams.dedup();

        let mut hits: Vec<u32> = Vec::new();
        for t in &query_trigrams {
            if let Some(list) = self.postings.get(t) {
                hits.extend_from_slice(list);
            }
        }
        hits.sort_unstable();

        let query_span = trigram_span(&query);
        let query_tokens: Vec<&str> = query.split(' ').collect();

        hits.chunk_by(|a, b| a == b)
            .filter_map(|run| {
                let id = run[0];
                let candidate = self.candidates.get(id as usize)?;
                let similarity = similarity(
                    candidate,
                    run.len(),
                    query.len(),
                    query_span,
                    &query_tokens,
                );
                Some(Match { id, similarity })
            })
            .collect()
    }
}

fn similarity(
    candidate: &Candidate,
    match_count: usize,
    query_len: usize,
    query_span: usize,
    query_tokens: &[&str],
) -> f64 {
    // One square root of the product keeps equal lengths exact.
    let norm = len_as_f64(query_span.saturating_mul(candidate.span)).sqrt();
    let mut sim = candidate.weight * len_as_f64(match_count) / norm;

    if candidate.len() < query_len {
        sim *= len_as_f64(candidate.len()) / len_as_f64(query_len);
    }

    if sim > EXACT_TOKEN_GATE
        && candidate
            .text
            .split(' ')
            .any(|token| query_tokens.contains(&token))
    {
        sim *= EXACT_TOKEN_BONUS;
    }

    sim
}

const fn trigram_span(text: &str) -> usize {
    if text.len() >= MIN_TRIGRAM_LEN {
        text.len() - 2
    } else {
        0
    }
}

#[allow(clippy::cast_precision_loss)]
fn len_as_f64(n: usize) -> f64 {
    n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> TrigramIndex {
        TrigramIndex::build(names.iter().map(|n| (*n, 1.0)))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn identical_strings_get_the_exact_token_bonus() {
        let idx = index(&["Lehe"]);
        let matches = idx.guess_match("lehe", 5);
        assert_eq!(matches.len(), 1);
        assert!(close(matches[0].similarity, 1.33));
    }

    #[test]
    fn prefix_query_scores_below_gate() {
        let idx = index(&["Hochschulstraße"]);
        let matches = idx.guess_match("Hoch", 5);
        assert_eq!(matches.len(), 1);
        // 2 shared trigrams / (sqrt(2) * sqrt(14))
        assert!(close(matches[0].similarity, 0.378));
    }

    #[test]
    fn shorter_candidates_are_damped() {
        let idx = index(&["Bremen"]);
        let matches = idx.guess_match("Bremerhaven", 5);
        assert_eq!(matches.len(), 1);
        // 3 / (3 * 2) = 0.5, damped by 6/11
        assert!(close(matches[0].similarity, 0.5 * 6.0 / 11.0));
    }

    #[test]
    fn weight_scales_similarity() {
        let idx = TrigramIndex::build([("Mitte", 1.0), ("Mitte", 0.5), ("Mitte", 0.0)]);
        let matches = idx.guess_match("mitte", 5);
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].id, 0);
        assert!(close(matches[0].similarity, 1.33));
        // 0.5 is not above the gate, so no bonus
        assert!(close(matches[1].similarity, 0.5));
        assert!(close(matches[2].similarity, 0.0));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn similarity_exactly_at_gate_gets_no_bonus() {
        let idx = TrigramIndex::build([("Mitte", 0.5)]);
        let matches = idx.guess_match("mitte", 1);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].similarity, 0.5);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn zero_weight_candidates_are_still_returned() {
        let idx = TrigramIndex::build([("Gartenstraße", 0.0)]);
        let matches = idx.guess_match("gartenstrasse", 1);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 0);
        assert_eq!(matches[0].similarity, 0.0);
    }

    #[test]
    fn short_query_returns_nothing() {
        let idx = index(&["Am", "Test"]);
        assert!(idx.guess_match("am", 5).is_empty());
        assert!(idx.guess_match("-- a", 5).is_empty());
        assert!(idx.guess_threshold("te", 0.0, 5).is_empty());
    }

    #[test]
    fn short_candidates_keep_ids_but_never_match() {
        let idx = index(&["Am", "Amsel"]);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.candidate_text(0), Some("am"));
        let matches = idx.guess_match("amsel", 5);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 1);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let idx = TrigramIndex::build(Vec::<(String, f64)>::new());
        assert!(idx.is_empty());
        assert!(idx.guess_match("anything", 10).is_empty());
        assert_eq!(idx.stats(), IndexStats::default());
    }

    #[test]
    fn results_are_bounded_and_ordered() {
        let idx = index(&[
            "Gartenstraße",
            "Hochschulstraße",
            "Bürgermeister-Smidt-Straße",
            "Am Wasserturm",
            "Strandstraße",
            "Straße",
        ]);
        for k in 0..8 {
            let matches = idx.guess_match("strasse", k);
            assert!(matches.len() <= k);
            for pair in matches.windows(2) {
                assert!(pair[0].similarity >= pair[1].similarity);
            }
        }
        let top = idx.guess_match("strasse", 1);
        assert_eq!(top[0].id, 5);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let idx = index(&["Test", "Test", "Test"]);
        let ids: Vec<u32> = idx.guess_match("test", 2).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn repeated_query_trigrams_count_once() {
        let idx = index(&["aaaa"]);
        let matches = idx.guess_match("aaaaaa", 1);
        // one distinct trigram, damped by 4/6
        let expected = 1.0 / (2.0_f64.sqrt() * 4.0_f64.sqrt()) * 4.0 / 6.0;
        assert!(close(matches[0].similarity, expected));
    }

    #[test]
    fn threshold_pads_up_to_min() {
        let idx = index(&["Hochschulstraße", "Hochstraße", "Gartenstraße"]);
        let strict = idx.guess_threshold("hochschulstrasse", 1.0, 0);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].id, 0);

        let padded = idx.guess_threshold("hochschulstrasse", 1.0, 2);
        assert_eq!(padded.len(), 2);
        assert_eq!(padded[0].id, 0);

        let all = idx.guess_threshold("hochschulstrasse", 0.0, 0);
        assert_eq!(all.len(), 3);

        let capped = idx.guess_threshold("hochschulstrasse", 10.0, 10);
        assert_eq!(capped.len(), 3);
    }

    #[test]
    fn stats_count_postings() {
        let idx = index(&["abc", "abcd", "x"]);
        let stats = idx.stats();
        assert_eq!(stats.candidates, 3);
        assert_eq!(stats.trigrams, 2);
        assert_eq!(stats.postings, 3);
    }
}
