#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the address typeahead engine.
//!
//! This crate contains only data types, configuration structs, and simple
//! conversions. It has no heavyweight dependencies (no indexing, no I/O).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Tuning knobs of a single `complete` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteOptions {
    /// Maximum number of record ids returned.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Number of candidates kept per trigram query and number of
    /// finalists re-ranked in the precise pass.
    #[serde(default = "default_max_guesses")]
    pub max_guesses: usize,

    /// Similarities and final scores below this value are discarded.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,

    /// Influence of the record's own name relative to its areas.
    /// Below 1 favors areas, above 1 favors places.
    #[serde(default = "default_place_bias")]
    pub place_bias: f64,

    /// Treat the first token as the place name; it is then never matched
    /// against area names and never starts a chained window.
    #[serde(default)]
    pub first_token_is_place_name: bool,

    /// Number of consecutive tokens joined into one additional query
    /// string, so multi-word names can match as a unit. `1` disables
    /// chaining.
    #[serde(default = "default_chain_length")]
    pub chain_length: usize,
}

const fn default_max_results() -> usize {
    10
}

const fn default_max_guesses() -> usize {
    100
}

const fn default_min_similarity() -> f64 {
    0.01
}

const fn default_place_bias() -> f64 {
    1.5
}

const fn default_chain_length() -> usize {
    1
}

impl Default for CompleteOptions {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_guesses: default_max_guesses(),
            min_similarity: default_min_similarity(),
            place_bias: default_place_bias(),
            first_token_is_place_name: false,
            chain_length: default_chain_length(),
        }
    }
}

impl CompleteOptions {
    /// Default options with a different result limit.
    #[must_use]
    pub fn with_max_results(max_results: usize) -> Self {
        Self {
            max_results,
            ..Self::default()
        }
    }

    /// Returns a description of the first out-of-range option, if any.
    #[must_use]
    pub fn invalid_reason(&self) -> Option<&'static str> {
        if !(self.place_bias.is_finite() && self.place_bias > 0.0) {
            return Some("place_bias must be a finite value greater than 0");
        }
        if !(self.min_similarity.is_finite() && self.min_similarity >= 0.0) {
            return Some("min_similarity must be a finite value of at least 0");
        }
        if self.chain_length == 0 {
            return Some("chain_length must be at least 1");
        }
        None
    }
}

/// A candidate id paired with its similarity to a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Dense id of the candidate within its index.
    pub id: u32,
    /// Similarity score (higher is better).
    pub similarity: f64,
}

impl Match {
    /// Ranking order: descending similarity, ties broken by ascending id.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .similarity
            .total_cmp(&self.similarity)
            .then(self.id.cmp(&other.id))
    }
}

/// Size of one trigram index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of candidates (including ones too short to score).
    pub candidates: usize,
    /// Number of distinct trigrams with a posting list.
    pub trigrams: usize,
    /// Sum of all posting list lengths.
    pub postings: usize,
}

/// Size of a constructed typeahead engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Number of place and street records.
    pub records: usize,
    /// Trigram index over display names.
    pub names: IndexStats,
    /// Trigram index over area names.
    pub areas: IndexStats,
    /// Number of distinct postal codes.
    pub postcodes: usize,
    /// Time taken to build the engine in seconds.
    pub build_time_secs: f64,
}
