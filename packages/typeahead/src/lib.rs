#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory address typeahead over a static gazetteer.
//!
//! Given a handful of query tokens (for example `["gartenstr", "27568"]`)
//! the engine returns the ids of the places and streets the user most
//! likely means, best first. Matching is fuzzy: every name is broken into
//! trigrams, so misspellings and prefixes still score.
//!
//! Ranking runs in two passes:
//!
//! 1. Every textual token is looked up in a trigram index over record
//!    names and one over administrative area names. Each record collects
//!    a coarse score from its best name match (scaled by
//!    [`CompleteOptions::place_bias`]), its matching areas, and every
//!    queried postal code it lies in.
//! 2. The best finalists are re-ranked against a small index built from
//!    their own names and area names only, so a token that matched some
//!    unrelated area in pass 1 cannot carry a record to the top.
//!
//! # Usage
//!
//! ```rust,no_run
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use address_typeahead::{CompleteOptions, Typeahead};
//! use address_typeahead_gazetteer::GazetteerLookup;
//!
//! let gazetteer = address_typeahead_gazetteer::load("data/bremen.msgpack.zst")?;
//! let engine = Typeahead::build(gazetteer)?;
//!
//! for id in engine.complete(&["gartenstr", "27568"], &CompleteOptions::default()) {
//!     println!("{:?}", engine.gazetteer().name(id));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod guesser;
pub mod normalize;
pub mod query;
pub mod trigram;
pub mod verify;

use std::cmp::Ordering;

use address_typeahead_gazetteer::{GazetteerError, ProgressCallback};

pub use address_typeahead_models::{CompleteOptions, EngineStats, IndexStats, Match};
pub use config::TypeaheadConfig;
pub use engine::{Accumulator, Typeahead};
pub use guesser::TrigramIndex;
pub use normalize::normalize;

/// Errors from engine construction and configuration.
#[derive(Debug, thiserror::Error)]
pub enum TypeaheadError {
    /// The gazetteer could not be loaded or is inconsistent.
    #[error("Gazetteer error: {0}")]
    Gazetteer(#[from] GazetteerError),

    /// A configuration or smoke test file is malformed or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Loads the gazetteer named by `config` and builds an engine over it.
///
/// # Errors
///
/// Returns an error if the configuration names no gazetteer, or if the
/// gazetteer cannot be loaded or fails validation.
pub fn open(
    config: &TypeaheadConfig,
    progress: &dyn ProgressCallback,
) -> Result<Typeahead, TypeaheadError> {
    let path = config
        .gazetteer
        .as_deref()
        .ok_or_else(|| TypeaheadError::Config("no gazetteer configured".to_string()))?;
    let spec = config.file_spec(path)?;
    let gazetteer = address_typeahead_gazetteer::read_as(path, spec, progress)?;
    Typeahead::build_with_progress(gazetteer, progress)
}

/// Keeps the `k` smallest items under `cmp` and sorts them.
pub(crate) fn select_top<T>(items: &mut Vec<T>, k: usize, cmp: impl Fn(&T, &T) -> Ordering) {
    if k == 0 {
        items.clear();
        return;
    }
    if items.len() > k {
        items.select_nth_unstable_by(k - 1, &cmp);
        items.truncate(k);
    }
    items.sort_unstable_by(cmp);
}
