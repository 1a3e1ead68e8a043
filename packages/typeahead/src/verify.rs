//! Smoke test runner for a built engine.
//!
//! A suite is a TOML file listing queries together with the record each
//! one should find. The suite in `smoke_tests.toml` is compiled in and
//! targets the Bremerhaven sample gazetteer; deployments pass their own
//! suite matching their data.

use address_typeahead_gazetteer::{Coordinates, GazetteerLookup, RecordId};
use address_typeahead_models::CompleteOptions;
use serde::Deserialize;

use crate::{Typeahead, TypeaheadError};

/// Embedded sample suite (compiled into the binary).
pub const SAMPLE_SMOKE_TESTS_TOML: &str = include_str!("../smoke_tests.toml");

/// Parsed smoke test suite.
#[derive(Debug, Deserialize)]
struct SmokeTestConfig {
    /// Default coordinate tolerance in degrees.
    default_tolerance: f64,
    /// Individual test cases.
    tests: Vec<SmokeTestEntry>,
}

/// A single smoke test entry from the TOML file.
#[derive(Debug, Deserialize)]
struct SmokeTestEntry {
    /// Query tokens passed to `complete`.
    tokens: Vec<String>,
    /// Display name the matching record must have.
    expect_name: String,
    /// Administrative area the matching record must lie in.
    expect_area: Option<String>,
    /// House number the matching street must carry.
    house_number: Option<String>,
    /// Expected latitude.
    lat: Option<f64>,
    /// Expected longitude.
    lon: Option<f64>,
    /// Optional per-test tolerance override.
    tolerance: Option<f64>,
    /// Number of leading results searched for the expected record.
    #[serde(default = "default_max_rank")]
    max_rank: usize,
}

const fn default_max_rank() -> usize {
    1
}

/// Result of a single smoke test.
#[derive(Debug)]
pub struct SmokeTestResult {
    /// The query tokens joined by spaces.
    pub query: String,
    /// Expected display name.
    pub expect_name: String,
    /// Record that satisfied the expectations (if any).
    pub matched: Option<RecordId>,
    /// Zero-based position of [`Self::matched`] in the results.
    pub rank: Option<usize>,
    /// Actual position checked against the expectation (if any).
    pub actual: Option<Coordinates>,
    /// Tolerance used for this test.
    pub tolerance: f64,
    /// Whether the test passed.
    pub passed: bool,
    /// Reason for failure (if any).
    pub failure_reason: Option<String>,
}

/// Aggregate report from running a suite.
#[derive(Debug)]
pub struct SmokeTestReport {
    /// Individual test results.
    pub results: Vec<SmokeTestResult>,
    /// Number of tests that passed.
    pub passed: usize,
    /// Total number of tests.
    pub total: usize,
}

impl SmokeTestReport {
    /// Returns `true` if all tests passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Runs every test of `suite_toml` against `engine` with `options`.
///
/// `options.max_results` is raised where a test searches deeper than
/// the configured limit.
///
/// # Errors
///
/// Returns [`TypeaheadError::Config`] if the suite cannot be parsed.
pub fn run_smoke_tests(
    engine: &Typeahead,
    suite_toml: &str,
    options: &CompleteOptions,
) -> Result<SmokeTestReport, TypeaheadError> {
    let config: SmokeTestConfig = toml::from_str(suite_toml)
        .map_err(|e| TypeaheadError::Config(format!("Failed to parse smoke test suite: {e}")))?;

    let results: Vec<SmokeTestResult> = config
        .tests
        .iter()
        .map(|entry| {
            let tolerance = entry.tolerance.unwrap_or(config.default_tolerance);
            run_single_test(engine, entry, options, tolerance)
        })
        .collect();

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    Ok(SmokeTestReport {
        results,
        passed,
        total,
    })
}

/// Runs a single smoke test.
fn run_single_test(
    engine: &Typeahead,
    entry: &SmokeTestEntry,
    options: &CompleteOptions,
    tolerance: f64,
) -> SmokeTestResult {
    let query = entry.tokens.join(" ");
    let max_rank = entry.max_rank.max(1);
    let options = CompleteOptions {
        max_results: options.max_results.max(max_rank),
        ..options.clone()
    };

    let results = engine.complete(entry.tokens.as_slice(), &options);
    if results.is_empty() {
        log::warn!("Smoke test query {query:?} returned nothing");
    }

    let gazetteer = engine.gazetteer();
    let found = results
        .iter()
        .take(max_rank)
        .enumerate()
        .find(|&(_, &id)| {
            gazetteer.name(id) == Some(entry.expect_name.as_str())
                && entry.expect_area.as_deref().is_none_or(|area| {
                    gazetteer
                        .area_names(id)
                        .is_some_and(|names| names.contains(&area))
                })
        });

    let mut result = SmokeTestResult {
        query,
        expect_name: entry.expect_name.clone(),
        matched: None,
        rank: None,
        actual: None,
        tolerance,
        passed: false,
        failure_reason: None,
    };

    let Some((rank, &id)) = found else {
        let got: Vec<&str> = results
            .iter()
            .take(max_rank)
            .filter_map(|&id| gazetteer.name(id))
            .collect();
        result.failure_reason = Some(format!(
            "expected {:?} within the first {max_rank} results, got {got:?}",
            entry.expect_name
        ));
        return result;
    };

    result.matched = Some(id);
    result.rank = Some(rank);

    let position = match &entry.house_number {
        Some(house_number) => {
            let Some(c) = gazetteer.house_number_coordinates(id, house_number) else {
                result.failure_reason = Some(format!("house number {house_number:?} not found"));
                return result;
            };
            Some(c)
        }
        None => gazetteer.coordinates(id),
    };
    result.actual = position;

    if let (Some(lat), Some(lon)) = (entry.lat, entry.lon) {
        let Some(c) = position else {
            result.failure_reason = Some("record has no coordinates".to_string());
            return result;
        };
        let dlat = (c.latitude() - lat).abs();
        let dlon = (c.longitude() - lon).abs();
        if dlat > tolerance || dlon > tolerance {
            result.failure_reason = Some(format!(
                "coordinates too far: delta lat={dlat:.5}, lon={dlon:.5} (tolerance={tolerance})"
            ));
            return result;
        }
    }

    result.passed = true;
    result
}
