#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line front end for the address typeahead engine.
//!
//! Loads a gazetteer snapshot, builds the engine and either answers one
//! query, prints index statistics, re-encodes the snapshot or runs a
//! smoke test suite against it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use address_typeahead::{Typeahead, TypeaheadConfig, verify};
use address_typeahead_cli_utils::{IndicatifProgress, MultiProgress, format_bytes};
use address_typeahead_gazetteer::{
    GazetteerLookup, GazetteerSummary, LogProgress, ProgressCallback, RecordId,
};
use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "address_typeahead", about = "Address typeahead over a gazetteer snapshot")]
struct Cli {
    /// Engine configuration (TOML); the embedded defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log loading phases instead of drawing progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Complete a tokenized address query
    Query {
        /// Gazetteer file (`.json`, `.msgpack`, optionally `.zst`)
        gazetteer: PathBuf,
        /// Query tokens, e.g. `gartenstr 27568`
        #[arg(required = true)]
        tokens: Vec<String>,
        /// Maximum number of results
        #[arg(long)]
        max_results: Option<usize>,
        /// Treat the first token as the place name
        #[arg(long)]
        place_first: bool,
        /// Join this many consecutive tokens into extra lookup strings
        #[arg(long)]
        chain: Option<usize>,
        /// House numbers listed per street result
        #[arg(long, default_value_t = 5)]
        house_numbers: usize,
    },
    /// Print gazetteer and index statistics
    Stats {
        /// Gazetteer file
        gazetteer: PathBuf,
    },
    /// Re-encode a gazetteer; formats follow the file extensions
    Convert {
        /// Source gazetteer file
        input: PathBuf,
        /// Destination gazetteer file
        output: PathBuf,
    },
    /// Run a smoke test suite against a gazetteer
    Verify {
        /// Gazetteer file
        gazetteer: PathBuf,
        /// Suite file (TOML); the bundled sample suite when omitted
        suite: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = address_typeahead_cli_utils::init_logger(LevelFilter::Info);
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TypeaheadConfig::load(path)?,
        None => TypeaheadConfig::embedded()?,
    };

    let reporter = Reporter {
        multi,
        log_only: cli.no_progress,
    };

    match cli.command {
        Commands::Query {
            gazetteer,
            tokens,
            max_results,
            place_first,
            chain,
            house_numbers,
        } => {
            let mut config = config;
            if let Some(max_results) = max_results {
                config.complete.max_results = max_results;
            }
            if place_first {
                config.complete.first_token_is_place_name = true;
            }
            if let Some(chain) = chain {
                config.complete.chain_length = chain;
            }
            config.validate()?;

            let engine = build_engine(&reporter, &gazetteer, &config)?;
            run_query(&engine, &tokens, &config, house_numbers);
        }
        Commands::Stats { gazetteer } => {
            let engine = build_engine(&reporter, &gazetteer, &config)?;
            print_stats(&engine);
        }
        Commands::Convert { input, output } => {
            let progress = reporter.progress("Loading gazetteer");
            let gazetteer = address_typeahead_gazetteer::load_with_progress(&input, progress.as_ref())?;
            progress.finish_and_clear();

            let size = address_typeahead_gazetteer::save(&gazetteer, &output)?;
            println!(
                "Wrote {} ({})",
                output.display(),
                format_bytes(size)
            );
        }
        Commands::Verify { gazetteer, suite } => {
            let engine = build_engine(&reporter, &gazetteer, &config)?;
            run_verify(&engine, suite.as_deref(), &config)?;
        }
    }

    Ok(())
}

/// Chooses between progress bars and debug log lines.
struct Reporter {
    multi: MultiProgress,
    log_only: bool,
}

impl Reporter {
    fn progress(&self, message: &str) -> Arc<dyn ProgressCallback> {
        if self.log_only {
            let progress: Arc<dyn ProgressCallback> = Arc::new(LogProgress::default());
            progress.set_message(message.to_string());
            progress
        } else {
            IndicatifProgress::phase_bar(&self.multi, message)
        }
    }
}

/// Loads `gazetteer` and builds an engine over it, reporting progress.
fn build_engine(
    reporter: &Reporter,
    gazetteer: &Path,
    config: &TypeaheadConfig,
) -> Result<Typeahead, Box<dyn std::error::Error>> {
    let config = TypeaheadConfig {
        gazetteer: Some(gazetteer.to_path_buf()),
        ..config.clone()
    };

    let progress = reporter.progress("Loading gazetteer");
    let engine = address_typeahead::open(&config, progress.as_ref())?;
    progress.finish_and_clear();

    Ok(engine)
}

fn run_query(engine: &Typeahead, tokens: &[String], config: &TypeaheadConfig, house_numbers: usize) {
    let start = Instant::now();
    let results = engine.complete(tokens, &config.complete);
    let elapsed = start.elapsed();

    if results.is_empty() {
        println!("No matches for {:?}", tokens.join(" "));
        return;
    }

    for (rank, &id) in results.iter().enumerate() {
        println!("{:>3}. {}", rank + 1, describe(engine, id, house_numbers));
    }
    println!();
    println!(
        "{} results in {:.2} ms",
        results.len(),
        elapsed.as_secs_f64() * 1000.0
    );
}

/// One line describing a record: name, kind, areas, postcodes and a
/// few house numbers.
fn describe(engine: &Typeahead, id: RecordId, house_numbers: usize) -> String {
    let g = engine.gazetteer();
    let name = g.name(id).unwrap_or("?");
    let kind = if g.is_street(id) == Some(true) {
        "street"
    } else {
        "place"
    };

    let mut line = format!("{name} ({kind})");

    let areas = g.area_names_sorted(id).unwrap_or_default();
    if !areas.is_empty() {
        line.push_str(" | ");
        line.push_str(&areas.join(", "));
    }

    let postcodes = g.postcodes(id).unwrap_or_default();
    if !postcodes.is_empty() {
        let codes: Vec<String> = postcodes.iter().map(ToString::to_string).collect();
        line.push_str(" | ");
        line.push_str(&codes.join(", "));
    }

    let numbers = g.house_numbers(id).unwrap_or_default();
    if !numbers.is_empty() && house_numbers > 0 {
        line.push_str(" | ");
        line.push_str(&numbers.iter().take(house_numbers).copied().collect::<Vec<_>>().join(", "));
        if numbers.len() > house_numbers {
            line.push_str(&format!(" (+{} more)", numbers.len() - house_numbers));
        }
    }

    if let Some(c) = g.coordinates(id) {
        line.push_str(&format!(" @ {:.5}, {:.5}", c.latitude(), c.longitude()));
    }

    line
}

fn print_stats(engine: &Typeahead) {
    let summary = GazetteerSummary::of(engine.gazetteer());
    let stats = engine.stats();

    println!("Gazetteer");
    println!("  places:          {}", summary.places);
    println!("  streets:         {}", summary.streets);
    println!("  areas:           {}", summary.areas);
    println!("  postcode areas:  {}", summary.postcode_areas);
    println!("  names:           {}", summary.names);
    println!();
    println!("Name index");
    println!("  candidates:      {}", stats.names.candidates);
    println!("  trigrams:        {}", stats.names.trigrams);
    println!("  postings:        {}", stats.names.postings);
    println!();
    println!("Area index");
    println!("  candidates:      {}", stats.areas.candidates);
    println!("  trigrams:        {}", stats.areas.trigrams);
    println!("  postings:        {}", stats.areas.postings);
    println!();
    println!("Records:           {}", stats.records);
    println!("Postcodes:         {}", stats.postcodes);
    println!("Build time:        {:.2}s", stats.build_time_secs);
}

fn run_verify(
    engine: &Typeahead,
    suite: Option<&Path>,
    config: &TypeaheadConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let suite_toml = match suite {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        None => {
            log::info!("No suite given, running the bundled sample suite");
            verify::SAMPLE_SMOKE_TESTS_TOML.to_string()
        }
    };

    let report = verify::run_smoke_tests(engine, &suite_toml, &config.complete)?;

    for result in &report.results {
        if result.passed {
            println!("  PASS  {}", result.query);
        } else {
            println!(
                "  FAIL  {} (expected {:?}): {}",
                result.query,
                result.expect_name,
                result.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }
    println!();
    println!("{}/{} smoke tests passed", report.passed, report.total);

    if report.all_passed() {
        Ok(())
    } else {
        Err(format!("{} smoke tests failed", report.total - report.passed).into())
    }
}
