#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading, validation and companion lookups for the address gazetteer.
//!
//! The gazetteer is an immutable snapshot of places, streets and areas
//! produced by an offline extraction step. This crate reads it from disk
//! in one of a closed set of [`GazetteerFormat`]s, refuses to hand out a
//! snapshot whose ids are internally inconsistent, and provides the
//! read-only projections ([`GazetteerLookup`]) a caller needs to render a
//! typeahead result.
//!
//! # Usage
//!
//! ```rust,no_run
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use address_typeahead_gazetteer::{GazetteerLookup, load};
//!
//! let gazetteer = load("data/bremen.msgpack.zst")?;
//! if let Some(name) = gazetteer.name(0) {
//!     println!("{name}: {:?}", gazetteer.area_names_sorted(0));
//! }
//! # Ok(())
//! # }
//! ```

pub mod format;
pub mod lookup;
pub mod progress;
pub mod validate;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_fixtures;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;
use std::time::Instant;

pub use address_typeahead_gazetteer_models::{
    ADMIN_LEVEL_MAX, Area, AreaLevel, Coordinates, Gazetteer, HouseNumber, Place, Record,
    RecordId, Street,
};
pub use format::{FileSpec, GazetteerFormat};
pub use lookup::GazetteerLookup;
pub use progress::{LogProgress, NullProgress, ProgressCallback};
pub use validate::InvalidGazetteer;

/// Default zstd compression level for compressed gazetteer files.
const ZSTD_LEVEL: i32 = 9;

/// Errors from gazetteer I/O and validation.
#[derive(Debug, thiserror::Error)]
pub enum GazetteerError {
    /// File could not be opened, read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `MessagePack` encoding failed.
    #[error("MessagePack encode error: {0}")]
    MessagePackEncode(#[from] rmp_serde::encode::Error),

    /// `MessagePack` decoding failed.
    #[error("MessagePack decode error: {0}")]
    MessagePackDecode(#[from] rmp_serde::decode::Error),

    /// The file extension does not name a known format.
    #[error("Unknown gazetteer format: {0}")]
    UnknownFormat(String),

    /// The snapshot is internally inconsistent.
    #[error("Invalid gazetteer: {0}")]
    Invalid(#[from] InvalidGazetteer),
}

/// Summary of a loaded gazetteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazetteerSummary {
    /// Number of place records.
    pub places: usize,
    /// Number of street records.
    pub streets: usize,
    /// Number of area records.
    pub areas: usize,
    /// Number of postcode areas among [`Self::areas`].
    pub postcode_areas: usize,
    /// Number of interned display names.
    pub names: usize,
}

impl GazetteerSummary {
    /// Counts the records of a gazetteer.
    #[must_use]
    pub fn of(gazetteer: &Gazetteer) -> Self {
        Self {
            places: gazetteer.places.len(),
            streets: gazetteer.streets.len(),
            areas: gazetteer.areas.len(),
            postcode_areas: gazetteer
                .areas
                .iter()
                .filter(|a| a.level.is_postcode())
                .count(),
            names: gazetteer.names.len(),
        }
    }
}

/// Loads and validates a gazetteer file.
///
/// The format is chosen from the file extension (see
/// [`FileSpec::from_path`]).
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or if the
/// decoded snapshot fails validation.
pub fn load(path: impl AsRef<Path>) -> Result<Gazetteer, GazetteerError> {
    load_with_progress(path, &NullProgress)
}

/// Same as [`load`], reporting validation progress to `progress`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or if the
/// decoded snapshot fails validation.
pub fn load_with_progress(
    path: impl AsRef<Path>,
    progress: &dyn ProgressCallback,
) -> Result<Gazetteer, GazetteerError> {
    let path = path.as_ref();
    load_as(path, FileSpec::from_path(path)?, progress)
}

/// Loads and validates a gazetteer file stored as `spec`, whatever its
/// file name says.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or if the
/// decoded snapshot fails validation.
pub fn load_as(
    path: impl AsRef<Path>,
    spec: FileSpec,
    progress: &dyn ProgressCallback,
) -> Result<Gazetteer, GazetteerError> {
    let gazetteer = read_as(path, spec, progress)?;
    validate::validate(&gazetteer, progress)?;
    Ok(gazetteer)
}

/// Decodes a gazetteer file stored as `spec` without validating it.
///
/// For callers that validate on their own, such as engine construction.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn read_as(
    path: impl AsRef<Path>,
    spec: FileSpec,
    progress: &dyn ProgressCallback,
) -> Result<Gazetteer, GazetteerError> {
    let path = path.as_ref();
    let start = Instant::now();

    log::info!("Loading gazetteer from {} ({spec})", path.display());
    progress.set_message(format!("Reading {}", path.display()));

    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let reader = BufReader::new(file);

    let gazetteer = if spec.compressed {
        let decoder = zstd::Decoder::new(reader).map_err(|e| io_error(path, e))?;
        spec.format.deserialize(decoder)?
    } else {
        spec.format.deserialize(reader)?
    };

    let summary = GazetteerSummary::of(&gazetteer);
    log::info!(
        "Gazetteer loaded: {} places, {} streets, {} areas ({} postcodes), {:.1}s",
        summary.places,
        summary.streets,
        summary.areas,
        summary.postcode_areas,
        start.elapsed().as_secs_f64()
    );

    Ok(gazetteer)
}

/// Writes a gazetteer to `path` in the format implied by its extension.
///
/// The file is written to a temporary sibling first and renamed into
/// place, so an interrupted write never leaves a truncated gazetteer.
///
/// # Errors
///
/// Returns an error if the extension is unknown, encoding fails or the
/// file cannot be written.
pub fn save(gazetteer: &Gazetteer, path: impl AsRef<Path>) -> Result<u64, GazetteerError> {
    let path = path.as_ref();
    let spec = FileSpec::from_path(path)?;

    log::info!("Writing gazetteer to {} ({spec})", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let file = File::create(tmp_path).map_err(|e| io_error(tmp_path, e))?;
    let mut writer = BufWriter::new(file);

    if spec.compressed {
        let mut encoder =
            zstd::Encoder::new(&mut writer, ZSTD_LEVEL).map_err(|e| io_error(tmp_path, e))?;
        spec.format.serialize(gazetteer, &mut encoder)?;
        encoder.finish().map_err(|e| io_error(tmp_path, e))?;
    } else {
        spec.format.serialize(gazetteer, &mut writer)?;
    }

    writer.flush().map_err(|e| io_error(tmp_path, e))?;
    drop(writer);

    std::fs::rename(tmp_path, path).map_err(|e| io_error(path, e))?;

    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    #[allow(clippy::cast_precision_loss)]
    let mb = size as f64 / 1_048_576.0;
    log::info!("  gazetteer size: {mb:.1} MB");

    Ok(size)
}

fn io_error(path: &Path, source: std::io::Error) -> GazetteerError {
    GazetteerError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::bremerhaven;

    fn round_trip(file_name: &str) {
        let dir = std::env::temp_dir().join("address_typeahead_gazetteer_round_trip");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join(file_name);

        let original = bremerhaven();
        let size = save(&original, &path).unwrap();
        assert!(size > 0);

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, original);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn saves_and_loads_json() {
        round_trip("fixture.json");
    }

    #[test]
    fn saves_and_loads_compressed_message_pack() {
        round_trip("fixture.msgpack.zst");
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = save(&bremerhaven(), std::env::temp_dir().join("fixture.csv")).unwrap_err();
        assert!(matches!(err, GazetteerError::UnknownFormat(_)));
    }

    #[test]
    fn load_refuses_invalid_snapshot() {
        let dir = std::env::temp_dir().join("address_typeahead_gazetteer_invalid");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("broken.json");

        let mut broken = bremerhaven();
        broken.places[0].name_id = 999;
        save(&broken, &path).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, GazetteerError::Invalid(_)));

        let spec = FileSpec::from_path(&path).unwrap();
        let decoded = read_as(&path, spec, &NullProgress).unwrap();
        assert_eq!(decoded, broken);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_as_ignores_file_name() {
        let dir = std::env::temp_dir().join("address_typeahead_gazetteer_load_as");
        let _ = std::fs::create_dir_all(&dir);
        let json = dir.join("fixture.json");
        let renamed = dir.join("fixture.data");

        save(&bremerhaven(), &json).unwrap();
        std::fs::rename(&json, &renamed).unwrap();

        assert!(matches!(load(&renamed), Err(GazetteerError::UnknownFormat(_))));
        let spec = FileSpec {
            format: GazetteerFormat::Json,
            compressed: false,
        };
        let loaded = load_as(&renamed, spec, &NullProgress).unwrap();
        assert_eq!(loaded, bremerhaven());

        let _ = std::fs::remove_file(&renamed);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load(std::env::temp_dir().join("does_not_exist.json")).unwrap_err();
        assert!(matches!(err, GazetteerError::Io { .. }));
    }

    #[test]
    fn summary_counts_postcode_areas() {
        let summary = GazetteerSummary::of(&bremerhaven());
        assert_eq!(summary.places, 3);
        assert_eq!(summary.streets, 3);
        assert_eq!(summary.postcode_areas, 2);
    }
}
