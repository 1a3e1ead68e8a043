#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types of the static address gazetteer.
//!
//! The gazetteer is produced offline by an extraction step (tag
//! filtering, polygon assembly, point-in-polygon area assignment) and
//! handed to the typeahead engine as an immutable snapshot. This crate
//! contains only the data types and simple accessors. It has no
//! heavyweight dependencies (no I/O, no indexing).
//!
//! # Record ids
//!
//! Places and streets share one dense id space: ids `0..places.len()`
//! address [`Gazetteer::places`], ids `places.len()..record_count()`
//! address [`Gazetteer::streets`].

use serde::{Deserialize, Serialize};

/// Dense id of a place or street record.
pub type RecordId = u32;

/// Scale of the fixed-point coordinate representation (1e-7 degrees).
pub const COORDINATE_PRECISION: f64 = 10_000_000.0;

/// Highest administrative level representable in an [`AreaLevel`].
pub const ADMIN_LEVEL_MAX: u8 = 15;

/// A WGS84 position stored as fixed-point integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in 1e-7 degrees.
    pub lat: i32,
    /// Longitude in 1e-7 degrees.
    pub lon: i32,
}

impl Coordinates {
    /// Converts degrees to the fixed-point representation.
    ///
    /// Values outside the `i32` range saturate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self {
            lat: (latitude * COORDINATE_PRECISION).round() as i32,
            lon: (longitude * COORDINATE_PRECISION).round() as i32,
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(self) -> f64 {
        f64::from(self.lat) / COORDINATE_PRECISION
    }

    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(self) -> f64 {
        f64::from(self.lon) / COORDINATE_PRECISION
    }
}

/// Level bitmask of an area.
///
/// Administrative areas set bit `1 << admin_level`; postal code areas set
/// only the [`AreaLevel::POSTCODE`] sentinel. The two are mutually
/// exclusive and a meaningful level is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaLevel(pub u32);

impl AreaLevel {
    /// Sentinel bit marking a postal code area.
    pub const POSTCODE: Self = Self(1 << 31);

    /// Mask covering every administrative level bit.
    pub const ADMIN_MASK: u32 = (1 << (ADMIN_LEVEL_MAX as u32 + 1)) - 1;

    /// Level for an administrative boundary (e.g. `8` for a city,
    /// `10` for a suburb). Returns `None` above [`ADMIN_LEVEL_MAX`].
    #[must_use]
    pub const fn admin(level: u8) -> Option<Self> {
        if level > ADMIN_LEVEL_MAX {
            return None;
        }
        Some(Self(1 << level))
    }

    /// Raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether this is the postal code sentinel.
    #[must_use]
    pub const fn is_postcode(self) -> bool {
        self.0 & Self::POSTCODE.0 != 0
    }

    /// Whether any administrative level bit is set.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.0 & Self::ADMIN_MASK != 0
    }

    /// Whether this level shares at least one bit with `mask`.
    #[must_use]
    pub const fn intersects(self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    /// The most local (highest) administrative level in the mask.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn admin_level(self) -> Option<u8> {
        let admin = self.0 & Self::ADMIN_MASK;
        if admin == 0 {
            None
        } else {
            Some((31 - admin.leading_zeros()) as u8)
        }
    }

    /// A level is well-formed when it is non-zero and never mixes the
    /// postcode sentinel with administrative bits.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        let unknown = self.0 & !(Self::ADMIN_MASK | Self::POSTCODE.0);
        unknown == 0 && (self.is_postcode() != self.is_admin())
    }
}

/// An administrative boundary or postal code area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Index into [`Gazetteer::area_names`], or the raw postal code when
    /// [`AreaLevel::is_postcode`] holds.
    pub name_id: u32,
    /// Level bitmask.
    pub level: AreaLevel,
    /// Popularity weight in `[0, inf)`.
    #[serde(default = "default_popularity")]
    pub popularity: f64,
}

const fn default_popularity() -> f64 {
    1.0
}

impl Area {
    /// Administrative area with the given area-name id.
    #[must_use]
    pub const fn admin(name_id: u32, level: AreaLevel, popularity: f64) -> Self {
        Self {
            name_id,
            level,
            popularity,
        }
    }

    /// Postal code area.
    #[must_use]
    pub const fn postcode(code: u32) -> Self {
        Self {
            name_id: code,
            level: AreaLevel::POSTCODE,
            popularity: 0.0,
        }
    }

    /// The postal code if this is a postcode area.
    #[must_use]
    pub const fn postcode_value(&self) -> Option<u32> {
        if self.level.is_postcode() {
            Some(self.name_id)
        } else {
            None
        }
    }
}

/// A named point of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// Index into [`Gazetteer::names`].
    pub name_id: u32,
    /// Location of the place.
    pub coordinates: Coordinates,
    /// Ids of every area containing the place.
    #[serde(default)]
    pub areas: Vec<u32>,
}

/// A single addressed building on a street.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseNumber {
    /// Index into [`Gazetteer::house_numbers`].
    pub house_number_id: u32,
    /// Location of the building.
    pub coordinates: Coordinates,
}

/// A street together with its house numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Street {
    /// Index into [`Gazetteer::names`].
    pub name_id: u32,
    /// House numbers on this street.
    #[serde(default)]
    pub house_numbers: Vec<HouseNumber>,
    /// Ids of every area the street belongs to.
    #[serde(default)]
    pub areas: Vec<u32>,
}

/// Immutable snapshot handed over by the extraction step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gazetteer {
    /// Interned display names of places and streets.
    #[serde(default)]
    pub names: Vec<String>,
    /// Interned names of administrative areas.
    #[serde(default)]
    pub area_names: Vec<String>,
    /// Interned house number strings.
    #[serde(default)]
    pub house_numbers: Vec<String>,
    /// Place records.
    #[serde(default)]
    pub places: Vec<Place>,
    /// Street records.
    #[serde(default)]
    pub streets: Vec<Street>,
    /// Area records.
    #[serde(default)]
    pub areas: Vec<Area>,
}

/// Borrowed view of a place or street record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// A place.
    Place(&'a Place),
    /// A street.
    Street(&'a Street),
}

impl Record<'_> {
    /// Index into [`Gazetteer::names`].
    #[must_use]
    pub const fn name_id(&self) -> u32 {
        match self {
            Self::Place(p) => p.name_id,
            Self::Street(s) => s.name_id,
        }
    }

    /// Ids of the areas the record belongs to.
    #[must_use]
    pub fn area_ids(&self) -> &[u32] {
        match self {
            Self::Place(p) => &p.areas,
            Self::Street(s) => &s.areas,
        }
    }
}

impl Gazetteer {
    /// Total number of place and street records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.places.len() + self.streets.len()
    }

    /// Looks up a record by id. Returns `None` for out-of-range ids.
    #[must_use]
    pub fn record(&self, id: RecordId) -> Option<Record<'_>> {
        let idx = id as usize;
        if let Some(place) = self.places.get(idx) {
            return Some(Record::Place(place));
        }
        idx.checked_sub(self.places.len())
            .and_then(|i| self.streets.get(i))
            .map(Record::Street)
    }
}
