//! Consistency checks run once before a gazetteer is served.
//!
//! The engine trusts ids blindly at query time, so every cross-reference
//! is checked here and a single violation rejects the whole snapshot.

use crate::progress::ProgressCallback;
use crate::{Gazetteer, Record, RecordId};

/// A construction-time inconsistency in a gazetteer snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidGazetteer {
    /// More records than fit the 32-bit id space.
    #[error("too many records: {0}")]
    TooManyRecords(usize),

    /// A record references a display name that does not exist.
    #[error("record {record} references unknown name {name_id}")]
    UnknownName {
        /// Offending record.
        record: RecordId,
        /// Missing name id.
        name_id: u32,
    },

    /// A record references an area that does not exist.
    #[error("record {record} references unknown area {area_id}")]
    UnknownArea {
        /// Offending record.
        record: RecordId,
        /// Missing area id.
        area_id: u32,
    },

    /// A street references a house number string that does not exist.
    #[error("record {record} references unknown house number {house_number_id}")]
    UnknownHouseNumber {
        /// Offending street record.
        record: RecordId,
        /// Missing house number id.
        house_number_id: u32,
    },

    /// An administrative area references an area name that does not exist.
    #[error("area {area_id} references unknown area name {name_id}")]
    UnknownAreaName {
        /// Offending area.
        area_id: u32,
        /// Missing area name id.
        name_id: u32,
    },

    /// An area level is zero, has unknown bits, or mixes the postcode
    /// sentinel with administrative bits.
    #[error("area {area_id} has invalid level bits {bits:#x}")]
    InvalidLevel {
        /// Offending area.
        area_id: u32,
        /// Raw level bits.
        bits: u32,
    },

    /// An area popularity is negative or not finite.
    #[error("area {area_id} has invalid popularity {popularity}")]
    InvalidPopularity {
        /// Offending area.
        area_id: u32,
        /// Rejected value.
        popularity: f64,
    },

    /// A postcode area carries the code `0`, which cannot be queried.
    #[error("postcode area {area_id} has code 0")]
    ZeroPostcode {
        /// Offending area.
        area_id: u32,
    },
}

/// Checks every cross-reference of `gazetteer`.
///
/// Progress is reported per record to `progress`.
///
/// # Errors
///
/// Returns the first inconsistency found.
pub fn validate(
    gazetteer: &Gazetteer,
    progress: &dyn ProgressCallback,
) -> Result<(), InvalidGazetteer> {
    let record_count = gazetteer.record_count();
    if u32::try_from(record_count).is_err() || u32::try_from(gazetteer.areas.len()).is_err() {
        return Err(InvalidGazetteer::TooManyRecords(record_count));
    }

    progress.set_message("Validating areas".to_string());
    for (area_id, area) in (0u32..).zip(&gazetteer.areas) {
        if !area.level.is_valid() {
            return Err(InvalidGazetteer::InvalidLevel {
                area_id,
                bits: area.level.bits(),
            });
        }
        if !area.popularity.is_finite() || area.popularity < 0.0 {
            return Err(InvalidGazetteer::InvalidPopularity {
                area_id,
                popularity: area.popularity,
            });
        }
        if area.level.is_postcode() {
            if area.name_id == 0 {
                return Err(InvalidGazetteer::ZeroPostcode { area_id });
            }
        } else if area.name_id as usize >= gazetteer.area_names.len() {
            return Err(InvalidGazetteer::UnknownAreaName {
                area_id,
                name_id: area.name_id,
            });
        }
    }

    progress.set_message("Validating records".to_string());
    progress.set_total(record_count as u64);

    for id in 0..record_count {
        #[allow(clippy::cast_possible_truncation)]
        let record_id = id as RecordId;
        let Some(record) = gazetteer.record(record_id) else {
            continue;
        };

        let name_id = record.name_id();
        if name_id as usize >= gazetteer.names.len() {
            return Err(InvalidGazetteer::UnknownName {
                record: record_id,
                name_id,
            });
        }

        if let Some(&area_id) = record
            .area_ids()
            .iter()
            .find(|&&a| a as usize >= gazetteer.areas.len())
        {
            return Err(InvalidGazetteer::UnknownArea {
                record: record_id,
                area_id,
            });
        }

        if let Record::Street(street) = record
            && let Some(hn) = street
                .house_numbers
                .iter()
                .find(|hn| hn.house_number_id as usize >= gazetteer.house_numbers.len())
        {
            return Err(InvalidGazetteer::UnknownHouseNumber {
                record: record_id,
                house_number_id: hn.house_number_id,
            });
        }

        if id.is_multiple_of(100_000) {
            progress.set_position(id as u64);
        }
    }

    progress.finish(format!("Validated {record_count} records"));
    log::debug!(
        "Gazetteer valid: {record_count} records, {} areas",
        gazetteer.areas.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use crate::test_fixtures::bremerhaven;
    use crate::{Area, AreaLevel, HouseNumber};

    #[test]
    fn accepts_fixture() {
        assert_eq!(validate(&bremerhaven(), &NullProgress), Ok(()));
    }

    #[test]
    fn accepts_empty_gazetteer() {
        assert_eq!(validate(&Gazetteer::default(), &NullProgress), Ok(()));
    }

    #[test]
    fn rejects_unknown_name() {
        let mut g = bremerhaven();
        g.streets[0].name_id = 42;
        let record = u32::try_from(g.places.len()).unwrap();
        assert_eq!(
            validate(&g, &NullProgress),
            Err(InvalidGazetteer::UnknownName {
                record,
                name_id: 42
            })
        );
    }

    #[test]
    fn rejects_unknown_area() {
        let mut g = bremerhaven();
        g.places[1].areas.push(77);
        assert_eq!(
            validate(&g, &NullProgress),
            Err(InvalidGazetteer::UnknownArea {
                record: 1,
                area_id: 77
            })
        );
    }

    #[test]
    fn rejects_unknown_house_number() {
        let mut g = bremerhaven();
        g.streets[0].house_numbers.push(HouseNumber {
            house_number_id: 500,
            coordinates: g.places[0].coordinates,
        });
        assert!(matches!(
            validate(&g, &NullProgress),
            Err(InvalidGazetteer::UnknownHouseNumber {
                house_number_id: 500,
                ..
            })
        ));
    }

    #[test]
    fn rejects_mixed_level_bits() {
        let mut g = bremerhaven();
        g.areas[0].level = AreaLevel(AreaLevel::POSTCODE.bits() | (1 << 4));
        assert!(matches!(
            validate(&g, &NullProgress),
            Err(InvalidGazetteer::InvalidLevel { area_id: 0, .. })
        ));
    }

    #[test]
    fn rejects_zero_level() {
        let mut g = bremerhaven();
        g.areas[1].level = AreaLevel(0);
        assert!(matches!(
            validate(&g, &NullProgress),
            Err(InvalidGazetteer::InvalidLevel { area_id: 1, bits: 0 })
        ));
    }

    #[test]
    fn rejects_negative_popularity() {
        let mut g = bremerhaven();
        g.areas[2].popularity = -1.0;
        assert!(matches!(
            validate(&g, &NullProgress),
            Err(InvalidGazetteer::InvalidPopularity { area_id: 2, .. })
        ));
    }

    #[test]
    fn rejects_zero_postcode() {
        let mut g = bremerhaven();
        g.areas.push(Area::postcode(0));
        let area_id = u32::try_from(g.areas.len() - 1).unwrap();
        assert_eq!(
            validate(&g, &NullProgress),
            Err(InvalidGazetteer::ZeroPostcode { area_id })
        );
    }

    #[test]
    fn rejects_unknown_area_name() {
        let mut g = bremerhaven();
        g.areas.push(Area::admin(99, AreaLevel::admin(9).unwrap(), 1.0));
        assert!(matches!(
            validate(&g, &NullProgress),
            Err(InvalidGazetteer::UnknownAreaName { name_id: 99, .. })
        ));
    }
}
