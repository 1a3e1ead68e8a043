//! Read-only projections used to render a typeahead result.
//!
//! Every lookup takes a [`RecordId`] as returned by the engine and
//! yields `None` when the id is out of range, so callers never index
//! past the end of the snapshot.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::{Coordinates, Gazetteer, Record, RecordId};

/// Companion lookups over a [`Gazetteer`].
pub trait GazetteerLookup {
    /// Display name of a record.
    fn name(&self, id: RecordId) -> Option<&str>;

    /// Whether the record is a street (as opposed to a place).
    fn is_street(&self, id: RecordId) -> Option<bool>;

    /// Ids of every area the record belongs to, postcodes included.
    fn area_ids(&self, id: RecordId) -> Option<&[u32]>;

    /// Ids of the record's areas whose level intersects `level_mask`.
    fn area_ids_filtered(&self, id: RecordId, level_mask: u32) -> Option<Vec<u32>>;

    /// Names of the record's administrative areas, in record order.
    fn area_names(&self, id: RecordId) -> Option<Vec<&str>>;

    /// Names of the record's administrative areas, most local level
    /// first, each name listed once.
    fn area_names_sorted(&self, id: RecordId) -> Option<Vec<&str>>;

    /// Postal codes of the record.
    fn postcodes(&self, id: RecordId) -> Option<Vec<u32>>;

    /// House number strings of the record; empty for places.
    fn house_numbers(&self, id: RecordId) -> Option<Vec<&str>>;

    /// Location of the record. Streets report their first house number.
    fn coordinates(&self, id: RecordId) -> Option<Coordinates>;

    /// Location of a specific house number on a street.
    fn house_number_coordinates(&self, id: RecordId, house_number: &str) -> Option<Coordinates>;

    /// Name of an administrative area; `None` for postcodes.
    fn area_name(&self, area_id: u32) -> Option<&str>;

    /// Every interned display name.
    fn all_names(&self) -> &[String];
}

impl GazetteerLookup for Gazetteer {
    fn name(&self, id: RecordId) -> Option<&str> {
        let record = self.record(id)?;
        self.names.get(record.name_id() as usize).map(String::as_str)
    }

    fn is_street(&self, id: RecordId) -> Option<bool> {
        self.record(id).map(|r| matches!(r, Record::Street(_)))
    }

    fn area_ids(&self, id: RecordId) -> Option<&[u32]> {
        match self.record(id)? {
            Record::Place(p) => Some(&p.areas),
            Record::Street(s) => Some(&s.areas),
        }
    }

    fn area_ids_filtered(&self, id: RecordId, level_mask: u32) -> Option<Vec<u32>> {
        let ids = self.area_ids(id)?;
        Some(
            ids.iter()
                .copied()
                .filter(|&a| {
                    self.areas
                        .get(a as usize)
                        .is_some_and(|area| area.level.intersects(level_mask))
                })
                .collect(),
        )
    }

    fn area_names(&self, id: RecordId) -> Option<Vec<&str>> {
        let ids = self.area_ids(id)?;
        Some(ids.iter().filter_map(|&a| self.area_name(a)).collect())
    }

    fn area_names_sorted(&self, id: RecordId) -> Option<Vec<&str>> {
        let ids = self.area_ids(id)?;

        let mut admin: Vec<(u8, &str)> = ids
            .iter()
            .filter_map(|&a| {
                let area = self.areas.get(a as usize)?;
                let level = area.level.admin_level()?;
                let name = self.area_names.get(area.name_id as usize)?;
                Some((level, name.as_str()))
            })
            .collect();
        admin.sort_by_key(|&(level, _)| Reverse(level));

        let mut seen = BTreeSet::new();
        Some(
            admin
                .into_iter()
                .filter_map(|(_, name)| seen.insert(name).then_some(name))
                .collect(),
        )
    }

    fn postcodes(&self, id: RecordId) -> Option<Vec<u32>> {
        let ids = self.area_ids(id)?;
        Some(
            ids.iter()
                .filter_map(|&a| self.areas.get(a as usize)?.postcode_value())
                .collect(),
        )
    }

    fn house_numbers(&self, id: RecordId) -> Option<Vec<&str>> {
        match self.record(id)? {
            Record::Place(_) => Some(Vec::new()),
            Record::Street(street) => Some(
                street
                    .house_numbers
                    .iter()
                    .filter_map(|hn| self.house_numbers.get(hn.house_number_id as usize))
                    .map(String::as_str)
                    .collect(),
            ),
        }
    }

    fn coordinates(&self, id: RecordId) -> Option<Coordinates> {
        match self.record(id)? {
            Record::Place(place) => Some(place.coordinates),
            Record::Street(street) => street.house_numbers.first().map(|hn| hn.coordinates),
        }
    }

    fn house_number_coordinates(&self, id: RecordId, house_number: &str) -> Option<Coordinates> {
        let Record::Street(street) = self.record(id)? else {
            return None;
        };
        street
            .house_numbers
            .iter()
            .find(|hn| {
                self.house_numbers
                    .get(hn.house_number_id as usize)
                    .is_some_and(|s| s == house_number)
            })
            .map(|hn| hn.coordinates)
    }

    fn area_name(&self, area_id: u32) -> Option<&str> {
        let area = self.areas.get(area_id as usize)?;
        if area.level.is_postcode() {
            return None;
        }
        self.area_names.get(area.name_id as usize).map(String::as_str)
    }

    fn all_names(&self) -> &[String] {
        &self.names
    }
}
