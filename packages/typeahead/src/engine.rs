//! The ranking engine: trigram lookups over names and areas, a coarse
//! per-record score, and a precise re-rank of the best finalists.

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use address_typeahead_gazetteer::{
    Gazetteer, GazetteerError, NullProgress, ProgressCallback, RecordId, validate,
};
use address_typeahead_models::{CompleteOptions, EngineStats};

use crate::guesser::TrigramIndex;
use crate::query::{GuessString, PreparedQuery};
use crate::{TypeaheadError, select_top};

/// Score added to every record lying in a queried postal code.
const POSTCODE_SCORE: f64 = 1.0;

/// Per-record scratch scores of one `complete` call.
///
/// Owned by the caller so that a shared [`Typeahead`] can serve
/// concurrent queries, each with its own accumulator.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    slots: Vec<(RecordId, f64)>,
}

impl Accumulator {
    /// Creates an accumulator sized for `engine`.
    #[must_use]
    pub fn for_engine(engine: &Typeahead) -> Self {
        let mut acc = Self::default();
        acc.reset(engine.record_count());
        acc
    }

    /// One zeroed slot per record id.
    fn reset(&mut self, records: usize) {
        self.slots.clear();
        self.slots
            .extend((0..records).filter_map(|i| Some((RecordId::try_from(i).ok()?, 0.0))));
    }

    fn get_mut(&mut self, id: RecordId) -> Option<&mut f64> {
        self.slots.get_mut(id as usize).map(|(_, score)| score)
    }

    /// Copies the `count` best positive scores out, best first. The
    /// slots keep their allocation for the next call.
    fn finalists(&self, count: usize) -> Vec<(RecordId, f64)> {
        let mut finalists: Vec<(RecordId, f64)> = self
            .slots
            .iter()
            .copied()
            .filter(|&(_, score)| score > 0.0)
            .collect();
        select_top(&mut finalists, count, rank_cmp);
        finalists
    }
}

fn rank_cmp(a: &(RecordId, f64), b: &(RecordId, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Address typeahead over one immutable gazetteer.
///
/// Record ids are dense: places first (`0..places.len()`), then streets.
/// The engine is read-only after construction and can be shared between
/// threads.
#[derive(Debug)]
pub struct Typeahead {
    gazetteer: Gazetteer,
    names: TrigramIndex,
    areas: TrigramIndex,
    name_to_records: Vec<Vec<RecordId>>,
    area_to_records: Vec<Vec<RecordId>>,
    postcode_to_records: BTreeMap<u32, Vec<RecordId>>,
    stats: EngineStats,
}

impl Typeahead {
    /// Validates `gazetteer` and builds the indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the gazetteer's ids are inconsistent.
    pub fn build(gazetteer: Gazetteer) -> Result<Self, TypeaheadError> {
        Self::build_with_progress(gazetteer, &NullProgress)
    }

    /// Same as [`Self::build`], reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if the gazetteer's ids are inconsistent.
    pub fn build_with_progress(
        gazetteer: Gazetteer,
        progress: &dyn ProgressCallback,
    ) -> Result<Self, TypeaheadError> {
        let start = Instant::now();

        progress.set_message("Validating gazetteer".to_string());
        validate::validate(&gazetteer, progress).map_err(GazetteerError::from)?;

        progress.set_message("Indexing names".to_string());
        let names = TrigramIndex::build(gazetteer.names.iter().map(|n| (n.as_str(), 1.0)));

        progress.set_message("Indexing areas".to_string());
        let areas = TrigramIndex::build(gazetteer.areas.iter().map(|area| {
            if area.level.is_postcode() {
                ("", 0.0)
            } else {
                let name = gazetteer
                    .area_names
                    .get(area.name_id as usize)
                    .map_or("", String::as_str);
                (name, area.popularity)
            }
        }));

        progress.set_message("Linking records".to_string());
        let record_count = gazetteer.record_count();
        progress.set_total(record_count as u64);

        let mut name_to_records = vec![Vec::new(); gazetteer.names.len()];
        let mut area_to_records = vec![Vec::new(); gazetteer.areas.len()];
        let mut postcode_to_records: BTreeMap<u32, Vec<RecordId>> = BTreeMap::new();

        for idx in 0..record_count {
            // validation guarantees every index fits a record id
            #[allow(clippy::cast_possible_truncation)]
            let id = idx as RecordId;
            let Some(record) = gazetteer.record(id) else {
                continue;
            };

            if let Some(list) = name_to_records.get_mut(record.name_id() as usize) {
                list.push(id);
            }

            for &area_id in record.area_ids() {
                let Some(area) = gazetteer.areas.get(area_id as usize) else {
                    continue;
                };
                let list = match area.postcode_value() {
                    Some(code) => Some(postcode_to_records.entry(code).or_default()),
                    None => area_to_records.get_mut(area_id as usize),
                };
                // ids ascend, so a repeated area or postcode shows up last
                if let Some(list) = list
                    && list.last() != Some(&id)
                {
                    list.push(id);
                }
            }

            if (idx as u64).is_multiple_of(100_000) {
                progress.set_position(idx as u64);
            }
        }

        let stats = EngineStats {
            records: record_count,
            names: names.stats(),
            areas: areas.stats(),
            postcodes: postcode_to_records.len(),
            build_time_secs: start.elapsed().as_secs_f64(),
        };

        progress.finish(format!(
            "Indexed {} records in {:.2}s",
            stats.records, stats.build_time_secs
        ));
        log::info!(
            "Typeahead ready: {} records, {} names ({} trigrams), {} areas ({} trigrams), {} postcodes in {:.2}s",
            stats.records,
            stats.names.candidates,
            stats.names.trigrams,
            stats.areas.candidates,
            stats.areas.trigrams,
            stats.postcodes,
            stats.build_time_secs,
        );

        Ok(Self {
            gazetteer,
            names,
            areas,
            name_to_records,
            area_to_records,
            postcode_to_records,
            stats,
        })
    }

    /// The gazetteer the engine was built from.
    #[must_use]
    pub const fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Number of place and street records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.gazetteer.record_count()
    }

    /// Size of the engine.
    #[must_use]
    pub const fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Trigram index over display names; candidate ids are name ids.
    #[must_use]
    pub const fn names_index(&self) -> &TrigramIndex {
        &self.names
    }

    /// Trigram index over area names; candidate ids are area ids.
    #[must_use]
    pub const fn areas_index(&self) -> &TrigramIndex {
        &self.areas
    }

    /// Records carrying the display name `name_id`.
    #[must_use]
    pub fn records_with_name(&self, name_id: u32) -> &[RecordId] {
        self.name_to_records
            .get(name_id as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Records lying in the administrative area `area_id`.
    #[must_use]
    pub fn records_in_area(&self, area_id: u32) -> &[RecordId] {
        self.area_to_records
            .get(area_id as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Records lying in postal code `code`.
    #[must_use]
    pub fn records_in_postcode(&self, code: u32) -> &[RecordId] {
        self.postcode_to_records
            .get(&code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Completes a tokenized query with a freshly allocated accumulator.
    ///
    /// See [`Self::complete_with`].
    #[must_use]
    pub fn complete<S: AsRef<str>>(&self, tokens: &[S], options: &CompleteOptions) -> Vec<RecordId> {
        let mut acc = Accumulator::default();
        self.complete_with(tokens, options, &mut acc)
    }

    /// Returns up to `options.max_results` record ids, best first.
    ///
    /// Tokens that start with a nonzero number are postal codes; all
    /// other tokens are matched against record names and area names.
    /// `acc` is reset before use and may be reused across calls.
    #[must_use]
    pub fn complete_with<S: AsRef<str>>(
        &self,
        tokens: &[S],
        options: &CompleteOptions,
        acc: &mut Accumulator,
    ) -> Vec<RecordId> {
        if tokens.is_empty() {
            return Vec::new();
        }

        let query = PreparedQuery::prepare(tokens, options);
        log::trace!(
            "complete: {} postcodes, guesses {:?}",
            query.postcodes.len(),
            query.guesses.iter().map(|g| &g.text).collect::<Vec<_>>()
        );

        match (query.guesses.as_slice(), query.postcodes.is_empty()) {
            ([], _) => {
                log::debug!("complete: postcode-only path");
                self.postcodes_only(&query.postcodes, options.max_results)
            }
            ([single], true) => {
                log::debug!("complete: single-name path for {:?}", single.text);
                self.names_only(single, options)
            }
            _ => {
                log::debug!("complete: ranked path");
                self.ranked(&query, options, acc)
            }
        }
    }

    fn postcodes_only(&self, postcodes: &[u32], max_results: usize) -> Vec<RecordId> {
        let mut seen = BTreeSet::new();
        postcodes
            .iter()
            .flat_map(|&code| self.records_in_postcode(code))
            .copied()
            .filter(|&id| seen.insert(id))
            .take(max_results)
            .collect()
    }

    fn names_only(&self, guess: &GuessString, options: &CompleteOptions) -> Vec<RecordId> {
        self.names
            .guess_match(&guess.text, options.max_results)
            .into_iter()
            .filter(|m| m.similarity >= options.min_similarity)
            .flat_map(|m| self.records_with_name(m.id))
            .copied()
            .take(options.max_results)
            .collect()
    }

    fn ranked(
        &self,
        query: &PreparedQuery,
        options: &CompleteOptions,
        acc: &mut Accumulator,
    ) -> Vec<RecordId> {
        let mut best_names: BTreeMap<u32, f64> = BTreeMap::new();
        let mut best_areas: BTreeMap<u32, f64> = BTreeMap::new();

        for guess in &query.guesses {
            for m in self.names.guess_match(&guess.text, options.max_guesses) {
                keep_max(&mut best_names, m.id, m.similarity * guess.weight);
            }
            if options.first_token_is_place_name && guess.from_first_token {
                continue;
            }
            for m in self.areas.guess_match(&guess.text, options.max_guesses) {
                keep_max(&mut best_areas, m.id, m.similarity * guess.weight);
            }
        }

        acc.reset(self.record_count());

        for (&name_id, &sim) in &best_names {
            if sim < options.min_similarity {
                continue;
            }
            for &record in self.records_with_name(name_id) {
                if let Some(score) = acc.get_mut(record) {
                    *score = score.max(sim * options.place_bias);
                }
            }
        }

        for (&area_id, &sim) in &best_areas {
            if sim < options.min_similarity {
                continue;
            }
            for &record in self.records_in_area(area_id) {
                if let Some(score) = acc.get_mut(record) {
                    *score += sim;
                }
            }
        }

        for &code in &query.postcodes {
            for &record in self.records_in_postcode(code) {
                if let Some(score) = acc.get_mut(record) {
                    *score += POSTCODE_SCORE;
                }
            }
        }

        let mut finalists = acc.finalists(options.max_guesses);
        log::debug!("complete: {} finalists", finalists.len());

        self.rerank(&mut finalists, query, options);

        finalists.sort_unstable_by(rank_cmp);
        finalists
            .into_iter()
            .filter(|&(_, score)| score >= options.min_similarity)
            .take(options.max_results)
            .map(|(id, _)| id)
            .collect()
    }

    /// Replaces the coarse scores of `finalists` with the precise score:
    /// the fraction of queried postal codes the record lies in, plus the
    /// weighted best similarity of every guess string against the
    /// record's own name and area names.
    fn rerank(
        &self,
        finalists: &mut [(RecordId, f64)],
        query: &PreparedQuery,
        options: &CompleteOptions,
    ) {
        let mut candidates: Vec<(&str, f64)> = Vec::new();
        let mut owners: Vec<usize> = Vec::new();

        for (slot, (record_id, score)) in finalists.iter_mut().enumerate() {
            *score = 0.0;
            let Some(record) = self.gazetteer.record(*record_id) else {
                continue;
            };

            if let Some(name) = self.gazetteer.names.get(record.name_id() as usize) {
                candidates.push((name.as_str(), options.place_bias));
                owners.push(slot);
            }

            let mut codes = Vec::new();
            for &area_id in record.area_ids() {
                let Some(area) = self.gazetteer.areas.get(area_id as usize) else {
                    continue;
                };
                if let Some(code) = area.postcode_value() {
                    codes.push(code);
                } else if let Some(name) = self.gazetteer.area_names.get(area.name_id as usize) {
                    candidates.push((name.as_str(), area.popularity));
                    owners.push(slot);
                }
            }

            if !query.postcodes.is_empty() {
                let hits = query
                    .postcodes
                    .iter()
                    .filter(|code| codes.contains(code))
                    .count();
                *score = ratio(hits, query.postcodes.len());
            }
        }

        let index = TrigramIndex::build(candidates);
        let mut best = vec![0.0_f64; finalists.len()];

        for guess in &query.guesses {
            best.fill(0.0);
            for m in index.guess_match(&guess.text, options.max_guesses) {
                if let Some(&slot) = owners.get(m.id as usize) {
                    best[slot] = best[slot].max(m.similarity);
                }
            }
            for ((_, score), b) in finalists.iter_mut().zip(&best) {
                *score += b * guess.weight;
            }
        }
    }
}

fn keep_max(best: &mut BTreeMap<u32, f64>, id: u32, value: f64) {
    match best.entry(id) {
        Entry::Vacant(e) => {
            e.insert(value);
        }
        Entry::Occupied(mut e) => {
            if value > *e.get() {
                e.insert(value);
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(hits: usize, total: usize) -> f64 {
    hits as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use address_typeahead_gazetteer::test_fixtures::{self, bremerhaven};
    use address_typeahead_gazetteer::{Area, GazetteerLookup, InvalidGazetteer};

    use super::*;

    fn engine() -> Typeahead {
        Typeahead::build(bremerhaven()).unwrap()
    }

    fn defaults() -> CompleteOptions {
        CompleteOptions::default()
    }

    #[test]
    fn builds_reverse_tables() {
        let e = engine();
        assert_eq!(e.record_count(), 6);
        assert_eq!(
            e.records_with_name(0),
            &[test_fixtures::TEST_MITTE, test_fixtures::TEST_LEHE]
        );
        assert_eq!(
            e.records_in_area(test_fixtures::AREA_LEHE),
            &[test_fixtures::TEST_LEHE, test_fixtures::HOCHSCHULSTRASSE]
        );
        assert!(e.records_in_area(test_fixtures::AREA_PLZ_27568).is_empty());
        assert_eq!(
            e.records_in_postcode(27568),
            &[
                test_fixtures::TEST_MITTE,
                test_fixtures::GARTENSTRASSE,
                test_fixtures::SMIDT_STRASSE
            ]
        );
        assert!(e.records_in_postcode(12345).is_empty());
        assert!(e.records_with_name(99).is_empty());
    }

    #[test]
    fn repeated_area_ids_link_a_record_once() {
        let mut g = bremerhaven();
        g.places[0].areas.push(test_fixtures::AREA_PLZ_27568);
        g.places[0].areas.push(test_fixtures::AREA_MITTE);
        let e = Typeahead::build(g).unwrap();

        let mitte = [
            test_fixtures::TEST_MITTE,
            test_fixtures::GARTENSTRASSE,
            test_fixtures::SMIDT_STRASSE,
        ];
        assert_eq!(e.records_in_area(test_fixtures::AREA_MITTE), &mitte);
        assert_eq!(e.records_in_postcode(27568), &mitte);
        assert_eq!(e.complete(&["27568"], &defaults()), mitte.to_vec());
        assert_eq!(
            e.complete(&["test", "27568"], &defaults()),
            engine().complete(&["test", "27568"], &defaults())
        );
    }

    #[test]
    fn repeated_postcode_areas_link_a_record_once() {
        let mut g = bremerhaven();
        g.areas.push(Area::postcode(27568));
        let extra = u32::try_from(g.areas.len() - 1).unwrap();
        // Gartenstraße is the first street
        g.streets[0].areas.push(extra);
        g.streets[0].areas.push(test_fixtures::AREA_PLZ_27570);
        let e = Typeahead::build(g).unwrap();

        assert_eq!(e.stats().postcodes, 2);
        assert_eq!(
            e.records_in_postcode(27568),
            &[
                test_fixtures::TEST_MITTE,
                test_fixtures::GARTENSTRASSE,
                test_fixtures::SMIDT_STRASSE
            ]
        );
        assert_eq!(
            e.complete(&["27568", "27570"], &defaults()),
            vec![
                test_fixtures::TEST_MITTE,
                test_fixtures::GARTENSTRASSE,
                test_fixtures::SMIDT_STRASSE,
                test_fixtures::TEST_LEHE,
                test_fixtures::WASSERTURM,
                test_fixtures::HOCHSCHULSTRASSE
            ]
        );
        assert_eq!(
            e.complete(&["gartenstr", "27568"], &defaults()).first(),
            Some(&test_fixtures::GARTENSTRASSE)
        );
    }

    #[test]
    fn stats_describe_the_indices() {
        let stats = engine().stats();
        assert_eq!(stats.records, 6);
        assert_eq!(stats.names.candidates, 5);
        assert_eq!(stats.areas.candidates, 7);
        assert_eq!(stats.postcodes, 2);
        assert!(stats.names.trigrams > 0);
    }

    #[test]
    fn rejects_inconsistent_gazetteer() {
        let mut g = bremerhaven();
        g.places[0].name_id = 42;
        let err = Typeahead::build(g).unwrap_err();
        assert!(matches!(
            err,
            TypeaheadError::Gazetteer(GazetteerError::Invalid(InvalidGazetteer::UnknownName {
                record: 0,
                name_id: 42
            }))
        ));
    }

    #[test]
    fn empty_gazetteer_completes_to_nothing() {
        let e = Typeahead::build(Gazetteer::default()).unwrap();
        assert!(e.complete(&["test"], &defaults()).is_empty());
        assert!(e.complete(&["test", "27568"], &defaults()).is_empty());
        assert!(e.complete(&["27568"], &defaults()).is_empty());
    }

    #[test]
    fn empty_query_returns_nothing() {
        let e = engine();
        assert!(e.complete::<&str>(&[], &defaults()).is_empty());
        assert!(e.complete(&["ab", "-"], &defaults()).is_empty());
    }

    #[test]
    fn postcode_areas_are_never_matched_by_text() {
        let e = engine();
        let plz = [test_fixtures::AREA_PLZ_27568, test_fixtures::AREA_PLZ_27570];
        for query in ["27568", "", "plz", "bremen", "mitte 27570"] {
            for m in e.areas_index().guess_match(query, 100) {
                assert!(!plz.contains(&m.id), "{query:?} matched postcode area");
            }
        }
    }

    #[test]
    fn postcode_disambiguates_duplicate_names() {
        let e = engine();
        let results = e.complete(&["test", "27568"], &defaults());
        assert_eq!(results.first(), Some(&test_fixtures::TEST_MITTE));
        let lehe = results.iter().position(|&r| r == test_fixtures::TEST_LEHE);
        assert!(lehe.is_some_and(|p| p > 0));

        let results = e.complete(&["test", "27570"], &defaults());
        assert_eq!(results.first(), Some(&test_fixtures::TEST_LEHE));
    }

    #[test]
    fn street_and_postcode_find_house_number() {
        let e = engine();
        let results = e.complete(&["gartenstr", "27568"], &defaults());
        assert_eq!(results.first(), Some(&test_fixtures::GARTENSTRASSE));

        let g = e.gazetteer();
        let id = results[0];
        assert!(g.house_numbers(id).unwrap().contains(&"13"));
        let c = g.house_number_coordinates(id, "13").unwrap();
        assert!((c.latitude() - test_fixtures::GARTENSTRASSE_13.0).abs() < 0.001);
        assert!((c.longitude() - test_fixtures::GARTENSTRASSE_13.1).abs() < 0.001);
    }

    #[test]
    fn single_word_uses_names_only() {
        let e = engine();
        let results = e.complete(&["Hochschulstr"], &defaults());
        assert_eq!(results.first(), Some(&test_fixtures::HOCHSCHULSTRASSE));
        // "Lehe" is an area name, not a record name
        assert!(e.complete(&["Lehe"], &defaults()).is_empty());
    }

    #[test]
    fn prefix_of_long_street_still_matches() {
        let e = engine();
        let results = e.complete(&["Hoch"], &defaults());
        assert_eq!(results, vec![test_fixtures::HOCHSCHULSTRASSE]);
    }

    #[test]
    fn area_names_boost_records() {
        let e = engine();
        let results = e.complete(&["test", "lehe"], &defaults());
        assert_eq!(results.first(), Some(&test_fixtures::TEST_LEHE));
        assert!(results.contains(&test_fixtures::HOCHSCHULSTRASSE));
    }

    #[test]
    fn first_token_as_place_name() {
        let e = engine();
        let options = CompleteOptions {
            first_token_is_place_name: true,
            ..defaults()
        };
        let results = e.complete(&["Test", "Mitte"], &options);
        assert_eq!(results.first(), Some(&test_fixtures::TEST_MITTE));
    }

    #[test]
    fn chained_tokens_match_multi_word_names() {
        let e = engine();
        let options = CompleteOptions {
            chain_length: 2,
            ..defaults()
        };
        let results = e.complete(&["Am", "Wasserturm"], &options);
        assert_eq!(results.first(), Some(&test_fixtures::WASSERTURM));
    }

    #[test]
    fn postcode_only_query_lists_postcode_records() {
        let e = engine();
        let results = e.complete(&["27570"], &defaults());
        assert_eq!(
            results,
            vec![
                test_fixtures::TEST_LEHE,
                test_fixtures::WASSERTURM,
                test_fixtures::HOCHSCHULSTRASSE
            ]
        );

        let limited = e.complete(&["27570"], &CompleteOptions::with_max_results(2));
        assert_eq!(limited.len(), 2);

        assert!(e.complete(&["99999999999999"], &defaults()).is_empty());
        assert!(e.complete(&["0"], &defaults()).is_empty());
    }

    #[test]
    fn unknown_postcode_does_not_exclude_text_matches() {
        let e = engine();
        let results = e.complete(&["test", "99999"], &defaults());
        assert_eq!(
            results[..2],
            [test_fixtures::TEST_MITTE, test_fixtures::TEST_LEHE]
        );
    }

    #[test]
    fn results_respect_max_results() {
        let e = engine();
        for max_results in 0..4 {
            let options = CompleteOptions::with_max_results(max_results);
            assert!(e.complete(&["strasse", "bremerhaven"], &options).len() <= max_results);
            assert!(e.complete(&["strasse"], &options).len() <= max_results);
        }
    }

    #[test]
    fn high_min_similarity_filters_everything() {
        let e = engine();
        let options = CompleteOptions {
            min_similarity: 100.0,
            ..defaults()
        };
        assert!(e.complete(&["test", "lehe"], &options).is_empty());
        assert!(e.complete(&["test"], &options).is_empty());
    }

    #[test]
    fn min_similarity_is_inclusive_on_the_name_path() {
        let e = engine();
        // exact match: 14 / sqrt(14 * 14), times the exact-token bonus
        let at = CompleteOptions {
            min_similarity: 1.33,
            ..defaults()
        };
        assert_eq!(
            e.complete(&["hochschulstrasse"], &at),
            vec![test_fixtures::HOCHSCHULSTRASSE]
        );

        let above = CompleteOptions {
            min_similarity: 1.330_001,
            ..defaults()
        };
        assert!(e.complete(&["hochschulstrasse"], &above).is_empty());
    }

    #[test]
    fn accumulator_keeps_its_slots_between_queries() {
        let e = engine();
        let mut acc = Accumulator::default();
        let _ = e.complete_with(&["test", "27568"], &defaults(), &mut acc);
        assert_eq!(acc.slots.len(), e.record_count());
        let capacity = acc.slots.capacity();

        let _ = e.complete_with(&["gartenstr", "mitte"], &defaults(), &mut acc);
        assert_eq!(acc.slots.len(), e.record_count());
        assert_eq!(acc.slots.capacity(), capacity);
    }

    #[test]
    fn repeated_queries_are_deterministic() {
        let e = engine();
        let mut acc = Accumulator::for_engine(&e);
        let queries: [&[&str]; 4] = [
            &["test", "27568"],
            &["strasse", "bremerhaven"],
            &["gartenstr", "mitte"],
            &["am", "wasserturm", "27570"],
        ];
        for tokens in queries {
            let first = e.complete_with(tokens, &defaults(), &mut acc);
            let second = e.complete_with(tokens, &defaults(), &mut acc);
            assert_eq!(first, second, "{tokens:?}");
            assert_eq!(first, e.complete(tokens, &defaults()), "{tokens:?}");
        }
    }

    #[test]
    fn engine_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Typeahead>();

        let e = std::sync::Arc::new(engine());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let e = std::sync::Arc::clone(&e);
                std::thread::spawn(move || e.complete(&["test", "27568"], &CompleteOptions::default()))
            })
            .collect();
        for handle in handles {
            assert_eq!(
                handle.join().unwrap().first(),
                Some(&test_fixtures::TEST_MITTE)
            );
        }
    }
}
