//! Aggregator Module
//! Derived views over a set of records: publications per year, venue
//! ranking and title term frequency.
//!
//! Every function takes any iterable of `&Record` (a whole [`Corpus`] or a
//! [`CorpusView`]) and never mutates it. Records are put back into source-row
//! order before counting, so "first encountered" tie-breaking does not depend
//! on the order the caller hands them over.
//!
//! [`Corpus`]: crate::data::Corpus
//! [`CorpusView`]: crate::data::CorpusView

use super::tokenizer::tokenize;
use crate::data::Record;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Venue ranking length used by the report and explorer.
pub const DEFAULT_TOP_VENUES: usize = 10;
/// Term list length used by the report.
pub const DEFAULT_TOP_TERMS: usize = 20;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{argument} must be greater than zero")]
pub struct InvalidArgumentError {
    pub argument: &'static str,
}

/// Number of records per year, ascending by year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct YearHistogram {
    counts: BTreeMap<i32, usize>,
}

impl YearHistogram {
    pub fn iter(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        self.counts.iter().map(|(year, count)| (*year, *count))
    }

    pub fn get(&self, year: i32) -> usize {
        self.counts.get(&year).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    pub fn first_year(&self) -> Option<i32> {
        self.counts.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.counts.keys().next_back().copied()
    }
}

/// `(label, count)` pairs, descending by count; equal counts keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedCounts {
    entries: Vec<(String, usize)>,
}

/// Venues by number of records.
pub type VenueRanking = RankedCounts;
/// Title tokens by number of occurrences.
pub type TermFrequency = RankedCounts;

impl RankedCounts {
    /// Count `keys`, rank them and keep at most `limit` entries.
    fn rank(keys: impl IntoIterator<Item = String>, limit: Option<usize>) -> Self {
        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();

        for key in keys {
            match slots.get(&key) {
                Some(&slot) => entries[slot].1 += 1,
                None => {
                    slots.insert(key.clone(), entries.len());
                    entries.push((key, 1));
                }
            }
        }

        // Stable sort: ties stay in first-seen order.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.entries.first().map(|(_, count)| *count).unwrap_or(0)
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }
}

/// Computes the derived views.
pub struct Aggregator;

impl Aggregator {
    /// Records per distinct year. Records without a year are not counted.
    pub fn year_histogram<'a>(records: impl IntoIterator<Item = &'a Record>) -> YearHistogram {
        let mut counts = BTreeMap::new();
        for year in records.into_iter().filter_map(|r| r.year) {
            *counts.entry(year).or_insert(0) += 1;
        }
        YearHistogram { counts }
    }

    /// The `top_n` most frequent journals.
    ///
    /// Records without a journal are left out of the ranking entirely.
    pub fn venue_ranking<'a>(
        records: impl IntoIterator<Item = &'a Record>,
        top_n: usize,
    ) -> Result<VenueRanking, InvalidArgumentError> {
        if top_n == 0 {
            return Err(InvalidArgumentError { argument: "top_n" });
        }
        let journals = Self::in_row_order(records)
            .into_iter()
            .filter_map(|r| r.journal.clone());
        Ok(RankedCounts::rank(journals, Some(top_n)))
    }

    /// Token counts over all titles; `limit` of `None` keeps every token.
    pub fn term_frequency<'a>(
        records: impl IntoIterator<Item = &'a Record>,
        limit: Option<usize>,
    ) -> Result<TermFrequency, InvalidArgumentError> {
        if limit == Some(0) {
            return Err(InvalidArgumentError { argument: "limit" });
        }
        let tokens = Self::in_row_order(records)
            .into_iter()
            .flat_map(|r| tokenize(&r.title));
        Ok(RankedCounts::rank(tokens, limit))
    }

    fn in_row_order<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<&'a Record> {
        let mut ordered: Vec<&Record> = records.into_iter().collect();
        ordered.sort_by_key(|r| r.row);
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, title: &str, journal: Option<&str>, time: Option<&str>) -> Record {
        Record::new(row, title, None, journal, time)
    }

    fn titled(titles: &[&str]) -> Vec<Record> {
        titles
            .iter()
            .enumerate()
            .map(|(row, t)| record(row, t, None, Some("2020")))
            .collect()
    }

    #[test]
    fn histogram_skips_missing_years() {
        let records: Vec<Record> = [Some("2019"), Some("2020"), Some("2020"), Some("2021"), None]
            .iter()
            .enumerate()
            .map(|(row, time)| record(row, "t", None, *time))
            .collect();

        let hist = Aggregator::year_histogram(&records);
        let pairs: Vec<(i32, usize)> = hist.iter().collect();
        assert_eq!(pairs, vec![(2019, 1), (2020, 2), (2021, 1)]);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.get(1999), 0);
        assert_eq!((hist.first_year(), hist.last_year()), (Some(2019), Some(2021)));
    }

    #[test]
    fn venue_ranking_counts_and_truncates() {
        let records: Vec<Record> = ["A", "B", "A", "C", "B", "A"]
            .iter()
            .enumerate()
            .map(|(row, j)| record(row, "t", Some(*j), Some("2020")))
            .collect();

        let ranking = Aggregator::venue_ranking(&records, 2).unwrap();
        assert_eq!(
            ranking.entries(),
            &[("A".to_string(), 3), ("B".to_string(), 2)]
        );
    }

    #[test]
    fn venue_ranking_breaks_ties_by_first_occurrence() {
        let records: Vec<Record> = [Some("Z"), None, Some("Y"), Some("  "), Some("X"), Some("Y"), Some("Z")]
            .iter()
            .enumerate()
            .map(|(row, j)| record(row, "t", *j, Some("2020")))
            .collect();

        let ranking = Aggregator::venue_ranking(&records, 10).unwrap();
        let labels: Vec<&str> = ranking.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Z", "Y", "X"]);
        let counts: Vec<usize> = ranking.iter().map(|(_, c)| c).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let records = titled(&["x"]);
        assert_eq!(
            Aggregator::venue_ranking(&records, 0).unwrap_err(),
            InvalidArgumentError { argument: "top_n" }
        );
        assert!(Aggregator::term_frequency(&records, Some(0)).is_err());
    }

    #[test]
    fn term_frequency_example() {
        let records = titled(&["Virus spread model", "Vaccine trial results", "virus transmission study"]);

        let all = Aggregator::term_frequency(&records, None).unwrap();
        assert_eq!(all.get("virus"), Some(2));
        for token in ["spread", "model", "vaccine", "trial", "results", "transmission", "study"] {
            assert_eq!(all.get(token), Some(1), "{token}");
        }
        assert_eq!(all.len(), 8);

        let top = Aggregator::term_frequency(&records, Some(2)).unwrap();
        assert_eq!(
            top.entries(),
            &[("virus".to_string(), 2), ("spread".to_string(), 1)]
        );
    }

    #[test]
    fn term_frequency_ignores_record_order() {
        let records = titled(&["Masks and transmission", "Hospital transmission risk", "Masks work"]);
        let forward = Aggregator::term_frequency(&records, None).unwrap();
        let reversed = Aggregator::term_frequency(records.iter().rev(), None).unwrap();
        assert_eq!(forward, reversed);
        assert_eq!(forward.entries()[0], ("masks".to_string(), 2));
        assert_eq!(forward.entries()[1], ("transmission".to_string(), 2));
    }

    #[test]
    fn views_are_repeatable() {
        let records = titled(&["Alpha beta gamma", "beta gamma delta"]);
        let hist = Aggregator::year_histogram(&records);
        let terms = Aggregator::term_frequency(&records, Some(3)).unwrap();
        assert_eq!(Aggregator::term_frequency(&records, Some(3)).unwrap(), terms);
        assert_eq!(Aggregator::year_histogram(&records), hist);
        assert_eq!(hist.total(), records.len());
    }
}
