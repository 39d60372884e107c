//! Year range filtering over a cleaned corpus.

use super::record::{Corpus, Record};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid year range: {lo} is after {hi}")]
pub struct InvalidRangeError {
    pub lo: i32,
    pub hi: i32,
}

/// Inclusive `[lo, hi]` year interval with `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct YearRange {
    lo: i32,
    hi: i32,
}

impl YearRange {
    /// Initial interval of the explorer.
    pub const DEFAULT: YearRange = YearRange { lo: 2020, hi: 2021 };

    pub fn new(lo: i32, hi: i32) -> Result<Self, InvalidRangeError> {
        if lo > hi {
            return Err(InvalidRangeError { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> i32 {
        self.lo
    }

    pub fn hi(&self) -> i32 {
        self.hi
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.lo..=self.hi).contains(&year)
    }

    /// Clamp both ends into `[min, max]`, keeping the range non-empty.
    pub fn clamp_to(self, min: i32, max: i32) -> Self {
        let (min, max) = (min.min(max), min.max(max));
        let lo = self.lo.clamp(min, max);
        let hi = self.hi.clamp(lo, max.max(lo));
        Self { lo, hi }
    }
}

impl TryFrom<(i32, i32)> for YearRange {
    type Error = InvalidRangeError;

    fn try_from((lo, hi): (i32, i32)) -> Result<Self, Self::Error> {
        Self::new(lo, hi)
    }
}

impl From<YearRange> for (i32, i32) {
    fn from(range: YearRange) -> Self {
        (range.lo, range.hi)
    }
}

/// Records of a corpus whose year falls inside a range, in corpus order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> CorpusView<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, &'a Record>> {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` records of the view.
    pub fn preview(&self, n: usize) -> &[&'a Record] {
        &self.records[..n.min(self.records.len())]
    }
}

impl<'v, 'a> IntoIterator for &'v CorpusView<'a> {
    type Item = &'a Record;
    type IntoIter = std::iter::Copied<std::slice::Iter<'v, &'a Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().copied()
    }
}

/// Selects records by year.
pub struct RangeFilter;

impl RangeFilter {
    /// Records with `lo <= year <= hi`. Records without a year never match.
    pub fn apply(corpus: &Corpus, lo: i32, hi: i32) -> Result<CorpusView<'_>, InvalidRangeError> {
        Ok(Self::apply_range(corpus, YearRange::new(lo, hi)?))
    }

    pub fn apply_range(corpus: &Corpus, range: YearRange) -> CorpusView<'_> {
        let records: Vec<&Record> = corpus
            .iter()
            .filter(|r| r.year.is_some_and(|year| range.contains(year)))
            .collect();
        debug!(
            lo = range.lo,
            hi = range.hi,
            matched = records.len(),
            total = corpus.len(),
            "filtered corpus by year"
        );
        CorpusView { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        let years = [Some("2019"), Some("2020-02-01"), Some("2020-11"), Some("2021"), None];
        Corpus::from_records(
            years
                .iter()
                .enumerate()
                .map(|(row, time)| Record::new(row, format!("paper {row}"), None, None, *time))
                .collect(),
        )
    }

    #[test]
    fn single_year_keeps_input_order() {
        let corpus = corpus();
        let view = RangeFilter::apply(&corpus, 2020, 2020).unwrap();
        let rows: Vec<usize> = view.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn missing_year_never_matches() {
        let corpus = corpus();
        let view = RangeFilter::apply(&corpus, i32::MIN, i32::MAX).unwrap();
        assert_eq!(view.len(), 4);
        assert!(view.iter().all(|r| r.year.is_some()));
    }

    #[test]
    fn inverted_range_is_an_error() {
        let corpus = corpus();
        assert_eq!(
            RangeFilter::apply(&corpus, 2021, 2020).unwrap_err(),
            InvalidRangeError { lo: 2021, hi: 2020 }
        );
    }

    #[test]
    fn repeated_filtering_is_idempotent() {
        let corpus = corpus();
        let first = RangeFilter::apply(&corpus, 2019, 2020).unwrap();
        let second = RangeFilter::apply(&corpus, 2019, 2020).unwrap();
        assert_eq!(first, second);
        assert_eq!(corpus.len(), 5);
    }

    #[test]
    fn clamp_keeps_range_inside_bounds() {
        let range = YearRange::new(2020, 2021).unwrap();
        assert_eq!(range.clamp_to(2015, 2019), YearRange::new(2019, 2019).unwrap());
        assert_eq!(range.clamp_to(2021, 2030), YearRange::new(2021, 2021).unwrap());
        assert_eq!(range.clamp_to(2000, 2030), range);
    }

    #[test]
    fn range_deserializes_from_pair() {
        let range: YearRange = serde_json::from_str("[2019, 2022]").unwrap();
        assert_eq!((range.lo(), range.hi()), (2019, 2022));
        assert!(serde_json::from_str::<YearRange>("[2022, 2019]").is_err());
    }
}
