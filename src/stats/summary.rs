//! Descriptive statistics for abstract lengths.

use crate::data::Record;
use serde::Serialize;
use statrs::statistics::{Data, Distribution, Max, Median, Min, OrderStatistics};

/// Summary of `abstract_word_count` over a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WordCountSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 for a single record.
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub p95: f64,
    pub max: f64,
}

impl WordCountSummary {
    /// `None` when there are no records.
    pub fn compute<'a>(records: impl IntoIterator<Item = &'a Record>) -> Option<Self> {
        let values: Vec<f64> = records
            .into_iter()
            .map(|r| r.abstract_word_count as f64)
            .collect();
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mut data = Data::new(values);
        let std = if count > 1 { data.std_dev().unwrap_or(0.0) } else { 0.0 };

        Some(Self {
            count,
            mean: data.mean().unwrap_or(f64::NAN),
            std,
            min: data.min(),
            median: data.median(),
            p95: data.percentile(95),
            max: data.max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_abstracts(abstracts: &[&str]) -> Vec<Record> {
        abstracts
            .iter()
            .enumerate()
            .map(|(row, a)| Record::new(row, "t", Some(*a), None, Some("2020")))
            .collect()
    }

    #[test]
    fn summarizes_word_counts() {
        let long = "w ".repeat(20);
        let records = with_abstracts(&["", "one two three four five six seven eight nine ten", long.as_str()]);
        let summary = WordCountSummary::compute(&records).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 10.0).abs() < 1e-9);
        assert!((summary.median - 10.0).abs() < 1e-9);
        assert!((summary.std - 10.0).abs() < 1e-9);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 20.0);
        assert!(summary.p95 >= summary.median && summary.p95 <= summary.max);
    }

    #[test]
    fn single_record_has_zero_spread() {
        let records = with_abstracts(&["just four words here"]);
        let summary = WordCountSummary::compute(&records).unwrap();
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.mean, 4.0);
    }

    #[test]
    fn empty_input_has_no_summary() {
        assert!(WordCountSummary::compute(&Vec::<Record>::new()).is_none());
    }
}
