//! Field Normalizer Module
//! Cleans raw rows into records: derives dates, years and word counts and
//! drops rows that cannot be used.

use super::dates::ParsedDate;
use super::loader::{DataSourceError, RawCorpus, ABSTRACT, JOURNAL, PUBLISH_TIME, TITLE};
use super::record::{Corpus, Record};
use serde::Serialize;
use tracing::{debug, info};

/// What the cleaning step kept and dropped.
///
/// `kept + dropped == raw_rows` always holds. A row missing both a title and
/// a date is counted once, under `dropped_missing_title`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub raw_rows: usize,
    pub kept: usize,
    pub dropped: usize,
    pub dropped_missing_title: usize,
    pub dropped_unparsable_date: usize,
}

/// Turns a [`RawCorpus`] into a cleaned [`Corpus`].
pub struct FieldNormalizer;

impl FieldNormalizer {
    /// Clean every row of `raw`.
    ///
    /// Per-row problems never surface as errors; they only shrink the corpus
    /// and show up in the returned report. The only error is a column that
    /// cannot be read as text.
    pub fn normalize(raw: &RawCorpus) -> Result<(Corpus, NormalizeReport), DataSourceError> {
        let titles = Self::required(raw, TITLE)?;
        let times = Self::required(raw, PUBLISH_TIME)?;
        let abstracts = raw.text_column(ABSTRACT)?;
        let journals = raw.text_column(JOURNAL)?;

        let cell = |column: &Option<Vec<Option<String>>>, row: usize| -> Option<String> {
            column.as_ref().and_then(|c| c.get(row)).cloned().flatten()
        };

        let mut report = NormalizeReport {
            raw_rows: raw.height(),
            ..Default::default()
        };
        let mut records = Vec::with_capacity(raw.height());

        for (row, (title, time)) in titles.into_iter().zip(times).enumerate() {
            let Some(title) = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) else {
                report.dropped_missing_title += 1;
                continue;
            };

            let record = Record::new(
                row,
                title,
                cell(&abstracts, row).as_deref(),
                cell(&journals, row).as_deref(),
                time.as_deref(),
            );

            match record.published {
                ParsedDate::Date { .. } => records.push(record),
                ParsedDate::Missing => {
                    debug!(row, publish_time = %record.publish_time, "dropping row with unparsable date");
                    report.dropped_unparsable_date += 1;
                }
            }
        }

        report.kept = records.len();
        report.dropped = report.dropped_missing_title + report.dropped_unparsable_date;
        info!(
            kept = report.kept,
            dropped = report.dropped,
            missing_title = report.dropped_missing_title,
            bad_date = report.dropped_unparsable_date,
            "normalized corpus"
        );

        Ok((Corpus::from_records(records), report))
    }

    fn required(raw: &RawCorpus, name: &'static str) -> Result<Vec<Option<String>>, DataSourceError> {
        raw.text_column(name)?
            .ok_or_else(|| DataSourceError::MissingColumn {
                path: raw.source().to_path_buf(),
                column: name,
            })
    }
}
