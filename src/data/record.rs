//! Paper metadata records and the cleaned corpus.

use super::dates::{parse_publish_time, ParsedDate};

/// One paper's metadata after field derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 0-based index of the source row; the stable order used for tie-breaking.
    pub row: usize,
    pub title: String,
    pub abstract_text: String,
    pub journal: Option<String>,
    /// `publish_time` exactly as it appeared in the source.
    pub publish_time: String,
    pub published: ParsedDate,
    pub year: Option<i32>,
    pub abstract_word_count: usize,
}

impl Record {
    /// Build a record from raw cell values, deriving `published`, `year`
    /// and `abstract_word_count`.
    ///
    /// Blank journals are stored as `None`. No validation happens here; the
    /// normalizer decides which records survive.
    pub fn new(
        row: usize,
        title: impl Into<String>,
        abstract_text: Option<&str>,
        journal: Option<&str>,
        publish_time: Option<&str>,
    ) -> Self {
        let abstract_text = abstract_text.unwrap_or_default().to_string();
        let published = parse_publish_time(publish_time);

        Self {
            row,
            title: title.into(),
            abstract_word_count: abstract_text.split_whitespace().count(),
            abstract_text,
            journal: journal
                .map(str::trim)
                .filter(|j| !j.is_empty())
                .map(str::to_string),
            publish_time: publish_time.unwrap_or_default().to_string(),
            year: published.year(),
            published,
        }
    }
}

/// Cleaned, immutable collection of records in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    records: Vec<Record>,
}

impl Corpus {
    /// Wrap already-derived records without checking them. Outside the crate
    /// a corpus only comes from [`FieldNormalizer`](super::FieldNormalizer),
    /// so every record has a title and a year.
    pub(crate) fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest year present, if any record has one.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.records
            .iter()
            .filter_map(|r| r.year)
            .fold(None, |acc, year| match acc {
                None => Some((year, year)),
                Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
            })
    }

    /// First `n` records in source order.
    pub fn preview(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_year_and_word_count() {
        let record = Record::new(
            3,
            "Virus spread model",
            Some("  We model\tthe spread\nof a virus.  "),
            Some("  Lancet "),
            Some("2020-04-01"),
        );
        assert_eq!(record.year, Some(2020));
        assert_eq!(record.abstract_word_count, 7);
        assert_eq!(record.journal.as_deref(), Some("Lancet"));
        assert_eq!(record.publish_time, "2020-04-01");
    }

    #[test]
    fn missing_optional_fields_default() {
        let record = Record::new(0, "Title", None, Some("   "), None);
        assert_eq!(record.abstract_word_count, 0);
        assert_eq!(record.abstract_text, "");
        assert_eq!(record.journal, None);
        assert!(record.published.is_missing());
        assert_eq!(record.year, None);
    }

    #[test]
    fn year_bounds_skip_missing_years() {
        let corpus = Corpus::from_records(vec![
            Record::new(0, "a", None, None, Some("2021")),
            Record::new(1, "b", None, None, Some("n/a")),
            Record::new(2, "c", None, None, Some("2019-06-01")),
        ]);
        assert_eq!(corpus.year_bounds(), Some((2019, 2021)));
        assert_eq!(Corpus::default().year_bounds(), None);
        assert_eq!(corpus.preview(2).len(), 2);
        assert_eq!(corpus.preview(10).len(), 3);
    }
}
