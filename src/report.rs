//! Batch Report
//! Runs the whole pipeline once and produces a text summary, chart images
//! and a machine-readable `summary.json`.

use crate::charts::{render_word_cloud, RenderError, StaticChartRenderer, WordCloudOptions};
use crate::config::ChartConfig;
use crate::data::{
    ColumnProfile, Corpus, DataSourceError, FieldNormalizer, InvalidRangeError, NormalizeReport,
    RangeFilter, RawCorpus, Record, YearRange,
};
use crate::stats::{Aggregator, InvalidArgumentError, TermFrequency, VenueRanking, WordCountSummary, YearHistogram};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const YEAR_CHART_FILE: &str = "publications_by_year.png";
pub const VENUE_CHART_FILE: &str = "top_journals.png";
pub const WORDCLOUD_FILE: &str = "title_wordcloud.png";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Data(#[from] DataSourceError),
    #[error(transparent)]
    Range(#[from] InvalidRangeError),
    #[error(transparent)]
    Argument(#[from] InvalidArgumentError),
    #[error("cannot write chart {}: {source}", path.display())]
    Chart {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
}

/// What to put in the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    /// First year to include. Without it the range starts at the oldest
    /// dated record.
    pub from: Option<i32>,
    /// Last year to include. Without it the range ends at the newest dated
    /// record.
    pub to: Option<i32>,
    pub top_venues: usize,
    pub top_terms: usize,
    pub preview_rows: usize,
}

/// One line of the cleaned-data preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    pub title: String,
    pub journal: Option<String>,
    pub publish_time: String,
    pub year: Option<i32>,
    pub abstract_word_count: usize,
}

impl From<&Record> for PreviewRow {
    fn from(record: &Record) -> Self {
        Self {
            title: record.title.clone(),
            journal: record.journal.clone(),
            publish_time: record.publish_time.clone(),
            year: record.year,
            abstract_word_count: record.abstract_word_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: PathBuf,
    pub profile: ColumnProfile,
    pub normalize: NormalizeReport,
    pub range: Option<YearRange>,
    pub subset_size: usize,
    pub abstract_words: Option<WordCountSummary>,
    pub publications_by_year: YearHistogram,
    pub top_venues: VenueRanking,
    pub top_terms: TermFrequency,
    pub preview: Vec<PreviewRow>,
    /// Every title term of the subset, for the word cloud.
    #[serde(skip)]
    pub cloud_terms: TermFrequency,
}

impl Report {
    /// Normalize `raw`, restrict it to the requested years and aggregate.
    pub fn generate(raw: &RawCorpus, options: &ReportOptions) -> Result<Self, ReportError> {
        let profile = raw.profile()?;
        let (corpus, normalize) = FieldNormalizer::normalize(raw)?;
        Self::from_corpus(raw.source(), profile, &corpus, normalize, options)
    }

    /// Aggregate an already-normalized corpus.
    pub fn from_corpus(
        source: &Path,
        profile: ColumnProfile,
        corpus: &Corpus,
        normalize: NormalizeReport,
        options: &ReportOptions,
    ) -> Result<Self, ReportError> {
        let range = Self::resolve_range(options.from, options.to, corpus.year_bounds())?;
        let subset: Vec<&Record> = match range {
            Some(range) => RangeFilter::apply_range(corpus, range).records().to_vec(),
            None => Vec::new(),
        };

        let report = Self {
            source: source.to_path_buf(),
            profile,
            normalize,
            range,
            subset_size: subset.len(),
            abstract_words: WordCountSummary::compute(subset.iter().copied()),
            publications_by_year: Aggregator::year_histogram(subset.iter().copied()),
            top_venues: Aggregator::venue_ranking(subset.iter().copied(), options.top_venues)?,
            top_terms: Aggregator::term_frequency(subset.iter().copied(), Some(options.top_terms))?,
            preview: subset
                .iter()
                .take(options.preview_rows)
                .map(|r| PreviewRow::from(*r))
                .collect(),
            cloud_terms: Aggregator::term_frequency(subset.iter().copied(), None)?,
        };
        info!(
            source = %report.source.display(),
            subset = report.subset_size,
            years = report.publications_by_year.len(),
            venues = report.top_venues.len(),
            "report generated"
        );
        Ok(report)
    }

    /// Fill a missing end of the interval from the corpus's year bounds.
    ///
    /// A lone `from` runs to the newest year (or just `from` when that is
    /// later), a lone `to` starts at the oldest. Without dated records a lone
    /// bound becomes a one-year range.
    fn resolve_range(
        from: Option<i32>,
        to: Option<i32>,
        bounds: Option<(i32, i32)>,
    ) -> Result<Option<YearRange>, InvalidRangeError> {
        let (lo, hi) = match (from, to, bounds) {
            (None, None, None) => return Ok(None),
            (None, None, Some(bounds)) => bounds,
            (Some(lo), Some(hi), _) => (lo, hi),
            (Some(lo), None, Some((_, newest))) => (lo, newest.max(lo)),
            (None, Some(hi), Some((oldest, _))) => (oldest.min(hi), hi),
            (Some(year), None, None) | (None, Some(year), None) => (year, year),
        };
        YearRange::new(lo, hi).map(Some)
    }

    /// Write `summary.json` and the charts into `dir`, creating it if needed.
    ///
    /// The summary goes first. Every chart is attempted; charts with nothing
    /// to show are skipped with a warning, and the first chart that fails to
    /// render or save is returned as [`ReportError::Chart`] after the rest
    /// have been written. Returns the files written.
    pub fn write_artifacts(
        &self,
        dir: &Path,
        charts: &ChartConfig,
        cloud: &WordCloudOptions,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ReportError::Io { path, source }
        };
        fs::create_dir_all(dir).map_err(io_error(dir))?;
        let mut written = Vec::new();

        let path = dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(io_error(&path))?;
        written.push(path);

        // Charts are independent; render them in parallel.
        let ((years, venues), words) = rayon::join(
            || {
                rayon::join(
                    || {
                        StaticChartRenderer::render_year_histogram(
                            &self.publications_by_year,
                            charts.width,
                            charts.height,
                        )
                    },
                    || StaticChartRenderer::render_venue_ranking(&self.top_venues, charts.width, charts.height),
                )
            },
            || render_word_cloud(&self.cloud_terms, cloud).map(|(image, _)| image),
        );

        let mut failure = None;
        for (file, rendered) in [(YEAR_CHART_FILE, years), (VENUE_CHART_FILE, venues), (WORDCLOUD_FILE, words)] {
            let path = dir.join(file);
            match rendered.and_then(|image| image.save(&path)) {
                Ok(()) => written.push(path),
                Err(RenderError::Empty(what)) => warn!(chart = what, "nothing to draw, skipped"),
                Err(source) => {
                    warn!(path = %path.display(), error = %source, "chart not written");
                    failure.get_or_insert(ReportError::Chart { path, source });
                }
            }
        }

        info!(dir = %dir.display(), files = written.len(), "report artifacts written");
        match failure {
            Some(err) => Err(err),
            None => Ok(written),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source.display())?;
        writeln!(f, "Shape: {} rows x {} columns", self.profile.rows, self.profile.columns.len())?;

        writeln!(f, "\nMissing values in important columns:")?;
        for (column, missing) in &self.profile.missing {
            writeln!(f, "  {column:<14}{missing:>8}")?;
        }

        let n = &self.normalize;
        writeln!(f, "\nCleaning:")?;
        writeln!(f, "  kept {} of {} rows", n.kept, n.raw_rows)?;
        writeln!(f, "  dropped {} without title", n.dropped_missing_title)?;
        writeln!(f, "  dropped {} with unparsable publish_time", n.dropped_unparsable_date)?;

        match self.range {
            Some(range) => writeln!(
                f,
                "\nYears {}-{}: {} papers",
                range.lo(),
                range.hi(),
                self.subset_size
            )?,
            None => writeln!(f, "\nNo dated papers")?,
        }

        if let Some(words) = &self.abstract_words {
            writeln!(f, "\nAbstract word count:")?;
            writeln!(
                f,
                "  mean {:.1}  std {:.1}  min {}  median {}  p95 {}  max {}",
                words.mean, words.std, words.min, words.median, words.p95, words.max
            )?;
        }

        writeln!(f, "\nPublications by year:")?;
        for (year, count) in self.publications_by_year.iter() {
            writeln!(f, "  {year}{count:>10}")?;
        }

        writeln!(f, "\nTop {} journals:", self.top_venues.len())?;
        for (rank, (venue, count)) in self.top_venues.iter().enumerate() {
            writeln!(f, "  {:>2}. {venue} ({count})", rank + 1)?;
        }

        writeln!(f, "\nTop {} words in titles:", self.top_terms.len())?;
        for (term, count) in self.top_terms.iter() {
            writeln!(f, "  {term:<20}{count:>8}")?;
        }

        if !self.preview.is_empty() {
            writeln!(f, "\nCleaned dataset preview:")?;
            for row in &self.preview {
                writeln!(
                    f,
                    "  {} | {} | {}",
                    row.publish_time,
                    row.journal.as_deref().unwrap_or("-"),
                    row.title
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;
    use std::io::Write;

    const CSV: &str = "\
title,abstract,publish_time,journal
Virus spread model,one two three,2020-03-01,Lancet
Vaccine trial results,,2021,BMJ
virus transmission study,four five,2020-07,Lancet
,no title,2020,Lancet
Old paper,,not a date,Nature
";

    fn raw() -> (tempfile::NamedTempFile, RawCorpus) {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let raw = DataLoader::load_csv(file.path()).unwrap();
        (file, raw)
    }

    fn options(from: Option<i32>, to: Option<i32>) -> ReportOptions {
        ReportOptions {
            from,
            to,
            top_venues: 10,
            top_terms: 2,
            preview_rows: 2,
        }
    }

    #[test]
    fn report_covers_every_dated_record_by_default() {
        let (_file, raw) = raw();
        let report = Report::generate(&raw, &options(None, None)).unwrap();

        assert_eq!(report.profile.rows, 5);
        assert_eq!(report.normalize.kept, 3);
        assert_eq!(report.normalize.dropped, 2);
        assert_eq!(report.range, Some(YearRange::new(2020, 2021).unwrap()));
        assert_eq!(report.subset_size, 3);
        assert_eq!(report.publications_by_year.get(2020), 2);
        assert_eq!(report.top_venues.entries()[0], ("Lancet".to_string(), 2));
        assert_eq!(report.top_terms.entries()[0], ("virus".to_string(), 2));
        assert_eq!(report.top_terms.len(), 2);
        assert_eq!(report.cloud_terms.len(), 8);
        assert_eq!(report.preview.len(), 2);
        assert_eq!(report.preview[0].title, "Virus spread model");
    }

    #[test]
    fn report_respects_range() {
        let (_file, raw) = raw();
        let report = Report::generate(&raw, &options(Some(2021), Some(2021))).unwrap();

        assert_eq!(report.subset_size, 1);
        assert_eq!(report.top_venues.entries(), &[("BMJ".to_string(), 1)]);
        let text = report.to_string();
        assert!(text.contains("Years 2021-2021: 1 papers"));
        assert!(text.contains("BMJ (1)"));
    }

    #[test]
    fn zero_top_venues_is_an_error() {
        let (_file, raw) = raw();
        let err = Report::generate(
            &raw,
            &ReportOptions {
                top_venues: 0,
                ..options(None, None)
            },
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Argument(_)));
    }

    #[test]
    fn empty_subset_writes_only_summary() {
        let (_file, raw) = raw();
        let report = Report::generate(&raw, &options(Some(1990), Some(1991))).unwrap();
        assert_eq!(report.subset_size, 0);
        assert!(report.abstract_words.is_none());

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let written = report
            .write_artifacts(&out, &ChartConfig::default(), &WordCloudOptions::default())
            .unwrap();
        assert_eq!(written, vec![out.join(SUMMARY_FILE)]);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(SUMMARY_FILE)).unwrap()).unwrap();
        assert_eq!(json["subset_size"], 0);
        assert_eq!(json["range"], serde_json::json!([1990, 1991]));
        assert_eq!(json["normalize"]["dropped_missing_title"], 1);
        assert!(json.get("cloud_terms").is_none());
    }

    #[test]
    fn lone_bound_is_completed_from_the_data() {
        let (_file, raw) = raw();
        let from = Report::generate(&raw, &options(Some(2021), None)).unwrap();
        assert_eq!(from.range, Some(YearRange::new(2021, 2021).unwrap()));
        assert_eq!(from.subset_size, 1);

        let to = Report::generate(&raw, &options(None, Some(2020))).unwrap();
        assert_eq!(to.range, Some(YearRange::new(2020, 2020).unwrap()));
        assert_eq!(to.subset_size, 2);

        // Past the newest year: an empty one-year range, not an error.
        let later = Report::generate(&raw, &options(Some(2022), None)).unwrap();
        assert_eq!(later.range, Some(YearRange::new(2022, 2022).unwrap()));
        assert_eq!(later.subset_size, 0);

        let inverted = Report::generate(&raw, &options(Some(2021), Some(2020))).unwrap_err();
        assert!(matches!(inverted, ReportError::Range(_)));
    }

    #[test]
    fn lone_bound_without_dated_records() {
        assert_eq!(Report::resolve_range(None, None, None).unwrap(), None);
        assert_eq!(
            Report::resolve_range(None, Some(2019), None).unwrap(),
            Some(YearRange::new(2019, 2019).unwrap())
        );
    }

    #[test]
    fn failed_chart_keeps_summary_and_names_the_file() {
        let (_file, raw) = raw();
        let report = Report::generate(&raw, &options(None, None)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let zero = ChartConfig { width: 0, height: 0 };
        let cloud = WordCloudOptions {
            width: 0,
            ..WordCloudOptions::default()
        };

        let err = report.write_artifacts(dir.path(), &zero, &cloud).unwrap_err();
        match err {
            ReportError::Chart { path, source } => {
                assert_eq!(path, dir.path().join(YEAR_CHART_FILE));
                assert!(matches!(source, RenderError::Size { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.path().join(SUMMARY_FILE).is_file());
        for chart in [YEAR_CHART_FILE, VENUE_CHART_FILE, WORDCLOUD_FILE] {
            assert!(!dir.path().join(chart).exists(), "{chart}");
        }
    }

    #[test]
    fn unwritable_chart_reports_its_path() {
        let (_file, raw) = raw();
        let report = Report::generate(&raw, &options(None, None)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        // A directory where the venue chart should go makes its save fail.
        fs::create_dir(dir.path().join(VENUE_CHART_FILE)).unwrap();

        let err = report
            .write_artifacts(dir.path(), &ChartConfig::default(), &WordCloudOptions::default())
            .unwrap_err();
        match &err {
            ReportError::Chart {
                path,
                source: RenderError::Image(_),
            } => assert_eq!(*path, dir.path().join(VENUE_CHART_FILE)),
            // Hosts without a sans-serif font fail while drawing instead.
            ReportError::Chart {
                source: RenderError::Backend(_),
                ..
            } => {}
            other => panic!("unexpected error: {other}"),
        }
        if let ReportError::Chart { path, .. } = &err {
            assert!(err.to_string().contains(&path.display().to_string()));
        }
        assert!(dir.path().join(SUMMARY_FILE).is_file());
    }
}
