//! CSV Data Loader Module
//! Reads the metadata table with Polars, keeping every cell as text.

use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const TITLE: &str = "title";
pub const ABSTRACT: &str = "abstract";
pub const PUBLISH_TIME: &str = "publish_time";
pub const JOURNAL: &str = "journal";

/// Columns without which the table cannot be normalized.
pub const REQUIRED_COLUMNS: [&str; 2] = [TITLE, PUBLISH_TIME];
/// Columns the pipeline reads; anything else is carried but ignored.
pub const CORE_COLUMNS: [&str; 4] = [TITLE, ABSTRACT, PUBLISH_TIME, JOURNAL];

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("cannot read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("malformed table in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("{} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Shape and missing-value counts of a raw table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub rows: usize,
    pub columns: Vec<String>,
    /// `(column, missing cells)` for each of [`CORE_COLUMNS`]; an absent
    /// column counts every row as missing.
    pub missing: Vec<(String, usize)>,
}

/// The table exactly as loaded: one row per input row, all columns as text.
#[derive(Debug, Clone)]
pub struct RawCorpus {
    frame: DataFrame,
    source: PathBuf,
}

impl RawCorpus {
    /// Wrap an existing frame, checking that the required columns exist.
    pub fn from_frame(frame: DataFrame, source: impl Into<PathBuf>) -> Result<Self, DataSourceError> {
        let source = source.into();
        for column in REQUIRED_COLUMNS {
            if frame.column(column).is_err() {
                return Err(DataSourceError::MissingColumn {
                    path: source,
                    column,
                });
            }
        }
        Ok(Self { frame, source })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of rows in the table.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Column names in source order.
    pub fn columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Cells of a column as optional strings, or `None` if the column is
    /// absent. Non-text columns are cast to text first.
    pub fn text_column(&self, name: &str) -> Result<Option<Vec<Option<String>>>, DataSourceError> {
        let Ok(column) = self.frame.column(name) else {
            return Ok(None);
        };
        let malformed = |source| DataSourceError::Malformed {
            path: self.source.clone(),
            source,
        };

        let text = column.cast(&DataType::String).map_err(malformed)?;
        let values = text
            .str()
            .map_err(malformed)?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(Some(values))
    }

    /// Row count, column names and missing-value counts per core column.
    pub fn profile(&self) -> Result<ColumnProfile, DataSourceError> {
        let rows = self.height();
        let mut missing = Vec::with_capacity(CORE_COLUMNS.len());
        for name in CORE_COLUMNS {
            let count = match self.text_column(name)? {
                Some(values) => values
                    .iter()
                    .filter(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
                    .count(),
                None => rows,
            };
            missing.push((name.to_string(), count));
        }

        Ok(ColumnProfile {
            rows,
            columns: self.columns(),
            missing,
        })
    }
}

/// Loads metadata CSV files.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file using Polars.
    ///
    /// Schema inference is disabled so every column arrives as text,
    /// exactly as written in the file.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<RawCorpus, DataSourceError> {
        let path = path.as_ref();

        let meta = std::fs::metadata(path).map_err(|e| DataSourceError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !meta.is_file() {
            return Err(DataSourceError::Unreadable {
                path: path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }

        debug!(path = %path.display(), bytes = meta.len(), "reading csv");
        let frame = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| DataSourceError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let raw = RawCorpus::from_frame(frame, path)?;
        info!(
            path = %path.display(),
            rows = raw.height(),
            columns = raw.frame.width(),
            "loaded metadata table"
        );
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("title".into(), vec![Some("A"), None, Some(" ")]),
            Column::new("publish_time".into(), vec![Some("2020"), Some("2021"), None]),
            Column::new("journal".into(), vec![Some("J"), Some("J"), Some("K")]),
            Column::new("sha".into(), vec![Some("x"), Some("y"), Some("z")]),
        ])
        .unwrap()
    }

    #[test]
    fn profile_counts_blank_and_absent_cells() {
        let raw = RawCorpus::from_frame(frame(), "mem.csv").unwrap();
        let profile = raw.profile().unwrap();
        assert_eq!(profile.rows, 3);
        assert_eq!(profile.columns, vec!["title", "publish_time", "journal", "sha"]);
        assert_eq!(
            profile.missing,
            vec![
                ("title".to_string(), 2),
                ("abstract".to_string(), 3),
                ("publish_time".to_string(), 1),
                ("journal".to_string(), 0),
            ]
        );
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let frame = DataFrame::new(vec![Column::new("title".into(), vec!["A"])]).unwrap();
        let err = RawCorpus::from_frame(frame, "mem.csv").unwrap_err();
        assert!(matches!(
            err,
            DataSourceError::MissingColumn {
                column: "publish_time",
                ..
            }
        ));
    }

    #[test]
    fn unreadable_path_reports_the_path() {
        let err = DataLoader::load_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataSourceError::Unreadable { .. }));
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn directory_is_not_a_table() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::load_csv(dir.path()).unwrap_err();
        assert!(matches!(err, DataSourceError::Unreadable { .. }));
    }

    #[test]
    fn cells_are_kept_as_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title,publish_time,journal,cord_uid").unwrap();
        writeln!(file, "\"Masks, revisited\",2020-05-01,BMJ,007").unwrap();
        writeln!(file, "Second,2021,,42").unwrap();
        file.flush().unwrap();

        let raw = DataLoader::load_csv(file.path()).unwrap();
        assert_eq!(raw.height(), 2);
        let titles = raw.text_column("title").unwrap().unwrap();
        assert_eq!(titles[0].as_deref(), Some("Masks, revisited"));
        let uids = raw.text_column("cord_uid").unwrap().unwrap();
        assert_eq!(uids[0].as_deref(), Some("007"));
        assert!(raw.text_column("abstract").unwrap().is_none());
    }

    #[test]
    fn ragged_row_is_malformed() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "title,publish_time").unwrap();
        writeln!(file, "First,2020").unwrap();
        writeln!(file, "Second,2021,extra,cells").unwrap();
        file.flush().unwrap();

        let err = DataLoader::load_csv(file.path()).unwrap_err();
        assert!(matches!(&err, DataSourceError::Malformed { path, .. } if path == file.path()));
        assert!(err.to_string().contains(&file.path().display().to_string()));
        assert!(std::error::Error::source(&err).is_some());
    }
}
