//! Explorer configuration
//! TOML settings shared by the `report` and `explore` commands.
//!
//! Every key is optional; a partial file is filled in from the defaults.

use crate::charts::WordCloudOptions;
use crate::data::YearRange;
use crate::stats::{DEFAULT_TOP_TERMS, DEFAULT_TOP_VENUES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Picked up from the working directory when no `--config` is given.
pub const LOCAL_CONFIG_FILE: &str = "cord-explorer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid setting {key}: must be greater than zero")]
    Zero { key: &'static str },
    #[error("invalid font sizes: need 0 < min_font <= max_font, got {min_font} and {max_font}")]
    FontRange { min_font: f64, max_font: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub data: DataConfig,
    pub views: ViewConfig,
    pub wordcloud: WordCloudOptions,
    pub charts: ChartConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV opened on startup by `explore`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub top_venues: usize,
    pub top_terms: usize,
    pub preview_rows: usize,
    /// Initial interval of the explorer, clamped to the data.
    pub default_year_range: YearRange,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            top_venues: DEFAULT_TOP_VENUES,
            top_terms: DEFAULT_TOP_TERMS,
            preview_rows: 20,
            default_year_range: YearRange::DEFAULT,
        }
    }
}

/// Size of the static bar charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
        }
    }
}

/// Command-line values that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_path: Option<PathBuf>,
    pub top_venues: Option<usize>,
    pub top_terms: Option<usize>,
}

impl ExplorerConfig {
    /// Resolve the configuration.
    ///
    /// An explicit path must exist and parse. Otherwise `cord-explorer.toml`
    /// in the working directory is used when present, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => {
                let local = Path::new(LOCAL_CONFIG_FILE);
                if local.is_file() {
                    Self::from_path(local)
                } else {
                    debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply command-line values.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(path) = overrides.data_path {
            self.data.path = Some(path);
        }
        if let Some(n) = overrides.top_venues {
            self.views.top_venues = n;
        }
        if let Some(k) = overrides.top_terms {
            self.views.top_terms = k;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("views.top_venues", self.views.top_venues),
            ("views.top_terms", self.views.top_terms),
            ("wordcloud.width", self.wordcloud.width as usize),
            ("wordcloud.height", self.wordcloud.height as usize),
            ("wordcloud.max_words", self.wordcloud.max_words),
            ("charts.width", self.charts.width as usize),
            ("charts.height", self.charts.height as usize),
        ];
        if let Some((key, _)) = checks.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero { key });
        }

        let WordCloudOptions { min_font, max_font, .. } = self.wordcloud;
        let usable = min_font.is_finite() && max_font.is_finite() && min_font > 0.0 && min_font <= max_font;
        if !usable {
            return Err(ConfigError::FontRange { min_font, max_font });
        }
        Ok(())
    }
}
