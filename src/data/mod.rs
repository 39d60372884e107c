//! Data module - loading, cleaning and filtering of paper metadata

mod dates;
mod filter;
mod loader;
mod normalizer;
mod record;

pub use dates::{parse_publish_time, DatePrecision, ParsedDate, YEAR_WINDOW};
pub use filter::{CorpusView, InvalidRangeError, RangeFilter, YearRange};
pub use loader::{
    ColumnProfile, DataLoader, DataSourceError, RawCorpus, ABSTRACT, CORE_COLUMNS, JOURNAL,
    PUBLISH_TIME, REQUIRED_COLUMNS, TITLE,
};
pub use normalizer::{FieldNormalizer, NormalizeReport};
pub use record::{Corpus, Record};
