//! Stats module - tokenization, aggregated views and descriptive statistics

mod aggregator;
mod summary;
mod tokenizer;

pub use aggregator::{
    Aggregator, InvalidArgumentError, RankedCounts, TermFrequency, VenueRanking, YearHistogram,
    DEFAULT_TOP_TERMS, DEFAULT_TOP_VENUES,
};
pub use summary::WordCountSummary;
pub use tokenizer::{tokenize, Tokens, MIN_TOKEN_LEN};
