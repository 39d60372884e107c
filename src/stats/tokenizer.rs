//! Title tokenizer.
//!
//! Splits free text into lower-cased alphabetic runs. Anything that is not a
//! letter (whitespace, punctuation, digits) separates tokens, and runs
//! shorter than [`MIN_TOKEN_LEN`] characters are skipped:
//!
//! ```
//! use cord_explorer::stats::tokenize;
//!
//! let tokens: Vec<String> = tokenize("COVID19 vaccine: a 2nd-dose trial").collect();
//! assert_eq!(tokens, ["covid", "vaccine", "dose", "trial"]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest run (in characters) that counts as a token.
pub const MIN_TOKEN_LEN: usize = 4;

static ALPHA_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Alphabetic}+").unwrap());

/// Lazy token sequence over borrowed text.
///
/// A clone resumes from the same position. Call [`tokenize`] again to start
/// over from the beginning.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pos < self.text.len() {
            let Some(run) = ALPHA_RUN.find_at(self.text, self.pos) else {
                self.pos = self.text.len();
                break;
            };
            self.pos = run.end();
            if run.as_str().chars().count() >= MIN_TOKEN_LEN {
                return Some(run.as_str().to_lowercase());
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

/// Tokens of `text`; empty text yields nothing.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { text, pos: 0 }
}
