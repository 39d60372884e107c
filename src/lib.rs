//! CORD Explorer
//!
//! Loads research-paper metadata (CORD-19 `metadata.csv` style), cleans it,
//! filters it by publication year and derives a year histogram, a venue
//! ranking and title term frequencies. The `cord_explorer` binary puts a
//! batch report and an interactive explorer on top of this library.

pub mod charts;
pub mod config;
pub mod data;
pub mod report;
pub mod stats;
