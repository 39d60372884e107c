//! Tolerant publish-date parsing.
//!
//! Raw `publish_time` cells come in several granularities (`2020`, `2020-03`,
//! `2020-03-15`, `2020 Mar 15`, timestamps, ...). Everything routes through
//! [`parse_publish_time`], which never fails: values it cannot read become
//! [`ParsedDate::Missing`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::RangeInclusive;

/// Years outside this window are treated as unparsable.
pub const YEAR_WINDOW: RangeInclusive<i32> = 1000..=9999;

const DAY_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y %b %d",
    "%d %b %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%m/%d/%Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
];

static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})(?:\.0)?$").unwrap());
static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})[-/.](\d{1,2})$").unwrap());
static YEAR_MONTH_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})\s+([A-Za-z]{3,9})\.?$").unwrap());

/// How much of the calendar date the source actually specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// Outcome of tolerant date parsing.
///
/// Partial dates resolve to the first day of their period, so `2020-03`
/// becomes `2020-03-01` with [`DatePrecision::Month`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParsedDate {
    Date {
        date: NaiveDate,
        precision: DatePrecision,
    },
    Missing,
}

impl ParsedDate {
    pub fn year(&self) -> Option<i32> {
        self.date().map(|d| d.year())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ParsedDate::Date { date, .. } => Some(*date),
            ParsedDate::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ParsedDate::Missing)
    }
}

/// Parse a raw `publish_time` cell. `None` and blank cells are `Missing`.
pub fn parse_publish_time(raw: Option<&str>) -> ParsedDate {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return ParsedDate::Missing;
    };

    parse_day(value)
        .map(|date| (date, DatePrecision::Day))
        .or_else(|| parse_month(value).map(|date| (date, DatePrecision::Month)))
        .or_else(|| parse_year(value).map(|date| (date, DatePrecision::Year)))
        .filter(|(date, _)| YEAR_WINDOW.contains(&date.year()))
        .map(|(date, precision)| ParsedDate::Date { date, precision })
        .unwrap_or(ParsedDate::Missing)
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn parse_month(value: &str) -> Option<NaiveDate> {
    if let Some(caps) = YEAR_MONTH.captures(value) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    let caps = YEAR_MONTH_NAME.captures(value)?;
    NaiveDate::parse_from_str(&format!("{} {} 1", &caps[1], &caps[2]), "%Y %b %d").ok()
}

fn parse_year(value: &str) -> Option<NaiveDate> {
    let caps = YEAR_ONLY.captures(value)?;
    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_dates_in_several_shapes() {
        for raw in ["2020-03-15", "2020/03/15", "2020 Mar 15", "15 Mar 2020", "Mar 15, 2020", "03/15/2020"] {
            assert_eq!(
                parse_publish_time(Some(raw)),
                ParsedDate::Date {
                    date: ymd(2020, 3, 15),
                    precision: DatePrecision::Day
                },
                "{raw}"
            );
        }
    }

    #[test]
    fn timestamps_keep_the_calendar_day() {
        assert_eq!(parse_publish_time(Some("2021-07-04 13:45:00")).year(), Some(2021));
        assert_eq!(
            parse_publish_time(Some("2019-12-31T23:00:00+00:00")).date(),
            Some(ymd(2019, 12, 31))
        );
    }

    #[test]
    fn partial_dates_resolve_to_period_start() {
        assert_eq!(
            parse_publish_time(Some("2020-05")),
            ParsedDate::Date {
                date: ymd(2020, 5, 1),
                precision: DatePrecision::Month
            }
        );
        assert_eq!(
            parse_publish_time(Some("2018 Nov")),
            ParsedDate::Date {
                date: ymd(2018, 11, 1),
                precision: DatePrecision::Month
            }
        );
        assert_eq!(
            parse_publish_time(Some(" 2017 ")),
            ParsedDate::Date {
                date: ymd(2017, 1, 1),
                precision: DatePrecision::Year
            }
        );
    }

    #[test]
    fn garbage_becomes_missing() {
        for raw in ["", "   ", "unknown", "2020-13-01", "2020-02-30", "20", "0999-01-01"] {
            assert!(parse_publish_time(Some(raw)).is_missing(), "{raw}");
        }
        assert!(parse_publish_time(None).is_missing());
        assert_eq!(ParsedDate::Missing.year(), None);
    }
}
