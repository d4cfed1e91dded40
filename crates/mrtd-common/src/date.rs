//! Date forms used around BAC key derivation
//!
//! Callers hand in calendar dates as text; the chip wants YYMMDD and the
//! result record reports YYYYMMDD. `Date6` keeps the full calendar date
//! so widening back to eight digits never has to guess a century when the
//! value came from the caller.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Errors that can occur while normalizing a date
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("unrecognized date format: {0:?}")]
    Unrecognized(String),

    #[error("not a calendar date: {0:?}")]
    NotACalendarDate(String),

    #[error("year outside 1900..=2099: {0:?}")]
    OutOfRange(String),
}

/// Years that map to exactly one YYMMDD value
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1900..=2099;

/// Which document field a chip-stored YYMMDD value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    Birth,
    Expiry,
}

/// A date in the six-digit YYMMDD form required for key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date6(NaiveDate);

/// A date in the eight-digit YYYYMMDD form reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date8(NaiveDate);

impl Date6 {
    /// Widen a chip-stored YYMMDD value.
    ///
    /// Birth dates take the latest century that does not put them after
    /// `reference_year`; expiry dates are always 20YY.
    pub fn from_document(value: &str, kind: DateKind, reference_year: i32) -> Result<Self, DateError> {
        let value = value.trim();
        if value.len() != 6 || !value.is_ascii() {
            return Err(DateError::Unrecognized(value.to_string()));
        }

        let yy = digits(&value[0..2]).ok_or_else(|| DateError::Unrecognized(value.to_string()))?;
        let month = digits(&value[2..4]).ok_or_else(|| DateError::Unrecognized(value.to_string()))?;
        let day = digits(&value[4..6]).ok_or_else(|| DateError::Unrecognized(value.to_string()))?;

        let mut year = 2000 + yy as i32;
        if kind == DateKind::Birth && year > reference_year {
            year -= 100;
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date6)
            .ok_or_else(|| DateError::NotACalendarDate(value.to_string()))
    }
}

impl fmt::Display for Date6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}{:02}{:02}",
            self.0.year().rem_euclid(100),
            self.0.month(),
            self.0.day()
        )
    }
}

impl fmt::Display for Date8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.0.year(), self.0.month(), self.0.day())
    }
}

/// Normalize a caller-supplied date into YYMMDD form.
///
/// Accepted inputs:
/// * `YYYY-MM-DD`
/// * an ISO timestamp such as `1990-05-12T00:00:00.000Z` (date part only)
/// * `YYYYMMDD`
pub fn normalize(input: &str) -> Result<Date6, DateError> {
    let trimmed = input.trim();
    // Timestamps from JS `Date.toISOString()` carry a time part we don't need
    let date_part = trimmed.split_once('T').map_or(trimmed, |(date, _)| date);

    let (year, month, day) = if date_part.len() == 10 {
        let mut parts = date_part.split('-');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d), None) if y.len() == 4 && m.len() == 2 && d.len() == 2 => {
                (digits(y), digits(m), digits(d))
            }
            _ => return Err(DateError::Unrecognized(input.to_string())),
        }
    } else if date_part.len() == 8 && date_part.is_ascii() {
        (
            digits(&date_part[0..4]),
            digits(&date_part[4..6]),
            digits(&date_part[6..8]),
        )
    } else {
        return Err(DateError::Unrecognized(input.to_string()));
    };

    let (year, month, day) = match (year, month, day) {
        (Some(y), Some(m), Some(d)) => (y as i32, m, d),
        _ => return Err(DateError::Unrecognized(input.to_string())),
    };

    if !SUPPORTED_YEARS.contains(&year) {
        return Err(DateError::OutOfRange(input.to_string()));
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Date6)
        .ok_or_else(|| DateError::NotACalendarDate(input.to_string()))
}

/// Widen a normalized date to YYYYMMDD form
pub fn expand(date: Date6) -> Date8 {
    Date8(date.0)
}

/// Parse a run of ASCII digits. `str::parse` alone would accept a leading '+'.
fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_iso() {
        assert_eq!(normalize("1990-05-12").unwrap().to_string(), "900512");
        assert_eq!(normalize("2031-12-01").unwrap().to_string(), "311201");
    }

    #[test]
    fn test_normalize_compact_and_timestamp() {
        assert_eq!(normalize("19900512").unwrap().to_string(), "900512");
        assert_eq!(
            normalize("1990-05-12T00:00:00.000Z").unwrap().to_string(),
            "900512"
        );
        assert_eq!(normalize(" 2000-01-09 ").unwrap().to_string(), "000109");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(matches!(normalize("not-a-date"), Err(DateError::Unrecognized(_))));
        assert!(matches!(normalize(""), Err(DateError::Unrecognized(_))));
        assert!(matches!(normalize("900512"), Err(DateError::Unrecognized(_))));
        assert!(matches!(normalize("1990-5-12"), Err(DateError::Unrecognized(_))));
        assert!(matches!(normalize("+990-05-12"), Err(DateError::Unrecognized(_))));
        // Day-first is not a supported input form
        assert!(matches!(normalize("31-02-2020"), Err(DateError::Unrecognized(_))));
    }

    #[test]
    fn test_normalize_rejects_impossible_dates() {
        assert!(matches!(normalize("2020-02-31"), Err(DateError::NotACalendarDate(_))));
        assert!(matches!(normalize("20211301"), Err(DateError::NotACalendarDate(_))));
        assert!(matches!(normalize("2021-02-29"), Err(DateError::NotACalendarDate(_))));
        assert!(normalize("2020-02-29").is_ok());
    }

    #[test]
    fn test_normalize_rejects_out_of_range_years() {
        for input in ["0000-01-01", "1850-01-01", "1899-12-31", "2100-01-01", "21500101"] {
            assert!(
                matches!(normalize(input), Err(DateError::OutOfRange(_))),
                "input {input:?}"
            );
        }
        assert_eq!(normalize("1900-01-01").unwrap().to_string(), "000101");
        assert_eq!(normalize("2099-12-31").unwrap().to_string(), "991231");
    }

    #[test]
    fn test_expand_round_trip_full_range() {
        let mut date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap();
        while date <= end {
            let d8 = date.format("%Y%m%d").to_string();
            let normalized = normalize(&d8).unwrap();
            assert_eq!(normalized.to_string(), date.format("%y%m%d").to_string());
            assert_eq!(expand(normalized).to_string(), d8);
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_from_document_birth_century() {
        let born = Date6::from_document("900512", DateKind::Birth, 2026).unwrap();
        assert_eq!(expand(born).to_string(), "19900512");

        let born = Date6::from_document("150301", DateKind::Birth, 2026).unwrap();
        assert_eq!(expand(born).to_string(), "20150301");

        let born = Date6::from_document("260101", DateKind::Birth, 2026).unwrap();
        assert_eq!(expand(born).to_string(), "20260101");
    }

    #[test]
    fn test_from_document_expiry_century() {
        let expiry = Date6::from_document("900512", DateKind::Expiry, 2026).unwrap();
        assert_eq!(expand(expiry).to_string(), "20900512");
    }

    #[test]
    fn test_from_document_rejects_malformed() {
        assert!(Date6::from_document("9005", DateKind::Birth, 2026).is_err());
        assert!(Date6::from_document("90AB12", DateKind::Birth, 2026).is_err());
        assert!(matches!(
            Date6::from_document("900231", DateKind::Birth, 2026),
            Err(DateError::NotACalendarDate(_))
        ));
    }
}
