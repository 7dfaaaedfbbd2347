use std::{fmt::Display, str::FromStr};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ISO_FORMAT: &str = "%Y-%m-%d";
const BR_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("Invalid date '{0}'. Use the YYYY-MM-DD format.")]
    InvalidIsoDate(String),
    #[error("Invalid date format '{0}'. Use DD/MM/YYYY or DD/MM/YYYY/DD/MM/YYYY.")]
    InvalidBrFormat(String),
    #[error("The range ends ({end}) before it starts ({start})")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

//--------------------------------------     DateRange       ---------------------------------------------------------
/// An inclusive range of calendar days. A single day is a range where `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// The number of days in the range, counting both ends. Always at least 1.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Moves both ends of the range forward by `days`. Saturates at the last representable date.
    pub fn shift_forward(self, days: u64) -> Self {
        let shift = |d: NaiveDate| d.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        Self { start: shift(self.start), end: shift(self.end) }
    }

    /// Parses a pair of `YYYY-MM-DD` strings.
    pub fn parse_iso(start: &str, end: &str) -> Result<Self, DateRangeError> {
        let start = parse_iso_day(start)?;
        let end = parse_iso_day(end)?;
        Self::new(start, end)
    }

    /// Parses the `DD/MM/YYYY` (single day) or `DD/MM/YYYY/DD/MM/YYYY` (range) formats used by the dashboard.
    pub fn parse_br(value: &str) -> Result<Self, DateRangeError> {
        let parts = value.trim().split('/').collect::<Vec<&str>>();
        let parse = |p: &[&str]| {
            NaiveDate::parse_from_str(&p.join("/"), BR_FORMAT)
                .map_err(|_| DateRangeError::InvalidBrFormat(value.to_string()))
        };
        match parts.len() {
            3 => parse(&parts).map(Self::single),
            6 => Self::new(parse(&parts[..3])?, parse(&parts[3..])?),
            _ => Err(DateRangeError::InvalidBrFormat(value.to_string())),
        }
    }
}

pub fn parse_iso_day(value: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT).map_err(|_| DateRangeError::InvalidIsoDate(value.to_string()))
}

/// Formats the range the way the sales feed expects it: `2024-01-05` for a single day, or `2024-01-05/2024-01-07`.
impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single_day() {
            write!(f, "{}", self.start.format(ISO_FORMAT))
        } else {
            write!(f, "{}/{}", self.start.format(ISO_FORMAT), self.end.format(ISO_FORMAT))
        }
    }
}

impl FromStr for DateRange {
    type Err = DateRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((start, end)) => Self::parse_iso(start, end),
            None => parse_iso_day(s).map(Self::single),
        }
    }
}
