//! Date handling for date-partitioned datasets.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar date format used by query strings and the imagery service.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DateParseError::InvalidFormat(s.to_string()))
}

/// Half-open date filter window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The one-calendar-day window starting at `date`. `None` when the
    /// following day is not representable.
    pub fn single_day(date: NaiveDate) -> Option<Self> {
        let end = date.checked_add_signed(Duration::days(1))?;
        Some(Self { start: date, end })
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DateParseError {
    #[error("Invalid date: {0}. Expected 'YYYY-MM-DD'")]
    InvalidFormat(String),
}
