use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;
use time::{Date as TimeDate, Month, OffsetDateTime, format_description::well_known::Rfc3339};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_DAY: i64 = 86_400_000;
const NANOS_PER_MILLI: i128 = 1_000_000;

///
/// TemporalError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TemporalError {
    #[error("temporal value out of range: {0}")]
    OutOfRange(String),

    #[error("invalid temporal literal '{0}'")]
    InvalidFormat(String),
}

///
/// Date
///
/// Calendar date without a time-of-day. Serialized as the unix millis of its
/// UTC midnight, so any instant inside a day truncates to the same `Date`.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Date(TimeDate);

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, TemporalError> {
        let month = Month::try_from(month)
            .map_err(|_| TemporalError::OutOfRange(format!("month {month}")))?;
        let date = TimeDate::from_calendar_date(year, month, day)
            .map_err(|err| TemporalError::OutOfRange(err.to_string()))?;

        Ok(Self(date))
    }

    /// Truncate any unix-millis instant to its UTC calendar date.
    pub fn from_millis(millis: i64) -> Result<Self, TemporalError> {
        let days = millis.div_euclid(MILLIS_PER_DAY);
        let seconds = days
            .checked_mul(MILLIS_PER_DAY / MILLIS_PER_SECOND)
            .ok_or_else(|| TemporalError::OutOfRange(format!("{millis} ms")))?;
        let instant = OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|err| TemporalError::OutOfRange(err.to_string()))?;

        Ok(Self(instant.date()))
    }

    /// Unix millis of this date's UTC midnight.
    #[must_use]
    pub fn to_millis(self) -> i64 {
        self.0.midnight().assume_utc().unix_timestamp() * MILLIS_PER_SECOND
    }

    /// Parse an ISO `YYYY-MM-DD` literal.
    pub fn parse(text: &str) -> Result<Self, TemporalError> {
        let invalid = || TemporalError::InvalidFormat(text.to_string());
        let raw = text.trim();

        // A leading '-' belongs to the year, not to a separator.
        let (sign, body) = match raw.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, raw),
        };

        let mut parts = body.splitn(3, '-');
        let year = parts.next().ok_or_else(invalid)?;
        let month = parts.next().ok_or_else(invalid)?;
        let day = parts.next().ok_or_else(invalid)?;

        let year = year.parse::<i32>().map_err(|_| invalid())? * sign;
        let month = month.parse::<u8>().map_err(|_| invalid())?;
        let day = day.parse::<u8>().map_err(|_| invalid())?;

        Self::new(year, month, day)
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub const fn month(self) -> u8 {
        self.0.month() as u8
    }

    #[must_use]
    pub const fn day(self) -> u8 {
        self.0.day()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

///
/// DateTime
///
/// Instant with millisecond precision, stored as unix millis.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct DateTime(i64);

impl DateTime {
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn millis(self) -> i64 {
        self.0
    }

    /// Truncate an `OffsetDateTime` to millisecond precision.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_offset(instant: OffsetDateTime) -> Self {
        Self(instant.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI) as i64)
    }

    pub fn to_offset(self) -> Result<OffsetDateTime, TemporalError> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * NANOS_PER_MILLI)
            .map_err(|err| TemporalError::OutOfRange(err.to_string()))
    }

    /// Parse either a unix-millis integer or an RFC 3339 timestamp.
    pub fn parse(text: &str) -> Result<Self, TemporalError> {
        let raw = text.trim();
        if let Ok(millis) = raw.parse::<i64>() {
            return Ok(Self(millis));
        }

        OffsetDateTime::parse(raw, &Rfc3339)
            .map(Self::from_offset)
            .map_err(|_| TemporalError::InvalidFormat(raw.to_string()))
    }

    /// Calendar date (UTC) containing this instant.
    pub fn date(self) -> Result<Date, TemporalError> {
        Date::from_millis(self.0)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_offset().ok().and_then(|at| at.format(&Rfc3339).ok()) {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}ms", self.0),
        }
    }
}

///
/// TESTS
///
