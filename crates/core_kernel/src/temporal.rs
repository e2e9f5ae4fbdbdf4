//! Settlement periods and timezone handling
//!
//! Payout generation runs over calendar-date ranges chosen by an admin in
//! local (IST) time. `SettlementPeriod` turns those dates into UTC instants
//! so bookings stored with UTC timestamps can be filtered consistently.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper with string serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// The marketplace's operating timezone
    pub fn india() -> Self {
        Self(chrono_tz::Asia::Kolkata)
    }

    /// First instant of `date` in this timezone, as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve(date.and_hms_opt(0, 0, 0).unwrap_or_default())
    }

    /// Last instant of `date` in this timezone, as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve(
            date.and_hms_nano_opt(23, 59, 59, 999_999_999)
                .unwrap_or_default(),
        )
    }

    fn resolve(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self.0.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            // DST gap: treat the wall-clock time as UTC offset-free
            LocalResult::None => Utc.from_utc_datetime(&local),
        }
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::india()
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
}

/// An inclusive range of calendar dates used for payout generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPeriod {
    start: NaiveDate,
    end: NaiveDate,
    timezone: Timezone,
}

impl SettlementPeriod {
    /// Creates a period in the marketplace timezone
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        Self::in_timezone(start, end, Timezone::default())
    }

    /// Creates a period interpreted in the given timezone
    pub fn in_timezone(
        start: NaiveDate,
        end: NaiveDate,
        timezone: Timezone,
    ) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end, timezone })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// First instant covered by the period (UTC)
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.timezone.start_of_day(self.start)
    }

    /// Last instant covered by the period (UTC)
    pub fn end_instant(&self) -> DateTime<Utc> {
        self.timezone.end_of_day(self.end)
    }

    /// Returns true if the instant falls inside the period, both ends inclusive
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start_instant() && instant <= self.end_instant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_rejects_reversed_dates() {
        let result = SettlementPeriod::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_single_day_period_is_valid() {
        assert!(SettlementPeriod::new(date(2024, 1, 1), date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn test_ist_boundaries() {
        let period = SettlementPeriod::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        // Midnight IST is 18:30 UTC the previous day
        assert_eq!(
            period.start_instant(),
            Utc.with_ymd_and_hms(2023, 12, 31, 18, 30, 0).unwrap()
        );
        assert!(period.contains(Utc.with_ymd_and_hms(2024, 1, 31, 18, 29, 0).unwrap()));
        assert!(!period.contains(Utc.with_ymd_and_hms(2024, 1, 31, 18, 30, 0).unwrap()));
    }
}
