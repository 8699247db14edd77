//! Time-of-day values and half-open ranges.
//!
//! Lessons are booked on a calendar day between two wall-clock times. The
//! wire format is a zero-padded 24-hour `"HH:MM"` string; internally the value
//! is minutes since midnight so comparisons never depend on string padding.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{StudioError, StudioResult};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time with minute precision, `00:00` through `23:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_hm(hour: u16, minute: u16) -> StudioResult<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(StudioError::Validation(format!(
                "{hour:02}:{minute:02} is not a valid time of day"
            )));
        }
        Ok(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // Always in range: the constructor bounds the value below 24:00.
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Seconds are truncated.
    fn from(time: NaiveTime) -> Self {
        let minutes = time.hour() * 60 + time.minute();
        Self((minutes as u16).min(MINUTES_PER_DAY - 1))
    }
}

impl FromStr for TimeOfDay {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StudioError::Validation(format!("'{s}' is not a valid HH:MM time"));
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let hour: u16 = s[..2].parse().map_err(|_| invalid())?;
        let minute: u16 = s[3..].parse().map_err(|_| invalid())?;
        if !s[..2].bytes().chain(s[3..].bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Half-open interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeRange {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> StudioResult<Self> {
        if start >= end {
            return Err(StudioError::Validation(format!(
                "start time {start} must be before end time {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn duration_minutes(&self) -> i32 {
        i32::from(self.end.minutes()) - i32::from(self.start.minutes())
    }

    /// Back-to-back ranges (one ending where the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
