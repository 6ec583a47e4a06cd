//! Schedule time handling.
//!
//! Timetables give stop times as "HH:MM:SS" strings measured from the start
//! of the service day. Trips running past midnight keep counting, so hours
//! above 23 are valid ("25:10:00" is ten past one the next morning).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A scheduled time, in seconds since midnight of the service day.
///
/// May exceed one day for trips that run past midnight.
///
/// # Examples
///
/// ```
/// use trip_router::domain::ServiceTime;
///
/// let t = ServiceTime::parse("25:10:00").unwrap();
/// assert_eq!(t.seconds(), 25 * 3600 + 600);
/// assert_eq!(t.days(), 1);
/// assert_eq!(t.to_string(), "01:10:00+1");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Create a time from seconds since service-day midnight.
    pub fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Create a time from hours, minutes and seconds.
    ///
    /// Hours may exceed 23; minutes and seconds must be below 60.
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Result<Self, TimeError> {
        if minutes > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if seconds > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .map(Self)
            .ok_or_else(|| TimeError::new("hour out of range"))
    }

    /// Parse a time in "HH:MM:SS" (or "H:MM:SS") format.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_router::domain::ServiceTime;
    ///
    /// assert!(ServiceTime::parse("00:00:00").is_ok());
    /// assert!(ServiceTime::parse("8:05:00").is_ok());
    /// assert!(ServiceTime::parse("47:59:59").is_ok());
    ///
    /// assert!(ServiceTime::parse("08:05").is_err());
    /// assert!(ServiceTime::parse("08:60:00").is_err());
    /// assert!(ServiceTime::parse("ab:cd:ef").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || h.len() > 3 {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hours = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if m.len() != 2 {
            return Err(TimeError::new("invalid minute digits"));
        }
        let minutes = parse_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if sec.len() != 2 {
            return Err(TimeError::new("invalid second digits"));
        }
        let seconds = parse_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?;

        Self::from_hms(hours, minutes, seconds)
    }

    /// Returns the number of seconds since service-day midnight.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Returns how many midnights this time lies past the service day start.
    pub fn days(&self) -> u32 {
        self.0 / SECONDS_PER_DAY
    }

    /// Returns the wall-clock second of the day, ignoring the day overflow.
    pub fn second_of_day(&self) -> u32 {
        self.0 % SECONDS_PER_DAY
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({self})")
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sod = self.second_of_day();
        write!(f, "{:02}:{:02}:{:02}", sod / 3600, (sod / 60) % 60, sod % 60)?;
        if self.days() > 0 {
            write!(f, "+{}", self.days())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for ServiceTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ServiceTime> for String {
    fn from(value: ServiceTime) -> Self {
        // Round-trippable form: keep hours past 23 instead of the "+N" suffix.
        let s = value.seconds();
        format!("{:02}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60)
    }
}

/// Parse a run of ASCII digits into a u32.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: the string form parses back to the same time
        #[test]
        fn string_roundtrip(secs in 0u32..(3 * SECONDS_PER_DAY)) {
            let t = ServiceTime::from_seconds(secs);
            let parsed = ServiceTime::parse(&String::from(t)).unwrap();
            prop_assert_eq!(parsed, t);
        }

        /// Display never shows an hour above 23
        #[test]
        fn display_hour_in_range(secs in 0u32..(3 * SECONDS_PER_DAY)) {
            let shown = ServiceTime::from_seconds(secs).to_string();
            let hour: u32 = shown[0..2].parse().unwrap();
            prop_assert!(hour < 24);
        }
    }
}
