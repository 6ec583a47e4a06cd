//! Service calendars.
//!
//! A calendar says on which service days a trip runs: a weekly pattern over
//! a date range, adjusted by explicit added and removed dates.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Days of the week a calendar runs on, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeekdayMask(pub [bool; 7]);

impl WeekdayMask {
    /// Every day of the week.
    pub const ALL: WeekdayMask = WeekdayMask([true; 7]);

    /// Monday to Friday.
    pub const WEEKDAYS: WeekdayMask = WeekdayMask([true, true, true, true, true, false, false]);

    /// True if the mask includes `day`.
    pub fn contains(&self, day: Weekday) -> bool {
        self.0[day.num_days_from_monday() as usize]
    }
}

/// Calendar validity of a trip.
///
/// # Examples
///
/// ```
/// use trip_router::domain::{ServiceCalendar, WeekdayMask};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
/// let calendar = ServiceCalendar::weekly(WeekdayMask::WEEKDAYS, start, end);
///
/// // Friday 15 March 2024
/// assert!(calendar.active_on(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
/// // Saturday 16 March 2024
/// assert!(!calendar.active_on(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceCalendar {
    /// Weekly pattern, only meaningful inside `[start_date, end_date]`.
    #[serde(default)]
    pub weekdays: WeekdayMask,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Extra running days, regardless of the weekly pattern.
    #[serde(default)]
    pub added: BTreeSet<NaiveDate>,
    /// Days the trip does not run, regardless of anything else.
    #[serde(default)]
    pub removed: BTreeSet<NaiveDate>,
}

impl ServiceCalendar {
    /// A calendar running on the given weekdays within an inclusive range.
    pub fn weekly(weekdays: WeekdayMask, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            weekdays,
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    /// A calendar running only on the listed dates.
    pub fn on_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            added: dates.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Adds a running day.
    pub fn with_added(mut self, date: NaiveDate) -> Self {
        self.removed.remove(&date);
        self.added.insert(date);
        self
    }

    /// Removes a running day.
    pub fn with_removed(mut self, date: NaiveDate) -> Self {
        self.added.remove(&date);
        self.removed.insert(date);
        self
    }

    /// True if the trip runs on `service_day`.
    pub fn active_on(&self, service_day: NaiveDate) -> bool {
        if self.removed.contains(&service_day) {
            return false;
        }
        if self.added.contains(&service_day) {
            return true;
        }
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return false;
        };
        start <= service_day && service_day <= end && self.weekdays.contains(service_day.weekday())
    }
}
