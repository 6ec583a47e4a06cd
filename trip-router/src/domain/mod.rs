//! Domain types for the transit router.
//!
//! This module contains the value types that describe scheduled service:
//! stops, times, calendars and trips. Types validate their invariants at
//! construction, so the search can trust them.

mod access;
mod calendar;
mod error;
mod stop;
mod time;
mod trip;

pub use access::StopWithTimeDelta;
pub use calendar::{ServiceCalendar, WeekdayMask};
pub use error::DomainError;
pub use stop::{FeedStopId, InvalidStopId};
pub use time::{SECONDS_PER_DAY, ServiceTime, TimeError};
pub use trip::{PatternId, StopTime, Trip, TripAtStopTime, TripIdx};
