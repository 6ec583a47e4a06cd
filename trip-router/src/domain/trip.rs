//! Scheduled trip types.
//!
//! A `Trip` is one scheduled vehicle run with its ordered stop times. Trips
//! are grouped into patterns (identical stop sequences) and numbered so that
//! the trips of one pattern occupy a contiguous index range, sorted by
//! start time.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ServiceCalendar, ServiceTime};

/// Dense index of a trip in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripIdx(pub usize);

impl fmt::Display for TripIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a pattern (a group of trips with the same stop sequence).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternId(pub String);

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A specific stop visit of a specific trip.
///
/// `stop_sequence` is the zero-based position in the trip's stop times.
///
/// # Examples
///
/// ```
/// use trip_router::domain::{TripAtStopTime, TripIdx};
///
/// let a = TripAtStopTime::new(TripIdx(4), 1);
/// let b = TripAtStopTime::new(TripIdx(4), 3);
/// assert!(a < b);
/// assert_eq!(a.to_string(), "4@1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripAtStopTime {
    pub trip_idx: TripIdx,
    pub stop_sequence: usize,
}

impl TripAtStopTime {
    pub fn new(trip_idx: TripIdx, stop_sequence: usize) -> Self {
        Self {
            trip_idx,
            stop_sequence,
        }
    }
}

impl fmt::Display for TripAtStopTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.trip_idx, self.stop_sequence)
    }
}

/// A scheduled stop of a trip. The stop id is local to the trip's feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTime {
    pub stop_id: String,
    pub arrival_time: ServiceTime,
    pub departure_time: ServiceTime,
}

impl StopTime {
    pub fn new(stop_id: impl Into<String>, arrival_time: ServiceTime, departure_time: ServiceTime) -> Self {
        Self {
            stop_id: stop_id.into(),
            arrival_time,
            departure_time,
        }
    }
}

/// A trip as stored in the catalogue.
///
/// # Invariants
///
/// - `stop_times` has at least two entries
/// - `idx < end_idx_of_pattern`, and every index in between belongs to a
///   trip of the same pattern that starts no earlier than this one
#[derive(Debug, Clone)]
pub struct Trip {
    pub idx: TripIdx,
    pub end_idx_of_pattern: usize,
    pub pattern_id: PatternId,
    pub feed_id: String,
    pub trip_id: String,
    pub route_id: Option<String>,
    /// Vehicle block; trips sharing a block are run by the same vehicle.
    pub block_id: Option<String>,
    pub service: ServiceCalendar,
    pub stop_times: Vec<StopTime>,
}

impl Trip {
    /// Returns the stop time at `stop_sequence`, if in range.
    pub fn stop_time(&self, stop_sequence: usize) -> Option<&StopTime> {
        self.stop_times.get(stop_sequence)
    }

    /// Departure of the first stop.
    pub fn start_time(&self) -> Option<ServiceTime> {
        self.stop_times.first().map(|st| st.departure_time)
    }

    /// True if both trips are run by the same vehicle.
    ///
    /// A missing block id never matches, not even another missing one.
    pub fn shares_block_with(&self, other: &Trip) -> bool {
        match (&self.block_id, &other.block_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(block_id: Option<&str>) -> Trip {
        Trip {
            idx: TripIdx(0),
            end_idx_of_pattern: 1,
            pattern_id: PatternId("p".into()),
            feed_id: "f".into(),
            trip_id: "t".into(),
            route_id: None,
            block_id: block_id.map(str::to_string),
            service: ServiceCalendar::default(),
            stop_times: vec![
                StopTime::new("A", ServiceTime::from_seconds(0), ServiceTime::from_seconds(10)),
                StopTime::new("B", ServiceTime::from_seconds(100), ServiceTime::from_seconds(100)),
            ],
        }
    }

    #[test]
    fn block_sharing() {
        assert!(trip(Some("b1")).shares_block_with(&trip(Some("b1"))));
        assert!(!trip(Some("b1")).shares_block_with(&trip(Some("b2"))));
        assert!(!trip(Some("b1")).shares_block_with(&trip(None)));
        assert!(!trip(None).shares_block_with(&trip(None)));
    }

    #[test]
    fn stop_time_lookup() {
        let t = trip(None);
        assert_eq!(t.stop_time(1).map(|st| st.stop_id.as_str()), Some("B"));
        assert!(t.stop_time(2).is_none());
        assert_eq!(t.start_time(), Some(ServiceTime::from_seconds(10)));
    }

    #[test]
    fn trip_positions_order_by_trip_then_sequence() {
        let mut positions = vec![
            TripAtStopTime::new(TripIdx(2), 0),
            TripAtStopTime::new(TripIdx(1), 5),
            TripAtStopTime::new(TripIdx(1), 2),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                TripAtStopTime::new(TripIdx(1), 2),
                TripAtStopTime::new(TripIdx(1), 5),
                TripAtStopTime::new(TripIdx(2), 0),
            ]
        );
    }
}
