//! Trip catalogue.
//!
//! The router reads trips and per-stop boarding lists through the
//! `TripCatalogue` trait. `Timetable` is the in-memory implementation: it
//! indexes already scheduled trips into patterns, it does not parse feeds.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Range;

use serde::Deserialize;

use crate::domain::{
    DomainError, FeedStopId, PatternId, ServiceCalendar, StopTime, Trip, TripAtStopTime, TripIdx,
};

/// Boarding lists of one stop, keyed by pattern.
///
/// Each list is sorted by departure time at the boarding position.
pub type PatternBoardings = BTreeMap<PatternId, Vec<TripAtStopTime>>;

/// Read access to scheduled trips.
///
/// Implementations must be immutable for the duration of a query.
pub trait TripCatalogue {
    /// Number of trips; valid indices are `0..trip_count()`.
    fn trip_count(&self) -> usize;

    /// Get a trip by index.
    fn trip(&self, idx: TripIdx) -> Option<&Trip>;

    /// Get the boarding lists at a stop, or `None` if no pattern serves it.
    fn pattern_boardings(&self, stop: &FeedStopId) -> Option<&PatternBoardings>;
}

/// A trip as handed to the builder, before it is indexed.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledTrip {
    pub feed_id: String,
    pub trip_id: String,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub block_id: Option<String>,
    pub service: ServiceCalendar,
    pub stop_times: Vec<StopTime>,
}

impl ScheduledTrip {
    pub fn new(
        feed_id: impl Into<String>,
        trip_id: impl Into<String>,
        service: ServiceCalendar,
        stop_times: Vec<StopTime>,
    ) -> Self {
        Self {
            feed_id: feed_id.into(),
            trip_id: trip_id.into(),
            route_id: None,
            block_id: None,
            service,
            stop_times,
        }
    }

    pub fn with_route(mut self, route_id: impl Into<String>) -> Self {
        self.route_id = Some(route_id.into());
        self
    }

    pub fn with_block(mut self, block_id: impl Into<String>) -> Self {
        self.block_id = Some(block_id.into());
        self
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.stop_times.len() < 2 {
            return Err(DomainError::TooFewStopTimes(self.trip_id.clone()));
        }
        for st in &self.stop_times {
            FeedStopId::new(self.feed_id.as_str(), st.stop_id.as_str())?;
        }
        for (position, st) in self.stop_times.iter().enumerate() {
            let previous_departure = position
                .checked_sub(1)
                .map(|p| self.stop_times[p].departure_time);
            if st.departure_time < st.arrival_time
                || previous_departure.is_some_and(|dep| st.arrival_time < dep)
            {
                return Err(DomainError::NonMonotonicStopTimes {
                    trip_id: self.trip_id.clone(),
                    position,
                });
            }
        }
        Ok(())
    }
}

/// A pattern and the index range of its trips.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub id: PatternId,
    pub feed_id: String,
    pub stop_ids: Vec<String>,
    pub trips: Range<usize>,
}

/// In-memory trip catalogue.
#[derive(Debug, Default)]
pub struct Timetable {
    trips: Vec<Trip>,
    patterns: Vec<Pattern>,
    boardings: HashMap<FeedStopId, PatternBoardings>,
    by_trip_id: HashMap<(String, String), TripIdx>,
}

impl Timetable {
    /// Start building a timetable.
    pub fn builder() -> TimetableBuilder {
        TimetableBuilder::default()
    }

    /// Look up a trip index by feed and trip id.
    pub fn trip_idx(&self, feed_id: &str, trip_id: &str) -> Option<TripIdx> {
        self.by_trip_id
            .get(&(feed_id.to_string(), trip_id.to_string()))
            .copied()
    }

    /// All patterns, in index order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// All trips, in index order.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }
}

impl TripCatalogue for Timetable {
    fn trip_count(&self) -> usize {
        self.trips.len()
    }

    fn trip(&self, idx: TripIdx) -> Option<&Trip> {
        self.trips.get(idx.0)
    }

    fn pattern_boardings(&self, stop: &FeedStopId) -> Option<&PatternBoardings> {
        self.boardings.get(stop)
    }
}

/// Builds a `Timetable` from scheduled trips.
///
/// Trips with the same feed and stop sequence form a pattern. Within a
/// pattern trips are ordered by first departure (then trip id) and given
/// contiguous indices.
#[derive(Debug, Default)]
pub struct TimetableBuilder {
    trips: Vec<ScheduledTrip>,
}

impl TimetableBuilder {
    /// Add a trip.
    pub fn add_trip(&mut self, trip: ScheduledTrip) -> &mut Self {
        self.trips.push(trip);
        self
    }

    /// Add several trips.
    pub fn add_trips(&mut self, trips: impl IntoIterator<Item = ScheduledTrip>) -> &mut Self {
        self.trips.extend(trips);
        self
    }

    /// Validate and index the trips.
    pub fn build(self) -> Result<Timetable, DomainError> {
        let mut seen = HashSet::new();
        for trip in &self.trips {
            trip.validate()?;
            if !seen.insert((trip.feed_id.as_str(), trip.trip_id.as_str())) {
                return Err(DomainError::DuplicateTrip {
                    feed_id: trip.feed_id.clone(),
                    trip_id: trip.trip_id.clone(),
                });
            }
        }

        // Group by (feed, stop sequence), keeping first-seen pattern order
        let mut pattern_of: HashMap<(String, Vec<String>), usize> = HashMap::new();
        let mut grouped: Vec<((String, Vec<String>), Vec<ScheduledTrip>)> = Vec::new();
        for trip in self.trips {
            let key = (
                trip.feed_id.clone(),
                trip.stop_times.iter().map(|st| st.stop_id.clone()).collect(),
            );
            let slot = *pattern_of.entry(key.clone()).or_insert_with(|| {
                grouped.push((key, Vec::new()));
                grouped.len() - 1
            });
            grouped[slot].1.push(trip);
        }

        let mut timetable = Timetable::default();
        for (n, ((feed_id, stop_ids), mut members)) in grouped.into_iter().enumerate() {
            members.sort_by(|a, b| {
                let a_key = (a.stop_times[0].departure_time, &a.trip_id);
                let b_key = (b.stop_times[0].departure_time, &b.trip_id);
                a_key.cmp(&b_key)
            });

            let pattern_id = PatternId(format!("{feed_id}:p{n}"));
            let start = timetable.trips.len();
            let end = start + members.len();

            for trip in members {
                let idx = TripIdx(timetable.trips.len());
                timetable
                    .by_trip_id
                    .insert((trip.feed_id.clone(), trip.trip_id.clone()), idx);
                timetable.trips.push(Trip {
                    idx,
                    end_idx_of_pattern: end,
                    pattern_id: pattern_id.clone(),
                    feed_id: trip.feed_id,
                    trip_id: trip.trip_id,
                    route_id: trip.route_id,
                    block_id: trip.block_id,
                    service: trip.service,
                    stop_times: trip.stop_times,
                });
            }

            timetable.patterns.push(Pattern {
                id: pattern_id,
                feed_id,
                stop_ids,
                trips: start..end,
            });
        }

        for trip in &timetable.trips {
            // No boarding at the last stop
            for position in 0..trip.stop_times.len() - 1 {
                let stop = FeedStopId::new(trip.feed_id.as_str(), trip.stop_times[position].stop_id.as_str())?;
                timetable
                    .boardings
                    .entry(stop)
                    .or_default()
                    .entry(trip.pattern_id.clone())
                    .or_default()
                    .push(TripAtStopTime::new(trip.idx, position));
            }
        }

        let trips = &timetable.trips;
        for lists in timetable.boardings.values_mut() {
            for boardings in lists.values_mut() {
                boardings.sort_by_key(|b| {
                    (trips[b.trip_idx.0].stop_times[b.stop_sequence].departure_time, b.trip_idx)
                });
            }
        }

        Ok(timetable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServiceTime;

    fn st(stop: &str, secs: u32) -> StopTime {
        StopTime::new(stop, ServiceTime::from_seconds(secs), ServiceTime::from_seconds(secs))
    }

    fn trip(id: &str, stops: &[(&str, u32)]) -> ScheduledTrip {
        ScheduledTrip::new(
            "f",
            id,
            ServiceCalendar::default(),
            stops.iter().map(|(s, t)| st(s, *t)).collect(),
        )
    }

    #[test]
    fn groups_trips_into_sorted_patterns() {
        let mut builder = Timetable::builder();
        builder.add_trips([
            trip("late", &[("A", 600), ("B", 700)]),
            trip("other", &[("A", 50), ("C", 100)]),
            trip("early", &[("A", 0), ("B", 100)]),
        ]);
        let timetable = builder.build().unwrap();

        assert_eq!(timetable.patterns().len(), 2);
        let ab = &timetable.patterns()[0];
        assert_eq!(ab.stop_ids, vec!["A", "B"]);
        assert_eq!(ab.trips, 0..2);

        let early = timetable.trip_idx("f", "early").unwrap();
        let late = timetable.trip_idx("f", "late").unwrap();
        assert_eq!(early, TripIdx(0));
        assert_eq!(late, TripIdx(1));
        assert_eq!(timetable.trip(late).unwrap().end_idx_of_pattern, 2);
        assert_eq!(timetable.trip(TripIdx(2)).unwrap().end_idx_of_pattern, 3);
    }

    #[test]
    fn boardings_exclude_last_stop_and_are_sorted() {
        let mut builder = Timetable::builder();
        builder.add_trips([
            trip("t2", &[("A", 300), ("B", 400)]),
            trip("t1", &[("A", 0), ("B", 100)]),
        ]);
        let timetable = builder.build().unwrap();

        let at_a = timetable
            .pattern_boardings(&FeedStopId::new("f", "A").unwrap())
            .unwrap();
        let list = at_a.values().next().unwrap();
        assert_eq!(
            list,
            &vec![
                TripAtStopTime::new(TripIdx(0), 0),
                TripAtStopTime::new(TripIdx(1), 0)
            ]
        );

        assert!(timetable
            .pattern_boardings(&FeedStopId::new("f", "B").unwrap())
            .is_none());
    }

    #[test]
    fn rejects_short_trip() {
        let mut builder = Timetable::builder();
        builder.add_trip(trip("t", &[("A", 0)]));
        assert_eq!(
            builder.build().unwrap_err(),
            DomainError::TooFewStopTimes("t".into())
        );
    }

    #[test]
    fn rejects_time_travel() {
        let mut builder = Timetable::builder();
        builder.add_trip(trip("t", &[("A", 100), ("B", 50)]));
        assert!(matches!(
            builder.build(),
            Err(DomainError::NonMonotonicStopTimes { position: 1, .. })
        ));
    }

    #[test]
    fn rejects_duplicates() {
        let mut builder = Timetable::builder();
        builder.add_trips([
            trip("t", &[("A", 0), ("B", 100)]),
            trip("t", &[("A", 10), ("B", 110)]),
        ]);
        assert!(matches!(
            builder.build(),
            Err(DomainError::DuplicateTrip { .. })
        ));
    }

    #[test]
    fn rejects_blank_stop_id() {
        let mut builder = Timetable::builder();
        builder.add_trip(trip("t", &[("A", 0), ("", 100)]));
        assert!(matches!(
            builder.build(),
            Err(DomainError::InvalidStopId(_))
        ));
    }

    #[test]
    fn empty_builder_gives_empty_timetable() {
        let timetable = Timetable::builder().build().unwrap();
        assert_eq!(timetable.trip_count(), 0);
        assert!(timetable.trip(TripIdx(0)).is_none());
    }
}
