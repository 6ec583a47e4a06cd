//! Pruning state shared by all iterations of one query.
//!
//! Two bounds cut the search down:
//!
//! - the best weighted arrival found so far; segments that cannot beat it
//!   are not expanded further;
//! - per trip, the first stop position already covered by an earlier
//!   boarding of that trip (or of an earlier trip of its pattern).
//!
//! Both only ever tighten. A profile sweep keeps them across its
//! iterations, which is what makes the sweep cheap.

use crate::domain::TripIdx;

/// Mutable bounds of one top-level query.
#[derive(Debug, Clone)]
pub struct PruningState {
    earliest_arrival_time: i64,
    trip_done_from_index: Vec<usize>,
}

impl PruningState {
    /// Fresh state for a catalogue of `trip_count` trips.
    pub fn new(trip_count: usize) -> Self {
        Self {
            earliest_arrival_time: i64::MAX,
            trip_done_from_index: vec![usize::MAX; trip_count],
        }
    }

    /// Best weighted arrival found so far.
    pub fn earliest_arrival_time(&self) -> i64 {
        self.earliest_arrival_time
    }

    /// True if `arrival` beats the best arrival so far.
    pub fn improves_arrival(&self, arrival: i64) -> bool {
        arrival < self.earliest_arrival_time
    }

    /// Record `arrival` if it beats the best so far. Returns whether it did.
    pub fn tighten_arrival(&mut self, arrival: i64) -> bool {
        if self.improves_arrival(arrival) {
            self.earliest_arrival_time = arrival;
            true
        } else {
            false
        }
    }

    /// First covered position of a trip, `None` for an unknown index.
    pub fn done_from(&self, trip: TripIdx) -> Option<usize> {
        self.trip_done_from_index.get(trip.0).copied()
    }

    /// Mark `trip` as covered from `done_from` on.
    ///
    /// Trips of a pattern are sorted by start time, so every later trip of
    /// the pattern (indices up to `end_idx_of_pattern`) is covered from the
    /// same position too. The walk stops at the first trip that is already
    /// covered at least that far.
    pub fn mark_as_done(&mut self, trip: TripIdx, end_idx_of_pattern: usize, done_from: usize) {
        let end = end_idx_of_pattern.min(self.trip_done_from_index.len());
        for previous in self.trip_done_from_index.iter_mut().take(end).skip(trip.0) {
            if done_from < *previous {
                *previous = done_from;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_unbounded() {
        let state = PruningState::new(3);
        assert_eq!(state.earliest_arrival_time(), i64::MAX);
        assert_eq!(state.done_from(TripIdx(2)), Some(usize::MAX));
        assert_eq!(state.done_from(TripIdx(3)), None);
    }

    #[test]
    fn arrival_bound_only_tightens() {
        let mut state = PruningState::new(0);
        assert!(state.tighten_arrival(500));
        assert!(!state.tighten_arrival(500));
        assert!(!state.tighten_arrival(600));
        assert!(state.tighten_arrival(400));
        assert_eq!(state.earliest_arrival_time(), 400);
    }

    #[test]
    fn marking_propagates_to_later_trips_of_pattern() {
        // One pattern of trips 0..4, another starting at 4
        let mut state = PruningState::new(6);
        state.mark_as_done(TripIdx(1), 4, 3);

        assert_eq!(state.done_from(TripIdx(0)), Some(usize::MAX));
        assert_eq!(state.done_from(TripIdx(1)), Some(3));
        assert_eq!(state.done_from(TripIdx(3)), Some(3));
        assert_eq!(state.done_from(TripIdx(4)), Some(usize::MAX));
    }

    #[test]
    fn marking_stops_at_tighter_trip() {
        let mut state = PruningState::new(4);
        state.mark_as_done(TripIdx(2), 4, 1);
        state.mark_as_done(TripIdx(0), 4, 2);

        assert_eq!(state.done_from(TripIdx(0)), Some(2));
        assert_eq!(state.done_from(TripIdx(1)), Some(2));
        assert_eq!(state.done_from(TripIdx(2)), Some(1));
        assert_eq!(state.done_from(TripIdx(3)), Some(1));
    }

    #[test]
    fn marking_never_loosens() {
        let mut state = PruningState::new(2);
        state.mark_as_done(TripIdx(0), 2, 1);
        state.mark_as_done(TripIdx(0), 2, 5);
        assert_eq!(state.done_from(TripIdx(0)), Some(1));
        assert_eq!(state.done_from(TripIdx(1)), Some(1));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Patterns of sizes 1..4 laid out back to back
    fn layout() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..4, 1..5)
    }

    proptest! {
        /// Done boundaries never increase, whatever the marking order
        #[test]
        fn done_boundary_is_monotonic(
            sizes in layout(),
            marks in prop::collection::vec((0usize..16, 0usize..8), 0..40),
        ) {
            let mut ends = Vec::new();
            for size in &sizes {
                let start = ends.len();
                ends.extend(std::iter::repeat_n(start + size, *size));
            }
            let trip_count = ends.len();
            let mut state = PruningState::new(trip_count);

            for (trip, position) in marks {
                let trip = trip % trip_count;
                let before: Vec<_> = (0..trip_count).map(|t| state.done_from(TripIdx(t))).collect();

                state.mark_as_done(TripIdx(trip), ends[trip], position);

                for (t, old) in before.into_iter().enumerate() {
                    let new = state.done_from(TripIdx(t));
                    prop_assert!(new <= old, "trip {} loosened from {:?} to {:?}", t, old, new);
                }
                prop_assert!(state.done_from(TripIdx(trip)).unwrap() <= position);
            }
        }

        /// Within a pattern, later trips are never covered less than earlier ones
        #[test]
        fn later_trips_covered_at_least_as_far(
            size in 1usize..8,
            marks in prop::collection::vec((0usize..8, 0usize..8), 0..20),
        ) {
            let mut state = PruningState::new(size);
            for (trip, position) in marks {
                state.mark_as_done(TripIdx(trip % size), size, position);
            }
            for t in 1..size {
                prop_assert!(state.done_from(TripIdx(t)) <= state.done_from(TripIdx(t - 1)));
            }
        }
    }
}
