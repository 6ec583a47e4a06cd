//! Search tree of boarded trip segments.
//!
//! Every boarding the search makes becomes an `EnqueuedTripSegment`. A
//! segment points at the segment it transferred from, so each one is the
//! tip of a chain that leads back to an access-station boarding. Segments
//! live in an arena and refer to their parent by `SegmentId`.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{StopWithTimeDelta, TripAtStopTime, TripIdx};

/// Handle of a segment in a `SegmentArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(usize);

/// One boarded trip, ridden from `trip_at_stop_time` up to (excluding)
/// `to_stop_sequence`.
#[derive(Debug, Clone)]
pub struct EnqueuedTripSegment {
    pub trip_at_stop_time: TripAtStopTime,
    /// Positions from here on were already covered when this was enqueued.
    pub to_stop_sequence: usize,
    pub service_day: NaiveDate,
    /// Where the previous trip was left; `None` for access boardings.
    pub transfer_origin: Option<TripAtStopTime>,
    pub parent: Option<SegmentId>,
    pub access_station: Arc<StopWithTimeDelta>,
    pub n_real_transfers: usize,
}

impl EnqueuedTripSegment {
    pub fn trip_idx(&self) -> TripIdx {
        self.trip_at_stop_time.trip_idx
    }
}

/// Append-only storage for segments.
#[derive(Debug, Default)]
pub struct SegmentArena {
    segments: Vec<EnqueuedTripSegment>,
}

impl SegmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a segment and return its handle.
    pub fn push(&mut self, segment: EnqueuedTripSegment) -> SegmentId {
        self.segments.push(segment);
        SegmentId(self.segments.len() - 1)
    }

    /// Get a segment.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different, smaller arena. Use
    /// `try_get` for handles that may come from elsewhere.
    pub fn get(&self, id: SegmentId) -> &EnqueuedTripSegment {
        &self.segments[id.0]
    }

    /// Get a segment, or `None` if this arena never issued `id`.
    pub fn try_get(&self, id: SegmentId) -> Option<&EnqueuedTripSegment> {
        self.segments.get(id.0)
    }

    /// Walk from `id` back to the access boarding.
    pub fn chain(&self, id: SegmentId) -> Chain<'_> {
        Chain {
            arena: self,
            next: Some(id),
        }
    }

    /// The access boarding `id` descends from.
    pub fn root(&self, id: SegmentId) -> &EnqueuedTripSegment {
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            current = parent;
        }
        self.get(current)
    }

    /// Like `root`, but `None` if this arena never issued `id`.
    ///
    /// Parents are pushed before their children, so a known tip always has
    /// a known root.
    pub fn try_root(&self, id: SegmentId) -> Option<&EnqueuedTripSegment> {
        self.try_get(id)?;
        Some(self.root(id))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Iterator from a segment to its root, tip first.
pub struct Chain<'a> {
    arena: &'a SegmentArena,
    next: Option<SegmentId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a EnqueuedTripSegment;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let segment = self.arena.get(id);
        self.next = segment.parent;
        Some(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeedStopId;

    fn segment(trip: usize, parent: Option<SegmentId>) -> EnqueuedTripSegment {
        EnqueuedTripSegment {
            trip_at_stop_time: TripAtStopTime::new(TripIdx(trip), 0),
            to_stop_sequence: usize::MAX,
            service_day: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            transfer_origin: parent.map(|_| TripAtStopTime::new(TripIdx(trip - 1), 1)),
            parent,
            access_station: Arc::new(StopWithTimeDelta::new(
                FeedStopId::new("f", "A").unwrap(),
                chrono_tz::UTC,
                0,
            )),
            n_real_transfers: 0,
        }
    }

    #[test]
    fn chain_walks_to_root() {
        let mut arena = SegmentArena::new();
        let a = arena.push(segment(1, None));
        let b = arena.push(segment(2, Some(a)));
        let c = arena.push(segment(3, Some(b)));

        let trips: Vec<usize> = arena.chain(c).map(|s| s.trip_idx().0).collect();
        assert_eq!(trips, vec![3, 2, 1]);
        assert_eq!(arena.root(c).trip_idx(), TripIdx(1));
        assert_eq!(arena.root(a).trip_idx(), TripIdx(1));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn empty_arena() {
        let arena = SegmentArena::new();
        assert!(arena.is_empty());
    }

    #[test]
    fn handles_from_another_arena_are_unknown() {
        let mut larger = SegmentArena::new();
        let a = larger.push(segment(1, None));
        let b = larger.push(segment(2, Some(a)));

        let mut smaller = SegmentArena::new();
        smaller.push(segment(1, None));

        assert!(smaller.try_get(a).is_some());
        assert!(smaller.try_get(b).is_none());
        assert!(smaller.try_root(b).is_none());
        assert_eq!(larger.try_root(b).map(|s| s.trip_idx()), Some(TripIdx(1)));
    }
}
