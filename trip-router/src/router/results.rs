//! Result labels and the dominance-pruned result set.

use std::cmp::Ordering;
use std::fmt;

use crate::domain::{ServiceTime, StopWithTimeDelta, TripAtStopTime, TripIdx};

use super::segment::SegmentId;

/// The values results are compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Criteria {
    /// Weighted arrival at the destination, in seconds of the service day.
    pub arrival_time: i64,
    /// Vehicle changes, not counting stays on a block.
    pub real_transfers: usize,
    /// Departure from the access stop, in seconds of the service day.
    pub departure_time: u32,
}

impl Criteria {
    /// True if `self` is at least as good as `other` on every criterion.
    ///
    /// Later departures are better.
    pub fn covers(&self, other: &Criteria) -> bool {
        self.arrival_time <= other.arrival_time
            && self.real_transfers <= other.real_transfers
            && self.departure_time >= other.departure_time
    }
}

/// One way of reaching an egress station.
#[derive(Debug, Clone)]
pub struct ResultLabel {
    round: usize,
    egress: StopWithTimeDelta,
    alight: TripAtStopTime,
    /// Scheduled arrival at the alighting stop, without any weighting.
    scheduled_arrival: ServiceTime,
    segment: SegmentId,
    criteria: Criteria,
}

impl ResultLabel {
    pub(crate) fn new(
        round: usize,
        egress: StopWithTimeDelta,
        alight: TripAtStopTime,
        scheduled_arrival: ServiceTime,
        segment: SegmentId,
        criteria: Criteria,
    ) -> Self {
        Self {
            round,
            egress,
            alight,
            scheduled_arrival,
            segment,
            criteria,
        }
    }

    /// Round the label was found in; equals the number of boardings minus one.
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn egress(&self) -> &StopWithTimeDelta {
        &self.egress
    }

    /// Trip the journey arrives on.
    pub fn trip_idx(&self) -> TripIdx {
        self.alight.trip_idx
    }

    /// Position the journey leaves its last trip at.
    pub fn stop_sequence(&self) -> usize {
        self.alight.stop_sequence
    }

    pub fn alight(&self) -> TripAtStopTime {
        self.alight
    }

    pub fn scheduled_arrival(&self) -> ServiceTime {
        self.scheduled_arrival
    }

    pub fn segment(&self) -> SegmentId {
        self.segment
    }

    pub fn criteria(&self) -> Criteria {
        self.criteria
    }

    pub fn arrival_time(&self) -> i64 {
        self.criteria.arrival_time
    }

    pub fn real_transfers(&self) -> usize {
        self.criteria.real_transfers
    }

    pub fn departure_time(&self) -> u32 {
        self.criteria.departure_time
    }
}

/// Scheduled arrival at the alighting stop, as `HH:MM:SS+days stop`.
impl fmt::Display for ResultLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.scheduled_arrival.days();
        let secs = self.scheduled_arrival.second_of_day();
        write!(
            f,
            "{:02}:{:02}:{:02}+{} {}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60,
            days,
            self.egress.stop.stop_id()
        )
    }
}

/// Labels that survived dominance pruning, in insertion order.
#[derive(Debug, Default)]
pub struct ResultSet {
    labels: Vec<ResultLabel>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, removing every incumbent it covers.
    ///
    /// The new label is always kept. Callers only insert labels whose
    /// arrival beats every label already present, which keeps the set free
    /// of dominated labels.
    pub fn insert(&mut self, label: ResultLabel) {
        let new = label.criteria;
        self.labels.retain(|existing| !new.covers(&existing.criteria));
        self.labels.push(label);
    }

    pub fn labels(&self) -> &[ResultLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Order labels for presentation.
///
/// Labels are ranked by:
/// 1. Weighted arrival (earlier is better)
/// 2. Real transfers (fewer is better)
/// 3. Departure (later is better)
pub fn rank_labels(labels: &[ResultLabel]) -> Vec<ResultLabel> {
    let mut ranked = labels.to_vec();
    ranked.sort_by(|a, b| {
        let arr_cmp = a.arrival_time().cmp(&b.arrival_time());
        if arr_cmp != Ordering::Equal {
            return arr_cmp;
        }

        let transfers_cmp = a.real_transfers().cmp(&b.real_transfers());
        if transfers_cmp != Ordering::Equal {
            return transfers_cmp;
        }

        b.departure_time().cmp(&a.departure_time())
    });
    ranked
}
