//! Precomputed trip-to-trip transfers.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::TripAtStopTime;

/// Destinations reachable after alighting at each origin position.
pub type TransferMap = HashMap<TripAtStopTime, Vec<TripAtStopTime>>;

/// Read access to the transfer table.
///
/// Implementations must be immutable for the duration of a query.
pub trait TransferTable {
    /// Transfers valid on `service_day`, or `None` if none are known.
    fn trip_transfers(&self, service_day: NaiveDate) -> Option<&TransferMap>;

    /// Destinations reachable from `origin` on `service_day`.
    ///
    /// A missing day or origin means there is nowhere to transfer to.
    fn transfers_from(&self, service_day: NaiveDate, origin: TripAtStopTime) -> &[TripAtStopTime] {
        self.trip_transfers(service_day)
            .and_then(|map| map.get(&origin))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// In-memory transfer table, one map per service day.
#[derive(Debug, Clone, Default)]
pub struct TripTransfers {
    by_day: HashMap<NaiveDate, TransferMap>,
}

impl TripTransfers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `to` can be boarded after alighting at `from` on `service_day`.
    ///
    /// Duplicates are kept until `dedup` is called.
    pub fn add(&mut self, service_day: NaiveDate, from: TripAtStopTime, to: TripAtStopTime) {
        self.by_day
            .entry(service_day)
            .or_default()
            .entry(from)
            .or_default()
            .push(to);
    }

    /// Sort each origin's destinations and drop repeats.
    pub fn dedup(&mut self) {
        for destinations in self.by_day.values_mut().flat_map(|map| map.values_mut()) {
            destinations.sort_unstable();
            destinations.dedup();
        }
    }

    /// Total number of transfers across all days.
    pub fn len(&self) -> usize {
        self.by_day
            .values()
            .flat_map(|map| map.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransferTable for TripTransfers {
    fn trip_transfers(&self, service_day: NaiveDate) -> Option<&TransferMap> {
        self.by_day.get(&service_day)
    }
}
