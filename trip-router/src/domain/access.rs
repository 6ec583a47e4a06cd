//! Access and egress stations.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::FeedStopId;

/// A stop reachable from the origin (access) or reaching the destination
/// (egress), with the fixed time it takes to get there.
///
/// The delta is signed and in milliseconds. For access stations it is
/// added to the requested departure; for egress stations it is added to
/// the arrival at the stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopWithTimeDelta {
    pub stop: FeedStopId,
    pub zone: Tz,
    pub time_delta_millis: i64,
}

impl StopWithTimeDelta {
    pub fn new(stop: FeedStopId, zone: Tz, time_delta_millis: i64) -> Self {
        Self {
            stop,
            zone,
            time_delta_millis,
        }
    }

    /// The delta as a duration, if it fits in one.
    pub fn time_delta(&self) -> Option<Duration> {
        Duration::try_milliseconds(self.time_delta_millis)
    }

    /// Earliest local departure from this stop when leaving the origin at
    /// `departure`, or `None` if that is outside the representable range.
    pub fn local_departure(&self, departure: DateTime<Utc>) -> Option<DateTime<Tz>> {
        departure
            .with_timezone(&self.zone)
            .checked_add_signed(self.time_delta()?)
    }
}
