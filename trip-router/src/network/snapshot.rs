//! JSON network snapshots.
//!
//! A snapshot bundles scheduled trips with their precomputed transfers so
//! a network can be loaded from disk in one go. Transfers name trips by id;
//! they are resolved to indices once the timetable is built.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use super::catalogue::{ScheduledTrip, Timetable, TripCatalogue};
use super::transfers::TripTransfers;
use crate::domain::{DomainError, TripAtStopTime, TripIdx};

/// Errors loading a snapshot from disk.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Reading the file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid snapshot
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot content is inconsistent
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One transfer between two trips, by trip id.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRecord {
    pub service_day: NaiveDate,
    pub feed_id: String,
    pub from_trip_id: String,
    pub from_stop_sequence: usize,
    /// Feed of the destination trip; defaults to `feed_id`.
    #[serde(default)]
    pub to_feed_id: Option<String>,
    pub to_trip_id: String,
    pub to_stop_sequence: usize,
}

/// Serialized form of a network.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSnapshot {
    pub trips: Vec<ScheduledTrip>,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
}

/// A loaded network, ready to route on.
#[derive(Debug)]
pub struct Network {
    pub timetable: Timetable,
    pub transfers: TripTransfers,
}

impl NetworkSnapshot {
    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a snapshot file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Index the trips and resolve the transfers.
    pub fn build(self) -> Result<Network, DomainError> {
        let mut builder = Timetable::builder();
        builder.add_trips(self.trips);
        let timetable = builder.build()?;

        let mut transfers = TripTransfers::new();
        for record in self.transfers {
            let to_feed = record.to_feed_id.as_deref().unwrap_or(record.feed_id.as_str());
            let from = resolve(&timetable, &record.feed_id, &record.from_trip_id, record.from_stop_sequence)?;
            let to = resolve(&timetable, to_feed, &record.to_trip_id, record.to_stop_sequence)?;
            transfers.add(record.service_day, from, to);
        }
        transfers.dedup();

        Ok(Network {
            timetable,
            transfers,
        })
    }
}

fn resolve(
    timetable: &Timetable,
    feed_id: &str,
    trip_id: &str,
    position: usize,
) -> Result<TripAtStopTime, DomainError> {
    let idx: TripIdx = timetable
        .trip_idx(feed_id, trip_id)
        .ok_or_else(|| DomainError::UnknownTrip {
            feed_id: feed_id.to_string(),
            trip_id: trip_id.to_string(),
        })?;
    let in_range = timetable
        .trip(idx)
        .is_some_and(|trip| position < trip.stop_times.len());
    if !in_range {
        return Err(DomainError::InvalidStopPosition {
            trip_id: trip_id.to_string(),
            position,
        });
    }
    Ok(TripAtStopTime::new(idx, position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::TransferTable;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "trips": [
            {
                "feed_id": "f",
                "trip_id": "t1",
                "block_id": "b1",
                "service": { "added": ["2024-03-15"] },
                "stop_times": [
                    { "stop_id": "A", "arrival_time": "08:00:00", "departure_time": "08:00:00" },
                    { "stop_id": "B", "arrival_time": "08:10:00", "departure_time": "08:10:00" }
                ]
            },
            {
                "feed_id": "f",
                "trip_id": "t2",
                "service": { "added": ["2024-03-15"] },
                "stop_times": [
                    { "stop_id": "B", "arrival_time": "08:15:00", "departure_time": "08:15:00" },
                    { "stop_id": "C", "arrival_time": "08:30:00", "departure_time": "08:30:00" }
                ]
            }
        ],
        "transfers": [
            {
                "service_day": "2024-03-15",
                "feed_id": "f",
                "from_trip_id": "t1",
                "from_stop_sequence": 1,
                "to_trip_id": "t2",
                "to_stop_sequence": 0
            }
        ]
    }"#;

    #[test]
    fn builds_network_from_json() {
        let network = NetworkSnapshot::from_json(SNAPSHOT).unwrap().build().unwrap();
        let t1 = network.timetable.trip_idx("f", "t1").unwrap();
        let t2 = network.timetable.trip_idx("f", "t2").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        assert_eq!(
            network.transfers.transfers_from(day, TripAtStopTime::new(t1, 1)),
            &[TripAtStopTime::new(t2, 0)]
        );
        assert_eq!(
            network.timetable.trip(t1).unwrap().block_id.as_deref(),
            Some("b1")
        );
    }

    #[test]
    fn repeated_transfer_records_are_merged() {
        let mut snapshot = NetworkSnapshot::from_json(SNAPSHOT).unwrap();
        let repeat = snapshot.transfers[0].clone();
        snapshot.transfers.push(repeat);

        let network = snapshot.build().unwrap();
        assert_eq!(network.transfers.len(), 1);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let snapshot = NetworkSnapshot::from_path(file.path()).unwrap();
        assert_eq!(snapshot.trips.len(), 2);
        assert_eq!(snapshot.transfers.len(), 1);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = NetworkSnapshot::from_path(&path).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn unknown_transfer_trip_is_rejected() {
        let mut snapshot = NetworkSnapshot::from_json(SNAPSHOT).unwrap();
        snapshot.transfers[0].to_trip_id = "nope".into();
        assert!(matches!(
            snapshot.build(),
            Err(DomainError::UnknownTrip { .. })
        ));
    }

    #[test]
    fn out_of_range_transfer_position_is_rejected() {
        let mut snapshot = NetworkSnapshot::from_json(SNAPSHOT).unwrap();
        snapshot.transfers[0].from_stop_sequence = 5;
        assert!(matches!(
            snapshot.build(),
            Err(DomainError::InvalidStopPosition { position: 5, .. })
        ));
    }

    #[test]
    fn bad_json_is_a_json_error() {
        assert!(matches!(
            NetworkSnapshot::from_json("{"),
            Err(SnapshotError::Json(_))
        ));
    }
}
