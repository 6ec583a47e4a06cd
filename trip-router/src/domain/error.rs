//! Domain error types.
//!
//! These errors represent validation failures while assembling the trip
//! catalogue and transfer table. They are distinct from query errors.

use super::{InvalidStopId, TimeError};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A trip needs at least a boarding and an alighting stop
    #[error("trip {0} has fewer than two stop times")]
    TooFewStopTimes(String),

    /// Stop times must not go backwards
    #[error("trip {trip_id} goes back in time at position {position}")]
    NonMonotonicStopTimes { trip_id: String, position: usize },

    /// Two trips in one feed share an id
    #[error("duplicate trip {feed_id}:{trip_id}")]
    DuplicateTrip { feed_id: String, trip_id: String },

    /// A transfer refers to a trip that is not in the catalogue
    #[error("unknown trip {feed_id}:{trip_id}")]
    UnknownTrip { feed_id: String, trip_id: String },

    /// A transfer refers to a position past the end of its trip
    #[error("trip {trip_id} has no stop at position {position}")]
    InvalidStopPosition { trip_id: String, position: usize },

    #[error(transparent)]
    InvalidStopId(#[from] InvalidStopId),

    #[error(transparent)]
    InvalidTime(#[from] TimeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::TooFewStopTimes("t1".into());
        assert_eq!(err.to_string(), "trip t1 has fewer than two stop times");

        let err = DomainError::NonMonotonicStopTimes {
            trip_id: "t1".into(),
            position: 2,
        };
        assert_eq!(err.to_string(), "trip t1 goes back in time at position 2");

        let err = DomainError::DuplicateTrip {
            feed_id: "f".into(),
            trip_id: "t1".into(),
        };
        assert_eq!(err.to_string(), "duplicate trip f:t1");

        let err = DomainError::InvalidStopPosition {
            trip_id: "t1".into(),
            position: 9,
        };
        assert_eq!(err.to_string(), "trip t1 has no stop at position 9");
    }
}
