//! Trip-based public transit routing.
//!
//! This module answers: "leaving from any of these stops at this time,
//! what are the best ways to reach any of those stops?"
//!
//! The search boards whole trips and follows precomputed trip-to-trip
//! transfers round by round, keeping only journeys that are better than
//! every other on arrival, transfers or departure.

mod config;
mod itinerary;
mod params;
mod pruning;
mod results;
mod search;
mod segment;

pub use config::RouterConfig;
pub use itinerary::{Itinerary, Leg};
pub use params::{Parameters, TripFilter, accept_all};
pub use pruning::PruningState;
pub use results::{Criteria, ResultLabel, ResultSet, rank_labels};
pub use search::{RouterError, TripBasedRouter};
pub use segment::{EnqueuedTripSegment, SegmentArena, SegmentId};
