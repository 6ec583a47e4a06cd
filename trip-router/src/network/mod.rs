//! The router's read-only collaborators.
//!
//! The search consumes a trip catalogue and a precomputed transfer table
//! through traits, so any storage can back them. In-memory implementations
//! and a JSON snapshot loader live here too.

mod catalogue;
mod snapshot;
mod transfers;

pub use catalogue::{
    Pattern, PatternBoardings, ScheduledTrip, Timetable, TimetableBuilder, TripCatalogue,
};
pub use snapshot::{Network, NetworkSnapshot, SnapshotError, TransferRecord};
pub use transfers::{TransferMap, TransferTable, TripTransfers};
