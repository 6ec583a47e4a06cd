//! Trip-based public transit router.
//!
//! A library that answers: "leaving from these stops within this time
//! window, what are the fastest journeys to those stops, and how many
//! changes do they take?"

pub mod domain;
pub mod network;
pub mod query;
pub mod router;
