//! Itineraries reconstructed from result labels.
//!
//! A label only points at the last segment of its journey. Walking the
//! parent chain back to the access boarding yields the legs in reverse.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{FeedStopId, ServiceTime, StopWithTimeDelta, Trip, TripAtStopTime};
use crate::network::TripCatalogue;

use super::results::ResultLabel;
use super::search::RouterError;
use super::segment::SegmentArena;

/// One ride on one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leg {
    pub trip_id: String,
    pub route_id: Option<String>,
    pub block_id: Option<String>,
    pub board_position: usize,
    pub board_stop: FeedStopId,
    pub departure_time: ServiceTime,
    pub alight_position: usize,
    pub alight_stop: FeedStopId,
    pub arrival_time: ServiceTime,
    /// True if this leg continues the previous one on the same vehicle.
    pub stays_on_vehicle: bool,
}

/// A complete journey from an access station to an egress station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    pub access: StopWithTimeDelta,
    pub egress: StopWithTimeDelta,
    pub service_day: NaiveDate,
    pub legs: Vec<Leg>,
    pub departure_time: ServiceTime,
    pub arrival_time: ServiceTime,
    pub weighted_arrival_time: i64,
    pub real_transfers: usize,
    pub round: usize,
}

impl Itinerary {
    /// Number of trips ridden, stays on the same vehicle included.
    pub fn boardings(&self) -> usize {
        self.legs.len()
    }
}

pub(super) fn reconstruct<C: TripCatalogue>(
    catalogue: &C,
    arena: &SegmentArena,
    label: &ResultLabel,
) -> Result<Itinerary, RouterError> {
    let root = arena
        .try_root(label.segment())
        .ok_or(RouterError::ForeignLabel)?;

    let mut legs = Vec::new();
    let mut alight = label.alight();
    let mut previous_trip: Option<&Trip> = None;
    let mut stays = Vec::new();

    for segment in arena.chain(label.segment()) {
        let board = segment.trip_at_stop_time;
        let trip = trip_of(catalogue, board)?;
        legs.push(leg(trip, board, alight)?);

        // Whether the leg after this one stayed on this vehicle
        if let Some(next) = previous_trip {
            stays.push(next.shares_block_with(trip));
        }
        previous_trip = Some(trip);

        if let Some(origin) = segment.transfer_origin {
            alight = origin;
        }
    }

    legs.reverse();
    stays.reverse();
    for (leg, stays_on_vehicle) in legs.iter_mut().skip(1).zip(stays) {
        leg.stays_on_vehicle = stays_on_vehicle;
    }

    let (departure_time, arrival_time) = match (legs.first(), legs.last()) {
        (Some(first), Some(last)) => (first.departure_time, last.arrival_time),
        _ => return Err(RouterError::UnknownTrip(label.trip_idx())),
    };

    Ok(Itinerary {
        access: root.access_station.as_ref().clone(),
        egress: label.egress().clone(),
        service_day: root.service_day,
        departure_time,
        arrival_time,
        legs,
        weighted_arrival_time: label.arrival_time(),
        real_transfers: label.real_transfers(),
        round: label.round(),
    })
}

fn trip_of<C: TripCatalogue>(catalogue: &C, at: TripAtStopTime) -> Result<&Trip, RouterError> {
    catalogue
        .trip(at.trip_idx)
        .ok_or(RouterError::UnknownTrip(at.trip_idx))
}

fn leg(trip: &Trip, board: TripAtStopTime, alight: TripAtStopTime) -> Result<Leg, RouterError> {
    let board_time = trip
        .stop_time(board.stop_sequence)
        .ok_or(RouterError::UnknownStopPosition(board))?;
    let alight_time = trip
        .stop_time(alight.stop_sequence)
        .ok_or(RouterError::UnknownStopPosition(alight))?;
    let stop = |stop_id: &str| {
        FeedStopId::new(trip.feed_id.as_str(), stop_id)
            .map_err(|_| RouterError::UnknownStopPosition(board))
    };

    Ok(Leg {
        trip_id: trip.trip_id.clone(),
        route_id: trip.route_id.clone(),
        block_id: trip.block_id.clone(),
        board_position: board.stop_sequence,
        board_stop: stop(&board_time.stop_id)?,
        departure_time: board_time.departure_time,
        alight_position: alight.stop_sequence,
        alight_stop: stop(&alight_time.stop_id)?,
        arrival_time: alight_time.arrival_time,
        stays_on_vehicle: false,
    })
}
