//! Trip-based earliest-arrival search.
//!
//! The search works on trips rather than stops. Boarding a trip enqueues a
//! segment covering the rest of it; each round alights from every queued
//! segment at every stop, follows the precomputed transfers from there and
//! enqueues the trips it reaches. Segments only cover stops not already
//! covered by an earlier boarding of the same trip, so each round does
//! strictly new work.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use tracing::{debug, trace};

use crate::domain::{StopTime, StopWithTimeDelta, Trip, TripAtStopTime, TripIdx};
use crate::network::{TransferTable, TripCatalogue};

use super::config::RouterConfig;
use super::itinerary::{Itinerary, reconstruct};
use super::params::{Parameters, TripFilter};
use super::pruning::PruningState;
use super::results::{Criteria, ResultLabel, ResultSet, rank_labels};
use super::segment::{EnqueuedTripSegment, SegmentArena, SegmentId};

/// Error from a routing query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The query cannot be answered as asked
    #[error("invalid routing request: {0}")]
    InvalidRequest(String),

    /// A trip index the catalogue does not know
    #[error("trip {0} is not in the catalogue")]
    UnknownTrip(TripIdx),

    /// A stop position past the end of its trip
    #[error("trip position {0} does not exist")]
    UnknownStopPosition(TripAtStopTime),

    /// A result label handed to a router that did not produce it
    #[error("result label does not belong to this router")]
    ForeignLabel,
}

/// How a segment was reached.
enum Origin {
    /// Boarded at an access station.
    Access {
        station: Arc<StopWithTimeDelta>,
        service_day: NaiveDate,
    },
    /// Transferred to from `from`, the alighting position of `parent`.
    Transfer {
        parent: SegmentId,
        from: TripAtStopTime,
    },
}

/// Trip-based router for one top-level query.
///
/// The router keeps its pruning state between calls, so a profile sweep
/// reuses what earlier iterations found. Build a new router per query.
pub struct TripBasedRouter<'a, C: TripCatalogue, T: TransferTable> {
    catalogue: &'a C,
    transfers: &'a T,
    parameters: Parameters,
    config: RouterConfig,
    pruning: PruningState,
    arena: SegmentArena,
    results: ResultSet,
}

impl<'a, C: TripCatalogue, T: TransferTable> TripBasedRouter<'a, C, T> {
    /// Create a new router.
    ///
    /// `parameters` supplies the egress stations and weights used by
    /// `route`; the profile methods replace it with their own.
    pub fn new(
        catalogue: &'a C,
        transfers: &'a T,
        parameters: Parameters,
        config: RouterConfig,
    ) -> Self {
        Self {
            catalogue,
            transfers,
            parameters,
            config,
            pruning: PruningState::new(catalogue.trip_count()),
            arena: SegmentArena::new(),
            results: ResultSet::new(),
        }
    }

    /// Current parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Results found so far, in insertion order.
    pub fn results(&self) -> &[ResultLabel] {
        self.results.labels()
    }

    /// Results found so far, best first.
    pub fn ranked_results(&self) -> Vec<ResultLabel> {
        rank_labels(self.results.labels())
    }

    /// Best weighted arrival found so far.
    pub fn earliest_arrival_time(&self) -> i64 {
        self.pruning.earliest_arrival_time()
    }

    /// Run a profile sweep once per access station.
    ///
    /// Each access station gets its own sweep over the full window; all
    /// sweeps share this router's pruning state and results.
    pub fn route_naive_profile_with_naive_betas(
        &mut self,
        parameters: Parameters,
    ) -> Result<&[ResultLabel], RouterError> {
        parameters.validate()?;

        for station in &parameters.access_stations {
            self.route_naive_profile(parameters.for_access_station(station.clone()))?;
        }

        Ok(self.results.labels())
    }

    /// Sweep the departure window from its end back to its start.
    ///
    /// Routes at `start + length`, shrinks the length by the profile step
    /// until it would go negative, then routes once more at `start`.
    pub fn route_naive_profile(
        &mut self,
        parameters: Parameters,
    ) -> Result<&[ResultLabel], RouterError> {
        parameters.validate()?;
        let step = self.config.profile_step()?;

        self.parameters = parameters;
        let access_stations = self.parameters.access_stations.clone();
        let trip_filter = self.parameters.trip_filter.clone();
        let start = self.parameters.profile_start_time;

        let mut iterations = 0;
        while self.parameters.profile_length >= Duration::zero() {
            let departure = start
                .checked_add_signed(self.parameters.profile_length)
                .ok_or_else(|| {
                    RouterError::InvalidRequest(format!(
                        "profile window ends past {}",
                        DateTime::<Utc>::MAX_UTC
                    ))
                })?;
            self.route(&access_stations, departure, &trip_filter)?;
            // Non-negative minus positive stays in range
            self.parameters.profile_length = self.parameters.profile_length - step;
            iterations += 1;
        }
        self.route(&access_stations, start, &trip_filter)?;

        debug!(
            iterations = iterations + 1,
            results = self.results.len(),
            segments = self.arena.len(),
            "Profile sweep complete"
        );

        Ok(self.results.labels())
    }

    /// Route from `access_stations` leaving the origin at `departure`.
    ///
    /// Egress stations and weights come from the current parameters.
    /// Returns all results found by this router so far.
    pub fn route(
        &mut self,
        access_stations: &[StopWithTimeDelta],
        departure: DateTime<Utc>,
        trip_filter: &TripFilter,
    ) -> Result<&[ResultLabel], RouterError> {
        if access_stations.is_empty() {
            return Err(RouterError::InvalidRequest(
                "no access stations".to_string(),
            ));
        }
        if self.parameters.egress_stations.is_empty() {
            return Err(RouterError::InvalidRequest(
                "no egress stations".to_string(),
            ));
        }

        let catalogue = self.catalogue;
        let mut queue = Vec::new();

        for station in access_stations {
            let station = Arc::new(station.clone());
            let local_departure = station.local_departure(departure).ok_or_else(|| {
                RouterError::InvalidRequest(format!(
                    "departure from {} is out of range",
                    station.stop
                ))
            })?;
            // Service day is the local date at the access stop. Trips of the
            // previous service day running past midnight are not considered.
            let service_day = local_departure.date_naive();
            let target = local_departure.num_seconds_from_midnight();

            let Some(by_pattern) = catalogue.pattern_boardings(&station.stop) else {
                continue;
            };

            for boardings in by_pattern.values() {
                let first = first_departing_at_or_after(boardings, target, |boarding| {
                    self.stop_time(boarding)
                        .map(|stop_time| stop_time.departure_time.seconds())
                })?;

                for &boarding in &boardings[first..] {
                    let trip = self.trip(boarding.trip_idx)?;
                    if trip.service.active_on(service_day) && trip_filter(trip) {
                        self.enqueue(
                            &mut queue,
                            trip,
                            boarding,
                            Origin::Access {
                                station: Arc::clone(&station),
                                service_day,
                            },
                        )?;
                        break;
                    }
                }
            }
        }

        let mut keyed = queue
            .into_iter()
            .map(|id| self.departure_time(id).map(|departure_time| (departure_time, id)))
            .collect::<Result<Vec<_>, RouterError>>()?;
        keyed.sort_by_key(|(departure_time, _)| *departure_time);
        let queue = keyed.into_iter().map(|(_, id)| id).collect();

        debug!(
            %departure,
            access_stations = access_stations.len(),
            "Routing"
        );

        self.iterate(queue)?;
        Ok(self.results.labels())
    }

    /// Reconstruct the full journey behind a label of this router.
    pub fn itinerary(&self, label: &ResultLabel) -> Result<Itinerary, RouterError> {
        reconstruct(self.catalogue, &self.arena, label)
    }

    /// Access station the journey behind a label of this router starts at.
    pub fn access_stop(&self, label: &ResultLabel) -> Result<&StopWithTimeDelta, RouterError> {
        self.arena
            .try_root(label.segment())
            .map(|root| root.access_station.as_ref())
            .ok_or(RouterError::ForeignLabel)
    }

    fn iterate(&mut self, mut queue: Vec<SegmentId>) -> Result<(), RouterError> {
        let mut round = 0;
        self.report_queue(round, &queue);
        self.check_arrivals(&queue, round)?;

        while !queue.is_empty() && round < self.config.max_rounds {
            queue = self.enqueue_transfers(&queue)?;
            round += 1;
            self.report_queue(round, &queue);
            self.check_arrivals(&queue, round)?;
        }

        Ok(())
    }

    fn report_queue(&self, round: usize, queue: &[SegmentId]) {
        debug!(round, queue = queue.len(), "Round");

        for &id in queue {
            let segment = self.arena.get(id);
            if let Some(trip) = self.catalogue.trip(segment.trip_idx()) {
                trace!(
                    pattern = %trip.pattern_id,
                    trip = %trip.trip_id,
                    from = segment.trip_at_stop_time.stop_sequence,
                    to = segment.to_stop_sequence,
                    "Queued segment"
                );
            }
        }
    }

    /// Record every egress station reached by `queue` with a better
    /// arrival than any found so far.
    fn check_arrivals(&mut self, queue: &[SegmentId], round: usize) -> Result<(), RouterError> {
        for &id in queue {
            let segment = self.arena.get(id).clone();
            let trip = self.trip(segment.trip_idx())?;

            for (position, stop_time) in riding(&segment, trip) {
                for egress in &self.parameters.egress_stations {
                    if !egress.stop.matches(&trip.feed_id, &stop_time.stop_id) {
                        continue;
                    }

                    let egress_secs = self.parameters.egress_secs(egress.time_delta_millis);
                    let arrival_time = self.arrival_time(&segment, stop_time, egress_secs);
                    if !self.pruning.tighten_arrival(arrival_time) {
                        continue;
                    }

                    let criteria = Criteria {
                        arrival_time,
                        real_transfers: self.real_transfers(id)?,
                        departure_time: self.departure_time(id)?,
                    };
                    trace!(
                        round,
                        arrival_time,
                        real_transfers = criteria.real_transfers,
                        departure_time = criteria.departure_time,
                        "New result"
                    );
                    self.results.insert(ResultLabel::new(
                        round,
                        egress.clone(),
                        TripAtStopTime::new(trip.idx, position),
                        stop_time.arrival_time,
                        id,
                        criteria,
                    ));
                }
            }
        }

        Ok(())
    }

    /// Follow the transfers out of every segment in `queue`.
    fn enqueue_transfers(&mut self, queue: &[SegmentId]) -> Result<Vec<SegmentId>, RouterError> {
        let transfers = self.transfers;
        let mut next = Vec::new();

        for &id in queue {
            let segment = self.arena.get(id).clone();
            let trip = self.trip(segment.trip_idx())?;

            for (position, stop_time) in riding(&segment, trip) {
                // Arrival only grows along the trip
                if !self
                    .pruning
                    .improves_arrival(self.arrival_time(&segment, stop_time, 0))
                {
                    break;
                }

                let origin = TripAtStopTime::new(trip.idx, position);
                for &destination in transfers.transfers_from(segment.service_day, origin) {
                    let destination_trip = self.trip(destination.trip_idx)?;
                    let boarding = self.stop_time(destination)?;

                    if boarding.departure_time >= stop_time.arrival_time
                        && destination_trip.service.active_on(segment.service_day)
                        && (self.parameters.trip_filter)(destination_trip)
                    {
                        trace!(from = %origin, to = %destination, "Transfer");
                        self.enqueue(
                            &mut next,
                            destination_trip,
                            destination,
                            Origin::Transfer {
                                parent: id,
                                from: origin,
                            },
                        )?;
                    }
                }
            }
        }

        Ok(next)
    }

    /// Board `trip` at `boarding` unless that part of it is already covered.
    fn enqueue(
        &mut self,
        queue: &mut Vec<SegmentId>,
        trip: &Trip,
        boarding: TripAtStopTime,
        origin: Origin,
    ) -> Result<(), RouterError> {
        let done_from = self
            .pruning
            .done_from(trip.idx)
            .ok_or(RouterError::UnknownTrip(trip.idx))?;
        if boarding.stop_sequence >= done_from {
            return Ok(());
        }

        // Boarding right before the covered part leaves nothing to ride
        if boarding.stop_sequence + 1 < done_from {
            let segment = match origin {
                Origin::Access {
                    station,
                    service_day,
                } => EnqueuedTripSegment {
                    trip_at_stop_time: boarding,
                    to_stop_sequence: done_from,
                    service_day,
                    transfer_origin: None,
                    parent: None,
                    access_station: station,
                    n_real_transfers: 0,
                },
                Origin::Transfer { parent, from } => {
                    let previous = self.arena.get(parent);
                    let left = self.trip(from.trip_idx)?;
                    let n_real_transfers = if left.shares_block_with(trip) {
                        previous.n_real_transfers
                    } else {
                        previous.n_real_transfers + 1
                    };
                    EnqueuedTripSegment {
                        trip_at_stop_time: boarding,
                        to_stop_sequence: done_from,
                        service_day: previous.service_day,
                        transfer_origin: Some(from),
                        parent: Some(parent),
                        access_station: Arc::clone(&previous.access_station),
                        n_real_transfers,
                    }
                }
            };
            queue.push(self.arena.push(segment));
        }

        self.pruning
            .mark_as_done(trip.idx, trip.end_idx_of_pattern, boarding.stop_sequence);
        Ok(())
    }

    /// Weighted arrival at `stop_time` on `segment`, plus `extra_secs`.
    fn arrival_time(&self, segment: &EnqueuedTripSegment, stop_time: &StopTime, extra_secs: i64) -> i64 {
        i64::from(stop_time.arrival_time.seconds())
            + self
                .parameters
                .access_disutility_secs(segment.access_station.time_delta_millis)
            + self
                .parameters
                .transfer_disutility_secs(segment.n_real_transfers)
            + extra_secs
    }

    /// Scheduled departure at the access boarding of `id`'s chain.
    fn departure_time(&self, id: SegmentId) -> Result<u32, RouterError> {
        let root = self.arena.root(id);
        Ok(self.stop_time(root.trip_at_stop_time)?.departure_time.seconds())
    }

    /// Vehicle changes along `id`'s chain. Staying on a block is not one.
    fn real_transfers(&self, id: SegmentId) -> Result<usize, RouterError> {
        let mut count = 0;
        for segment in self.arena.chain(id) {
            if let Some(origin) = segment.transfer_origin {
                let boarded = self.trip(segment.trip_idx())?;
                let left = self.trip(origin.trip_idx)?;
                if !boarded.shares_block_with(left) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn trip(&self, idx: TripIdx) -> Result<&'a Trip, RouterError> {
        let catalogue: &'a C = self.catalogue;
        catalogue.trip(idx).ok_or(RouterError::UnknownTrip(idx))
    }

    fn stop_time(&self, at: TripAtStopTime) -> Result<&'a StopTime, RouterError> {
        self.trip(at.trip_idx)?
            .stop_time(at.stop_sequence)
            .ok_or(RouterError::UnknownStopPosition(at))
    }
}

/// Positions ridden on `segment`: after the boarding stop, up to where the
/// trip was already covered.
fn riding<'t>(
    segment: &EnqueuedTripSegment,
    trip: &'t Trip,
) -> impl Iterator<Item = (usize, &'t StopTime)> + use<'t> {
    trip.stop_times
        .iter()
        .enumerate()
        .take(segment.to_stop_sequence)
        .skip(segment.trip_at_stop_time.stop_sequence + 1)
}

/// Index of the first boarding departing at or after `target`.
///
/// `boardings` must be sorted by departure.
fn first_departing_at_or_after<F>(
    boardings: &[TripAtStopTime],
    target: u32,
    departure: F,
) -> Result<usize, RouterError>
where
    F: Fn(TripAtStopTime) -> Result<u32, RouterError>,
{
    let mut lo = 0;
    let mut hi = boardings.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if departure(boardings[mid])? >= target {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Ok(lo)
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
