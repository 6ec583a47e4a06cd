//! Query parameters.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::search::RouterError;
use crate::domain::{StopWithTimeDelta, Trip};

/// Decides whether a trip may be used at all (mode, operator, ...).
///
/// Must be pure: the search calls it repeatedly for the same trip.
pub type TripFilter = Arc<dyn Fn(&Trip) -> bool + Send + Sync>;

/// A filter admitting every trip.
pub fn accept_all() -> TripFilter {
    Arc::new(|_| true)
}

/// Parameters of one top-level query.
///
/// The three `beta_*` weights fold walking time and transfers into the
/// arrival time used for comparisons: access time counts `beta_access_time`
/// times, egress time `beta_egress_time` times, and every real transfer
/// adds `beta_transfers` milliseconds.
#[derive(Clone)]
pub struct Parameters {
    pub access_stations: Vec<StopWithTimeDelta>,
    pub egress_stations: Vec<StopWithTimeDelta>,
    pub profile_start_time: DateTime<Utc>,
    /// Width of the departure window; the sweep shrinks it to zero.
    pub profile_length: Duration,
    pub trip_filter: TripFilter,
    pub beta_access_time: f64,
    pub beta_egress_time: f64,
    pub beta_transfers: f64,
}

impl Parameters {
    /// Parameters with neutral weights and no trip restriction.
    pub fn new(
        access_stations: Vec<StopWithTimeDelta>,
        egress_stations: Vec<StopWithTimeDelta>,
        profile_start_time: DateTime<Utc>,
        profile_length: Duration,
    ) -> Self {
        Self {
            access_stations,
            egress_stations,
            profile_start_time,
            profile_length,
            trip_filter: accept_all(),
            beta_access_time: 1.0,
            beta_egress_time: 1.0,
            beta_transfers: 0.0,
        }
    }

    /// Restrict the trips the search may use.
    pub fn with_trip_filter(mut self, filter: impl Fn(&Trip) -> bool + Send + Sync + 'static) -> Self {
        self.trip_filter = Arc::new(filter);
        self
    }

    /// Set the access, egress and transfer weights.
    pub fn with_betas(mut self, access: f64, egress: f64, transfers: f64) -> Self {
        self.beta_access_time = access;
        self.beta_egress_time = egress;
        self.beta_transfers = transfers;
        self
    }

    /// Copy of these parameters restricted to one access station.
    pub fn for_access_station(&self, station: StopWithTimeDelta) -> Self {
        Self {
            access_stations: vec![station],
            ..self.clone()
        }
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), RouterError> {
        if self.access_stations.is_empty() {
            return Err(RouterError::InvalidRequest(
                "no access stations".to_string(),
            ));
        }
        if self.egress_stations.is_empty() {
            return Err(RouterError::InvalidRequest(
                "no egress stations".to_string(),
            ));
        }
        if self.profile_length < Duration::zero() {
            return Err(RouterError::InvalidRequest(
                "profile length is negative".to_string(),
            ));
        }
        let betas = [self.beta_access_time, self.beta_egress_time, self.beta_transfers];
        if betas.iter().any(|b| !b.is_finite()) {
            return Err(RouterError::InvalidRequest(
                "weights must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Extra seconds charged for the access walk beyond its plain duration.
    pub fn access_disutility_secs(&self, access_delta_millis: i64) -> i64 {
        ((access_delta_millis as f64 * (self.beta_access_time - 1.0)) as i64) / 1000
    }

    /// Seconds charged for `real_transfers` vehicle changes.
    pub fn transfer_disutility_secs(&self, real_transfers: usize) -> i64 {
        ((real_transfers as f64 * self.beta_transfers) as i64) / 1000
    }

    /// Weighted seconds from an egress stop to the destination.
    pub fn egress_secs(&self, egress_delta_millis: i64) -> i64 {
        ((egress_delta_millis / 1000) as f64 * self.beta_egress_time) as i64
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("access_stations", &self.access_stations)
            .field("egress_stations", &self.egress_stations)
            .field("profile_start_time", &self.profile_start_time)
            .field("profile_length", &self.profile_length)
            .field("beta_access_time", &self.beta_access_time)
            .field("beta_egress_time", &self.beta_egress_time)
            .field("beta_transfers", &self.beta_transfers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeedStopId;
    use chrono::TimeZone;

    fn station(stop: &str, delta_millis: i64) -> StopWithTimeDelta {
        StopWithTimeDelta::new(FeedStopId::new("f", stop).unwrap(), chrono_tz::UTC, delta_millis)
    }

    fn params() -> Parameters {
        Parameters::new(
            vec![station("A", 0)],
            vec![station("C", 0)],
            Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap(),
            Duration::minutes(30),
        )
    }

    #[test]
    fn valid_parameters() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn invalid_without_access() {
        let mut p = params();
        p.access_stations.clear();
        assert!(matches!(p.validate(), Err(RouterError::InvalidRequest(_))));
    }

    #[test]
    fn invalid_without_egress() {
        let mut p = params();
        p.egress_stations.clear();
        assert!(matches!(p.validate(), Err(RouterError::InvalidRequest(_))));
    }

    #[test]
    fn invalid_negative_window() {
        let mut p = params();
        p.profile_length = Duration::minutes(-1);
        assert!(matches!(p.validate(), Err(RouterError::InvalidRequest(_))));
    }

    #[test]
    fn invalid_nan_weight() {
        let p = params().with_betas(f64::NAN, 1.0, 0.0);
        assert!(matches!(p.validate(), Err(RouterError::InvalidRequest(_))));
    }

    #[test]
    fn neutral_weights_add_nothing() {
        let p = params();
        assert_eq!(p.access_disutility_secs(300_000), 0);
        assert_eq!(p.transfer_disutility_secs(3), 0);
        assert_eq!(p.egress_secs(120_000), 120);
    }

    #[test]
    fn weights_scale_walks_and_transfers() {
        let p = params().with_betas(2.0, 1.5, 300_000.0);
        // 5 minutes of access counted twice: 300 extra seconds
        assert_eq!(p.access_disutility_secs(300_000), 300);
        // 2 transfers at 300 s each
        assert_eq!(p.transfer_disutility_secs(2), 600);
        // 2 minutes of egress counted 1.5 times
        assert_eq!(p.egress_secs(120_000), 180);
    }

    #[test]
    fn egress_truncates_to_whole_seconds_first() {
        let p = params().with_betas(1.0, 2.0, 0.0);
        assert_eq!(p.egress_secs(1_999), 2);
    }

    #[test]
    fn filter_is_applied() {
        let p = params().with_trip_filter(|trip| trip.route_id.as_deref() != Some("X"));
        let trip = Trip {
            idx: crate::domain::TripIdx(0),
            end_idx_of_pattern: 1,
            pattern_id: crate::domain::PatternId("p".into()),
            feed_id: "f".into(),
            trip_id: "t".into(),
            route_id: Some("X".into()),
            block_id: None,
            service: Default::default(),
            stop_times: vec![],
        };
        assert!(!(p.trip_filter)(&trip));
    }

    #[test]
    fn restricting_to_one_access_station_keeps_the_rest() {
        let p = params().with_betas(2.0, 1.0, 0.0);
        let single = p.for_access_station(station("Z", 60_000));
        assert_eq!(single.access_stations, vec![station("Z", 60_000)]);
        assert_eq!(single.egress_stations, p.egress_stations);
        assert_eq!(single.beta_access_time, 2.0);
        assert_eq!(single.profile_length, p.profile_length);
    }
}
