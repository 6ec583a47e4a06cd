//! JSON query files for the command-line front end.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::domain::StopWithTimeDelta;
use crate::router::{Parameters, RouterConfig};

/// Errors loading a query file.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Reading the file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid query
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The profile window does not fit in a duration
    #[error("profile window of {0} minutes is out of range")]
    InvalidWindow(i64),
}

/// A routing query as written on disk.
///
/// ```json
/// {
///   "access": [{ "stop": { "feed_id": "f", "stop_id": "A" }, "zone": "Europe/Berlin", "time_delta_millis": 0 }],
///   "egress": [{ "stop": { "feed_id": "f", "stop_id": "C" }, "zone": "Europe/Berlin", "time_delta_millis": 120000 }],
///   "profile_start": "2024-03-15T07:00:00Z",
///   "profile_length_mins": 30
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct QueryFile {
    pub access: Vec<StopWithTimeDelta>,
    pub egress: Vec<StopWithTimeDelta>,
    pub profile_start: DateTime<Utc>,
    #[serde(default)]
    pub profile_length_mins: i64,
    #[serde(default = "neutral_weight")]
    pub beta_access_time: f64,
    #[serde(default = "neutral_weight")]
    pub beta_egress_time: f64,
    /// Milliseconds added per real transfer.
    #[serde(default)]
    pub beta_transfers: f64,
    /// Routes whose trips may not be used.
    #[serde(default)]
    pub excluded_route_ids: Vec<String>,
    /// Sweep each access station on its own.
    #[serde(default)]
    pub naive_betas: bool,
    #[serde(default)]
    pub max_rounds: Option<usize>,
    #[serde(default)]
    pub profile_step_mins: Option<i64>,
}

fn neutral_weight() -> f64 {
    1.0
}

impl QueryFile {
    /// Parse a query from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a query file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| QueryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Router parameters for this query.
    pub fn parameters(&self) -> Result<Parameters, QueryError> {
        let profile_length = Duration::try_minutes(self.profile_length_mins)
            .ok_or(QueryError::InvalidWindow(self.profile_length_mins))?;
        let excluded: HashSet<String> = self.excluded_route_ids.iter().cloned().collect();
        let parameters = Parameters::new(
            self.access.clone(),
            self.egress.clone(),
            self.profile_start,
            profile_length,
        )
        .with_betas(self.beta_access_time, self.beta_egress_time, self.beta_transfers);

        if excluded.is_empty() {
            return Ok(parameters);
        }
        Ok(parameters.with_trip_filter(move |trip| {
            trip.route_id
                .as_ref()
                .is_none_or(|route_id| !excluded.contains(route_id))
        }))
    }

    /// Router configuration, defaults overridden by the query.
    pub fn config(&self) -> RouterConfig {
        let defaults = RouterConfig::default();
        RouterConfig::new(
            self.max_rounds.unwrap_or(defaults.max_rounds),
            self.profile_step_mins.unwrap_or(defaults.profile_step_mins),
        )
    }
}
