//! Router configuration.

use chrono::Duration;

use super::search::RouterError;

/// Configuration parameters for the trip-based search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Number of transfer rounds after the initial boarding.
    /// Journeys needing more transfers than this are not found.
    pub max_rounds: usize,

    /// How far the profile sweep moves the departure time between
    /// iterations (minutes).
    pub profile_step_mins: i64,
}

impl RouterConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_rounds: usize, profile_step_mins: i64) -> Self {
        Self {
            max_rounds,
            profile_step_mins,
        }
    }

    /// Returns the profile step as a Duration.
    ///
    /// The step must be positive and small enough to be a `Duration`.
    pub fn profile_step(&self) -> Result<Duration, RouterError> {
        Duration::try_minutes(self.profile_step_mins)
            .filter(|step| *step > Duration::zero())
            .ok_or_else(|| {
                RouterError::InvalidRequest(format!(
                    "profile step of {} minutes is out of range",
                    self.profile_step_mins
                ))
            })
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            profile_step_mins: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RouterConfig::default();

        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.profile_step_mins, 1);
    }

    #[test]
    fn duration_methods() {
        let config = RouterConfig::default();

        assert_eq!(config.profile_step(), Ok(Duration::minutes(1)));
    }

    #[test]
    fn custom_config() {
        let config = RouterConfig::new(5, 2);

        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.profile_step(), Ok(Duration::minutes(2)));
    }

    #[test]
    fn step_must_be_a_positive_duration() {
        for mins in [0, -1, i64::MAX, i64::MIN] {
            assert!(matches!(
                RouterConfig::new(3, mins).profile_step(),
                Err(RouterError::InvalidRequest(_))
            ));
        }
    }
}
