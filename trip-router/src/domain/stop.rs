//! Stop identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when building an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// A stop identifier qualified by the feed it belongs to.
///
/// Stop ids are only unique within one feed, so every lookup compares
/// both halves. Neither half may be empty.
///
/// # Examples
///
/// ```
/// use trip_router::domain::FeedStopId;
///
/// let stop = FeedStopId::new("vbb", "900100003").unwrap();
/// assert_eq!(stop.feed_id(), "vbb");
/// assert_eq!(stop.stop_id(), "900100003");
/// assert_eq!(stop.to_string(), "vbb:900100003");
///
/// assert!(FeedStopId::new("", "900100003").is_err());
/// assert!(FeedStopId::new("vbb", "").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawFeedStopId")]
pub struct FeedStopId {
    feed_id: String,
    stop_id: String,
}

#[derive(Deserialize)]
struct RawFeedStopId {
    feed_id: String,
    stop_id: String,
}

impl TryFrom<RawFeedStopId> for FeedStopId {
    type Error = InvalidStopId;

    fn try_from(raw: RawFeedStopId) -> Result<Self, Self::Error> {
        Self::new(raw.feed_id, raw.stop_id)
    }
}

impl FeedStopId {
    /// Build a stop id from its feed and stop halves.
    pub fn new(feed_id: impl Into<String>, stop_id: impl Into<String>) -> Result<Self, InvalidStopId> {
        let feed_id = feed_id.into();
        let stop_id = stop_id.into();

        if feed_id.trim().is_empty() {
            return Err(InvalidStopId {
                reason: "feed id must not be empty",
            });
        }
        if stop_id.trim().is_empty() {
            return Err(InvalidStopId {
                reason: "stop id must not be empty",
            });
        }

        Ok(Self { feed_id, stop_id })
    }

    /// Returns the feed half.
    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    /// Returns the stop half.
    pub fn stop_id(&self) -> &str {
        &self.stop_id
    }

    /// True if this id names `stop_id` within `feed_id`.
    pub fn matches(&self, feed_id: &str, stop_id: &str) -> bool {
        self.feed_id == feed_id && self.stop_id == stop_id
    }
}

impl fmt::Debug for FeedStopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedStopId({}:{})", self.feed_id, self.stop_id)
    }
}

impl fmt::Display for FeedStopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.feed_id, self.stop_id)
    }
}
