//! Time utilities and constants for the facilitator.

use chrono::{DateTime, Duration, Utc};

/// Facilitator timing constants.
pub mod constants {
    use super::Duration;

    /// Default settlement scheduler tick interval (60 seconds).
    pub fn default_check_interval() -> Duration {
        Duration::seconds(60)
    }

    /// Default amount-based settlement time threshold (1 hour).
    pub fn default_time_threshold() -> Duration {
        Duration::hours(1)
    }

    /// Interval between monitoring history snapshots (5 minutes).
    pub fn metrics_snapshot_interval() -> Duration {
        Duration::minutes(5)
    }
}

/// A timestamp with timezone (always UTC for the facilitator).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Check if a timestamp has expired (is in the past).
pub fn is_expired(expiry: Timestamp) -> bool {
    now() > expiry
}

/// Calculate expiry time from now.
pub fn expires_in(duration: Duration) -> Timestamp {
    now() + duration
}
