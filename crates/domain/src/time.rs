//! Timestamps for invocations and event records.

use chrono::{DateTime, Utc};

/// UTC timestamp; serialized as RFC 3339 (`timeRequested`, `timeCompleted`, event `timestamp`).
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
