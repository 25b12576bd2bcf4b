//!
//! src/recency.rs
//!
//! Trailing time window used to decide whether a release is new
//!

use chrono::{DateTime, Duration, Utc};

use crate::release_date::ReleaseDate;

/// True iff the start of `date` (00:00 UTC) is strictly after `now - window`.
/// A window reaching past the earliest representable instant holds every date.
pub fn is_within_window(date: &ReleaseDate, now: DateTime<Utc>, window: Duration) -> bool {
    let Some(released) = date.date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()) else {
        return false;
    };
    match now.checked_sub_signed(window) {
        Some(start) => released > start,
        None => true
    }
}

/// `now` and the trailing window, fixed once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyWindow {
    pub now: DateTime<Utc>,
    pub window: Duration
}

impl RecencyWindow {
    pub fn new(now: DateTime<Utc>, window: Duration) -> Self {
        Self { now, window }
    }

    /// `None` when the window reaches past the earliest representable date
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.now.checked_sub_signed(self.window)
    }

    pub fn contains(&self, date: &ReleaseDate) -> bool {
        is_within_window(date, self.now, self.window)
    }
}
