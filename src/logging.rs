//! Log targets used across the crate.
//!
//! The crate only emits through the `log` facade; installing a logger is left
//! to the embedding application. Events carry ids, day offsets and dates,
//! never item titles.

use std::fmt;

use chrono::{DateTime, Utc};

pub(crate) const PAN_TARGET: &str = "gantt_timeline::pan";
pub(crate) const ADAPTER_TARGET: &str = "gantt_timeline::adapter";
pub(crate) const ITEM_TARGET: &str = "gantt_timeline::item";
pub(crate) const GRID_TARGET: &str = "gantt_timeline::grid";

/// Compact `YYYY-MM-DD` rendering of an optional date for log lines.
pub(crate) const fn day(date: Option<DateTime<Utc>>) -> Day {
    Day(date)
}

pub(crate) struct Day(Option<DateTime<Utc>>);

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => f.write_str("-"),
        }
    }
}
