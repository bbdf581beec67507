//! Shared builders for unit tests.

use chrono::{DateTime, Utc};

use crate::item::{MilestoneStore, StoreError, TimelineItem};
use crate::period::parse_date;

/// Parses an RFC 3339 timestamp, panicking on malformed test input.
pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .unwrap_or_else(|err| panic!("bad test timestamp {s}: {err}"))
        .with_timezone(&Utc)
}

/// Milestone titled `Milestone {id}` with `YYYY-MM-DD` start and deadline.
pub fn milestone(id: &str, start: Option<&str>, deadline: Option<&str>) -> TimelineItem {
    let date = |s: &str| parse_date(s).unwrap_or_else(|err| panic!("bad test date {s}: {err}"));
    TimelineItem::new(id, format!("Milestone {id}")).with_dates(start.map(date), deadline.map(date))
}

/// Store that records every patch and optionally refuses all of them.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub patches: Vec<TimelineItem>,
    pub fail_with: Option<StoreError>,
}

impl MilestoneStore for RecordingStore {
    fn patch_dates(&mut self, item: &TimelineItem) -> Result<(), StoreError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        self.patches.push(item.clone());
        Ok(())
    }
}
