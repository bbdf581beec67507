//! Milestones as the timeline sees them, plus the optimistic drag-shift flow.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::TimelineError;
use crate::logging::{ITEM_TARGET, day};
use crate::period::add_days;
use crate::types::ItemId;

/// A dated entity on the timeline (milestone, feature, task, defect).
///
/// Read-only to the layout code. The only mutation is a drag-shift, which is
/// applied locally and then pushed to the API through a [`MilestoneStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub id: ItemId,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "api_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "api_date")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, with = "api_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, with = "api_date")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TimelineItem {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: None,
            start_date: None,
            deadline: None,
            end_date: None,
            due_date: None,
        }
    }

    #[must_use]
    pub fn with_dates(mut self, start: Option<DateTime<Utc>>, deadline: Option<DateTime<Utc>>) -> Self {
        self.start_date = start;
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Effective end date: `deadline`, else `end_date`, else `due_date`.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.deadline.or(self.end_date).or(self.due_date)
    }

    /// Whether the item carries any date at all
    pub fn is_dated(&self) -> bool {
        self.start_date.is_some() || self.end().is_some()
    }

    /// Copy of the item with every date moved by `days`.
    #[must_use]
    pub fn shifted(&self, days: i64) -> Self {
        let shift = |date: Option<DateTime<Utc>>| date.map(|d| add_days(d, days));
        Self {
            start_date: shift(self.start_date),
            deadline: shift(self.deadline),
            end_date: shift(self.end_date),
            due_date: shift(self.due_date),
            ..self.clone()
        }
    }
}

/// Failure reported by the API when persisting a shift.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Update for {id} was rejected: {reason}")]
    Rejected { id: ItemId, reason: String },

    #[error("Milestone store unavailable: {0}")]
    Unavailable(String),
}

/// Seam to the REST API that owns milestone persistence.
pub trait MilestoneStore {
    /// Persists the date fields of `item` as they now stand. Fields that are
    /// `None` are left untouched on the server.
    ///
    /// # Errors
    /// Returns `StoreError` when the API refuses or cannot be reached.
    fn patch_dates(&mut self, item: &TimelineItem) -> Result<(), StoreError>;
}

/// Before/after snapshot of an optimistic shift, enough to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRecord {
    pub previous: TimelineItem,
    pub current: TimelineItem,
    pub delta_days: i64,
}

/// The items rendered on one timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milestones {
    items: Vec<TimelineItem>,
}

impl Milestones {
    pub const fn new(items: Vec<TimelineItem>) -> Self {
        Self { items }
    }

    /// Parses the JSON list returned by the milestones endpoint.
    ///
    /// # Errors
    /// Returns `TimelineError::Json` when the payload is not a list of items.
    pub fn from_json(json: &str) -> Result<Self, TimelineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&TimelineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn position(&self, id: &ItemId) -> Result<usize, TimelineError> {
        self.items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| TimelineError::UnknownItem(id.clone()))
    }

    /// Moves one item by `delta_days` locally, without touching the API.
    ///
    /// # Errors
    /// Returns `TimelineError::UnknownItem` if no item has `id`.
    pub fn apply_shift(&mut self, id: &ItemId, delta_days: i64) -> Result<ShiftRecord, TimelineError> {
        let index = self.position(id)?;
        let previous = self.items[index].clone();
        let current = previous.shifted(delta_days);
        self.items[index] = current.clone();
        debug!(
            target: ITEM_TARGET,
            "shifted {id} by {delta_days}d (start {})",
            day(current.start_date)
        );
        Ok(ShiftRecord {
            previous,
            current,
            delta_days,
        })
    }

    /// Restores the item captured in `record`.
    ///
    /// A record whose item has since been removed is ignored.
    pub fn revert(&mut self, record: &ShiftRecord) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == record.previous.id) {
            *item = record.previous.clone();
        }
    }

    /// Applies a shift and persists it.
    ///
    /// The local change stays in place even when the store refuses it; the
    /// error hands the record back so the caller can [`revert`](Self::revert)
    /// or retry.
    ///
    /// # Errors
    /// Returns `TimelineError::UnknownItem` for an unknown id and
    /// `TimelineError::ShiftNotPersisted` when persisting fails.
    pub fn commit_shift<S>(&mut self, store: &mut S, id: &ItemId, delta_days: i64) -> Result<ShiftRecord, TimelineError>
    where
        S: MilestoneStore + ?Sized,
    {
        let record = self.apply_shift(id, delta_days)?;
        if let Err(source) = store.patch_dates(&record.current) {
            warn!(target: ITEM_TARGET, "shift of {id} by {delta_days}d not persisted: {source}");
            return Err(TimelineError::ShiftNotPersisted {
                record: Box::new(record),
                source,
            });
        }
        Ok(record)
    }
}

impl From<Vec<TimelineItem>> for Milestones {
    fn from(items: Vec<TimelineItem>) -> Self {
        Self::new(items)
    }
}

/// Optional API dates: empty strings and nulls are both "no date".
mod api_date {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::period::parse_date;

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_some(&d.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => parse_date(&s).map(Some).map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingStore, milestone, utc};

    #[test]
    fn test_end_fallback_order() {
        let mut item = milestone("1", Some("2024-03-01"), None);
        assert_eq!(item.end(), None);

        item.due_date = Some(utc("2024-03-20T00:00:00Z"));
        assert_eq!(item.end(), Some(utc("2024-03-20T00:00:00Z")));

        item.end_date = Some(utc("2024-03-15T00:00:00Z"));
        assert_eq!(item.end(), Some(utc("2024-03-15T00:00:00Z")));

        item.deadline = Some(utc("2024-03-10T00:00:00Z"));
        assert_eq!(item.end(), Some(utc("2024-03-10T00:00:00Z")));
    }

    #[test]
    fn test_is_dated() {
        assert!(!TimelineItem::new("1", "Undated").is_dated());
        assert!(milestone("2", None, Some("2024-03-10")).is_dated());
    }

    #[test]
    fn test_shifted_moves_every_date() {
        let mut item = milestone("1", Some("2024-02-27"), Some("2024-03-01"));
        item.due_date = Some(utc("2024-03-05T00:00:00Z"));

        let moved = item.shifted(2);
        assert_eq!(moved.start_date, Some(utc("2024-02-29T00:00:00Z")));
        assert_eq!(moved.deadline, Some(utc("2024-03-03T00:00:00Z")));
        assert_eq!(moved.due_date, Some(utc("2024-03-07T00:00:00Z")));
        assert_eq!(moved.end_date, None);
        assert_eq!(moved.title, item.title);
    }

    #[test]
    fn test_deserialize_api_payload() {
        let json = r#"[
            {"id": 12, "title": "Beta", "status": "in_progress",
             "start_date": "2024-03-04", "deadline": "2024-03-08T17:00:00Z"},
            {"id": "m-3", "name": "Launch", "start_date": "", "due_date": null}
        ]"#;
        let milestones = Milestones::from_json(json).unwrap();
        assert_eq!(milestones.len(), 2);

        let beta = &milestones.items()[0];
        assert_eq!(beta.id, ItemId::from("12"));
        assert_eq!(beta.status.as_deref(), Some("in_progress"));
        assert_eq!(beta.start_date, Some(utc("2024-03-04T00:00:00Z")));
        assert_eq!(beta.end(), Some(utc("2024-03-08T17:00:00Z")));

        let launch = &milestones.items()[1];
        assert_eq!(launch.title, "Launch");
        assert!(!launch.is_dated());
    }

    #[test]
    fn test_deserialize_rejects_bad_date() {
        let json = r#"[{"id": 1, "start_date": "next tuesday"}]"#;
        assert!(matches!(Milestones::from_json(json), Err(TimelineError::Json(_))));
    }

    #[test]
    fn test_serialize_dates_as_rfc3339() {
        let item = milestone("7", Some("2024-03-04"), None);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["start_date"], "2024-03-04T00:00:00Z");
        assert!(json["deadline"].is_null());
    }

    #[test]
    fn test_apply_and_revert_shift() {
        let mut milestones = Milestones::from(vec![milestone("a", Some("2024-03-04"), Some("2024-03-06"))]);
        let id = ItemId::from("a");

        let record = milestones.apply_shift(&id, -3).unwrap();
        assert_eq!(record.delta_days, -3);
        assert_eq!(milestones.get(&id).unwrap().start_date, Some(utc("2024-03-01T00:00:00Z")));

        milestones.revert(&record);
        assert_eq!(milestones.get(&id).unwrap(), &record.previous);
    }

    #[test]
    fn test_apply_shift_unknown_item() {
        let mut milestones = Milestones::default();
        let result = milestones.apply_shift(&ItemId::from("ghost"), 1);
        assert!(matches!(result, Err(TimelineError::UnknownItem(ref id)) if id.as_str() == "ghost"));
    }

    #[test]
    fn test_commit_shift_persists() {
        let mut milestones = Milestones::from(vec![milestone("a", Some("2024-03-04"), Some("2024-03-06"))]);
        let mut store = RecordingStore::default();
        let id = ItemId::from("a");

        let record = milestones.commit_shift(&mut store, &id, 7).unwrap();

        assert_eq!(store.patches, vec![record.current.clone()]);
        assert_eq!(store.patches[0].start_date, Some(utc("2024-03-11T00:00:00Z")));
        assert_eq!(store.patches[0].deadline, Some(utc("2024-03-13T00:00:00Z")));
        assert_eq!(milestones.get(&id).unwrap().start_date, Some(utc("2024-03-11T00:00:00Z")));
    }

    #[test]
    fn test_commit_shift_patches_the_fields_the_item_has() {
        let mut item = milestone("a", Some("2024-03-04"), None);
        item.end_date = Some(utc("2024-03-08T00:00:00Z"));
        let mut milestones = Milestones::from(vec![item]);
        let mut store = RecordingStore::default();

        milestones.commit_shift(&mut store, &ItemId::from("a"), 1).unwrap();

        let patched = &store.patches[0];
        assert_eq!(patched.end_date, Some(utc("2024-03-09T00:00:00Z")));
        assert_eq!(patched.deadline, None);
        assert_eq!(patched.due_date, None);
    }

    #[test]
    fn test_commit_shift_keeps_local_change_on_rejection() {
        let original = milestone("a", Some("2024-03-04"), Some("2024-03-06"));
        let mut milestones = Milestones::from(vec![original.clone()]);
        let mut store = RecordingStore {
            fail_with: Some(StoreError::Unavailable("503".to_owned())),
            ..RecordingStore::default()
        };
        let id = ItemId::from("a");

        let result = milestones.commit_shift(&mut store, &id, 7);

        let Err(TimelineError::ShiftNotPersisted { record, source }) = result else {
            panic!("expected an unpersisted shift");
        };
        assert_eq!(source, StoreError::Unavailable("503".to_owned()));
        assert_eq!(record.delta_days, 7);
        assert_eq!(milestones.get(&id).unwrap().start_date, Some(utc("2024-03-11T00:00:00Z")));
        assert!(store.patches.is_empty());

        // Rolling back is the caller's call
        milestones.revert(&record);
        assert_eq!(milestones.items(), &[original]);
    }
}
