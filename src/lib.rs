//! Timeline and Gantt layout engine.
//!
//! Turns a [`ViewMode`] and a reference date into a concrete [`Period`],
//! lays dated items out on its [`Grid`], and drives infinite horizontal
//! paging through the [`PanController`] state machine. [`GanttAdapter`]
//! feeds the same items to an embedded third-party Gantt widget.

mod adapter;
mod config;
mod consts;
mod grid;
mod item;
mod logging;
mod pan;
mod period;
mod prelude;
mod types;

#[cfg(test)]
mod test_utils;

pub use adapter::{
    AdapterEvent, GanttAdapter, GanttWidget, ScaleConfig, ScaleRow, ScaleUnit, WidgetEvent, WidgetTask, duration_days,
    to_widget_task,
};
pub use config::{ConfigError, TimelineConfig};
pub use consts::*;
pub use grid::{Bar, BarLayout, Grid, GridColumn, day_offset, quarter_index, today_marker};
pub use item::{MilestoneStore, Milestones, ShiftRecord, StoreError, TimelineItem};
pub use pan::{Edge, PanController, PanPhase, PanState, ScrollMirror, ScrollSide, ScrollState, ScrollSurface};
pub use period::{
    Period, add_days, checked_add_days, days_between, is_today, parse_date, period_start, span_days, start_of_week_utc, strip_time_utc,
};
pub use types::{ItemId, ViewMode, days_in_month, days_in_year, is_leap_year};

use crate::prelude::*;

/// Error type for parsing dates and view modes.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    #[display(fmt = "Invalid date: {_0}")]
    InvalidDate(String),
    #[display(fmt = "Unknown view mode: {_0} (expected Days, Weeks, Months or Quarters)")]
    InvalidViewMode(String),
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for ParseError {}

/// Error type for timeline operations.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// No item with this id is on the timeline.
    #[error("Unknown timeline item: {0}")]
    UnknownItem(ItemId),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A shift was applied locally but the store refused it. The local change
    /// is kept; pass `record` to [`Milestones::revert`] to roll it back.
    #[error("Shift of {id} by {days}d was not persisted: {source}", id = .record.current.id, days = .record.delta_days)]
    ShiftNotPersisted {
        record: Box<ShiftRecord>,
        source: StoreError,
    },

    #[error("Invalid timeline payload: {0}")]
    Json(#[from] serde_json::Error),
}
