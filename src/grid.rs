//! Maps dates onto the columns of a [`Period`].
//!
//! Positions are expressed both as whole columns and as fractions of the
//! grid, so a renderer can lay bars out at any pixel width.

use chrono::{DateTime, Datelike, Utc};
use log::trace;
use serde::Serialize;
use std::cmp::Ordering;

use crate::consts::{MONTHS_PER_QUARTER, QUARTERS_IN_YEAR};
use crate::item::TimelineItem;
use crate::logging::GRID_TARGET;
use crate::period::{Period, add_days, days_between, is_today};
use crate::types::{ItemId, days_in_month};

/// Day column of `date` within `period`, clamped to the grid.
///
/// A missing date maps to the first column.
pub fn day_offset(period: &Period, date: Option<DateTime<Utc>>) -> u32 {
    let Some(date) = date else {
        return 0;
    };
    let last = i64::from(period.span_days().saturating_sub(1));
    let days = days_between(period.start(), date).min(last).max(0);
    u32::try_from(days).unwrap_or(0)
}

/// Quarter column (0..=3) of `date` for a Quarters period.
///
/// Dates in earlier years land in the first quarter, later years in the last.
pub fn quarter_index(period: &Period, date: Option<DateTime<Utc>>) -> u8 {
    let Some(date) = date else {
        return 0;
    };
    match date.year().cmp(&period.year()) {
        Ordering::Less => 0,
        Ordering::Greater => QUARTERS_IN_YEAR - 1,
        Ordering::Equal => u8::try_from(date.month0() / MONTHS_PER_QUARTER).unwrap_or(0),
    }
}

/// Fractional position of the "today" marker, or `None` once today is past
/// the end of the period. Days before the period pin the marker to the start.
pub fn today_marker(period: &Period, now: DateTime<Utc>) -> Option<f64> {
    let days_from_start = days_between(period.start(), now).max(0);
    if days_from_start >= i64::from(period.span_days()) {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let fraction = days_from_start as f64 / f64::from(period.span_days());
    Some(fraction)
}

/// Column extent of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Bar {
    /// First column covered
    pub start: u32,
    /// Columns covered, at least one
    pub span: u32,
}

impl Bar {
    /// Builds a bar from inclusive first/last columns.
    pub const fn between(first: u32, last: u32) -> Self {
        let span = if last > first { last - first + 1 } else { 1 };
        Self { start: first, span }
    }

    /// Left edge as a fraction of `columns`
    pub fn left(&self, columns: u32) -> f64 {
        f64::from(self.start) / f64::from(columns.max(1))
    }

    /// Width as a fraction of `columns`
    pub fn width(&self, columns: u32) -> f64 {
        f64::from(self.span) / f64::from(columns.max(1))
    }
}

/// Where one item lands on the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarLayout {
    pub id: ItemId,
    pub bar: Bar,
    pub left: f64,
    pub width: f64,
    /// False when the item's dates lie wholly outside the period; the bar is
    /// still clamped onto the grid edge.
    pub visible: bool,
}

/// One header bucket of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridColumn {
    pub start: DateTime<Utc>,
    pub days: u32,
    pub label: String,
    pub sublabel: String,
    pub is_today: bool,
    pub is_weekend: bool,
}

/// The concrete column grid for a period, as seen at `now`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    period: Period,
    columns: Vec<GridColumn>,
    today: Option<f64>,
}

impl Grid {
    pub fn build(period: Period, now: DateTime<Utc>) -> Self {
        let columns = if period.mode().is_quarterly() {
            quarter_columns(&period, now)
        } else {
            day_columns(&period, now)
        };
        trace!(
            target: GRID_TARGET,
            "built {} grid of {} columns from {}",
            period.mode(),
            columns.len(),
            period.start().format("%Y-%m-%d")
        );
        Self {
            period,
            columns,
            today: today_marker(&period, now),
        }
    }

    pub const fn period(&self) -> &Period {
        &self.period
    }

    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    /// Number of columns bars are measured against
    pub fn column_count(&self) -> u32 {
        if self.period.mode().is_quarterly() {
            u32::from(QUARTERS_IN_YEAR)
        } else {
            self.period.span_days()
        }
    }

    /// Fractional offset of the "today" marker, if it is on the grid
    pub const fn today(&self) -> Option<f64> {
        self.today
    }

    /// Column extent of an item; a missing end collapses the bar onto its start.
    pub fn bar_for(&self, item: &TimelineItem) -> Bar {
        let end = item.end().or(item.start_date);
        if self.period.mode().is_quarterly() {
            let first = quarter_index(&self.period, item.start_date);
            let last = quarter_index(&self.period, end);
            Bar::between(u32::from(first), u32::from(last))
        } else {
            let first = day_offset(&self.period, item.start_date);
            let last = day_offset(&self.period, end);
            Bar::between(first, last)
        }
    }

    /// Lays out every item, in input order.
    pub fn layout(&self, items: &[TimelineItem]) -> Vec<BarLayout> {
        let columns = self.column_count();
        items
            .iter()
            .map(|item| {
                let bar = self.bar_for(item);
                BarLayout {
                    id: item.id.clone(),
                    bar,
                    left: bar.left(columns),
                    width: bar.width(columns),
                    visible: self.overlaps(item),
                }
            })
            .collect()
    }

    /// Day under a horizontal position given as a fraction of the grid width.
    pub fn date_at_fraction(&self, fraction: f64) -> DateTime<Utc> {
        let span = self.period.span_days();
        let clamped = fraction.clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let column = ((clamped * f64::from(span)).floor() as u32).min(span.saturating_sub(1));
        add_days(self.period.start(), i64::from(column))
    }

    /// Whole days covered by a horizontal drag of `distance_px` on a grid
    /// rendered `grid_width_px` wide, rounded to the nearest day.
    #[allow(clippy::cast_possible_truncation)]
    pub fn days_for_distance(&self, distance_px: f64, grid_width_px: f64) -> i64 {
        if grid_width_px <= 0.0 {
            return 0;
        }
        let px_per_day = grid_width_px / f64::from(self.period.span_days());
        (distance_px / px_per_day).round() as i64
    }

    fn overlaps(&self, item: &TimelineItem) -> bool {
        let first = item.start_date.or_else(|| item.end());
        let last = item.end().or(item.start_date);
        match (first, last) {
            (Some(first), Some(last)) => {
                days_between(first, self.period.end()) > 0 && days_between(self.period.start(), last) >= 0
            }
            // Undated items are drawn at the first column
            _ => true,
        }
    }
}

fn day_columns(period: &Period, now: DateTime<Utc>) -> Vec<GridColumn> {
    (0..period.span_days())
        .map(|offset| {
            let start = add_days(period.start(), i64::from(offset));
            GridColumn {
                start,
                days: 1,
                label: start.day().to_string(),
                sublabel: start.format("%a").to_string(),
                is_today: is_today(start, now),
                is_weekend: start.weekday().number_from_monday() > 5,
            }
        })
        .collect()
}

fn quarter_columns(period: &Period, now: DateTime<Utc>) -> Vec<GridColumn> {
    let year = period.year();
    let mut start = period.start();
    let mut columns = Vec::with_capacity(usize::from(QUARTERS_IN_YEAR));
    for quarter in 0..u32::from(QUARTERS_IN_YEAR) {
        let first_month = quarter * MONTHS_PER_QUARTER + 1;
        let days: u32 = (first_month..first_month + MONTHS_PER_QUARTER)
            .map(|month| days_in_month(year, month))
            .sum();
        let end = add_days(start, i64::from(days));
        columns.push(GridColumn {
            start,
            days,
            label: format!("Q{}", quarter + 1),
            sublabel: year.to_string(),
            is_today: start <= now && now < end,
            is_weekend: false,
        });
        start = end;
    }
    columns
}
