//! Calendar arithmetic for the visible timeline window.
//!
//! Every function here works on UTC calendar days. Local time never enters the
//! picture, so a period computed in one timezone matches the same period
//! computed in any other.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::Serialize;
use std::hash::{Hash, Hasher};

use crate::ParseError;
use crate::consts::{DAYS_IN_LEAP_YEAR, DAYS_IN_WEEK};
use crate::types::{ViewMode, days_in_month, days_in_year};

/// Returns the same UTC calendar day at midnight.
pub fn strip_time_utc(date: DateTime<Utc>) -> DateTime<Utc> {
    date.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Returns the Monday (UTC) of the week containing `date`, at midnight.
pub fn start_of_week_utc(date: DateTime<Utc>) -> DateTime<Utc> {
    let day = date.date_naive();
    let back = i64::from(day.weekday().num_days_from_monday());
    midnight(day - TimeDelta::days(back))
}

/// Snaps `date` to the start of the period it falls in for `mode`.
pub fn period_start(mode: ViewMode, date: DateTime<Utc>) -> DateTime<Utc> {
    let day = date.date_naive();
    match mode {
        ViewMode::Days | ViewMode::Weeks => start_of_week_utc(date),
        ViewMode::Months => midnight(day - TimeDelta::days(i64::from(day.day0()))),
        ViewMode::Quarters => midnight(day - TimeDelta::days(i64::from(day.ordinal0()))),
    }
}

/// Number of day buckets rendered for a period of `mode` starting at `start`.
pub fn span_days(mode: ViewMode, start: DateTime<Utc>) -> u32 {
    match mode {
        ViewMode::Days | ViewMode::Weeks => DAYS_IN_WEEK,
        ViewMode::Months => days_in_month(start.year(), start.month()),
        ViewMode::Quarters => days_in_year(start.year()),
    }
}

/// Shifts `date` by `days` whole days; negative values move backwards.
///
/// Saturates at the earliest or latest representable instant.
pub fn add_days(date: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    checked_add_days(date, days).unwrap_or(if days < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Shifts `date` by `days` whole days, or `None` when the result cannot be
/// represented.
pub fn checked_add_days(date: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    date.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Whole calendar days from `from` to `to`, ignoring time of day.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (strip_time_utc(to) - strip_time_utc(from)).num_days()
}

/// Whether `date` falls on the same UTC calendar day as `now`.
pub fn is_today(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    strip_time_utc(date) == strip_time_utc(now)
}

/// Parses the date formats the REST API hands out.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps (read
/// as UTC) and bare `YYYY-MM-DD` dates.
///
/// # Errors
/// Returns `ParseError::EmptyInput` for blank input and
/// `ParseError::InvalidDate` when no format matches.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(midnight)
        .map_err(|_| ParseError::InvalidDate(trimmed.to_owned()))
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// The visible timeline window.
///
/// `start` and `span_days` are always derived from `mode` and `reference`;
/// there is no way to set them independently. Paging moves the reference date
/// and re-derives the rest, so small steps accumulate until they cross into
/// the next period.
///
/// Two periods are equal when they cover the same window in the same mode,
/// whichever reference date they were derived from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Period {
    mode: ViewMode,
    reference: DateTime<Utc>,
    start: DateTime<Utc>,
    span_days: u32,
}

impl Period {
    pub fn new(mode: ViewMode, reference: DateTime<Utc>) -> Self {
        let start = period_start(mode, reference);
        Self {
            mode,
            reference,
            start,
            span_days: span_days(mode, start),
        }
    }

    pub const fn mode(&self) -> ViewMode {
        self.mode
    }

    /// The date the window was derived from
    pub const fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    /// First day of the window, UTC midnight
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn span_days(&self) -> u32 {
        self.span_days
    }

    /// First day after the window (exclusive bound)
    pub fn end(&self) -> DateTime<Utc> {
        add_days(self.start, i64::from(self.span_days))
    }

    /// Calendar year of the window start
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Whether the calendar day of `date` falls inside the window
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        let day = strip_time_utc(date);
        self.start <= day && day < self.end()
    }

    /// Moves the reference date by `days` and re-derives the window.
    ///
    /// Returns `None` if the new window would leave the representable range.
    pub fn shifted(&self, days: i64) -> Option<Self> {
        Self::checked(self.mode, checked_add_days(self.reference, days)?)
    }

    /// Same reference date viewed through another mode.
    pub fn with_mode(&self, mode: ViewMode) -> Self {
        Self::new(mode, self.reference)
    }

    /// The window immediately after this one.
    pub fn next(&self) -> Option<Self> {
        Self::checked(self.mode, checked_add_days(self.start, i64::from(self.span_days))?)
    }

    /// The window immediately before this one.
    pub fn previous(&self) -> Option<Self> {
        Self::checked(self.mode, checked_add_days(self.start, -1)?)
    }

    // A full year of margin on either side keeps every derived date in range
    fn checked(mode: ViewMode, reference: DateTime<Utc>) -> Option<Self> {
        checked_add_days(reference, -i64::from(DAYS_IN_LEAP_YEAR))?;
        checked_add_days(reference, 2 * i64::from(DAYS_IN_LEAP_YEAR))?;
        Some(Self::new(mode, reference))
    }
}

impl PartialEq for Period {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.start == other.start && self.span_days == other.span_days
    }
}

impl Eq for Period {}

impl Hash for Period {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mode.hash(state);
        self.start.hash(state);
        self.span_days.hash(state);
    }
}
