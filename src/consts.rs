/// Milliseconds in one calendar day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Days rendered by the Days and Weeks views
pub const DAYS_IN_WEEK: u32 = 7;

/// Columns rendered by the Quarters view
pub const QUARTERS_IN_YEAR: u8 = 4;

/// Months covered by one quarter
pub const MONTHS_PER_QUARTER: u32 = 3;

/// Days in a common year
pub const DAYS_IN_YEAR: u32 = 365;
/// Days in a leap year
pub const DAYS_IN_LEAP_YEAR: u32 = 366;

/// Month number for January
pub const JANUARY: u32 = 1;
/// Month number for February
pub const FEBRUARY: u32 = 2;
/// Month number for December
pub const DECEMBER: u32 = 12;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u32 = 29;

/// Days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u32; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i32 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i32 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i32 = 400;

/// Distance in pixels from either scroll edge that triggers paging
pub const EDGE_THRESHOLD_PX: f64 = 2.0;

/// Distance in pixels from the crossed page boundary the scroll position is reset to
pub const RESET_INSET_PX: f64 = 4.0;

/// Days the window moves per paging trigger unless configured otherwise
pub const DEFAULT_PAGING_STEP_DAYS: i64 = 7;

/// Largest accepted paging step, ten leap years of days
pub const MAX_PAGING_STEP_DAYS: i64 = 3660;
