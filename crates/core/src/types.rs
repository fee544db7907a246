//! Shared primitive type aliases and calendar helpers.

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar day, the granularity of streaks, grace skips, and login bonuses.
pub type Day = chrono::NaiveDate;

/// Format a (year, month) pair as the `"YYYY-MM"` key stored on monthly
/// badge rows.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{year}-{month:02}")
}

/// The (year, month) immediately before the given one.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Half-open `[first-of-month, first-of-next-month)` bounds, the window
/// every monthly aggregate query uses.
pub fn month_bounds(year: i32, month: u32) -> (Day, Day) {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first = chrono::NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    let next = chrono::NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap_or_default();
    (first, next)
}
