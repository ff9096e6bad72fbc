//! Outlier filter (design §4.8): bounds `years_in_practice`.

use crate::config::{YEARS_IN_PRACTICE_MAX, YEARS_IN_PRACTICE_MIN};
use crate::row::Row;

/// Drops rows where `years_in_practice` is outside `[min, max]` or
/// absent. Returns the filtered rows and the count removed.
pub fn remove_outliers(rows: Vec<Row>, min: i64, max: i64) -> (Vec<Row>, usize) {
    let before = rows.len();
    let kept: Vec<Row> = rows
        .into_iter()
        .filter(|r| matches!(r.years_in_practice, Some(y) if y >= min && y <= max))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

pub fn remove_outliers_default(rows: Vec<Row>) -> (Vec<Row>, usize) {
    remove_outliers(rows, YEARS_IN_PRACTICE_MIN, YEARS_IN_PRACTICE_MAX)
}
