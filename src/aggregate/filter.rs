//! Local date filtering.
//!
//! Views ask the API to filter; this is for data already in hand.

use crate::models::{DateRange, IncomeRecord};

/// Records whose creation date falls inside `range` (inclusive).
///
/// A record with an unreadable date is kept only when the range is fully
/// open.
pub fn filter_by_date(records: &[IncomeRecord], range: &DateRange) -> Vec<IncomeRecord> {
    if range.is_unbounded() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| {
            record
                .created_at
                .date()
                .map_or(false, |date| range.contains(date))
        })
        .cloned()
        .collect()
}
