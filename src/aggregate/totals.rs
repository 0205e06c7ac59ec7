//! Summary totals.

use crate::models::{IncomeRecord, IncomeSummary};

/// Sums over the currently loaded records
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub total_income: f64,
    pub total_heads: u64,
    pub average_per_head: f64,
}

pub fn totals(records: &[IncomeRecord]) -> Totals {
    let total_income: f64 = records.iter().map(|r| r.income).sum();
    let total_heads: u64 = records.iter().map(|r| u64::from(r.number_of_heads)).sum();

    Totals {
        total_income,
        total_heads,
        average_per_head: safe_average(total_income, total_heads),
    }
}

/// `total / count`, or zero when there is nothing to divide by or the
/// result would not be a finite number.
pub fn safe_average(total: f64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let average = total / count as f64;
    if average.is_finite() {
        average
    } else {
        0.0
    }
}

impl IncomeSummary {
    /// Server-provided average when usable, otherwise computed safely
    pub fn average_per_head(&self) -> f64 {
        match self.average_income_per_head {
            Some(avg) if avg.is_finite() => avg,
            _ => safe_average(self.total_income, self.total_heads),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timestamp;

    fn record(heads: u32, income: f64) -> IncomeRecord {
        IncomeRecord {
            id: format!("{}-{}", heads, income),
            source: "Mike".to_string(),
            number_of_heads: heads,
            is_owner: None,
            income,
            owner_share: None,
            created_at: Timestamp::from("2024-01-01"),
        }
    }

    #[test]
    fn test_sums_and_average() {
        let records = vec![record(5, 500.0), record(3, 450.5), record(2, 120.25)];
        let t = totals(&records);

        assert_eq!(t.total_heads, 10);
        assert!((t.total_income - 1070.75).abs() < 0.005);
        assert!((t.average_per_head - 107.075).abs() < 0.005);
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        assert_eq!(totals(&[]), Totals::default());
    }

    #[test]
    fn test_zero_heads_never_divides() {
        let t = totals(&[record(0, 0.0), record(0, 250.0)]);
        assert_eq!(t.total_heads, 0);
        assert_eq!(t.total_income, 250.0);
        assert_eq!(t.average_per_head, 0.0);
    }

    #[test]
    fn test_zero_head_record_still_counted_in_income() {
        let t = totals(&[record(0, 100.0), record(4, 400.0)]);
        assert_eq!(t.total_heads, 4);
        assert_eq!(t.average_per_head, 125.0);
    }

    #[test]
    fn test_summary_average() {
        let summary = IncomeSummary {
            total_income: 900.0,
            total_heads: 9,
            average_income_per_head: None,
        };
        assert_eq!(summary.average_per_head(), 100.0);

        let empty = IncomeSummary {
            total_income: 0.0,
            total_heads: 0,
            average_income_per_head: Some(f64::NAN),
        };
        assert_eq!(empty.average_per_head(), 0.0);
    }
}
