//! Table sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::IncomeRecord;

/// Sortable dashboard column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Source,
    NumberOfHeads,
    Income,
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Source,
        SortField::NumberOfHeads,
        SortField::Income,
        SortField::CreatedAt,
    ];

    /// Wire/field name, as used in commands
    pub fn key(&self) -> &'static str {
        match self {
            SortField::Source => "source",
            SortField::NumberOfHeads => "numberOfHeads",
            SortField::Income => "income",
            SortField::CreatedAt => "createdAt",
        }
    }

    /// Column heading
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Source => "Source",
            SortField::NumberOfHeads => "Customers",
            SortField::Income => "Income",
            SortField::CreatedAt => "Date",
        }
    }

    fn compare(&self, a: &IncomeRecord, b: &IncomeRecord) -> Ordering {
        match self {
            SortField::Source => a.source.cmp(&b.source),
            SortField::NumberOfHeads => a.number_of_heads.cmp(&b.number_of_heads),
            SortField::Income => a.income.partial_cmp(&b.income).unwrap_or(Ordering::Equal),
            SortField::CreatedAt => a.created_at.instant().cmp(&b.created_at.instant()),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "source" | "barber" => Ok(SortField::Source),
            "numberofheads" | "heads" | "customers" => Ok(SortField::NumberOfHeads),
            "income" => Ok(SortField::Income),
            "createdat" | "date" => Ok(SortField::CreatedAt),
            _ => Err(format!(
                "Unknown sort field '{}' (expected source, heads, income or date)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Current sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    /// Newest records first
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortConfig {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Column-header click: the ascending column flips to descending, any
    /// other click sorts that column ascending.
    pub fn request(&mut self, field: SortField) {
        self.direction = if self.field == field && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.field = field;
    }

    /// Header marker for `field`: `▲`, `▼`, or `↕` when unsorted
    pub fn indicator(&self, field: SortField) -> &'static str {
        if self.field != field {
            return "↕";
        }
        match self.direction {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Stable sort of `records` by `config`.
///
/// Records with equal keys keep their input order in both directions.
pub fn sort_records(records: &[IncomeRecord], config: SortConfig) -> Vec<IncomeRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = config.field.compare(a, b);
        match config.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}
