//! Data Model
//!
//! Wire types exchanged with the income API, plus the small value types
//! (date ranges, chart granularity) used to build queries against it.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============ Income Records ============

/// One barber's income entry, as stored by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub source: String,
    pub number_of_heads: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
    /// Computed by the API from the current settings; never derived locally.
    #[serde(default)]
    pub income: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_share: Option<f64>,
    pub created_at: Timestamp,
}

impl IncomeRecord {
    /// Whether this record is the owner's own share.
    ///
    /// An explicit `isOwner` from the API wins. Older API versions only send
    /// `ownerShare`, in which case a zero share is read as an owner record.
    pub fn owner_flag(&self) -> bool {
        self.is_owner
            .unwrap_or_else(|| self.owner_share == Some(0.0))
    }
}

/// Body of a create or update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeDraft {
    pub source: String,
    pub number_of_heads: u32,
    pub is_owner: bool,
}

impl IncomeDraft {
    pub fn new(source: impl Into<String>, number_of_heads: u32, is_owner: bool) -> Self {
        Self {
            source: source.into(),
            number_of_heads,
            is_owner,
        }
    }

    /// Trim the source and reject an empty one.
    pub fn validated(mut self) -> Result<Self, String> {
        self.source = self.source.trim().to_string();
        if self.source.is_empty() {
            return Err("Source (name of barber) is required".to_string());
        }
        Ok(self)
    }
}

/// Creation timestamp kept exactly as the API sent it.
///
/// Parsing is deferred so that an odd value never fails the whole list;
/// it simply has no instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parsed instant, if the value is recognizable.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        let raw = self.0.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Calendar date (UTC) of the instant.
    pub fn date(&self) -> Option<NaiveDate> {
        self.instant().map(|dt| dt.date_naive())
    }

    /// Short display form, e.g. `Mar 04, 2024`.
    pub fn display_date(&self) -> String {
        self.instant()
            .map(|dt| dt.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| self.0.clone())
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IncomeList {
    #[serde(default)]
    pub incomes: Vec<IncomeRecord>,
}

// ============ Settings ============

/// Global pricing configuration used by the API to compute income.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSettings {
    pub haircut_price: f64,
    pub owner_share_percentage: f64,
}

impl IncomeSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !self.haircut_price.is_finite() || self.haircut_price < 0.0 {
            return Err("Haircut price must be zero or more".to_string());
        }
        if !(0.0..=100.0).contains(&self.owner_share_percentage) {
            return Err("Owner share percentage must be between 0 and 100".to_string());
        }
        Ok(())
    }
}

/// Settings as returned by the API; either field may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default)]
    pub haircut_price: Option<f64>,
    #[serde(default)]
    pub owner_share_percentage: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SettingsEnvelope {
    #[serde(default)]
    pub settings: Option<StoredSettings>,
}

// ============ Login ============

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

// ============ Charts ============

/// Income total for one barber.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTotal {
    #[serde(rename = "_id")]
    pub source: String,
    #[serde(default)]
    pub total_income: f64,
}

/// Income and heads for one date bucket (day, month or year).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBucket {
    #[serde(rename = "_id")]
    pub label: String,
    #[serde(default)]
    pub total_income: f64,
    #[serde(default)]
    pub total_heads: u64,
}

/// Income for one date bucket of a single barber.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    #[serde(rename = "_id")]
    pub label: String,
    #[serde(default)]
    pub total_income: f64,
}

/// Aggregate totals over the queried range.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSummary {
    #[serde(default)]
    pub total_income: f64,
    #[serde(default)]
    pub total_heads: u64,
    #[serde(default)]
    pub average_income_per_head: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BySourceResponse {
    #[serde(default)]
    pub income_by_source: Vec<SourceTotal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ByDateResponse {
    #[serde(default)]
    pub income_by_date: Vec<DateBucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TotalResponse {
    #[serde(default)]
    pub total_income: Option<IncomeSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrendsResponse {
    #[serde(default)]
    pub income_trends: Vec<TrendPoint>,
}

/// Chart aggregation bucket size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "month" | "monthly" => Ok(Granularity::Month),
            "year" | "yearly" => Ok(Granularity::Year),
            other => Err(format!("Unknown granularity '{}' (expected day, month or year)", other)),
        }
    }
}

// ============ Date Ranges ============

/// Inclusive calendar-date range; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// No bounds at all
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// The `days` days before `today`, through `today`
    pub fn last_days(days: i64, today: NaiveDate) -> Self {
        Self {
            start: Some(today - Duration::days(days)),
            end: Some(today),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    /// `startDate`/`endDate` query parameters; absent bounds are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "…".to_string());
        if self.is_unbounded() {
            f.write_str("All dates")
        } else {
            write!(f, "{} to {}", side(self.start), side(self.end))
        }
    }
}

/// Parse a `YYYY-MM-DD` bound; `-` or an empty string means "open".
pub fn parse_date_bound(input: &str) -> Result<Option<NaiveDate>, String> {
    let input = input.trim();
    if input.is_empty() || input == "-" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("Invalid date '{}' (expected YYYY-MM-DD)", input))
}

/// Parameters shared by every chart endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartQuery {
    pub range: DateRange,
    pub granularity: Granularity,
    pub source: Option<String>,
}

impl ChartQuery {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.range.query_pairs();
        pairs.push(("granularity", self.granularity.as_str().to_string()));
        if let Some(source) = &self.source {
            pairs.push(("source", source.clone()));
        }
        pairs
    }
}
