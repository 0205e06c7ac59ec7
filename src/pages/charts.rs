//! Charts Page
//!
//! Income by source, income and heads over time, and an optional
//! per-barber trend, all for one date range and granularity.

use chrono::{NaiveDate, Utc};

use crate::aggregate::{self, ChartSeries};
use crate::api::{ApiClient, ApiError, ChartData};
use crate::models::{ChartQuery, DateRange, Granularity, IncomeSummary};
use crate::state::{LoadSeq, LoadTicket};

pub const LOAD_FAILED: &str = "Failed to load income data.";

/// Days shown before today when the page opens
pub const DEFAULT_RANGE_DAYS: i64 = 30;

#[derive(Debug)]
pub struct ChartsPage {
    query: ChartQuery,
    available_sources: Vec<String>,
    data: ChartData,
    loading: bool,
    error: Option<String>,
    seq: LoadSeq,
}

impl Default for ChartsPage {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl ChartsPage {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            query: ChartQuery {
                range: DateRange::last_days(DEFAULT_RANGE_DAYS, today),
                granularity: Granularity::Day,
                source: None,
            },
            available_sources: Vec::new(),
            data: ChartData::default(),
            loading: false,
            error: None,
            seq: LoadSeq::new(),
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        self.error = None;
        self.seq.issue()
    }

    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<ChartData, ApiError>) -> bool {
        if !self.seq.is_current(ticket) {
            tracing::debug!("Dropping stale chart response");
            return false;
        }

        self.loading = false;
        match result {
            Ok(data) => {
                // Keep the selector populated when a narrow range has no data
                if !data.by_source.is_empty() {
                    self.available_sources = aggregate::available_sources(&data.by_source);
                }
                self.data = data;
            }
            Err(e) => {
                tracing::error!("Error fetching chart data: {}", e);
                self.error = Some(e.user_message(LOAD_FAILED));
            }
        }
        true
    }

    pub async fn load(&mut self, client: &ApiClient) {
        let ticket = self.begin_load();
        let result = client.fetch_charts(&self.query).await;
        self.finish_load(ticket, result);
    }

    /// Set every query parameter at once without fetching
    pub fn configure(&mut self, range: DateRange, granularity: Granularity, source: Option<String>) {
        self.query = ChartQuery {
            range,
            granularity,
            source: source.filter(|s| !s.trim().is_empty()),
        };
    }

    pub async fn set_range(&mut self, client: &ApiClient, range: DateRange) {
        self.query.range = range;
        self.load(client).await;
    }

    pub async fn set_granularity(&mut self, client: &ApiClient, granularity: Granularity) {
        self.query.granularity = granularity;
        self.load(client).await;
    }

    /// Select a barber for the trend chart, or `None` to hide it
    pub async fn set_source(&mut self, client: &ApiClient, source: Option<String>) {
        self.query.source = source.filter(|s| !s.trim().is_empty());
        self.load(client).await;
    }

    pub fn query(&self) -> &ChartQuery {
        &self.query
    }

    pub fn available_sources(&self) -> &[String] {
        &self.available_sources
    }

    pub fn summary(&self) -> Option<&IncomeSummary> {
        self.data.summary.as_ref()
    }

    pub fn source_chart(&self) -> Option<ChartSeries> {
        aggregate::source_series(&self.data.by_source)
    }

    pub fn income_chart(&self) -> Option<ChartSeries> {
        aggregate::income_over_time(&self.data.by_date)
    }

    pub fn heads_chart(&self) -> Option<ChartSeries> {
        aggregate::heads_over_time(&self.data.by_date)
    }

    pub fn trend_chart(&self) -> Option<ChartSeries> {
        let source = self.query.source.as_deref()?;
        aggregate::trend_series(source, &self.data.trends)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn dismiss(&mut self) {
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
