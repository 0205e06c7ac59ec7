//! Dashboard Page
//!
//! Income table with a date filter, sortable columns and summary cards.

use crate::aggregate::{sort_records, totals, SortConfig, SortField, Totals};
use crate::api::{ApiClient, ApiError};
use crate::models::{DateRange, IncomeRecord};
use crate::state::{LoadSeq, LoadTicket};

pub const LOAD_FAILED: &str = "Failed to load income data. Please try again later.";

#[derive(Debug, Default)]
pub struct DashboardPage {
    records: Vec<IncomeRecord>,
    filter: DateRange,
    sort: SortConfig,
    loading: bool,
    error: Option<String>,
    seq: LoadSeq,
}

impl DashboardPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        self.error = None;
        self.seq.issue()
    }

    /// Apply a fetch result. Returns `false` when a newer load has been
    /// issued since `ticket`, in which case nothing changes.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<IncomeRecord>, ApiError>,
    ) -> bool {
        if !self.seq.is_current(ticket) {
            tracing::debug!("Dropping stale dashboard response");
            return false;
        }

        self.loading = false;
        match result {
            Ok(records) => {
                tracing::debug!("Dashboard loaded {} records", records.len());
                self.records = records;
            }
            Err(e) => {
                tracing::error!("Failed to load income data: {}", e);
                self.error = Some(e.user_message(LOAD_FAILED));
            }
        }
        true
    }

    /// Fetch the records for the current filter
    pub async fn load(&mut self, client: &ApiClient) {
        let ticket = self.begin_load();
        let result = client.list_income(&self.filter).await;
        self.finish_load(ticket, result);
    }

    pub async fn set_filter(&mut self, client: &ApiClient, filter: DateRange) {
        self.filter = filter;
        self.load(client).await;
    }

    pub async fn reset_filters(&mut self, client: &ApiClient) {
        self.set_filter(client, DateRange::unbounded()).await;
    }

    /// Column-header click; sorting is local, no fetch
    pub fn request_sort(&mut self, field: SortField) {
        self.sort.request(field);
    }

    /// Table rows in display order
    pub fn rows(&self) -> Vec<IncomeRecord> {
        sort_records(&self.records, self.sort)
    }

    pub fn totals(&self) -> Totals {
        totals(&self.records)
    }

    pub fn records(&self) -> &[IncomeRecord] {
        &self.records
    }

    pub fn filter(&self) -> DateRange {
        self.filter
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
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
