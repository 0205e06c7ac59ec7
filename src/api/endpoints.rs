//! Income API Endpoints
//!
//! Typed wrappers over the REST operations the client consumes.

use serde::de::IgnoredAny;

use super::client::ApiClient;
use super::error::ApiError;
use crate::models::{
    ByDateResponse, BySourceResponse, ChartQuery, DateBucket, DateRange, IncomeDraft, IncomeList,
    IncomeRecord, IncomeSettings, IncomeSummary, LoginRequest, LoginResponse, SettingsEnvelope,
    SourceTotal, StoredSettings, TotalResponse, TrendPoint, TrendsResponse,
};

/// Everything the charts view shows for one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub by_source: Vec<SourceTotal>,
    pub by_date: Vec<DateBucket>,
    pub summary: Option<IncomeSummary>,
    /// Only fetched when the query names a source
    pub trends: Vec<TrendPoint>,
}

impl ApiClient {
    /// Exchange credentials for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let response: LoginResponse = self
            .post("/api/users/login", &LoginRequest { email, password })
            .await?;
        Ok(response.token)
    }

    /// Income records, filtered server-side by `range`
    pub async fn list_income(&self, range: &DateRange) -> Result<Vec<IncomeRecord>, ApiError> {
        let list: IncomeList = self
            .get(&with_query("/api/income", &range.query_pairs()))
            .await?;
        Ok(list.incomes)
    }

    // The created/updated record in the response is not used: views re-fetch
    // the list after every mutation.

    pub async fn create_income(&self, draft: &IncomeDraft) -> Result<(), ApiError> {
        let _: IgnoredAny = self.post("/api/income", draft).await?;
        Ok(())
    }

    pub async fn update_income(&self, id: &str, draft: &IncomeDraft) -> Result<(), ApiError> {
        let _: IgnoredAny = self.put(&income_path(id), draft).await?;
        Ok(())
    }

    pub async fn delete_income(&self, id: &str) -> Result<(), ApiError> {
        let _: IgnoredAny = self.delete(&income_path(id)).await?;
        Ok(())
    }

    pub async fn get_settings(&self) -> Result<StoredSettings, ApiError> {
        let envelope: SettingsEnvelope = self.get("/api/income-settings").await?;
        Ok(envelope.settings.unwrap_or_default())
    }

    pub async fn save_settings(&self, settings: &IncomeSettings) -> Result<(), ApiError> {
        let _: IgnoredAny = self.post("/api/income-settings", settings).await?;
        Ok(())
    }

    pub async fn income_by_source(&self, query: &ChartQuery) -> Result<Vec<SourceTotal>, ApiError> {
        let response: BySourceResponse = self.get(&chart_path("by-source", query)).await?;
        Ok(response.income_by_source)
    }

    pub async fn income_by_date(&self, query: &ChartQuery) -> Result<Vec<DateBucket>, ApiError> {
        let response: ByDateResponse = self.get(&chart_path("by-date", query)).await?;
        Ok(response.income_by_date)
    }

    pub async fn income_total(&self, query: &ChartQuery) -> Result<Option<IncomeSummary>, ApiError> {
        let response: TotalResponse = self.get(&chart_path("total", query)).await?;
        Ok(response.total_income)
    }

    pub async fn trends_by_source(&self, query: &ChartQuery) -> Result<Vec<TrendPoint>, ApiError> {
        let response: TrendsResponse = self.get(&chart_path("trends-by-source", query)).await?;
        Ok(response.income_trends)
    }

    /// Fetch the three overview series concurrently, then the per-source
    /// trend when `query.source` is set.
    pub async fn fetch_charts(&self, query: &ChartQuery) -> Result<ChartData, ApiError> {
        let overview = ChartQuery {
            source: None,
            ..query.clone()
        };

        let (by_source, by_date, summary) = tokio::try_join!(
            self.income_by_source(&overview),
            self.income_by_date(&overview),
            self.income_total(&overview),
        )?;

        let trends = match &query.source {
            Some(_) => self.trends_by_source(query).await?,
            None => Vec::new(),
        };

        Ok(ChartData {
            by_source,
            by_date,
            summary,
            trends,
        })
    }
}

fn income_path(id: &str) -> String {
    format!("/api/income/{}", urlencoding::encode(id))
}

fn chart_path(name: &str, query: &ChartQuery) -> String {
    with_query(&format!("/api/income-charts/{}", name), &query.query_pairs())
}

/// Append URL-encoded query parameters to `path`
fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }

    let query = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", path, query)
}
