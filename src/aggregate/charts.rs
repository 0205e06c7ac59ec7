//! Chart series derivation.
//!
//! The API already aggregates; these only map its rows onto label/value
//! pairs. An empty payload yields `None` so the view can hide the chart.

use crate::models::{DateBucket, SourceTotal, TrendPoint};

/// Labelled values ready for plotting
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn from_rows<T>(
        title: impl Into<String>,
        rows: &[T],
        label: impl Fn(&T) -> String,
        value: impl Fn(&T) -> f64,
    ) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        Some(Self {
            title: title.into(),
            labels: rows.iter().map(label).collect(),
            values: rows.iter().map(value).collect(),
        })
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Largest value, or zero for an all-negative or empty series
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// Upper-case the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn source_series(rows: &[SourceTotal]) -> Option<ChartSeries> {
    ChartSeries::from_rows("Income by Source", rows, |r| capitalize(&r.source), |r| r.total_income)
}

pub fn income_over_time(rows: &[DateBucket]) -> Option<ChartSeries> {
    ChartSeries::from_rows("Income Over Time", rows, |r| r.label.clone(), |r| r.total_income)
}

pub fn heads_over_time(rows: &[DateBucket]) -> Option<ChartSeries> {
    ChartSeries::from_rows(
        "Number of Heads Over Time",
        rows,
        |r| r.label.clone(),
        |r| r.total_heads as f64,
    )
}

pub fn trend_series(source: &str, rows: &[TrendPoint]) -> Option<ChartSeries> {
    ChartSeries::from_rows(
        format!("Income Trend for {}", capitalize(source)),
        rows,
        |r| r.label.clone(),
        |r| r.total_income,
    )
}

/// Sources offered in the trend selector, in API order
pub fn available_sources(rows: &[SourceTotal]) -> Vec<String> {
    rows.iter().map(|r| r.source.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("mike"), "Mike");
        assert_eq!(capitalize("ñino"), "Ñino");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_source_series_passes_values_through() {
        let rows = vec![
            SourceTotal { source: "mike".to_string(), total_income: 900.0 },
            SourceTotal { source: "ana".to_string(), total_income: 450.5 },
        ];
        let series = source_series(&rows).unwrap();

        assert_eq!(series.labels, vec!["Mike", "Ana"]);
        assert_eq!(series.values, vec![900.0, 450.5]);
        assert_eq!(series.max_value(), 900.0);
        assert_eq!(available_sources(&rows), vec!["mike", "ana"]);
    }

    #[test]
    fn test_date_series() {
        let rows = vec![
            DateBucket { label: "2024-03".to_string(), total_income: 1200.0, total_heads: 12 },
            DateBucket { label: "2024-04".to_string(), total_income: 0.0, total_heads: 0 },
        ];

        let income = income_over_time(&rows).unwrap();
        let heads = heads_over_time(&rows).unwrap();
        assert_eq!(income.values, vec![1200.0, 0.0]);
        assert_eq!(heads.values, vec![12.0, 0.0]);
        assert_eq!(heads.points().next(), Some(("2024-03", 12.0)));
    }

    #[test]
    fn test_empty_payloads_hide_charts() {
        assert!(source_series(&[]).is_none());
        assert!(income_over_time(&[]).is_none());
        assert!(trend_series("mike", &[]).is_none());
    }

    #[test]
    fn test_trend_title() {
        let rows = vec![TrendPoint { label: "2024-03-04".to_string(), total_income: 300.0 }];
        assert_eq!(trend_series("mike", &rows).unwrap().title, "Income Trend for Mike");
    }
}
