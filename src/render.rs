//! Text Rendering
//!
//! Plain-text views of page state for the terminal front-end. Everything
//! returns a `String` so the shell and the one-shot commands share it.

use std::fmt::Write;

use crate::aggregate::{ChartSeries, SortConfig, SortField, Totals};
use crate::app::Section;
use crate::models::{IncomeRecord, IncomeSummary};
use crate::pages::{ChartsPage, DashboardPage, IncomePage, LoginPage, SettingsPage};
use crate::state::Flash;

/// Width of the longest bar in a text chart
const BAR_WIDTH: usize = 40;

pub fn currency(amount: f64) -> String {
    format!("₱{:.2}", amount)
}

/// Income table. When `sort` is given, headers carry sort indicators.
pub fn records_table(rows: &[IncomeRecord], sort: Option<SortConfig>) -> String {
    if rows.is_empty() {
        return "No income records found.\n".to_string();
    }

    let header = |field: SortField| match sort {
        Some(config) => format!("{} {}", field.label(), config.indicator(field)),
        None => field.label().to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<26} {:<18} {:>11} {:<6} {:>14} {:<14}",
        "ID",
        header(SortField::Source),
        header(SortField::NumberOfHeads),
        "Owner",
        header(SortField::Income),
        header(SortField::CreatedAt),
    );
    let _ = writeln!(out, "{}", "-".repeat(94));

    for record in rows {
        let _ = writeln!(
            out,
            "{:<26} {:<18} {:>11} {:<6} {:>14} {:<14}",
            record.id,
            record.source,
            record.number_of_heads,
            if record.owner_flag() { "yes" } else { "no" },
            currency(record.income),
            record.created_at.display_date(),
        );
    }
    out
}

pub fn totals_cards(totals: &Totals) -> String {
    format!(
        "Total Income: {}   Total Customers: {}   Average per Head: {}\n",
        currency(totals.total_income),
        totals.total_heads,
        currency(totals.average_per_head),
    )
}

pub fn summary_cards(summary: &IncomeSummary) -> String {
    format!(
        "Total Income: {}   Total Heads: {}   Average per Head: {}\n",
        currency(summary.total_income),
        summary.total_heads,
        currency(summary.average_per_head()),
    )
}

/// Horizontal bar chart scaled to the largest value
pub fn bar_chart(series: &ChartSeries) -> String {
    let mut out = format!("{}\n", series.title);
    let label_width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max = series.max_value();

    for (label, value) in series.points() {
        let len = if max > 0.0 && value > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<width$} | {:<bar$} {}",
            label,
            "█".repeat(len),
            format_value(value),
            width = label_width,
            bar = BAR_WIDTH,
        );
    }
    out
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn flash_line(out: &mut String, flash: Option<&Flash>) {
    if let Some(flash) = flash {
        let _ = writeln!(out, "{}\n", flash);
    }
}

fn error_line(out: &mut String, error: Option<&str>) {
    if let Some(error) = error {
        let _ = writeln!(out, "✕ {}\n", error);
    }
}

pub fn login(page: &LoginPage) -> String {
    let mut out = String::from("== Login ==\n");
    error_line(&mut out, page.error());
    if page.is_submitting() {
        out.push_str("Logging in...\n");
    }
    out
}

pub fn dashboard(page: &DashboardPage) -> String {
    let mut out = format!("== {} ==\nFilter: {}\n\n", Section::Dashboard.title(), page.filter());
    error_line(&mut out, page.error());
    if page.is_loading() {
        out.push_str("Loading...\n");
    }
    out.push_str(&totals_cards(&page.totals()));
    out.push('\n');
    out.push_str(&records_table(&page.rows(), Some(page.sort())));
    out
}

pub fn income(page: &IncomePage) -> String {
    let mut out = format!("== {} ==\n", Section::AddIncome.title());
    flash_line(&mut out, page.flash());
    error_line(&mut out, page.load_error());

    match page.editing() {
        Some(id) => {
            let _ = writeln!(out, "Editing record {}", id);
        }
        None => out.push_str("New record\n"),
    }
    let form = &page.form;
    let _ = writeln!(
        out,
        "  Source: {}\n  Number of heads: {}\n  Owner: {}\n",
        form.source,
        form.number_of_heads,
        if form.is_owner { "yes" } else { "no" },
    );

    out.push_str(&records_table(page.records(), None));
    out
}

pub fn charts(page: &ChartsPage) -> String {
    let query = page.query();
    let mut out = format!(
        "== {} ==\nRange: {}   Granularity: {}   Source: {}\n",
        Section::Charts.title(),
        query.range,
        query.granularity,
        query.source.as_deref().unwrap_or("(all)"),
    );
    if !page.available_sources().is_empty() {
        let _ = writeln!(out, "Sources: {}", page.available_sources().join(", "));
    }
    out.push('\n');
    error_line(&mut out, page.error());
    if page.is_loading() {
        out.push_str("Loading...\n");
    }

    if let Some(summary) = page.summary() {
        out.push_str(&summary_cards(summary));
        out.push('\n');
    }

    let charts = [
        page.source_chart(),
        page.income_chart(),
        page.heads_chart(),
        page.trend_chart(),
    ];
    let mut any = false;
    for series in charts.iter().flatten() {
        out.push_str(&bar_chart(series));
        out.push('\n');
        any = true;
    }
    if !any {
        out.push_str("No data for the selected range.\n");
    }
    out
}

pub fn settings(page: &SettingsPage) -> String {
    let mut out = format!("== {} ==\n", Section::Settings.title());
    flash_line(&mut out, page.flash());
    error_line(&mut out, page.load_error());
    if page.is_loading() {
        out.push_str("Loading...\n");
    }
    let _ = writeln!(
        out,
        "  Haircut price: {}\n  Owner share percentage: {}",
        display_or_unset(&page.haircut_price),
        display_or_unset(&page.owner_share_percentage),
    );
    out
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
