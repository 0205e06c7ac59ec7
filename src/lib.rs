//! # Barbershop
//!
//! Client for a barbershop's income API: one operator logs in, records
//! per-barber income entries, and reviews dashboards and trend charts.
//! Storage and income computation belong to the server; this crate only
//! calls it.
//!
//! ## Modules
//!
//! - [`session`]: bearer-token storage (cookie jar plus legacy fallback)
//! - [`api`]: HTTP gateway and typed endpoints
//! - [`aggregate`]: sorting, totals and chart series over fetched records
//! - [`guard`]: login / home route guard
//! - [`pages`]: per-screen state machines
//! - [`app`]: composition root tying the above together
//! - [`shell`], [`render`]: terminal front-end
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use barbershop::{App, Config, Section};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let mut app = App::new(&config)?;
//!
//!     app.login.email = "owner@example.com".to_string();
//!     app.login.password = "secret".to_string();
//!     if app.login().await {
//!         app.select_section(Section::Charts).await;
//!         println!("{}", barbershop::render::charts(&app.charts));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod app;
pub mod config;
pub mod guard;
pub mod logging;
pub mod models;
pub mod pages;
pub mod render;
pub mod session;
pub mod shell;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-export top-level types for convenience
pub use aggregate::{ChartSeries, SortConfig, SortDirection, SortField, Totals};

pub use api::{ApiClient, ApiError, BearerAuth, ChartData, Interceptor};

pub use app::{App, AppError, Section};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, SessionConfig};

pub use guard::{AuthState, Navigation, Route, RouteGuard};

pub use models::{
    ChartQuery, DateRange, Granularity, IncomeDraft, IncomeRecord, IncomeSettings, IncomeSummary,
    Timestamp,
};

pub use session::{CredentialStore, SessionError, SessionStore};
