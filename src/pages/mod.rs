//! Page Views
//!
//! Framework-free state for each screen. A page owns its local state, does
//! its I/O through the [`ApiClient`](crate::api::ApiClient) and turns every
//! failure into an inline message; nothing here is fatal.
//!
//! Pages that fetch split each load into `begin_load` / `finish_load` so a
//! response that was overtaken by a newer request is dropped.

pub mod charts;
pub mod dashboard;
pub mod income;
pub mod login;
pub mod settings;

pub use charts::ChartsPage;
pub use dashboard::DashboardPage;
pub use income::{IncomeForm, IncomePage};
pub use login::LoginPage;
pub use settings::SettingsPage;
