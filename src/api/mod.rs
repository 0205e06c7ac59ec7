//! Income API Client
//!
//! HTTP access to the barbershop income REST API.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/users/login` - Exchange credentials for a bearer token
//!
//! ## Income
//! - `GET /api/income?startDate=&endDate=` - List records
//! - `POST /api/income` - Create a record
//! - `PUT /api/income/:id` - Update a record
//! - `DELETE /api/income/:id` - Delete a record
//!
//! ## Settings
//! - `GET /api/income-settings` - Haircut price and owner share
//! - `POST /api/income-settings` - Save them
//!
//! ## Charts
//! - `GET /api/income-charts/by-source`
//! - `GET /api/income-charts/by-date`
//! - `GET /api/income-charts/total`
//! - `GET /api/income-charts/trends-by-source`
//!
//! Chart endpoints take `startDate`, `endDate`, `granularity` and (trends
//! only) `source` query parameters.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{ApiClient, BearerAuth, Interceptor};
pub use endpoints::ChartData;
pub use error::ApiError;
