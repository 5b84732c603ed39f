//! Dashboard module
//!
//! A server-rendered page that shows the transactions, statistics and charts
//! for one month, read from the data service over HTTP.

mod charts;
mod client;
mod handlers;
mod state;

pub use client::{DataSource, HttpDataSource};
pub use handlers::build_dashboard_router;
pub use state::{Dashboard, DashboardSnapshot};
