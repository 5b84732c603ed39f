//! Sales Dashboard is a small web app for exploring a collection of sales
//! transactions.
//!
//! This library provides two things:
//! - a JSON REST API (the data service) that seeds a SQLite store from a remote
//!   document and answers list, statistics and chart queries by month, and
//! - a server-rendered dashboard that reads from the data service over HTTP
//!   and displays the results as a list, summary statistics and two charts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod logging;
mod month;
mod routing;
mod seed;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use dashboard::{Dashboard, DashboardSnapshot, DataSource, HttpDataSource, build_dashboard_router};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, add_tracing_layer, logging_middleware, setup_logging};
pub use month::Month;
pub use routing::build_router;
pub use seed::{DEFAULT_SEED_URL, HttpSeedSource, SeedSource};
pub use transaction::{
    CategoryCount, NewTransaction, PriceRange, PriceRangeCount, Statistics, Transaction,
    TransactionFilter, TransactionId, TransactionPage, get_all_transactions,
    replace_all_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The seed document could not be fetched, or it was not a JSON array of
    /// transactions.
    #[error("could not fetch seed data: {0}")]
    UpstreamFetchError(String),

    /// Clearing or populating the transaction table failed.
    ///
    /// The seed runs inside a single SQL transaction, so the previous
    /// contents of the store are still intact when this error is returned.
    #[error("could not write transactions to the store: {0}")]
    StoreWriteError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The query string could not be decoded into the expected parameters,
    /// e.g. `page=abc`.
    #[error("invalid query parameters: {0}")]
    InvalidQuery(String),

    /// A month selected in the dashboard was not a two-digit month.
    #[error("\"{0}\" is not a valid month, expected a two-digit month from 01 to 12")]
    InvalidMonth(String),

    /// A request from the dashboard to the data service failed.
    #[error("the data service request failed: {0}")]
    DataServiceError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl Error {
    /// Convert the error into the JSON error body used by every API endpoint.
    ///
    /// All API failures are reported as 500 with `message` as the generic
    /// error and the error's text as the details.
    fn into_api_response(self, message: &str) -> Response {
        tracing::error!("{message}: {self}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": message,
                "details": self.to_string(),
            })),
        )
            .into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidMonth(ref month) => html::alert_response(
                StatusCode::BAD_REQUEST,
                "Invalid month",
                &format!("\"{month}\" is not a month. Pick a month from the list."),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                html::alert_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
            }
        }
    }
}
