//! JSON route handlers for listing and summarising transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error};

use super::{
    filter::TransactionFilter,
    query::{
        DEFAULT_PAGE, DEFAULT_PER_PAGE, count_by_category, count_by_price_range, get_statistics,
        query_transactions,
    },
};

/// The state needed by the transaction query handlers.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for querying transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Two-digit month, e.g. "03". All months are listed when missing.
    pub month: Option<String>,
    /// Free text to look for in the title or description.
    #[serde(default)]
    pub search: String,
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The maximum number of transactions per page.
    pub per_page: Option<u64>,
}

/// Query parameters for the statistics and chart endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    /// Two-digit month, e.g. "03". All months are included when missing.
    pub month: Option<String>,
}

/// List a page of transactions for a month, optionally narrowed by a search.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Response {
    const MESSAGE: &str = "Failed to fetch transactions";

    let result = extract(params).and_then(|params| {
        let filter = TransactionFilter::for_month(params.month.as_deref()).search(&params.search);

        with_connection(&state, |connection| {
            query_transactions(
                &filter,
                params.page.unwrap_or(DEFAULT_PAGE),
                params.per_page.unwrap_or(DEFAULT_PER_PAGE),
                connection,
            )
        })
    });

    json_response(result, MESSAGE)
}

/// Get the total sale amount and the sold/not sold counts for a month.
pub async fn get_statistics_endpoint(
    State(state): State<TransactionState>,
    params: Result<Query<MonthParams>, QueryRejection>,
) -> Response {
    const MESSAGE: &str = "Failed to fetch statistics";

    let result = extract(params).and_then(|params| {
        let filter = TransactionFilter::for_month(params.month.as_deref());
        with_connection(&state, |connection| get_statistics(&filter, connection))
    });

    json_response(result, MESSAGE)
}

/// Get the number of transactions per price bucket for a month.
pub async fn get_bar_chart_endpoint(
    State(state): State<TransactionState>,
    params: Result<Query<MonthParams>, QueryRejection>,
) -> Response {
    const MESSAGE: &str = "Failed to fetch bar chart data";

    let result = extract(params).and_then(|params| {
        let filter = TransactionFilter::for_month(params.month.as_deref());
        with_connection(&state, |connection| count_by_price_range(&filter, connection))
    });

    json_response(result, MESSAGE)
}

/// Get the number of transactions per category for a month.
pub async fn get_pie_chart_endpoint(
    State(state): State<TransactionState>,
    params: Result<Query<MonthParams>, QueryRejection>,
) -> Response {
    const MESSAGE: &str = "Failed to fetch pie chart data";

    let result = extract(params).and_then(|params| {
        let filter = TransactionFilter::for_month(params.month.as_deref());
        with_connection(&state, |connection| count_by_category(&filter, connection))
    });

    json_response(result, MESSAGE)
}

fn extract<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, Error> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| Error::InvalidQuery(rejection.body_text()))
}

fn with_connection<T>(
    state: &TransactionState,
    query: impl FnOnce(&Connection) -> Result<T, Error>,
) -> Result<T, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    query(&connection)
}

fn json_response<T: Serialize>(result: Result<T, Error>, message: &str) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(error) => error.into_api_response(message),
    }
}
