//! Seeding the store from a remote JSON document.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use reqwest::Client;
use serde_json::json;

use crate::{AppState, Error, transaction::NewTransaction, transaction::replace_all_transactions};

/// The seed document fetched by the initialize endpoint unless another URL is configured.
pub const DEFAULT_SEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// A source of transactions for seeding the store.
#[async_trait]
pub trait SeedSource: Send + Sync {
    /// Fetch the full list of transactions to seed the store with.
    ///
    /// # Errors
    /// Returns an [Error::UpstreamFetchError] if the source is unreachable or
    /// its content is not a JSON array of transactions.
    async fn fetch(&self) -> Result<Vec<NewTransaction>, Error>;

    /// A short description of where the transactions come from, for logging.
    fn describe(&self) -> String;
}

/// Fetches the seed document over HTTP, fresh on every call.
#[derive(Debug, Clone)]
pub struct HttpSeedSource {
    client: Client,
    url: String,
}

impl HttpSeedSource {
    /// Create a seed source for the JSON document at `url`.
    ///
    /// # Errors
    /// Returns an [Error::UpstreamFetchError] if the HTTP client cannot be built.
    pub fn new(url: &str) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("sales-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| Error::UpstreamFetchError(error.to_string()))?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }
}

#[async_trait]
impl SeedSource for HttpSeedSource {
    async fn fetch(&self) -> Result<Vec<NewTransaction>, Error> {
        tracing::debug!("Fetching seed data from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| Error::UpstreamFetchError(error.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|error| Error::UpstreamFetchError(error.to_string()))?;

        serde_json::from_slice(&body).map_err(|error| {
            Error::UpstreamFetchError(format!(
                "response is not a JSON array of transactions: {error}"
            ))
        })
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Replace every stored transaction with the contents of the seed source.
///
/// The seed source is read before the store is touched, so a failed fetch
/// leaves the current transactions in place.
pub async fn initialize_endpoint(State(state): State<AppState>) -> Response {
    const MESSAGE: &str = "Failed to initialize database";

    let transactions = match state.seed_source.fetch().await {
        Ok(transactions) => transactions,
        Err(error) => return error.into_api_response(MESSAGE),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_api_response(MESSAGE);
        }
    };

    match replace_all_transactions(&transactions, &connection) {
        Ok(count) => {
            tracing::info!(
                "Seeded {count} transactions from {}",
                state.seed_source.describe()
            );
            Json(json!({ "message": "Database initialized with seed data." })).into_response()
        }
        Err(error) => error.into_api_response(MESSAGE),
    }
}
