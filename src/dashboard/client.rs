//! Reading dashboard data from the data service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    Error, Month, endpoints,
    transaction::{CategoryCount, PriceRangeCount, Statistics, TransactionPage},
};

/// The four reads the dashboard makes for a month.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// The first page of transactions for `month`, with no search.
    async fn transactions(&self, month: Month) -> Result<TransactionPage, Error>;

    /// The sales totals for `month`.
    async fn statistics(&self, month: Month) -> Result<Statistics, Error>;

    /// The transaction counts per price bucket for `month`.
    async fn bar_chart(&self, month: Month) -> Result<Vec<PriceRangeCount>, Error>;

    /// The transaction counts per category for `month`.
    async fn pie_chart(&self, month: Month) -> Result<Vec<CategoryCount>, Error>;
}

/// Reads from a data service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: Client,
    base_url: String,
}

impl HttpDataSource {
    /// Create a client for the data service at `base_url`, e.g. "http://localhost:5000".
    ///
    /// # Errors
    /// Returns an [Error::DataServiceError] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|error| Error::DataServiceError(error.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, month: Month) -> Result<T, Error> {
        let url = format!("{}{endpoint}", self.base_url);

        self.client
            .get(&url)
            .query(&[("month", month.as_str())])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| Error::DataServiceError(error.to_string()))?
            .json()
            .await
            .map_err(|error| Error::DataServiceError(error.to_string()))
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn transactions(&self, month: Month) -> Result<TransactionPage, Error> {
        self.get_json(endpoints::TRANSACTIONS_API, month).await
    }

    async fn statistics(&self, month: Month) -> Result<Statistics, Error> {
        self.get_json(endpoints::STATISTICS_API, month).await
    }

    async fn bar_chart(&self, month: Month) -> Result<Vec<PriceRangeCount>, Error> {
        self.get_json(endpoints::BAR_CHART_API, month).await
    }

    async fn pie_chart(&self, month: Month) -> Result<Vec<CategoryCount>, Error> {
        self.get_json(endpoints::PIE_CHART_API, month).await
    }
}
