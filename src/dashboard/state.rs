//! The dashboard's selected month and the data last fetched for it.

use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    Error, Month,
    transaction::{CategoryCount, PriceRangeCount, Statistics, Transaction},
};

use super::client::DataSource;

/// Everything the dashboard displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    /// The month the user selected.
    pub month: Month,
    /// The first page of transactions for the month.
    pub transactions: Vec<Transaction>,
    /// The sales totals for the month.
    pub statistics: Statistics,
    /// The transaction counts per price bucket.
    pub bar_chart: Vec<PriceRangeCount>,
    /// The transaction counts per category.
    pub pie_chart: Vec<CategoryCount>,
}

/// Holds the dashboard state and refreshes it from a [DataSource].
///
/// Every month change takes a new sequence token. Responses are only applied
/// while their token is still the latest one issued, so a slow response for
/// a previous month can never overwrite data for the current month.
///
/// There is one selected month per dashboard, not one per client. Every
/// browser served by the same dashboard sees the same month and data.
#[derive(Debug)]
pub struct Dashboard<S> {
    source: S,
    snapshot: Mutex<DashboardSnapshot>,
    latest_request: AtomicU64,
}

impl<S: DataSource> Dashboard<S> {
    /// Create a dashboard with no data for `month`.
    ///
    /// Call [Dashboard::select_month] to load the data.
    pub fn new(source: S, month: Month) -> Self {
        Self {
            source,
            snapshot: Mutex::new(DashboardSnapshot {
                month,
                ..Default::default()
            }),
            latest_request: AtomicU64::new(0),
        }
    }

    /// Select `month` and refresh the data for it.
    ///
    /// The four reads run concurrently and each result replaces its part of
    /// the state as soon as it arrives. A failed read is logged and leaves
    /// the previous data in place.
    ///
    /// Returns the state after all four reads have finished. If another month
    /// was selected in the meantime, this is that month's state.
    pub async fn select_month(&self, month: Month) -> DashboardSnapshot {
        let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Loading dashboard data for month {month} (request {token})");

        self.apply(token, "month", Ok(month), |snapshot, month| {
            snapshot.month = month;
        });

        tokio::join!(
            async {
                let result = self.source.transactions(month).await;
                self.apply(token, "transactions", result, |snapshot, page| {
                    snapshot.transactions = page.transactions;
                });
            },
            async {
                let result = self.source.statistics(month).await;
                self.apply(token, "statistics", result, |snapshot, statistics| {
                    snapshot.statistics = statistics;
                });
            },
            async {
                let result = self.source.bar_chart(month).await;
                self.apply(token, "bar chart", result, |snapshot, bar_chart| {
                    snapshot.bar_chart = bar_chart;
                });
            },
            async {
                let result = self.source.pie_chart(month).await;
                self.apply(token, "pie chart", result, |snapshot, pie_chart| {
                    snapshot.pie_chart = pie_chart;
                });
            },
        );

        self.snapshot()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        match self.snapshot.lock() {
            Ok(snapshot) => snapshot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    fn apply<T>(
        &self,
        token: u64,
        part: &str,
        result: Result<T, Error>,
        update: impl FnOnce(&mut DashboardSnapshot, T),
    ) {
        let value = match result {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("Could not load dashboard {part} (request {token}): {error}");
                return;
            }
        };

        let mut snapshot = match self.snapshot.lock() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::error!("could not acquire the dashboard lock: {error}");
                return;
            }
        };

        // Checked under the lock so a newer request cannot apply in between.
        let latest = self.latest_request.load(Ordering::SeqCst);
        if token != latest {
            tracing::debug!("Discarding stale dashboard {part} (request {token}, latest {latest})");
            return;
        }

        update(&mut snapshot, value);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use crate::{
        Error, Month,
        transaction::{
            CategoryCount, PriceRangeCount, Statistics, Transaction, TransactionPage,
        },
    };

    use super::{Dashboard, DashboardSnapshot, DataSource};

    fn month(text: &str) -> Month {
        text.parse().unwrap()
    }

    /// Returns data derived from the month, optionally holding back one
    /// month's responses until released.
    pub(crate) struct FakeSource {
        held_month: Option<Month>,
        release: Arc<Semaphore>,
        held_started: Arc<AtomicUsize>,
        pub(crate) fail: AtomicBool,
    }

    impl Default for FakeSource {
        fn default() -> Self {
            Self {
                held_month: None,
                release: Arc::new(Semaphore::new(0)),
                held_started: Arc::new(AtomicUsize::new(0)),
                fail: AtomicBool::new(false),
            }
        }
    }

    impl FakeSource {
        fn holding(month: Month) -> Self {
            Self {
                held_month: Some(month),
                ..Default::default()
            }
        }

        async fn respond<T>(&self, month: Month, value: T) -> Result<T, Error> {
            if self.held_month == Some(month) {
                self.held_started.fetch_add(1, Ordering::SeqCst);
                self.release.acquire().await.unwrap().forget();
            }

            if self.fail.load(Ordering::SeqCst) {
                Err(Error::DataServiceError("connection refused".to_owned()))
            } else {
                Ok(value)
            }
        }
    }

    fn number(month: Month) -> u64 {
        month.as_str().parse().unwrap()
    }

    fn transactions_for(month: Month) -> Vec<Transaction> {
        vec![Transaction {
            id: number(month) as i64,
            title: format!("{} item", month.name()),
            description: String::new(),
            price: 10.0,
            sold: true,
            date_of_sale: format!("2024-{month}-01"),
            category: "misc".to_owned(),
        }]
    }

    fn statistics_for(month: Month) -> Statistics {
        Statistics {
            total_sale_amount: number(month) as f64,
            total_sold_items: number(month),
            total_not_sold_items: 0,
        }
    }

    fn bar_chart_for(month: Month) -> Vec<PriceRangeCount> {
        vec![PriceRangeCount {
            range: "0-100".to_owned(),
            count: number(month),
        }]
    }

    fn pie_chart_for(month: Month) -> Vec<CategoryCount> {
        vec![CategoryCount {
            category: month.name(),
            count: 1,
        }]
    }

    pub(crate) fn expected_snapshot(month: Month) -> DashboardSnapshot {
        DashboardSnapshot {
            month,
            transactions: transactions_for(month),
            statistics: statistics_for(month),
            bar_chart: bar_chart_for(month),
            pie_chart: pie_chart_for(month),
        }
    }

    #[async_trait]
    impl DataSource for FakeSource {
        async fn transactions(&self, month: Month) -> Result<TransactionPage, Error> {
            let page = TransactionPage {
                transactions: transactions_for(month),
                total: 1,
            };
            self.respond(month, page).await
        }

        async fn statistics(&self, month: Month) -> Result<Statistics, Error> {
            self.respond(month, statistics_for(month)).await
        }

        async fn bar_chart(&self, month: Month) -> Result<Vec<PriceRangeCount>, Error> {
            self.respond(month, bar_chart_for(month)).await
        }

        async fn pie_chart(&self, month: Month) -> Result<Vec<CategoryCount>, Error> {
            self.respond(month, pie_chart_for(month)).await
        }
    }

    #[test]
    fn starts_empty_for_initial_month() {
        let dashboard = Dashboard::new(FakeSource::default(), month("03"));

        let got = dashboard.snapshot();

        assert_eq!(
            got,
            DashboardSnapshot {
                month: month("03"),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn select_month_loads_all_four_parts() {
        let dashboard = Dashboard::new(FakeSource::default(), month("03"));

        let got = dashboard.select_month(month("05")).await;

        assert_eq!(got, expected_snapshot(month("05")));
        assert_eq!(dashboard.snapshot(), got);
    }

    #[tokio::test]
    async fn failed_reads_keep_previous_data() {
        let dashboard = Dashboard::new(FakeSource::default(), month("03"));
        dashboard.select_month(month("03")).await;

        dashboard.source.fail.store(true, Ordering::SeqCst);
        let got = dashboard.select_month(month("04")).await;

        assert_eq!(
            got,
            DashboardSnapshot {
                month: month("04"),
                ..expected_snapshot(month("03"))
            }
        );
    }

    #[tokio::test]
    async fn stale_responses_are_discarded() {
        let january = month("01");
        let february = month("02");
        let source = FakeSource::holding(january);
        let release = source.release.clone();
        let held_started = source.held_started.clone();
        let dashboard = Arc::new(Dashboard::new(source, month("03")));

        let slow_request = tokio::spawn({
            let dashboard = dashboard.clone();
            async move { dashboard.select_month(january).await }
        });
        while held_started.load(Ordering::SeqCst) < 4 {
            tokio::task::yield_now().await;
        }

        let got = dashboard.select_month(february).await;
        assert_eq!(got, expected_snapshot(february));

        release.add_permits(4);
        let slow_result = slow_request.await.unwrap();

        assert_eq!(slow_result, expected_snapshot(february));
        assert_eq!(dashboard.snapshot(), expected_snapshot(february));
    }

    #[tokio::test]
    async fn latest_selection_wins_after_repeated_changes() {
        let dashboard = Dashboard::new(FakeSource::default(), month("03"));

        for text in ["01", "07", "11", "02"] {
            dashboard.select_month(month(text)).await;
        }

        assert_eq!(dashboard.snapshot(), expected_snapshot(month("02")));
    }
}
