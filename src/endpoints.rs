//! The API endpoints URIs.

/// The route that replaces the stored transactions with the seed document.
pub const INITIALIZE_API: &str = "/api/initialize";
/// The route for listing transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for the monthly sales statistics.
pub const STATISTICS_API: &str = "/api/statistics";
/// The route for the transaction counts per price bucket.
pub const BAR_CHART_API: &str = "/api/bar-chart";
/// The route for the transaction counts per category.
pub const PIE_CHART_API: &str = "/api/pie-chart";

/// The dashboard page.
pub const DASHBOARD_VIEW: &str = "/";
/// The route the dashboard's month selector posts to.
pub const DASHBOARD_MONTH: &str = "/month";
