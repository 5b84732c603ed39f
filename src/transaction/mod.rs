//! Sales transactions: the model, the store queries and the JSON API handlers.

mod core;
mod filter;
mod handlers;
mod price_range;
mod query;

pub use self::core::{
    NewTransaction, Transaction, TransactionId, create_transaction_table, get_all_transactions,
    replace_all_transactions,
};
pub use filter::TransactionFilter;
pub use handlers::{
    get_bar_chart_endpoint, get_pie_chart_endpoint, get_statistics_endpoint,
    list_transactions_endpoint,
};
pub use price_range::{PRICE_RANGES, PriceRange, PriceRangeCount};
pub use query::{CategoryCount, Statistics, TransactionPage};
