//! Database queries behind the list, statistics and chart endpoints.

use rusqlite::{Connection, Row, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::Error;

use super::{
    core::{Transaction, map_transaction_row},
    filter::TransactionFilter,
    price_range::{PRICE_RANGES, PriceRangeCount},
};

/// The page number to default to when not specified in a request.
pub const DEFAULT_PAGE: u64 = 1;
/// The number of transactions per page when not specified in a request.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// One page of transactions and the number of matches across all pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    /// The transactions on the requested page, in store order.
    pub transactions: Vec<Transaction>,
    /// The total number of transactions that matched, ignoring pagination.
    pub total: u64,
}

/// Sales totals for a month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of all matching transactions, sold or not.
    pub total_sale_amount: f64,
    /// How many matching transactions were sold.
    pub total_sold_items: u64,
    /// How many matching transactions were not sold.
    pub total_not_sold_items: u64,
}

/// The number of transactions in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category name.
    pub category: String,
    /// How many transactions are in the category.
    pub count: u64,
}

/// Get a page of transactions matching `filter`, in store order.
///
/// `page` is 1-based and a page of 0 is treated as the first page. A
/// `per_page` of 0 disables the limit and returns every match after the
/// offset.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn query_transactions(
    filter: &TransactionFilter,
    page: u64,
    per_page: u64,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let (where_clause, query_parameters) = filter.to_sql();

    let offset = i64::try_from(page.saturating_sub(1).saturating_mul(per_page))
        .unwrap_or(i64::MAX);
    let limit = if per_page == 0 {
        // A negative limit means no limit in SQLite.
        -1
    } else {
        i64::try_from(per_page).unwrap_or(i64::MAX)
    };

    let query = format!(
        "SELECT id, title, description, price, sold, date_of_sale, category \
         FROM \"transaction\" {where_clause} \
         ORDER BY id ASC LIMIT {limit} OFFSET {offset}"
    );

    let transactions = connection
        .prepare(&query)?
        .query_map(params_from_iter(query_parameters.iter()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    let total = count_transactions(filter, connection)?;

    Ok(TransactionPage {
        transactions,
        total,
    })
}

/// Count the transactions matching `filter`.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn count_transactions(filter: &TransactionFilter, connection: &Connection) -> Result<u64, Error> {
    let (where_clause, query_parameters) = filter.to_sql();

    connection
        .query_row(
            &format!("SELECT COUNT(id) FROM \"transaction\" {where_clause}"),
            params_from_iter(query_parameters.iter()),
            |row| get_count(row, 0),
        )
        .map_err(|error| error.into())
}

/// Calculate the sales totals for the transactions matching `filter`.
///
/// The sale amount is zero when nothing matches.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_statistics(filter: &TransactionFilter, connection: &Connection) -> Result<Statistics, Error> {
    let (where_clause, query_parameters) = filter.to_sql();

    let query = format!(
        "SELECT COALESCE(SUM(price), 0.0), COALESCE(SUM(sold), 0), COALESCE(SUM(NOT sold), 0) \
         FROM \"transaction\" {where_clause}"
    );

    connection
        .query_row(&query, params_from_iter(query_parameters.iter()), |row| {
            Ok(Statistics {
                total_sale_amount: row.get(0)?,
                total_sold_items: get_count(row, 1)?,
                total_not_sold_items: get_count(row, 2)?,
            })
        })
        .map_err(|error| error.into())
}

/// Count the transactions matching `filter` in each of the ten price buckets.
///
/// Every bucket is returned, in bucket order, including empty ones.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn count_by_price_range(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<PriceRangeCount>, Error> {
    PRICE_RANGES
        .iter()
        .map(|range| {
            let count = count_transactions(&filter.clone().price_range(*range), connection)?;

            Ok(PriceRangeCount {
                range: range.label.to_owned(),
                count,
            })
        })
        .collect()
}

/// Count the transactions matching `filter` per category.
///
/// Categories without matches are not included. Categories are ordered by
/// their first appearance in the store.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn count_by_category(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<CategoryCount>, Error> {
    let (where_clause, query_parameters) = filter.to_sql();

    let query = format!(
        "SELECT category, COUNT(id) FROM \"transaction\" {where_clause} \
         GROUP BY category ORDER BY MIN(id) ASC"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(query_parameters.iter()), |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                count: get_count(row, 1)?,
            })
        })?
        .map(|count_result| count_result.map_err(Error::SqlError))
        .collect()
}

/// SQLite integers are signed, counts are never negative.
fn get_count(row: &Row, index: usize) -> Result<u64, rusqlite::Error> {
    let count: i64 = row.get(index)?;

    Ok(count.max(0).unsigned_abs())
}
