//! Defines the core data models and database functions for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// A product listing and whether it sold.
///
/// Transactions are only ever created in bulk by seeding the store, see
/// [replace_all_transactions].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID assigned by the store on insert.
    pub id: TransactionId,
    /// The name of the product.
    pub title: String,
    /// A longer text description of the product.
    pub description: String,
    /// The listed price.
    pub price: f64,
    /// Whether the product has been sold.
    pub sold: bool,
    /// When the sale happened, as the ISO-8601 text it was seeded with, e.g.
    /// "2021-11-27T20:29:54+05:30".
    pub date_of_sale: String,
    /// The product category, e.g. "electronics".
    pub category: String,
}

impl Transaction {
    /// Create a new transaction to be inserted into the store.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(price: f64, date_of_sale: &str) -> NewTransaction {
        NewTransaction {
            price,
            date_of_sale: date_of_sale.to_owned(),
            ..Default::default()
        }
    }
}

/// A transaction that has not been assigned an ID yet.
///
/// This is also the shape of the objects in the seed document. Fields missing
/// from a seed object fall back to their defaults and unknown fields (e.g. the
/// upstream `id` or `image`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// The name of the product.
    #[serde(default)]
    pub title: String,
    /// A longer text description of the product.
    #[serde(default)]
    pub description: String,
    /// The listed price.
    #[serde(default)]
    pub price: f64,
    /// Whether the product has been sold.
    #[serde(default)]
    pub sold: bool,
    /// When the sale happened.
    #[serde(default)]
    pub date_of_sale: String,
    /// The product category.
    #[serde(default)]
    pub category: String,
}

impl NewTransaction {
    /// Set the title of the transaction.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    /// Set the description of the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set whether the product was sold.
    pub fn sold(mut self, sold: bool) -> Self {
        self.sold = sold;
        self
    }

    /// Set the category of the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table if it does not exist yet.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                sold INTEGER NOT NULL,
                date_of_sale TEXT NOT NULL,
                category TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Replace every transaction in the store with `transactions`.
///
/// Transactions are inserted in the order given, which becomes the natural
/// order of list queries. The delete and the inserts share one SQL
/// transaction: if any statement fails, the previous contents are kept.
///
/// # Errors
/// Returns an [Error::StoreWriteError] if the delete or any insert fails.
pub fn replace_all_transactions(
    transactions: &[NewTransaction],
    connection: &Connection,
) -> Result<usize, Error> {
    let write = || -> Result<usize, rusqlite::Error> {
        // Using unchecked_transaction because we only have &Connection from the MutexGuard.
        let tx = connection.unchecked_transaction()?;

        tx.execute("DELETE FROM \"transaction\"", ())?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO \"transaction\" (title, description, price, sold, date_of_sale, category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for transaction in transactions {
                inserted += stmt.execute((
                    &transaction.title,
                    &transaction.description,
                    transaction.price,
                    transaction.sold,
                    &transaction.date_of_sale,
                    &transaction.category,
                ))?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    };

    write().map_err(|error| {
        tracing::error!("could not replace transactions: {error}");
        Error::StoreWriteError(error.to_string())
    })
}

/// Get every transaction in the store in insertion order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, title, description, price, sold, date_of_sale, category
             FROM \"transaction\" ORDER BY id ASC",
        )?
        .query_map([], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Map a row with the columns `id, title, description, price, sold,
/// date_of_sale, category` (in that order) to a [Transaction].
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        sold: row.get(4)?,
        date_of_sale: row.get(5)?,
        category: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{NewTransaction, Transaction, get_all_transactions, replace_all_transactions};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn seed_data() -> Vec<NewTransaction> {
        vec![
            Transaction::build(50.0, "2024-03-01T00:00:00.000Z")
                .title("Backpack")
                .sold(true)
                .category("A"),
            Transaction::build(150.0, "2024-03-15T00:00:00.000Z")
                .title("Jacket")
                .category("B"),
        ]
    }

    #[test]
    fn replace_inserts_in_order() {
        let conn = get_test_connection();

        let inserted = replace_all_transactions(&seed_data(), &conn).unwrap();

        assert_eq!(inserted, 2);
        let got = get_all_transactions(&conn).unwrap();
        let titles: Vec<_> = got.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Backpack", "Jacket"]);
        assert!(got[0].sold);
        assert_eq!(got[1].price, 150.0);
    }

    #[test]
    fn replace_removes_previous_transactions() {
        let conn = get_test_connection();
        replace_all_transactions(&seed_data(), &conn).unwrap();

        let replacement = [Transaction::build(9.99, "2024-05-02").title("Mug")];
        replace_all_transactions(&replacement, &conn).unwrap();

        let got = get_all_transactions(&conn).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].title, "Mug");
    }

    #[test]
    fn replacing_twice_gives_identical_contents() {
        let conn = get_test_connection();

        replace_all_transactions(&seed_data(), &conn).unwrap();
        let first = get_all_transactions(&conn).unwrap();
        replace_all_transactions(&seed_data(), &conn).unwrap();
        let second = get_all_transactions(&conn).unwrap();

        assert_eq!(first.len(), second.len());
        let strip_ids = |transactions: Vec<Transaction>| -> Vec<Transaction> {
            transactions
                .into_iter()
                .map(|transaction| Transaction { id: 0, ..transaction })
                .collect()
        };
        assert_eq!(strip_ids(first), strip_ids(second));
    }

    #[test]
    fn replace_with_empty_clears_store() {
        let conn = get_test_connection();
        replace_all_transactions(&seed_data(), &conn).unwrap();

        replace_all_transactions(&[], &conn).unwrap();

        assert!(get_all_transactions(&conn).unwrap().is_empty());
    }

    #[test]
    fn failed_replace_keeps_previous_contents() {
        let conn = get_test_connection();
        replace_all_transactions(&seed_data(), &conn).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_mugs BEFORE INSERT ON \"transaction\"
             WHEN NEW.title = 'Mug'
             BEGIN SELECT RAISE(ABORT, 'no mugs'); END;",
        )
        .unwrap();

        let replacement = [
            Transaction::build(1.0, "2024-05-02").title("Plate"),
            Transaction::build(2.0, "2024-05-02").title("Mug"),
        ];
        let result = replace_all_transactions(&replacement, &conn);

        assert!(
            matches!(result, Err(Error::StoreWriteError(_))),
            "got {result:?}"
        );
        let titles: Vec<_> = get_all_transactions(&conn)
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["Backpack", "Jacket"]);
    }

    #[test]
    fn seed_object_ignores_unknown_fields_and_defaults_missing_ones() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 329.85,
            "image": "https://example.com/81fPKd-2AYL._AC_SL1500_.jpg",
            "sold": false,
            "dateOfSale": "2021-11-27T20:29:54+05:30"
        }"#;

        let got: NewTransaction = serde_json::from_str(json).unwrap();

        assert_eq!(
            got,
            Transaction::build(329.85, "2021-11-27T20:29:54+05:30").title("Fjallraven Backpack")
        );
    }
}
