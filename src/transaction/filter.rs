//! A typed builder for the predicates used by the transaction queries.
//!
//! A [TransactionFilter] can be compiled to an SQL `WHERE` clause with bound
//! parameters for the store, or evaluated directly against a [Transaction].
//! Both forms must agree, which the tests below check against a real store.

use rusqlite::types::Value;

use super::{core::Transaction, price_range::PriceRange};

/// Restricts which transactions a query returns.
///
/// Each predicate is optional and all set predicates must hold.
///
/// # Examples
///
/// ```ignore
/// let filter = TransactionFilter::new()
///     .month("03")
///     .search("backpack")
///     .sold(true);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    month: Option<String>,
    search: Option<String>,
    sold: Option<bool>,
    price_range: Option<PriceRange>,
}

impl TransactionFilter {
    /// Create a filter that matches every transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter for `month`, or a filter that matches everything if
    /// there is no month.
    pub fn for_month(month: Option<&str>) -> Self {
        match month {
            Some(month) => Self::new().month(month),
            None => Self::new(),
        }
    }

    /// Only match transactions whose sale date text contains `-{month}-`.
    ///
    /// This is a literal substring match on the stored text, not a calendar
    /// comparison, so dates must be stored as `YYYY-MM-DD...`. The month is
    /// not validated: a value like "13" simply matches nothing.
    pub fn month(mut self, month: &str) -> Self {
        self.month = Some(month.to_owned());
        self
    }

    /// Only match transactions whose title or description contains `search`,
    /// ignoring ASCII case. An empty search matches everything.
    pub fn search(mut self, search: &str) -> Self {
        self.search = if search.is_empty() {
            None
        } else {
            Some(search.to_owned())
        };
        self
    }

    /// Only match transactions that were (or were not) sold.
    pub fn sold(mut self, sold: bool) -> Self {
        self.sold = Some(sold);
        self
    }

    /// Only match transactions priced within `price_range`.
    pub fn price_range(mut self, price_range: PriceRange) -> Self {
        self.price_range = Some(price_range);
        self
    }

    /// The literal text a matching sale date must contain, e.g. "-03-".
    pub fn month_pattern(&self) -> Option<String> {
        self.month.as_ref().map(|month| format!("-{month}-"))
    }

    /// Whether `transaction` satisfies every predicate of the filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(pattern) = self.month_pattern()
            && !transaction.date_of_sale.contains(&pattern)
        {
            return false;
        }

        if let Some(search) = &self.search {
            let search = search.to_ascii_lowercase();
            let in_title = transaction.title.to_ascii_lowercase().contains(&search);
            let in_description = transaction
                .description
                .to_ascii_lowercase()
                .contains(&search);

            if !in_title && !in_description {
                return false;
            }
        }

        if let Some(sold) = self.sold
            && transaction.sold != sold
        {
            return false;
        }

        self.price_range
            .is_none_or(|range| range.contains(transaction.price))
    }

    /// Compile the filter to an SQL `WHERE` clause and its parameters.
    ///
    /// Returns an empty clause when the filter has no predicates. Parameters
    /// are numbered from `?1` in the order they appear in the returned vector.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut where_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(pattern) = self.month_pattern() {
            query_parameters.push(Value::Text(pattern));
            where_clause_parts.push(format!(
                "instr(date_of_sale, ?{}) > 0",
                query_parameters.len()
            ));
        }

        if let Some(search) = &self.search {
            query_parameters.push(Value::Text(search.clone()));
            let index = query_parameters.len();
            where_clause_parts.push(format!(
                "(instr(lower(title), lower(?{index})) > 0 \
                 OR instr(lower(description), lower(?{index})) > 0)"
            ));
        }

        if let Some(sold) = self.sold {
            query_parameters.push(Value::Integer(sold.into()));
            where_clause_parts.push(format!("sold = ?{}", query_parameters.len()));
        }

        if let Some(range) = self.price_range {
            if let Some(lower) = range.lower {
                query_parameters.push(Value::Real(lower));
                where_clause_parts.push(format!("price > ?{}", query_parameters.len()));
            }

            if let Some(upper) = range.upper {
                query_parameters.push(Value::Real(upper));
                where_clause_parts.push(format!("price <= ?{}", query_parameters.len()));
            }
        }

        if where_clause_parts.is_empty() {
            (String::new(), query_parameters)
        } else {
            (
                String::from("WHERE ") + &where_clause_parts.join(" AND "),
                query_parameters,
            )
        }
    }
}
