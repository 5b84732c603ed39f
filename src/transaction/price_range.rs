//! The fixed price buckets used by the bar chart.

use serde::{Deserialize, Serialize};

/// A bucket of prices for the bar chart.
///
/// The labels read as closed integer ranges ("101-200"), but the bounds are
/// `lower < price <= upper` so that fractional prices like 100.5 still land in
/// exactly one bucket. The first bucket has no lower bound and the last has no
/// upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    /// The label shown on the chart, e.g. "101-200".
    pub label: &'static str,
    /// Exclusive lower bound, `None` for the first bucket.
    pub lower: Option<f64>,
    /// Inclusive upper bound, `None` for the last bucket.
    pub upper: Option<f64>,
}

const fn bucket(label: &'static str, lower: f64, upper: f64) -> PriceRange {
    PriceRange {
        label,
        lower: Some(lower),
        upper: Some(upper),
    }
}

/// The ten price buckets in chart order.
pub const PRICE_RANGES: [PriceRange; 10] = [
    PriceRange {
        label: "0-100",
        lower: None,
        upper: Some(100.0),
    },
    bucket("101-200", 100.0, 200.0),
    bucket("201-300", 200.0, 300.0),
    bucket("301-400", 300.0, 400.0),
    bucket("401-500", 400.0, 500.0),
    bucket("501-600", 500.0, 600.0),
    bucket("601-700", 600.0, 700.0),
    bucket("701-800", 700.0, 800.0),
    bucket("801-900", 800.0, 900.0),
    PriceRange {
        label: "901-above",
        lower: Some(900.0),
        upper: None,
    },
];

impl PriceRange {
    /// Whether `price` falls in this bucket.
    pub fn contains(&self, price: f64) -> bool {
        self.lower.is_none_or(|lower| price > lower) && self.upper.is_none_or(|upper| price <= upper)
    }

    /// Find the bucket `price` belongs to.
    pub fn for_price(price: f64) -> Option<&'static PriceRange> {
        PRICE_RANGES.iter().find(|range| range.contains(price))
    }
}

/// The number of transactions in a price bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRangeCount {
    /// The bucket label, e.g. "0-100".
    pub range: String,
    /// How many transactions fell in the bucket.
    pub count: u64,
}
