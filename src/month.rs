//! The month selected in the dashboard.

use std::{fmt::Display, str::FromStr};

use crate::Error;

/// A month of the year, written as two digits ("01" to "12") on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month(time::Month);

impl Month {
    /// Every month in calendar order.
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12u8).filter_map(|number| time::Month::try_from(number).ok().map(Month))
    }

    /// The two-digit form of the month, e.g. "03".
    pub fn as_str(&self) -> &'static str {
        const MONTHS: [&str; 12] = [
            "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
        ];

        MONTHS[usize::from(u8::from(self.0)) - 1]
    }

    /// The English name of the month, e.g. "March".
    pub fn name(&self) -> String {
        self.0.to_string()
    }
}

impl Default for Month {
    fn default() -> Self {
        Self(time::Month::March)
    }
}

impl FromStr for Month {
    type Err = Error;

    /// Parse a two-digit month. Single digits ("3") are rejected so that the
    /// value can be used as-is in the `-MM-` date filter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 || !s.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(Error::InvalidMonth(s.to_owned()));
        }

        s.parse::<u8>()
            .ok()
            .and_then(|number| time::Month::try_from(number).ok())
            .map(Month)
            .ok_or_else(|| Error::InvalidMonth(s.to_owned()))
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
