//! Historical price bars.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One historical price observation for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp
    pub timestamp: DateTime<Utc>,
    /// Closing price
    pub close: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }

    /// Closing price as an exact decimal. `None` for non-finite closes.
    pub fn close_price(&self) -> Option<Decimal> {
        Decimal::try_from(self.close).ok()
    }

    /// Timestamp as Unix milliseconds.
    #[inline]
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
