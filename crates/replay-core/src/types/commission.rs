//! Broker commission model.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Fixed-plus-tiered per-share fee, capped at a fraction of notional.
///
/// `min(max(minimum, qty * rate(qty)), max_notional_fraction * qty * price)`
/// where `rate` is `small_order_rate` up to and including `tier_threshold`
/// shares and `large_order_rate` above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionSchedule {
    /// Minimum fee per order (USD)
    pub minimum: Decimal,
    /// Per-share rate for orders up to the tier threshold
    pub small_order_rate: Decimal,
    /// Per-share rate for orders above the tier threshold
    pub large_order_rate: Decimal,
    /// Largest share count billed at the small-order rate
    pub tier_threshold: u64,
    /// Cap as a fraction of traded notional
    pub max_notional_fraction: Decimal,
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        Self {
            minimum: dec!(1.3),
            small_order_rate: dec!(0.013),
            large_order_rate: dec!(0.008),
            tier_threshold: 500,
            max_notional_fraction: dec!(0.005),
        }
    }
}

impl CommissionSchedule {
    /// Commission for trading `quantity` shares at `fill_price`.
    pub fn commission(&self, quantity: u64, fill_price: Decimal) -> Decimal {
        let qty = Decimal::from(quantity);
        let rate = if quantity <= self.tier_threshold {
            self.small_order_rate
        } else {
            self.large_order_rate
        };
        let base = self.minimum.max(qty * rate);
        base.min(self.max_notional_fraction * qty * fill_price)
    }
}
