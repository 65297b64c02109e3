//! Order sizing shared by the reference strategies.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

/// Whole shares of `price` that `cash` can buy. Zero for non-positive inputs.
pub fn affordable_quantity(cash: Decimal, price: Decimal) -> u64 {
    if cash <= Decimal::ZERO || price <= Decimal::ZERO {
        return 0;
    }
    (cash / price).floor().to_u64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_affordable_quantity() {
        assert_eq!(affordable_quantity(dec!(2000000), dec!(10)), 200_000);
        assert_eq!(affordable_quantity(dec!(1000), dec!(3)), 333);
        assert_eq!(affordable_quantity(dec!(5), dec!(10)), 0);
        assert_eq!(affordable_quantity(dec!(-1600), dec!(10)), 0);
        assert_eq!(affordable_quantity(dec!(100), Decimal::ZERO), 0);
    }
}
