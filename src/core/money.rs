//! Monetary tolerance and rounding helpers shared by every engine component.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Amounts closer than this are treated as equal (one cent).
pub const TOLERANCE: Decimal = dec!(0.01);

/// Decimal places kept when balances are rounded for settlement.
pub const MONEY_DP: u32 = 2;

/// Round to whole cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `amount` lies within [`TOLERANCE`] of zero.
pub fn is_negligible(amount: Decimal) -> bool {
    amount.abs() <= TOLERANCE
}

/// Convert an amount to integer cents, rounding half away from zero.
///
/// Returns `None` if the value does not fit in a `u64` (negative amounts
/// included).
pub fn to_cents(amount: Decimal) -> Option<u64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(-10.005)), dec!(-10.01));
        assert_eq!(round_money(dec!(33.3333333)), dec!(33.33));
    }

    #[test]
    fn test_negligible() {
        assert!(is_negligible(dec!(0.01)));
        assert!(is_negligible(dec!(-0.004)));
        assert!(!is_negligible(dec!(0.02)));
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(dec!(12.34)), Some(1234));
        assert_eq!(to_cents(dec!(0.005)), Some(1));
        assert_eq!(to_cents(dec!(-1)), None);
    }

    #[test]
    fn test_to_cents_out_of_range() {
        assert_eq!(to_cents(Decimal::MAX), None);
        assert_eq!(to_cents(dec!(1000000000000000000)), None);
        assert_eq!(to_cents(dec!(184467440737095516.15)), Some(u64::MAX));
    }
}
