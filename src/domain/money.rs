//! Monetary types and rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Amount of currency represented as a Decimal for precision.
pub type Money = Decimal;

/// Percentage (e.g. `7.44` means 7.44%).
pub type Percent = Decimal;

/// Decimal places kept on every currency amount.
pub const CENT_SCALE: u32 = 2;

/// Round an amount to whole cents, half away from zero.
#[must_use]
pub fn round_cents(amount: Money) -> Money {
    amount.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_cents(dec!(0.125)), dec!(0.13));
        assert_eq!(round_cents(dec!(0.135)), dec!(0.14));
        assert_eq!(round_cents(dec!(511.627906)), dec!(511.63));
    }
}
