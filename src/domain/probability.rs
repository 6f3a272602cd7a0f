//! Implied-probability arithmetic and the arbitrage condition.
//!
//! A set of prices covering every mutually exclusive outcome of a market is an
//! arbitrage when the sum of their implied probabilities is strictly below 1.

use rust_decimal::Decimal;

use super::error::DomainError;
use super::money::Percent;
use super::odds::Odds;

/// Decimal places kept on implied-probability sums.
///
/// `1/3 + 1/3 + 1/3` evaluates to `0.999...9` at full precision; rounding the
/// sum keeps a fair book at exactly 1 so it is not mistaken for an arbitrage.
pub const IMPLIED_SCALE: u32 = 16;

/// Sum of `1 / price` across the given prices.
///
/// # Errors
///
/// Returns [`DomainError::EmptyPrices`] for an empty slice.
pub fn implied_probability(prices: &[Odds]) -> Result<Decimal, DomainError> {
    if prices.is_empty() {
        return Err(DomainError::EmptyPrices);
    }
    let sum: Decimal = prices.iter().map(Odds::implied_probability).sum();
    Ok(sum.round_dp(IMPLIED_SCALE))
}

/// True iff the implied probability sum is strictly below 1.
///
/// A sum of exactly 1 guarantees no profit and is not an arbitrage.
#[must_use]
pub fn has_arbitrage(prices: &[Odds]) -> bool {
    implied_probability(prices).is_ok_and(is_arbitrage_sum)
}

/// Guaranteed return on total stake, in percent: `(1 / implied - 1) * 100`.
///
/// # Errors
///
/// Returns [`DomainError::NotArbitrageable`] when the prices are not an
/// arbitrage, and [`DomainError::EmptyPrices`] for an empty slice.
pub fn profit_percentage(prices: &[Odds]) -> Result<Percent, DomainError> {
    let implied = implied_probability(prices)?;
    profit_from_implied(implied)
}

/// Profit percentage for an already computed implied-probability sum.
///
/// # Errors
///
/// Returns [`DomainError::NotArbitrageable`] unless `0 < implied < 1`, and
/// [`DomainError::Overflow`] when `implied` is too close to 0 to invert.
pub fn profit_from_implied(implied: Decimal) -> Result<Percent, DomainError> {
    if !is_arbitrage_sum(implied) {
        return Err(DomainError::NotArbitrageable {
            implied_probability: implied,
        });
    }
    Decimal::ONE
        .checked_div(implied)
        .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
        .and_then(|net| net.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(DomainError::Overflow {
            quantity: "profit percentage",
        })
}

fn is_arbitrage_sum(implied: Decimal) -> bool {
    implied > Decimal::ZERO && implied < Decimal::ONE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn odds(values: &[Decimal]) -> Vec<Odds> {
        values.iter().map(|v| Odds::try_new(*v).unwrap()).collect()
    }

    #[test]
    fn implied_probability_sums_inverses() {
        let prices = odds(&[dec!(2), dec!(4)]);
        assert_eq!(implied_probability(&prices).unwrap(), dec!(0.75));
    }

    #[test]
    fn empty_prices_rejected() {
        assert_eq!(implied_probability(&[]), Err(DomainError::EmptyPrices));
        assert!(!has_arbitrage(&[]));
    }

    #[test]
    fn detects_two_way_arbitrage() {
        let prices = odds(&[dec!(2.10), dec!(2.20)]);
        assert!(has_arbitrage(&prices));

        let profit = profit_percentage(&prices).unwrap();
        assert_eq!(profit.round_dp(2), dec!(7.44));
    }

    #[test]
    fn sum_of_exactly_one_is_not_arbitrage() {
        let prices = odds(&[dec!(2), dec!(2)]);
        assert_eq!(implied_probability(&prices).unwrap(), Decimal::ONE);
        assert!(!has_arbitrage(&prices));
        assert!(matches!(
            profit_percentage(&prices),
            Err(DomainError::NotArbitrageable { .. })
        ));
    }

    #[test]
    fn fair_three_way_book_is_exactly_one() {
        let prices = odds(&[dec!(3), dec!(3), dec!(3)]);
        assert_eq!(implied_probability(&prices).unwrap(), Decimal::ONE);
        assert!(!has_arbitrage(&prices));
    }

    #[test]
    fn over_round_market_has_no_arbitrage() {
        let prices = odds(&[dec!(1.80), dec!(1.90)]);
        assert!(implied_probability(&prices).unwrap() > Decimal::ONE);
        assert!(!has_arbitrage(&prices));
    }

    #[test]
    fn profit_from_implied_rejects_non_arbitrage() {
        assert!(profit_from_implied(dec!(1.02)).is_err());
        assert_eq!(profit_from_implied(dec!(0.8)).unwrap(), dec!(25));
        assert!(matches!(
            profit_from_implied(dec!(0.0000000000000000000000000001)),
            Err(DomainError::Overflow { .. })
        ));
    }
}
