//! Proportional stake allocation.
//!
//! Stakes are split in proportion to each outcome's implied probability, which
//! makes `stake * price` the same whichever outcome wins.

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;
use super::money::{round_cents, Money, Percent};
use super::odds::Odds;
use super::probability::{implied_probability, profit_from_implied};

/// Split `total_stake` across the outcomes of an arbitrage.
///
/// Every stake is rounded to cents except the last, which takes
/// `total_stake - sum(other rounded stakes)` so the split always sums to
/// exactly `total_stake`.
///
/// # Errors
///
/// - [`DomainError::EmptyPrices`] for an empty slice
/// - [`DomainError::NegativeStake`] for a negative total
/// - [`DomainError::NotArbitrageable`] when the prices are not an arbitrage
/// - [`DomainError::Overflow`] when a stake exceeds the decimal range
pub fn allocate_stakes(prices: &[Odds], total_stake: Money) -> Result<Vec<Money>, DomainError> {
    let implied = implied_probability(prices)?;
    if total_stake < Decimal::ZERO {
        return Err(DomainError::NegativeStake { total: total_stake });
    }
    profit_from_implied(implied)?;

    let (_, rest) = prices.split_last().ok_or(DomainError::EmptyPrices)?;

    let mut stakes = rest
        .iter()
        .map(|price| {
            total_stake
                .checked_mul(price.implied_probability())
                .and_then(|weighted| weighted.checked_div(implied))
                .map(round_cents)
                .ok_or(OVERFLOW_STAKE)
        })
        .collect::<Result<Vec<Money>, DomainError>>()?;
    let allocated: Money = stakes.iter().sum();
    stakes.push(total_stake.checked_sub(allocated).ok_or(OVERFLOW_STAKE)?);

    Ok(stakes)
}

const OVERFLOW_STAKE: DomainError = DomainError::Overflow { quantity: "stake" };

/// Guaranteed profit for a stake at a given profit percentage, rounded to cents.
///
/// Derived from the percentage, never from realised stakes, so the figure
/// cannot drift from the quoted profit.
///
/// # Errors
///
/// Returns [`DomainError::Overflow`] when the product exceeds the decimal range.
pub fn guaranteed_profit(total_stake: Money, profit_pct: Percent) -> Result<Money, DomainError> {
    total_stake
        .checked_mul(profit_pct)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .map(round_cents)
        .ok_or(DomainError::Overflow {
            quantity: "guaranteed profit",
        })
}

/// Stake split for one arbitrage, one entry per outcome in combination order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeAllocation {
    total_stake: Money,
    stakes: Vec<Money>,
    payouts: Vec<Money>,
    guaranteed_profit: Money,
}

impl StakeAllocation {
    /// Allocate `total_stake` over `prices`.
    ///
    /// # Errors
    ///
    /// Same as [`allocate_stakes`].
    pub fn compute(prices: &[Odds], total_stake: Money) -> Result<Self, DomainError> {
        let stakes = allocate_stakes(prices, total_stake)?;
        let profit_pct = profit_from_implied(implied_probability(prices)?)?;
        let payouts = stakes
            .iter()
            .zip(prices)
            .map(|(stake, price)| {
                stake
                    .checked_mul(price.value())
                    .map(round_cents)
                    .ok_or(DomainError::Overflow { quantity: "payout" })
            })
            .collect::<Result<Vec<Money>, DomainError>>()?;

        Ok(Self {
            total_stake,
            stakes,
            payouts,
            guaranteed_profit: guaranteed_profit(total_stake, profit_pct)?,
        })
    }

    /// Total amount staked across all outcomes.
    #[must_use]
    pub const fn total_stake(&self) -> Money {
        self.total_stake
    }

    /// Per-outcome stakes.
    #[must_use]
    pub fn stakes(&self) -> &[Money] {
        &self.stakes
    }

    /// Per-outcome payout (`stake * price`), rounded to cents.
    #[must_use]
    pub fn payouts(&self) -> &[Money] {
        &self.payouts
    }

    /// Guaranteed profit in currency units.
    #[must_use]
    pub const fn guaranteed_profit(&self) -> Money {
        self.guaranteed_profit
    }
}
