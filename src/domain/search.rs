//! Exhaustive combination search.
//!
//! For each market, every way of picking one quote per outcome is evaluated
//! and the most profitable arbitrage is kept. Quote counts are bounded by the
//! number of integrated sources, so the Cartesian product stays small.

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;
use super::market::{Market, PriceQuote};
use super::money::Percent;
use super::odds::Odds;
use super::probability::{implied_probability, profit_from_implied, IMPLIED_SCALE};

/// Thresholds a combination must clear to be selected.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    /// Widest market searched.
    pub max_outcomes: usize,
    /// Combinations below this profit are ignored.
    pub min_profit_pct: Percent,
    /// Combinations whose implied probability falls below this floor are
    /// treated as stale or mismatched data and skipped.
    pub min_implied_probability: Option<Decimal>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            max_outcomes: 3,
            min_profit_pct: Decimal::ZERO,
            min_implied_probability: None,
        }
    }
}

/// One quote per outcome that together form an arbitrage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combination {
    legs: Vec<PriceQuote>,
    implied_probability: Decimal,
    profit_pct: Percent,
}

impl Combination {
    /// Build a combination from one quote per outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotArbitrageable`] when the implied probability
    /// is not strictly below 1, or [`DomainError::EmptyPrices`] with no legs.
    pub fn try_new(legs: Vec<PriceQuote>) -> Result<Self, DomainError> {
        let prices: Vec<Odds> = legs.iter().map(PriceQuote::price).collect();
        let implied_probability = implied_probability(&prices)?;
        let profit_pct = profit_from_implied(implied_probability)?;
        Ok(Self {
            legs,
            implied_probability,
            profit_pct,
        })
    }

    /// Selected quotes, in the market's outcome order.
    #[must_use]
    pub fn legs(&self) -> &[PriceQuote] {
        &self.legs
    }

    /// Selected prices, in the market's outcome order.
    #[must_use]
    pub fn prices(&self) -> Vec<Odds> {
        self.legs.iter().map(PriceQuote::price).collect()
    }

    /// Sum of implied probabilities (below 1).
    #[must_use]
    pub const fn implied_probability(&self) -> Decimal {
        self.implied_probability
    }

    /// Guaranteed return in percent (above 0).
    #[must_use]
    pub const fn profit_percentage(&self) -> Percent {
        self.profit_pct
    }

    /// True when one source supplies the price for two or more outcomes.
    #[must_use]
    pub fn reuses_source(&self) -> bool {
        self.legs
            .iter()
            .enumerate()
            .any(|(i, leg)| self.legs[i + 1..].iter().any(|other| other.source() == leg.source()))
    }
}

/// Find the most profitable arbitrage in a market.
///
/// Quotes are visited like nested loops, first outcome outermost, each
/// outcome's quotes in ingestion order. A later combination replaces the
/// current best only when its profit is strictly greater, so ties resolve to
/// the first one found.
///
/// Returns `Ok(None)` when no combination is an arbitrage.
///
/// # Errors
///
/// Returns the [`Market::validate`] error for markets that cannot be searched
/// (unsupported width or an outcome without quotes).
pub fn find_best_combination(
    market: &Market,
    criteria: &SearchCriteria,
) -> Result<Option<Combination>, DomainError> {
    market.validate(criteria.max_outcomes)?;

    let quotes: Vec<&[PriceQuote]> = market.outcomes().iter().map(|o| o.quotes()).collect();
    let mut cursor = vec![0usize; quotes.len()];
    let mut best: Option<(Decimal, Vec<usize>)> = None;

    loop {
        let implied: Decimal = cursor
            .iter()
            .zip(&quotes)
            .map(|(&i, outcome)| outcome[i].price().implied_probability())
            .sum();
        let implied = implied.round_dp(IMPLIED_SCALE);

        if let Ok(profit) = profit_from_implied(implied) {
            let plausible = criteria
                .min_implied_probability
                .map_or(true, |floor| implied >= floor);
            let better = best.as_ref().map_or(true, |(top, _)| profit > *top);
            if plausible && profit >= criteria.min_profit_pct && better {
                best = Some((profit, cursor.clone()));
            }
        }

        if !advance(&mut cursor, &quotes) {
            break;
        }
    }

    best.map(|(_, picks)| {
        let legs = picks
            .iter()
            .zip(&quotes)
            .map(|(&i, outcome)| outcome[i].clone())
            .collect();
        Combination::try_new(legs)
    })
    .transpose()
}

/// Step the odometer; the last outcome turns fastest. Returns false once
/// every combination has been visited.
fn advance(cursor: &mut [usize], quotes: &[&[PriceQuote]]) -> bool {
    for position in (0..cursor.len()).rev() {
        cursor[position] += 1;
        if cursor[position] < quotes[position].len() {
            return true;
        }
        cursor[position] = 0;
    }
    false
}
