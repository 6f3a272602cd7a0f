//! Domain validation errors for the arbitrage engine.
//!
//! These errors are returned when a price, market or combination violates an
//! engine invariant. None of them is fatal: callers isolate the offending quote
//! or market and carry on with the rest of the batch.
//!
//! # Examples
//!
//! ```
//! use surebet::domain::error::DomainError;
//! use surebet::domain::Odds;
//! use rust_decimal_macros::dec;
//!
//! let result = Odds::try_new(dec!(0.5));
//! assert!(matches!(result, Err(DomainError::InvalidOdds { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when engine invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A price is non-finite, below 1.0, or exactly 1.0 where a conversion needs net odds.
    #[error("invalid odds {value}: {reason}")]
    InvalidOdds {
        /// Textual rendering of the rejected value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// Odds text matched none of the supported formats.
    #[error("cannot parse odds value '{input}'")]
    UnparseableOdds {
        /// The raw input.
        input: String,
    },

    /// Profit or allocation was requested for prices that are not an arbitrage.
    #[error("not an arbitrage: implied probability {implied_probability} >= 1")]
    NotArbitrageable {
        /// The implied probability sum of the offending prices.
        implied_probability: Decimal,
    },

    /// A market outcome has no quotes to choose from.
    #[error("market {market} has no quotes for outcome '{outcome}'")]
    EmptyMarket {
        /// Market label.
        market: String,
        /// Outcome without quotes.
        outcome: String,
    },

    /// An empty price list was supplied.
    #[error("price list cannot be empty")]
    EmptyPrices,

    /// Total stake must be non-negative.
    #[error("total stake must not be negative, got {total}")]
    NegativeStake {
        /// The rejected total.
        total: Decimal,
    },

    /// An intermediate amount exceeded the decimal range.
    #[error("{quantity} out of range")]
    Overflow {
        /// What was being computed.
        quantity: &'static str,
    },

    /// Markets must have a supported number of outcomes.
    #[error("unsupported outcome count {count}, expected between 2 and {max}")]
    UnsupportedOutcomeCount {
        /// Number of outcomes the market carried.
        count: usize,
        /// Largest market width the engine is configured for.
        max: usize,
    },
}
