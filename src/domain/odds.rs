//! Odds representation and format conversion.
//!
//! All engine arithmetic runs on decimal odds. American and fractional forms
//! exist only at the edges: parsing incoming quotes and rendering results.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::error::DomainError;

const TWO: Decimal = Decimal::TWO;
const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Shown in place of American odds a price cannot be expressed in.
pub const NO_AMERICAN: &str = "n/a";

/// Smallest value read as decimal odds when the format is auto-detected.
const DETECT_DECIMAL_MIN: Decimal = dec!(1.01);

/// Odds display/input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFormat {
    /// Total payout per unit staked, e.g. `2.50`.
    Decimal,
    /// Moneyline, e.g. `+150` or `-110`.
    American,
    /// Net profit ratio, e.g. `3/2`.
    Fractional,
}

impl fmt::Display for OddsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal => write!(f, "decimal"),
            Self::American => write!(f, "american"),
            Self::Fractional => write!(f, "fractional"),
        }
    }
}

/// A validated decimal price.
///
/// Invariant: the wrapped value is at least 1.0. Quotes below that are
/// rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Odds(Decimal);

impl Odds {
    /// Validate a decimal price.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOdds`] when `value < 1.0`.
    pub fn try_new(value: Decimal) -> Result<Self, DomainError> {
        if value < Decimal::ONE {
            return Err(DomainError::InvalidOdds {
                value: value.to_string(),
                reason: "decimal odds must be at least 1.0",
            });
        }
        Ok(Self(value))
    }

    /// Validate a decimal price supplied as a float.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOdds`] for NaN, infinities and values below 1.0.
    pub fn try_from_f64(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::InvalidOdds {
                value: value.to_string(),
                reason: "odds must be finite",
            });
        }
        let decimal = Decimal::from_f64(value).ok_or(DomainError::InvalidOdds {
            value: value.to_string(),
            reason: "odds out of representable range",
        })?;
        Self::try_new(decimal)
    }

    /// Convert American odds to decimal.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOdds`] when `|american| < 100`.
    pub fn from_american(american: i64) -> Result<Self, DomainError> {
        if american.abs() < 100 {
            return Err(DomainError::InvalidOdds {
                value: american.to_string(),
                reason: "american odds must be +100 or above, or -100 or below",
            });
        }
        let value = Decimal::from(american);
        if american > 0 {
            Self::try_new(value / HUNDRED + Decimal::ONE)
        } else {
            Self::try_new(HUNDRED / value.abs() + Decimal::ONE)
        }
    }

    /// Convert fractional odds `numerator/denominator` to decimal.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOdds`] for a zero denominator or a negative ratio.
    pub fn from_fractional(numerator: Decimal, denominator: Decimal) -> Result<Self, DomainError> {
        if denominator.is_zero() {
            return Err(DomainError::InvalidOdds {
                value: format!("{numerator}/{denominator}"),
                reason: "fractional denominator cannot be zero",
            });
        }
        numerator
            .checked_div(denominator)
            .and_then(|ratio| ratio.checked_add(Decimal::ONE))
            .ok_or_else(|| DomainError::InvalidOdds {
                value: format!("{numerator}/{denominator}"),
                reason: "fractional odds out of range",
            })
            .and_then(Self::try_new)
    }

    /// The decimal price.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Implied probability of this single price (`1 / price`).
    #[must_use]
    pub fn implied_probability(&self) -> Decimal {
        Decimal::ONE / self.0
    }

    /// American odds as a signed integer.
    ///
    /// `price >= 2.0` maps to `round((price - 1) * 100)`, `1.0 < price < 2.0`
    /// maps to `round(-100 / (price - 1))`. Midpoints round away from zero.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOdds`] for `price == 1.0`, which has no
    /// net odds to express.
    pub fn american(&self) -> Result<i64, DomainError> {
        let net = self.0 - Decimal::ONE;
        if net.is_zero() {
            return Err(DomainError::InvalidOdds {
                value: self.0.to_string(),
                reason: "odds of exactly 1.0 have no american equivalent",
            });
        }

        let american = if self.0 >= TWO {
            net.checked_mul(HUNDRED)
        } else {
            (-HUNDRED).checked_div(net)
        };

        american
            .and_then(|a| {
                a.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_i64()
            })
            .ok_or_else(|| DomainError::InvalidOdds {
                value: self.0.to_string(),
                reason: "american odds out of range",
            })
    }

    /// American odds for tables and exports, or [`NO_AMERICAN`] when the price
    /// has no American form.
    #[must_use]
    pub fn american_label(&self) -> String {
        self.to_american_string().unwrap_or_else(|error| {
            debug!(price = %self.0, %error, "Price has no american odds");
            NO_AMERICAN.to_string()
        })
    }

    /// American odds rendered for display, with an explicit `+` on positive values.
    ///
    /// # Errors
    ///
    /// Same as [`Odds::american`].
    pub fn to_american_string(&self) -> Result<String, DomainError> {
        let american = self.american()?;
        if american > 0 {
            Ok(format!("+{american}"))
        } else {
            Ok(american.to_string())
        }
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Odds {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl FromStr for Odds {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_odds(s)
    }
}

/// Convert decimal odds to an American odds display string.
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdds`] for prices below or equal to 1.0.
pub fn decimal_to_american(price: Decimal) -> Result<String, DomainError> {
    Odds::try_new(price)?.to_american_string()
}

/// Convert American odds to a decimal price.
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdds`] when `|american| < 100`.
pub fn american_to_decimal(american: i64) -> Result<Decimal, DomainError> {
    Odds::from_american(american).map(|odds| odds.value())
}

/// Detect the format of a textual odds value.
///
/// Fractional when it contains `/`; American when its magnitude is at least
/// 100 (and it is not a plain decimal of exactly 100); decimal in `[1.01, 100]`.
#[must_use]
pub fn detect_format(input: &str) -> Option<OddsFormat> {
    let input = input.trim();
    if input.contains('/') {
        return Some(OddsFormat::Fractional);
    }
    let value = parse_number(input)?;
    if (DETECT_DECIMAL_MIN..=HUNDRED).contains(&value) {
        Some(OddsFormat::Decimal)
    } else if value >= HUNDRED || value <= -HUNDRED {
        Some(OddsFormat::American)
    } else {
        None
    }
}

/// Parse odds in any supported format into decimal odds.
///
/// # Errors
///
/// Returns [`DomainError::UnparseableOdds`] for text that is not a number or a
/// fraction, and [`DomainError::InvalidOdds`] for numbers outside every format's range.
pub fn parse_odds(input: &str) -> Result<Odds, DomainError> {
    let trimmed = input.trim();
    let unparseable = || DomainError::UnparseableOdds {
        input: input.to_string(),
    };

    if let Some((num, den)) = trimmed.split_once('/') {
        let num = parse_number(num).ok_or_else(unparseable)?;
        let den = parse_number(den).ok_or_else(unparseable)?;
        return Odds::from_fractional(num, den);
    }

    let value = parse_number(trimmed).ok_or_else(unparseable)?;
    match detect_format(trimmed) {
        Some(OddsFormat::Decimal) => Odds::try_new(value),
        Some(OddsFormat::American) => {
            let american = value.trunc().to_i64().ok_or_else(unparseable)?;
            Odds::from_american(american)
        }
        _ => Err(DomainError::InvalidOdds {
            value: trimmed.to_string(),
            reason: "outside decimal and american odds ranges",
        }),
    }
}

fn parse_number(input: &str) -> Option<Decimal> {
    let input = input.trim();
    let input = input.strip_prefix('+').unwrap_or(input);
    Decimal::from_str(input).ok()
}
