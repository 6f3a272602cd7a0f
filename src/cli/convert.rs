//! Odds conversion command.

use rust_decimal::Decimal;

use crate::cli::output;
use crate::domain::odds::NO_AMERICAN;
use crate::domain::{detect_format, parse_odds};
use crate::error::Result;

/// Print an odds value in every supported representation.
pub fn execute(input: &str) -> Result<()> {
    let odds = parse_odds(input)?;

    output::section(&format!("Odds {}", input.trim()));
    if let Some(format) = detect_format(input) {
        output::key_value("Detected format", format);
    }
    output::key_value("Decimal", odds.value().normalize());
    match odds.to_american_string() {
        Ok(american) => output::key_value("American", american),
        Err(error) => output::key_value("American", format!("{NO_AMERICAN} ({error})")),
    }
    let implied = (odds.implied_probability() * Decimal::ONE_HUNDRED).round_dp(2);
    output::key_value("Implied probability", format!("{implied:.2}%"));

    Ok(())
}
