//! CSV export of opportunity records.
//!
//! Columns follow the table users paste into spreadsheets. Three-way records
//! fill the trailing `C` columns; two-way records leave them empty. Every
//! value is read from the record as-is.

use std::io::Write;

use chrono::{DateTime, Utc};
use csv::Writer;
use rust_decimal::Decimal;

use crate::domain::{OpportunityRecord, PriceQuote};
use crate::error::Result;

/// Header row, in output order.
pub const HEADERS: [&str; 24] = [
    "Match",
    "Sport",
    "Market",
    "Game Time",
    "Sportsbook A",
    "Outcome A",
    "Odds A (American)",
    "Odds A (Decimal)",
    "Sportsbook B",
    "Outcome B",
    "Odds B (American)",
    "Odds B (Decimal)",
    "Profit %",
    "Implied Probability",
    "Stake A",
    "Stake B",
    "Guaranteed Profit",
    "Confidence",
    "Warning Message",
    "Sportsbook C",
    "Outcome C",
    "Odds C (American)",
    "Odds C (Decimal)",
    "Stake C",
];

/// Write records as CSV, header first.
///
/// # Errors
///
/// Returns [`Error::Csv`](crate::error::Error::Csv) or
/// [`Error::Io`](crate::error::Error::Io) when writing fails.
pub fn write_csv<'a, W, I>(writer: W, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a OpportunityRecord>,
{
    let mut writer = Writer::from_writer(writer);
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(row(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Records rendered as a CSV string.
///
/// # Errors
///
/// Same as [`write_csv`].
pub fn to_csv_string<'a, I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = &'a OpportunityRecord>,
{
    let mut buffer = Vec::new();
    write_csv(&mut buffer, records)?;
    String::from_utf8(buffer).map_err(|e| crate::error::Error::Parse(e.to_string()))
}

/// One CSV row for a record.
#[must_use]
pub fn row(record: &OpportunityRecord) -> Vec<String> {
    let event = record.event();
    let legs = record.legs();
    let stakes = record.allocation().stakes();

    let mut row = vec![
        event.match_name.clone(),
        event.sport.clone(),
        record.kind().to_string(),
        event.commence_time.map(format_game_time).unwrap_or_default(),
    ];
    row.extend(leg_columns(legs.first()));
    row.extend(leg_columns(legs.get(1)));
    row.extend([
        format_percent(record.profit_percentage()),
        format_percent(record.implied_probability() * Decimal::ONE_HUNDRED),
        format_money(stakes.first()),
        format_money(stakes.get(1)),
        format!("{:.2}", record.guaranteed_profit()),
        record.warning().level.to_string(),
        record.warning().message.to_string(),
    ]);
    row.extend(leg_columns(legs.get(2)));
    row.push(format_money(stakes.get(2)));
    row
}

/// Game time as shown in the export, e.g. `Oct 15, 7:30 PM`.
#[must_use]
pub fn format_game_time(time: DateTime<Utc>) -> String {
    time.format("%b %-d, %-I:%M %p").to_string()
}

fn leg_columns(leg: Option<&PriceQuote>) -> [String; 4] {
    match leg {
        Some(leg) => [
            leg.source().to_string(),
            leg.outcome().to_string(),
            leg.price().american_label(),
            leg.price().value().to_string(),
        ],
        None => Default::default(),
    }
}

fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

fn format_money(value: Option<&Decimal>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn game_time_format() {
        let time = Utc.with_ymd_and_hms(2025, 10, 15, 19, 30, 0).unwrap();
        assert_eq!(format_game_time(time), "Oct 15, 7:30 PM");
    }

    #[test]
    fn percent_keeps_two_places() {
        assert_eq!(format_percent(Decimal::from(5)), "5.00%");
    }

    #[test]
    fn header_has_all_columns() {
        assert_eq!(HEADERS.len(), 24);
        assert_eq!(HEADERS[18], "Warning Message");
    }
}
