//! Manual odds upload parsing.
//!
//! Two layouts are accepted:
//!
//! - JSON: `{"games": [{"match", "sport", "date", "bookmakers": [{"name", "home", "away", "draw"?}]}]}`
//!   with `odds1`/`odds2` accepted in place of `home`/`away`.
//! - CSV with header `match,sport,date,bookmaker,home,away[,draw]`, one row
//!   per bookmaker and game.
//!
//! Prices may be decimal, American or fractional, as numbers or strings.
//! Each game becomes a moneyline [`Market`]; a draw price makes it 3-way.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::domain::{parse_odds, EventInfo, Market, MarketKind, PriceQuote};
use crate::error::Result;

const UNKNOWN_MATCH: &str = "Unknown Match";
const UNKNOWN_SPORT: &str = "Unknown Sport";
const DRAW: &str = "Draw";

/// Upload file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Json,
    Csv,
}

impl UploadFormat {
    /// Guess the layout from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// A price as it appears in an upload: bare number or text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

impl fmt::Display for RawPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s.trim()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadDocument {
    #[serde(default)]
    games: Vec<UploadGame>,
}

#[derive(Debug, Deserialize)]
struct UploadGame {
    #[serde(rename = "match", default)]
    match_name: Option<String>,
    #[serde(default)]
    sport: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    bookmakers: Vec<UploadBook>,
}

#[derive(Debug, Deserialize)]
struct UploadBook {
    name: String,
    #[serde(alias = "odds1")]
    home: Option<RawPrice>,
    #[serde(alias = "odds2")]
    away: Option<RawPrice>,
    #[serde(default)]
    draw: Option<RawPrice>,
}

#[derive(Debug, Deserialize)]
struct UploadRow {
    #[serde(rename = "match")]
    match_name: String,
    #[serde(default)]
    sport: String,
    #[serde(default)]
    date: String,
    bookmaker: String,
    home: String,
    away: String,
    #[serde(default)]
    draw: Option<String>,
}

/// Parse a JSON upload.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::error::Error::Json) when the document is not valid JSON of the expected shape.
pub fn parse_json(content: &str) -> Result<Vec<Market>> {
    let document: UploadDocument = serde_json::from_str(content)?;
    let markets = document
        .games
        .into_iter()
        .enumerate()
        .map(|(index, game)| {
            let match_name = game.match_name.unwrap_or_else(|| UNKNOWN_MATCH.to_string());
            let sport = game.sport.unwrap_or_else(|| UNKNOWN_SPORT.to_string());
            let mut game_builder = GameBuilder::new(index, &match_name, &sport, game.date.as_deref());
            for book in game.bookmakers {
                game_builder.add_book(
                    &book.name,
                    book.home.as_ref(),
                    book.draw.as_ref(),
                    book.away.as_ref(),
                );
            }
            game_builder.build()
        })
        .collect::<Vec<_>>();

    debug!(markets = markets.len(), "Parsed JSON upload");
    Ok(markets)
}

/// Parse a CSV upload.
///
/// Rows for the same `(match, sport, date)` form one market, in order of
/// first appearance.
///
/// # Errors
///
/// Returns [`Error::Csv`](crate::error::Error::Csv) for unreadable input or rows missing required columns.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Market>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut games: Vec<((String, String, String), GameBuilder)> = Vec::new();

    for row in reader.deserialize::<UploadRow>() {
        let row = row?;
        let key = (row.match_name.clone(), row.sport.clone(), row.date.clone());
        let position = match games.iter().position(|(k, _)| *k == key) {
            Some(position) => position,
            None => {
                let sport = if row.sport.is_empty() { UNKNOWN_SPORT } else { row.sport.as_str() };
                let date = (!row.date.is_empty()).then_some(row.date.as_str());
                let builder = GameBuilder::new(games.len(), &row.match_name, sport, date);
                games.push((key, builder));
                games.len() - 1
            }
        };

        let home = RawPrice::Text(row.home);
        let away = RawPrice::Text(row.away);
        let draw = row
            .draw
            .filter(|d| !d.trim().is_empty())
            .map(RawPrice::Text);
        games[position]
            .1
            .add_book(&row.bookmaker, Some(&home), draw.as_ref(), Some(&away));
    }

    let markets: Vec<Market> = games.into_iter().map(|(_, game)| game.build()).collect();
    debug!(markets = markets.len(), "Parsed CSV upload");
    Ok(markets)
}

/// Read and parse an upload file.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::error::Error::Io) when the file cannot be read, or the parse error.
pub fn load(path: &Path, format: UploadFormat) -> Result<Vec<Market>> {
    match format {
        UploadFormat::Json => parse_json(&std::fs::read_to_string(path)?),
        UploadFormat::Csv => parse_csv(std::fs::File::open(path)?),
    }
}

/// Parses `date` as RFC 3339 when it carries a time.
fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Outcome labels from a "Home vs Away" match name.
fn team_names(match_name: &str) -> (String, String) {
    for separator in [" vs ", " vs. ", " @ ", " v "] {
        if let Some((home, away)) = match_name.split_once(separator) {
            let (home, away) = (home.trim(), away.trim());
            if !home.is_empty() && !away.is_empty() {
                return (home.to_string(), away.to_string());
            }
        }
    }
    ("Home".to_string(), "Away".to_string())
}

/// Accumulates one game's bookmaker rows into a moneyline market.
#[derive(Debug)]
struct GameBuilder {
    id: String,
    event: EventInfo,
    home: String,
    away: String,
    has_draw: bool,
    quotes: Vec<(String, String, String)>,
}

impl GameBuilder {
    fn new(index: usize, match_name: &str, sport: &str, date: Option<&str>) -> Self {
        let mut event = EventInfo::new(match_name, sport);
        if let Some(start) = date.and_then(parse_date) {
            event = event.with_commence_time(start);
        }
        let (home, away) = team_names(match_name);
        Self {
            id: format!("upload-{}:h2h", index + 1),
            event,
            home,
            away,
            has_draw: false,
            quotes: Vec::new(),
        }
    }

    fn add_book(
        &mut self,
        source: &str,
        home: Option<&RawPrice>,
        draw: Option<&RawPrice>,
        away: Option<&RawPrice>,
    ) {
        self.has_draw |= draw.is_some();
        let legs = [
            (self.home.as_str(), home),
            (DRAW, draw),
            (self.away.as_str(), away),
        ];
        for (outcome, raw) in legs {
            if let Some(raw) = raw {
                self.quotes
                    .push((source.to_string(), outcome.to_string(), raw.to_string()));
            }
        }
    }

    fn build(self) -> Market {
        let mut builder =
            Market::builder(self.id, self.event, MarketKind::moneyline()).outcome(&self.home);
        if self.has_draw {
            builder = builder.outcome(DRAW);
        }
        builder = builder.outcome(&self.away);

        for (source, outcome, raw) in self.quotes {
            builder = match parse_odds(&raw) {
                Ok(price) => builder.quote(PriceQuote::new(source, outcome, price)),
                Err(error) => builder.reject(source, outcome, error),
            };
        }

        let (market, rejected) = builder.build_with_rejections();
        if !rejected.is_empty() {
            warn!(
                market = %market.id(),
                rejected = rejected.len(),
                "Upload contained invalid prices"
            );
        }
        market
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn team_names_split_on_vs() {
        assert_eq!(
            team_names("Lakers vs Celtics"),
            ("Lakers".to_string(), "Celtics".to_string())
        );
        assert_eq!(team_names("Solo"), ("Home".to_string(), "Away".to_string()));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(UploadFormat::from_path(Path::new("odds.JSON")), Some(UploadFormat::Json));
        assert_eq!(UploadFormat::from_path(Path::new("odds.csv")), Some(UploadFormat::Csv));
        assert_eq!(UploadFormat::from_path(Path::new("odds.txt")), None);
    }

    #[test]
    fn json_accepts_mixed_price_formats() {
        let json = r#"{"games": [{
            "match": "Lakers vs Celtics",
            "sport": "NBA",
            "date": "2025-10-15",
            "bookmakers": [
                {"name": "DraftKings", "home": 2.10, "away": "-120"},
                {"name": "FanDuel", "odds1": "6/5", "odds2": 1.95}
            ]
        }]}"#;
        let markets = parse_json(json).unwrap();
        let outcomes = markets[0].outcomes();

        assert_eq!(outcomes[0].name(), "Lakers");
        assert_eq!(outcomes[0].quotes()[1].price().value(), dec!(2.2));
        assert_eq!(outcomes[1].name(), "Celtics");
        assert_eq!(outcomes[1].quotes()[0].source().as_str(), "DraftKings");
        assert!(markets[0].event().commence_time.is_none());
    }

    #[test]
    fn draw_column_makes_three_way() {
        let csv = "match,sport,date,bookmaker,home,away,draw\n\
                   Arsenal vs Chelsea,EPL,2025-10-15,BookX,3.40,2.80,3.60\n\
                   Arsenal vs Chelsea,EPL,2025-10-15,BookY,3.20,2.90,\n";
        let markets = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(markets.len(), 1);
        let names: Vec<_> = markets[0].outcomes().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["Arsenal", "Draw", "Chelsea"]);
        assert_eq!(markets[0].outcomes()[1].quotes().len(), 1);
    }
}
