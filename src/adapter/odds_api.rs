//! Odds-feed payload parsing.
//!
//! Converts the feed's event list into engine [`Market`]s:
//!
//! - Game lines: one market per event, market key and line. Spread lines
//!   are keyed on the home team's handicap so both sides of the same line
//!   land in one market.
//! - Player props: `Over`/`Under` quotes grouped by player, market key and
//!   line.
//!
//! Invalid prices are excluded from their market and logged.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{EventInfo, Market, MarketKind, Odds, PriceQuote};
use crate::error::Result;

/// One event in the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEvent {
    pub id: String,
    #[serde(default)]
    pub sport_title: String,
    #[serde(default)]
    pub commence_time: Option<String>,
    pub home_team: String,
    pub away_team: String,
    /// Set by the feed once the event is in play.
    #[serde(default)]
    pub live: bool,
    #[serde(default)]
    pub bookmakers: Vec<FeedBookmaker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedBookmaker {
    pub title: String,
    #[serde(default)]
    pub markets: Vec<FeedMarket>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedMarket {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<FeedOutcome>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedOutcome {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub point: Option<Decimal>,
    /// Player name on player-prop markets.
    #[serde(default)]
    pub description: Option<String>,
}

/// Grouping key for markets within one event.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKey {
    Game {
        key: String,
        line: Option<Decimal>,
    },
    Prop {
        key: String,
        player: String,
        line: Decimal,
    },
}

/// Parse a feed payload (a JSON array of events).
///
/// # Errors
///
/// Returns [`Error::Json`](crate::error::Error::Json) when the payload is not
/// an event array.
pub fn parse_feed(content: &str) -> Result<Vec<Market>> {
    let events: Vec<FeedEvent> = serde_json::from_str(content)?;
    let markets: Vec<Market> = events.iter().flat_map(event_markets).collect();
    debug!(events = events.len(), markets = markets.len(), "Parsed odds feed");
    Ok(markets)
}

/// Build every market of one event, in order of first appearance.
#[must_use]
pub fn event_markets(event: &FeedEvent) -> Vec<Market> {
    let mut groups: Vec<(LineKey, Vec<(&str, String, f64)>)> = Vec::new();

    for bookmaker in &event.bookmakers {
        for market in &bookmaker.markets {
            for outcome in &market.outcomes {
                let Some((line_key, label)) = classify(event, &market.key, outcome) else {
                    continue;
                };
                let quote = (bookmaker.title.as_str(), label, outcome.price);
                match groups.iter_mut().find(|(k, _)| *k == line_key) {
                    Some((_, quotes)) => quotes.push(quote),
                    None => groups.push((line_key, vec![quote])),
                }
            }
        }
    }

    let info = event_info(event);
    groups
        .into_iter()
        .map(|(line_key, quotes)| {
            let builder = Market::builder(
                market_id(&event.id, &line_key),
                info.clone(),
                market_kind(&line_key),
            );
            quotes
                .into_iter()
                .fold(builder, |builder, (source, label, price)| {
                    match Odds::try_from_f64(price) {
                        Ok(price) => builder.quote(PriceQuote::new(source, label, price)),
                        Err(error) => builder.reject(source, label, error),
                    }
                })
                .build()
        })
        .collect()
}

fn event_info(event: &FeedEvent) -> EventInfo {
    let match_name = format!("{} vs {}", event.home_team, event.away_team);
    let mut info = EventInfo::new(match_name, event.sport_title.as_str()).with_live(event.live);
    match event.commence_time.as_deref().map(DateTime::parse_from_rfc3339) {
        Some(Ok(start)) => info = info.with_commence_time(start.with_timezone(&Utc)),
        Some(Err(error)) => {
            warn!(event = %event.id, error = %error, "Unparseable commence_time");
        }
        None => {}
    }
    info
}

/// Market grouping and outcome label for one feed outcome.
fn classify(event: &FeedEvent, market_key: &str, outcome: &FeedOutcome) -> Option<(LineKey, String)> {
    let player = outcome
        .description
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    if let Some(player) = player {
        let side = match outcome.name.to_ascii_lowercase().as_str() {
            "over" => "Over",
            "under" => "Under",
            _ => return None,
        };
        let line = outcome.point?;
        let key = LineKey::Prop {
            key: market_key.to_string(),
            player: player.to_string(),
            line: line.normalize(),
        };
        return Some((key, format!("{side} {line}")));
    }

    let line = match (market_key, outcome.point) {
        // Away handicap is the negated home handicap.
        ("spreads", Some(point)) if outcome.name == event.away_team => Some(-point),
        (_, point) => point,
    };
    let label = match outcome.point {
        Some(point) if market_key == "totals" => format!("{} {point}", outcome.name),
        Some(point) if point > Decimal::ZERO => format!("{} +{point}", outcome.name),
        Some(point) => format!("{} {point}", outcome.name),
        None => outcome.name.clone(),
    };
    let key = LineKey::Game {
        key: market_key.to_string(),
        line: line.map(|l| l.normalize()),
    };
    Some((key, label))
}

fn market_id(event_id: &str, key: &LineKey) -> String {
    match key {
        LineKey::Game { key, line: None } => format!("{event_id}:{key}"),
        LineKey::Game {
            key,
            line: Some(line),
        } => format!("{event_id}:{key}:{line}"),
        LineKey::Prop { key, player, line } => format!("{event_id}:{key}:{player}:{line}"),
    }
}

fn market_kind(key: &LineKey) -> MarketKind {
    match key {
        LineKey::Game { key, line } => MarketKind::Game {
            key: key.clone(),
            line: *line,
        },
        LineKey::Prop { key, player, line } => {
            MarketKind::player_prop(key.as_str(), player.as_str(), *line)
        }
    }
}
