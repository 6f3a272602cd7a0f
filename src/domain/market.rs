//! Market-related domain types.
//!
//! - [`PriceQuote`] - One source's price for one outcome
//! - [`Outcome`] - A mutually exclusive result of a market with its quotes
//! - [`Market`] - An event's betting question: its outcomes plus identity
//! - [`MarketKind`] - Game line or player prop, with the fields each carries

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::warn;

use super::error::DomainError;
use super::ids::{MarketId, SourceId};
use super::odds::Odds;

/// A single source's price for one outcome. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    source: SourceId,
    outcome: String,
    price: Odds,
}

impl PriceQuote {
    /// Create a quote from an already validated price.
    pub fn new(source: impl Into<SourceId>, outcome: impl Into<String>, price: Odds) -> Self {
        Self {
            source: source.into(),
            outcome: outcome.into(),
            price,
        }
    }

    /// Create a quote from a raw decimal price.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOdds`] when the price is below 1.0.
    pub fn try_new(
        source: impl Into<SourceId>,
        outcome: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(source, outcome, Odds::try_new(price)?))
    }

    /// The quoting source.
    #[must_use]
    pub const fn source(&self) -> &SourceId {
        &self.source
    }

    /// The outcome label this price is for.
    #[must_use]
    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    /// The decimal price.
    #[must_use]
    pub const fn price(&self) -> Odds {
        self.price
    }
}

/// One outcome of a market together with every quote collected for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    name: String,
    quotes: Vec<PriceQuote>,
}

impl Outcome {
    /// Create an outcome with no quotes yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quotes: Vec::new(),
        }
    }

    /// Outcome label, e.g. "Lakers", "Draw" or "Over 25.5".
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quotes in ingestion order.
    #[must_use]
    pub fn quotes(&self) -> &[PriceQuote] {
        &self.quotes
    }

    fn upsert(&mut self, quote: PriceQuote) {
        match self.quotes.iter_mut().find(|q| q.source == quote.source) {
            Some(existing) => *existing = quote,
            None => self.quotes.push(quote),
        }
    }
}

/// Event metadata shared by all markets of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventInfo {
    /// Display name, e.g. "Lakers vs Celtics".
    pub match_name: String,
    /// Sport or league title.
    pub sport: String,
    /// Scheduled start, when known.
    pub commence_time: Option<DateTime<Utc>>,
    /// True when the feed flags the event as in play.
    pub live: bool,
}

impl EventInfo {
    /// Create event metadata with no start time.
    pub fn new(match_name: impl Into<String>, sport: impl Into<String>) -> Self {
        Self {
            match_name: match_name.into(),
            sport: sport.into(),
            commence_time: None,
            live: false,
        }
    }

    /// Set the scheduled start.
    #[must_use]
    pub fn with_commence_time(mut self, commence_time: DateTime<Utc>) -> Self {
        self.commence_time = Some(commence_time);
        self
    }

    /// Mark the event as in play.
    #[must_use]
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }
}

/// What a market is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "market_type", rename_all = "snake_case")]
pub enum MarketKind {
    /// A game-level line: moneyline (`h2h`), `spreads` or `totals`.
    Game {
        /// Feed market key.
        key: String,
        /// Handicap or total line; quotes only compare on the same line.
        line: Option<Decimal>,
    },
    /// An over/under line on one player's statistic.
    PlayerProp {
        /// Feed market key, e.g. `player_points`.
        key: String,
        /// Player the line is about.
        player_name: String,
        /// Statistic, e.g. `points`.
        prop_type: String,
        /// The over/under threshold.
        prop_line: Decimal,
    },
}

impl MarketKind {
    /// Moneyline market.
    #[must_use]
    pub fn moneyline() -> Self {
        Self::Game {
            key: "h2h".to_string(),
            line: None,
        }
    }

    /// Player prop market; the prop type is the key without its `player_` prefix.
    pub fn player_prop(key: impl Into<String>, player_name: impl Into<String>, line: Decimal) -> Self {
        let key = key.into();
        let prop_type = key.strip_prefix("player_").unwrap_or(&key).to_string();
        Self::PlayerProp {
            key,
            player_name: player_name.into(),
            prop_type,
            prop_line: line,
        }
    }

    /// The feed market key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Game { key, .. } | Self::PlayerProp { key, .. } => key,
        }
    }

    /// True for player prop markets.
    #[must_use]
    pub const fn is_player_prop(&self) -> bool {
        matches!(self, Self::PlayerProp { .. })
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Game { key, line: None } => write!(f, "{key}"),
            Self::Game {
                key,
                line: Some(line),
            } => write!(f, "{key} {line}"),
            Self::PlayerProp {
                player_name,
                prop_type,
                prop_line,
                ..
            } => write!(f, "{player_name} {prop_type} {prop_line}"),
        }
    }
}

/// An event's set of mutually exclusive outcomes with their quotes.
#[derive(Debug, Clone)]
pub struct Market {
    id: MarketId,
    event: EventInfo,
    kind: MarketKind,
    outcomes: Vec<Outcome>,
}

impl Market {
    /// Start building a market.
    pub fn builder(id: impl Into<MarketId>, event: EventInfo, kind: MarketKind) -> MarketBuilder {
        MarketBuilder {
            id: id.into(),
            event,
            kind,
            outcomes: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Market identifier.
    #[must_use]
    pub const fn id(&self) -> &MarketId {
        &self.id
    }

    /// Event metadata.
    #[must_use]
    pub const fn event(&self) -> &EventInfo {
        &self.event
    }

    /// Game line or player prop.
    #[must_use]
    pub const fn kind(&self) -> &MarketKind {
        &self.kind
    }

    /// Outcomes in declaration order.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Number of outcomes.
    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Check the market can take part in a combination search.
    ///
    /// # Errors
    ///
    /// - [`DomainError::UnsupportedOutcomeCount`] outside `2..=max_outcomes`
    /// - [`DomainError::EmptyMarket`] when an outcome has no quotes
    pub fn validate(&self, max_outcomes: usize) -> Result<(), DomainError> {
        let count = self.outcomes.len();
        if count < 2 || count > max_outcomes {
            return Err(DomainError::UnsupportedOutcomeCount {
                count,
                max: max_outcomes,
            });
        }
        if let Some(empty) = self.outcomes.iter().find(|o| o.quotes.is_empty()) {
            return Err(DomainError::EmptyMarket {
                market: self.id.to_string(),
                outcome: empty.name.clone(),
            });
        }
        Ok(())
    }

    /// Copy of this market keeping only quotes accepted by `keep`.
    ///
    /// Outcomes stay declared even when all their quotes are dropped.
    #[must_use]
    pub fn retain_quotes<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&PriceQuote) -> bool,
    {
        let outcomes = self
            .outcomes
            .iter()
            .map(|outcome| Outcome {
                name: outcome.name.clone(),
                quotes: outcome.quotes.iter().filter(|q| keep(q)).cloned().collect(),
            })
            .collect();

        Self {
            id: self.id.clone(),
            event: self.event.clone(),
            kind: self.kind.clone(),
            outcomes,
        }
    }
}

/// A quote rejected during market construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedQuote {
    /// The quoting source.
    pub source: SourceId,
    /// The outcome the quote was for.
    pub outcome: String,
    /// Why it was rejected.
    pub error: DomainError,
}

/// Builder for [`Market`] that isolates invalid quotes instead of failing.
#[derive(Debug)]
pub struct MarketBuilder {
    id: MarketId,
    event: EventInfo,
    kind: MarketKind,
    outcomes: Vec<Outcome>,
    rejected: Vec<RejectedQuote>,
}

impl MarketBuilder {
    /// Declare an outcome, even if no source quotes it.
    #[must_use]
    pub fn outcome(mut self, name: impl Into<String>) -> Self {
        self.outcome_mut(&name.into());
        self
    }

    /// Add a validated quote. A second quote from the same source for the same
    /// outcome replaces the first.
    #[must_use]
    pub fn quote(mut self, quote: PriceQuote) -> Self {
        let outcome = quote.outcome.clone();
        self.outcome_mut(&outcome).upsert(quote);
        self
    }

    /// Add a quote from a raw price, or record it as rejected.
    #[must_use]
    pub fn raw_quote(
        self,
        source: impl Into<SourceId>,
        outcome: impl Into<String>,
        price: Decimal,
    ) -> Self {
        let source = source.into();
        let outcome = outcome.into();
        match Odds::try_new(price) {
            Ok(odds) => self.quote(PriceQuote::new(source, outcome, odds)),
            Err(error) => self.reject(source, outcome, error),
        }
    }

    /// Record a quote that failed validation upstream.
    ///
    /// The outcome is still declared so the market reports it as empty
    /// rather than silently changing width.
    #[must_use]
    pub fn reject(
        mut self,
        source: impl Into<SourceId>,
        outcome: impl Into<String>,
        error: DomainError,
    ) -> Self {
        let source = source.into();
        let outcome = outcome.into();
        warn!(
            market = %self.id,
            source = %source,
            outcome = %outcome,
            error = %error,
            "Excluding invalid quote"
        );
        self.outcome_mut(&outcome);
        self.rejected.push(RejectedQuote {
            source,
            outcome,
            error,
        });
        self
    }

    /// Quotes rejected so far.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedQuote] {
        &self.rejected
    }

    /// Finish building, returning the market and the rejected quotes.
    #[must_use]
    pub fn build_with_rejections(self) -> (Market, Vec<RejectedQuote>) {
        let market = Market {
            id: self.id,
            event: self.event,
            kind: self.kind,
            outcomes: self.outcomes,
        };
        (market, self.rejected)
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Market {
        self.build_with_rejections().0
    }

    fn outcome_mut(&mut self, name: &str) -> &mut Outcome {
        let index = match self.outcomes.iter().position(|o| o.name == name) {
            Some(index) => index,
            None => {
                self.outcomes.push(Outcome::new(name));
                self.outcomes.len() - 1
            }
        };
        &mut self.outcomes[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn event() -> EventInfo {
        EventInfo::new("Lakers vs Celtics", "NBA")
    }

    #[test]
    fn builder_groups_quotes_by_outcome_in_order() {
        let market = Market::builder("m1", event(), MarketKind::moneyline())
            .raw_quote("BookX", "Lakers", dec!(2.10))
            .raw_quote("BookY", "Celtics", dec!(2.20))
            .raw_quote("BookY", "Lakers", dec!(1.95))
            .build();

        assert_eq!(market.outcome_count(), 2);
        assert_eq!(market.outcomes()[0].name(), "Lakers");
        assert_eq!(market.outcomes()[0].quotes().len(), 2);
        assert_eq!(market.outcomes()[1].quotes()[0].source().as_str(), "BookY");
    }

    #[test]
    fn invalid_quote_is_rejected_not_clamped() {
        let (market, rejected) = Market::builder("m1", event(), MarketKind::moneyline())
            .raw_quote("BookX", "Lakers", dec!(0.5))
            .raw_quote("BookY", "Lakers", dec!(2.00))
            .raw_quote("BookY", "Celtics", dec!(2.20))
            .build_with_rejections();

        assert_eq!(rejected.len(), 1);
        assert!(matches!(rejected[0].error, DomainError::InvalidOdds { .. }));
        assert_eq!(market.outcomes()[0].quotes().len(), 1);
        assert!(market.validate(3).is_ok());
    }

    #[test]
    fn same_source_quote_replaces_previous() {
        let market = Market::builder("m1", event(), MarketKind::moneyline())
            .raw_quote("BookX", "Lakers", dec!(2.10))
            .raw_quote("BookX", "Lakers", dec!(2.05))
            .build();

        let quotes = market.outcomes()[0].quotes();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].price().value(), dec!(2.05));
    }

    #[test]
    fn validate_reports_empty_outcome() {
        let market = Market::builder("m1", event(), MarketKind::moneyline())
            .outcome("Lakers")
            .outcome("Celtics")
            .raw_quote("BookX", "Lakers", dec!(2.10))
            .build();

        assert!(matches!(
            market.validate(3),
            Err(DomainError::EmptyMarket { outcome, .. }) if outcome == "Celtics"
        ));
    }

    #[test]
    fn validate_rejects_unsupported_width() {
        let market = Market::builder("m1", event(), MarketKind::moneyline())
            .raw_quote("BookX", "Only", dec!(2.10))
            .build();
        assert!(matches!(
            market.validate(3),
            Err(DomainError::UnsupportedOutcomeCount { count: 1, max: 3 })
        ));
    }

    #[test]
    fn player_prop_kind_strips_prefix() {
        let kind = MarketKind::player_prop("player_points", "LeBron James", dec!(25.5));
        match &kind {
            MarketKind::PlayerProp { prop_type, .. } => assert_eq!(prop_type, "points"),
            MarketKind::Game { .. } => panic!("expected player prop"),
        }
        assert!(kind.is_player_prop());
        assert_eq!(kind.to_string(), "LeBron James points 25.5");
    }

    #[test]
    fn retain_quotes_keeps_outcomes_declared() {
        let market = Market::builder("m1", event(), MarketKind::moneyline())
            .raw_quote("BookX", "Lakers", dec!(2.10))
            .raw_quote("BookY", "Celtics", dec!(2.20))
            .build();

        let filtered = market.retain_quotes(|q| q.source().as_str() == "BookX");
        assert_eq!(filtered.outcome_count(), 2);
        assert!(filtered.outcomes()[1].quotes().is_empty());
    }
}
