//! Arbitrage detection over markets and batches.
//!
//! [`Detector`] applies the source whitelist and the sanity band to a
//! market's quotes, runs the combination search, and assembles a record for
//! the winner. Batch scans skip failing markets and never abort.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::confidence::ConfidenceConfig;
use super::error::DomainError;
use super::market::{Market, PriceQuote};
use super::money::{Money, Percent};
use super::opportunity::{assemble_record, OpportunityRecord};
use super::search::{find_best_combination, SearchCriteria};

/// Stake and search settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Bankroll split across each opportunity.
    #[serde(default = "default_total_stake")]
    pub total_stake: Money,

    /// Opportunities below this profit are not reported.
    #[serde(default)]
    pub min_profit_pct: Percent,

    /// Widest market searched.
    #[serde(default = "default_max_outcomes")]
    pub max_outcomes: usize,
}

fn default_total_stake() -> Money {
    dec!(1000)
}

const fn default_max_outcomes() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            total_stake: default_total_stake(),
            min_profit_pct: Decimal::ZERO,
            max_outcomes: default_max_outcomes(),
        }
    }
}

/// Bounds used to discard implausible prices and combinations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SanityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Quotes below this price are excluded.
    #[serde(default = "default_min_price")]
    pub min_price: Decimal,

    /// Quotes above this price are excluded.
    #[serde(default = "default_max_price")]
    pub max_price: Decimal,

    /// Combinations with a lower implied probability are treated as stale data.
    #[serde(default = "default_min_implied_probability")]
    pub min_implied_probability: Decimal,
}

const fn default_true() -> bool {
    true
}

fn default_min_price() -> Decimal {
    dec!(1.01)
}

fn default_max_price() -> Decimal {
    dec!(15.0)
}

fn default_min_implied_probability() -> Decimal {
    dec!(0.80)
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_price: default_min_price(),
            max_price: default_max_price(),
            min_implied_probability: default_min_implied_probability(),
        }
    }
}

impl SanityConfig {
    /// Sanity checks switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn accepts(&self, price: Decimal) -> bool {
        !self.enabled || (self.min_price..=self.max_price).contains(&price)
    }
}

/// Sources whose quotes are considered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourcesConfig {
    /// Source names to keep. Empty keeps every source.
    #[serde(default)]
    pub allowed: Vec<String>,
}

impl SourcesConfig {
    fn accepts(&self, source: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|s| s.eq_ignore_ascii_case(source))
    }
}

/// Per-market and per-batch arbitrage detection.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    engine: EngineConfig,
    confidence: ConfidenceConfig,
    sanity: SanityConfig,
    sources: SourcesConfig,
}

impl Detector {
    /// Detector with default sanity checks that accepts every source.
    #[must_use]
    pub fn new(engine: EngineConfig, confidence: ConfidenceConfig) -> Self {
        Self {
            engine,
            confidence,
            sanity: SanityConfig::default(),
            sources: SourcesConfig::default(),
        }
    }

    /// Replace the price sanity band.
    #[must_use]
    pub fn with_sanity(mut self, sanity: SanityConfig) -> Self {
        self.sanity = sanity;
        self
    }

    /// Restrict quotes to the allowed sportsbooks.
    #[must_use]
    pub fn with_sources(mut self, sources: SourcesConfig) -> Self {
        self.sources = sources;
        self
    }

    /// Engine settings in effect.
    #[must_use]
    pub const fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Search thresholds derived from the engine and sanity settings.
    #[must_use]
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            max_outcomes: self.engine.max_outcomes,
            min_profit_pct: self.engine.min_profit_pct,
            min_implied_probability: self
                .sanity
                .enabled
                .then_some(self.sanity.min_implied_probability),
        }
    }

    /// Copy of `market` with excluded sources and out-of-band prices removed.
    #[must_use]
    pub fn candidate_quotes(&self, market: &Market) -> Market {
        market.retain_quotes(|quote| self.keep_quote(market, quote))
    }

    fn keep_quote(&self, market: &Market, quote: &PriceQuote) -> bool {
        if !self.sources.accepts(quote.source().as_str()) {
            return false;
        }
        let price = quote.price().value();
        if !self.sanity.accepts(price) {
            warn!(
                market = %market.id(),
                source = %quote.source(),
                outcome = quote.outcome(),
                %price,
                "Excluding quote outside sanity band"
            );
            return false;
        }
        true
    }

    /// Detect the best arbitrage in one market.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyMarket`] when an outcome has no candidate
    /// quotes left, and [`DomainError::UnsupportedOutcomeCount`] for markets
    /// wider than `max_outcomes`.
    pub fn detect_market(&self, market: &Market) -> Result<Option<OpportunityRecord>, DomainError> {
        let candidates = self.candidate_quotes(market);
        let Some(combination) = find_best_combination(&candidates, &self.criteria())? else {
            debug!(market = %market.id(), "No arbitrage");
            return Ok(None);
        };
        let record = assemble_record(
            &candidates,
            combination,
            self.engine.total_stake,
            &self.confidence,
        )?;
        debug!(
            market = %market.id(),
            profit_pct = %record.profit_percentage().round_dp(2),
            warning = %record.warning().level,
            "Arbitrage found"
        );
        Ok(Some(record))
    }

    /// Evaluate a batch of markets.
    ///
    /// Markets that fail are logged and skipped. Records come back sorted by
    /// profit, highest first; equal profits keep input order.
    #[must_use]
    pub fn scan(&self, markets: &[Market]) -> Vec<OpportunityRecord> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for market in markets {
            match self.detect_market(market) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(DomainError::EmptyMarket { market, outcome }) => {
                    skipped += 1;
                    debug!(%market, %outcome, "Skipping market with unquoted outcome");
                }
                Err(error) => {
                    skipped += 1;
                    warn!(market = %market.id(), error = %error, "Skipping market");
                }
            }
        }

        records.sort_by(|a, b| b.profit_percentage().cmp(&a.profit_percentage()));

        info!(
            markets = markets.len(),
            opportunities = records.len(),
            skipped,
            "Scan complete"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::confidence::WarningLevel;
    use crate::domain::market::{EventInfo, MarketKind};

    fn market(id: &str, quotes: &[(&str, &str, Decimal)]) -> Market {
        let mut builder =
            Market::builder(id, EventInfo::new("A vs B", "NBA"), MarketKind::moneyline());
        for (source, outcome, price) in quotes {
            builder = builder.raw_quote(*source, *outcome, *price);
        }
        builder.build()
    }

    fn detector() -> Detector {
        Detector::new(EngineConfig::default(), ConfidenceConfig::default())
    }

    #[test]
    fn detects_and_assembles() {
        let m = market("m1", &[("BookX", "A", dec!(2.10)), ("BookY", "B", dec!(2.20))]);
        let record = detector().detect_market(&m).unwrap().unwrap();

        assert_eq!(record.allocation().stakes().iter().sum::<Decimal>(), dec!(1000));
        assert_eq!(record.warning().level, WarningLevel::Moderate);
    }

    #[test]
    fn no_record_without_arbitrage() {
        let m = market("m1", &[("BookX", "A", dec!(1.80)), ("BookY", "B", dec!(1.90))]);
        assert!(detector().detect_market(&m).unwrap().is_none());
    }

    #[test]
    fn whitelist_removes_sources() {
        let m = market(
            "m1",
            &[
                ("BookX", "A", dec!(2.10)),
                ("BookY", "B", dec!(2.20)),
                ("BookZ", "B", dec!(1.70)),
            ],
        );
        let detector = detector().with_sources(SourcesConfig {
            allowed: vec!["bookx".into(), "BookZ".into()],
        });
        assert!(detector.detect_market(&m).unwrap().is_none());
    }

    #[test]
    fn sanity_band_excludes_extreme_prices() {
        let m = market(
            "m1",
            &[("BookX", "A", dec!(40.0)), ("BookY", "B", dec!(1.05))],
        );
        assert!(detector().detect_market(&m).is_err());

        let unchecked = detector().with_sanity(SanityConfig::disabled());
        assert!(unchecked.detect_market(&m).unwrap().is_some());
    }

    #[test]
    fn scan_skips_bad_markets_and_sorts_by_profit() {
        let markets = vec![
            market("small", &[("BookX", "A", dec!(2.02)), ("BookY", "B", dec!(2.02))]),
            market("empty", &[("BookX", "A", dec!(0.5)), ("BookY", "B", dec!(2.2))]),
            market("large", &[("BookX", "A", dec!(2.10)), ("BookY", "B", dec!(2.20))]),
            market("none", &[("BookX", "A", dec!(1.80)), ("BookY", "B", dec!(1.90))]),
        ];

        let records = detector().scan(&markets);
        let ids: Vec<_> = records.iter().map(|r| r.market_id().as_str()).collect();
        assert_eq!(ids, vec!["large", "small"]);
    }

    #[test]
    fn scan_keeps_input_order_for_equal_profit() {
        let quotes = [("BookX", "A", dec!(2.10)), ("BookY", "B", dec!(2.20))];
        let markets = vec![market("first", &quotes), market("second", &quotes)];

        let records = detector().scan(&markets);
        assert_eq!(records[0].market_id().as_str(), "first");
        assert_eq!(records[1].market_id().as_str(), "second");
    }

    #[test]
    fn min_profit_filters_records() {
        let engine = EngineConfig {
            min_profit_pct: dec!(10),
            ..EngineConfig::default()
        };
        let detector = Detector::new(engine, ConfidenceConfig::default());
        let m = market("m1", &[("BookX", "A", dec!(2.10)), ("BookY", "B", dec!(2.20))]);
        assert!(detector.detect_market(&m).unwrap().is_none());
    }
}
