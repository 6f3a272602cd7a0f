//! Opportunity records and the views built over them.
//!
//! An [`OpportunityRecord`] is assembled once per market that yields an
//! arbitrage and is never mutated afterwards. Views and player-prop groups
//! borrow from a record slice; they never recompute numbers.

use rust_decimal::Decimal;
use serde::Serialize;

use super::confidence::{ConfidenceConfig, WarningLevel};
use super::error::DomainError;
use super::ids::MarketId;
use super::market::{EventInfo, Market, MarketKind, PriceQuote};
use super::money::{Money, Percent};
use super::search::Combination;
use super::stake::StakeAllocation;

/// Classification attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Tier assigned by the classifier.
    pub level: WarningLevel,
    /// Summary line shown with the level.
    pub message: &'static str,
    /// One-sentence advice for the tier.
    pub description: &'static str,
}

impl From<WarningLevel> for Warning {
    fn from(level: WarningLevel) -> Self {
        Self {
            level,
            message: level.message(),
            description: level.description(),
        }
    }
}

/// A detected arbitrage with its stake split and classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRecord {
    market_id: MarketId,
    event: EventInfo,
    #[serde(flatten)]
    kind: MarketKind,
    combination: Combination,
    allocation: StakeAllocation,
    warning: Warning,
}

impl OpportunityRecord {
    /// Market the record was detected on.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// Event name, sport and start time.
    #[must_use]
    pub const fn event(&self) -> &EventInfo {
        &self.event
    }

    /// Game or player-prop market details.
    #[must_use]
    pub const fn kind(&self) -> &MarketKind {
        &self.kind
    }

    /// `game` or `player_prop`.
    #[must_use]
    pub const fn market_type(&self) -> &'static str {
        match self.kind {
            MarketKind::Game { .. } => "game",
            MarketKind::PlayerProp { .. } => "player_prop",
        }
    }

    /// Winning quote combination.
    #[must_use]
    pub const fn combination(&self) -> &Combination {
        &self.combination
    }

    /// Selected quotes, one per outcome.
    #[must_use]
    pub fn legs(&self) -> &[PriceQuote] {
        self.combination.legs()
    }

    /// Stakes and payouts per leg.
    #[must_use]
    pub const fn allocation(&self) -> &StakeAllocation {
        &self.allocation
    }

    /// Margin as a percentage of the total stake.
    #[must_use]
    pub const fn profit_percentage(&self) -> Percent {
        self.combination.profit_percentage()
    }

    /// Sum of the selected legs' implied probabilities.
    #[must_use]
    pub const fn implied_probability(&self) -> Decimal {
        self.combination.implied_probability()
    }

    /// Profit locked in whichever outcome wins.
    #[must_use]
    pub const fn guaranteed_profit(&self) -> Money {
        self.allocation.guaranteed_profit()
    }

    /// Confidence classification.
    #[must_use]
    pub const fn warning(&self) -> &Warning {
        &self.warning
    }

    /// Player and prop type for player-prop records.
    #[must_use]
    pub fn prop_key(&self) -> Option<(&str, &str)> {
        match &self.kind {
            MarketKind::PlayerProp {
                player_name,
                prop_type,
                ..
            } => Some((player_name.as_str(), prop_type.as_str())),
            MarketKind::Game { .. } => None,
        }
    }
}

/// Merge a market's winning combination, stake split and warning into a record.
///
/// # Errors
///
/// Propagates [`StakeAllocation::compute`] failures, which cannot occur for a
/// combination produced by the search.
pub fn assemble_record(
    market: &Market,
    combination: Combination,
    total_stake: Money,
    confidence: &ConfidenceConfig,
) -> Result<OpportunityRecord, DomainError> {
    let allocation = StakeAllocation::compute(&combination.prices(), total_stake)?;
    let warning = Warning::from(confidence.classify(&combination));

    Ok(OpportunityRecord {
        market_id: market.id().clone(),
        event: market.event().clone(),
        kind: market.kind().clone(),
        combination,
        allocation,
        warning,
    })
}

/// Which records a view selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordView {
    /// Every record.
    #[default]
    All,
    /// Moneyline, spread and total markets.
    Game,
    /// Player-prop markets only.
    PlayerProp,
}

impl RecordView {
    /// Whether `record` belongs to this view.
    #[must_use]
    pub fn includes(self, record: &OpportunityRecord) -> bool {
        match self {
            Self::All => true,
            Self::Game => !record.kind().is_player_prop(),
            Self::PlayerProp => record.kind().is_player_prop(),
        }
    }

    /// Records selected by this view, in input order.
    #[must_use]
    pub fn select<'a>(self, records: &'a [OpportunityRecord]) -> Vec<&'a OpportunityRecord> {
        records.iter().filter(|r| self.includes(r)).collect()
    }
}

/// Player-prop records sharing a player and prop type.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerPropGroup<'a> {
    /// Player shared by the group.
    pub player_name: &'a str,
    /// Prop type shared by the group.
    pub prop_type: &'a str,
    /// Member records in input order.
    pub records: Vec<&'a OpportunityRecord>,
}

/// Group player-prop records by `(player_name, prop_type)`.
///
/// Groups appear in the order their first record appears, and records keep
/// their input order within a group. Game records are ignored.
#[must_use]
pub fn group_player_props(records: &[OpportunityRecord]) -> Vec<PlayerPropGroup<'_>> {
    let mut groups: Vec<PlayerPropGroup<'_>> = Vec::new();
    for record in records {
        let Some((player_name, prop_type)) = record.prop_key() else {
            continue;
        };
        match groups
            .iter_mut()
            .find(|g| g.player_name == player_name && g.prop_type == prop_type)
        {
            Some(group) => group.records.push(record),
            None => groups.push(PlayerPropGroup {
                player_name,
                prop_type,
                records: vec![record],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::{find_best_combination, SearchCriteria};
    use rust_decimal_macros::dec;

    fn record_for(market: &Market) -> OpportunityRecord {
        let combination = find_best_combination(market, &SearchCriteria::default())
            .unwrap()
            .unwrap();
        assemble_record(market, combination, dec!(1000), &ConfidenceConfig::default()).unwrap()
    }

    fn game(id: &str) -> Market {
        Market::builder(id, EventInfo::new("A vs B", "NBA"), MarketKind::moneyline())
            .raw_quote("BookX", "A", dec!(2.10))
            .raw_quote("BookY", "B", dec!(2.20))
            .build()
    }

    fn prop(id: &str, player: &str, key: &str, line: Decimal) -> Market {
        Market::builder(
            id,
            EventInfo::new("A vs B", "NBA"),
            MarketKind::player_prop(key, player, line),
        )
        .raw_quote("BookX", "Over", dec!(2.05))
        .raw_quote("BookY", "Under", dec!(2.05))
        .build()
    }

    #[test]
    fn assembles_two_way_record() {
        let record = record_for(&game("g1"));

        assert_eq!(record.market_type(), "game");
        assert_eq!(record.profit_percentage().round_dp(2), dec!(7.44));
        assert_eq!(record.guaranteed_profit(), dec!(74.42));
        assert_eq!(record.allocation().stakes(), &[dec!(511.63), dec!(488.37)]);
        assert_eq!(record.warning().level, WarningLevel::Moderate);
        assert!(record.prop_key().is_none());
    }

    #[test]
    fn player_prop_record_carries_prop_fields() {
        let record = record_for(&prop("p1", "LeBron James", "player_points", dec!(25.5)));

        assert_eq!(record.market_type(), "player_prop");
        assert_eq!(record.prop_key(), Some(("LeBron James", "points")));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["market_type"], "player_prop");
        assert_eq!(json["player_name"], "LeBron James");
        assert_eq!(json["warning"]["level"], "verify_odds");
    }

    #[test]
    fn views_are_projections() {
        let records = vec![
            record_for(&game("g1")),
            record_for(&prop("p1", "LeBron James", "player_points", dec!(25.5))),
            record_for(&game("g2")),
        ];

        let games = RecordView::Game.select(&records);
        let props = RecordView::PlayerProp.select(&records);
        let all = RecordView::All.select(&records);

        assert_eq!(games.len(), 2);
        assert_eq!(games[1].market_id().as_str(), "g2");
        assert_eq!(props.len(), 1);
        assert_eq!(all.len(), 3);
        assert!(std::ptr::eq(props[0], &records[1]));
    }

    #[test]
    fn groups_props_in_insertion_order() {
        let records = vec![
            record_for(&prop("p1", "LeBron James", "player_points", dec!(25.5))),
            record_for(&prop("p2", "Jayson Tatum", "player_points", dec!(27.5))),
            record_for(&game("g1")),
            record_for(&prop("p3", "LeBron James", "player_points", dec!(26.5))),
            record_for(&prop("p4", "LeBron James", "player_rebounds", dec!(7.5))),
        ];

        let groups = group_player_props(&records);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].player_name, "LeBron James");
        assert_eq!(groups[0].prop_type, "points");
        let ids: Vec<_> = groups[0].records.iter().map(|r| r.market_id().as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        assert_eq!(groups[1].player_name, "Jayson Tatum");
        assert_eq!(groups[2].prop_type, "rebounds");
    }

    #[test]
    fn grouping_leaves_records_untouched() {
        let records = vec![record_for(&prop("p1", "LeBron James", "player_points", dec!(25.5)))];
        let before = records.clone();
        let _ = group_player_props(&records);
        assert_eq!(records, before);
    }
}
