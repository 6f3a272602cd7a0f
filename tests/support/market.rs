use rust_decimal::Decimal;

use surebet::domain::{EventInfo, Market, MarketKind};

/// Moneyline market built from `(source, outcome, price)` triples.
pub fn make_market(id: &str, quotes: &[(&str, &str, Decimal)]) -> Market {
    make_market_with_kind(id, MarketKind::moneyline(), quotes)
}

pub fn make_market_with_kind(
    id: &str,
    kind: MarketKind,
    quotes: &[(&str, &str, Decimal)],
) -> Market {
    quotes
        .iter()
        .fold(
            Market::builder(id, EventInfo::new("Team A vs Team B", "NBA"), kind),
            |builder, (source, outcome, price)| builder.raw_quote(*source, *outcome, *price),
        )
        .build()
}

pub fn make_prop_market(
    id: &str,
    player: &str,
    key: &str,
    line: Decimal,
    over: Decimal,
    under: Decimal,
) -> Market {
    make_market_with_kind(
        id,
        MarketKind::player_prop(key, player, line),
        &[("BookX", "Over", over), ("BookY", "Under", under)],
    )
}
