//! Arbitrage detection and stake allocation engine.
//!
//! Everything here is pure and synchronous: markets in, opportunity records
//! out. Fetching quotes and rendering results live in [`crate::adapter`] and
//! [`crate::cli`].

pub mod board;
pub mod confidence;
pub mod detector;
pub mod error;
pub mod filter;
pub mod ids;
pub mod market;
pub mod money;
pub mod odds;
pub mod opportunity;
pub mod probability;
pub mod search;
pub mod stake;

pub use board::{Batch, OpportunityBoard};
pub use confidence::{ConfidenceConfig, WarningLevel};
pub use detector::{Detector, EngineConfig, SanityConfig, SourcesConfig};
pub use error::DomainError;
pub use filter::{is_prematch, retain_prematch, ScheduleConfig, UnknownStart, MAX_GRACE_MINUTES};
pub use ids::{MarketId, SourceId};
pub use market::{EventInfo, Market, MarketBuilder, MarketKind, Outcome, PriceQuote, RejectedQuote};
pub use money::{round_cents, Money, Percent};
pub use odds::{
    american_to_decimal, decimal_to_american, detect_format, parse_odds, Odds, OddsFormat,
};
pub use opportunity::{
    assemble_record, group_player_props, OpportunityRecord, PlayerPropGroup, RecordView, Warning,
};
pub use probability::{has_arbitrage, implied_probability, profit_percentage};
pub use search::{find_best_combination, Combination, SearchCriteria};
pub use stake::{allocate_stakes, guaranteed_profit, StakeAllocation};
