//! Surebet - Sports betting arbitrage detection and stake allocation.
//!
//! Given prices from several sportsbooks for the same event, the engine finds
//! the combination of books that guarantees a profit whatever the result, and
//! splits a bankroll so every outcome pays the same.
//!
//! # Architecture
//!
//! - **`domain`** - The pure engine: odds conversion, implied probability,
//!   combination search, stake allocation, confidence classification and
//!   record assembly
//! - **`adapter`** - Parsers for manual uploads and odds-feed payloads, plus
//!   CSV export
//! - **`cli`** - The `surebet` command surface
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Markets, quotes, combinations and opportunity records
//! - [`adapter`] - Input parsing and CSV export
//! - [`error`] - Error types for the crate
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use surebet::domain::{Detector, EventInfo, Market, MarketKind};
//!
//! let market = Market::builder("m1", EventInfo::new("Lakers vs Celtics", "NBA"), MarketKind::moneyline())
//!     .raw_quote("BookX", "Lakers", dec!(2.10))
//!     .raw_quote("BookY", "Celtics", dec!(2.20))
//!     .build();
//!
//! let records = Detector::default().scan(&[market]);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].guaranteed_profit(), dec!(74.42));
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
