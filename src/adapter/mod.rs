//! Adapters between external data and the engine.
//!
//! - [`upload`] - Manually prepared JSON or CSV odds files
//! - [`odds_api`] - Odds-feed JSON payloads (game lines and player props)
//! - [`export`] - CSV serialisation of opportunity records

pub mod export;
pub mod odds_api;
pub mod upload;
