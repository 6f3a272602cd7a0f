//! Pre-match event filtering.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

use super::market::{EventInfo, Market};

/// Which events are still worth pricing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Keep events flagged as in play.
    #[serde(default)]
    pub include_live: bool,

    /// Drop events starting within this many minutes.
    #[serde(default)]
    pub grace_minutes: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            include_live: false,
            grace_minutes: 0,
        }
    }
}

/// Longest grace window accepted by configuration: one week.
pub const MAX_GRACE_MINUTES: i64 = 7 * 24 * 60;

/// What to do with an event whose start time is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownStart {
    Keep,
    Drop,
}

/// Decide whether an event is still pre-match at `now`.
///
/// Events already started or starting less than `grace_minutes` from now are
/// dropped, as are live events unless `include_live` is set. A grace window
/// too large to represent drops every timed event.
#[must_use]
pub fn is_prematch(
    event: &EventInfo,
    schedule: &ScheduleConfig,
    unknown: UnknownStart,
    now: DateTime<Utc>,
) -> bool {
    if event.live {
        return schedule.include_live;
    }
    match event.commence_time {
        Some(start) => match Duration::try_minutes(schedule.grace_minutes) {
            Some(grace) => start > now && start.signed_duration_since(now) >= grace,
            None => false,
        },
        None => unknown == UnknownStart::Keep,
    }
}

/// Keep only the markets whose event is still pre-match.
#[must_use]
pub fn retain_prematch(
    markets: Vec<Market>,
    schedule: &ScheduleConfig,
    unknown: UnknownStart,
    now: DateTime<Utc>,
) -> Vec<Market> {
    let before = markets.len();
    let kept: Vec<Market> = markets
        .into_iter()
        .filter(|m| is_prematch(m.event(), schedule, unknown, now))
        .collect();
    if kept.len() < before {
        debug!(dropped = before - kept.len(), "Dropped started or live events");
    }
    kept
}
