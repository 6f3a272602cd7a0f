//! Confidence classification for detected arbitrages.
//!
//! Large cross-book margins are rare; most of them come from stale or
//! mistyped prices. The classifier tags each combination so consumers know
//! how much manual checking to do before acting on it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Percent;
use super::search::Combination;

/// How suspicious an opportunity looks, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    /// Margin within the typical arbitrage range.
    None,
    /// Margin above typical; re-check the lines.
    VerifyOdds,
    /// Rare margin; prices are likely to move.
    Moderate,
    /// Margin large enough to usually mean a data error.
    Critical,
}

impl WarningLevel {
    /// One tier up, saturating at [`WarningLevel::Critical`].
    #[must_use]
    pub const fn escalate(self) -> Self {
        match self {
            Self::None => Self::VerifyOdds,
            Self::VerifyOdds => Self::Moderate,
            Self::Moderate | Self::Critical => Self::Critical,
        }
    }

    /// Short label for tables and exports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::VerifyOdds => "verify_odds",
            Self::Moderate => "moderate",
            Self::Critical => "critical",
        }
    }

    /// One-line message shown next to the opportunity.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::None => "Valid arbitrage opportunity",
            Self::VerifyOdds => "Above-typical margin - confirm lines",
            Self::Moderate => "High ROI - act quickly",
            Self::Critical => "VERIFY ODDS - ROI suspiciously high",
        }
    }

    /// Longer explanation of what the level means.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::None => "Margin is in the range normally seen between sportsbooks.",
            Self::VerifyOdds => "Unusual margin. Confirm lines and timestamps before staking.",
            Self::Moderate => "Rare but possible margin. Odds may move; verify and place quickly.",
            Self::Critical => {
                "Margins this large usually mean stale or mistyped prices. \
                 Verify the odds manually on each sportsbook before placing any bet."
            }
        }
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profit thresholds separating the warning levels.
///
/// A profit strictly above a threshold reaches that level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfidenceConfig {
    /// Profit above which an opportunity is `critical`.
    #[serde(default = "default_critical_above")]
    pub critical_above: Percent,

    /// Profit above which an opportunity is `moderate`.
    #[serde(default = "default_moderate_above")]
    pub moderate_above: Percent,

    /// Profit above which an opportunity is `verify_odds`.
    #[serde(default = "default_verify_above")]
    pub verify_above: Percent,

    /// Raise the level one tier when a single source prices several outcomes.
    #[serde(default = "default_escalate_shared_source")]
    pub escalate_shared_source: bool,
}

fn default_critical_above() -> Percent {
    dec!(15)
}

fn default_moderate_above() -> Percent {
    dec!(5)
}

fn default_verify_above() -> Percent {
    dec!(2)
}

const fn default_escalate_shared_source() -> bool {
    true
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            critical_above: default_critical_above(),
            moderate_above: default_moderate_above(),
            verify_above: default_verify_above(),
            escalate_shared_source: default_escalate_shared_source(),
        }
    }
}

impl ConfidenceConfig {
    /// Level for a profit margin alone.
    #[must_use]
    pub fn level_for_profit(&self, profit_pct: Percent) -> WarningLevel {
        if profit_pct > self.critical_above {
            WarningLevel::Critical
        } else if profit_pct > self.moderate_above {
            WarningLevel::Moderate
        } else if profit_pct > self.verify_above {
            WarningLevel::VerifyOdds
        } else {
            WarningLevel::None
        }
    }

    /// Level for a combination: profit band, escalated for a reused source.
    #[must_use]
    pub fn classify(&self, combination: &Combination) -> WarningLevel {
        let level = self.level_for_profit(combination.profit_percentage());
        if self.escalate_shared_source && combination.reuses_source() {
            level.escalate()
        } else {
            level
        }
    }

    /// Thresholds must be non-negative and ordered.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        Decimal::ZERO <= self.verify_above
            && self.verify_above <= self.moderate_above
            && self.moderate_above <= self.critical_above
    }
}
