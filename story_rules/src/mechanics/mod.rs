//! Story mechanics: the closed set of player stats, stat adjustments, and the
//! changes a committed choice reports back to the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lowest value any stat can reach.
pub const STAT_FLOOR: i32 = 0;

/// Ceiling for bounded stats (health and reputation).
pub const STAT_CEILING: i32 = 100;

/// Maximum number of stat adjustments a single option may carry.
pub const MAX_STAT_CHANGES: usize = 2;

/// The player stats a choice can adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Health,
    Reputation,
    Resources,
}

impl StatKind {
    /// Every stat, in display order.
    pub const ALL: [StatKind; 3] = [StatKind::Health, StatKind::Reputation, StatKind::Resources];

    /// Key used in content files.
    pub fn key(&self) -> &'static str {
        match self {
            StatKind::Health => "health",
            StatKind::Reputation => "reputation",
            StatKind::Resources => "resources",
        }
    }

    /// Human-readable label used in change descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Health => "Health",
            StatKind::Reputation => "Reputation",
            StatKind::Resources => "Resources",
        }
    }

    /// Upper bound for this stat. Resources are unbounded above.
    pub fn ceiling(&self) -> Option<i32> {
        match self {
            StatKind::Health | StatKind::Reputation => Some(STAT_CEILING),
            StatKind::Resources => None,
        }
    }

    /// Clamp a raw value into this stat's valid range.
    pub fn clamp(&self, value: i32) -> i32 {
        let floored = value.max(STAT_FLOOR);
        match self.ceiling() {
            Some(ceiling) => floored.min(ceiling),
            None => floored,
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a stat name is not one of the known stats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stat '{0}'")]
pub struct UnknownStat(pub String);

impl FromStr for StatKind {
    type Err = UnknownStat;

    /// Accepts the English keys and the Spanish names used by older content.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" | "salud" => Ok(StatKind::Health),
            "reputation" | "reputacion" => Ok(StatKind::Reputation),
            "resources" | "recursos" => Ok(StatKind::Resources),
            _ => Err(UnknownStat(s.to_string())),
        }
    }
}

/// A requested adjustment to one stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    pub stat: StatKind,
    pub delta: i32,
}

impl StatChange {
    pub fn new(stat: StatKind, delta: i32) -> Self {
        Self { stat, delta }
    }
}

/// A change actually applied to the player by a committed choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    /// A stat moved by `delta` (after clamping).
    Stat { stat: StatKind, delta: i32 },

    /// A new item entered the inventory.
    ItemGained { item: String },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Stat { stat, delta } => write!(f, "{}: {:+}", stat.label(), delta),
            Change::ItemGained { item } => write!(f, "Obtained: {}", item),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_clamping() {
        assert_eq!(StatKind::Health.clamp(150), 100);
        assert_eq!(StatKind::Health.clamp(-3), 0);
        assert_eq!(StatKind::Reputation.clamp(55), 55);
        assert_eq!(StatKind::Resources.clamp(500), 500);
        assert_eq!(StatKind::Resources.clamp(-1), 0);
    }

    #[test]
    fn test_stat_parsing() {
        assert_eq!("health".parse::<StatKind>(), Ok(StatKind::Health));
        assert_eq!("Salud".parse::<StatKind>(), Ok(StatKind::Health));
        assert_eq!("recursos".parse::<StatKind>(), Ok(StatKind::Resources));
        assert_eq!(
            "charisma".parse::<StatKind>(),
            Err(UnknownStat("charisma".to_string()))
        );
    }

    #[test]
    fn test_change_display() {
        let loss = Change::Stat {
            stat: StatKind::Health,
            delta: -20,
        };
        assert_eq!(loss.to_string(), "Health: -20");

        let gain = Change::Stat {
            stat: StatKind::Reputation,
            delta: 5,
        };
        assert_eq!(gain.to_string(), "Reputation: +5");

        let item = Change::ItemGained {
            item: "lantern".to_string(),
        };
        assert_eq!(item.to_string(), "Obtained: lantern");
    }
}
