//! Component definitions for the player record.

use serde::{Deserialize, Serialize};

use crate::mechanics::StatKind;

/// Starting health for a new game.
pub const DEFAULT_HEALTH: i32 = 100;

/// Starting reputation for a new game.
pub const DEFAULT_REPUTATION: i32 = 50;

/// Starting resources for a new game.
pub const DEFAULT_RESOURCES: i32 = 3;

/// Player stats. Values always sit inside each stat's clamped range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    health: i32,
    reputation: i32,
    resources: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: DEFAULT_HEALTH,
            reputation: DEFAULT_REPUTATION,
            resources: DEFAULT_RESOURCES,
        }
    }
}

impl Stats {
    /// Build stats from raw values, clamping each into range.
    pub fn new(health: i32, reputation: i32, resources: i32) -> Self {
        Self {
            health: StatKind::Health.clamp(health),
            reputation: StatKind::Reputation.clamp(reputation),
            resources: StatKind::Resources.clamp(resources),
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    pub fn resources(&self) -> i32 {
        self.resources
    }

    /// Current value of a stat.
    pub fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Health => self.health,
            StatKind::Reputation => self.reputation,
            StatKind::Resources => self.resources,
        }
    }

    /// Apply a delta with clamping. Returns the delta actually applied.
    pub fn apply(&mut self, stat: StatKind, delta: i32) -> i32 {
        let before = self.get(stat);
        let after = stat.clamp(before.saturating_add(delta));
        match stat {
            StatKind::Health => self.health = after,
            StatKind::Reputation => self.reputation = after,
            StatKind::Resources => self.resources = after,
        }
        after - before
    }
}

/// Items held by the player. Duplicates are ignored and first-insertion
/// order is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory from a list, dropping repeated items.
    pub fn from_items(items: impl IntoIterator<Item = String>) -> Self {
        let mut inventory = Self::new();
        for item in items {
            inventory.add(item);
        }
        inventory
    }

    /// Add an item. Returns `false` if it was already held.
    pub fn add(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|held| held == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One committed choice in the decision log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub node_id: String,
    pub choice_text: String,
}

impl DecisionEntry {
    pub fn new(node_id: impl Into<String>, choice_text: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            choice_text: choice_text.into(),
        }
    }
}
