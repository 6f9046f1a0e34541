//! Player state: stats, inventory, the decision log, and the current node.

mod components;

pub use components::*;

use serde::{Deserialize, Serialize};

use crate::mechanics::{Change, StatChange};

/// Sentinel node id meaning "no active session".
pub const NO_ACTIVE_NODE: &str = "";

/// The complete progress record of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    name: String,
    stats: Stats,
    inventory: Inventory,
    decisions: Vec<DecisionEntry>,
    current_node_id: String,
}

impl PlayerState {
    /// Create a fresh player with default stats standing on `start_node`.
    pub fn new(name: impl Into<String>, start_node: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: Stats::default(),
            inventory: Inventory::new(),
            decisions: Vec::new(),
            current_node_id: start_node.into(),
        }
    }

    /// Rebuild a player from persisted parts.
    pub fn restore(
        name: impl Into<String>,
        stats: Stats,
        inventory: Inventory,
        decisions: Vec<DecisionEntry>,
        current_node_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            stats,
            inventory,
            decisions,
            current_node_id: current_node_id.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The decision log, oldest first.
    pub fn decisions(&self) -> &[DecisionEntry] {
        &self.decisions
    }

    pub fn current_node_id(&self) -> &str {
        &self.current_node_id
    }

    /// Whether the player stands on a real node rather than the sentinel.
    pub fn has_active_node(&self) -> bool {
        self.current_node_id != NO_ACTIVE_NODE
    }

    /// Append an entry to the decision log.
    pub fn record_decision(&mut self, node_id: impl Into<String>, choice_text: impl Into<String>) {
        self.decisions.push(DecisionEntry::new(node_id, choice_text));
    }

    /// Apply a stat adjustment. Returns a change only if the stat moved.
    pub fn apply_stat_change(&mut self, change: StatChange) -> Option<Change> {
        let applied = self.stats.apply(change.stat, change.delta);
        (applied != 0).then_some(Change::Stat {
            stat: change.stat,
            delta: applied,
        })
    }

    /// Give the player an item. Returns a change only if it was new.
    pub fn grant_item(&mut self, item: &str) -> Option<Change> {
        self.inventory.add(item).then(|| Change::ItemGained {
            item: item.to_string(),
        })
    }

    /// Move the player to another node.
    pub fn move_to(&mut self, node_id: impl Into<String>) {
        self.current_node_id = node_id.into();
    }
}
