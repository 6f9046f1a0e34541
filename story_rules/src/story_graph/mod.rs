//! The story graph - the immutable directed graph of story nodes.

mod loader;

pub use loader::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::mechanics::{StatChange, StatKind, MAX_STAT_CHANGES};

/// A player-facing choice attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOption {
    pub text: String,
    pub next_node_id: String,
    /// Zero, one, or two stat adjustments.
    pub stat_changes: Vec<StatChange>,
    /// Item added to the inventory when chosen.
    pub item: Option<String>,
}

impl StoryOption {
    pub fn new(text: impl Into<String>, next_node_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next_node_id: next_node_id.into(),
            stat_changes: Vec::new(),
            item: None,
        }
    }

    /// Add a stat adjustment.
    pub fn with_stat(mut self, stat: StatKind, delta: i32) -> Self {
        self.stat_changes.push(StatChange::new(stat, delta));
        self
    }

    /// Set the item granted by this option.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }
}

/// A single narrative beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    pub id: String,
    pub title: String,
    pub text: String,
    /// Asset name, resolved by the host.
    pub image: Option<String>,
    pub options: Vec<StoryOption>,
    pub is_ending: bool,
}

impl StoryNode {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            image: None,
            options: Vec::new(),
            is_ending: false,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_option(mut self, option: StoryOption) -> Self {
        self.options.push(option);
        self
    }

    /// Mark this node as an ending.
    pub fn ending(mut self) -> Self {
        self.is_ending = true;
        self
    }

    pub fn option(&self, index: usize) -> Option<&StoryOption> {
        self.options.get(index)
    }
}

/// A playable character in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A selectable difficulty level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyLevel {
    pub key: String,
    pub label: String,
}

/// An option whose target does not exist in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingTarget {
    pub node_id: String,
    pub option_index: usize,
    pub target: String,
}

/// The preloaded story content. Read-only once constructed.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    nodes: HashMap<String, StoryNode>,
    characters: Vec<CharacterProfile>,
    difficulties: Vec<DifficultyLevel>,
    dangling: Vec<DanglingTarget>,
}

impl StoryGraph {
    /// Build a graph from nodes alone.
    pub fn from_nodes(nodes: impl IntoIterator<Item = StoryNode>) -> Result<Self, ContentError> {
        Self::build(nodes, Vec::new(), Vec::new())
    }

    /// Build and validate a graph with its roster.
    pub fn build(
        nodes: impl IntoIterator<Item = StoryNode>,
        characters: Vec<CharacterProfile>,
        difficulties: Vec<DifficultyLevel>,
    ) -> Result<Self, ContentError> {
        let mut by_id = HashMap::new();

        for node in nodes {
            if node.id.trim().is_empty() {
                return Err(ContentError::EmptyNodeId);
            }
            if node.is_ending && !node.options.is_empty() {
                return Err(ContentError::EndingWithOptions(node.id));
            }
            for (index, option) in node.options.iter().enumerate() {
                if option.stat_changes.len() > MAX_STAT_CHANGES {
                    return Err(ContentError::TooManyStatChanges {
                        node: node.id.clone(),
                        index,
                        count: option.stat_changes.len(),
                    });
                }
            }
            if by_id.contains_key(&node.id) {
                return Err(ContentError::DuplicateNode(node.id));
            }
            by_id.insert(node.id.clone(), node);
        }

        let mut dangling = Vec::new();
        for node in by_id.values() {
            for (option_index, option) in node.options.iter().enumerate() {
                if !by_id.contains_key(&option.next_node_id) {
                    warn!(
                        node = %node.id,
                        option = option_index,
                        target = %option.next_node_id,
                        "option points at a missing node"
                    );
                    dangling.push(DanglingTarget {
                        node_id: node.id.clone(),
                        option_index,
                        target: option.next_node_id.clone(),
                    });
                }
            }
        }
        dangling.sort_by(|a, b| {
            a.node_id
                .cmp(&b.node_id)
                .then(a.option_index.cmp(&b.option_index))
        });

        Ok(Self {
            nodes: by_id,
            characters,
            difficulties,
            dangling,
        })
    }

    /// Get a node by id.
    pub fn get(&self, id: &str) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterate over all nodes in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn characters(&self) -> &[CharacterProfile] {
        &self.characters
    }

    pub fn character(&self, key: &str) -> Option<&CharacterProfile> {
        self.characters.iter().find(|c| c.key == key)
    }

    pub fn difficulties(&self) -> &[DifficultyLevel] {
        &self.difficulties
    }

    pub fn difficulty(&self, key: &str) -> Option<&DifficultyLevel> {
        self.difficulties.iter().find(|d| d.key == key)
    }

    /// Options that point at nodes missing from the graph, sorted by node.
    pub fn dangling_targets(&self) -> &[DanglingTarget] {
        &self.dangling
    }

    /// Ids of all ending nodes.
    pub fn endings(&self) -> Vec<&str> {
        let mut endings: Vec<_> = self
            .nodes
            .values()
            .filter(|n| n.is_ending)
            .map(|n| n.id.as_str())
            .collect();
        endings.sort_unstable();
        endings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_story() -> Vec<StoryNode> {
        vec![
            StoryNode::new("inicio", "The Gate", "A rusted gate blocks the road.")
                .with_option(StoryOption::new("Climb over", "patio").with_stat(StatKind::Health, -10))
                .with_option(StoryOption::new("Wait", "final")),
            StoryNode::new("patio", "The Yard", "Weeds everywhere.")
                .with_option(StoryOption::new("Search", "final").with_item("key")),
            StoryNode::new("final", "The End", "Night falls.").ending(),
        ]
    }

    #[test]
    fn test_build_and_lookup() {
        let graph = StoryGraph::from_nodes(small_story()).unwrap();

        assert_eq!(graph.len(), 3);
        assert!(graph.contains("patio"));
        assert_eq!(graph.get("inicio").unwrap().options.len(), 2);
        assert!(graph.get("missing").is_none());
        assert_eq!(graph.endings(), vec!["final"]);
        assert!(graph.dangling_targets().is_empty());
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut nodes = small_story();
        nodes.push(StoryNode::new("patio", "Again", "Duplicate."));

        let err = StoryGraph::from_nodes(nodes).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateNode(id) if id == "patio"));
    }

    #[test]
    fn test_ending_with_options_rejected() {
        let nodes = vec![StoryNode::new("final", "End", "Done.")
            .ending()
            .with_option(StoryOption::new("Again?", "final"))];

        let err = StoryGraph::from_nodes(nodes).unwrap_err();
        assert!(matches!(err, ContentError::EndingWithOptions(_)));
    }

    #[test]
    fn test_too_many_stat_changes_rejected() {
        let nodes = vec![StoryNode::new("inicio", "Start", "Text").with_option(
            StoryOption::new("Greedy", "inicio")
                .with_stat(StatKind::Health, 1)
                .with_stat(StatKind::Reputation, 1)
                .with_stat(StatKind::Resources, 1),
        )];

        let err = StoryGraph::from_nodes(nodes).unwrap_err();
        assert!(matches!(err, ContentError::TooManyStatChanges { count: 3, .. }));
    }

    #[test]
    fn test_dangling_targets_collected() {
        let nodes = vec![
            StoryNode::new("inicio", "Start", "Text")
                .with_option(StoryOption::new("Go", "nowhere"))
                .with_option(StoryOption::new("Stay", "inicio")),
        ];

        let graph = StoryGraph::from_nodes(nodes).unwrap();
        assert_eq!(
            graph.dangling_targets(),
            [DanglingTarget {
                node_id: "inicio".to_string(),
                option_index: 0,
                target: "nowhere".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_node_id_rejected() {
        let err = StoryGraph::from_nodes(vec![StoryNode::new(" ", "Blank", "")]).unwrap_err();
        assert!(matches!(err, ContentError::EmptyNodeId));
    }
}
