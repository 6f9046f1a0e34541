//! Content loading - turns a TOML or JSON story file into a validated graph.
//!
//! Content is parsed into loose "raw" records first so that stat names can be
//! checked against the closed stat set and reported with the offending node.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use super::{CharacterProfile, DifficultyLevel, StoryGraph, StoryNode, StoryOption};
use crate::mechanics::{StatChange, StatKind, MAX_STAT_CHANGES};

/// Errors raised while loading or resolving story content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML content: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported content format for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("node '{node}' has an option with unknown stat '{stat}'")]
    UnknownStat { node: String, stat: String },

    #[error("node '{node}' option {index} has {count} stat adjustments (at most two allowed)")]
    TooManyStatChanges {
        node: String,
        index: usize,
        count: usize,
    },

    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("story node with an empty id")]
    EmptyNodeId,

    #[error("ending node '{0}' must not offer options")]
    EndingWithOptions(String),

    #[error("story node '{0}' is missing")]
    MissingNode(String),

    #[error("node '{node}' option {index} leads to missing node '{target}' and there is no fallback ending")]
    UnresolvedTarget {
        node: String,
        index: usize,
        target: String,
    },

    #[error("fallback node '{0}' is not an ending")]
    FallbackNotEnding(String),
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    characters: Vec<CharacterProfile>,
    #[serde(default)]
    difficulties: Vec<DifficultyLevel>,
    #[serde(default)]
    nodes: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, alias = "is_ending")]
    ending: bool,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    text: String,
    #[serde(alias = "next_node_id")]
    next: String,
    #[serde(default)]
    stats: Vec<RawStatChange>,
    #[serde(default)]
    item: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStatChange {
    stat: String,
    delta: i32,
}

impl RawNode {
    fn into_node(self) -> Result<StoryNode, ContentError> {
        let mut options = Vec::with_capacity(self.options.len());

        for (index, raw) in self.options.into_iter().enumerate() {
            if raw.stats.len() > MAX_STAT_CHANGES {
                return Err(ContentError::TooManyStatChanges {
                    node: self.id,
                    index,
                    count: raw.stats.len(),
                });
            }

            let mut stat_changes = Vec::with_capacity(raw.stats.len());
            for change in raw.stats {
                let stat: StatKind = change.stat.parse().map_err(|_| ContentError::UnknownStat {
                    node: self.id.clone(),
                    stat: change.stat.clone(),
                })?;
                stat_changes.push(StatChange::new(stat, change.delta));
            }

            options.push(StoryOption {
                text: raw.text,
                next_node_id: raw.next,
                stat_changes,
                item: raw.item.filter(|item| !item.trim().is_empty()),
            });
        }

        Ok(StoryNode {
            id: self.id,
            title: self.title,
            text: self.text,
            image: self.image,
            options,
            is_ending: self.ending,
        })
    }
}

impl RawContent {
    fn into_graph(self) -> Result<StoryGraph, ContentError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(RawNode::into_node)
            .collect::<Result<Vec<_>, _>>()?;

        let graph = StoryGraph::build(nodes, self.characters, self.difficulties)?;
        info!(
            nodes = graph.len(),
            characters = graph.characters().len(),
            dangling = graph.dangling_targets().len(),
            "story content loaded"
        );
        Ok(graph)
    }
}

impl StoryGraph {
    /// Parse story content from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ContentError> {
        let raw: RawContent = toml::from_str(input)?;
        raw.into_graph()
    }

    /// Parse story content from a JSON document.
    pub fn from_json_str(input: &str) -> Result<Self, ContentError> {
        let raw: RawContent = serde_json::from_str(input)?;
        raw.into_graph()
    }

    /// Load story content from a file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let read = || {
            std::fs::read_to_string(path).map_err(|source| ContentError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&read()?),
            Some("json") => Self::from_json_str(&read()?),
            _ => Err(ContentError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}
