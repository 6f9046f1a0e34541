//! Session identity and metadata bound to a live player.

use serde::{Deserialize, Serialize};
use story_rules::{PlayerState, Stats};
use uuid::Uuid;

/// Identifies one play-through: it begins with a new game or a load and
/// lasts until the player exits to the menu or another session replaces it.
///
/// The id travels inside save files, so a loaded game keeps the id it was
/// saved under. Saves written before ids existed get a fresh one on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// A fresh random id, used for every new game.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The character and difficulty a session was started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub character_key: String,
    pub difficulty_key: String,
}

impl SessionMetadata {
    pub fn new(character_key: impl Into<String>, difficulty_key: impl Into<String>) -> Self {
        Self {
            character_key: character_key.into(),
            difficulty_key: difficulty_key.into(),
        }
    }
}

/// A live session: the player plus its metadata.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub id: SessionId,
    pub player: PlayerState,
    pub metadata: SessionMetadata,
}

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NoSession,
    InProgress,
    Ended,
}

/// End-of-game overview for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub player_name: String,
    pub character_key: String,
    pub character_name: Option<String>,
    pub difficulty_key: String,
    pub stats: Stats,
    pub inventory: Vec<String>,
    pub decision_count: usize,
    pub ended: bool,
}
