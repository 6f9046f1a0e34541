//! Narrative Engine - session lifecycle and the single state transition.
//!
//! The engine owns the story graph and the live player. A session moves
//! through three states:
//!
//! 1. **NoSession**: nothing loaded; `start_new_game` or `load` leave it
//! 2. **InProgress**: the current node offers options; `choose_option` advances
//! 3. **Ended**: the current node is an ending; only a new game or a load leave it
//!
//! Every committed choice is autosaved. A failed autosave is reported on the
//! returned [`Transition`] and never undoes the choice.

mod session;

pub use session::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use story_rules::{Change, ContentError, PlayerState, StoryGraph, StoryNode};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, SessionSettings};
use crate::persistence::{PersistError, SaveRecord, SaveStore, SaveSummary};

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("choice submitted for node '{submitted}' but the current node is '{expected}'")]
    StaleChoice { expected: String, submitted: String },

    #[error("node '{node}' has no option {index}")]
    UnknownOption { node: String, index: usize },

    #[error("no active session")]
    NoSession,

    #[error("the story has ended at '{node}'")]
    SessionEnded { node: String },
}

impl EngineError {
    /// Errors the presentation layer should drop without telling the player.
    pub fn is_recoverable_silently(&self) -> bool {
        matches!(self, EngineError::StaleChoice { .. })
    }

    /// Whether this error means there is no usable save to load.
    pub fn is_no_usable_save(&self) -> bool {
        matches!(self, EngineError::Persist(e) if e.is_no_usable_save())
    }
}

/// The outcome of a committed choice.
#[derive(Debug)]
pub struct Transition {
    /// Changes applied to the player, in application order.
    pub changes: Vec<Change>,

    /// The node the player now stands on.
    pub next_node: StoryNode,

    /// Whether `next_node` is an ending.
    pub ended: bool,

    /// Set when the autosave after this choice failed.
    pub autosave_error: Option<PersistError>,
}

impl Transition {
    /// Human-readable change lines, e.g. `"Health: -20"`.
    pub fn change_descriptions(&self) -> Vec<String> {
        self.changes.iter().map(ToString::to_string).collect()
    }
}

/// The branching-narrative state machine.
pub struct NarrativeEngine {
    graph: Arc<StoryGraph>,
    config: EngineConfig,
    store: SaveStore,
    session: Option<Session>,
}

impl NarrativeEngine {
    /// Create an engine over preloaded content.
    ///
    /// Every option target must resolve: either to a node in the graph or,
    /// when the content has dangling targets, to the configured fallback
    /// ending. Anything else fails here rather than at choice time.
    pub fn new(graph: Arc<StoryGraph>, config: EngineConfig) -> Result<Self, ContentError> {
        check_targets(&graph, &config.session)?;

        let store = SaveStore::new(config.persistence.save_path.clone());
        Ok(Self {
            graph,
            config,
            store,
            session: None,
        })
    }

    /// Load content from a story file and create an engine over it.
    pub fn from_content_file(
        path: impl AsRef<Path>,
        config: EngineConfig,
    ) -> Result<Self, ContentError> {
        let graph = StoryGraph::load(path)?;
        Self::new(Arc::new(graph), config)
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn save_store(&self) -> &SaveStore {
        &self.store
    }

    /// Start a fresh session, replacing any current one.
    ///
    /// The start node is resolved from the character and difficulty keys; if
    /// that node does not exist, the configured default start node is used.
    pub fn start_new_game(
        &mut self,
        player_name: &str,
        character_key: &str,
        difficulty_key: &str,
    ) -> Result<&StoryNode, EngineError> {
        let start_id = resolve_start_node(
            &self.graph,
            &self.config.session,
            character_key,
            difficulty_key,
        )?;

        if !self.graph.characters().is_empty() && self.graph.character(character_key).is_none() {
            warn!(character = character_key, "character is not in the roster");
        }
        if !self.graph.difficulties().is_empty() && self.graph.difficulty(difficulty_key).is_none() {
            warn!(difficulty = difficulty_key, "difficulty is not in the roster");
        }

        let session = Session {
            id: SessionId::new(),
            player: PlayerState::new(player_name, start_id.as_str()),
            metadata: SessionMetadata::new(character_key, difficulty_key),
        };
        info!(
            session = %session.id,
            player = player_name,
            character = character_key,
            difficulty = difficulty_key,
            node = %start_id,
            "new game started"
        );
        self.session = Some(session);

        self.graph
            .get(&start_id)
            .ok_or_else(|| ContentError::MissingNode(start_id).into())
    }

    /// The node the player stands on, or `None` without an active session.
    pub fn current_node(&self) -> Option<&StoryNode> {
        let player = &self.session.as_ref()?.player;
        if !player.has_active_node() {
            return None;
        }
        self.graph.get(player.current_node_id())
    }

    pub fn status(&self) -> SessionStatus {
        match self.current_node() {
            None => SessionStatus::NoSession,
            Some(node) if node.is_ending => SessionStatus::Ended,
            Some(_) => SessionStatus::InProgress,
        }
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.session.as_ref().map(|s| &s.player)
    }

    pub fn metadata(&self) -> Option<&SessionMetadata> {
        self.session.as_ref().map(|s| &s.metadata)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Apply the option at `option_index` of the node the caller is showing.
    ///
    /// `node_id` must be the current node; a choice made against a node the
    /// player has already left fails with [`EngineError::StaleChoice`] and
    /// changes nothing. Not reentrant: callers serialize submissions.
    pub fn choose_option(
        &mut self,
        node_id: &str,
        option_index: usize,
    ) -> Result<Transition, EngineError> {
        let graph = Arc::clone(&self.graph);
        let session = self.session.as_mut().ok_or(EngineError::NoSession)?;

        let current_id = session.player.current_node_id();
        if current_id != node_id {
            debug!(current = current_id, submitted = node_id, "stale choice ignored");
            return Err(EngineError::StaleChoice {
                expected: current_id.to_string(),
                submitted: node_id.to_string(),
            });
        }

        let node = graph
            .get(current_id)
            .ok_or_else(|| ContentError::MissingNode(current_id.to_string()))?;
        if node.is_ending {
            return Err(EngineError::SessionEnded {
                node: node.id.clone(),
            });
        }
        let option = node.option(option_index).ok_or_else(|| EngineError::UnknownOption {
            node: node.id.clone(),
            index: option_index,
        })?;
        let next = resolve_target(&graph, &self.config.session, &option.next_node_id)?;

        // Everything below commits; nothing past this point can fail.
        let player = &mut session.player;
        player.record_decision(node.id.as_str(), option.text.as_str());

        let mut changes = Vec::new();
        for change in &option.stat_changes {
            changes.extend(player.apply_stat_change(*change));
        }
        if let Some(item) = &option.item {
            changes.extend(player.grant_item(item));
        }
        player.move_to(next.id.as_str());

        info!(
            session = %session.id,
            from = %node.id,
            to = %next.id,
            changes = changes.len(),
            "choice committed"
        );

        let autosave_error = if self.config.persistence.autosave {
            let record = SaveRecord::capture(&session.player, &session.metadata, Some(session.id));
            match self.store.save(&record) {
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "autosave failed; play continues");
                    Some(e)
                }
            }
        } else {
            None
        };

        Ok(Transition {
            changes,
            next_node: next.clone(),
            ended: next.is_ending,
            autosave_error,
        })
    }

    /// Save the live session.
    pub fn save(&self) -> Result<PathBuf, EngineError> {
        let session = self.session.as_ref().ok_or(EngineError::NoSession)?;
        let record = SaveRecord::capture(&session.player, &session.metadata, Some(session.id));
        Ok(self.store.save(&record)?)
    }

    /// Replace the live session with the saved one.
    ///
    /// On any failure the current session is left untouched.
    pub fn load(&mut self) -> Result<&StoryNode, EngineError> {
        let record = match self.store.load() {
            Ok(record) => record,
            Err(e @ PersistError::NotFound { .. }) => {
                info!(path = %self.store.path().display(), "no saved game");
                return Err(e.into());
            }
            Err(e) => {
                warn!(error = %e, "saved game is not usable");
                return Err(e.into());
            }
        };

        let (player, metadata, saved_id) = record.into_parts();
        let node_id = player.current_node_id().to_string();
        if !self.graph.contains(&node_id) {
            let e = PersistError::Corrupt {
                path: self.store.path().to_path_buf(),
                reason: format!("current node '{node_id}' is not in the story"),
            };
            warn!(error = %e, "saved game is not usable");
            return Err(e.into());
        }

        let session = Session {
            id: saved_id.unwrap_or_default(),
            player,
            metadata,
        };
        info!(session = %session.id, node = %node_id, "game loaded");
        self.session = Some(session);

        self.graph
            .get(&node_id)
            .ok_or_else(|| ContentError::MissingNode(node_id).into())
    }

    /// Whether a save file exists.
    pub fn has_saved_game(&self) -> bool {
        self.store.exists()
    }

    /// Summarize the save for a "continue" entry.
    pub fn peek_save(&self) -> Result<SaveSummary, EngineError> {
        Ok(self.store.peek()?)
    }

    /// Discard the live session. Returns `false` if there was none.
    pub fn exit_to_menu(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                info!(session = %session.id, "session closed");
                true
            }
            None => false,
        }
    }

    /// Overview of the live session, for an ending screen.
    pub fn summary(&self) -> Option<SessionSummary> {
        let session = self.session.as_ref()?;
        let player = &session.player;
        Some(SessionSummary {
            player_name: player.name().to_string(),
            character_key: session.metadata.character_key.clone(),
            character_name: self
                .graph
                .character(&session.metadata.character_key)
                .map(|c| c.name.clone()),
            difficulty_key: session.metadata.difficulty_key.clone(),
            stats: *player.stats(),
            inventory: player.inventory().items().to_vec(),
            decision_count: player.decisions().len(),
            ended: self.status() == SessionStatus::Ended,
        })
    }
}

/// Pick the start node for a character and difficulty, falling back to the
/// default start node.
fn resolve_start_node(
    graph: &StoryGraph,
    settings: &SessionSettings,
    character_key: &str,
    difficulty_key: &str,
) -> Result<String, ContentError> {
    let preferred = settings.start_node_for(character_key, difficulty_key);
    if graph.contains(&preferred) {
        return Ok(preferred);
    }

    let fallback = &settings.default_start_node;
    if !graph.contains(fallback) {
        return Err(ContentError::MissingNode(fallback.clone()));
    }
    info!(preferred = %preferred, fallback = %fallback, "using default start node");
    Ok(fallback.clone())
}

/// Check that the fallback ending, if configured, is a real ending, and that
/// dangling targets have somewhere to go.
fn check_targets(graph: &StoryGraph, settings: &SessionSettings) -> Result<(), ContentError> {
    if let Some(id) = &settings.fallback_ending_node {
        return match graph.get(id) {
            None => Err(ContentError::MissingNode(id.clone())),
            Some(node) if !node.is_ending => Err(ContentError::FallbackNotEnding(id.clone())),
            Some(_) => Ok(()),
        };
    }

    match graph.dangling_targets().first() {
        Some(dangling) => Err(ContentError::UnresolvedTarget {
            node: dangling.node_id.clone(),
            index: dangling.option_index,
            target: dangling.target.clone(),
        }),
        None => Ok(()),
    }
}

/// Resolve an option target, using the fallback ending for missing nodes.
fn resolve_target<'g>(
    graph: &'g StoryGraph,
    settings: &SessionSettings,
    target: &str,
) -> Result<&'g StoryNode, ContentError> {
    if let Some(node) = graph.get(target) {
        return Ok(node);
    }

    let fallback = settings
        .fallback_ending_node
        .as_deref()
        .and_then(|id| graph.get(id))
        .ok_or_else(|| ContentError::MissingNode(target.to_string()))?;
    warn!(target = target, fallback = %fallback.id, "option target missing; using fallback ending");
    Ok(fallback)
}
