//! Engine configuration, read from TOML.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Placeholder for the character key in [`SessionSettings::start_node_pattern`].
pub const CHARACTER_PLACEHOLDER: &str = "{character}";

/// Placeholder for the difficulty key in [`SessionSettings::start_node_pattern`].
pub const DIFFICULTY_PLACEHOLDER: &str = "{difficulty}";

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub session: SessionSettings,
    pub persistence: PersistenceSettings,
    pub effects: EffectSettings,
}

/// How sessions start and how missing targets resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Start node used when no character/difficulty specific node exists.
    pub default_start_node: String,

    /// Naming convention for character/difficulty start nodes.
    pub start_node_pattern: String,

    /// Ending used when an option points at a node missing from the graph.
    pub fallback_ending_node: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_start_node: "inicio".to_string(),
            start_node_pattern: "{character}_{difficulty}_inicio".to_string(),
            fallback_ending_node: None,
        }
    }
}

impl SessionSettings {
    /// Resolve the start node id for a character and difficulty.
    pub fn start_node_for(&self, character_key: &str, difficulty_key: &str) -> String {
        self.start_node_pattern
            .replace(CHARACTER_PLACEHOLDER, character_key)
            .replace(DIFFICULTY_PLACEHOLDER, difficulty_key)
    }
}

/// Where and when the game is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    pub save_path: PathBuf,

    /// Save after every committed choice.
    pub autosave: bool,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("saves/partida.json"),
            autosave: true,
        }
    }
}

/// Timing for presentation effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Debounce window for choice submission, in milliseconds.
    pub debounce_ms: u64,

    /// Delay between revealed characters, in milliseconds.
    pub reveal_char_interval_ms: u64,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            reveal_char_interval_ms: 30,
        }
    }
}

impl EffectSettings {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn reveal_char_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_char_interval_ms)
    }
}

impl EngineConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Set the save file location.
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persistence.save_path = path.into();
        self
    }

    /// Enable or disable autosave.
    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.persistence.autosave = autosave;
        self
    }

    /// Set the default start node.
    pub fn with_default_start_node(mut self, id: impl Into<String>) -> Self {
        self.session.default_start_node = id.into();
        self
    }

    /// Set the ending used for options that point at missing nodes.
    pub fn with_fallback_ending(mut self, id: impl Into<String>) -> Self {
        self.session.fallback_ending_node = Some(id.into());
        self
    }

    /// Set the choice debounce window.
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.effects.debounce_ms = ms;
        self
    }

    /// Set the text reveal interval.
    pub fn with_reveal_interval_ms(mut self, ms: u64) -> Self {
        self.effects.reveal_char_interval_ms = ms;
        self
    }
}
