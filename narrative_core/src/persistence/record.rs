//! The persisted save record.
//!
//! Keys are written in the original Spanish form and the English names are
//! accepted as aliases. Unknown keys are ignored so newer saves still load.

use serde::{Deserialize, Serialize};
use story_rules::{DecisionEntry, Inventory, PlayerState, Stats};

use crate::engine::{SessionId, SessionMetadata};

/// Current save record version.
pub const SAVE_VERSION: u32 = 1;

fn default_version() -> u32 {
    SAVE_VERSION
}

/// One decision-log entry as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    #[serde(alias = "nodo")]
    pub node: String,
    #[serde(alias = "eleccion")]
    pub choice: String,
}

/// A complete snapshot of a session: player state plus session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    #[serde(rename = "nombre", alias = "name")]
    pub name: String,

    #[serde(rename = "salud", alias = "health")]
    pub health: i32,

    #[serde(rename = "reputacion", alias = "reputation")]
    pub reputation: i32,

    #[serde(rename = "recursos", alias = "resources")]
    pub resources: i32,

    #[serde(rename = "inventario", alias = "inventory")]
    pub inventory: Vec<String>,

    #[serde(rename = "decisiones", alias = "decisions")]
    pub decisions: Vec<DecisionRecord>,

    #[serde(rename = "nodo_actual", alias = "currentNode")]
    pub current_node: String,

    #[serde(rename = "dificultad", alias = "difficulty")]
    pub difficulty: String,

    #[serde(rename = "personaje_actual", alias = "character")]
    pub character: String,
}

impl SaveRecord {
    /// Snapshot a live player and its metadata.
    pub fn capture(
        player: &PlayerState,
        metadata: &SessionMetadata,
        session_id: Option<SessionId>,
    ) -> Self {
        let stats = player.stats();
        Self {
            version: SAVE_VERSION,
            session_id,
            name: player.name().to_string(),
            health: stats.health(),
            reputation: stats.reputation(),
            resources: stats.resources(),
            inventory: player.inventory().items().to_vec(),
            decisions: player
                .decisions()
                .iter()
                .map(|d| DecisionRecord {
                    node: d.node_id.clone(),
                    choice: d.choice_text.clone(),
                })
                .collect(),
            current_node: player.current_node_id().to_string(),
            difficulty: metadata.difficulty_key.clone(),
            character: metadata.character_key.clone(),
        }
    }

    /// Rebuild a player and metadata. Stats are re-clamped and the inventory
    /// de-duplicated.
    pub fn into_parts(self) -> (PlayerState, SessionMetadata, Option<SessionId>) {
        let player = PlayerState::restore(
            self.name,
            Stats::new(self.health, self.reputation, self.resources),
            Inventory::from_items(self.inventory),
            self.decisions
                .into_iter()
                .map(|d| DecisionEntry::new(d.node, d.choice))
                .collect(),
            self.current_node,
        );
        let metadata = SessionMetadata::new(self.character, self.difficulty);
        (player, metadata, self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player() -> PlayerState {
        let mut player = PlayerState::new("Ana", "pasillo");
        player.record_decision("inicio", "Enter");
        player.grant_item("key");
        player
    }

    #[test]
    fn test_serializes_spanish_keys() {
        let record = SaveRecord::capture(&sample_player(), &SessionMetadata::new("ana", "normal"), None);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["nombre"], "Ana");
        assert_eq!(value["salud"], 100);
        assert_eq!(value["reputacion"], 50);
        assert_eq!(value["recursos"], 3);
        assert_eq!(value["inventario"][0], "key");
        assert_eq!(value["decisiones"][0]["node"], "inicio");
        assert_eq!(value["decisiones"][0]["choice"], "Enter");
        assert_eq!(value["nodo_actual"], "pasillo");
        assert_eq!(value["dificultad"], "normal");
        assert_eq!(value["personaje_actual"], "ana");
        assert!(value.get("session_id").is_none());
    }

    #[test]
    fn test_accepts_english_keys_and_ignores_extras() {
        let json = r#"{
            "name": "Sam",
            "health": 70,
            "reputation": 20,
            "resources": 9,
            "inventory": ["map"],
            "decisions": [{ "nodo": "inicio", "eleccion": "Run" }],
            "currentNode": "bosque",
            "difficulty": "dificil",
            "character": "sam",
            "soundtrack_volume": 0.4
        }"#;

        let record: SaveRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.version, SAVE_VERSION);
        assert_eq!(record.name, "Sam");
        assert_eq!(record.decisions[0].choice, "Run");
        assert_eq!(record.current_node, "bosque");
    }

    #[test]
    fn test_missing_required_key_fails() {
        let json = r#"{ "nombre": "Sam", "salud": 70 }"#;
        assert!(serde_json::from_str::<SaveRecord>(json).is_err());
    }

    #[test]
    fn test_into_parts_normalizes() {
        let record = SaveRecord {
            version: SAVE_VERSION,
            session_id: None,
            name: "Edge".to_string(),
            health: 180,
            reputation: -4,
            resources: 12,
            inventory: vec!["coin".to_string(), "coin".to_string()],
            decisions: vec![],
            current_node: "inicio".to_string(),
            difficulty: "facil".to_string(),
            character: "jason".to_string(),
        };

        let (player, metadata, _) = record.into_parts();
        assert_eq!(player.stats(), &Stats::new(100, 0, 12));
        assert_eq!(player.inventory().items(), ["coin"]);
        assert_eq!(metadata.character_key, "jason");
    }
}
