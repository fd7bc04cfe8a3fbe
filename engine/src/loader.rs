//! JSON loading of dungeon definitions and configuration files.

use std::{fs, path::Path};

use dungeonmania_core::{
    DungeonConfig, DungeonDefinition, EntityKind, EntityPlacement, Goal, Position,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while loading a dungeon or its configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The goal is not one of the single goals the engine supports.
    #[error("unsupported goal: {0}")]
    UnsupportedGoal(String),
    /// The dungeon places no player.
    #[error("dungeon has no player")]
    MissingPlayer,
}

#[derive(Deserialize)]
struct RawDungeon {
    entities: Vec<RawEntity>,
    #[serde(rename = "goal-condition")]
    goal_condition: RawGoal,
}

#[derive(Deserialize)]
struct RawEntity {
    #[serde(rename = "type")]
    kind: String,
    x: i32,
    y: i32,
    #[serde(default)]
    key: Option<u32>,
}

#[derive(Deserialize)]
struct RawGoal {
    goal: String,
}

/// Parses a dungeon definition from its JSON text.
///
/// Entities of unknown type are skipped with a warning.
pub fn parse_dungeon(json: &str) -> Result<DungeonDefinition, LoadError> {
    let raw: RawDungeon = serde_json::from_str(json)?;

    let goal: Goal = raw
        .goal_condition
        .goal
        .parse()
        .map_err(|error: dungeonmania_core::UnsupportedGoal| LoadError::UnsupportedGoal(error.0))?;

    let mut entities = Vec::with_capacity(raw.entities.len());
    for entity in raw.entities {
        let kind = match entity.kind.parse::<EntityKind>() {
            Ok(kind) => kind,
            Err(error) => {
                warn!(%error, x = entity.x, y = entity.y, "skipping entity");
                continue;
            }
        };
        let mut placement = EntityPlacement::new(kind, Position::new(entity.x, entity.y));
        if let Some(key) = entity.key {
            placement = placement.with_key(key);
        }
        entities.push(placement);
    }

    if !entities
        .iter()
        .any(|placement| placement.kind == EntityKind::Player)
    {
        return Err(LoadError::MissingPlayer);
    }

    Ok(DungeonDefinition { entities, goal })
}

/// Parses a configuration from its JSON text. Missing keys take defaults.
pub fn parse_config(json: &str) -> Result<DungeonConfig, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads and parses a dungeon definition file.
pub fn load_dungeon(path: &Path) -> Result<DungeonDefinition, LoadError> {
    let json = fs::read_to_string(path)?;
    parse_dungeon(&json)
}

/// Reads and parses a configuration file.
pub fn load_config(path: &Path) -> Result<DungeonConfig, LoadError> {
    let json = fs::read_to_string(path)?;
    parse_config(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entities_keys_and_goal() {
        let definition = parse_dungeon(
            r#"{
                "entities": [
                    {"type": "player", "x": 1, "y": 1},
                    {"type": "door", "x": 2, "y": 1, "key": 3},
                    {"type": "zombie_toast_spawner", "x": 4, "y": 4}
                ],
                "goal-condition": {"goal": "enemies"}
            }"#,
        )
        .expect("valid dungeon");

        assert_eq!(definition.goal, Goal::Enemies);
        assert_eq!(definition.entities.len(), 3);
        assert_eq!(definition.entities[1].key, Some(3));
        assert_eq!(definition.entities[2].kind, EntityKind::ZombieToastSpawner);
    }

    #[test]
    fn unknown_entity_types_are_skipped() {
        let definition = parse_dungeon(
            r#"{
                "entities": [
                    {"type": "player", "x": 0, "y": 0},
                    {"type": "invisibility_potion", "x": 1, "y": 0}
                ],
                "goal-condition": {"goal": "exit"}
            }"#,
        )
        .expect("valid dungeon");
        assert_eq!(definition.entities.len(), 1);
    }

    #[test]
    fn compound_goals_are_rejected() {
        let error = parse_dungeon(
            r#"{
                "entities": [{"type": "player", "x": 0, "y": 0}],
                "goal-condition": {"goal": "AND", "subgoals": []}
            }"#,
        )
        .expect_err("compound goal");
        assert!(matches!(error, LoadError::UnsupportedGoal(goal) if goal == "AND"));
    }

    #[test]
    fn dungeon_without_player_is_rejected() {
        let error = parse_dungeon(
            r#"{"entities": [{"type": "wall", "x": 0, "y": 0}], "goal-condition": {"goal": "exit"}}"#,
        )
        .expect_err("missing player");
        assert!(matches!(error, LoadError::MissingPlayer));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(parse_dungeon("{"), Err(LoadError::Json(_))));
    }

    #[test]
    fn config_defaults_fill_missing_keys() {
        let config = parse_config(
            r#"{"bribe_radius": 3, "zombie_spawn_rate": 4, "player_health": 20, "unknown_key": 1}"#,
        )
        .expect("valid config");
        assert_eq!(config.bribe_radius, 3);
        assert_eq!(config.zombie_spawn_rate, 4);
        assert!((config.player_health - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.bribe_amount, DungeonConfig::default().bribe_amount);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = load_config(Path::new("/nonexistent/dungeonmania/config.json"))
            .expect_err("missing file");
        assert!(matches!(error, LoadError::Io(_)));
    }
}
