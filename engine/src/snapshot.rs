//! Serialisable response describing the dungeon after an action.

use dungeonmania_core::{Battle, EntityId, EntitySnapshot, ItemSnapshot, Position, Round};
use dungeonmania_world::{query, World};
use serde::{Deserialize, Serialize};

/// Complete observable state of a dungeon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonSnapshot {
    /// Identifier of the running game.
    pub dungeon_id: String,
    /// Name the dungeon was loaded under.
    pub dungeon_name: String,
    /// Ticks processed so far.
    pub tick: u64,
    /// Entities on the map in registry order.
    pub entities: Vec<EntityResponse>,
    /// Items held by the player in pick-up order.
    pub inventory: Vec<ItemResponse>,
    /// Every battle fought so far.
    pub battles: Vec<BattleResponse>,
    /// Kinds the player could craft right now.
    pub buildables: Vec<String>,
    /// `":<goal>"` while the goal is unmet, empty once met.
    pub goals: String,
}

/// Entity entry of a [`DungeonSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityResponse {
    /// Entity identifier.
    pub id: EntityId,
    /// Entity type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Cell occupied by the entity.
    pub position: Position,
    /// Whether the entity currently accepts interactions.
    pub is_interactable: bool,
}

/// Inventory entry of a [`DungeonSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse {
    /// Item identifier.
    pub id: EntityId,
    /// Item type name.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Battle entry of a [`DungeonSnapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResponse {
    /// Type name of the enemy fought.
    pub enemy: String,
    /// Rounds in the order they were fought.
    pub rounds: Vec<RoundResponse>,
    /// Player health before the first round.
    pub initial_player_health: f64,
    /// Enemy health before the first round.
    pub initial_enemy_health: f64,
}

/// Round entry of a [`BattleResponse`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResponse {
    /// Change of the player's health.
    pub delta_player_health: f64,
    /// Change of the enemy's health.
    pub delta_enemy_health: f64,
    /// Weapons and armour used during the round.
    pub weaponry_used: Vec<ItemResponse>,
}

impl DungeonSnapshot {
    pub(crate) fn capture(dungeon_id: &str, dungeon_name: &str, world: &World) -> Self {
        let goal = query::goal(world);
        let goals = if query::goal_met(world) {
            String::new()
        } else {
            format!(":{}", goal.as_str())
        };

        Self {
            dungeon_id: dungeon_id.to_owned(),
            dungeon_name: dungeon_name.to_owned(),
            tick: query::tick_index(world),
            entities: query::entity_view(world)
                .iter()
                .map(EntityResponse::from)
                .collect(),
            inventory: query::inventory_view(world)
                .iter()
                .map(ItemResponse::from)
                .collect(),
            battles: query::battles(world).iter().map(BattleResponse::from).collect(),
            buildables: query::buildables(world)
                .into_iter()
                .map(|kind| kind.as_str().to_owned())
                .collect(),
            goals,
        }
    }
}

impl From<&EntitySnapshot> for EntityResponse {
    fn from(entity: &EntitySnapshot) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind.as_str().to_owned(),
            position: entity.position,
            is_interactable: entity.interactable,
        }
    }
}

impl From<&ItemSnapshot> for ItemResponse {
    fn from(item: &ItemSnapshot) -> Self {
        Self {
            id: item.id,
            kind: item.kind.as_str().to_owned(),
        }
    }
}

impl From<&Battle> for BattleResponse {
    fn from(battle: &Battle) -> Self {
        Self {
            enemy: battle.enemy_kind.as_str().to_owned(),
            rounds: battle.rounds.iter().map(RoundResponse::from).collect(),
            initial_player_health: battle.initial_player_health,
            initial_enemy_health: battle.initial_enemy_health,
        }
    }
}

impl From<&Round> for RoundResponse {
    fn from(round: &Round) -> Self {
        Self {
            delta_player_health: round.player_health_delta,
            delta_enemy_health: round.enemy_health_delta,
            weaponry_used: round.items_used.iter().map(ItemResponse::from).collect(),
        }
    }
}
