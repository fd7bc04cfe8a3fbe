//! Append-only battle records exchanged between the combat system and the world.

use serde::{Deserialize, Serialize};

use crate::{EntityId, EntityKind, ItemSnapshot};

/// One simultaneous exchange of damage between the player and a hostile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Health change applied to the player. Never positive.
    pub player_health_delta: f64,
    /// Health change applied to the enemy. Never positive.
    pub enemy_health_delta: f64,
    /// Weapons and armour worn down during the round, as they were before it.
    pub items_used: Vec<ItemSnapshot>,
}

/// Complete encounter between the player and a single hostile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Battle {
    /// Identifier of the opposing entity.
    pub enemy: EntityId,
    /// Kind of the opposing entity.
    pub enemy_kind: EntityKind,
    /// Player health when the battle started.
    pub initial_player_health: f64,
    /// Enemy health when the battle started.
    pub initial_enemy_health: f64,
    /// Rounds in the order they were fought.
    pub rounds: Vec<Round>,
}

impl Battle {
    /// Player health after the final round.
    #[must_use]
    pub fn final_player_health(&self) -> f64 {
        self.rounds
            .iter()
            .fold(self.initial_player_health, |health, round| {
                health + round.player_health_delta
            })
    }

    /// Enemy health after the final round.
    #[must_use]
    pub fn final_enemy_health(&self) -> f64 {
        self.rounds
            .iter()
            .fold(self.initial_enemy_health, |health, round| {
                health + round.enemy_health_delta
            })
    }

    /// Reports whether the player is still standing after the battle.
    #[must_use]
    pub fn player_survived(&self) -> bool {
        self.final_player_health() > 0.0
    }

    /// Reports whether the enemy was killed.
    #[must_use]
    pub fn enemy_defeated(&self) -> bool {
        self.final_enemy_health() <= 0.0
    }
}
