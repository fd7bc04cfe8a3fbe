//! Numeric tuning values supplied by a dungeon configuration file.

use serde::{Deserialize, Serialize};

use crate::EntityKind;

/// Flat configuration consumed by the world and systems.
///
/// Every field falls back to [`DungeonConfig::default`] when absent from the
/// source file. Unknown keys are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Starting health of the player.
    pub player_health: f64,
    /// Base attack of the player.
    pub player_attack: f64,
    /// Starting health of each spider.
    pub spider_health: f64,
    /// Attack of each spider.
    pub spider_attack: f64,
    /// Starting health of each zombie.
    pub zombie_health: f64,
    /// Attack of each zombie.
    pub zombie_attack: f64,
    /// Starting health of each mercenary.
    pub mercenary_health: f64,
    /// Attack of each mercenary.
    pub mercenary_attack: f64,
    /// Attack bonus contributed by each ally.
    pub ally_attack: f64,
    /// Defence bonus contributed by each ally.
    pub ally_defence: f64,
    /// Largest Chebyshev distance at which a mercenary can be bribed.
    pub bribe_radius: u32,
    /// Treasure consumed by a bribe.
    pub bribe_amount: u32,
    /// Attack bonus granted by a sword.
    pub sword_attack: f64,
    /// Rounds a sword lasts.
    pub sword_durability: u32,
    /// Rounds a bow lasts.
    pub bow_durability: u32,
    /// Defence granted by a shield.
    pub shield_defence: f64,
    /// Rounds a shield lasts.
    pub shield_durability: u32,
    /// Ticks between spider spawns; zero disables spiders.
    pub spider_spawn_rate: u64,
    /// Ticks between zombie spawns; zero disables zombies.
    pub zombie_spawn_rate: u64,
    /// Treasure required by the treasure goal.
    pub treasure_goal: u32,
    /// Enemies required by the enemies goal.
    pub enemy_goal: u32,
    /// Seed for every random stream in the simulation.
    pub seed: u64,
}

impl DungeonConfig {
    /// Starting health and attack for a hostile kind.
    #[must_use]
    pub fn enemy_stats(&self, kind: EntityKind) -> Option<(f64, f64)> {
        match kind {
            EntityKind::Spider => Some((self.spider_health, self.spider_attack)),
            EntityKind::ZombieToast => Some((self.zombie_health, self.zombie_attack)),
            EntityKind::Mercenary => Some((self.mercenary_health, self.mercenary_attack)),
            _ => None,
        }
    }

    /// Durability a freshly collected or crafted item starts with.
    #[must_use]
    pub fn durability_of(&self, kind: EntityKind) -> Option<u32> {
        match kind {
            EntityKind::Sword => Some(self.sword_durability),
            EntityKind::Bow => Some(self.bow_durability),
            EntityKind::Shield => Some(self.shield_durability),
            _ => None,
        }
    }
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            player_health: 10.0,
            player_attack: 10.0,
            spider_health: 5.0,
            spider_attack: 5.0,
            zombie_health: 5.0,
            zombie_attack: 6.0,
            mercenary_health: 10.0,
            mercenary_attack: 5.0,
            ally_attack: 3.0,
            ally_defence: 3.0,
            bribe_radius: 1,
            bribe_amount: 1,
            sword_attack: 2.0,
            sword_durability: 5,
            bow_durability: 3,
            shield_defence: 2.0,
            shield_durability: 3,
            spider_spawn_rate: 0,
            zombie_spawn_rate: 0,
            treasure_goal: 1,
            enemy_goal: 1,
            seed: 0,
        }
    }
}
