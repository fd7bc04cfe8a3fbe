#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves battles between the player and co-located
//! hostiles into complete battle records.

use dungeonmania_core::{
    Battle, Command, DungeonConfig, EntityKind, EntitySnapshot, EntityView, InventoryView,
    ItemSnapshot, PlayerSnapshot, Round,
};

/// Upper bound on rounds fought in a single battle.
///
/// Pairings where neither side can damage the other stop here with both
/// sides alive.
pub const MAX_ROUNDS: usize = 1_000;

/// Combat system that emits one `Command::CommitBattle` per hostile fought.
#[derive(Debug)]
pub struct Combat {
    config: DungeonConfig,
}

impl Combat {
    /// Creates a combat system using the stats of the supplied configuration.
    #[must_use]
    pub fn new(config: DungeonConfig) -> Self {
        Self { config }
    }

    /// Fights every hostile sharing the player's cell in registry order.
    ///
    /// Each battle starts from the health and loadout left by the previous
    /// one. Planning stops as soon as the player would die.
    pub fn handle(
        &self,
        player: Option<&PlayerSnapshot>,
        inventory: &InventoryView,
        entity_view: &EntityView,
        out: &mut Vec<Command>,
    ) {
        let Some(player) = player else {
            return;
        };

        let mut health = player.health;
        let mut loadout: Vec<ItemSnapshot> = inventory.iter().copied().collect();

        for enemy in entity_view.at(player.position) {
            if !enemy.is_hostile() {
                continue;
            }
            let Some(battle) = self.fight(enemy, health, player.allies, &mut loadout) else {
                continue;
            };
            health = battle.final_player_health();
            out.push(Command::CommitBattle { battle });
            if health <= 0.0 {
                break;
            }
        }
    }

    fn fight(
        &self,
        enemy: &EntitySnapshot,
        player_health: f64,
        allies: u32,
        loadout: &mut Vec<ItemSnapshot>,
    ) -> Option<Battle> {
        let (enemy_health, enemy_attack) = self.config.enemy_stats(enemy.kind)?;
        let allies = f64::from(allies);

        let mut player_remaining = player_health;
        let mut enemy_remaining = enemy_health;
        let mut rounds = Vec::new();

        while player_remaining > 0.0 && enemy_remaining > 0.0 && rounds.len() < MAX_ROUNDS {
            let items_used = equipped(loadout);
            let has = |kind: EntityKind| items_used.iter().any(|item| item.kind == kind);

            let mut attack = self.config.player_attack;
            if has(EntityKind::Sword) {
                attack += self.config.sword_attack;
            }
            if has(EntityKind::Bow) {
                attack *= 2.0;
            }
            attack += self.config.ally_attack * allies;

            let mut defence = self.config.ally_defence * allies;
            if has(EntityKind::Shield) {
                defence += self.config.shield_defence;
            }

            let round = Round {
                player_health_delta: -((enemy_attack - defence).max(0.0) / 10.0),
                enemy_health_delta: -(attack.max(0.0) / 5.0),
                items_used,
            };
            player_remaining += round.player_health_delta;
            enemy_remaining += round.enemy_health_delta;
            wear(loadout, &round.items_used);
            rounds.push(round);
        }

        Some(Battle {
            enemy: enemy.id,
            enemy_kind: enemy.kind,
            initial_player_health: player_health,
            initial_enemy_health: enemy_health,
            rounds,
        })
    }
}

/// First sword, bow and shield in inventory order.
fn equipped(loadout: &[ItemSnapshot]) -> Vec<ItemSnapshot> {
    let mut used: Vec<ItemSnapshot> = Vec::new();
    for item in loadout {
        let wanted = matches!(
            item.kind,
            EntityKind::Sword | EntityKind::Bow | EntityKind::Shield
        );
        if wanted && !used.iter().any(|held| held.kind == item.kind) {
            used.push(*item);
        }
    }
    used
}

fn wear(loadout: &mut Vec<ItemSnapshot>, used: &[ItemSnapshot]) {
    for item in used {
        if let Some(slot) = loadout.iter_mut().find(|held| held.id == item.id) {
            slot.durability = slot.durability.map(|uses| uses.saturating_sub(1));
        }
    }
    loadout.retain(|item| item.durability != Some(0));
}
