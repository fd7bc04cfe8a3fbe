#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Dungeonmania.

mod interaction;
mod inventory;
mod movement;
mod registry;

use dungeonmania_core::{
    Battle, BoundingBox, BuildError, Command, Direction, DungeonConfig, DungeonDefinition,
    EntityId, EntityKind, EntityState, Event, Goal, MoverClass, Position,
};
use tracing::{debug, warn};

use interaction::InteractionPlan;
use inventory::{Inventory, Item};
use movement::StepPlan;
use registry::EntityRegistry;

/// Combat-relevant state of the living player.
#[derive(Clone, Copy, Debug)]
struct PlayerState {
    id: EntityId,
    health: f64,
    allies: u32,
}

/// Represents the authoritative Dungeonmania world state.
#[derive(Debug)]
pub struct World {
    config: DungeonConfig,
    goal: Goal,
    registry: EntityRegistry,
    inventory: Inventory,
    player: Option<PlayerState>,
    bounds: BoundingBox,
    battles: Vec<Battle>,
    tick_index: u64,
    treasure_collected: u32,
    enemies_defeated: u32,
}

impl World {
    /// Creates a world populated from a dungeon definition.
    ///
    /// The bounding box is computed here, once, from the loaded entities. Only
    /// the first player placement is honoured.
    #[must_use]
    pub fn new(definition: &DungeonDefinition, config: DungeonConfig) -> Self {
        let bounds = BoundingBox::enclosing(
            definition
                .entities
                .iter()
                .map(|placement| placement.position),
        )
        .unwrap_or_else(|| BoundingBox::new(0, 0, 0, 0));

        let mut world = Self {
            player: None,
            registry: EntityRegistry::new(),
            inventory: Inventory::new(),
            goal: definition.goal,
            battles: Vec::new(),
            tick_index: 0,
            treasure_collected: 0,
            enemies_defeated: 0,
            bounds,
            config,
        };

        for placement in &definition.entities {
            if placement.kind == EntityKind::Player && world.player.is_some() {
                warn!(position = ?placement.position, "ignoring additional player placement");
                continue;
            }
            let id = world
                .registry
                .spawn(placement.kind, placement.position, placement.key);
            if placement.kind == EntityKind::Player {
                world.player = Some(PlayerState {
                    id,
                    health: world.config.player_health,
                    allies: 0,
                });
            }
        }

        debug!(
            entities = definition.entities.len(),
            ?bounds,
            "world loaded"
        );
        world
    }

    fn player_position(&self) -> Option<Position> {
        let player = self.player.as_ref()?;
        self.registry.get(player.id).map(|entity| entity.position)
    }

    fn can_enter(&self, mover: MoverClass, cell: Position) -> bool {
        movement::can_enter(&self.registry, &self.bounds, mover, cell)
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(player_id) = self.player.as_ref().map(|player| player.id) else {
            return;
        };
        let Some(entity) = self.registry.get_mut(player_id) else {
            return;
        };
        let from = entity.position;
        entity.previous_position = from;

        let key = self.inventory.key().and_then(|item| item.key);
        let plan = movement::plan_step(
            &self.registry,
            &self.bounds,
            MoverClass::Player,
            from,
            direction,
            key,
        );
        let StepPlan::Advance { to, push, unlock } = plan else {
            out_events.push(Event::MoveBlocked {
                entity: player_id,
                direction,
            });
            return;
        };

        if let Some((boulder, beyond)) = push {
            if let Some(entity) = self.registry.get_mut(boulder) {
                entity.previous_position = entity.position;
                entity.position = beyond;
                out_events.push(Event::BoulderPushed {
                    boulder,
                    from: to,
                    to: beyond,
                });
            }
        }

        if let Some(door) = unlock {
            if let Some(entity) = self.registry.get_mut(door) {
                if let EntityState::Door { locked, .. } = &mut entity.state {
                    *locked = false;
                }
            }
            if let Some(key_id) = self.inventory.key().map(|item| item.id) {
                let _ = self.inventory.remove(key_id);
            }
            out_events.push(Event::DoorUnlocked { door });
        }

        if let Some(entity) = self.registry.get_mut(player_id) {
            entity.position = to;
        }
        out_events.push(Event::EntityMoved {
            entity: player_id,
            from,
            to,
        });

        self.collect_items(to, out_events);
    }

    fn collect_items(&mut self, cell: Position, out_events: &mut Vec<Event>) {
        let collectables: Vec<EntityId> = self
            .registry
            .at(cell)
            .filter(|entity| entity.kind.capabilities().is_collectable)
            .map(|entity| entity.id)
            .collect();

        for id in collectables {
            let Some(entity) = self.registry.get(id) else {
                continue;
            };
            if entity.kind == EntityKind::Key && self.inventory.key().is_some() {
                continue;
            }
            let Some(entity) = self.registry.remove(id) else {
                continue;
            };
            let key = match entity.state {
                EntityState::Key { key } => key,
                _ => None,
            };
            self.inventory.push(Item {
                id,
                kind: entity.kind,
                durability: self.config.durability_of(entity.kind),
                key,
            });
            if entity.kind == EntityKind::Treasure {
                self.treasure_collected = self.treasure_collected.saturating_add(1);
            }
            out_events.push(Event::ItemCollected {
                item: id,
                kind: entity.kind,
            });
        }
    }

    fn step_entity(&mut self, id: EntityId, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(entity) = self.registry.get(id) else {
            return;
        };
        let Some(mover) = entity.kind.mover_class() else {
            return;
        };
        if mover == MoverClass::Player {
            return;
        }

        let from = entity.position;
        let plan = movement::plan_step(&self.registry, &self.bounds, mover, from, direction, None);
        let StepPlan::Advance { to, .. } = plan else {
            out_events.push(Event::MoveBlocked {
                entity: id,
                direction,
            });
            return;
        };

        if let Some(entity) = self.registry.get_mut(id) {
            entity.previous_position = from;
            entity.position = to;
            if let EntityState::Spider { facing } = &mut entity.state {
                *facing = direction;
            }
        }
        out_events.push(Event::EntityMoved {
            entity: id,
            from,
            to,
        });
    }

    fn spawn_spider(&mut self, cell: Position, out_events: &mut Vec<Event>) {
        if !self.bounds.is_on_perimeter(cell) || !self.can_enter(MoverClass::Spider, cell) {
            debug!(?cell, "spider spawn rejected");
            return;
        }
        let entity = self.registry.spawn(EntityKind::Spider, cell, None);
        out_events.push(Event::EntitySpawned {
            entity,
            kind: EntityKind::Spider,
            cell,
        });
    }

    fn spawn_zombie(&mut self, spawner: EntityId, cell: Position, out_events: &mut Vec<Event>) {
        let adjacent = self.registry.get(spawner).is_some_and(|entity| {
            entity.kind == EntityKind::ZombieToastSpawner
                && entity.position.is_cardinally_adjacent(cell)
        });
        if !adjacent || !self.can_enter(MoverClass::Zombie, cell) {
            debug!(spawner = %spawner, ?cell, "zombie spawn rejected");
            return;
        }
        let entity = self.registry.spawn(EntityKind::ZombieToast, cell, None);
        out_events.push(Event::EntitySpawned {
            entity,
            kind: EntityKind::ZombieToast,
            cell,
        });
    }

    fn set_switch(&mut self, switch: EntityId, triggered: bool, out_events: &mut Vec<Event>) {
        let Some(entity) = self.registry.get_mut(switch) else {
            return;
        };
        let EntityState::Switch { triggered: current } = &mut entity.state else {
            return;
        };
        if *current != triggered {
            *current = triggered;
            out_events.push(Event::SwitchChanged { switch, triggered });
        }
    }

    fn commit_battle(&mut self, battle: Battle, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if !self.registry.contains(battle.enemy) {
            warn!(enemy = %battle.enemy, "battle against missing enemy discarded");
            return;
        }

        player.health = battle.final_player_health();
        for round in &battle.rounds {
            for item in &round.items_used {
                if self.inventory.wear(item.id) {
                    debug!(item = %item.id, kind = %item.kind, "item broke");
                }
            }
        }

        let player_id = player.id;
        let player_survived = player.health > 0.0;
        let enemy = battle.enemy;
        let enemy_kind = battle.enemy_kind;
        let enemy_defeated = battle.enemy_defeated();
        debug!(
            enemy = %enemy,
            kind = %enemy_kind,
            rounds = battle.rounds.len(),
            player_health = player.health,
            "battle committed"
        );
        out_events.push(Event::BattleResolved {
            enemy,
            enemy_kind,
            rounds: battle.rounds.len(),
            player_survived,
        });
        self.battles.push(battle);

        if enemy_defeated {
            let _ = self.registry.remove(enemy);
            self.enemies_defeated = self.enemies_defeated.saturating_add(1);
            out_events.push(Event::EnemyDefeated {
                enemy,
                kind: enemy_kind,
            });
        }

        if !player_survived {
            let _ = self.registry.remove(player_id);
            self.player = None;
            out_events.push(Event::PlayerDefeated { player: player_id });
        }
    }

    fn interact(&mut self, target: EntityId, out_events: &mut Vec<Event>) {
        let plan = match interaction::plan(self, target) {
            Ok(plan) => plan,
            Err(reason) => {
                debug!(entity = %target, %reason, "interaction rejected");
                out_events.push(Event::InteractionRejected {
                    entity: target,
                    reason,
                });
                return;
            }
        };

        match plan {
            InteractionPlan::Bribe { mercenary, payment } => {
                for item in payment {
                    let _ = self.inventory.remove(item);
                }
                if let Some(entity) = self.registry.get_mut(mercenary) {
                    entity.state = EntityState::Mercenary { ally: true };
                    entity.interactable = false;
                }
                if let Some(player) = self.player.as_mut() {
                    player.allies = player.allies.saturating_add(1);
                }
                out_events.push(Event::MercenaryBribed { mercenary });
            }
            InteractionPlan::DestroySpawner { spawner } => {
                let _ = self.registry.remove(spawner);
                out_events.push(Event::SpawnerDestroyed { spawner });
            }
        }
    }

    fn build(&mut self, kind: EntityKind, out_events: &mut Vec<Event>) {
        let consumed = if self.player.is_none() {
            Err(BuildError::PlayerDefeated)
        } else {
            kind.recipe()
                .ok_or(BuildError::NotBuildable)
                .and_then(|recipe| {
                    self.inventory
                        .plan_recipe(&recipe)
                        .ok_or(BuildError::MissingMaterials)
                })
        };
        let consumed = match consumed {
            Ok(consumed) => consumed,
            Err(reason) => {
                debug!(%kind, %reason, "build rejected");
                out_events.push(Event::BuildRejected { kind, reason });
                return;
            }
        };

        for item in consumed {
            let _ = self.inventory.remove(item);
        }
        let item = self.registry.allocate_id();
        self.inventory.push(Item {
            id: item,
            kind,
            durability: self.config.durability_of(kind),
            key: None,
        });
        out_events.push(Event::ItemBuilt { item, kind });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AdvanceTick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TickAdvanced {
                tick: world.tick_index,
            });
        }
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::StepEntity { entity, direction } => {
            world.step_entity(entity, direction, out_events);
        }
        Command::SpawnSpider { cell } => world.spawn_spider(cell, out_events),
        Command::SpawnZombie { spawner, cell } => world.spawn_zombie(spawner, cell, out_events),
        Command::SetSwitchState { switch, triggered } => {
            world.set_switch(switch, triggered, out_events);
        }
        Command::CommitBattle { battle } => world.commit_battle(battle, out_events),
        Command::Interact { entity } => world.interact(entity, out_events),
        Command::Build { kind } => world.build(kind, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use dungeonmania_core::{
        Battle, BoundingBox, DungeonConfig, EntityKind, EntityState, EntityView, Goal,
        InventoryView, MoverClass, PlayerSnapshot, Position, BUILDABLE_KINDS,
    };

    use super::World;

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Bounding box computed when the world was loaded.
    #[must_use]
    pub fn bounds(world: &World) -> BoundingBox {
        world.bounds
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &DungeonConfig {
        &world.config
    }

    /// Win condition of the dungeon.
    #[must_use]
    pub fn goal(world: &World) -> Goal {
        world.goal
    }

    /// Captures a read-only view of every entity in registry order.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        EntityView::from_snapshots(world.registry.iter().map(|entity| entity.snapshot()).collect())
    }

    /// Captures the player's state, or `None` once the player was defeated.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        let player = world.player.as_ref()?;
        let entity = world.registry.get(player.id)?;
        Some(PlayerSnapshot {
            id: player.id,
            position: entity.position,
            previous_position: entity.previous_position,
            health: player.health,
            allies: player.allies,
        })
    }

    /// Captures the inventory in pick-up order.
    #[must_use]
    pub fn inventory_view(world: &World) -> InventoryView {
        world.inventory.view()
    }

    /// Battle history in the order battles were fought.
    #[must_use]
    pub fn battles(world: &World) -> &[Battle] {
        &world.battles
    }

    /// Kinds the player could craft right now.
    #[must_use]
    pub fn buildables(world: &World) -> Vec<EntityKind> {
        if world.player.is_none() {
            return Vec::new();
        }
        BUILDABLE_KINDS
            .into_iter()
            .filter(|kind| {
                kind.recipe()
                    .is_some_and(|recipe| world.inventory.plan_recipe(&recipe).is_some())
            })
            .collect()
    }

    /// Reports whether a keyless mover of the given class may stand on `cell`.
    #[must_use]
    pub fn can_enter(world: &World, mover: MoverClass, cell: Position) -> bool {
        world.can_enter(mover, cell)
    }

    /// Treasure picked up over the whole session.
    #[must_use]
    pub fn treasure_collected(world: &World) -> u32 {
        world.treasure_collected
    }

    /// Hostiles defeated over the whole session.
    #[must_use]
    pub fn enemies_defeated(world: &World) -> u32 {
        world.enemies_defeated
    }

    /// Reports whether the dungeon's goal is currently satisfied.
    #[must_use]
    pub fn goal_met(world: &World) -> bool {
        match world.goal {
            Goal::Exit => world.player_position().is_some_and(|position| {
                world
                    .registry
                    .at(position)
                    .any(|entity| entity.kind == EntityKind::Exit)
            }),
            Goal::Boulders => {
                let mut switches = world
                    .registry
                    .iter()
                    .filter(|entity| entity.kind == EntityKind::Switch)
                    .peekable();
                switches.peek().is_some()
                    && switches
                        .all(|entity| matches!(entity.state, EntityState::Switch { triggered: true }))
            }
            Goal::Treasure => world.treasure_collected >= world.config.treasure_goal,
            Goal::Enemies => {
                world.enemies_defeated >= world.config.enemy_goal
                    && !world
                        .registry
                        .iter()
                        .any(|entity| entity.kind == EntityKind::ZombieToastSpawner)
            }
        }
    }
}
