#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestrator that drives the Dungeonmania world through its phases.
//!
//! A [`Dungeon`] owns the authoritative world and the pure systems. Every
//! phase captures fresh views, asks one system for commands, and applies
//! them to the world before the next phase starts.

mod error;
pub mod loader;
mod snapshot;

pub use error::{ActionError, ActionRejection};
pub use snapshot::{BattleResponse, DungeonSnapshot, EntityResponse, ItemResponse, RoundResponse};

use dungeonmania_core::{
    Command, Direction, DungeonConfig, DungeonDefinition, EntityId, EntityKind, Event,
};
use dungeonmania_system_combat::Combat;
use dungeonmania_system_movement::Movement;
use dungeonmania_system_puzzle::Puzzle;
use dungeonmania_system_spawning::{Config as SpawningConfig, SpawnPhase, Spawning};
use dungeonmania_world::{self as world, query, World};
use tracing::{debug, info};

/// Running game: the world plus the systems that advance it.
#[derive(Debug)]
pub struct Dungeon {
    id: String,
    name: String,
    world: World,
    movement: Movement,
    spawning: Spawning,
    puzzle: Puzzle,
    combat: Combat,
}

impl Dungeon {
    /// Starts a new game from a dungeon definition and configuration.
    #[must_use]
    pub fn new_game(name: &str, definition: &DungeonDefinition, config: DungeonConfig) -> Self {
        let seed = config.seed;
        let spawning = Spawning::new(SpawningConfig::new(
            config.spider_spawn_rate,
            config.zombie_spawn_rate,
            seed,
        ));
        let combat = Combat::new(config.clone());

        let mut dungeon = Self {
            id: format!("{name}-{seed:016x}"),
            name: name.to_owned(),
            world: World::new(definition, config),
            movement: Movement::new(seed),
            puzzle: Puzzle::new(),
            spawning,
            combat,
        };

        let mut events = Vec::new();
        dungeon.run_puzzle(&mut events);
        info!(
            dungeon = %dungeon.id,
            entities = query::entity_view(&dungeon.world).iter().count(),
            goal = query::goal(&dungeon.world).as_str(),
            "new game"
        );
        dungeon
    }

    /// Advances the dungeon by one tick with the player moving `direction`.
    ///
    /// Once the player has been defeated ticks change nothing.
    pub fn tick(&mut self, direction: Direction) -> DungeonSnapshot {
        if query::player(&self.world).is_none() {
            debug!("tick ignored after player defeat");
            return self.snapshot();
        }

        let mut events = Vec::new();
        self.execute(vec![Command::AdvanceTick], &mut events);
        self.execute(vec![Command::MovePlayer { direction }], &mut events);
        self.run_puzzle(&mut events);

        if self.run_combat(&mut events) {
            self.run_spawning(SpawnPhase::Spiders, &mut events);
            self.run_movement(&mut events);
            self.run_spawning(SpawnPhase::Zombies, &mut events);
            let _ = self.run_combat(&mut events);
        }

        debug!(
            tick = query::tick_index(&self.world),
            events = events.len(),
            "tick complete"
        );
        self.snapshot()
    }

    /// Uses an inventory item. No item currently has a use effect, so this
    /// only validates the reference.
    pub fn tick_item(&mut self, item: EntityId) -> Result<DungeonSnapshot, ActionError> {
        if !query::inventory_view(&self.world).contains(item) {
            return Err(ActionError::InvalidReference(item));
        }
        debug!(%item, "item used");
        Ok(self.snapshot())
    }

    /// Bribes a mercenary or destroys a zombie toast spawner.
    pub fn interact(&mut self, entity: EntityId) -> Result<DungeonSnapshot, ActionError> {
        let mut events = Vec::new();
        self.execute(vec![Command::Interact { entity }], &mut events);

        let rejection = events.iter().find_map(|event| match event {
            Event::InteractionRejected { entity, reason } => Some((*entity, *reason)),
            _ => None,
        });
        if let Some((entity, reason)) = rejection {
            return Err(ActionError::from_interaction(entity, reason));
        }
        Ok(self.snapshot())
    }

    /// Crafts an item of `kind` from inventory materials.
    pub fn build(&mut self, kind: EntityKind) -> Result<DungeonSnapshot, ActionError> {
        let mut events = Vec::new();
        self.execute(vec![Command::Build { kind }], &mut events);

        let rejection = events.iter().find_map(|event| match event {
            Event::BuildRejected { reason, .. } => Some(*reason),
            _ => None,
        });
        if let Some(reason) = rejection {
            return Err(ActionError::from(reason));
        }
        Ok(self.snapshot())
    }

    /// Captures the observable state of the dungeon.
    #[must_use]
    pub fn snapshot(&self) -> DungeonSnapshot {
        DungeonSnapshot::capture(&self.id, &self.name, &self.world)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn execute(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }

    fn run_puzzle(&mut self, events: &mut Vec<Event>) {
        let view = query::entity_view(&self.world);
        let mut commands = Vec::new();
        self.puzzle.handle(&view, &mut commands);
        self.execute(commands, events);
    }

    /// Returns `false` when the player fell and the tick must stop.
    fn run_combat(&mut self, events: &mut Vec<Event>) -> bool {
        let player = query::player(&self.world);
        let inventory = query::inventory_view(&self.world);
        let view = query::entity_view(&self.world);
        let mut commands = Vec::new();
        self.combat
            .handle(player.as_ref(), &inventory, &view, &mut commands);
        self.execute(commands, events);

        let alive = query::player(&self.world).is_some();
        if !alive {
            info!(tick = query::tick_index(&self.world), "player defeated");
        }
        alive
    }

    fn run_spawning(&mut self, phase: SpawnPhase, events: &mut Vec<Event>) {
        let view = query::entity_view(&self.world);
        let bounds = query::bounds(&self.world);
        let mut commands = Vec::new();
        let world = &self.world;
        self.spawning.handle(
            phase,
            events,
            &view,
            bounds,
            |mover, cell| query::can_enter(world, mover, cell),
            &mut commands,
        );
        self.execute(commands, events);
    }

    fn run_movement(&mut self, events: &mut Vec<Event>) {
        let view = query::entity_view(&self.world);
        let player = query::player(&self.world);
        let mut commands = Vec::new();
        let world = &self.world;
        self.movement.handle(
            events,
            &view,
            player.as_ref(),
            |mover, cell| query::can_enter(world, mover, cell),
            &mut commands,
        );
        self.execute(commands, events);
    }
}
