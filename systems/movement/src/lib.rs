#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that proposes one step per non-player mover.

use std::collections::BTreeSet;

use dungeonmania_core::{
    Command, Direction, EntityId, EntitySnapshot, EntityState, EntityView, Event, MoverClass,
    PlayerSnapshot, Position,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Stream of the seeded generator reserved for movement decisions.
const MOVEMENT_STREAM: u64 = 1;

/// Pure system that reacts to world events and emits step commands.
#[derive(Debug)]
pub struct Movement {
    rng: ChaCha8Rng,
}

impl Movement {
    /// Creates a movement system whose random choices derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(MOVEMENT_STREAM);
        Self { rng }
    }

    /// Consumes the events of the current tick and immutable views to emit
    /// one `StepEntity` command per mover that wants to move.
    ///
    /// Entities announced by `EntitySpawned` in `events` stay put for the
    /// tick they appeared in. `can_enter` reports whether a mover class may
    /// stand on a cell.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        entity_view: &EntityView,
        player: Option<&PlayerSnapshot>,
        can_enter: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(MoverClass, Position) -> bool,
    {
        let fresh: BTreeSet<EntityId> = events
            .iter()
            .filter_map(|event| match event {
                Event::EntitySpawned { entity, .. } => Some(*entity),
                _ => None,
            })
            .collect();

        for entity in entity_view.iter() {
            if fresh.contains(&entity.id) {
                continue;
            }
            let Some(mover) = entity.kind.mover_class() else {
                continue;
            };

            let direction = match mover {
                MoverClass::Player => None,
                MoverClass::Spider => spider_step(entity, &can_enter),
                MoverClass::Zombie => self.zombie_step(entity, &can_enter),
                MoverClass::Mercenary => {
                    player.and_then(|player| mercenary_step(entity, player, &can_enter))
                }
            };

            if let Some(direction) = direction {
                out.push(Command::StepEntity {
                    entity: entity.id,
                    direction,
                });
            }
        }
    }

    fn zombie_step<F>(&mut self, zombie: &EntitySnapshot, can_enter: &F) -> Option<Direction>
    where
        F: Fn(MoverClass, Position) -> bool,
    {
        let legal: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                zombie
                    .position
                    .step(*direction)
                    .is_some_and(|cell| can_enter(MoverClass::Zombie, cell))
            })
            .collect();
        legal.choose(&mut self.rng).copied()
    }
}

fn spider_step<F>(spider: &EntitySnapshot, can_enter: &F) -> Option<Direction>
where
    F: Fn(MoverClass, Position) -> bool,
{
    let facing = match spider.state {
        EntityState::Spider { facing } => facing,
        _ => Direction::Up,
    };
    [facing, facing.reverse()]
        .into_iter()
        .find(|direction| {
            spider
                .position
                .step(*direction)
                .is_some_and(|cell| can_enter(MoverClass::Spider, cell))
        })
}

fn mercenary_step<F>(
    mercenary: &EntitySnapshot,
    player: &PlayerSnapshot,
    can_enter: &F,
) -> Option<Direction>
where
    F: Fn(MoverClass, Position) -> bool,
{
    let target = if mercenary.is_ally() {
        player.previous_position
    } else {
        player.position
    };

    let mut best = mercenary.position.manhattan_distance(target);
    let mut chosen = None;
    for direction in Direction::ALL {
        let Some(cell) = mercenary.position.step(direction) else {
            continue;
        };
        if !can_enter(MoverClass::Mercenary, cell) {
            continue;
        }
        let distance = cell.manhattan_distance(target);
        if distance < best {
            best = distance;
            chosen = Some(direction);
        }
    }
    chosen
}
