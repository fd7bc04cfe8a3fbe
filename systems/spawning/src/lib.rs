#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting spider and zombie
//! spawn commands.

use std::collections::BTreeSet;

use dungeonmania_core::{
    BoundingBox, Command, EntityKind, EntityView, Event, MoverClass, Position,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Stream of the seeded generator reserved for spawn decisions.
const SPAWN_STREAM: u64 = 2;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spider_spawn_rate: u64,
    zombie_spawn_rate: u64,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration from the spawn cadences (in ticks) and seed.
    ///
    /// A cadence of zero disables that spawn type.
    #[must_use]
    pub const fn new(spider_spawn_rate: u64, zombie_spawn_rate: u64, rng_seed: u64) -> Self {
        Self {
            spider_spawn_rate,
            zombie_spawn_rate,
            rng_seed,
        }
    }
}

/// Spawn sub-phases of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnPhase {
    /// Spiders appear before the non-player movers step.
    Spiders,
    /// Zombies appear after the non-player movers stepped.
    Zombies,
}

/// Pure system that deterministically emits spawn commands on cadence ticks.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        rng.set_stream(SPAWN_STREAM);
        Self { config, rng }
    }

    /// Consumes the tick's events and immutable views to emit spawn commands.
    ///
    /// Nothing is emitted unless `events` carries a `TickAdvanced` whose tick
    /// falls on the phase's cadence.
    pub fn handle<F>(
        &mut self,
        phase: SpawnPhase,
        events: &[Event],
        entity_view: &EntityView,
        bounds: BoundingBox,
        can_enter: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(MoverClass, Position) -> bool,
    {
        let Some(tick) = events.iter().find_map(|event| match event {
            Event::TickAdvanced { tick } => Some(*tick),
            _ => None,
        }) else {
            return;
        };

        match phase {
            SpawnPhase::Spiders => {
                if !on_cadence(tick, self.config.spider_spawn_rate) {
                    return;
                }
                if let Some(cell) = self.pick_perimeter_cell(entity_view, bounds, &can_enter) {
                    out.push(Command::SpawnSpider { cell });
                }
            }
            SpawnPhase::Zombies => {
                if !on_cadence(tick, self.config.zombie_spawn_rate) {
                    return;
                }
                for spawner in entity_view.of_kind(EntityKind::ZombieToastSpawner) {
                    let candidates: Vec<Position> = spawner
                        .position
                        .cardinal_neighbours()
                        .filter(|cell| can_enter(MoverClass::Zombie, *cell))
                        .collect();
                    if let Some(cell) = candidates.choose(&mut self.rng) {
                        out.push(Command::SpawnZombie {
                            spawner: spawner.id,
                            cell: *cell,
                        });
                    }
                }
            }
        }
    }
}

impl Spawning {
    /// Picks a uniformly random edge cell a spider may stand on.
    ///
    /// Inside the box only occupied cells can refuse a spider, so the free
    /// cells are found by skipping the blocked indices instead of walking
    /// the whole edge.
    fn pick_perimeter_cell<F>(
        &mut self,
        entity_view: &EntityView,
        bounds: BoundingBox,
        can_enter: &F,
    ) -> Option<Position>
    where
        F: Fn(MoverClass, Position) -> bool,
    {
        let blocked: BTreeSet<u64> = entity_view
            .iter()
            .filter(|entity| !can_enter(MoverClass::Spider, entity.position))
            .filter_map(|entity| bounds.perimeter_index(entity.position))
            .collect();
        let free = bounds
            .perimeter_len()
            .checked_sub(blocked.len() as u64)
            .filter(|free| *free > 0)?;

        let mut index = self.rng.gen_range(0..free);
        for taken in &blocked {
            if *taken > index {
                break;
            }
            index += 1;
        }
        bounds.perimeter_cell(index)
    }
}

fn on_cadence(tick: u64, rate: u64) -> bool {
    rate > 0 && tick % rate == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_never_fires() {
        assert!(!on_cadence(0, 0));
        assert!(!on_cadence(12, 0));
    }

    #[test]
    fn cadence_fires_on_multiples() {
        assert!(on_cadence(3, 3));
        assert!(on_cadence(6, 3));
        assert!(!on_cadence(4, 3));
        assert!(on_cadence(1, 1));
    }
}
