use dungeonmania_core::{
    Command, DungeonConfig, DungeonDefinition, EntityKind, EntityPlacement, Event, Goal, Position,
};
use dungeonmania_system_spawning::{Config, SpawnPhase, Spawning};
use dungeonmania_world::{self as world, query, World};

fn world_with(entities: Vec<EntityPlacement>) -> World {
    World::new(
        &DungeonDefinition {
            entities,
            goal: Goal::Exit,
        },
        DungeonConfig::default(),
    )
}

fn place(kind: EntityKind, x: i32, y: i32) -> EntityPlacement {
    EntityPlacement::new(kind, Position::new(x, y))
}

fn spawn(spawning: &mut Spawning, world: &World, phase: SpawnPhase, tick: u64) -> Vec<Command> {
    let mut commands = Vec::new();
    spawning.handle(
        phase,
        &[Event::TickAdvanced { tick }],
        &query::entity_view(world),
        query::bounds(world),
        |mover, cell| query::can_enter(world, mover, cell),
        &mut commands,
    );
    commands
}

#[test]
fn spiders_appear_on_free_perimeter_cells() {
    let world = world_with(vec![
        place(EntityKind::Player, 1, 1),
        place(EntityKind::Boulder, 0, 0),
        place(EntityKind::Wall, 2, 2),
    ]);
    let bounds = query::bounds(&world);
    let mut spawning = Spawning::new(Config::new(1, 0, 99));

    for tick in 1..=25 {
        let commands = spawn(&mut spawning, &world, SpawnPhase::Spiders, tick);
        assert_eq!(commands.len(), 1);
        match commands[0] {
            Command::SpawnSpider { cell } => {
                assert!(bounds.is_on_perimeter(cell), "{cell:?} not on perimeter");
                assert_ne!(cell, Position::new(0, 0), "spawned on a boulder");
            }
            ref other => panic!("unexpected command emitted: {other:?}"),
        }
    }
}

#[test]
fn spider_cadence_skips_off_ticks() {
    let world = world_with(vec![
        place(EntityKind::Player, 0, 0),
        place(EntityKind::Exit, 3, 3),
    ]);
    let mut spawning = Spawning::new(Config::new(3, 0, 5));

    let fired: Vec<u64> = (1..=9)
        .filter(|tick| !spawn(&mut spawning, &world, SpawnPhase::Spiders, *tick).is_empty())
        .collect();
    assert_eq!(fired, vec![3, 6, 9]);
}

#[test]
fn phases_are_independent() {
    let world = world_with(vec![
        place(EntityKind::Player, 0, 0),
        place(EntityKind::ZombieToastSpawner, 3, 3),
        place(EntityKind::Exit, 6, 6),
    ]);
    let mut spawning = Spawning::new(Config::new(0, 1, 5));

    assert!(spawn(&mut spawning, &world, SpawnPhase::Spiders, 1).is_empty());
    assert_eq!(spawn(&mut spawning, &world, SpawnPhase::Zombies, 1).len(), 1);
}

#[test]
fn zombies_need_an_open_neighbour() {
    let world = world_with(vec![
        place(EntityKind::Player, 0, 0),
        place(EntityKind::ZombieToastSpawner, 3, 3),
        place(EntityKind::Wall, 3, 2),
        place(EntityKind::Boulder, 3, 4),
        place(EntityKind::ZombieToastSpawner, 2, 3),
        place(EntityKind::Door, 4, 3).with_key(1),
    ]);
    let mut spawning = Spawning::new(Config::new(0, 1, 5));

    let commands = spawn(&mut spawning, &world, SpawnPhase::Zombies, 1);
    let blocked_spawner = query::entity_view(&world)
        .at(Position::new(3, 3))
        .map(|entity| entity.id)
        .next()
        .expect("spawner");
    assert!(commands.iter().all(|command| !matches!(
        command,
        Command::SpawnZombie { spawner, .. } if *spawner == blocked_spawner
    )));
    assert_eq!(commands.len(), 1, "the second spawner has open neighbours");
}

#[test]
fn every_spawner_gets_its_own_zombie() {
    let mut world = world_with(vec![
        place(EntityKind::Player, 0, 0),
        place(EntityKind::ZombieToastSpawner, 2, 2),
        place(EntityKind::ZombieToastSpawner, 6, 6),
    ]);
    let mut spawning = Spawning::new(Config::new(0, 1, 17));

    let commands = spawn(&mut spawning, &world, SpawnPhase::Zombies, 1);
    assert_eq!(commands.len(), 2);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(
                event,
                Event::EntitySpawned {
                    kind: EntityKind::ZombieToast,
                    ..
                }
            ))
            .count(),
        2
    );
    for zombie in query::entity_view(&world).of_kind(EntityKind::ZombieToast) {
        let adjacent = query::entity_view(&world)
            .of_kind(EntityKind::ZombieToastSpawner)
            .any(|spawner| spawner.position.is_cardinally_adjacent(zombie.position));
        assert!(adjacent);
    }
}

#[test]
fn identical_seeds_choose_identical_cells() {
    let world = world_with(vec![
        place(EntityKind::Player, 0, 0),
        place(EntityKind::Exit, 8, 8),
    ]);
    let mut first = Spawning::new(Config::new(1, 0, 42));
    let mut second = Spawning::new(Config::new(1, 0, 42));

    for tick in 1..=10 {
        assert_eq!(
            spawn(&mut first, &world, SpawnPhase::Spiders, tick),
            spawn(&mut second, &world, SpawnPhase::Spiders, tick)
        );
    }
}

#[test]
fn no_tick_means_no_spawn() {
    let world = world_with(vec![place(EntityKind::Player, 0, 0)]);
    let mut spawning = Spawning::new(Config::new(1, 1, 0));
    let mut commands = Vec::new();
    spawning.handle(
        SpawnPhase::Spiders,
        &[],
        &query::entity_view(&world),
        query::bounds(&world),
        |mover, cell| query::can_enter(&world, mover, cell),
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn spider_skips_blocked_edge_cells_in_a_tight_box() {
    let world = world_with(vec![
        place(EntityKind::Player, 0, 0),
        place(EntityKind::Boulder, 1, 0),
        place(EntityKind::Door, 0, 1).with_key(3),
        place(EntityKind::Boulder, 1, 1),
    ]);
    let mut spawning = Spawning::new(Config::new(1, 0, 11));

    for tick in 1..=10 {
        assert_eq!(
            spawn(&mut spawning, &world, SpawnPhase::Spiders, tick),
            vec![Command::SpawnSpider {
                cell: Position::new(0, 0)
            }]
        );
    }
}

#[test]
fn spider_spawn_on_a_vast_box_stays_on_its_edge() {
    let world = world_with(vec![
        place(EntityKind::Player, 0, 0),
        place(EntityKind::Exit, 1_000_000_000, 1_000_000_000),
    ]);
    let bounds = query::bounds(&world);
    let mut spawning = Spawning::new(Config::new(1, 0, 21));

    for tick in 1..=5 {
        let commands = spawn(&mut spawning, &world, SpawnPhase::Spiders, tick);
        let [Command::SpawnSpider { cell }] = commands.as_slice() else {
            panic!("expected a single spider spawn, got {commands:?}");
        };
        assert!(bounds.is_on_perimeter(*cell), "{cell:?} not on perimeter");
    }
}
