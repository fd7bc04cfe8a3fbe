use dungeonmania_core::{
    Command, Direction, DungeonConfig, DungeonDefinition, EntityKind, EntityPlacement, Event, Goal,
    Position,
};
use dungeonmania_system_combat::{Combat, MAX_ROUNDS};
use dungeonmania_world::{self as world, query, World};

const EPSILON: f64 = 1e-9;

fn world_with(entities: Vec<EntityPlacement>, config: DungeonConfig) -> World {
    World::new(
        &DungeonDefinition {
            entities,
            goal: Goal::Enemies,
        },
        config,
    )
}

fn place(kind: EntityKind, x: i32, y: i32) -> EntityPlacement {
    EntityPlacement::new(kind, Position::new(x, y))
}

fn plan(world: &World) -> Vec<Command> {
    let combat = Combat::new(query::config(world).clone());
    let mut commands = Vec::new();
    combat.handle(
        query::player(world).as_ref(),
        &query::inventory_view(world),
        &query::entity_view(world),
        &mut commands,
    );
    commands
}

fn commit(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn unarmed_player_defeats_zombie_in_three_rounds() {
    let mut world = world_with(
        vec![
            place(EntityKind::Player, 0, 0),
            place(EntityKind::ZombieToast, 0, 0),
        ],
        DungeonConfig::default(),
    );

    let commands = plan(&world);
    assert_eq!(commands.len(), 1);
    let Command::CommitBattle { battle } = &commands[0] else {
        panic!("unexpected command emitted: {:?}", commands[0]);
    };
    assert_eq!(battle.rounds.len(), 3);
    for round in &battle.rounds {
        assert!((round.enemy_health_delta + 2.0).abs() < EPSILON);
        assert!((round.player_health_delta + 0.6).abs() < EPSILON);
        assert!(round.items_used.is_empty());
    }

    let events = commit(&mut world, commands);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyDefeated { .. })));
    let health = query::player(&world).map(|player| player.health);
    assert!(health.is_some_and(|health| (health - 8.2).abs() < EPSILON));
    assert_eq!(query::enemies_defeated(&world), 1);
    assert_eq!(query::battles(&world).len(), 1);
}

#[test]
fn sword_breaks_mid_battle() {
    let mut world = world_with(
        vec![
            place(EntityKind::Player, 0, 0),
            place(EntityKind::Sword, 1, 0),
            place(EntityKind::ZombieToast, 2, 0),
        ],
        DungeonConfig {
            sword_durability: 1,
            ..DungeonConfig::default()
        },
    );
    for _ in 0..2 {
        let _ = commit(
            &mut world,
            vec![Command::MovePlayer {
                direction: Direction::Right,
            }],
        );
    }

    let commands = plan(&world);
    let Command::CommitBattle { battle } = &commands[0] else {
        panic!("unexpected command emitted: {:?}", commands[0]);
    };
    assert_eq!(battle.rounds.len(), 3);
    assert!((battle.rounds[0].enemy_health_delta + 2.4).abs() < EPSILON);
    assert_eq!(battle.rounds[0].items_used.len(), 1);
    assert!(battle.rounds[1].items_used.is_empty());
    assert!((battle.rounds[1].enemy_health_delta + 2.0).abs() < EPSILON);

    let _ = commit(&mut world, commands);
    assert!(query::inventory_view(&world).is_empty());
}

#[test]
fn bow_doubles_player_attack() {
    let mut world = world_with(
        vec![
            place(EntityKind::Player, 0, 0),
            place(EntityKind::Wood, 1, 0),
            place(EntityKind::Arrow, 2, 0),
            place(EntityKind::Arrow, 3, 0),
            place(EntityKind::Arrow, 4, 0),
            place(EntityKind::Mercenary, 5, 0),
        ],
        DungeonConfig {
            mercenary_health: 30.0,
            mercenary_attack: 12.0,
            bow_durability: 10,
            ..DungeonConfig::default()
        },
    );
    for _ in 0..4 {
        let _ = commit(
            &mut world,
            vec![Command::MovePlayer {
                direction: Direction::Right,
            }],
        );
    }
    let _ = commit(
        &mut world,
        vec![Command::Build {
            kind: EntityKind::Bow,
        }],
    );
    let _ = commit(
        &mut world,
        vec![Command::MovePlayer {
            direction: Direction::Right,
        }],
    );

    let commands = plan(&world);
    let Command::CommitBattle { battle } = &commands[0] else {
        panic!("unexpected command emitted: {:?}", commands[0]);
    };
    assert!((battle.rounds[0].enemy_health_delta + 4.0).abs() < EPSILON);
    assert!((battle.rounds[0].player_health_delta + 1.2).abs() < EPSILON);
    assert_eq!(battle.rounds.len(), 8);
}

#[test]
fn fatal_battle_stops_planning() {
    let mut world = world_with(
        vec![
            place(EntityKind::Player, 0, 0),
            place(EntityKind::ZombieToast, 0, 0),
            place(EntityKind::ZombieToast, 0, 0),
        ],
        DungeonConfig {
            player_health: 1.0,
            ..DungeonConfig::default()
        },
    );

    let commands = plan(&world);
    assert_eq!(commands.len(), 1);
    let Command::CommitBattle { battle } = &commands[0] else {
        panic!("unexpected command emitted: {:?}", commands[0]);
    };
    assert_eq!(battle.rounds.len(), 2);
    assert!(!battle.player_survived());

    let events = commit(&mut world, commands);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PlayerDefeated { .. })));
    assert!(query::player(&world).is_none());
    assert!(plan(&world).is_empty());
}

#[test]
fn consecutive_battles_carry_health_forward() {
    let world = world_with(
        vec![
            place(EntityKind::Player, 0, 0),
            place(EntityKind::Spider, 0, 0),
            place(EntityKind::ZombieToast, 0, 0),
        ],
        DungeonConfig::default(),
    );

    let commands = plan(&world);
    assert_eq!(commands.len(), 2);
    let healths: Vec<(f64, f64)> = commands
        .iter()
        .filter_map(|command| match command {
            Command::CommitBattle { battle } => Some((
                battle.initial_player_health,
                battle.final_player_health(),
            )),
            _ => None,
        })
        .collect();
    assert!((healths[1].0 - healths[0].1).abs() < EPSILON);
}

#[test]
fn bribed_allies_lend_attack_and_defence() {
    let mut world = world_with(
        vec![
            place(EntityKind::Player, 0, 0),
            place(EntityKind::Treasure, 1, 0),
            place(EntityKind::Mercenary, 2, 0),
            place(EntityKind::ZombieToast, 1, 1),
        ],
        DungeonConfig::default(),
    );
    let _ = commit(
        &mut world,
        vec![Command::MovePlayer {
            direction: Direction::Right,
        }],
    );
    let mercenary = query::entity_view(&world)
        .of_kind(EntityKind::Mercenary)
        .map(|entity| entity.id)
        .next()
        .expect("mercenary");
    let bribed = commit(&mut world, vec![Command::Interact { entity: mercenary }]);
    assert_eq!(bribed, vec![Event::MercenaryBribed { mercenary }]);

    let _ = commit(
        &mut world,
        vec![Command::MovePlayer {
            direction: Direction::Down,
        }],
    );
    let commands = plan(&world);
    assert_eq!(commands.len(), 1);
    let Command::CommitBattle { battle } = &commands[0] else {
        panic!("unexpected command emitted: {:?}", commands[0]);
    };
    assert_eq!(battle.enemy_kind, EntityKind::ZombieToast);
    assert!((battle.rounds[0].player_health_delta + 0.3).abs() < EPSILON);
    assert!((battle.rounds[0].enemy_health_delta + 2.6).abs() < EPSILON);
}

#[test]
fn harmless_pairing_is_capped() {
    let world = world_with(
        vec![
            place(EntityKind::Player, 0, 0),
            place(EntityKind::Spider, 0, 0),
        ],
        DungeonConfig {
            player_attack: 0.0,
            spider_attack: 0.0,
            ..DungeonConfig::default()
        },
    );

    let commands = plan(&world);
    let Command::CommitBattle { battle } = &commands[0] else {
        panic!("unexpected command emitted: {:?}", commands[0]);
    };
    assert_eq!(battle.rounds.len(), MAX_ROUNDS);
    assert!(battle.player_survived());
    assert!(!battle.enemy_defeated());
}

#[test]
fn negative_attack_never_heals_the_enemy() {
    let config = DungeonConfig {
        player_attack: -10.0,
        ally_attack: -4.0,
        ..DungeonConfig::default()
    };
    let world = world_with(
        vec![
            place(EntityKind::Player, 0, 0),
            place(EntityKind::ZombieToast, 0, 0),
        ],
        config,
    );

    let commands = plan(&world);
    let [Command::CommitBattle { battle }] = commands.as_slice() else {
        panic!("unexpected commands emitted: {commands:?}");
    };
    assert!(!battle.player_survived());
    assert!(battle
        .rounds
        .iter()
        .all(|round| round.enemy_health_delta <= 0.0 && round.player_health_delta <= 0.0));
    assert!((battle.final_enemy_health() - battle.initial_enemy_health).abs() < EPSILON);
}
