#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dungeonmania engine.
//!
//! This crate defines the message surface that connects the orchestrator, the
//! authoritative world, and pure systems. The orchestrator submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

mod battle;
mod config;

pub use battle::{Battle, Round};
pub use config::DungeonConfig;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the tick counter by one.
    AdvanceTick,
    /// Requests that the player attempt a single step in the given direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a non-player mover attempt a single step.
    StepEntity {
        /// Identifier of the mover attempting to move.
        entity: EntityId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that a spider be created on the provided cell.
    SpawnSpider {
        /// Cell the spider should occupy after spawning.
        cell: Position,
    },
    /// Requests that a zombie spawner emit a zombie into a neighbouring cell.
    SpawnZombie {
        /// Spawner responsible for creating the zombie.
        spawner: EntityId,
        /// Cardinally adjacent cell the zombie should occupy.
        cell: Position,
    },
    /// Overwrites the trigger state of a floor switch.
    SetSwitchState {
        /// Identifier of the switch.
        switch: EntityId,
        /// Whether a boulder currently rests on the switch.
        triggered: bool,
    },
    /// Commits a fully resolved battle between the player and one hostile.
    CommitBattle {
        /// Complete battle record to apply to the world.
        battle: Battle,
    },
    /// Requests a player interaction with the identified entity.
    Interact {
        /// Target of the interaction.
        entity: EntityId,
    },
    /// Requests that the player craft one item of the provided kind.
    Build {
        /// Kind of item to craft.
        kind: EntityKind,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the tick counter advanced.
    TickAdvanced {
        /// Tick index after advancing.
        tick: u64,
    },
    /// Confirms that an entity moved between two cells.
    EntityMoved {
        /// Identifier of the entity that moved.
        entity: EntityId,
        /// Cell occupied before moving.
        from: Position,
        /// Cell occupied after moving.
        to: Position,
    },
    /// Reports that a requested step was illegal and ignored.
    MoveBlocked {
        /// Identifier of the entity whose step was ignored.
        entity: EntityId,
        /// Direction of the ignored step.
        direction: Direction,
    },
    /// Confirms that the player pushed a boulder.
    BoulderPushed {
        /// Identifier of the boulder.
        boulder: EntityId,
        /// Cell the boulder occupied before the push.
        from: Position,
        /// Cell the boulder occupies after the push.
        to: Position,
    },
    /// Confirms that a door was unlocked with a matching key.
    DoorUnlocked {
        /// Identifier of the door.
        door: EntityId,
    },
    /// Confirms that a collectable moved from the floor into the inventory.
    ItemCollected {
        /// Identifier of the collected item.
        item: EntityId,
        /// Kind of the collected item.
        kind: EntityKind,
    },
    /// Confirms that a new entity was spawned.
    EntitySpawned {
        /// Identifier assigned to the spawned entity.
        entity: EntityId,
        /// Kind of the spawned entity.
        kind: EntityKind,
        /// Cell the entity occupies after spawning.
        cell: Position,
    },
    /// Reports that a switch changed trigger state.
    SwitchChanged {
        /// Identifier of the switch.
        switch: EntityId,
        /// New trigger state.
        triggered: bool,
    },
    /// Confirms that a battle was appended to the battle history.
    BattleResolved {
        /// Identifier of the opposing entity.
        enemy: EntityId,
        /// Kind of the opposing entity.
        enemy_kind: EntityKind,
        /// Number of rounds fought.
        rounds: usize,
        /// Whether the player survived the battle.
        player_survived: bool,
    },
    /// Confirms that a hostile was defeated and removed.
    EnemyDefeated {
        /// Identifier of the defeated hostile.
        enemy: EntityId,
        /// Kind of the defeated hostile.
        kind: EntityKind,
    },
    /// Announces that the player was defeated and removed from the world.
    PlayerDefeated {
        /// Identifier of the removed player.
        player: EntityId,
    },
    /// Confirms that a mercenary was bribed into an ally.
    MercenaryBribed {
        /// Identifier of the mercenary.
        mercenary: EntityId,
    },
    /// Confirms that a zombie spawner was destroyed.
    SpawnerDestroyed {
        /// Identifier of the spawner.
        spawner: EntityId,
    },
    /// Confirms that an item was crafted into the inventory.
    ItemBuilt {
        /// Identifier assigned to the crafted item.
        item: EntityId,
        /// Kind of the crafted item.
        kind: EntityKind,
    },
    /// Reports that an interaction request was rejected.
    InteractionRejected {
        /// Target of the rejected interaction.
        entity: EntityId,
        /// Specific reason the interaction failed.
        reason: InteractionError,
    },
    /// Reports that a build request was rejected.
    BuildRejected {
        /// Kind of item requested.
        kind: EntityKind,
        /// Specific reason the build failed.
        reason: BuildError,
    },
}

/// Cardinal movement directions. Rows grow downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing `y`.
    Up,
    /// Movement toward increasing `y`.
    Down,
    /// Movement toward decreasing `x`.
    Left,
    /// Movement toward increasing `x`.
    Right,
}

impl Direction {
    /// All directions in canonical tie-break order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Unique identifier assigned to an entity or inventory item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a single dungeon cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring cell one step in `direction`, or `None` when
    /// the step would leave the coordinate range.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Computes the Chebyshev (king move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_cardinally_adjacent(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// The edge-sharing neighbours in [`Direction::ALL`] order. Cells outside
    /// the coordinate range are skipped.
    pub fn cardinal_neighbours(self) -> impl Iterator<Item = Position> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(direction))
    }
}

/// Closed set of entity types that can exist in a dungeon or inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The controllable character.
    Player,
    /// Hostile that patrols within the dungeon bounds.
    Spider,
    /// Hostile that wanders randomly.
    ZombieToast,
    /// Static structure that emits zombies.
    ZombieToastSpawner,
    /// Hostile that chases the player and can be bribed.
    Mercenary,
    /// Pushable obstacle.
    Boulder,
    /// Impassable obstacle.
    Wall,
    /// Obstacle that opens with a matching key.
    Door,
    /// Floor plate triggered by boulders.
    Switch,
    /// Goal cell.
    Exit,
    /// Collectable currency.
    Treasure,
    /// Collectable that opens the door with the same key number.
    Key,
    /// Collectable weapon.
    Sword,
    /// Crafting material.
    Wood,
    /// Crafting material.
    Arrow,
    /// Crafted weapon that doubles attack.
    Bow,
    /// Crafted armour.
    Shield,
}

impl EntityKind {
    /// Canonical snake-case name used by dungeon files and snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Spider => "spider",
            Self::ZombieToast => "zombie_toast",
            Self::ZombieToastSpawner => "zombie_toast_spawner",
            Self::Mercenary => "mercenary",
            Self::Boulder => "boulder",
            Self::Wall => "wall",
            Self::Door => "door",
            Self::Switch => "switch",
            Self::Exit => "exit",
            Self::Treasure => "treasure",
            Self::Key => "key",
            Self::Sword => "sword",
            Self::Wood => "wood",
            Self::Arrow => "arrow",
            Self::Bow => "bow",
            Self::Shield => "shield",
        }
    }

    /// Capability flags fixed for the kind at construction.
    ///
    /// Doors report their locked capabilities; unlocked doors are open to
    /// every mover (see [`EntityKind::traversal`]).
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Player => Capabilities::MOVER,
            Self::Spider | Self::ZombieToast => Capabilities::MOVER,
            Self::Mercenary => Capabilities {
                is_interactable: true,
                ..Capabilities::MOVER
            },
            Self::ZombieToastSpawner => Capabilities {
                is_interactable: true,
                ..Capabilities::SOLID
            },
            Self::Wall => Capabilities::SOLID,
            Self::Door | Self::Boulder => Capabilities {
                allows_spider_traversal: false,
                ..Capabilities::SOLID
            },
            Self::Switch | Self::Exit => Capabilities::FLOOR,
            Self::Treasure
            | Self::Key
            | Self::Sword
            | Self::Wood
            | Self::Arrow
            | Self::Bow
            | Self::Shield => Capabilities {
                is_collectable: true,
                ..Capabilities::FLOOR
            },
        }
    }

    /// Mover class used for traversal checks, if the kind moves.
    #[must_use]
    pub const fn mover_class(self) -> Option<MoverClass> {
        match self {
            Self::Player => Some(MoverClass::Player),
            Self::Spider => Some(MoverClass::Spider),
            Self::ZombieToast => Some(MoverClass::Zombie),
            Self::Mercenary => Some(MoverClass::Mercenary),
            _ => None,
        }
    }

    /// Reports whether entities of this kind fight the player unless allied.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Spider | Self::ZombieToast | Self::Mercenary)
    }

    /// Reports whether the item counts as a weapon for destroying spawners.
    #[must_use]
    pub const fn is_weapon(self) -> bool {
        matches!(self, Self::Sword | Self::Bow)
    }

    /// Crafting recipe for buildable kinds.
    #[must_use]
    pub const fn recipe(self) -> Option<Recipe> {
        match self {
            Self::Bow => Some(Recipe::BOW),
            Self::Shield => Some(Recipe::SHIELD),
            _ => None,
        }
    }

    /// Describes how an occupant of this kind treats a mover entering its cell.
    #[must_use]
    pub const fn traversal(self, mover: MoverClass, locked: bool) -> Traversal {
        match (self, mover) {
            (Self::Door, _) if !locked => Traversal::Open,
            (Self::Door, MoverClass::Player) => Traversal::RequiresKey,
            (Self::Boulder, MoverClass::Player) => Traversal::Push,
            (Self::Boulder, _) => Traversal::Blocked,
            (Self::Wall | Self::ZombieToastSpawner, MoverClass::Spider) => Traversal::Open,
            (Self::Wall | Self::ZombieToastSpawner | Self::Door, _) => Traversal::Blocked,
            _ => Traversal::Open,
        }
    }

    /// Reports whether an occupant of this kind stops a pushed boulder.
    #[must_use]
    pub const fn stops_boulder(self, locked: bool) -> bool {
        match self {
            Self::Wall | Self::Boulder | Self::ZombieToastSpawner => true,
            Self::Door => locked,
            _ => false,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let kind = match value.to_ascii_lowercase().as_str() {
            "player" => Self::Player,
            "spider" => Self::Spider,
            "zombie_toast" => Self::ZombieToast,
            "zombie_toast_spawner" => Self::ZombieToastSpawner,
            "mercenary" => Self::Mercenary,
            "boulder" => Self::Boulder,
            "wall" => Self::Wall,
            "door" => Self::Door,
            "switch" => Self::Switch,
            "exit" => Self::Exit,
            "treasure" => Self::Treasure,
            "key" => Self::Key,
            "sword" => Self::Sword,
            "wood" => Self::Wood,
            "arrow" => Self::Arrow,
            "bow" => Self::Bow,
            "shield" => Self::Shield,
            _ => return Err(UnknownEntityKind(value.to_owned())),
        };
        Ok(kind)
    }
}

/// Error returned when parsing an entity type name that is not supported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEntityKind(pub String);

impl fmt::Display for UnknownEntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity type '{}' is not supported", self.0)
    }
}

impl Error for UnknownEntityKind {}

/// Capability flags attached to every entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// The entity changes position on its own.
    pub is_moving: bool,
    /// The entity can be picked up into the inventory.
    pub is_collectable: bool,
    /// The entity accepts player interactions.
    pub is_interactable: bool,
    /// The entity stops the player from entering its cell.
    pub blocks_movement: bool,
    /// Spiders may share the entity's cell.
    pub allows_spider_traversal: bool,
    /// Zombies may share the entity's cell.
    pub allows_zombie_traversal: bool,
    /// Mercenaries may share the entity's cell.
    pub allows_mercenary_traversal: bool,
}

impl Capabilities {
    const MOVER: Self = Self {
        is_moving: true,
        is_collectable: false,
        is_interactable: false,
        blocks_movement: false,
        allows_spider_traversal: true,
        allows_zombie_traversal: true,
        allows_mercenary_traversal: true,
    };

    const SOLID: Self = Self {
        is_moving: false,
        is_collectable: false,
        is_interactable: false,
        blocks_movement: true,
        allows_spider_traversal: true,
        allows_zombie_traversal: false,
        allows_mercenary_traversal: false,
    };

    const FLOOR: Self = Self {
        is_moving: false,
        is_collectable: false,
        is_interactable: false,
        blocks_movement: false,
        allows_spider_traversal: true,
        allows_zombie_traversal: true,
        allows_mercenary_traversal: true,
    };
}

/// Categories of movers that share traversal rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoverClass {
    /// The player, who can push boulders and open doors.
    Player,
    /// Spiders ignore walls and spawners but not boulders or locked doors.
    Spider,
    /// Zombies respect every solid obstacle.
    Zombie,
    /// Mercenaries respect every solid obstacle.
    Mercenary,
}

/// Outcome of a mover attempting to enter an occupant's cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Traversal {
    /// The occupant does not interfere.
    Open,
    /// The occupant stops the mover.
    Blocked,
    /// The occupant can be pushed one cell further.
    Push,
    /// The occupant lets the mover through only with a matching key.
    RequiresKey,
}

/// A group of interchangeable materials required by a recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ingredient {
    options: &'static [EntityKind],
    count: u32,
}

impl Ingredient {
    /// Kinds that satisfy the ingredient, in order of preference.
    #[must_use]
    pub const fn options(&self) -> &'static [EntityKind] {
        self.options
    }

    /// Number of items of a single option consumed.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

/// Materials consumed when crafting one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recipe {
    ingredients: &'static [Ingredient],
}

impl Recipe {
    const BOW: Self = Self {
        ingredients: &[
            Ingredient {
                options: &[EntityKind::Wood],
                count: 1,
            },
            Ingredient {
                options: &[EntityKind::Arrow],
                count: 3,
            },
        ],
    };

    const SHIELD: Self = Self {
        ingredients: &[
            Ingredient {
                options: &[EntityKind::Wood],
                count: 2,
            },
            Ingredient {
                options: &[EntityKind::Treasure, EntityKind::Key],
                count: 1,
            },
        ],
    };

    /// Ingredients that must all be satisfied.
    #[must_use]
    pub const fn ingredients(&self) -> &'static [Ingredient] {
        self.ingredients
    }
}

/// Kinds that can ever be crafted, in snapshot order.
pub const BUILDABLE_KINDS: [EntityKind; 2] = [EntityKind::Bow, EntityKind::Shield];

/// Minimal rectangle that contained every entity at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

impl BoundingBox {
    /// Creates a bounding box from explicit extents.
    #[must_use]
    pub const fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Computes the minimal box around the provided positions.
    #[must_use]
    pub fn enclosing<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = Position>,
    {
        positions.into_iter().fold(None, |bounds, position| {
            let (x, y) = (position.x(), position.y());
            Some(match bounds {
                None => Self::new(x, x, y, y),
                Some(bounds) => Self::new(
                    bounds.min_x.min(x),
                    bounds.max_x.max(x),
                    bounds.min_y.min(y),
                    bounds.max_y.max(y),
                ),
            })
        })
    }

    /// Smallest column inside the box.
    #[must_use]
    pub const fn min_x(&self) -> i32 {
        self.min_x
    }

    /// Largest column inside the box.
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.max_x
    }

    /// Smallest row inside the box.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Largest row inside the box.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Reports whether the cell lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x())
            && (self.min_y..=self.max_y).contains(&position.y())
    }

    /// Reports whether the cell lies on the edge of the box.
    #[must_use]
    pub fn is_on_perimeter(&self, position: Position) -> bool {
        self.contains(position)
            && (position.x() == self.min_x
                || position.x() == self.max_x
                || position.y() == self.min_y
                || position.y() == self.max_y)
    }

    /// Every edge cell exactly once, in row-major order.
    ///
    /// Allocates one entry per edge cell; prefer [`BoundingBox::perimeter_cell`]
    /// for very large boxes.
    #[must_use]
    pub fn perimeter(&self) -> Vec<Position> {
        (0..self.perimeter_len())
            .filter_map(|index| self.perimeter_cell(index))
            .collect()
    }

    /// Number of edge cells.
    #[must_use]
    pub fn perimeter_len(&self) -> u64 {
        let (width, height) = (self.width(), self.height());
        match height {
            0 => 0,
            1 => width,
            _ => 2 * width + (height - 2) * self.cells_per_inner_row(),
        }
    }

    /// Edge cell at `index` in row-major order, or `None` past the end.
    #[must_use]
    pub fn perimeter_cell(&self, index: u64) -> Option<Position> {
        if index >= self.perimeter_len() {
            return None;
        }
        let width = self.width();
        let per_row = self.cells_per_inner_row();
        let inner = self.height().saturating_sub(2) * per_row;

        if index < width {
            return offset_cell(self.min_x, index, self.min_y, 0);
        }
        let index = index - width;
        if index < inner {
            let column = if index % per_row == 0 { self.min_x } else { self.max_x };
            return offset_cell(column, 0, self.min_y, 1 + index / per_row);
        }
        offset_cell(self.min_x, index - inner, self.max_y, 0)
    }

    /// Row-major index of an edge cell; the inverse of
    /// [`BoundingBox::perimeter_cell`].
    #[must_use]
    pub fn perimeter_index(&self, position: Position) -> Option<u64> {
        if !self.is_on_perimeter(position) {
            return None;
        }
        let column = u64::from(position.x().abs_diff(self.min_x));
        let row = u64::from(position.y().abs_diff(self.min_y));
        let width = self.width();
        let per_row = self.cells_per_inner_row();

        Some(if row == 0 {
            column
        } else if position.y() == self.max_y {
            width + (self.height() - 2) * per_row + column
        } else {
            let side = u64::from(position.x() != self.min_x);
            width + (row - 1) * per_row + side
        })
    }

    fn width(&self) -> u64 {
        span(self.min_x, self.max_x)
    }

    fn height(&self) -> u64 {
        span(self.min_y, self.max_y)
    }

    fn cells_per_inner_row(&self) -> u64 {
        if self.width() == 1 {
            1
        } else {
            2
        }
    }
}

fn span(min: i32, max: i32) -> u64 {
    if max < min {
        0
    } else {
        u64::from(max.abs_diff(min)) + 1
    }
}

fn offset_cell(x: i32, dx: u64, y: i32, dy: u64) -> Option<Position> {
    let x = i32::try_from(i64::from(x) + i64::try_from(dx).ok()?).ok()?;
    let y = i32::try_from(i64::from(y) + i64::try_from(dy).ok()?).ok()?;
    Some(Position::new(x, y))
}

/// Win condition of a dungeon. Compound goals are not supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Reach an exit.
    Exit,
    /// Cover every switch with a boulder.
    Boulders,
    /// Collect `treasure_goal` treasure.
    Treasure,
    /// Defeat `enemy_goal` enemies and destroy every spawner.
    Enemies,
}

impl Goal {
    /// Canonical name used by dungeon files and snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Boulders => "boulders",
            Self::Treasure => "treasure",
            Self::Enemies => "enemies",
        }
    }
}

impl FromStr for Goal {
    type Err = UnsupportedGoal;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "exit" => Ok(Self::Exit),
            "boulders" => Ok(Self::Boulders),
            "treasure" => Ok(Self::Treasure),
            "enemies" => Ok(Self::Enemies),
            _ => Err(UnsupportedGoal(value.to_owned())),
        }
    }
}

/// Error returned when parsing a goal that is not a single supported goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedGoal(pub String);

impl fmt::Display for UnsupportedGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "goal '{}' is not supported", self.0)
    }
}

impl Error for UnsupportedGoal {}

/// One entity described by a dungeon definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityPlacement {
    /// Kind of entity to create.
    pub kind: EntityKind,
    /// Cell the entity occupies.
    pub position: Position,
    /// Key number for doors and keys.
    pub key: Option<u32>,
}

impl EntityPlacement {
    /// Creates a placement without a key number.
    #[must_use]
    pub const fn new(kind: EntityKind, position: Position) -> Self {
        Self {
            kind,
            position,
            key: None,
        }
    }

    /// Attaches a key number to the placement.
    #[must_use]
    pub const fn with_key(mut self, key: u32) -> Self {
        self.key = Some(key);
        self
    }
}

/// Loaded dungeon layout consumed by the world at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DungeonDefinition {
    /// Entities in file order.
    pub entities: Vec<EntityPlacement>,
    /// Win condition.
    pub goal: Goal,
}

/// Kind-specific mutable state carried by an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// The kind carries no extra state.
    Plain,
    /// Door lock state.
    Door {
        /// Key number that opens the door.
        key: Option<u32>,
        /// Whether the door still blocks movement.
        locked: bool,
    },
    /// Key number carried by a key.
    Key {
        /// Key number matching a door.
        key: Option<u32>,
    },
    /// Switch trigger state.
    Switch {
        /// Whether a boulder rests on the switch.
        triggered: bool,
    },
    /// Spider patrol heading.
    Spider {
        /// Direction the spider will try next.
        facing: Direction,
    },
    /// Mercenary allegiance.
    Mercenary {
        /// Whether the mercenary was bribed.
        ally: bool,
    },
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Cell currently occupied.
    pub position: Position,
    /// Cell occupied before the most recent move.
    pub previous_position: Position,
    /// Whether the entity currently accepts interactions.
    pub interactable: bool,
    /// Kind-specific state.
    pub state: EntityState,
}

impl EntitySnapshot {
    /// Reports whether the entity fights the player on contact.
    #[must_use]
    pub fn is_hostile(&self) -> bool {
        self.kind.is_hostile() && !self.is_ally()
    }

    /// Reports whether the entity is a bribed mercenary.
    #[must_use]
    pub fn is_ally(&self) -> bool {
        matches!(self.state, EntityState::Mercenary { ally: true })
    }
}

/// Read-only snapshot describing all entities in registry order.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over entities occupying the provided cell.
    pub fn at(&self, position: Position) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.position == position)
    }

    /// Iterator over entities of the provided kind.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.kind == kind)
    }

    /// Looks up a single entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player's combat-relevant state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Identifier of the player entity.
    pub id: EntityId,
    /// Cell currently occupied.
    pub position: Position,
    /// Cell occupied before the latest movement tick.
    pub previous_position: Position,
    /// Remaining health.
    pub health: f64,
    /// Number of bribed mercenaries.
    pub allies: u32,
}

/// Immutable representation of a single inventory item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Identifier of the item.
    pub id: EntityId,
    /// Kind of the item.
    pub kind: EntityKind,
    /// Remaining uses for durable items.
    pub durability: Option<u32>,
}

/// Read-only snapshot of the inventory in pick-up order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventoryView {
    items: Vec<ItemSnapshot>,
}

impl InventoryView {
    /// Creates a view over items in inventory order.
    #[must_use]
    pub fn from_items(items: Vec<ItemSnapshot>) -> Self {
        Self { items }
    }

    /// Iterator over the items in inventory order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemSnapshot> {
        self.items.iter()
    }

    /// Number of items of the provided kind.
    #[must_use]
    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    /// Reports whether an item with the identifier is held.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Number of held items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether the inventory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the view, yielding the underlying items.
    #[must_use]
    pub fn into_vec(self) -> Vec<ItemSnapshot> {
        self.items
    }
}

/// Reasons an interaction request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionError {
    /// No entity with the identifier exists.
    UnknownEntity,
    /// The entity does not accept interactions.
    NotInteractable,
    /// The mercenary is farther away than the bribe radius.
    OutOfRange,
    /// The player holds less treasure than the bribe amount.
    InsufficientTreasure,
    /// The spawner is not cardinally adjacent to the player.
    NotAdjacent,
    /// The player holds no weapon to destroy the spawner with.
    MissingWeapon,
    /// The player was defeated.
    PlayerDefeated,
}

impl fmt::Display for InteractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::UnknownEntity => "entity does not exist",
            Self::NotInteractable => "entity cannot be interacted with",
            Self::OutOfRange => "mercenary is too far away to bribe",
            Self::InsufficientTreasure => "player lacks the treasure to bribe",
            Self::NotAdjacent => "spawner is not cardinally adjacent to the player",
            Self::MissingWeapon => "player has no weapon to destroy the spawner",
            Self::PlayerDefeated => "player has been defeated",
        };
        f.write_str(message)
    }
}

impl Error for InteractionError {}

/// Reasons a build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// The kind has no recipe.
    NotBuildable,
    /// The inventory lacks the recipe's materials.
    MissingMaterials,
    /// The player was defeated.
    PlayerDefeated,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::NotBuildable => "item kind cannot be built",
            Self::MissingMaterials => "inventory lacks the required materials",
            Self::PlayerDefeated => "player has been defeated",
        };
        f.write_str(message)
    }
}

impl Error for BuildError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_match_expectation() {
        let origin = Position::new(1, 1);
        let destination = Position::new(4, -1);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(origin.chebyshev_distance(destination), 3);
        assert!(origin.is_cardinally_adjacent(Position::new(1, 2)));
        assert!(!origin.is_cardinally_adjacent(Position::new(2, 2)));
    }

    #[test]
    fn neighbours_follow_direction_order() {
        let cell = Position::new(3, 3);
        assert_eq!(
            cell.cardinal_neighbours().collect::<Vec<_>>(),
            vec![
                Position::new(3, 2),
                Position::new(3, 4),
                Position::new(2, 3),
                Position::new(4, 3),
            ]
        );
    }

    #[test]
    fn steps_past_the_coordinate_range_are_refused() {
        let corner = Position::new(i32::MAX, i32::MIN);
        assert_eq!(corner.step(Direction::Right), None);
        assert_eq!(corner.step(Direction::Up), None);
        assert_eq!(
            corner.step(Direction::Left),
            Some(Position::new(i32::MAX - 1, i32::MIN))
        );
        assert_eq!(corner.cardinal_neighbours().count(), 2);
        assert_eq!(
            Position::new(i32::MIN, i32::MIN).manhattan_distance(Position::new(i32::MAX, i32::MAX)),
            u32::MAX
        );
    }

    #[test]
    fn entity_kind_names_parse_back() {
        for kind in [
            EntityKind::Player,
            EntityKind::ZombieToastSpawner,
            EntityKind::Door,
            EntityKind::Shield,
        ] {
            assert_eq!(kind.as_str().parse::<EntityKind>(), Ok(kind));
        }
        assert!("light_bulb_off".parse::<EntityKind>().is_err());
    }

    #[test]
    fn capability_table_matches_traversal_rules() {
        let wall = EntityKind::Wall.capabilities();
        assert!(wall.blocks_movement);
        assert!(wall.allows_spider_traversal);
        assert!(!wall.allows_zombie_traversal);

        let boulder = EntityKind::Boulder.capabilities();
        assert!(!boulder.allows_spider_traversal);
        assert!(EntityKind::Mercenary.capabilities().is_interactable);
        assert!(EntityKind::Sword.capabilities().is_collectable);

        assert_eq!(
            EntityKind::Door.traversal(MoverClass::Player, true),
            Traversal::RequiresKey
        );
        assert_eq!(
            EntityKind::Door.traversal(MoverClass::Zombie, false),
            Traversal::Open
        );
        assert_eq!(
            EntityKind::Boulder.traversal(MoverClass::Player, false),
            Traversal::Push
        );
        assert_eq!(
            EntityKind::Wall.traversal(MoverClass::Spider, false),
            Traversal::Open
        );
        assert_eq!(
            EntityKind::Door.traversal(MoverClass::Spider, true),
            Traversal::Blocked
        );
        assert_eq!(
            EntityKind::Door.traversal(MoverClass::Spider, false),
            Traversal::Open
        );
        assert!(!EntityKind::Door.capabilities().allows_spider_traversal);
        assert!(EntityKind::Door.stops_boulder(true));
        assert!(!EntityKind::Switch.stops_boulder(false));
    }

    #[test]
    fn bounding_box_perimeter_visits_each_edge_cell_once() {
        let bounds = BoundingBox::enclosing([
            Position::new(0, 0),
            Position::new(3, 1),
            Position::new(1, 2),
        ])
        .expect("non-empty");

        assert_eq!(bounds, BoundingBox::new(0, 3, 0, 2));
        let perimeter = bounds.perimeter();
        assert_eq!(perimeter.len(), 10);
        assert!(!perimeter.contains(&Position::new(1, 1)));
        assert!(perimeter.iter().all(|cell| bounds.is_on_perimeter(*cell)));
    }

    #[test]
    fn perimeter_indices_agree_with_row_major_scan() {
        for bounds in [
            BoundingBox::new(0, 3, 0, 2),
            BoundingBox::new(-2, -2, 1, 5),
            BoundingBox::new(1, 6, 4, 4),
            BoundingBox::new(0, 1, 0, 1),
        ] {
            let mut scanned = Vec::new();
            for y in bounds.min_y()..=bounds.max_y() {
                for x in bounds.min_x()..=bounds.max_x() {
                    let cell = Position::new(x, y);
                    if bounds.is_on_perimeter(cell) {
                        scanned.push(cell);
                    }
                }
            }

            assert_eq!(bounds.perimeter(), scanned);
            for (index, cell) in scanned.iter().enumerate() {
                assert_eq!(bounds.perimeter_index(*cell), Some(index as u64));
            }
            assert_eq!(bounds.perimeter_cell(bounds.perimeter_len()), None);
        }
    }

    #[test]
    fn huge_bounding_box_perimeter_is_indexed_without_scanning() {
        let bounds = BoundingBox::new(i32::MIN, i32::MAX, i32::MIN, i32::MAX);
        let side = 1_u64 << 32;
        assert_eq!(bounds.perimeter_len(), 4 * side - 4);

        let last = bounds.perimeter_len() - 1;
        assert_eq!(bounds.perimeter_cell(last), Some(Position::new(i32::MAX, i32::MAX)));
        assert_eq!(
            bounds.perimeter_cell(side),
            Some(Position::new(i32::MIN, i32::MIN + 1))
        );
        assert_eq!(
            bounds.perimeter_index(Position::new(i32::MAX, 0)),
            Some(side + 2 * (side / 2 - 1) + 1)
        );
        assert_eq!(bounds.perimeter_index(Position::new(0, 0)), None);
    }

    #[test]
    fn degenerate_bounding_box_has_single_cell() {
        let bounds = BoundingBox::enclosing([Position::new(2, 2)]).expect("non-empty");
        assert_eq!(bounds.perimeter(), vec![Position::new(2, 2)]);
        assert!(BoundingBox::enclosing(Vec::new()).is_none());
    }

    #[test]
    fn only_single_goals_parse() {
        assert_eq!("boulders".parse::<Goal>(), Ok(Goal::Boulders));
        assert!("AND".parse::<Goal>().is_err());
    }
}
