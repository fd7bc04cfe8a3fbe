//! Authoritative entity storage and identifier allocation.

use std::collections::BTreeMap;

use dungeonmania_core::{EntityId, EntityKind, EntitySnapshot, EntityState, Position};

/// Entity stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    /// Identifier allocated by the registry.
    pub(crate) id: EntityId,
    /// Kind of the entity.
    pub(crate) kind: EntityKind,
    /// Cell currently occupied.
    pub(crate) position: Position,
    /// Cell occupied before the latest move.
    pub(crate) previous_position: Position,
    /// Kind-specific mutable state.
    pub(crate) state: EntityState,
    /// Whether the entity currently accepts interactions.
    pub(crate) interactable: bool,
}

impl Entity {
    /// Whether the entity is a door that still blocks movement.
    pub(crate) fn is_locked(&self) -> bool {
        matches!(self.state, EntityState::Door { locked: true, .. })
    }

    pub(crate) fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            previous_position: self.previous_position,
            interactable: self.interactable,
            state: self.state,
        }
    }
}

/// Registry that stores entities in allocation order.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: EntityId::new(0),
        }
    }

    /// Reserves a fresh identifier. Inventory items share the id space.
    pub(crate) fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = EntityId::new(id.get().saturating_add(1));
        id
    }

    /// Creates an entity with the default state for its kind.
    pub(crate) fn spawn(&mut self, kind: EntityKind, position: Position, key: Option<u32>) -> EntityId {
        let id = self.allocate_id();
        let entity = Entity {
            id,
            kind,
            position,
            previous_position: position,
            state: initial_state(kind, key),
            interactable: kind.capabilities().is_interactable,
        };
        let _ = self.entries.insert(id, entity);
        id
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entries.remove(&id)
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Iterator over entities in registry order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    /// Iterator over entities occupying the provided cell.
    pub(crate) fn at(&self, position: Position) -> impl Iterator<Item = &Entity> {
        self.entries
            .values()
            .filter(move |entity| entity.position == position)
    }
}

fn initial_state(kind: EntityKind, key: Option<u32>) -> EntityState {
    match kind {
        EntityKind::Door => EntityState::Door { key, locked: true },
        EntityKind::Key => EntityState::Key { key },
        EntityKind::Switch => EntityState::Switch { triggered: false },
        EntityKind::Spider => EntityState::Spider {
            facing: dungeonmania_core::Direction::Up,
        },
        EntityKind::Mercenary => EntityState::Mercenary { ally: false },
        _ => EntityState::Plain,
    }
}
