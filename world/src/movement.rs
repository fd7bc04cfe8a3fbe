//! Movement legality shared by the player and every other mover.

use dungeonmania_core::{BoundingBox, Direction, EntityId, EntityState, MoverClass, Position, Traversal};

use crate::registry::EntityRegistry;

/// Resolution of a single attempted step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StepPlan {
    /// The step is illegal and must be ignored.
    Blocked,
    /// The step is legal.
    Advance {
        /// Destination cell of the mover.
        to: Position,
        /// Boulder pushed ahead of the mover and the cell it lands on.
        push: Option<(EntityId, Position)>,
        /// Locked door opened by the mover's key.
        unlock: Option<EntityId>,
    },
}

/// Resolves whether `mover` may step from `from` toward `direction`.
///
/// `key` is the key number carried by the mover; only the player carries keys.
pub(crate) fn plan_step(
    registry: &EntityRegistry,
    bounds: &BoundingBox,
    mover: MoverClass,
    from: Position,
    direction: Direction,
    key: Option<u32>,
) -> StepPlan {
    let Some(to) = from.step(direction) else {
        return StepPlan::Blocked;
    };
    if mover == MoverClass::Spider && !bounds.contains(to) {
        return StepPlan::Blocked;
    }

    let mut push = None;
    let mut unlock = None;
    for occupant in registry.at(to) {
        match occupant.kind.traversal(mover, occupant.is_locked()) {
            Traversal::Open => {}
            Traversal::Blocked => return StepPlan::Blocked,
            Traversal::Push => {
                let Some(beyond) = to.step(direction) else {
                    return StepPlan::Blocked;
                };
                if !boulder_can_enter(registry, beyond) {
                    return StepPlan::Blocked;
                }
                push = Some((occupant.id, beyond));
            }
            Traversal::RequiresKey => {
                let EntityState::Door { key: door_key, .. } = occupant.state else {
                    return StepPlan::Blocked;
                };
                if key.is_none() || door_key != key {
                    return StepPlan::Blocked;
                }
                unlock = Some(occupant.id);
            }
        }
    }

    StepPlan::Advance { to, push, unlock }
}

/// Reports whether a keyless mover of the given class may stand on `cell`.
pub(crate) fn can_enter(
    registry: &EntityRegistry,
    bounds: &BoundingBox,
    mover: MoverClass,
    cell: Position,
) -> bool {
    if mover == MoverClass::Spider && !bounds.contains(cell) {
        return false;
    }
    registry
        .at(cell)
        .all(|occupant| occupant.kind.traversal(mover, occupant.is_locked()) == Traversal::Open)
}

fn boulder_can_enter(registry: &EntityRegistry, cell: Position) -> bool {
    registry
        .at(cell)
        .all(|occupant| !occupant.kind.stops_boulder(occupant.is_locked()))
}
