//! Validation of player interactions. Nothing here mutates the world.

use dungeonmania_core::{EntityId, EntityKind, InteractionError};

use crate::World;

/// Fully validated interaction ready to be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InteractionPlan {
    /// Convert a mercenary into an ally, paying with the listed treasure.
    Bribe {
        mercenary: EntityId,
        payment: Vec<EntityId>,
    },
    /// Remove a zombie spawner.
    DestroySpawner { spawner: EntityId },
}

pub(crate) fn plan(world: &World, target: EntityId) -> Result<InteractionPlan, InteractionError> {
    let entity = world
        .registry
        .get(target)
        .ok_or(InteractionError::UnknownEntity)?;
    let player = world
        .player
        .as_ref()
        .and_then(|player| world.registry.get(player.id))
        .ok_or(InteractionError::PlayerDefeated)?;

    if !entity.interactable {
        return Err(InteractionError::NotInteractable);
    }

    match entity.kind {
        EntityKind::Mercenary => {
            let distance = player.position.chebyshev_distance(entity.position);
            if distance > world.config.bribe_radius {
                return Err(InteractionError::OutOfRange);
            }
            let payment = world
                .inventory
                .first_n(EntityKind::Treasure, world.config.bribe_amount)
                .ok_or(InteractionError::InsufficientTreasure)?;
            Ok(InteractionPlan::Bribe {
                mercenary: entity.id,
                payment,
            })
        }
        EntityKind::ZombieToastSpawner => {
            if !player.position.is_cardinally_adjacent(entity.position) {
                return Err(InteractionError::NotAdjacent);
            }
            if !world.inventory.has_weapon() {
                return Err(InteractionError::MissingWeapon);
            }
            Ok(InteractionPlan::DestroySpawner { spawner: entity.id })
        }
        _ => Err(InteractionError::NotInteractable),
    }
}
