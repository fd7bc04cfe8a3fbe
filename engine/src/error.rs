//! Errors surfaced by player actions.

use dungeonmania_core::{BuildError, EntityId, InteractionError};
use thiserror::Error;

/// Failure of a player action that leaves the dungeon untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The action is well-formed but its preconditions do not hold.
    #[error("invalid action: {0}")]
    InvalidAction(#[from] ActionRejection),
    /// The action names an entity or item that does not exist.
    #[error("unknown entity or item {0}")]
    InvalidReference(EntityId),
}

/// Reason an action was refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ActionRejection {
    /// The interaction target refused the interaction.
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    /// Crafting was impossible.
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl ActionError {
    pub(crate) fn from_interaction(entity: EntityId, reason: InteractionError) -> Self {
        match reason {
            InteractionError::UnknownEntity => Self::InvalidReference(entity),
            other => Self::InvalidAction(ActionRejection::Interaction(other)),
        }
    }
}

impl From<BuildError> for ActionError {
    fn from(reason: BuildError) -> Self {
        Self::InvalidAction(ActionRejection::Build(reason))
    }
}
