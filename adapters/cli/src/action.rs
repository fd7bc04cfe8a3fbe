use std::{error::Error, fmt, num::ParseIntError, str::FromStr};

use dungeonmania_core::{Direction, EntityId, EntityKind, UnknownEntityKind};

/// Delimiter separating an action verb from its argument.
const FIELD_DELIMITER: char = ':';

/// Player action given on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// `up`, `down`, `left` or `right`: advance one tick moving the player.
    Move(Direction),
    /// `interact:<id>`: bribe a mercenary or destroy a spawner.
    Interact(EntityId),
    /// `build:<kind>`: craft an item.
    Build(EntityKind),
    /// `use:<id>`: use an inventory item.
    Use(EntityId),
}

/// Errors raised while parsing an [`Action`].
#[derive(Debug)]
pub(crate) enum ActionParseError {
    /// The verb is not a known action.
    UnknownAction(String),
    /// The verb requires an argument after `:`.
    MissingArgument(String),
    /// The entity id could not be parsed.
    InvalidId(ParseIntError),
    /// The item kind could not be parsed.
    InvalidKind(UnknownEntityKind),
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (verb, argument) = match trimmed.split_once(FIELD_DELIMITER) {
            Some((verb, argument)) => (verb, Some(argument)),
            None => (trimmed, None),
        };
        let verb = verb.to_ascii_lowercase();

        let direction = match verb.as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        };
        if let Some(direction) = direction {
            return Ok(Self::Move(direction));
        }

        let require = || {
            argument
                .filter(|argument| !argument.is_empty())
                .ok_or_else(|| ActionParseError::MissingArgument(verb.clone()))
        };
        match verb.as_str() {
            "interact" => Ok(Self::Interact(parse_id(require()?)?)),
            "use" => Ok(Self::Use(parse_id(require()?)?)),
            "build" => require()?
                .parse()
                .map(Self::Build)
                .map_err(ActionParseError::InvalidKind),
            _ => Err(ActionParseError::UnknownAction(trimmed.to_owned())),
        }
    }
}

fn parse_id(value: &str) -> Result<EntityId, ActionParseError> {
    value
        .parse::<u32>()
        .map(EntityId::new)
        .map_err(ActionParseError::InvalidId)
}

impl fmt::Display for ActionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAction(action) => write!(f, "action '{action}' is not supported"),
            Self::MissingArgument(verb) => write!(f, "action '{verb}' needs an argument after ':'"),
            Self::InvalidId(error) => write!(f, "could not parse entity id: {error}"),
            Self::InvalidKind(error) => write!(f, "could not parse item kind: {error}"),
        }
    }
}

impl Error for ActionParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidId(error) => Some(error),
            Self::InvalidKind(error) => Some(error),
            _ => None,
        }
    }
}
