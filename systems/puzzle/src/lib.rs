#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that keeps floor switches in sync with the boulders resting on
//! them.

use dungeonmania_core::{Command, EntityKind, EntityState, EntityView};

/// Puzzle system that emits switch state changes.
#[derive(Debug, Default)]
pub struct Puzzle {
    scratch: Vec<Command>,
}

impl Puzzle {
    /// Creates a new puzzle system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::SetSwitchState` for every switch whose stored state no
    /// longer matches the presence of a boulder on its cell.
    pub fn handle(&mut self, entity_view: &EntityView, out: &mut Vec<Command>) {
        self.scratch.clear();

        for switch in entity_view.of_kind(EntityKind::Switch) {
            let EntityState::Switch { triggered } = switch.state else {
                continue;
            };
            let pressed = entity_view
                .at(switch.position)
                .any(|entity| entity.kind == EntityKind::Boulder);
            if pressed != triggered {
                self.scratch.push(Command::SetSwitchState {
                    switch: switch.id,
                    triggered: pressed,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
