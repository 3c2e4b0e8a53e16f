#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure selection system that turns pointer clicks into character selection commands.

use glam::Vec2;
use trio_tiles_core::{CharacterId, CharacterView, Command, WorldPoint, DEFAULT_PICK_RADIUS};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionInput {
    /// World position of a click registered on this frame, projected onto the board plane.
    pub click: Option<WorldPoint>,
}

impl SelectionInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(click: Option<WorldPoint>) -> Self {
        Self { click }
    }
}

/// Selection system that resolves clicks against character positions.
#[derive(Clone, Debug)]
pub struct Selection {
    pick_radius: f32,
}

impl Selection {
    /// Creates a selection system that accepts clicks within `pick_radius` of a character.
    #[must_use]
    pub const fn new(pick_radius: f32) -> Self {
        Self { pick_radius }
    }

    /// Consumes adapter input and the character view to emit selection commands.
    pub fn handle(&self, input: SelectionInput, characters: &CharacterView, out: &mut Vec<Command>) {
        let Some(click) = input.click else {
            return;
        };

        if let Some(character) = self.pick(click, characters) {
            out.push(Command::SelectCharacter { character });
        }
    }

    /// Character closest to `point` within the pick radius, lowest identifier first on ties.
    #[must_use]
    pub fn pick(&self, point: WorldPoint, characters: &CharacterView) -> Option<CharacterId> {
        let point = Vec2::new(point.x, point.z);
        let mut best: Option<(CharacterId, f32)> = None;
        for character in characters.iter() {
            let distance = point.distance(Vec2::new(character.position.x, character.position.z));
            if distance > self.pick_radius {
                continue;
            }
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((character.id, distance));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(DEFAULT_PICK_RADIUS)
    }
}
