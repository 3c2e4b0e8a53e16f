//! Scripted player that keeps clicking until the board is cleared.

use std::{cmp::Reverse, collections::BTreeMap};

use trio_tiles_core::{CharacterView, Color, MovementState, WorldPoint};

/// Chooses the next character to click, or `None` while something is moving or nothing is left.
///
/// Characters are picked color by color: the color with the most characters
/// already placed in the holding row is completed first.
pub(crate) fn next_click(characters: &CharacterView) -> Option<WorldPoint> {
    if characters.iter().any(|character| character.state.is_moving()) {
        return None;
    }

    let mut placed: BTreeMap<Color, usize> = BTreeMap::new();
    for character in characters.iter() {
        if character.state == MovementState::Placed {
            *placed.entry(character.color).or_default() += 1;
        }
    }

    let preferred = placed
        .iter()
        .max_by_key(|(color, count)| (**count, Reverse(**color)))
        .map(|(color, _)| *color);

    let waiting: Vec<_> = characters
        .iter()
        .filter(|character| character.state != MovementState::Placed)
        .collect();
    let chosen = preferred
        .and_then(|color| waiting.iter().find(|character| character.color == color))
        .or_else(|| waiting.first())?;
    Some(chosen.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trio_tiles_core::{CharacterId, CharacterSnapshot, SlotId};

    fn snapshot(id: u32, color: Color, state: MovementState) -> CharacterSnapshot {
        CharacterSnapshot {
            id: CharacterId::new(id),
            color,
            cell: None,
            position: WorldPoint::new(id as f32, 0.0),
            state,
            slot: (state == MovementState::Placed).then_some(SlotId::new(id)),
            selected: false,
        }
    }

    #[test]
    fn waits_for_moving_characters() {
        let view = CharacterView::from_snapshots(vec![
            snapshot(0, Color::BLUE, MovementState::Idle),
            snapshot(
                1,
                Color::BLUE,
                MovementState::Moving {
                    target: WorldPoint::new(1.0, 8.0),
                },
            ),
        ]);

        assert_eq!(next_click(&view), None);
    }

    #[test]
    fn completes_the_color_already_in_the_holding_row() {
        let view = CharacterView::from_snapshots(vec![
            snapshot(0, Color::YELLOW, MovementState::Idle),
            snapshot(1, Color::BLUE, MovementState::Placed),
            snapshot(2, Color::BLUE, MovementState::Idle),
        ]);

        assert_eq!(next_click(&view), Some(WorldPoint::new(2.0, 0.0)));
    }

    #[test]
    fn starts_with_the_lowest_identifier() {
        let view = CharacterView::from_snapshots(vec![
            snapshot(4, Color::MAGENTA, MovementState::Idle),
            snapshot(3, Color::YELLOW, MovementState::Cancelled),
        ]);

        assert_eq!(next_click(&view), Some(WorldPoint::new(3.0, 0.0)));
    }

    #[test]
    fn nothing_left_to_click() {
        let view = CharacterView::from_snapshots(vec![snapshot(
            0,
            Color::BLUE,
            MovementState::Placed,
        )]);

        assert_eq!(next_click(&view), None);
    }
}
