#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match resolution system that clears a color once enough of it sits in the holding row.
//!
//! The system counts completed placements per color. When a color's count
//! reaches the configured threshold every placed character of that color is
//! removed, not only the ones that triggered the match, and the count for the
//! color starts over from zero.

use std::collections::BTreeMap;

use tracing::{debug, info};
use trio_tiles_core::{
    CharacterView, Color, Command, Event, MovementOutcome, MovementState, DEFAULT_MATCH_THRESHOLD,
};

/// Per-color count of characters that finished moving into a holding slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorTally {
    counts: BTreeMap<Color, u32>,
}

impl ColorTally {
    /// Current count recorded for the color.
    #[must_use]
    pub fn count(&self, color: Color) -> u32 {
        self.counts.get(&color).copied().unwrap_or(0)
    }

    /// Iterates over every color seen so far together with its count.
    pub fn iter(&self) -> impl Iterator<Item = (Color, u32)> + '_ {
        self.counts.iter().map(|(color, count)| (*color, *count))
    }

    /// Reports whether every recorded count is zero.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.counts.values().all(|count| *count == 0)
    }

    fn increment(&mut self, color: Color) -> u32 {
        let count = self.counts.entry(color).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    fn reset(&mut self, color: Color) {
        let _ = self.counts.insert(color, 0);
    }
}

/// Pure system that tallies placements and emits removal commands on a match.
#[derive(Debug)]
pub struct Matching {
    threshold: u32,
    tally: ColorTally,
}

impl Matching {
    /// Creates a matching system that triggers once a color reaches `threshold`.
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            tally: ColorTally::default(),
        }
    }

    /// Threshold a color has to reach before it is cleared.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Current color tally.
    #[must_use]
    pub fn tally(&self) -> &ColorTally {
        &self.tally
    }

    /// Records a completed placement and reports whether the color just matched.
    ///
    /// A match resets the color's count to zero.
    pub fn record_placement(&mut self, color: Color) -> bool {
        let count = self.tally.increment(color);
        let matched = count == self.threshold;
        if matched {
            self.tally.reset(color);
        }
        debug!(tally = ?self.tally, "placement recorded");
        matched
    }

    /// Consumes movement completions and emits removal commands for matched colors.
    ///
    /// `characters` must reflect the world after the completions were applied so
    /// the character that triggered the match is itself removed.
    pub fn handle(&mut self, events: &[Event], characters: &CharacterView, out: &mut Vec<Command>) {
        for event in events {
            let Event::MovementCompleted {
                color,
                outcome: MovementOutcome::Placed { .. },
                ..
            } = event
            else {
                continue;
            };

            if !self.record_placement(*color) {
                continue;
            }

            let matched: Vec<_> = characters
                .iter()
                .filter(|character| {
                    character.color == *color && character.state == MovementState::Placed
                })
                .map(|character| character.id)
                .collect();
            info!(
                red = color.red(),
                green = color.green(),
                blue = color.blue(),
                removed = matched.len(),
                "color matched"
            );
            out.extend(
                matched
                    .into_iter()
                    .map(|character| Command::RemoveCharacter { character }),
            );
        }
    }
}

impl Default for Matching {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trio_tiles_core::{CharacterId, CharacterSnapshot, SlotId, WorldPoint};

    fn placed(id: u32, color: Color) -> CharacterSnapshot {
        CharacterSnapshot {
            id: CharacterId::new(id),
            color,
            cell: None,
            position: WorldPoint::new(id as f32, 8.0),
            state: MovementState::Placed,
            slot: Some(SlotId::new(id)),
            selected: false,
        }
    }

    fn completed(id: u32, color: Color) -> Event {
        Event::MovementCompleted {
            character: CharacterId::new(id),
            color,
            outcome: MovementOutcome::Placed {
                slot: SlotId::new(id),
                cell: None,
            },
        }
    }

    #[test]
    fn tally_resets_when_threshold_is_reached() {
        let mut matching = Matching::new(3);

        assert!(!matching.record_placement(Color::BLUE));
        assert!(!matching.record_placement(Color::BLUE));
        assert_eq!(matching.tally().count(Color::BLUE), 2);
        assert!(matching.record_placement(Color::BLUE));
        assert_eq!(matching.tally().count(Color::BLUE), 0);
        assert!(matching.tally().is_clear());
    }

    #[test]
    fn colors_are_counted_independently() {
        let mut matching = Matching::default();

        assert!(!matching.record_placement(Color::BLUE));
        assert!(!matching.record_placement(Color::YELLOW));
        assert!(!matching.record_placement(Color::BLUE));

        let counts: Vec<_> = matching.tally().iter().collect();
        assert_eq!(counts, vec![(Color::BLUE, 2), (Color::YELLOW, 1)]);
    }

    #[test]
    fn match_removes_every_placed_character_of_the_color() {
        let mut matching = Matching::new(2);
        let view = CharacterView::from_snapshots(vec![
            placed(0, Color::BLUE),
            placed(1, Color::BLUE),
            placed(2, Color::YELLOW),
            placed(3, Color::BLUE),
        ]);
        let mut commands = Vec::new();

        matching.handle(
            &[completed(0, Color::BLUE), completed(1, Color::BLUE)],
            &view,
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![
                Command::RemoveCharacter {
                    character: CharacterId::new(0)
                },
                Command::RemoveCharacter {
                    character: CharacterId::new(1)
                },
                Command::RemoveCharacter {
                    character: CharacterId::new(3)
                },
            ]
        );
    }

    #[test]
    fn cancelled_movements_are_not_counted() {
        let mut matching = Matching::new(1);
        let mut commands = Vec::new();

        matching.handle(
            &[Event::MovementCompleted {
                character: CharacterId::new(0),
                color: Color::MAGENTA,
                outcome: MovementOutcome::Cancelled,
            }],
            &CharacterView::default(),
            &mut commands,
        );

        assert!(commands.is_empty());
        assert_eq!(matching.tally().count(Color::MAGENTA), 0);
    }

    #[test]
    fn moving_characters_of_the_matched_color_stay() {
        let mut matching = Matching::new(1);
        let mut moving = placed(4, Color::BLUE);
        moving.state = MovementState::Moving {
            target: WorldPoint::new(5.0, 8.0),
        };
        let view = CharacterView::from_snapshots(vec![placed(0, Color::BLUE), moving]);
        let mut commands = Vec::new();

        matching.handle(&[completed(0, Color::BLUE)], &view, &mut commands);

        assert_eq!(
            commands,
            vec![Command::RemoveCharacter {
                character: CharacterId::new(0)
            }]
        );
    }
}
