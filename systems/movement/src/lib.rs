#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks selected characters to their holding slots.
//!
//! Characters never move diagonally. Every step advances along the axis with the
//! larger remaining distance, falling back to the other axis once the dominant
//! one is within the arrival tolerance. When both axes are within tolerance the
//! system asks the world to settle the character.

use std::time::Duration;

use glam::Vec2;
use trio_tiles_core::{
    CharacterView, Command, Event, MovementState, WorldPoint, DEFAULT_ARRIVAL_TOLERANCE,
    DEFAULT_MOVEMENT_SPEED,
};

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    speed: f32,
    arrival_tolerance: f32,
}

impl Config {
    /// Creates a new configuration using the provided linear speed and tolerance.
    ///
    /// `speed` is measured in world units per second.
    #[must_use]
    pub const fn new(speed: f32, arrival_tolerance: f32) -> Self {
        Self {
            speed,
            arrival_tolerance,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_MOVEMENT_SPEED, DEFAULT_ARRIVAL_TOLERANCE)
    }
}

/// Pure system that reacts to elapsed time and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Consumes world events and the character view to emit movement commands.
    ///
    /// Every moving character receives exactly one command per handled batch:
    /// either an intermediate position or a request to settle in its slot.
    pub fn handle(&mut self, events: &[Event], characters: &CharacterView, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }

        if elapsed.is_zero() {
            return;
        }

        let budget = self.config.speed * elapsed.as_secs_f32();
        for character in characters.iter() {
            let MovementState::Moving { target } = character.state else {
                continue;
            };

            let command = match step_toward(
                to_plane(character.position),
                to_plane(target),
                budget,
                self.config.arrival_tolerance,
            ) {
                Step::Advance(position) => Command::MoveCharacter {
                    character: character.id,
                    position: from_plane(position),
                },
                Step::Arrived => Command::SettleCharacter {
                    character: character.id,
                },
            };
            out.push(command);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    Advance(Vec2),
    Arrived,
}

/// Planar axes; the world Z axis is stored in the `y` lane of a [`Vec2`].
#[derive(Clone, Copy, Debug)]
enum Axis {
    X,
    Z,
}

impl Axis {
    fn component(self, vector: Vec2) -> f32 {
        match self {
            Self::X => vector.x,
            Self::Z => vector.y,
        }
    }

    fn advance(self, current: Vec2, target: Vec2, max_distance: f32) -> Vec2 {
        let mut next = current;
        match self {
            Self::X => next.x = move_towards(current.x, target.x, max_distance),
            Self::Z => next.y = move_towards(current.y, target.y, max_distance),
        }
        next
    }
}

fn step_toward(current: Vec2, target: Vec2, max_distance: f32, tolerance: f32) -> Step {
    let remaining = (target - current).abs();
    let order = if remaining.x > remaining.y {
        [Axis::X, Axis::Z]
    } else {
        [Axis::Z, Axis::X]
    };

    for axis in order {
        if axis.component(remaining) > tolerance {
            return Step::Advance(axis.advance(current, target, max_distance));
        }
    }
    Step::Arrived
}

fn move_towards(current: f32, target: f32, max_distance: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_distance {
        target
    } else {
        current + delta.signum() * max_distance
    }
}

fn to_plane(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x, point.z)
}

fn from_plane(vector: Vec2) -> WorldPoint {
    WorldPoint::new(vector.x, vector.y)
}
