use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use trio_tiles_core::{CharacterId, Color, Command, Event, MovementState, SelectionError};
use trio_tiles_system_matching::Matching;
use trio_tiles_system_movement::Movement;
use trio_tiles_system_spawning::Spawning;
use trio_tiles_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(16);
const MAX_FRAMES: usize = 500;

struct Harness {
    world: World,
    spawning: Spawning,
    movement: Movement,
    matching: Matching,
    log: Vec<Event>,
}

impl Harness {
    fn new() -> Self {
        let mut harness = Self {
            world: World::new(),
            spawning: Spawning::default(),
            movement: Movement::default(),
            matching: Matching::default(),
            log: Vec::new(),
        };
        let mut events = Vec::new();
        world::apply(
            &mut harness.world,
            Command::ConfigureBoard {
                rows: 9,
                columns: 6,
                cell_width: 1.0,
                cell_height: 0.5,
                cell_palette: vec![Color::RED, Color::GREEN],
            },
            &mut events,
        );
        let mut commands = Vec::new();
        harness.spawning.handle(
            &events,
            &query::occupancy_view(&harness.world),
            &mut commands,
        );
        harness.execute(commands, &mut events);
        harness.log.extend(events);
        harness
    }

    fn execute(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }

    fn select(&mut self, character: CharacterId) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SelectCharacter { character },
            &mut events,
        );
        self.log.extend(events.iter().cloned());
        events
    }

    fn frame(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt: FRAME }, &mut events);

        let mut commands = Vec::new();
        self.movement.handle(
            &events,
            &query::character_view(&self.world),
            &mut commands,
        );
        let mut settled = Vec::new();
        self.execute(commands, &mut settled);

        let mut removals = Vec::new();
        self.matching.handle(
            &settled,
            &query::character_view(&self.world),
            &mut removals,
        );
        self.execute(removals, &mut settled);

        events.extend(settled);
        self.log.extend(events.iter().cloned());
        events
    }

    fn run_until_idle(&mut self) {
        for _ in 0..MAX_FRAMES {
            let _ = self.frame();
            let moving = query::character_view(&self.world)
                .iter()
                .any(|character| character.state.is_moving());
            if !moving {
                return;
            }
        }
        panic!("movement did not settle within {MAX_FRAMES} frames");
    }

    fn characters_of(&self, color: Color) -> Vec<CharacterId> {
        query::character_view(&self.world)
            .iter()
            .filter(|character| character.color == color)
            .map(|character| character.id)
            .collect()
    }
}

#[test]
fn grouped_selection_clears_every_character() {
    let mut harness = Harness::new();
    assert_eq!(query::character_view(&harness.world).len(), 9);

    for color in [Color::BLUE, Color::YELLOW, Color::MAGENTA] {
        for character in harness.characters_of(color) {
            let _ = harness.select(character);
            harness.run_until_idle();
        }
        assert!(harness.characters_of(color).is_empty());
    }

    assert!(query::character_view(&harness.world).is_empty());
    assert!(harness.matching.tally().is_clear());
    assert_eq!(query::board(&harness.world).occupied_count(), 0);
    assert!(query::holding_slots(&harness.world)
        .iter()
        .all(|(_, slot)| !slot.is_occupied()));

    let removed = harness
        .log
        .iter()
        .filter(|event| matches!(event, Event::CharacterRemoved { .. }))
        .count();
    assert_eq!(removed, 9);
}

#[test]
fn mixed_selection_exhausts_holding_row() {
    let mut harness = Harness::new();
    let blue = harness.characters_of(Color::BLUE);
    let yellow = harness.characters_of(Color::YELLOW);
    let magenta = harness.characters_of(Color::MAGENTA);

    for character in [blue[0], yellow[0], magenta[0], blue[1], yellow[1]] {
        let _ = harness.select(character);
        harness.run_until_idle();
    }

    let placed = query::character_view(&harness.world)
        .iter()
        .filter(|character| character.state == MovementState::Placed)
        .count();
    assert_eq!(placed, 5);
    assert_eq!(harness.matching.tally().count(Color::BLUE), 2);

    let events = harness.select(magenta[1]);
    assert_eq!(
        events.last(),
        Some(&Event::SelectionRejected {
            character: magenta[1],
            reason: SelectionError::AllocationExhausted,
        })
    );
    let snapshot = query::character(&harness.world, magenta[1]).expect("registered");
    assert_eq!(snapshot.state, MovementState::Idle);
    assert_eq!(query::selected(&harness.world), None);
}

#[test]
fn removal_frees_slots_for_later_selections() {
    let mut harness = Harness::new();
    let blue = harness.characters_of(Color::BLUE);
    let yellow = harness.characters_of(Color::YELLOW);

    for character in [yellow[0], blue[0], blue[1], blue[2]] {
        let _ = harness.select(character);
        harness.run_until_idle();
    }

    let remaining = query::character(&harness.world, yellow[0]).expect("registered");
    assert_eq!(remaining.state, MovementState::Placed);
    let free = query::holding_slots(&harness.world)
        .iter()
        .filter(|(_, slot)| !slot.is_occupied())
        .count();
    assert_eq!(free, 4);
}

#[test]
fn identical_runs_produce_identical_fingerprints() {
    let run = || {
        let mut harness = Harness::new();
        for color in [Color::MAGENTA, Color::BLUE, Color::YELLOW] {
            for character in harness.characters_of(color) {
                let _ = harness.select(character);
                harness.run_until_idle();
            }
        }
        assert!(query::character_view(&harness.world).is_empty());
        fingerprint(&harness.log)
    };

    assert_eq!(run(), run());
}

fn fingerprint(events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();
    events.len().hash(&mut hasher);
    for event in events {
        format!("{event:?}").hash(&mut hasher);
    }
    hasher.finish()
}
