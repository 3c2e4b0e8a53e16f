use std::collections::BTreeMap;

use trio_tiles_core::{CellCoord, Color, Command, Event, Occupancy};
use trio_tiles_system_spawning::{Config, Spawning};
use trio_tiles_world::{self as world, query, World};

fn configure(world: &mut World, rows: u32, columns: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::ConfigureBoard {
            rows,
            columns,
            cell_width: 1.0,
            cell_height: 0.5,
            cell_palette: vec![Color::RED, Color::GREEN],
        },
        &mut events,
    );
    events
}

fn spawn_all(world: &mut World, spawning: &mut Spawning, events: &[Event]) -> Vec<Event> {
    let mut commands = Vec::new();
    spawning.handle(events, &query::occupancy_view(world), &mut commands);

    let mut spawned = Vec::new();
    for command in commands {
        world::apply(world, command, &mut spawned);
    }
    spawned
}

#[test]
fn fills_board_in_row_major_order() {
    let mut world = World::new();
    let events = configure(&mut world, 9, 6);
    let mut spawning = Spawning::default();

    let spawned = spawn_all(&mut world, &mut spawning, &events);

    let cells: Vec<CellCoord> = spawned
        .iter()
        .filter_map(|event| match event {
            Event::CharacterSpawned { cell, .. } => Some(*cell),
            _ => None,
        })
        .collect();
    let expected: Vec<CellCoord> = (0..9).map(|index| CellCoord::new(index % 6, index / 6)).collect();
    assert_eq!(cells, expected);
    assert_eq!(query::board(&world).occupied_count(), 9);
}

#[test]
fn spawned_colors_respect_quota() {
    let mut world = World::new();
    let events = configure(&mut world, 9, 6);
    let mut spawning = Spawning::default();

    let spawned = spawn_all(&mut world, &mut spawning, &events);

    let mut counts: BTreeMap<Color, usize> = BTreeMap::new();
    for event in &spawned {
        if let Event::CharacterSpawned { color, .. } = event {
            *counts.entry(*color).or_default() += 1;
        }
    }
    assert_eq!(
        counts,
        BTreeMap::from([(Color::BLUE, 3), (Color::YELLOW, 3), (Color::MAGENTA, 3)])
    );
}

#[test]
fn reserved_row_is_never_populated() {
    let mut world = World::new();
    let events = configure(&mut world, 2, 3);
    let mut spawning = Spawning::new(Config::new(6, vec![Color::BLUE, Color::YELLOW], 3, 7));

    let spawned = spawn_all(&mut world, &mut spawning, &events);

    let count = spawned
        .iter()
        .filter(|event| matches!(event, Event::CharacterSpawned { .. }))
        .count();
    assert_eq!(count, 3, "only the first row is free");
    for column in 0..3 {
        assert_eq!(
            query::board(&world).occupancy(CellCoord::new(column, 1)),
            Some(Occupancy::Reserved)
        );
    }
}

#[test]
fn spawn_count_is_capped_by_color_pool() {
    let mut world = World::new();
    let events = configure(&mut world, 9, 6);
    let mut spawning = Spawning::new(Config::new(20, vec![Color::BLUE], 2, 1));

    let spawned = spawn_all(&mut world, &mut spawning, &events);

    assert_eq!(query::character_view(&world).len(), 2);
    assert!(spawned
        .iter()
        .all(|event| !matches!(event, Event::SpawnRejected { .. })));
}

#[test]
fn identical_seeds_produce_identical_boards() {
    let layout = |seed: u64| {
        let mut world = World::new();
        let events = configure(&mut world, 9, 6);
        let mut spawning = Spawning::new(Config::new(
            9,
            vec![Color::BLUE, Color::YELLOW, Color::MAGENTA],
            3,
            seed,
        ));
        let _ = spawn_all(&mut world, &mut spawning, &events);
        query::character_view(&world)
            .iter()
            .map(|character| (character.cell, character.color))
            .collect::<Vec<_>>()
    };

    assert_eq!(layout(0xfeed), layout(0xfeed));
}
