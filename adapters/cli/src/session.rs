//! Wiring of the world and the pure systems into a frame-driven session.

use std::time::Duration;

use anyhow::{Context, Result};
use trio_tiles_core::{Command, Event, WorldPoint};
use trio_tiles_system_bootstrap::{Bootstrap, GameConfig};
use trio_tiles_system_matching::Matching;
use trio_tiles_system_movement::{self as movement, Movement};
use trio_tiles_system_selection::{Selection, SelectionInput};
use trio_tiles_system_spawning::{self as spawning, Spawning};
use trio_tiles_world::{self as world, query, World};

/// Owns the authoritative world and the systems that drive it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    movement: Movement,
    matching: Matching,
    selection: Selection,
}

impl Session {
    /// Configures a fresh world from `config` and populates the board.
    pub(crate) fn start(config: &GameConfig) -> Result<Self> {
        let commands = Bootstrap
            .startup_commands(config)
            .context("refusing to start with an invalid configuration")?;

        let mut session = Self {
            world: World::new(),
            movement: Movement::new(movement::Config::new(
                config.movement.speed,
                config.movement.arrival_tolerance,
            )),
            matching: Matching::new(config.match_threshold),
            selection: Selection::new(config.pick_radius),
        };
        let mut spawning = Spawning::new(spawning::Config::new(
            config.spawn.count,
            config.spawn.palette.clone(),
            config.spawn.quota_per_color,
            config.spawn.seed,
        ));

        let mut events = Vec::new();
        session.execute(commands, &mut events);
        let mut spawns = Vec::new();
        spawning.handle(&events, &query::occupancy_view(&session.world), &mut spawns);
        session.execute(spawns, &mut events);
        Ok(session)
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn matching(&self) -> &Matching {
        &self.matching
    }

    /// Routes a click through the selection system.
    pub(crate) fn click(&mut self, point: WorldPoint) -> Vec<Event> {
        let mut commands = Vec::new();
        self.selection.handle(
            SelectionInput::new(Some(point)),
            &query::character_view(&self.world),
            &mut commands,
        );

        let mut events = Vec::new();
        self.execute(commands, &mut events);
        events
    }

    /// Advances the simulation by one frame.
    ///
    /// Matching observes the character view after movement commands were
    /// applied, so completions are tallied against finalized occupancy.
    pub(crate) fn frame(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.movement.handle(
            &events,
            &query::character_view(&self.world),
            &mut commands,
        );
        self.execute(commands, &mut events);

        let mut removals = Vec::new();
        self.matching.handle(
            &events,
            &query::character_view(&self.world),
            &mut removals,
        );
        self.execute(removals, &mut events);
        events
    }

    /// Reports whether any character is still travelling to a slot.
    pub(crate) fn is_moving(&self) -> bool {
        query::character_view(&self.world)
            .iter()
            .any(|character| character.state.is_moving())
    }

    fn execute(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }
}
