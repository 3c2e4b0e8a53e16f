#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Trio Tiles.

mod board;
mod characters;
mod slots;

use std::collections::BTreeMap;

use tracing::{debug, warn};
use trio_tiles_core::{
    CellCoord, CharacterId, Color, Command, Event, MovementOutcome, MovementState, SelectionError,
    SpawnError, WorldPoint, DEFAULT_CELL_HEIGHT, DEFAULT_CELL_PALETTE, DEFAULT_CELL_WIDTH,
    DEFAULT_COLUMNS, DEFAULT_HOLDING_SLOTS, DEFAULT_ROWS, WELCOME_BANNER,
};

pub use board::BoardGrid;
pub use slots::{HoldingSlot, HoldingSlots};

use characters::CharacterRegistry;

/// Represents the authoritative Trio Tiles world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    board: BoardGrid,
    slots: HoldingSlots,
    characters: CharacterRegistry,
    spawn_colors: BTreeMap<CellCoord, Vec<Color>>,
    tick_index: u64,
}

impl World {
    /// Creates a new world with the default board and holding slots.
    ///
    /// The last board row is reserved and no characters are registered.
    #[must_use]
    pub fn new() -> Self {
        let mut board = BoardGrid::new(
            DEFAULT_COLUMNS,
            DEFAULT_ROWS,
            DEFAULT_CELL_WIDTH,
            DEFAULT_CELL_HEIGHT,
            &DEFAULT_CELL_PALETTE,
        );
        let _ = board.mark_row_reserved(DEFAULT_ROWS as i32 - 1);
        Self {
            banner: WELCOME_BANNER,
            board,
            slots: HoldingSlots::new(&DEFAULT_HOLDING_SLOTS),
            characters: CharacterRegistry::new(),
            spawn_colors: BTreeMap::new(),
            tick_index: 0,
        }
    }

    fn notify_occupancy(&self, out_events: &mut Vec<Event>) {
        self.board.log_matrix();
        out_events.push(Event::OccupancyChanged {
            occupied: self.board.occupied_count(),
        });
    }

    fn reserve_row(&mut self, row: i32, out_events: &mut Vec<Event>) {
        match self.board.mark_row_reserved(row) {
            Ok(row) => {
                for character in self.characters.iter_mut() {
                    if character.cell.is_some_and(|cell| cell.row() == row) {
                        character.cell = None;
                    }
                }
                out_events.push(Event::RowReserved { row });
                self.notify_occupancy(out_events);
            }
            Err(reason) => out_events.push(Event::RowReservationRejected { row, reason }),
        }
    }

    fn spawn_character(&mut self, cell: CellCoord, color: Color, out_events: &mut Vec<Event>) {
        if !self.board.contains(cell) {
            warn!(
                column = cell.column(),
                row = cell.row(),
                "spawn ignored: cell outside the board"
            );
            out_events.push(Event::SpawnRejected {
                cell,
                reason: SpawnError::InvalidIndex,
            });
            return;
        }
        if !self.board.is_placeable(cell) {
            out_events.push(Event::SpawnRejected {
                cell,
                reason: SpawnError::CellUnavailable,
            });
            return;
        }

        let position = self.board.world_from_cell(cell);
        self.board.relocate_character(None, Some(cell));
        let character = self.characters.register(color, cell, position);
        self.spawn_colors.entry(cell).or_default().push(color);
        self.notify_occupancy(out_events);
        out_events.push(Event::CharacterSpawned {
            character,
            cell,
            color,
        });

        self.assign_slot(character, out_events);
    }

    fn select_character(&mut self, character: CharacterId, out_events: &mut Vec<Event>) {
        let Some(holds_slot) = self
            .characters
            .get(character)
            .map(|entry| entry.slot.is_some())
        else {
            warn!(character = character.get(), "selection ignored: unknown character");
            out_events.push(Event::SelectionRejected {
                character,
                reason: SelectionError::UnknownCharacter,
            });
            return;
        };

        if self.characters.selected() == Some(character) {
            if !holds_slot && !self.slots.has_free_slot() {
                self.characters.set_selected(None);
                out_events.push(Event::CharacterDeselected { character });
                reject_exhausted(character, out_events);
            } else if !holds_slot {
                self.assign_slot(character, out_events);
            }
            return;
        }

        if let Some(previous) = self.characters.selected() {
            self.deselect(previous, out_events);
        }

        if !holds_slot && !self.slots.has_free_slot() {
            reject_exhausted(character, out_events);
            return;
        }

        self.characters.set_selected(Some(character));
        out_events.push(Event::CharacterSelected { character });
        if holds_slot {
            self.reassign_slot(character, out_events);
        } else {
            self.assign_slot(character, out_events);
        }
    }

    fn deselect(&mut self, character: CharacterId, out_events: &mut Vec<Event>) {
        self.characters.set_selected(None);
        let moving = self
            .characters
            .get(character)
            .is_some_and(|entry| entry.state.is_moving());
        if moving {
            self.cancel_movement(character, out_events);
        }
        out_events.push(Event::CharacterDeselected { character });
    }

    /// Claims a holding slot for the character if it is the current selection.
    fn assign_slot(&mut self, character: CharacterId, out_events: &mut Vec<Event>) {
        if self.characters.selected() != Some(character) {
            return;
        }
        let Some(entry) = self.characters.get_mut(character) else {
            return;
        };
        let Some((slot, target)) = self.slots.assign(character) else {
            return;
        };

        entry.slot = Some(slot);
        entry.state = MovementState::Moving { target };
        out_events.push(Event::SlotAssigned {
            character,
            slot,
            target,
        });
    }

    /// Sends a placed character from its slot to the first other free slot.
    ///
    /// The current slot is released only once a new one is claimed; with no
    /// other slot free the character stays where it is.
    fn reassign_slot(&mut self, character: CharacterId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.characters.get_mut(character) else {
            return;
        };
        let (MovementState::Placed, Some(previous)) = (entry.state, entry.slot) else {
            return;
        };
        let Some((slot, target)) = self.slots.assign(character) else {
            debug!(character = character.get(), "no other slot free, staying put");
            return;
        };

        let _ = self.slots.release(previous);
        entry.slot = Some(slot);
        entry.state = MovementState::Moving { target };
        out_events.push(Event::SlotReleased {
            character,
            slot: previous,
        });
        out_events.push(Event::SlotAssigned {
            character,
            slot,
            target,
        });
    }

    /// Stops an in-flight walk and gives up the slot it was heading for.
    ///
    /// A character with a board cell goes back onto it. One without a cell
    /// (a placed character sent to a new slot) has nowhere stable to return
    /// to, so it snaps to the abandoned target and stays off-grid.
    fn cancel_movement(&mut self, character: CharacterId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.characters.get_mut(character) else {
            return;
        };
        let MovementState::Moving { target } = entry.state else {
            return;
        };

        entry.position = match entry.cell {
            Some(cell) => self.board.world_from_cell(cell),
            None => target,
        };
        entry.state = MovementState::Cancelled;
        let color = entry.color;
        let slot = entry.slot.take();

        if let Some(slot) = slot {
            let _ = self.slots.release(slot);
            out_events.push(Event::SlotReleased { character, slot });
        }
        debug!(character = character.get(), "movement cancelled");
        out_events.push(Event::MovementCompleted {
            character,
            color,
            outcome: MovementOutcome::Cancelled,
        });
    }

    fn move_character(&mut self, character: CharacterId, position: WorldPoint) {
        if let Some(entry) = self.characters.get_mut(character) {
            if entry.state.is_moving() {
                entry.position = position;
            }
        }
    }

    fn settle_character(&mut self, character: CharacterId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.characters.get(character) else {
            return;
        };
        let (MovementState::Moving { target }, Some(slot)) = (entry.state, entry.slot) else {
            return;
        };
        let old_cell = entry.cell;
        let color = entry.color;

        let new_cell = self
            .board
            .cell_from_world(target)
            .filter(|cell| Some(*cell) == old_cell || self.board.is_placeable(*cell));

        if old_cell.is_some() || new_cell.is_some() {
            self.board.relocate_character(old_cell, new_cell);
            self.notify_occupancy(out_events);
        }

        if let Some(entry) = self.characters.get_mut(character) {
            entry.position = target;
            entry.cell = new_cell;
            entry.state = MovementState::Placed;
        }

        out_events.push(Event::MovementCompleted {
            character,
            color,
            outcome: MovementOutcome::Placed {
                slot,
                cell: new_cell,
            },
        });
    }

    fn remove_character(&mut self, character: CharacterId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.characters.remove(character) else {
            debug!(character = character.get(), "removal ignored: unknown character");
            return;
        };

        if self.characters.selected() == Some(character) {
            self.characters.set_selected(None);
            out_events.push(Event::CharacterDeselected { character });
        }
        if entry.cell.is_some() {
            self.board.relocate_character(entry.cell, None);
            self.notify_occupancy(out_events);
        }
        if let Some(slot) = entry.slot {
            let _ = self.slots.release(slot);
            out_events.push(Event::SlotReleased { character, slot });
        }

        out_events.push(Event::CharacterRemoved {
            character,
            color: entry.color,
            cell: entry.cell,
            slot: entry.slot,
        });
    }

    fn configure_holding_slots(&mut self, positions: &[WorldPoint], out_events: &mut Vec<Event>) {
        let holders: Vec<CharacterId> = self
            .characters
            .iter()
            .filter(|character| character.slot.is_some())
            .map(|character| character.id)
            .collect();

        for character in holders {
            self.cancel_movement(character, out_events);
            if let Some(entry) = self.characters.get_mut(character) {
                entry.slot = None;
            }
        }

        self.slots = HoldingSlots::new(positions);
        out_events.push(Event::HoldingSlotsConfigured {
            count: u32::try_from(self.slots.len()).unwrap_or(u32::MAX),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn reject_exhausted(character: CharacterId, out_events: &mut Vec<Event>) {
    warn!(
        character = character.get(),
        "selection rejected: every holding slot is occupied"
    );
    out_events.push(Event::SelectionRejected {
        character,
        reason: SelectionError::AllocationExhausted,
    });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard {
            rows,
            columns,
            cell_width,
            cell_height,
            cell_palette,
        } => {
            world.board = BoardGrid::new(columns, rows, cell_width, cell_height, &cell_palette);
            world.characters.clear();
            world.spawn_colors.clear();
            world.slots.release_all();
            out_events.push(Event::BoardConfigured { rows, columns });

            let last_row = i32::try_from(rows).map_or(i32::MAX, |rows| rows - 1);
            world.reserve_row(last_row, out_events);
        }
        Command::ConfigureHoldingSlots { positions } => {
            world.configure_holding_slots(&positions, out_events);
        }
        Command::ReserveRow { row } => world.reserve_row(row, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnCharacter { cell, color } => world.spawn_character(cell, color, out_events),
        Command::SelectCharacter { character } => world.select_character(character, out_events),
        Command::MoveCharacter {
            character,
            position,
        } => world.move_character(character, position),
        Command::SettleCharacter { character } => world.settle_character(character, out_events),
        Command::RemoveCharacter { character } => world.remove_character(character, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeMap;

    use super::{BoardGrid, HoldingSlots, World};
    use trio_tiles_core::{
        CellCoord, CharacterId, CharacterSnapshot, CharacterView, Color, OccupancyView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the board grid.
    #[must_use]
    pub fn board(world: &World) -> &BoardGrid {
        &world.board
    }

    /// Exposes a read-only view of the dense occupancy matrix.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.board.view()
    }

    /// Reports whether a character stands on the cell.
    #[must_use]
    pub fn is_occupied(world: &World, cell: CellCoord) -> bool {
        world.board.is_occupied(cell)
    }

    /// Provides read-only access to the holding slots.
    #[must_use]
    pub fn holding_slots(world: &World) -> &HoldingSlots {
        &world.slots
    }

    /// Captures a read-only view of every registered character.
    #[must_use]
    pub fn character_view(world: &World) -> CharacterView {
        let selected = world.characters.selected();
        CharacterView::from_snapshots(
            world
                .characters
                .iter()
                .map(|character| character.snapshot(selected == Some(character.id)))
                .collect(),
        )
    }

    /// Captures the snapshot of a single character.
    #[must_use]
    pub fn character(world: &World, character: CharacterId) -> Option<CharacterSnapshot> {
        let selected = world.characters.selected();
        world
            .characters
            .get(character)
            .map(|entry| entry.snapshot(selected == Some(character)))
    }

    /// Identifier of the currently selected character.
    #[must_use]
    pub fn selected(world: &World) -> Option<CharacterId> {
        world.characters.selected()
    }

    /// Colors spawned on each cell since the board was configured.
    #[must_use]
    pub fn spawn_colors(world: &World) -> &BTreeMap<CellCoord, Vec<Color>> {
        &world.spawn_colors
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
