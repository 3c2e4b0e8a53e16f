#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Trio Tiles engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Trio Tiles.";

/// Number of placed characters sharing a color that triggers their removal.
pub const DEFAULT_MATCH_THRESHOLD: u32 = 3;

/// Default number of board rows; the last one is reserved.
pub const DEFAULT_ROWS: u32 = 9;

/// Default number of board columns.
pub const DEFAULT_COLUMNS: u32 = 6;

/// Default cell width along the world X axis.
pub const DEFAULT_CELL_WIDTH: f32 = 1.0;

/// Default cell depth along the world Z axis.
pub const DEFAULT_CELL_HEIGHT: f32 = 0.5;

/// Colors alternated across the board cells by default.
pub const DEFAULT_CELL_PALETTE: [Color; 2] = [Color::RED, Color::GREEN];

/// Holding-slot positions in allocation order.
pub const DEFAULT_HOLDING_SLOTS: [WorldPoint; 5] = [
    WorldPoint::new(1.0, 8.0),
    WorldPoint::new(2.0, 8.0),
    WorldPoint::new(3.0, 8.0),
    WorldPoint::new(4.0, 8.0),
    WorldPoint::new(5.0, 8.0),
];

/// Colors the initial characters are drawn from.
pub const DEFAULT_CHARACTER_PALETTE: [Color; 3] = [Color::BLUE, Color::YELLOW, Color::MAGENTA];

/// Number of characters spawned onto a fresh board.
pub const DEFAULT_SPAWN_COUNT: usize = 9;

/// Copies of each palette color placed in the spawn pool.
pub const DEFAULT_QUOTA_PER_COLOR: usize = 3;

/// Seed of the spawn pool shuffle.
pub const DEFAULT_SPAWN_SEED: u64 = 0x7472_696f_7469_6c65;

/// Walking speed in world units per second.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 5.0;

/// Per-axis distance under which a walking character counts as arrived.
pub const DEFAULT_ARRIVAL_TOLERANCE: f32 = 0.1;

/// Radius around a click within which a character is picked.
pub const DEFAULT_PICK_RADIUS: f32 = 0.5;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the board with the provided dimensions and cell palette.
    ///
    /// The last row is reserved automatically and every registered character
    /// is discarded.
    ConfigureBoard {
        /// Number of rows laid out along the world Z axis.
        rows: u32,
        /// Number of columns laid out along the world X axis.
        columns: u32,
        /// Width of a single cell measured in world units.
        cell_width: f32,
        /// Depth of a single cell measured in world units.
        cell_height: f32,
        /// Colors alternated across the board cells.
        cell_palette: Vec<Color>,
    },
    /// Replaces the ordered sequence of holding slots.
    ConfigureHoldingSlots {
        /// World positions of the slots in allocation order.
        positions: Vec<WorldPoint>,
    },
    /// Tags every cell of the provided row as reserved.
    ReserveRow {
        /// Zero-based row index; values outside the board are rejected.
        row: i32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Registers a new character on the provided cell.
    SpawnCharacter {
        /// Cell the character starts on.
        cell: CellCoord,
        /// Color tag assigned to the character.
        color: Color,
    },
    /// Selects a character, deselecting the previous selection.
    SelectCharacter {
        /// Identifier of the character the player picked.
        character: CharacterId,
    },
    /// Moves an in-flight character to an intermediate world position.
    MoveCharacter {
        /// Identifier of the moving character.
        character: CharacterId,
        /// Position reached during this tick.
        position: WorldPoint,
    },
    /// Finalizes the movement of a character that reached its target.
    SettleCharacter {
        /// Identifier of the arriving character.
        character: CharacterId,
    },
    /// Removes a character from the game, releasing its cell and slot.
    RemoveCharacter {
        /// Identifier of the character to remove.
        character: CharacterId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new board was created.
    BoardConfigured {
        /// Number of rows in the new board.
        rows: u32,
        /// Number of columns in the new board.
        columns: u32,
    },
    /// Confirms that the holding slot sequence was replaced.
    HoldingSlotsConfigured {
        /// Number of slots now available.
        count: u32,
    },
    /// Confirms that a row was tagged as reserved.
    RowReserved {
        /// Row that became reserved.
        row: u32,
    },
    /// Reports that a row reservation request was rejected.
    RowReservationRejected {
        /// Row index provided in the request.
        row: i32,
        /// Specific reason the reservation failed.
        reason: BoardError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a character was registered.
    CharacterSpawned {
        /// Identifier allocated to the character by the world.
        character: CharacterId,
        /// Cell the character occupies after spawning.
        cell: CellCoord,
        /// Color tag of the character.
        color: Color,
    },
    /// Reports that a spawn request was rejected.
    SpawnRejected {
        /// Cell provided in the spawn request.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Announces that a character became the current selection.
    CharacterSelected {
        /// Identifier of the selected character.
        character: CharacterId,
    },
    /// Announces that a character stopped being the current selection.
    CharacterDeselected {
        /// Identifier of the deselected character.
        character: CharacterId,
    },
    /// Reports that a selection request was rejected.
    SelectionRejected {
        /// Identifier provided in the selection request.
        character: CharacterId,
        /// Specific reason the selection failed.
        reason: SelectionError,
    },
    /// Confirms that a holding slot was assigned to a character.
    SlotAssigned {
        /// Character that now targets the slot.
        character: CharacterId,
        /// Slot assigned to the character.
        slot: SlotId,
        /// World position of the slot.
        target: WorldPoint,
    },
    /// Confirms that a holding slot became free again.
    SlotReleased {
        /// Character that previously held the slot.
        character: CharacterId,
        /// Slot that was released.
        slot: SlotId,
    },
    /// Diagnostic notification emitted after every occupancy mutation.
    OccupancyChanged {
        /// Number of cells holding a character after the mutation.
        occupied: u32,
    },
    /// Announces that a character stopped moving.
    ///
    /// Always emitted after the board occupancy reflects the outcome.
    MovementCompleted {
        /// Character whose movement ended.
        character: CharacterId,
        /// Color tag of the character.
        color: Color,
        /// How the movement ended.
        outcome: MovementOutcome,
    },
    /// Confirms that a character was removed from the game.
    CharacterRemoved {
        /// Identifier of the removed character.
        character: CharacterId,
        /// Color tag of the removed character.
        color: Color,
        /// Board cell freed by the removal, if the character was on the grid.
        cell: Option<CellCoord>,
        /// Holding slot freed by the removal, if any.
        slot: Option<SlotId>,
    },
}

/// Opaque RGB color used for both character tags and cell palettes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Pure blue.
    pub const BLUE: Self = Self::from_rgb(0x00, 0x00, 0xff);
    /// Warm yellow.
    pub const YELLOW: Self = Self::from_rgb(0xff, 0xeb, 0x04);
    /// Magenta.
    pub const MAGENTA: Self = Self::from_rgb(0xff, 0x00, 0xff);
    /// Pure red.
    pub const RED: Self = Self::from_rgb(0xff, 0x00, 0x00);
    /// Pure green.
    pub const GREEN: Self = Self::from_rgb(0x00, 0xff, 0x00);
    /// Pure white.
    pub const WHITE: Self = Self::from_rgb(0xff, 0xff, 0xff);

    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Unique identifier assigned to a character.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CharacterId(u32);

impl CharacterId {
    /// Creates a new character identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Position of a holding slot within the configured slot sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier from its sequence index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the sequence index of the slot.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single board cell expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Point on the play surface. The board lies in the X/Z plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Offset along the column axis.
    pub x: f32,
    /// Offset along the row axis.
    pub z: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

/// Occupancy tag stored for every board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupancy {
    /// Nothing stands on the cell.
    #[default]
    Empty,
    /// A character stands on the cell.
    Character,
    /// The cell is permanently excluded from placement.
    Reserved,
}

impl Occupancy {
    /// Numeric encoding used by matrix dumps (`0`, `1`, `2`).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Character => 1,
            Self::Reserved => 2,
        }
    }
}

/// Movement state of a single character.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MovementState {
    /// No target; the character rests where it spawned.
    #[default]
    Idle,
    /// Travelling toward the world position of a holding slot.
    Moving {
        /// Destination of the current movement.
        target: WorldPoint,
    },
    /// Arrived in its holding slot.
    Placed,
    /// Movement was interrupted by a new selection.
    Cancelled,
}

impl MovementState {
    /// Reports whether the state represents an in-flight movement.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        matches!(self, Self::Moving { .. })
    }
}

/// Terminal result of a movement reported through [`Event::MovementCompleted`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementOutcome {
    /// The character reached its slot.
    Placed {
        /// Slot the character now sits in.
        slot: SlotId,
        /// Board cell derived from the slot position, if it lies on the grid.
        cell: Option<CellCoord>,
    },
    /// The movement was cancelled before arrival.
    Cancelled,
}

/// Reasons a board mutation may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardError {
    /// The row or cell lies outside the configured board.
    InvalidIndex,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// The requested cell lies outside the configured board.
    InvalidIndex,
    /// The requested cell is reserved or already holds a character.
    CellUnavailable,
}

/// Reasons a selection request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionError {
    /// No character with the provided identifier exists.
    UnknownCharacter,
    /// Every holding slot is occupied.
    AllocationExhausted,
}

/// Immutable representation of a single character's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterSnapshot {
    /// Unique identifier assigned to the character.
    pub id: CharacterId,
    /// Color tag of the character.
    pub color: Color,
    /// Board cell the character occupies, or `None` while off-grid.
    pub cell: Option<CellCoord>,
    /// Current world position.
    pub position: WorldPoint,
    /// Movement state machine position.
    pub state: MovementState,
    /// Holding slot targeted or occupied by the character.
    pub slot: Option<SlotId>,
    /// Indicates whether the character is the current selection.
    pub selected: bool,
}

/// Read-only snapshot describing all registered characters.
#[derive(Clone, Debug, Default)]
pub struct CharacterView {
    snapshots: Vec<CharacterSnapshot>,
}

impl CharacterView {
    /// Creates a new character view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CharacterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single character.
    #[must_use]
    pub fn get(&self, character: CharacterId) -> Option<&CharacterSnapshot> {
        self.snapshots
            .binary_search_by_key(&character, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of characters captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CharacterSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense occupancy matrix.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Occupancy],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Occupancy], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the occupancy tag of the provided cell, if it lies on the board.
    #[must_use]
    pub fn occupancy(&self, cell: CellCoord) -> Option<Occupancy> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell exists and is empty.
    #[must_use]
    pub fn is_empty(&self, cell: CellCoord) -> bool {
        self.occupancy(cell) == Some(Occupancy::Empty)
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, Occupancy)> + 'a {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, occupancy)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *occupancy)
        })
    }

    /// Provides the dimensions of the underlying matrix as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
