//! Board grid that owns the occupancy matrix and the cell palette.

use std::collections::HashSet;

use tracing::{debug, enabled, warn, Level};
use trio_tiles_core::{BoardError, CellCoord, Color, Occupancy, OccupancyView, WorldPoint};

/// Tint applied to reserved cells when they are displayed.
const RESERVED_CELL_COLOR: Color = Color::WHITE;

/// Dense occupancy matrix for the play surface.
///
/// Rows run along the world Z axis and columns along the world X axis. Every
/// cell carries exactly one [`Occupancy`] tag. Cells tagged
/// [`Occupancy::Character`] are mirrored in an occupied-position index so
/// `is_occupied` never scans the matrix; every mutation goes through
/// [`BoardGrid::set_occupancy`], which keeps both structures in lockstep.
#[derive(Clone, Debug)]
pub struct BoardGrid {
    columns: u32,
    rows: u32,
    cell_width: f32,
    cell_height: f32,
    occupancy: Vec<Occupancy>,
    colors: Vec<Color>,
    occupied: HashSet<CellCoord>,
}

impl BoardGrid {
    /// Creates an empty board and paints its cells from the provided palette.
    #[must_use]
    pub fn new(
        columns: u32,
        rows: u32,
        cell_width: f32,
        cell_height: f32,
        palette: &[Color],
    ) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cell_width,
            cell_height,
            occupancy: vec![Occupancy::Empty; capacity],
            colors: paint_cells(columns, rows, palette),
            occupied: HashSet::new(),
        }
    }

    /// Provides the dimensions of the board as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Width of a single cell measured in world units.
    #[must_use]
    pub const fn cell_width(&self) -> f32 {
        self.cell_width
    }

    /// Depth of a single cell measured in world units.
    #[must_use]
    pub const fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Returns the occupancy tag of the cell, if it lies on the board.
    #[must_use]
    pub fn occupancy(&self, cell: CellCoord) -> Option<Occupancy> {
        self.index(cell)
            .and_then(|index| self.occupancy.get(index).copied())
    }

    /// Reports whether a character currently stands on the cell.
    ///
    /// Reserved cells are not considered occupied.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupied.contains(&cell)
    }

    /// Reports whether a character may be put on the cell.
    #[must_use]
    pub fn is_placeable(&self, cell: CellCoord) -> bool {
        self.occupancy(cell) == Some(Occupancy::Empty)
    }

    /// Overwrites the occupancy tag of a single cell.
    pub fn set_occupancy(&mut self, cell: CellCoord, state: Occupancy) -> Result<(), BoardError> {
        let Some(index) = self.index(cell) else {
            warn!(
                column = cell.column(),
                row = cell.row(),
                "occupancy update ignored: cell outside the board"
            );
            return Err(BoardError::InvalidIndex);
        };

        let previous = std::mem::replace(&mut self.occupancy[index], state);
        match (previous, state) {
            (Occupancy::Character, Occupancy::Character) => {}
            (Occupancy::Character, _) => {
                let removed = self.occupied.remove(&cell);
                debug_assert!(removed, "occupied index lost track of {cell:?}");
            }
            (_, Occupancy::Character) => {
                let inserted = self.occupied.insert(cell);
                debug_assert!(inserted, "occupied index already tracked {cell:?}");
            }
            _ => {}
        }
        Ok(())
    }

    /// Tags every cell of the row as reserved and returns the validated row.
    ///
    /// Rows outside `0..rows` are rejected without touching the board.
    pub fn mark_row_reserved(&mut self, row: i32) -> Result<u32, BoardError> {
        let Some(row) = u32::try_from(row).ok().filter(|row| *row < self.rows) else {
            warn!(row, rows = self.rows, "invalid row index");
            return Err(BoardError::InvalidIndex);
        };

        for column in 0..self.columns {
            self.set_occupancy(CellCoord::new(column, row), Occupancy::Reserved)?;
        }
        Ok(row)
    }

    /// Palette color assigned to the cell when the board was created.
    ///
    /// Each color differs from the cell to the left and the cell below. When
    /// the palette cannot satisfy both neighbours the first palette color is
    /// used, even if it repeats a neighbour.
    #[must_use]
    pub fn cell_color(&self, cell: CellCoord) -> Option<Color> {
        self.index(cell)
            .and_then(|index| self.colors.get(index).copied())
    }

    /// Color a presentation layer should tint the cell with.
    #[must_use]
    pub fn display_color(&self, cell: CellCoord) -> Option<Color> {
        match self.occupancy(cell)? {
            Occupancy::Reserved => Some(RESERVED_CELL_COLOR),
            Occupancy::Empty | Occupancy::Character => self.cell_color(cell),
        }
    }

    /// Counts the characters standing in the row, or `None` for an invalid row.
    #[must_use]
    pub fn characters_in_row(&self, row: u32) -> Option<usize> {
        if row >= self.rows {
            warn!(row, rows = self.rows, "invalid row index");
            return None;
        }

        Some(
            (0..self.columns)
                .filter(|column| self.is_occupied(CellCoord::new(*column, row)))
                .count(),
        )
    }

    /// Converts a world position into the board cell beneath it.
    ///
    /// Returns `None` when the position falls outside the board.
    #[must_use]
    pub fn cell_from_world(&self, point: WorldPoint) -> Option<CellCoord> {
        let row = (point.z / self.cell_height).round_ties_even();
        let column = (point.x / self.cell_width).round_ties_even();
        if !row.is_finite() || !column.is_finite() || row < 0.0 || column < 0.0 {
            return None;
        }

        let cell = CellCoord::new(column as u32, row as u32);
        self.contains(cell).then_some(cell)
    }

    /// World position of the centre of a cell.
    #[must_use]
    pub fn world_from_cell(&self, cell: CellCoord) -> WorldPoint {
        WorldPoint::new(
            cell.column() as f32 * self.cell_width,
            cell.row() as f32 * self.cell_height,
        )
    }

    /// Number of cells currently holding a character.
    #[must_use]
    pub fn occupied_count(&self) -> u32 {
        u32::try_from(self.occupied.len()).unwrap_or(u32::MAX)
    }

    /// Cells currently holding a character, in row-major order.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<CellCoord> {
        let mut cells: Vec<CellCoord> = self.occupied.iter().copied().collect();
        cells.sort_by_key(|cell| (cell.row(), cell.column()));
        cells
    }

    /// Captures a read-only view of the occupancy matrix.
    #[must_use]
    pub fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.occupancy, self.columns, self.rows)
    }

    /// Renders the matrix as rows of `0`/`1`/`2` codes, first row first.
    #[must_use]
    pub fn render_matrix(&self) -> String {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.occupancy
            .chunks(width)
            .map(|row| {
                row.iter()
                    .map(|occupancy| occupancy.code().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Moves a character's footprint between two cells.
    ///
    /// Either end may be `None` for off-grid positions. The source is only
    /// cleared when it actually holds a character.
    pub(crate) fn relocate_character(&mut self, from: Option<CellCoord>, to: Option<CellCoord>) {
        if let Some(from) = from {
            if self.occupancy(from) == Some(Occupancy::Character) {
                let _ = self.set_occupancy(from, Occupancy::Empty);
            }
        }
        if let Some(to) = to {
            let _ = self.set_occupancy(to, Occupancy::Character);
        }
    }

    pub(crate) fn log_matrix(&self) {
        if enabled!(Level::DEBUG) {
            debug!(
                occupied = self.occupied.len(),
                "occupancy matrix changed\n{}",
                self.render_matrix()
            );
        }
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

fn paint_cells(columns: u32, rows: u32, palette: &[Color]) -> Vec<Color> {
    let Some(&fallback) = palette.first() else {
        return Vec::new();
    };

    let width = usize::try_from(columns).unwrap_or(0);
    let height = usize::try_from(rows).unwrap_or(0);
    let mut colors: Vec<Color> = Vec::with_capacity(width * height);

    for row in 0..height {
        for column in 0..width {
            let left = (column > 0).then(|| colors[row * width + column - 1]);
            let below = (row > 0).then(|| colors[(row - 1) * width + column]);
            let color = palette
                .iter()
                .copied()
                .find(|color| Some(*color) != left && Some(*color) != below)
                .unwrap_or(fallback);
            colors.push(color);
        }
    }

    colors
}
