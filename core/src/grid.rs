//! Dense maze grid, derived layout and the crystal set of a stage.

use crate::CellCoord;

/// State of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Solid wall.
    Wall,
    /// Walkable floor.
    Floor,
}

/// Row-major grid of cell states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<CellState>,
}

impl Grid {
    /// Creates a grid with every cell set to `state`.
    #[must_use]
    pub fn filled(width: u32, height: u32, state: CellState) -> Self {
        let capacity_u64 = u64::from(width) * u64::from(height);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![state; capacity],
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// State of the cell, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Overwrites the state of an in-bounds cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: CellCoord, state: CellState) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = state;
        }
    }

    /// Reports whether the cell is walkable floor.
    #[must_use]
    pub fn is_floor(&self, cell: CellCoord) -> bool {
        self.get(cell) == Some(CellState::Floor)
    }

    /// Reports whether the cell blocks movement. Cells outside the grid are walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        !self.is_floor(cell)
    }

    /// Every floor cell, scanned column by column from the top-left corner.
    #[must_use]
    pub fn floor_cells(&self) -> Vec<CellCoord> {
        let mut floor = Vec::new();
        for column in 0..self.width {
            for row in 0..self.height {
                let cell = CellCoord::new(column, row);
                if self.is_floor(cell) {
                    floor.push(cell);
                }
            }
        }
        floor
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Generated maze together with its walkable cells and start cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeLayout {
    grid: Grid,
    path_cells: Vec<CellCoord>,
    start: CellCoord,
}

impl MazeLayout {
    /// Wraps a carved grid, deriving the walkable cell list by scanning it.
    #[must_use]
    pub fn new(grid: Grid, start: CellCoord) -> Self {
        let path_cells = grid.floor_cells();
        Self {
            grid,
            path_cells,
            start,
        }
    }

    /// Underlying cell grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Walkable cells in scan order.
    #[must_use]
    pub fn path_cells(&self) -> &[CellCoord] {
        &self.path_cells
    }

    /// Cell the player starts from.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }
}

/// Crystals still waiting to be collected in the current stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GoalSet {
    cells: Vec<CellCoord>,
}

impl GoalSet {
    /// Creates a goal set from distinct cells. Duplicates are dropped.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        let mut unique: Vec<CellCoord> = Vec::with_capacity(cells.len());
        for cell in cells {
            if !unique.contains(&cell) {
                unique.push(cell);
            }
        }
        Self { cells: unique }
    }

    /// Reports whether a crystal sits on the cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Removes the crystal on `cell`, returning whether one was present.
    pub fn remove(&mut self, cell: CellCoord) -> bool {
        match self.cells.iter().position(|goal| *goal == cell) {
            Some(position) => {
                let _ = self.cells.remove(position);
                true
            }
            None => false,
        }
    }

    /// Number of crystals left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether every crystal was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Remaining crystal cells in placement order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }
}
