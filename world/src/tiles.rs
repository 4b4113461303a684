//! Arena of tile records indexed by cell coordinate.
//!
//! Presentation handles never live here; adapters keep their own arena keyed
//! by the same coordinates.

use crystal_maze_core::{CellCoord, CellState, MazeLayout};

#[derive(Clone, Copy, Debug)]
struct TileRecord {
    state: CellState,
    lit: bool,
}

/// Lit/dark state of every tile of the current maze.
#[derive(Clone, Debug)]
pub(crate) struct TileArena {
    width: u32,
    height: u32,
    records: Vec<TileRecord>,
}

impl TileArena {
    /// Builds the arena with every floor tile lit.
    pub(crate) fn from_layout(layout: &MazeLayout) -> Self {
        let grid = layout.grid();
        let mut records = Vec::new();
        for row in 0..grid.height() {
            for column in 0..grid.width() {
                let state = grid
                    .get(CellCoord::new(column, row))
                    .unwrap_or(CellState::Wall);
                records.push(TileRecord {
                    state,
                    lit: state == CellState::Floor,
                });
            }
        }
        Self {
            width: grid.width(),
            height: grid.height(),
            records,
        }
    }

    /// Lights a floor tile, returning whether it was dark before.
    pub(crate) fn light(&mut self, cell: CellCoord) -> bool {
        self.set_lit(cell, true)
    }

    /// Darkens a floor tile, returning whether it was lit before.
    pub(crate) fn darken(&mut self, cell: CellCoord) -> bool {
        self.set_lit(cell, false)
    }

    pub(crate) fn is_lit(&self, cell: CellCoord) -> bool {
        self.record(cell).map_or(false, |record| record.lit)
    }

    /// Lit tiles in row-major order.
    pub(crate) fn lit_cells(&self) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        for row in 0..self.height {
            for column in 0..self.width {
                let cell = CellCoord::new(column, row);
                if self.is_lit(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    fn set_lit(&mut self, cell: CellCoord, lit: bool) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        let Some(record) = self.records.get_mut(index) else {
            return false;
        };
        if record.state != CellState::Floor || record.lit == lit {
            return false;
        }
        record.lit = lit;
        true
    }

    fn record(&self, cell: CellCoord) -> Option<&TileRecord> {
        self.index(cell).and_then(|index| self.records.get(index))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_maze_core::Grid;

    fn corridor() -> MazeLayout {
        let mut grid = Grid::filled(5, 3, CellState::Wall);
        for column in 1..4 {
            grid.set(CellCoord::new(column, 1), CellState::Floor);
        }
        MazeLayout::new(grid, CellCoord::new(1, 1))
    }

    #[test]
    fn floor_starts_lit_and_walls_never_light() {
        let mut arena = TileArena::from_layout(&corridor());
        assert_eq!(arena.lit_cells().len(), 3);
        assert!(!arena.light(CellCoord::new(0, 0)));
        assert!(!arena.is_lit(CellCoord::new(0, 0)));
    }

    #[test]
    fn darken_and_light_report_changes_once() {
        let mut arena = TileArena::from_layout(&corridor());
        let cell = CellCoord::new(2, 1);
        assert!(arena.darken(cell));
        assert!(!arena.darken(cell));
        assert!(!arena.is_lit(cell));
        assert!(arena.light(cell));
        assert!(arena.is_lit(cell));
    }
}
