#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomised depth-first backtracking maze generator.
//!
//! Carving happens on the odd-coordinate lattice of the grid: every step jumps
//! two cells along one axis and opens the wall cell in between. Because each
//! lattice cell is opened exactly once, the resulting floor forms a spanning
//! tree rooted at [`START_CELL`] with walls along the whole border.

use crystal_maze_core::{
    validate_dimensions, CellCoord, CellState, ConfigurationError, Direction, Grid, MazeLayout,
    START_CELL,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generates a maze from a seed.
///
/// Identical seeds and dimensions always produce identical layouts.
pub fn generate(width: u32, height: u32, seed: u64) -> Result<MazeLayout, ConfigurationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_with(width, height, &mut rng)
}

/// Generates a maze drawing randomness from `rng`.
///
/// Fails only when a dimension is even or smaller than five.
pub fn generate_with<R>(width: u32, height: u32, rng: &mut R) -> Result<MazeLayout, ConfigurationError>
where
    R: Rng + ?Sized,
{
    validate_dimensions(width, height)?;

    let mut grid = Grid::filled(width, height, CellState::Wall);
    grid.set(START_CELL, CellState::Floor);

    let mut stack = vec![START_CELL];
    let mut candidates: Vec<CellCoord> = Vec::with_capacity(Direction::ALL.len());

    while let Some(&current) = stack.last() {
        candidates.clear();
        candidates.extend(unvisited_neighbors(&grid, current));

        let Some(&chosen) = candidates.choose(rng) else {
            let _ = stack.pop();
            continue;
        };

        grid.set(midpoint(current, chosen), CellState::Floor);
        grid.set(chosen, CellState::Floor);
        stack.push(chosen);
    }

    Ok(MazeLayout::new(grid, START_CELL))
}

/// Floor cells with exactly one open orthogonal neighbour, excluding the start cell.
///
/// Scans the interior column by column, so the order is stable for a given layout.
#[must_use]
pub fn dead_ends(layout: &MazeLayout) -> Vec<CellCoord> {
    let grid = layout.grid();
    let mut dead_ends = Vec::new();

    for column in 1..grid.width().saturating_sub(1) {
        for row in 1..grid.height().saturating_sub(1) {
            let cell = CellCoord::new(column, row);
            if !grid.is_floor(cell) || cell == layout.start() {
                continue;
            }

            let walls = Direction::ALL
                .iter()
                .filter_map(|direction| cell.step(*direction))
                .filter(|neighbor| grid.is_wall(*neighbor))
                .count();
            if walls == 3 {
                dead_ends.push(cell);
            }
        }
    }

    dead_ends
}

/// Uniformly random walkable cell, or `None` for a layout without floor.
#[must_use]
pub fn random_open_cell<R>(layout: &MazeLayout, rng: &mut R) -> Option<CellCoord>
where
    R: Rng + ?Sized,
{
    layout.path_cells().choose(rng).copied()
}

fn unvisited_neighbors(grid: &Grid, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
    Direction::ALL
        .into_iter()
        .filter_map(move |direction| cell.offset(direction, 2))
        .filter(move |neighbor| is_carvable(grid, *neighbor) && grid.is_wall(*neighbor))
}

fn is_carvable(grid: &Grid, cell: CellCoord) -> bool {
    cell.column() > 0 && cell.column() < grid.width() && cell.row() > 0 && cell.row() < grid.height()
}

fn midpoint(from: CellCoord, to: CellCoord) -> CellCoord {
    CellCoord::new(
        (from.column() + to.column()) / 2,
        (from.row() + to.row()) / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_lies_between_lattice_cells() {
        assert_eq!(
            midpoint(CellCoord::new(1, 1), CellCoord::new(3, 1)),
            CellCoord::new(2, 1)
        );
        assert_eq!(
            midpoint(CellCoord::new(5, 7), CellCoord::new(5, 5)),
            CellCoord::new(5, 6)
        );
    }

    #[test]
    fn border_cells_are_not_carvable() {
        let grid = Grid::filled(5, 5, CellState::Wall);
        assert!(!is_carvable(&grid, CellCoord::new(0, 3)));
        assert!(!is_carvable(&grid, CellCoord::new(3, 0)));
        assert!(is_carvable(&grid, CellCoord::new(3, 3)));
    }

    #[test]
    fn smallest_maze_opens_every_lattice_cell() {
        let layout = generate(5, 5, 7).expect("5x5 is valid");
        for lattice in [(1, 1), (1, 3), (3, 1), (3, 3)] {
            assert!(layout
                .grid()
                .is_floor(CellCoord::new(lattice.0, lattice.1)));
        }
        assert_eq!(layout.path_cells().len(), 7);
    }
}
