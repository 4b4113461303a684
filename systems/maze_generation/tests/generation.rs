use std::collections::{HashSet, VecDeque};

use crystal_maze_core::{CellCoord, ConfigurationError, Direction, MazeLayout, START_CELL};
use crystal_maze_system_maze_generation::{dead_ends, generate, random_open_cell};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DIMENSIONS: [(u32, u32); 5] = [(5, 5), (7, 5), (9, 13), (21, 21), (31, 17)];
const SEEDS: [u64; 4] = [0, 1, 0x5eed_c0de, u64::MAX];

fn floor_neighbors(layout: &MazeLayout, cell: CellCoord) -> Vec<CellCoord> {
    Direction::ALL
        .iter()
        .filter_map(|direction| cell.step(*direction))
        .filter(|neighbor| layout.grid().is_floor(*neighbor))
        .collect()
}

fn reachable_from_start(layout: &MazeLayout) -> HashSet<CellCoord> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([layout.start()]);
    let _ = visited.insert(layout.start());
    while let Some(cell) = queue.pop_front() {
        for neighbor in floor_neighbors(layout, cell) {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    visited
}

fn floor_edge_count(layout: &MazeLayout) -> usize {
    let total: usize = layout
        .path_cells()
        .iter()
        .map(|cell| floor_neighbors(layout, *cell).len())
        .sum();
    total / 2
}

#[test]
fn every_floor_cell_is_reachable_from_start() {
    for (width, height) in DIMENSIONS {
        for seed in SEEDS {
            let layout = generate(width, height, seed).expect("valid dimensions");
            let reachable = reachable_from_start(&layout);
            assert_eq!(
                reachable.len(),
                layout.path_cells().len(),
                "{width}x{height} seed {seed} left unreachable floor"
            );
        }
    }
}

#[test]
fn floor_forms_a_spanning_tree() {
    for (width, height) in DIMENSIONS {
        for seed in SEEDS {
            let layout = generate(width, height, seed).expect("valid dimensions");
            assert_eq!(
                floor_edge_count(&layout),
                layout.path_cells().len() - 1,
                "{width}x{height} seed {seed} contains a cycle"
            );
        }
    }
}

#[test]
fn border_is_solid_and_start_is_open() {
    for (width, height) in DIMENSIONS {
        let layout = generate(width, height, 99).expect("valid dimensions");
        let grid = layout.grid();
        for column in 0..width {
            assert!(grid.is_wall(CellCoord::new(column, 0)));
            assert!(grid.is_wall(CellCoord::new(column, height - 1)));
        }
        for row in 0..height {
            assert!(grid.is_wall(CellCoord::new(0, row)));
            assert!(grid.is_wall(CellCoord::new(width - 1, row)));
        }
        assert_eq!(layout.start(), START_CELL);
        assert!(grid.is_floor(START_CELL));
    }
}

#[test]
fn every_odd_lattice_cell_is_carved() {
    let layout = generate(21, 21, 3).expect("valid dimensions");
    for column in (1..21).step_by(2) {
        for row in (1..21).step_by(2) {
            assert!(layout.grid().is_floor(CellCoord::new(column, row)));
        }
    }
    assert_eq!(layout.path_cells().len(), 10 * 10 * 2 - 1);
}

#[test]
fn same_seed_reproduces_layout() {
    let first = generate(21, 21, 42).expect("valid dimensions");
    let second = generate(21, 21, 42).expect("valid dimensions");
    assert_eq!(first, second);
}

#[test]
fn path_cells_match_floor_scan() {
    let layout = generate(11, 9, 5).expect("valid dimensions");
    let floor: HashSet<CellCoord> = layout.path_cells().iter().copied().collect();
    assert_eq!(floor.len(), layout.path_cells().len());
    for cell in layout.path_cells() {
        assert!(layout.grid().is_floor(*cell));
    }
}

#[test]
fn dead_ends_have_exactly_one_open_neighbor() {
    for seed in SEEDS {
        let layout = generate(21, 21, seed).expect("valid dimensions");
        let ends = dead_ends(&layout);
        assert!(!ends.is_empty(), "a 21x21 tree always has leaves");
        for cell in ends {
            assert_ne!(cell, layout.start());
            assert_eq!(floor_neighbors(&layout, cell).len(), 1);
        }
    }
}

#[test]
fn random_open_cell_is_walkable() {
    let layout = generate(9, 9, 8).expect("valid dimensions");
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..64 {
        let cell = random_open_cell(&layout, &mut rng).expect("layout has floor");
        assert!(layout.grid().is_floor(cell));
    }
}

#[test]
fn invalid_dimensions_are_configuration_errors() {
    assert_eq!(
        generate(20, 21, 1),
        Err(ConfigurationError::EvenDimension { value: 20 })
    );
    assert!(matches!(
        generate(3, 3, 1),
        Err(ConfigurationError::DimensionTooSmall { value: 3, .. })
    ));
}
