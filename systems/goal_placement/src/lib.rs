#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Crystal placement that favours dead ends of the maze.

use crystal_maze_core::{CellCoord, ConfigurationError, GoalSet, MazeLayout, GOAL_COUNT};
use crystal_maze_system_maze_generation::random_open_cell;
use rand::Rng;

/// Picks exactly [`GOAL_COUNT`] distinct crystal cells.
///
/// Dead ends are drawn uniformly without replacement first. Once they run out,
/// cells are drawn with [`random_open_cell`], rejecting cells that already hold
/// a crystal. `requested` is accepted for call-site compatibility but the count
/// is always [`GOAL_COUNT`].
///
/// Fails when the layout has fewer than [`GOAL_COUNT`] walkable cells, since no
/// amount of resampling could succeed.
pub fn place_goals<R>(
    layout: &MazeLayout,
    dead_ends: &[CellCoord],
    requested: usize,
    rng: &mut R,
) -> Result<GoalSet, ConfigurationError>
where
    R: Rng + ?Sized,
{
    if requested != GOAL_COUNT {
        tracing::debug!(requested, placed = GOAL_COUNT, "crystal count is fixed");
    }

    let available = layout.path_cells().len();
    if available < GOAL_COUNT {
        return Err(ConfigurationError::InsufficientPathCells { available });
    }

    let mut remaining_dead_ends = dead_ends.to_vec();
    let mut goals: Vec<CellCoord> = Vec::with_capacity(GOAL_COUNT);

    while goals.len() < GOAL_COUNT {
        let candidate = if remaining_dead_ends.is_empty() {
            match random_open_cell(layout, rng) {
                Some(cell) => cell,
                None => break,
            }
        } else {
            let index = rng.gen_range(0..remaining_dead_ends.len());
            remaining_dead_ends.swap_remove(index)
        };

        if !goals.contains(&candidate) {
            goals.push(candidate);
        }
    }

    Ok(GoalSet::new(goals))
}
