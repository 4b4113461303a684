//! Scripted input source that plays the game without a human.

use std::collections::{HashMap, HashSet, VecDeque};

use crystal_maze_core::{CellCoord, Direction, GamePhase, InputEdge, MenuOption};
use crystal_maze_world::{query, World};

/// Walks towards the nearest crystal, optionally blundering into walls first.
#[derive(Debug)]
pub(crate) struct Autopilot {
    blunders_left: u32,
    retries_left: u32,
}

impl Autopilot {
    pub(crate) fn new(blunders: u32, retries: u32) -> Self {
        Self {
            blunders_left: blunders,
            retries_left: retries,
        }
    }

    /// At most one input edge per frame, like a player pressing keys.
    pub(crate) fn next_input(&mut self, world: &World) -> Option<InputEdge> {
        match query::phase(world) {
            GamePhase::Playing => self.next_move(world),
            GamePhase::GameOver => Some(self.next_menu_input(query::menu_selection(world))),
            GamePhase::Init | GamePhase::Countdown | GamePhase::GameClear | GamePhase::Exited => {
                None
            }
        }
    }

    fn next_move(&mut self, world: &World) -> Option<InputEdge> {
        if !query::player_accepts_input(world) {
            return None;
        }

        if self.blunders_left > 0 {
            if let Some(direction) = blocked_direction(world) {
                self.blunders_left -= 1;
                return Some(direction.input_edge());
            }
        }

        first_step_to_nearest_goal(world).map(Direction::input_edge)
    }

    fn next_menu_input(&mut self, selection: MenuOption) -> InputEdge {
        let wanted = if self.retries_left > 0 {
            MenuOption::Retry
        } else {
            MenuOption::ReturnToTitle
        };
        if selection != wanted {
            return InputEdge::Down;
        }
        if wanted == MenuOption::Retry {
            self.retries_left -= 1;
        }
        InputEdge::Confirm
    }
}

fn blocked_direction(world: &World) -> Option<Direction> {
    let cell = query::player_cell(world);
    Direction::ALL.into_iter().find(|direction| {
        cell.step(*direction)
            .map_or(true, |next| !query::is_path(world, next))
    })
}

/// Breadth-first search over walkable cells.
fn first_step_to_nearest_goal(world: &World) -> Option<Direction> {
    let start = query::player_cell(world);
    let goals = query::goals(world);
    let mut first_steps: HashMap<CellCoord, Direction> = HashMap::new();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(cell) = queue.pop_front() {
        if cell != start && goals.contains(&cell) {
            return first_steps.get(&cell).copied();
        }
        for direction in Direction::ALL {
            let Some(next) = cell.step(direction) else {
                continue;
            };
            if !query::is_path(world, next) || !seen.insert(next) {
                continue;
            }
            let first = if cell == start {
                direction
            } else {
                match first_steps.get(&cell) {
                    Some(first) => *first,
                    None => continue,
                }
            };
            let _ = first_steps.insert(next, first);
            queue.push_back(next);
        }
    }
    None
}
