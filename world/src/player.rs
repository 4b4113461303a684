//! Player cell, glide animation and input gating.

use std::time::Duration;

use crystal_maze_core::CellCoord;
use glam::Vec2;

/// Logical cell plus the presented position gliding towards it.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    cell: CellCoord,
    position: Vec2,
    target: Option<Vec2>,
    can_move: bool,
}

impl Player {
    pub(crate) fn new(cell: CellCoord) -> Self {
        Self {
            cell,
            position: cell_center(cell),
            target: None,
            can_move: false,
        }
    }

    pub(crate) fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn is_gliding(&self) -> bool {
        self.target.is_some()
    }

    /// Input is taken only when control is enabled and no glide is running.
    pub(crate) fn accepts_input(&self) -> bool {
        self.can_move && !self.is_gliding()
    }

    pub(crate) fn set_can_move(&mut self, can_move: bool) {
        self.can_move = can_move;
    }

    /// Puts the player on `cell` immediately, dropping any glide.
    pub(crate) fn place(&mut self, cell: CellCoord) {
        self.cell = cell;
        self.position = cell_center(cell);
        self.target = None;
    }

    /// Moves the logical cell at once and starts gliding the presented position.
    pub(crate) fn begin_glide(&mut self, cell: CellCoord) {
        self.cell = cell;
        self.target = Some(cell_center(cell));
    }

    /// Advances the glide, returning `true` on the tick the player arrives.
    pub(crate) fn advance(&mut self, dt: Duration, tiles_per_sec: f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let step = tiles_per_sec * dt.as_secs_f32();
        let delta = target - self.position;
        if delta.length() <= step {
            self.position = target;
            self.target = None;
            return true;
        }

        self.position += delta.normalize_or_zero() * step;
        false
    }
}

fn cell_center(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32, cell.row() as f32)
}
