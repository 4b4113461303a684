//! Constant-time walkability checks for the current stage.

use std::collections::HashSet;

use crystal_maze_core::CellCoord;

/// Set of walkable cells built once per stage and never edited afterwards.
#[derive(Clone, Debug, Default)]
pub(crate) struct PathMembership {
    cells: HashSet<CellCoord>,
}

impl PathMembership {
    pub(crate) fn from_path(path_cells: &[CellCoord]) -> Self {
        Self {
            cells: path_cells.iter().copied().collect(),
        }
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_matches_path_cells() {
        let path = [CellCoord::new(1, 1), CellCoord::new(2, 1)];
        let membership = PathMembership::from_path(&path);
        assert!(membership.contains(CellCoord::new(2, 1)));
        assert!(!membership.contains(CellCoord::new(1, 2)));
    }
}
