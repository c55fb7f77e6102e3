//! Single-threaded reference engine.

use crate::engine::Engine;
use crate::error::Error;
use crate::grid::Grid;

/// Baseline updater: phase 1 over all cells in index order, then phase 2
/// in index order. Defines the semantics the parallel engines must
/// reproduce exactly.
pub struct Sequential {
    grid: Grid,
}

impl Sequential {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }
}

impl Engine for Sequential {
    fn initialize(&mut self, states: &[bool]) -> Result<(), Error> {
        self.grid.initialize(states)
    }

    fn step(&mut self) {
        for i in 0..self.grid.len() {
            let next = self.grid.compute_cell(i);
            self.grid.set_pending(i, next);
        }
        self.grid.commit_all();
    }

    fn current_state(&self) -> Vec<bool> {
        self.grid.current_state()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }
}
