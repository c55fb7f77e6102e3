//! Cell arena and the shared view used by the parallel engines.

use std::ops::Range;
use std::sync::Arc;

use crate::cell::{Cell, MAX_NEIGHBORS, Rule};
use crate::error::Error;
use crate::topology::{self, Neighborhood};

/// Row-major arena of cells on a toroidal grid, plus the plugged rule.
///
/// The arena is a boxed slice: its address is stable for the grid's
/// lifetime, which the persistent-worker engine relies on.
pub struct Grid {
    width: usize,
    height: usize,
    cells: Box<[Cell]>,
    rule: Arc<dyn Rule>,
}

impl Grid {
    /// Build a grid with all cells dead and neighbors wired once.
    ///
    /// Fails with [`Error::InvalidDimensions`] unless both dimensions are
    /// positive.
    pub fn new(
        width: usize,
        height: usize,
        kind: Neighborhood,
        rule: Arc<dyn Rule>,
    ) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let cells = topology::wire(width, height, kind)
            .into_iter()
            .map(Cell::new)
            .collect();
        Ok(Self {
            width,
            height,
            cells,
            rule,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Assign every cell's `alive` flag in index order.
    ///
    /// Fails with [`Error::StateLengthMismatch`] if `states` does not cover
    /// the grid exactly; on failure nothing is written.
    pub fn initialize(&mut self, states: &[bool]) -> Result<(), Error> {
        if states.len() != self.cells.len() {
            return Err(Error::StateLengthMismatch {
                expected: self.cells.len(),
                actual: states.len(),
            });
        }
        for (cell, &alive) in self.cells.iter_mut().zip(states) {
            cell.alive = alive;
        }
        Ok(())
    }

    /// Row-major snapshot of every cell's `alive` flag.
    pub fn current_state(&self) -> Vec<bool> {
        self.cells.iter().map(|c| c.alive).collect()
    }

    pub(crate) fn rule(&self) -> &Arc<dyn Rule> {
        &self.rule
    }

    /// Phase 1 for a single cell: gather neighbor states, apply the rule.
    ///
    /// Returns the next state instead of writing it so the sequential
    /// engine can stay in safe code.
    #[inline]
    pub(crate) fn compute_cell(&self, index: usize) -> bool {
        let cell = &self.cells[index];
        let mut states = [false; MAX_NEIGHBORS];
        let count = cell.neighbors.len();
        for (slot, &n) in states.iter_mut().zip(cell.neighbors.iter()) {
            *slot = self.cells[n as usize].alive;
        }
        self.rule.next_state(cell.alive, &states[..count])
    }

    #[inline]
    pub(crate) fn set_pending(&mut self, index: usize, pending: bool) {
        self.cells[index].pending = pending;
    }

    #[inline]
    pub(crate) fn commit_all(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.alive = cell.pending;
        }
    }

    /// Raw shared view over the arena for disjoint-range parallel updates.
    pub(crate) fn shared(&mut self) -> SharedCells {
        SharedCells {
            ptr: self.cells.as_mut_ptr(),
            len: self.cells.len(),
        }
    }
}

/// `Send + Sync` raw-pointer view over the cell arena.
///
/// The partitioning discipline of the parallel engines is the only
/// exclusion mechanism: every thread works a range disjoint from all
/// others, phase 1 writes only `pending` inside its own range (neighbor
/// `alive` reads may cross ranges, nothing writes `alive` during phase 1),
/// and phase 2 writes only `alive` inside its own range with no cross-range
/// reads at all. The two phases never overlap in time; the engines separate
/// them with a rendezvous barrier or a fork/join.
pub(crate) struct SharedCells {
    ptr: *mut Cell,
    len: usize,
}

unsafe impl Send for SharedCells {}
unsafe impl Sync for SharedCells {}

impl Copy for SharedCells {}
impl Clone for SharedCells {
    fn clone(&self) -> Self {
        *self
    }
}

impl SharedCells {
    pub fn len(&self) -> usize {
        self.len
    }

    /// Run phase 1 over `range`.
    ///
    /// # Safety
    /// `range` must lie within the arena and be disjoint from every range
    /// concurrently passed to `compute_range` on the same arena, and no
    /// thread may write any cell's `alive` for the duration of the call.
    pub unsafe fn compute_range(&self, rule: &dyn Rule, range: Range<usize>) {
        debug_assert!(range.end <= self.len);
        let mut states = [false; MAX_NEIGHBORS];
        for i in range {
            unsafe {
                let cell = self.ptr.add(i);
                let count = (&(*cell).neighbors).len();
                for k in 0..count {
                    let n = (*cell).neighbors[k] as usize;
                    states[k] = (*self.ptr.add(n)).alive;
                }
                let next = rule.next_state((*cell).alive, &states[..count]);
                (*cell).pending = next;
            }
        }
    }

    /// Run phase 2 over `range`.
    ///
    /// # Safety
    /// `range` must lie within the arena and be disjoint from every range
    /// concurrently passed to `commit_range` on the same arena, and no
    /// thread may read or write any cell in `range` for the duration of
    /// the call.
    pub unsafe fn commit_range(&self, range: Range<usize>) {
        debug_assert!(range.end <= self.len);
        for i in range {
            unsafe {
                let cell = self.ptr.add(i);
                (*cell).alive = (*cell).pending;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ConwayRule;

    fn grid_5x5() -> Grid {
        Grid::new(5, 5, Neighborhood::Moore, Arc::new(ConwayRule)).unwrap()
    }

    #[test]
    fn rejects_zero_dimensions() {
        for (w, h) in [(0, 5), (5, 0), (0, 0)] {
            assert!(matches!(
                Grid::new(w, h, Neighborhood::Moore, Arc::new(ConwayRule)),
                Err(Error::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn initialize_rejects_length_mismatch() {
        let mut grid = grid_5x5();
        let err = grid.initialize(&vec![false; 24]).unwrap_err();
        assert!(matches!(
            err,
            Error::StateLengthMismatch {
                expected: 25,
                actual: 24
            }
        ));
        // Nothing was applied.
        assert!(grid.current_state().iter().all(|&s| !s));
    }

    #[test]
    fn initialize_then_snapshot_round_trips() {
        let mut grid = grid_5x5();
        let mut states = vec![false; 25];
        states[7] = true;
        states[24] = true;
        grid.initialize(&states).unwrap();
        assert_eq!(grid.current_state(), states);
    }

    #[test]
    fn shared_view_matches_sequential_compute() {
        let mut grid = grid_5x5();
        let mut states = vec![false; 25];
        // Blinker on the middle row.
        for i in [11, 12, 13] {
            states[i] = true;
        }
        grid.initialize(&states).unwrap();

        let expected: Vec<bool> = (0..25).map(|i| grid.compute_cell(i)).collect();

        let rule = grid.rule().clone();
        let shared = grid.shared();
        unsafe {
            shared.compute_range(&*rule, 0..25);
            shared.commit_range(0..25);
        }
        assert_eq!(grid.current_state(), expected);
    }
}
