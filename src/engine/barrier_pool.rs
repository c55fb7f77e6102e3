//! Persistent worker pool synchronized by a reusable rendezvous barrier.
//!
//! The cell arena is statically partitioned into one contiguous slice per
//! worker; each worker thread lives for the engine's lifetime and only
//! ever touches its own slice. A step is three rendezvous: release the
//! workers into phase 1, fence between compute and commit, fence again
//! before `step` returns. A broken rendezvous (a panicking worker, or the
//! pool being dropped) moves the engine into a terminal failed state in
//! which `step` quietly does nothing — a long-running driver loop keeps
//! running, it just stops progressing.

use std::ops::Range;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::cell::Rule;
use crate::engine::Engine;
use crate::engine::sync::Rendezvous;
use crate::error::Error;
use crate::grid::{Grid, SharedCells};

/// Lifecycle of the pool. `Stepping` is only ever observable from inside
/// `step`; `PermanentlyFailed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PoolState {
    Ready,
    Stepping,
    PermanentlyFailed,
}

/// Fixed-width parallel engine: N persistent workers plus the caller,
/// meeting at a rendezvous barrier three times per step.
pub struct BarrierPool {
    grid: Grid,
    barrier: Arc<Rendezvous>,
    workers: Vec<JoinHandle<()>>,
    state: PoolState,
}

/// Contiguous, non-overlapping slices covering `[0, len)` exactly:
/// `floor(len / workers)` cells each, remainder folded into the last.
fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    let share = len / workers;
    (0..workers)
        .map(|i| {
            let start = i * share;
            if i == workers - 1 {
                start..len
            } else {
                start..start + share
            }
        })
        .collect()
}

/// Poisons the rendezvous when the worker exits for any reason, including
/// an unwind out of the rule. A worker leaving the protocol makes the pool
/// unusable either way.
struct PoisonOnExit {
    barrier: Arc<Rendezvous>,
}

impl Drop for PoisonOnExit {
    fn drop(&mut self) {
        self.barrier.poison();
    }
}

fn worker_loop(
    cells: SharedCells,
    range: Range<usize>,
    rule: Arc<dyn Rule>,
    barrier: Arc<Rendezvous>,
) {
    let _guard = PoisonOnExit {
        barrier: barrier.clone(),
    };
    loop {
        // Idle until the orchestrator releases a step.
        if barrier.wait().is_err() {
            return;
        }
        // Phase 1: reads neighbors' `alive` (possibly cross-slice, safe
        // because nothing writes `alive` now), writes own slice's `pending`.
        unsafe { cells.compute_range(&*rule, range.clone()) };
        if barrier.wait().is_err() {
            return;
        }
        // Phase 2: own slice only, `pending` into `alive`.
        unsafe { cells.commit_range(range.clone()) };
        if barrier.wait().is_err() {
            return;
        }
    }
}

impl BarrierPool {
    /// Spawn `workers` persistent threads over static slices of `grid`.
    ///
    /// `workers` is clamped to at least 1.
    pub fn new(mut grid: Grid, workers: usize) -> Self {
        let workers = workers.max(1);
        let barrier = Arc::new(Rendezvous::new(workers + 1));
        let shared = grid.shared();
        let rule = grid.rule().clone();

        let handles = partition(shared.len(), workers)
            .into_iter()
            .map(|range| {
                let rule = rule.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || worker_loop(shared, range, rule, barrier))
            })
            .collect();

        debug!(workers, cells = shared.len(), "barrier pool started");
        Self {
            grid,
            barrier,
            workers: handles,
            state: PoolState::Ready,
        }
    }

    /// Whether the pool has entered its terminal failed state.
    pub fn has_failed(&self) -> bool {
        self.state == PoolState::PermanentlyFailed
    }

    fn fail(&mut self) {
        warn!("barrier pool rendezvous broken; engine is permanently failed");
        // Unblock any worker still parked at a rendezvous.
        self.barrier.poison();
        self.state = PoolState::PermanentlyFailed;
    }
}

impl Engine for BarrierPool {
    fn initialize(&mut self, states: &[bool]) -> Result<(), Error> {
        // Workers are parked at the release rendezvous (or gone, if the
        // pool failed); the arena is ours between steps.
        self.grid.initialize(states)
    }

    /// Three rendezvous: release, compute/commit fence, completion.
    ///
    /// On a failed pool this is a no-op, not an error.
    fn step(&mut self) {
        if self.state == PoolState::PermanentlyFailed {
            return;
        }
        self.state = PoolState::Stepping;
        for _ in 0..3 {
            if self.barrier.wait().is_err() {
                self.fail();
                return;
            }
        }
        self.state = PoolState::Ready;
    }

    fn current_state(&self) -> Vec<bool> {
        self.grid.current_state()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }
}

impl Drop for BarrierPool {
    fn drop(&mut self) {
        self.barrier.poison();
        for handle in self.workers.drain(..) {
            // A worker that panicked already poisoned the barrier; its
            // payload is not ours to rethrow.
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ConwayRule;
    use crate::topology::Neighborhood;

    #[test]
    fn partition_covers_range_exactly_once() {
        for (len, workers) in [(25, 1), (25, 2), (25, 4), (100, 7), (3, 8), (1, 1)] {
            let ranges = partition(len, workers);
            assert_eq!(ranges.len(), workers);
            let mut seen = vec![0u32; len];
            for range in &ranges {
                for i in range.clone() {
                    seen[i] += 1;
                }
            }
            assert!(
                seen.iter().all(|&c| c == 1),
                "partition of {len} over {workers} workers is not an exact cover"
            );
            // Remainder folds into the last slice.
            assert_eq!(ranges.last().unwrap().end, len);
        }
    }

    #[test]
    fn worker_count_clamped_to_one() {
        let grid = Grid::new(4, 4, Neighborhood::Moore, Arc::new(ConwayRule)).unwrap();
        let mut pool = BarrierPool::new(grid, 0);
        pool.step();
        assert!(!pool.has_failed());
    }

    #[test]
    fn more_workers_than_cells_still_steps() {
        let grid = Grid::new(2, 2, Neighborhood::Moore, Arc::new(ConwayRule)).unwrap();
        let mut pool = BarrierPool::new(grid, 8);
        pool.initialize(&[true, true, true, true]).unwrap();
        pool.step();
        assert!(!pool.has_failed());
    }

    #[test]
    fn drop_joins_workers_cleanly() {
        let grid = Grid::new(8, 8, Neighborhood::Moore, Arc::new(ConwayRule)).unwrap();
        let mut pool = BarrierPool::new(grid, 4);
        pool.step();
        pool.step();
        drop(pool);
    }
}
