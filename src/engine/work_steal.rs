//! Recursive fork/join engine on a work-stealing rayon pool.
//!
//! No persistent worker-to-partition binding: each phase recursively
//! halves the cell range and forks both halves onto the pool until a
//! range fits under the grain, then runs it inline. The top-level join of
//! phase 1 is the fence before phase 2 — no explicit barrier needed, task
//! completion is synchronous from the caller's side. A panic in any leaf
//! propagates out of `step` through the join chain.

use std::ops::Range;

use tracing::debug;

use crate::engine::{Engine, auto_thread_count};
use crate::error::Error;
use crate::grid::Grid;

/// Compute splits finer than commit: a compute leaf does neighbor gathers
/// and a rule call per cell, so smaller tasks still amortize fork
/// overhead, while a commit leaf is a single field copy per cell.
const DEFAULT_COMPUTE_GRAIN: usize = 50;
const DEFAULT_COMMIT_GRAIN: usize = 100;

/// Configuration for a [`WorkSteal`] engine.
///
/// Use `WorkStealConfig::default()` for auto-tuned defaults, or customise
/// individual knobs via the builder methods.
#[derive(Clone, Debug)]
pub struct WorkStealConfig {
    /// Number of threads for the shared pool.
    /// `None` means auto-detect (physical cores).
    pub thread_count: Option<usize>,
    /// Largest phase-1 sub-range run inline instead of forked.
    pub compute_grain: usize,
    /// Largest phase-2 sub-range run inline instead of forked.
    pub commit_grain: usize,
}

impl Default for WorkStealConfig {
    fn default() -> Self {
        Self {
            thread_count: None,
            compute_grain: DEFAULT_COMPUTE_GRAIN,
            commit_grain: DEFAULT_COMMIT_GRAIN,
        }
    }
}

impl WorkStealConfig {
    /// Set an explicit thread count for the pool.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    /// Set the phase-1 split threshold.
    pub fn compute_grain(mut self, n: usize) -> Self {
        self.compute_grain = n.max(1);
        self
    }

    /// Set the phase-2 split threshold.
    pub fn commit_grain(mut self, n: usize) -> Self {
        self.commit_grain = n.max(1);
        self
    }
}

/// Elastic parallel engine: per-step fork/join decomposition, parallelism
/// bounded by the pool size rather than a fixed partition.
pub struct WorkSteal {
    grid: Grid,
    pool: rayon::ThreadPool,
    compute_grain: usize,
    commit_grain: usize,
}

/// Recursively halve `range`, invoking `leaf` on every sub-range at or
/// under `grain`. The halves never overlap and cover `range` exactly.
fn for_each_leaf<F>(range: Range<usize>, grain: usize, leaf: &F)
where
    F: Fn(Range<usize>) + Sync,
{
    if range.len() <= grain {
        leaf(range);
        return;
    }
    let mid = range.start + range.len() / 2;
    rayon::join(
        || for_each_leaf(range.start..mid, grain, leaf),
        || for_each_leaf(mid..range.end, grain, leaf),
    );
}

impl WorkSteal {
    pub fn new(grid: Grid) -> Self {
        Self::with_config(grid, WorkStealConfig::default())
    }

    /// Create a work-stealing engine with explicit configuration.
    pub fn with_config(grid: Grid, config: WorkStealConfig) -> Self {
        let threads = config.thread_count.unwrap_or_else(auto_thread_count).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("failed to build work-steal rayon thread pool");
        debug!(
            threads,
            compute_grain = config.compute_grain,
            commit_grain = config.commit_grain,
            "work-steal engine started"
        );
        Self {
            grid,
            pool,
            compute_grain: config.compute_grain.max(1),
            commit_grain: config.commit_grain.max(1),
        }
    }
}

impl Engine for WorkSteal {
    fn initialize(&mut self, states: &[bool]) -> Result<(), Error> {
        self.grid.initialize(states)
    }

    fn step(&mut self) {
        let rule = self.grid.rule().clone();
        let cells = self.grid.shared();
        let len = cells.len();
        let compute_grain = self.compute_grain;
        let commit_grain = self.commit_grain;

        // Leaf ranges are disjoint by construction, which is exactly the
        // contract `compute_range`/`commit_range` require.
        self.pool.install(|| {
            for_each_leaf(0..len, compute_grain, &|range| unsafe {
                cells.compute_range(&*rule, range);
            });
        });
        self.pool.install(|| {
            for_each_leaf(0..len, commit_grain, &|range| unsafe {
                cells.commit_range(range);
            });
        });
    }

    fn current_state(&self) -> Vec<bool> {
        self.grid.current_state()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collect_leaves(len: usize, grain: usize) -> Vec<Range<usize>> {
        let recorded = Mutex::new(Vec::new());
        for_each_leaf(0..len, grain, &|range| {
            recorded.lock().unwrap().push(range);
        });
        recorded.into_inner().unwrap()
    }

    #[test]
    fn leaves_cover_range_exactly_once() {
        for (len, grain) in [(25, 50), (1000, 50), (1000, 100), (101, 50), (7, 1)] {
            let leaves = collect_leaves(len, grain);
            let mut seen = vec![0u32; len];
            for range in &leaves {
                assert!(range.len() <= grain, "leaf {range:?} exceeds grain {grain}");
                for i in range.clone() {
                    seen[i] += 1;
                }
            }
            assert!(
                seen.iter().all(|&c| c == 1),
                "leaves of len {len} grain {grain} are not an exact cover"
            );
        }
    }

    #[test]
    fn small_range_is_a_single_leaf() {
        let leaves = collect_leaves(25, 50);
        assert_eq!(leaves, vec![0..25]);
    }

    #[test]
    fn distinct_grains_split_differently() {
        let fine = collect_leaves(1000, 50).len();
        let coarse = collect_leaves(1000, 100).len();
        assert!(fine > coarse);
    }
}
