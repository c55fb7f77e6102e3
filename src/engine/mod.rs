//! Update engines.
//!
//! Three interchangeable strategies over the same grid/cell/topology layer:
//! [`Sequential`] is the single-threaded reference, [`BarrierPool`] drives
//! persistent workers through a rendezvous barrier, and [`WorkSteal`]
//! decomposes each phase recursively onto a rayon pool. All three produce
//! bit-identical state for identical inputs and step counts.

mod barrier_pool;
mod sequential;
mod sync;
mod work_steal;

pub use barrier_pool::BarrierPool;
pub use sequential::Sequential;
pub use work_steal::{WorkSteal, WorkStealConfig};

use std::sync::OnceLock;

use crate::error::Error;

/// Common surface of the three update engines.
///
/// The mutation contract is per-engine: `step` on a failed [`BarrierPool`]
/// is a silent no-op, while a panic inside a [`WorkSteal`] task propagates
/// out of `step`.
pub trait Engine {
    /// Assign every cell's state in index order.
    fn initialize(&mut self, states: &[bool]) -> Result<(), Error>;

    /// Advance exactly one generation.
    fn step(&mut self);

    /// Row-major snapshot of the current generation.
    fn current_state(&self) -> Vec<bool>;

    /// `(width, height)` of the underlying grid.
    fn dimensions(&self) -> (usize, usize);
}

static PHYSICAL_CORES: OnceLock<usize> = OnceLock::new();

/// Default worker count for the parallel engines: physical cores, at least 1.
pub fn auto_thread_count() -> usize {
    *PHYSICAL_CORES.get_or_init(|| num_cpus::get_physical().max(1))
}
