//! Toroidal 2D cellular automaton with pluggable neighborhood and rule,
//! updated by one of three interchangeable engines: a sequential
//! reference, a barrier-synchronized persistent worker pool, or a
//! recursive work-stealing decomposition. All three produce bit-identical
//! generations for identical inputs.

mod cell;
mod engine;
mod error;
mod grid;
mod topology;

pub use cell::{ConwayRule, Rule};
pub use engine::{BarrierPool, Engine, Sequential, WorkSteal, WorkStealConfig, auto_thread_count};
pub use error::Error;
pub use grid::Grid;
pub use topology::Neighborhood;
