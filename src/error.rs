//! Error types for grid construction and state injection.

/// Errors surfaced by [`Grid`](crate::Grid) construction and the
/// [`Engine`](crate::Engine) interface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Grid dimensions must both be positive.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// The injected state vector does not cover the grid exactly.
    #[error("state vector length {actual} does not match grid size {expected}")]
    StateLengthMismatch {
        /// `width * height` of the grid.
        expected: usize,
        /// Length of the provided state vector.
        actual: usize,
    },
}
