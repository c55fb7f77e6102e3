//! Neighborhood topologies and toroidal neighbor wiring.
//!
//! Wiring happens exactly once, at grid construction: every cell gets an
//! ordered list of arena indices following the topology's fixed offset
//! table. Offsets wrap modulo width/height, so edge cells see cells on the
//! opposite edge. On grids narrower than an offset span the wrap can map
//! two offsets onto the same index; those duplicates are kept as-is.

/// Moore offsets, ring order starting west.
const MOORE: [(i64, i64); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Von Neumann offsets: the four orthogonal unit steps.
const VON_NEUMANN: [(i64, i64); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Extended Von Neumann offsets: orthogonal steps at distance 2 and 1.
const EXTENDED_VON_NEUMANN: [(i64, i64); 8] = [
    (-2, 0),
    (-1, 0),
    (0, -2),
    (0, -1),
    (2, 0),
    (1, 0),
    (0, 2),
    (0, 1),
];

/// Local neighborhood shape of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighborhood {
    /// The 8 surrounding cells.
    Moore,
    /// The 4 orthogonally adjacent cells.
    VonNeumann,
    /// The 4 orthogonal cells at distance 1 plus 4 more at distance 2.
    ExtendedVonNeumann,
}

impl Neighborhood {
    /// The fixed, ordered (dx, dy) offset table for this neighborhood.
    pub fn offsets(self) -> &'static [(i64, i64)] {
        match self {
            Neighborhood::Moore => &MOORE,
            Neighborhood::VonNeumann => &VON_NEUMANN,
            Neighborhood::ExtendedVonNeumann => &EXTENDED_VON_NEUMANN,
        }
    }
}

/// Resolve one offset from the cell at `index` on a toroidal grid.
#[inline]
fn wrap_offset(index: usize, dx: i64, dy: i64, width: usize, height: usize) -> u32 {
    let x = (index % width) as i64;
    let y = (index / width) as i64;
    let nx = (x + dx).rem_euclid(width as i64) as usize;
    let ny = (y + dy).rem_euclid(height as i64) as usize;
    (ny * width + nx) as u32
}

/// Compute the per-cell neighbor index lists for the whole grid.
///
/// Deterministic: list order follows [`Neighborhood::offsets`]. Duplicate
/// indices from wraparound aliasing on small grids are preserved.
pub(crate) fn wire(width: usize, height: usize, kind: Neighborhood) -> Vec<Box<[u32]>> {
    let offsets = kind.offsets();
    (0..width * height)
        .map(|i| {
            offsets
                .iter()
                .map(|&(dx, dy)| wrap_offset(i, dx, dy, width, height))
                .collect()
        })
        .collect()
}
