//! Cell state and the pluggable transition rule.
//!
//! A step is split into two phases. Phase 1 reads the `alive` flags of a
//! cell's neighbors and stores the rule's verdict in `pending`; phase 2
//! copies `pending` into `alive`. No cell ever reads another cell's
//! `pending`, and `alive` is only written in phase 2, so every phase-1
//! computation observes the complete previous generation no matter how the
//! cells are scheduled.

/// Largest neighbor count across all supported topologies. Sizes the
/// stack-allocated gather scratch so the hot loop never allocates.
pub(crate) const MAX_NEIGHBORS: usize = 8;

/// One cell of the automaton arena.
pub(crate) struct Cell {
    /// Externally observable state.
    pub alive: bool,
    /// Phase-1 output, consumed by phase 2 of the same cell only.
    pub pending: bool,
    /// Arena indices of this cell's neighbors, fixed at wiring time.
    pub neighbors: Box<[u32]>,
}

impl Cell {
    pub fn new(neighbors: Box<[u32]>) -> Self {
        debug_assert!(neighbors.len() <= MAX_NEIGHBORS);
        Self {
            alive: false,
            pending: false,
            neighbors,
        }
    }
}

/// Per-cell transition rule.
///
/// `neighbor_states` holds the previous-generation `alive` flags of the
/// cell's neighbors, in wiring order. Implementations must be pure with
/// respect to grid state; they run concurrently from the parallel engines.
pub trait Rule: Send + Sync {
    /// Decide the cell's next state from its own state and its neighbors'.
    fn next_state(&self, alive: bool, neighbor_states: &[bool]) -> bool;
}

/// Conway's B3/S23 rule.
///
/// A live cell with exactly 2 or 3 live neighbors survives; a dead cell
/// with exactly 3 live neighbors is born; everything else is dead.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConwayRule;

impl Rule for ConwayRule {
    fn next_state(&self, alive: bool, neighbor_states: &[bool]) -> bool {
        let live = neighbor_states.iter().filter(|&&s| s).count();
        if alive {
            live == 2 || live == 3
        } else {
            live == 3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(live: usize, total: usize) -> Vec<bool> {
        (0..total).map(|i| i < live).collect()
    }

    #[test]
    fn live_cell_survives_with_two_or_three() {
        let rule = ConwayRule;
        for live in 0..=8 {
            let expected = live == 2 || live == 3;
            assert_eq!(
                rule.next_state(true, &states(live, 8)),
                expected,
                "live cell with {live} live neighbors"
            );
        }
    }

    #[test]
    fn dead_cell_born_with_exactly_three() {
        let rule = ConwayRule;
        for live in 0..=8 {
            assert_eq!(
                rule.next_state(false, &states(live, 8)),
                live == 3,
                "dead cell with {live} live neighbors"
            );
        }
    }

    #[test]
    fn rule_sees_only_listed_neighbors() {
        // Von Neumann cells pass 4 states; 3 live of 4 still means birth.
        let rule = ConwayRule;
        assert!(rule.next_state(false, &states(3, 4)));
        assert!(!rule.next_state(false, &states(4, 4)));
    }
}
