//! Reusable rendezvous barrier for the persistent worker pool.
//!
//! A generation counter behind a mutex/condvar pair: all parties block
//! until the last one arrives, which bumps the generation and wakes the
//! rest. Poisoning replaces the broken-barrier notion — once poisoned,
//! every current and future wait returns [`BarrierBroken`], so a single
//! failed party (a panicking worker, a dropped pool) unblocks everyone
//! for good.

use std::sync::{Condvar, Mutex};

/// A rendezvous was poisoned; the pool it synchronized is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BarrierBroken;

struct BarrierState {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

pub(crate) struct Rendezvous {
    parties: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl Rendezvous {
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0);
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                poisoned: false,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Block until all parties arrive or the barrier is poisoned.
    pub fn wait(&self) -> Result<(), BarrierBroken> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.poisoned {
            return Err(BarrierBroken);
        }
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(());
        }
        let generation = state.generation;
        loop {
            state = self
                .cvar
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
            if state.poisoned {
                return Err(BarrierBroken);
            }
            if state.generation != generation {
                return Ok(());
            }
        }
    }

    /// Break the barrier permanently, waking every waiter with an error.
    pub fn poison(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.poisoned = true;
        self.cvar.notify_all();
    }
}
