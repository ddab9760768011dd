//! Simulated single-acting pneumatic piston.

use std::sync::Arc;

use parking_lot::Mutex;
use pilot_common::hal::device::Pneumatic;
use tracing::debug;

#[derive(Debug, Default)]
struct PistonState {
    extended: bool,
    actuations: u32,
}

/// Simulated piston implementing [`Pneumatic`]. Starts retracted.
pub struct SimPiston {
    port: u8,
    state: Arc<Mutex<PistonState>>,
}

impl SimPiston {
    pub(super) fn new(port: u8) -> (Self, PistonProbe) {
        let state = Arc::new(Mutex::new(PistonState::default()));
        (
            Self {
                port,
                state: Arc::clone(&state),
            },
            PistonProbe { state },
        )
    }

    fn set(&mut self, extended: bool) {
        let mut state = self.state.lock();
        if state.extended != extended {
            state.extended = extended;
            state.actuations += 1;
            debug!(port = self.port, extended, "Piston actuated");
        }
    }
}

impl Pneumatic for SimPiston {
    fn extend(&mut self) {
        self.set(true);
    }

    fn retract(&mut self) {
        self.set(false);
    }

    fn is_extended(&self) -> bool {
        self.state.lock().extended
    }
}

/// Test-side view of a [`SimPiston`].
#[derive(Clone)]
pub struct PistonProbe {
    state: Arc<Mutex<PistonState>>,
}

impl PistonProbe {
    pub fn is_extended(&self) -> bool {
        self.state.lock().extended
    }

    /// Number of state changes so far.
    pub fn actuations(&self) -> u32 {
        self.state.lock().actuations
    }
}
