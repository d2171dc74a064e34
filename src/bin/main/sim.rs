use std::{cell::Cell, convert::Infallible, rc::Rc};

use embedded_hal::digital::{ErrorType, InputPin};
use knobwork_core::QuadState;

/// One positive-direction cycle; `BothHigh` is the detent rest position.
const CYCLE: [QuadState; 4] = [
    QuadState::BothLow,
    QuadState::OnlyA,
    QuadState::BothHigh,
    QuadState::OnlyB,
];
const REST_PHASE: usize = 2;

/// Knob turns played back by the demo: (poll iteration, knob index, detents).
pub(super) const SCRIPT: [(u32, usize, i32); 5] = [
    (10, 0, 6),
    (80, 1, 3),
    (150, 0, -2),
    (220, 1, 30),
    (400, 1, -5),
];

/// Pulled-up encoder contact driven by a [`KnobSim`].
#[derive(Clone, Debug)]
pub(super) struct SimPin {
    high: Rc<Cell<bool>>,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high.get())
    }
}

/// Mechanical detented knob: moves its contacts one quadrature phase per
/// poll until the queued rotation has been played out.
#[derive(Debug)]
pub(super) struct KnobSim {
    a: SimPin,
    b: SimPin,
    phase: usize,
    pending: i32,
    invert: bool,
}

impl KnobSim {
    /// `invert` mirrors the wiring of an encoder configured with
    /// `invert_direction`, so a positive turn still raises its value.
    pub(super) fn new(invert: bool) -> Self {
        let knob = Self {
            a: SimPin {
                high: Rc::new(Cell::new(true)),
            },
            b: SimPin {
                high: Rc::new(Cell::new(true)),
            },
            phase: REST_PHASE,
            pending: 0,
            invert,
        };
        knob.apply();
        knob
    }

    pub(super) fn pin_a(&self) -> SimPin {
        self.a.clone()
    }

    pub(super) fn pin_b(&self) -> SimPin {
        self.b.clone()
    }

    /// Queues `ticks` quadrature transitions; negative turns down.
    pub(super) fn turn(&mut self, ticks: i32) {
        self.pending = self.pending.saturating_add(ticks);
    }

    pub(super) fn is_idle(&self) -> bool {
        self.pending == 0
    }

    pub(super) fn step(&mut self) {
        if self.pending == 0 {
            return;
        }

        let up = self.pending > 0;
        self.pending -= self.pending.signum();
        self.phase = if up != self.invert {
            (self.phase + 1) % CYCLE.len()
        } else {
            (self.phase + CYCLE.len() - 1) % CYCLE.len()
        };
        self.apply();
    }

    fn apply(&self) {
        let state = CYCLE[self.phase];
        self.a.high.set(state.a_high());
        self.b.high.set(state.b_high());
    }
}
