use heapless::LinearMap;

use super::{PinBank, PinId};
use crate::decoder::QuadState;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MockPinError {
    UnknownPin(PinId),
    ReadFailed(PinId),
}

#[derive(Clone, Copy, Debug, Default)]
struct MockPin {
    high: bool,
    pulled_up: bool,
    fail_reads: bool,
}

/// No-hardware pin bank used for bring-up and tests.
///
/// Pins must be declared before `configure_pull_up`; configuring an
/// undeclared pin fails like a missing GPIO line would.
#[derive(Debug)]
pub struct MockPins<const N: usize> {
    pins: LinearMap<PinId, MockPin, N>,
}

impl<const N: usize> MockPins<N> {
    pub const fn new() -> Self {
        Self {
            pins: LinearMap::new(),
        }
    }

    /// Declares `pin` resting high, as a pulled-up encoder contact does.
    /// Returns `false` when the bank is full.
    pub fn declare(&mut self, pin: PinId) -> bool {
        self.pins
            .insert(
                pin,
                MockPin {
                    high: true,
                    ..MockPin::default()
                },
            )
            .is_ok()
    }

    /// Declares every pin in `pins`.
    ///
    /// # Panics
    ///
    /// If the bank has no room left, so a short table fails at the call
    /// site instead of later as an unknown pin.
    pub fn with_pins(mut self, pins: &[PinId]) -> Self {
        for pin in pins {
            assert!(self.declare(*pin), "mock pin bank full, pin {pin} not declared");
        }
        self
    }

    pub fn set_level(&mut self, pin: PinId, high: bool) {
        if let Some(state) = self.pins.get_mut(&pin) {
            state.high = high;
        }
    }

    /// Drives an A/B pair to `state`.
    pub fn set_phase(&mut self, pin_a: PinId, pin_b: PinId, state: QuadState) {
        self.set_level(pin_a, state.a_high());
        self.set_level(pin_b, state.b_high());
    }

    pub fn set_read_failure(&mut self, pin: PinId, fail: bool) {
        if let Some(state) = self.pins.get_mut(&pin) {
            state.fail_reads = fail;
        }
    }

    pub fn is_pulled_up(&self, pin: PinId) -> bool {
        self.pins.get(&pin).is_some_and(|state| state.pulled_up)
    }
}

impl<const N: usize> Default for MockPins<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PinBank for MockPins<N> {
    type Error = MockPinError;

    fn configure_pull_up(&mut self, pin: PinId) -> Result<(), Self::Error> {
        let state = self
            .pins
            .get_mut(&pin)
            .ok_or(MockPinError::UnknownPin(pin))?;
        state.pulled_up = true;
        Ok(())
    }

    fn is_high(&mut self, pin: PinId) -> Result<bool, Self::Error> {
        let state = self.pins.get(&pin).ok_or(MockPinError::UnknownPin(pin))?;
        if state.fail_reads {
            return Err(MockPinError::ReadFailed(pin));
        }
        Ok(state.high)
    }
}
