//! Quadrature decoding with single-step bounce rejection.

// Transition table for previous/current phase (AB).
// Index: (prev << 2) | curr, values are +1/-1 for adjacent steps, 0 otherwise.
// A leading B (00 -> 10 -> 11 -> 01) counts positive.
const QUADRATURE_TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// Two-bit quadrature phase, encoded as `(A << 1) | B`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuadState {
    BothLow = 0b00,
    OnlyB = 0b01,
    OnlyA = 0b10,
    BothHigh = 0b11,
}

impl QuadState {
    pub const fn from_levels(a_high: bool, b_high: bool) -> Self {
        match (a_high, b_high) {
            (false, false) => Self::BothLow,
            (false, true) => Self::OnlyB,
            (true, false) => Self::OnlyA,
            (true, true) => Self::BothHigh,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub const fn a_high(self) -> bool {
        self.bits() & 0b10 != 0
    }

    pub const fn b_high(self) -> bool {
        self.bits() & 0b01 != 0
    }
}

/// One decode step: the phase to adopt and the signed tick it produced.
///
/// Only a move to an adjacent phase yields a tick. A jump across the cycle
/// (e.g. `00 -> 11`) is contact bounce or a missed edge; it yields zero but
/// the new sample is still adopted so the next step decodes from reality.
pub const fn step(prev: QuadState, curr: QuadState) -> (QuadState, i8) {
    let index = ((prev.bits() << 2) | curr.bits()) as usize;
    (curr, QUADRATURE_TRANSITIONS[index])
}

/// Per-encoder decoder state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QuadratureDecoder {
    state: QuadState,
}

impl QuadratureDecoder {
    /// Seeds the decoder with the resting phase so the first poll is silent.
    pub const fn new(initial: QuadState) -> Self {
        Self { state: initial }
    }

    pub const fn state(&self) -> QuadState {
        self.state
    }

    /// Feeds one A/B sample, returning -1, 0 or +1.
    pub fn decode(&mut self, a_high: bool, b_high: bool) -> i8 {
        let (next, tick) = step(self.state, QuadState::from_levels(a_high, b_high));
        self.state = next;
        tick
    }
}
