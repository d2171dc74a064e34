//! Fluent listener registration: `on_encoder(id)?.turn().then(handler)`.
//!
//! Pure argument capture over [`EncoderController::set_callback`]. The id is
//! checked when the chain starts and the handler is attached immediately by
//! `then`; nothing is buffered or deferred to the polling loop.

use crate::controller::{BindingId, EncoderController, EncoderEvent};

/// First link of the chain, holding a validated encoder.
pub struct EncoderBinding<'c, 'a, P, C, const N: usize> {
    controller: &'c mut EncoderController<'a, P, C, N>,
    slot: usize,
}

impl<'c, 'a, P, C, const N: usize> EncoderBinding<'c, 'a, P, C, N> {
    pub(crate) fn new(controller: &'c mut EncoderController<'a, P, C, N>, slot: usize) -> Self {
        Self { controller, slot }
    }

    /// Selects the rotation gesture.
    pub fn turn(self) -> TurnBinding<'c, 'a, P, C, N> {
        TurnBinding {
            controller: self.controller,
            slot: self.slot,
        }
    }
}

/// "On turn" gesture of one encoder.
pub struct TurnBinding<'c, 'a, P, C, const N: usize> {
    controller: &'c mut EncoderController<'a, P, C, N>,
    slot: usize,
}

impl<'c, 'a, P, C, const N: usize> TurnBinding<'c, 'a, P, C, N> {
    /// Attaches `handler`; it runs on every value change of the encoder.
    pub fn then<F>(self, handler: F) -> BindingId
    where
        F: FnMut(&mut C, EncoderEvent) + 'a,
    {
        self.controller.attach(self.slot, handler)
    }
}
