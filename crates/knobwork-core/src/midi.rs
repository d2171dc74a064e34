//! MIDI Control Change collaborator contract.
//!
//! The pipeline itself never produces MIDI bytes. Application glue maps an
//! [`EncoderValue`](crate::value::EncoderValue) to a CC with
//! [`quantize_normalized`] and hands it to a [`MidiOut`] transport.

pub const MAX_CHANNEL: u8 = 15;
pub const MAX_DATA: u8 = 127;

/// Transport that owns the MIDI link (USB, serial, virtual port).
///
/// Delivery failures are reported, never retried by the caller.
pub trait MidiOut {
    type Error;

    fn send_cc(&mut self, channel: u8, controller: u8, value: u8) -> Result<(), Self::Error>;
}

/// A range-checked Control Change message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CcMessage {
    channel: u8,
    controller: u8,
    value: u8,
}

impl CcMessage {
    pub const fn new(channel: u8, controller: u8, value: u8) -> Option<Self> {
        if channel > MAX_CHANNEL || controller > MAX_DATA || value > MAX_DATA {
            return None;
        }
        Some(Self {
            channel,
            controller,
            value,
        })
    }

    pub const fn channel(&self) -> u8 {
        self.channel
    }

    pub const fn controller(&self) -> u8 {
        self.controller
    }

    pub const fn value(&self) -> u8 {
        self.value
    }

    pub fn send<M: MidiOut>(self, out: &mut M) -> Result<(), M::Error> {
        out.send_cc(self.channel, self.controller, self.value)
    }
}

/// Maps a normalized value to a 7-bit CC value (`value * 127`, truncated).
pub fn quantize_normalized(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * MAX_DATA as f32) as u8
}
