use std::io;

use knobwork_core::MidiOut;
use log::info;
use midly::{
    MidiMessage,
    live::LiveEvent,
    num::{u4, u7},
};

/// Serializes CC messages to MIDI wire bytes and logs them in place of a
/// USB/serial transport.
#[derive(Debug, Default)]
pub(super) struct WireMidiOut {
    buffer: Vec<u8>,
    sent: u32,
}

impl WireMidiOut {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn sent(&self) -> u32 {
        self.sent
    }

    /// Bytes of the most recent message.
    pub(super) fn last_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl MidiOut for WireMidiOut {
    type Error = io::Error;

    fn send_cc(&mut self, channel: u8, controller: u8, value: u8) -> Result<(), Self::Error> {
        let event = LiveEvent::Midi {
            channel: u4::from_int_lossy(channel),
            message: MidiMessage::Controller {
                controller: u7::from_int_lossy(controller),
                value: u7::from_int_lossy(value),
            },
        };

        self.buffer.clear();
        event.write_std(&mut self.buffer)?;
        self.sent = self.sent.wrapping_add(1);
        info!("midi: out {:02x?}", self.buffer);
        Ok(())
    }
}
