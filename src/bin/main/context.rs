use core::fmt::Debug;

use knobwork_core::{
    BindingId, CcMessage, ConfigError, EncoderController, EncoderId, EncoderValue, MidiOut,
    quantize_normalized,
};
use log::{debug, warn};

/// Application state reachable from encoder listeners: the MIDI link and
/// the channel every knob sends on.
pub(super) struct MainContext<M> {
    midi: M,
    channel: u8,
    sent: u32,
    dropped: u32,
}

impl<M> MainContext<M>
where
    M: MidiOut,
    M::Error: Debug,
{
    pub(super) const NAME: &'static str = "Encoders";

    pub(super) fn new(midi: M, channel: u8) -> Self {
        Self {
            midi,
            channel,
            sent: 0,
            dropped: 0,
        }
    }

    /// Routes every value change of encoder `id` to CC `controller`.
    pub(super) fn bind<'a, P, const N: usize>(
        controller: &mut EncoderController<'a, P, Self, N>,
        id: EncoderId,
        cc: u8,
    ) -> Result<BindingId, ConfigError>
    where
        M: 'a,
        P: 'a,
    {
        Ok(controller
            .on_encoder(id)?
            .turn()
            .then(move |ctx: &mut Self, event| ctx.send_value(cc, event.value)))
    }

    /// Detaches every listener when the context goes away, leaving the
    /// controller polling with nothing bound.
    pub(super) fn cleanup<P, const N: usize>(
        &self,
        controller: &mut EncoderController<'_, P, Self, N>,
    ) {
        controller.clear_bindings();
        debug!(
            "{}: cleanup sent={} dropped={}",
            Self::NAME,
            self.sent,
            self.dropped
        );
    }

    pub(super) fn sent(&self) -> u32 {
        self.sent
    }

    pub(super) fn dropped(&self) -> u32 {
        self.dropped
    }

    pub(super) fn midi(&self) -> &M {
        &self.midi
    }

    fn send_value(&mut self, cc: u8, value: EncoderValue) {
        let Some(normalized) = value.as_normalized() else {
            debug!("{}: CC {} ignores {:?} values", Self::NAME, cc, value.mode());
            return;
        };
        let quantized = quantize_normalized(normalized);
        let Some(message) = CcMessage::new(self.channel, cc, quantized) else {
            warn!("{}: CC {} out of range on channel {}", Self::NAME, cc, self.channel);
            self.dropped += 1;
            return;
        };

        match message.send(&mut self.midi) {
            Ok(()) => {
                self.sent += 1;
                debug!("{}: CC {} = {}", Self::NAME, cc, quantized);
            }
            Err(err) => {
                self.dropped += 1;
                warn!("{}: CC {} send failed: {:?}", Self::NAME, cc, err);
            }
        }
    }
}
