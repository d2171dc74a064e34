#![cfg_attr(not(test), no_std)]

//! Rotary-encoder input pipeline for MIDI control surfaces.
//!
//! Raw A/B pin samples are decoded into signed ticks ([`decoder`]), folded
//! into a mode-specific control value ([`value`]) and dispatched to
//! application listeners by the [`controller`] once per `update()` pass.
//! The [`binding`] module adds the fluent `on_encoder(id).turn().then(..)`
//! registration on top of the controller.

extern crate alloc;

pub mod binding;
pub mod controller;
pub mod decoder;
pub mod def;
pub mod error;
pub mod input;
pub mod midi;
pub mod value;

pub use binding::{EncoderBinding, TurnBinding};
pub use controller::{BindingId, ControllerConfig, EncoderController, EncoderEvent};
pub use decoder::{QuadState, QuadratureDecoder};
pub use def::{ENDLESS, EncoderDef, EncoderId};
pub use error::ConfigError;
pub use input::{PinBank, PinId};
pub use midi::{CcMessage, MidiOut, quantize_normalized};
pub use value::{EncoderMode, EncoderValue, ValueModel};
