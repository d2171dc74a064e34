//! Configuration-time errors.

use core::fmt;

use crate::{def::EncoderId, input::PinId};

/// Errors detected while validating the configuration or registering
/// listeners.
///
/// All of these are raised by `init()` or at bind time, never while polling.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Encoder ids must be positive.
    InvalidId,
    /// Two descriptors share the same id.
    DuplicateId(EncoderId),
    /// A listener or query referenced an id that is not configured.
    UnknownId(EncoderId),
    /// Pulses per revolution must be positive.
    InvalidPpr(EncoderId),
    /// Ticks per logical event must be positive.
    InvalidTicksPerEvent(EncoderId),
    /// Range angle exceeds the supported travel.
    InvalidRange(EncoderId),
    /// Range angle maps to less than one detent of travel.
    RangeTooSmall(EncoderId),
    /// The pin bank rejected this pin.
    InvalidPin(PinId),
    /// A pin is used twice, within one encoder or across encoders.
    PinConflict(PinId),
    /// More descriptors than the controller has slots for.
    TooManyEncoders,
    /// Change threshold must be finite and non-negative.
    InvalidEpsilon,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "encoder id must be positive"),
            Self::DuplicateId(id) => write!(f, "duplicate encoder id {id}"),
            Self::UnknownId(id) => write!(f, "encoder id {id} is not configured"),
            Self::InvalidPpr(id) => write!(f, "encoder {id}: pulses per revolution must be positive"),
            Self::InvalidTicksPerEvent(id) => {
                write!(f, "encoder {id}: ticks per event must be positive")
            }
            Self::InvalidRange(id) => write!(f, "encoder {id}: range angle out of bounds"),
            Self::RangeTooSmall(id) => write!(f, "encoder {id}: range covers less than one detent"),
            Self::InvalidPin(pin) => write!(f, "pin {pin} is not available"),
            Self::PinConflict(pin) => write!(f, "pin {pin} is assigned more than once"),
            Self::TooManyEncoders => write!(f, "too many encoders for controller capacity"),
            Self::InvalidEpsilon => write!(f, "change epsilon must be finite and non-negative"),
        }
    }
}

impl core::error::Error for ConfigError {}
