//! Immutable encoder hardware descriptors.

use crate::{error::ConfigError, input::PinId, value::EncoderMode};

/// Stable application-facing encoder identity.
pub type EncoderId = u8;

/// `range_angle` sentinel for endless encoders.
pub const ENDLESS: u16 = 0;

/// Largest accepted `range_angle` (ten turns).
pub const MAX_RANGE_ANGLE: u16 = 3600;

/// Hardware description of one rotary encoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EncoderDef {
    pub id: EncoderId,
    pub pin_a: PinId,
    pub pin_b: PinId,
    /// Detents per full mechanical revolution.
    pub ppr: u16,
    /// Degrees of travel the logical value spans, or [`ENDLESS`].
    pub range_angle: u16,
    /// Raw decoder ticks per detent.
    pub ticks_per_event: u8,
    pub invert_direction: bool,
    pub mode: EncoderMode,
}

impl EncoderDef {
    pub const fn new(
        id: EncoderId,
        pin_a: PinId,
        pin_b: PinId,
        ppr: u16,
        range_angle: u16,
        ticks_per_event: u8,
        invert_direction: bool,
    ) -> Self {
        Self {
            id,
            pin_a,
            pin_b,
            ppr,
            range_angle,
            ticks_per_event,
            invert_direction,
            mode: EncoderMode::Normalized,
        }
    }

    pub const fn with_mode(mut self, mode: EncoderMode) -> Self {
        self.mode = mode;
        self
    }

    pub const fn is_endless(&self) -> bool {
        self.range_angle == ENDLESS
    }

    /// Detents covering the full logical range.
    ///
    /// Endless encoders span one revolution.
    pub const fn steps_per_range(&self) -> u32 {
        if self.is_endless() {
            self.ppr as u32
        } else {
            self.ppr as u32 * self.range_angle as u32 / 360
        }
    }

    /// Checks the per-descriptor invariants. Cross-descriptor checks
    /// (duplicate ids, shared pins) belong to the controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id == 0 {
            return Err(ConfigError::InvalidId);
        }
        if self.ppr == 0 {
            return Err(ConfigError::InvalidPpr(self.id));
        }
        if self.ticks_per_event == 0 {
            return Err(ConfigError::InvalidTicksPerEvent(self.id));
        }
        if self.range_angle > MAX_RANGE_ANGLE {
            return Err(ConfigError::InvalidRange(self.id));
        }
        if self.pin_a == self.pin_b {
            return Err(ConfigError::PinConflict(self.pin_a));
        }
        if self.steps_per_range() == 0 {
            return Err(ConfigError::RangeTooSmall(self.id));
        }
        Ok(())
    }

    pub(crate) fn uses_pin(&self, pin: PinId) -> bool {
        self.pin_a == pin || self.pin_b == pin
    }
}
