//! Tick accumulation into mode-specific control values.

use crate::def::EncoderDef;

/// Output convention of an encoder.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EncoderMode {
    /// Position in `[0.0, 1.0]`, saturating at both ends.
    #[default]
    Normalized,
    /// Unbounded signed detent count.
    Raw,
    /// Signed detents since the previous emission.
    Relative,
}

/// A value emitted to listeners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EncoderValue {
    Normalized(f32),
    Raw(i32),
    Relative(i32),
}

impl EncoderValue {
    pub const fn mode(self) -> EncoderMode {
        match self {
            Self::Normalized(_) => EncoderMode::Normalized,
            Self::Raw(_) => EncoderMode::Raw,
            Self::Relative(_) => EncoderMode::Relative,
        }
    }

    pub const fn as_normalized(self) -> Option<f32> {
        match self {
            Self::Normalized(value) => Some(value),
            _ => None,
        }
    }

    /// Detent count for `Raw` and `Relative` values.
    pub const fn as_steps(self) -> Option<i32> {
        match self {
            Self::Raw(steps) | Self::Relative(steps) => Some(steps),
            Self::Normalized(_) => None,
        }
    }

    /// Change test used for deduplication. Floats compare with `epsilon`,
    /// integers exactly.
    pub fn differs_from(self, other: Self, epsilon: f32) -> bool {
        match (self, other) {
            (Self::Normalized(a), Self::Normalized(b)) => {
                let diff = a - b;
                diff > epsilon || diff < -epsilon
            }
            (Self::Raw(a), Self::Raw(b)) | (Self::Relative(a), Self::Relative(b)) => a != b,
            _ => true,
        }
    }
}

/// Stateful accumulation of decoded ticks for one encoder.
#[derive(Clone, Copy, Debug)]
pub struct ValueModel {
    mode: EncoderMode,
    ticks_per_event: i32,
    span: i32,
    invert: bool,
    tick_accum: i32,
    // Absolute detents for Normalized/Raw, pending delta for Relative.
    position: i32,
    last_emitted: EncoderValue,
}

impl ValueModel {
    /// Builds the model for a descriptor that already passed
    /// [`EncoderDef::validate`].
    pub fn new(def: &EncoderDef) -> Self {
        let span = def.steps_per_range().clamp(1, i32::MAX as u32) as i32;
        let mut model = Self {
            mode: def.mode,
            ticks_per_event: (def.ticks_per_event as i32).max(1),
            span,
            invert: def.invert_direction,
            tick_accum: 0,
            position: 0,
            last_emitted: EncoderValue::Raw(0),
        };
        model.last_emitted = model.current();
        model
    }

    /// Folds one decoded tick (-1, 0 or +1).
    ///
    /// Ticks collect until a full detent is reached in either direction; a
    /// reversal inside a detent cancels out.
    pub fn apply_tick(&mut self, tick: i8) {
        if tick == 0 {
            return;
        }
        let tick = if self.invert { -(tick as i32) } else { tick as i32 };

        self.tick_accum += tick;
        if self.tick_accum >= self.ticks_per_event {
            self.tick_accum -= self.ticks_per_event;
            self.advance(1);
        } else if self.tick_accum <= -self.ticks_per_event {
            self.tick_accum += self.ticks_per_event;
            self.advance(-1);
        }
    }

    fn advance(&mut self, steps: i32) {
        self.position = match self.mode {
            // The counter itself saturates, so overrun past a limit is
            // forgotten and the first turn back is visible immediately.
            EncoderMode::Normalized => (self.position + steps).clamp(0, self.span),
            EncoderMode::Raw => self.position.wrapping_add(steps),
            EncoderMode::Relative => self.position.saturating_add(steps),
        };
    }

    /// Value as of the ticks folded so far.
    pub fn current(&self) -> EncoderValue {
        match self.mode {
            EncoderMode::Normalized => {
                EncoderValue::Normalized(self.position as f32 / self.span as f32)
            }
            EncoderMode::Raw => EncoderValue::Raw(self.position),
            EncoderMode::Relative => EncoderValue::Relative(self.position),
        }
    }

    pub const fn last_emitted(&self) -> EncoderValue {
        self.last_emitted
    }

    /// Returns the value to publish if it changed since the last emission.
    ///
    /// Relative mode publishes the pending delta once and resets it.
    pub fn emit(&mut self, epsilon: f32) -> Option<EncoderValue> {
        let current = self.current();
        match self.mode {
            EncoderMode::Relative => {
                if self.position == 0 {
                    return None;
                }
                self.position = 0;
            }
            EncoderMode::Normalized | EncoderMode::Raw => {
                if !current.differs_from(self.last_emitted, epsilon) {
                    return None;
                }
            }
        }
        self.last_emitted = current;
        Some(current)
    }
}
