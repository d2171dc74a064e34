//! Encoder registry: owns every configured encoder, polls them once per
//! `update()` and notifies bound listeners of value changes.

use alloc::{boxed::Box, vec::Vec as AllocVec};

use heapless::{LinearMap, Vec};
use log::{debug, info};

use crate::{
    binding::EncoderBinding,
    decoder::{QuadState, QuadratureDecoder},
    def::{EncoderDef, EncoderId},
    error::ConfigError,
    input::PinBank,
    value::{EncoderValue, ValueModel},
};

const DEFAULT_EPSILON: f32 = 1e-4;

/// Change notification passed to listeners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderEvent {
    pub id: EncoderId,
    pub value: EncoderValue,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerConfig {
    /// Minimum difference for a normalized value to count as changed.
    pub epsilon: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ControllerConfig {
    pub const fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Rejects a negative or non-finite epsilon.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ConfigError::InvalidEpsilon);
        }
        Ok(())
    }
}

/// Handle returned by listener registration, used to unbind.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BindingId(u32);

type Handler<'a, C> = Box<dyn FnMut(&mut C, EncoderEvent) + 'a>;

struct Listener<'a, C> {
    binding: BindingId,
    slot: usize,
    handler: Handler<'a, C>,
}

#[derive(Debug)]
struct Slot {
    def: EncoderDef,
    decoder: QuadratureDecoder,
    model: ValueModel,
}

/// Owner of up to `N` encoders and their listeners.
///
/// `C` is the application context handed to every listener. Listeners never
/// see the controller itself, so the listener set cannot change while a
/// dispatch is in progress.
pub struct EncoderController<'a, P, C, const N: usize> {
    pins: P,
    config: ControllerConfig,
    slots: Vec<Slot, N>,
    index: LinearMap<EncoderId, usize, N>,
    listeners: AllocVec<Listener<'a, C>>,
    next_binding: u32,
    read_faults: u32,
}

/// Checks a descriptor table without touching hardware.
pub fn validate_defs(defs: &[EncoderDef], capacity: usize) -> Result<(), ConfigError> {
    if defs.len() > capacity {
        return Err(ConfigError::TooManyEncoders);
    }

    for (position, def) in defs.iter().enumerate() {
        def.validate()?;
        for earlier in &defs[..position] {
            if earlier.id == def.id {
                return Err(ConfigError::DuplicateId(def.id));
            }
            if earlier.uses_pin(def.pin_a) {
                return Err(ConfigError::PinConflict(def.pin_a));
            }
            if earlier.uses_pin(def.pin_b) {
                return Err(ConfigError::PinConflict(def.pin_b));
            }
        }
    }

    Ok(())
}

impl<'a, P, C, const N: usize> EncoderController<'a, P, C, N>
where
    P: PinBank,
{
    /// Validates `config` and `defs`, configures pull-ups on every encoder pin and seeds
    /// each decoder with the resting phase.
    ///
    /// Nothing is configured when validation fails.
    pub fn init(
        mut pins: P,
        defs: &[EncoderDef],
        config: ControllerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_defs(defs, N)?;

        let mut slots = Vec::new();
        let mut index = LinearMap::new();

        for (position, def) in defs.iter().enumerate() {
            for pin in [def.pin_a, def.pin_b] {
                pins.configure_pull_up(pin)
                    .map_err(|_| ConfigError::InvalidPin(pin))?;
            }
            let a_high = pins
                .is_high(def.pin_a)
                .map_err(|_| ConfigError::InvalidPin(def.pin_a))?;
            let b_high = pins
                .is_high(def.pin_b)
                .map_err(|_| ConfigError::InvalidPin(def.pin_b))?;

            slots
                .push(Slot {
                    def: *def,
                    decoder: QuadratureDecoder::new(QuadState::from_levels(a_high, b_high)),
                    model: ValueModel::new(def),
                })
                .map_err(|_| ConfigError::TooManyEncoders)?;
            index
                .insert(def.id, position)
                .map_err(|_| ConfigError::TooManyEncoders)?;

            debug!(
                "encoder: configured id={} pins={}/{} ppr={} range={} ticks_per_event={} invert={} mode={:?}",
                def.id,
                def.pin_a,
                def.pin_b,
                def.ppr,
                def.range_angle,
                def.ticks_per_event,
                def.invert_direction,
                def.mode
            );
        }

        info!("encoders: init ok count={}", slots.len());

        Ok(Self {
            pins,
            config,
            slots,
            index,
            listeners: AllocVec::new(),
            next_binding: 0,
            read_faults: 0,
        })
    }

    /// Runs one decode/accumulate/compare pass over every encoder in
    /// configuration order and invokes the listeners of each changed one.
    ///
    /// Returns the number of encoders that changed. Never blocks; a failed
    /// pin read skips that encoder for this pass.
    pub fn update(&mut self, ctx: &mut C) -> usize {
        let mut changed = 0;

        for position in 0..self.slots.len() {
            let slot = &mut self.slots[position];
            let (Ok(a_high), Ok(b_high)) = (
                self.pins.is_high(slot.def.pin_a),
                self.pins.is_high(slot.def.pin_b),
            ) else {
                self.read_faults = self.read_faults.saturating_add(1);
                continue;
            };

            let tick = slot.decoder.decode(a_high, b_high);
            slot.model.apply_tick(tick);
            let Some(value) = slot.model.emit(self.config.epsilon) else {
                continue;
            };

            let event = EncoderEvent {
                id: slot.def.id,
                value,
            };
            changed += 1;

            for listener in self.listeners.iter_mut().filter(|l| l.slot == position) {
                (listener.handler)(ctx, event);
            }
        }

        changed
    }
}

impl<'a, P, C, const N: usize> EncoderController<'a, P, C, N> {
    /// Starts a fluent registration for encoder `id`.
    pub fn on_encoder(
        &mut self,
        id: EncoderId,
    ) -> Result<EncoderBinding<'_, 'a, P, C, N>, ConfigError> {
        let slot = self.slot_of(id)?;
        Ok(EncoderBinding::new(self, slot))
    }

    /// Registers `handler` for changes of encoder `id`.
    ///
    /// Handlers for the same encoder run in registration order.
    pub fn set_callback<F>(&mut self, id: EncoderId, handler: F) -> Result<BindingId, ConfigError>
    where
        F: FnMut(&mut C, EncoderEvent) + 'a,
    {
        let slot = self.slot_of(id)?;
        Ok(self.attach(slot, handler))
    }

    pub(crate) fn attach<F>(&mut self, slot: usize, handler: F) -> BindingId
    where
        F: FnMut(&mut C, EncoderEvent) + 'a,
    {
        let binding = BindingId(self.next_binding);
        self.next_binding = self.next_binding.wrapping_add(1);
        self.listeners.push(Listener {
            binding,
            slot,
            handler: Box::new(handler),
        });
        debug!(
            "encoder: bound id={} binding={}",
            self.slots[slot].def.id, binding.0
        );
        binding
    }

    /// Removes one listener. Returns `false` if it was not registered.
    pub fn unbind(&mut self, binding: BindingId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.binding != binding);
        self.listeners.len() != before
    }

    /// Drops every listener, e.g. when the owning context is torn down.
    pub fn clear_bindings(&mut self) {
        self.listeners.clear();
    }

    pub fn binding_count(&self, id: EncoderId) -> Result<usize, ConfigError> {
        let slot = self.slot_of(id)?;
        Ok(self.listeners.iter().filter(|l| l.slot == slot).count())
    }

    /// Last value emitted for `id` (the initial value before any change).
    pub fn value(&self, id: EncoderId) -> Result<EncoderValue, ConfigError> {
        let slot = self.slot_of(id)?;
        Ok(self.slots[slot].model.last_emitted())
    }

    pub fn def(&self, id: EncoderId) -> Result<&EncoderDef, ConfigError> {
        let slot = self.slot_of(id)?;
        Ok(&self.slots[slot].def)
    }

    /// Configured ids in configuration order.
    pub fn ids(&self) -> impl Iterator<Item = EncoderId> + '_ {
        self.slots.iter().map(|slot| slot.def.id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn config(&self) -> ControllerConfig {
        self.config
    }

    /// Pin reads that failed during `update()` since init.
    pub fn read_faults(&self) -> u32 {
        self.read_faults
    }

    /// Board-level access to the pin bank (e.g. to drive a simulated bank).
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Tears the controller down, dropping listeners and returning the pins.
    pub fn release(self) -> P {
        self.pins
    }

    fn slot_of(&self, id: EncoderId) -> Result<usize, ConfigError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(ConfigError::UnknownId(id))
    }
}

#[cfg(test)]
mod tests;
