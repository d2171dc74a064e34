use embedded_hal::digital::InputPin;
use heapless::Vec;
use log::debug;

use knobwork_core::input::{PinBank, PinId};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RegisterError {
    DuplicatePin(PinId),
    Full,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GpioBankError<E> {
    UnknownPin(PinId),
    Read(PinId, E),
}

/// Pin bank over `embedded-hal` input pins, addressed by GPIO number.
///
/// The board HAL enables the pull-up when it builds each pin (e.g.
/// `Input::new(pin, InputConfig::default().with_pull(Pull::Up))`), so
/// `configure_pull_up` only confirms the line is registered and readable.
#[derive(Debug)]
pub struct GpioPinBank<P, const N: usize> {
    pins: Vec<(PinId, P), N>,
}

impl<P, const N: usize> GpioPinBank<P, N>
where
    P: InputPin,
{
    pub const fn new() -> Self {
        Self { pins: Vec::new() }
    }

    pub fn register(&mut self, id: PinId, pin: P) -> Result<(), RegisterError> {
        if self.pins.iter().any(|(registered, _)| *registered == id) {
            return Err(RegisterError::DuplicatePin(id));
        }
        self.pins.push((id, pin)).map_err(|_| RegisterError::Full)
    }

    pub fn with_pin(mut self, id: PinId, pin: P) -> Result<Self, RegisterError> {
        self.register(id, pin)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Hands the pins back to the board.
    pub fn release(self) -> Vec<(PinId, P), N> {
        self.pins
    }

    fn pin_mut(&mut self, id: PinId) -> Result<&mut P, GpioBankError<P::Error>> {
        self.pins
            .iter_mut()
            .find(|(registered, _)| *registered == id)
            .map(|(_, pin)| pin)
            .ok_or(GpioBankError::UnknownPin(id))
    }
}

impl<P, const N: usize> Default for GpioPinBank<P, N>
where
    P: InputPin,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, const N: usize> PinBank for GpioPinBank<P, N>
where
    P: InputPin,
{
    type Error = GpioBankError<P::Error>;

    fn configure_pull_up(&mut self, id: PinId) -> Result<(), Self::Error> {
        let high = self
            .pin_mut(id)?
            .is_high()
            .map_err(|err| GpioBankError::Read(id, err))?;
        // A pulled-up encoder contact at rest reads high.
        debug!("gpio: pin={} ready level_high={}", id, high);
        Ok(())
    }

    fn is_high(&mut self, id: PinId) -> Result<bool, Self::Error> {
        self.pin_mut(id)?
            .is_high()
            .map_err(|err| GpioBankError::Read(id, err))
    }
}
