//! Pin sampling abstraction.

pub mod mock;

/// GPIO line identifier.
pub type PinId = u8;

/// A set of digital inputs addressed by pin id.
///
/// The controller owns its bank exclusively and is the only caller.
pub trait PinBank {
    type Error;

    /// Puts `pin` in input mode with the pull-up enabled.
    fn configure_pull_up(&mut self, pin: PinId) -> Result<(), Self::Error>;

    /// Samples the current level of `pin`. Must not block.
    fn is_high(&mut self, pin: PinId) -> Result<bool, Self::Error>;
}
