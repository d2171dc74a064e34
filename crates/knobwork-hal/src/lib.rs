#![cfg_attr(not(test), no_std)]

//! `embedded-hal` adapters for the knobwork encoder pipeline.

pub mod input;

pub use input::gpio_bank::{GpioBankError, GpioPinBank, RegisterError};
