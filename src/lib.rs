//! Button-debounced LED dimming for the STM32F103 "Blue Pill".
//!
//! A push button is debounced by masking its edge line for one settle period,
//! every confirmed press advances the LED duty cycle one ramp step, and the duty
//! cycle is realised either by a timer compare channel or by a software PWM
//! loop polling a free-running counter.
//!
//! Everything outside [`hardware`] is hardware independent and runs on the host.

#![cfg_attr(not(test), no_std)]

// This must go FIRST so that all the other modules see its macros.
mod fmt;

pub mod config;
pub mod debounce;
pub mod device;
pub mod duty;
pub mod error;
pub mod event;
pub mod frequency;
pub mod hardware;
pub mod pwm;
pub mod runtime;
pub mod settle;

pub use config::Config;
pub use device::Device;
pub use error::Error;
