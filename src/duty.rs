//! Duty-cycle ramp engine.
//!
//! Owns the LED brightness and advances it one step on every confirmed press,
//! either linearly or along a perceptually tuned logarithmic table.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::error::Error;

/// Brightness step of the linear ramp.
pub const LINEAR_STEP: u8 = 10;

/// Increments of the logarithmic ramp.
///
/// The cumulative sum follows `100 * e^(0.3 * (i + 1) - 3)`. The first step is
/// four lower and the last four higher than the formula gives, which keeps
/// the dim and bright ends visually even. Do not regenerate from the formula.
pub const LOG_RAMP: [u8; 10] = [2, 3, 3, 5, 5, 8, 11, 14, 19, 30];

/// A PWM duty cycle in percent, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle(u8);

impl DutyCycle {
    pub const OFF: Self = Self(0);
    pub const FULL: Self = Self(100);

    pub const fn new(percent: u8) -> Result<Self, Error> {
        if percent > 100 {
            return Err(Error::DutyOutOfRange(percent));
        }
        Ok(Self(percent))
    }

    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Number of high ticks out of a counter period of `period` ticks.
    pub const fn ticks_of(self, period: u16) -> u16 {
        ((self.0 as u32 * period as u32) / 100) as u16
    }
}

/// Step policy applied on each confirmed press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampPolicy {
    /// `+10` per press, back to 0 once the next step would pass 100.
    Linear,
    /// Walk [`LOG_RAMP`]; after the tenth increment start over from 0.
    Logarithmic,
}

/// Cursor into [`LOG_RAMP`], always within `0..LOG_RAMP.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampIndex(u8);

impl RampIndex {
    pub const fn get(self) -> u8 {
        self.0
    }
}

pub struct DutyCycleEngine {
    policy: RampPolicy,
    duty: DutyCycle,
    index: RampIndex,
}

impl DutyCycleEngine {
    /// Creates an engine at `initial`.
    ///
    /// The logarithmic table is only defined from a dark LED and the linear ramp
    /// only visits multiples of [`LINEAR_STEP`].
    pub const fn new(policy: RampPolicy, initial: DutyCycle) -> Result<Self, Error> {
        match policy {
            RampPolicy::Linear if initial.0 % LINEAR_STEP != 0 => {
                return Err(Error::DutyOffLinearGrid(initial.0));
            }
            RampPolicy::Logarithmic if initial.0 != 0 => {
                return Err(Error::LogarithmicStartNotZero(initial.0));
            }
            _ => {}
        }
        Ok(Self {
            policy,
            duty: initial,
            index: RampIndex(0),
        })
    }

    pub fn policy(&self) -> RampPolicy {
        self.policy
    }

    pub fn duty(&self) -> DutyCycle {
        self.duty
    }

    pub fn index(&self) -> RampIndex {
        self.index
    }

    /// Advances one ramp step and returns the new duty cycle.
    ///
    /// Must be called exactly once per confirmed press.
    pub fn advance(&mut self) -> DutyCycle {
        match self.policy {
            RampPolicy::Linear => {
                let next = self.duty.0 + LINEAR_STEP;
                self.duty = if next > 100 { DutyCycle::OFF } else { DutyCycle(next) };
            }
            RampPolicy::Logarithmic => {
                let step = LOG_RAMP[self.index.0 as usize];
                let next = self.index.0 + 1;
                if next as usize >= LOG_RAMP.len() {
                    self.duty = DutyCycle::OFF;
                    self.index = RampIndex(0);
                } else {
                    // The table sums to exactly 100; min() only guards a desynced cursor.
                    self.duty = DutyCycle((self.duty.0 + step).min(100));
                    self.index = RampIndex(next);
                }
            }
        }
        self.duty
    }
}

/// Single-word mirror of the duty cycle for readers outside the event handlers.
///
/// Only the confirmed-press handler stores into it; the software PWM loop
/// loads from it on every iteration.
pub struct SharedDuty(AtomicU8);

impl SharedDuty {
    pub const fn new(initial: DutyCycle) -> Self {
        Self(AtomicU8::new(initial.0))
    }

    pub fn load(&self) -> DutyCycle {
        // Only `store` writes, and it only writes valid percentages.
        DutyCycle(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, duty: DutyCycle) {
        self.0.store(duty.0, Ordering::Release);
    }
}
