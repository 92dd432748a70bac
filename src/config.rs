//! Build-time configuration of a deployment.

use embassy_time::Duration;

use crate::duty::{DutyCycle, DutyCycleEngine, RampPolicy};
use crate::error::Error;
use crate::frequency::{UNSCALED_CLOCK_HZ, auto_reload, period_ticks, prescaler, ticks_duration};
use crate::pwm::{PWM_PERIOD_TICKS, PwmStrategy};

/// What the status LED shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    None,
    /// Lit from the first edge until the settle timer expires.
    LitWhileSettling,
    /// Toggled on every confirmed press and release.
    ToggleOnTransition,
    /// Toggled on every confirmed release, i.e. a debounced push-button toggle.
    ToggleOnRelease,
}

/// Ramp selected by the `log-ramp` feature.
pub const DEFAULT_RAMP: RampPolicy = if cfg!(feature = "log-ramp") {
    RampPolicy::Logarithmic
} else {
    RampPolicy::Linear
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Button sampling rate; one settle period is `1 / sample_hz`.
    pub sample_hz: u32,
    /// Tick rate of the settle timer.
    pub clock_base_hz: u32,
    pub ramp: RampPolicy,
    pub strategy: PwmStrategy,
    pub initial_duty: u8,
    pub pwm_period_ticks: u16,
    /// Tick rate of the PWM counter; the PWM frequency is this over the period.
    pub pwm_tick_hz: u32,
    pub indicator: Indicator,
}

impl Config {
    pub const fn new(strategy: PwmStrategy) -> Self {
        Self {
            sample_hz: 100,
            clock_base_hz: UNSCALED_CLOCK_HZ,
            ramp: DEFAULT_RAMP,
            strategy,
            initial_duty: match DEFAULT_RAMP {
                RampPolicy::Linear => 50,
                RampPolicy::Logarithmic => 0,
            },
            pwm_period_ticks: PWM_PERIOD_TICKS,
            pwm_tick_hz: UNSCALED_CLOCK_HZ,
            indicator: match strategy {
                PwmStrategy::Hardware => Indicator::LitWhileSettling,
                PwmStrategy::Software => Indicator::ToggleOnTransition,
            },
        }
    }

    pub const fn with_sample_hz(mut self, hz: u32) -> Self {
        self.sample_hz = hz;
        self
    }

    pub const fn with_clock_base(mut self, hz: u32) -> Self {
        self.clock_base_hz = hz;
        self
    }

    /// Switches the ramp, moving the initial duty to that ramp's starting point.
    pub const fn with_ramp(mut self, ramp: RampPolicy) -> Self {
        self.ramp = ramp;
        if let RampPolicy::Logarithmic = ramp {
            self.initial_duty = 0;
        }
        self
    }

    pub const fn with_initial_duty(mut self, percent: u8) -> Self {
        self.initial_duty = percent;
        self
    }

    pub const fn with_pwm_tick_hz(mut self, hz: u32) -> Self {
        self.pwm_tick_hz = hz;
        self
    }

    pub const fn with_indicator(mut self, indicator: Indicator) -> Self {
        self.indicator = indicator;
        self
    }

    /// Checks every derived quantity once, at startup.
    pub fn validate(&self) -> Result<(), Error> {
        if self.pwm_period_ticks == 0 {
            return Err(Error::ZeroPwmPeriod);
        }
        period_ticks(self.pwm_tick_hz, self.pwm_frequency_hz_unchecked())?;
        self.settle_period_ticks()?;
        self.ramp_engine()?;
        Ok(())
    }

    /// [`validate`](Self::validate), then checks that a 16-bit timer clocked at
    /// `timer_clock_hz` can count at the PWM tick rate over the PWM period.
    pub fn validate_for_timer(&self, timer_clock_hz: u32) -> Result<(), Error> {
        self.validate()?;
        prescaler(timer_clock_hz, self.pwm_tick_hz)?;
        auto_reload(self.pwm_period_ticks as u32)?;
        Ok(())
    }

    /// Settle timer period in ticks of [`clock_base_hz`](Self::clock_base_hz).
    pub fn settle_period_ticks(&self) -> Result<u32, Error> {
        period_ticks(self.clock_base_hz, self.sample_hz)
    }

    pub fn settle_period(&self) -> Result<Duration, Error> {
        Ok(ticks_duration(self.settle_period_ticks()?, self.clock_base_hz))
    }

    pub fn initial_duty_cycle(&self) -> Result<DutyCycle, Error> {
        DutyCycle::new(self.initial_duty)
    }

    pub fn ramp_engine(&self) -> Result<DutyCycleEngine, Error> {
        DutyCycleEngine::new(self.ramp, self.initial_duty_cycle()?)
    }

    /// PWM output frequency.
    pub fn pwm_frequency_hz(&self) -> Result<u32, Error> {
        if self.pwm_period_ticks == 0 {
            return Err(Error::ZeroPwmPeriod);
        }
        Ok(self.pwm_frequency_hz_unchecked())
    }

    fn pwm_frequency_hz_unchecked(&self) -> u32 {
        self.pwm_tick_hz / self.pwm_period_ticks as u32
    }
}
