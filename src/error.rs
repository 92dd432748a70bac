use core::fmt;

/// Startup configuration faults.
///
/// The control core has no runtime error paths; anything reported here is
/// raised once at startup by [`Config::validate`](crate::Config::validate) or
/// [`Config::validate_for_timer`](crate::Config::validate_for_timer) and is
/// fatal for the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A frequency of 0 Hz was requested.
    ZeroFrequency,
    /// The requested frequency is faster than the timer clock can count.
    FrequencyAboveClock { hz: u32, clock_hz: u32 },
    /// The computed period does not fit the timer's period register.
    PeriodOverflow { ticks: u32, max: u32 },
    /// The timer clock cannot be divided down to the requested tick rate.
    TickRateUnreachable { tick_hz: u32, timer_clock_hz: u32 },
    /// The clock division needed for the tick rate exceeds the prescaler.
    PrescalerOverflow { divider: u32, max: u32 },
    /// The duty cycle lies outside `0..=100`.
    DutyOutOfRange(u8),
    /// The linear ramp only visits multiples of its step.
    DutyOffLinearGrid(u8),
    /// The logarithmic ramp table is only defined from a dark LED.
    LogarithmicStartNotZero(u8),
    /// The PWM counter period must be at least one tick.
    ZeroPwmPeriod,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroFrequency => f.write_str("frequency must be non-zero"),
            Error::FrequencyAboveClock { hz, clock_hz } => {
                write!(f, "{hz} Hz exceeds the {clock_hz} Hz timer clock")
            }
            Error::PeriodOverflow { ticks, max } => {
                write!(f, "period of {ticks} ticks exceeds the {max} tick register")
            }
            Error::TickRateUnreachable { tick_hz, timer_clock_hz } => {
                write!(f, "{tick_hz} Hz does not divide the {timer_clock_hz} Hz timer clock")
            }
            Error::PrescalerOverflow { divider, max } => {
                write!(f, "clock division by {divider} exceeds the {max} prescaler")
            }
            Error::DutyOutOfRange(duty) => write!(f, "duty cycle {duty}% is above 100%"),
            Error::DutyOffLinearGrid(duty) => {
                write!(f, "duty cycle {duty}% is not a multiple of the linear step")
            }
            Error::LogarithmicStartNotZero(duty) => {
                write!(f, "logarithmic ramp must start at 0%, not {duty}%")
            }
            Error::ZeroPwmPeriod => f.write_str("PWM period must be at least one tick"),
        }
    }
}
