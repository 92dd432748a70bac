//! Timer period derivation.
//!
//! A timer clocked at `clock_hz` that should expire `hz` times per second
//! is loaded with `clock_hz / hz` ticks.

use embassy_time::Duration;

use crate::error::Error;

/// 1 MHz sub-main clock divided by 4.
pub const PRESCALED_CLOCK_HZ: u32 = 250_000;
/// 1 MHz sub-main clock, undivided.
pub const UNSCALED_CLOCK_HZ: u32 = 1_000_000;

/// Period register value for a timer ticking at `clock_hz` that should fire at `hz`.
///
/// ```
/// use pwm_dimmer::frequency::{period_ticks, PRESCALED_CLOCK_HZ, UNSCALED_CLOCK_HZ};
///
/// assert_eq!(period_ticks(PRESCALED_CLOCK_HZ, 100), Ok(2_500));
/// assert_eq!(period_ticks(UNSCALED_CLOCK_HZ, 100), Ok(10_000));
/// ```
pub const fn period_ticks(clock_hz: u32, hz: u32) -> Result<u32, Error> {
    if hz == 0 {
        return Err(Error::ZeroFrequency);
    }
    if hz > clock_hz {
        return Err(Error::FrequencyAboveClock { hz, clock_hz });
    }
    Ok(clock_hz / hz)
}

/// Largest division a 16-bit prescaler or auto-reload register can apply.
pub const TIMER16_MAX_COUNT: u32 = 1 << 16;

/// Prescaler register value that divides a `timer_clock_hz` timer down to `tick_hz`.
///
/// The division has to be exact; anything else would leave the counter
/// ticking at a rate other than the one asked for.
pub const fn prescaler(timer_clock_hz: u32, tick_hz: u32) -> Result<u16, Error> {
    let divider = match period_ticks(timer_clock_hz, tick_hz) {
        Ok(divider) => divider,
        Err(err) => return Err(err),
    };
    if divider * tick_hz != timer_clock_hz {
        return Err(Error::TickRateUnreachable { tick_hz, timer_clock_hz });
    }
    if divider > TIMER16_MAX_COUNT {
        return Err(Error::PrescalerOverflow { divider, max: TIMER16_MAX_COUNT });
    }
    Ok((divider - 1) as u16)
}

/// Auto-reload register value for a counter wrapping every `ticks` (it counts `0..=ARR`).
pub const fn auto_reload(ticks: u32) -> Result<u16, Error> {
    if ticks == 0 {
        return Err(Error::ZeroPwmPeriod);
    }
    if ticks > TIMER16_MAX_COUNT {
        return Err(Error::PeriodOverflow { ticks, max: TIMER16_MAX_COUNT });
    }
    Ok((ticks - 1) as u16)
}

/// Wall-clock length of `ticks` counts of a `clock_hz` timer.
pub fn ticks_duration(ticks: u32, clock_hz: u32) -> Duration {
    Duration::from_micros(ticks as u64 * 1_000_000 / clock_hz.max(1) as u64)
}
