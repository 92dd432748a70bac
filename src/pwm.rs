//! PWM output strategies.
//!
//! Both strategies count a timer over a period of [`PWM_PERIOD_TICKS`] and
//! hold the output high for the first `duty` ticks of every period. The
//! hardware strategy leaves that comparison to a compare channel; the
//! software strategy does it in a polling loop, within one tick.

use crate::duty::{DutyCycle, SharedDuty};
use crate::hardware::traits::{Led, TimerChannel};

/// Counter period giving 1% duty-cycle resolution.
pub const PWM_PERIOD_TICKS: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmStrategy {
    /// A timer compare channel generates the waveform.
    Hardware,
    /// The foreground loop compares a free-running counter against the duty.
    Software,
}

/// Receives every new duty cycle from the ramp engine.
pub trait DutySink {
    fn apply(&mut self, duty: DutyCycle);
}

/// The software loop reads the duty cycle through the shared mirror.
impl DutySink for &SharedDuty {
    fn apply(&mut self, duty: DutyCycle) {
        self.store(duty);
    }
}

/// Output level for counter value `counter` at duty cycle `duty`.
pub fn level_at(counter: u32, duty: DutyCycle, period: u16) -> bool {
    counter <= duty.ticks_of(period) as u32
}

/// Duty cycle held in a timer compare register.
pub struct HardwarePwm<T> {
    timer: T,
    period: u16,
}

impl<T: TimerChannel> HardwarePwm<T> {
    /// Sets up `timer` counting up to `period` at `tick_hz` and starts it at `initial`.
    pub fn new(mut timer: T, tick_hz: u32, period: u16, initial: DutyCycle) -> Self {
        timer.stop();
        timer.set_tick_rate(tick_hz);
        timer.set_period(period as u32);
        timer.set_compare(initial.ticks_of(period) as u32);
        timer.clear();
        timer.start();

        Self { timer, period }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

impl<T: TimerChannel> DutySink for HardwarePwm<T> {
    fn apply(&mut self, duty: DutyCycle) {
        self.timer.set_compare(duty.ticks_of(self.period) as u32);
    }
}

/// Duty cycle realised by polling a free-running counter.
pub struct SoftwarePwm<'a, T, P> {
    counter: T,
    output: P,
    period: u16,
    duty: &'a SharedDuty,
}

impl<'a, T, P> SoftwarePwm<'a, T, P>
where
    T: TimerChannel,
    P: Led,
{
    /// Starts `counter` free-running over `period` ticks at `tick_hz`.
    pub fn new(mut counter: T, output: P, tick_hz: u32, period: u16, duty: &'a SharedDuty) -> Self {
        counter.stop();
        counter.set_tick_rate(tick_hz);
        counter.set_period(period as u32);
        counter.clear();
        counter.start();

        Self {
            counter,
            output,
            period,
            duty,
        }
    }

    /// One polling iteration: sample the counter and drive the output.
    ///
    /// Never blocks. Returns the level driven.
    pub fn step(&mut self) -> bool {
        let high = level_at(self.counter.read_counter(), self.duty.load(), self.period);
        self.output.set(high);
        high
    }

    pub fn counter_mut(&mut self) -> &mut T {
        &mut self.counter
    }

    pub fn output(&self) -> &P {
        &self.output
    }
}
