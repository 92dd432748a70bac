//! One-shot settle timer used by the debounce controller.

use crate::hardware::traits::TimerChannel;

/// One-shot countdown on a timer channel.
///
/// At most one countdown is in flight: [`arm`](Self::arm) is refused while the
/// timer is already running, and [`finish`](Self::finish) stops and clears the
/// counter so the next countdown starts from zero.
pub struct SettleTimer<T> {
    timer: T,
    period_ticks: u32,
    armed: bool,
}

impl<T: TimerChannel> SettleTimer<T> {
    /// Programs `timer` to interrupt `period_ticks` ticks of `tick_hz` after each arm.
    pub fn new(mut timer: T, tick_hz: u32, period_ticks: u32) -> Self {
        timer.stop();
        timer.set_tick_rate(tick_hz);
        timer.set_period(period_ticks);
        timer.enable_compare_interrupt();
        timer.clear();
        debug!("settle timer: {} ticks at {} Hz", period_ticks, tick_hz);

        Self {
            timer,
            period_ticks,
            armed: false,
        }
    }

    /// Starts the countdown. Returns `false` if one is already running.
    pub fn arm(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.timer.start();
        self.armed = true;
        true
    }

    /// Stops and clears the counter after expiry. Returns whether a countdown was running.
    pub fn finish(&mut self) -> bool {
        self.timer.stop();
        self.timer.clear();
        core::mem::replace(&mut self.armed, false)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn period_ticks(&self) -> u32 {
        self.period_ticks
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
