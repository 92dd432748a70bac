//! One-shot timer channel backed by the embassy-time alarm.
//!
//! The time driver already owns a hardware timer and its compare interrupt;
//! this exposes one countdown on it through [`TimerChannel`] and posts
//! [`Event::SettleExpired`] when the countdown reaches its period.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};

use super::traits::TimerChannel;
use crate::event::{Event, EventSender};
use crate::frequency::ticks_duration;

#[derive(Clone, Copy)]
enum Command {
    Start,
    Stop,
}

pub struct AlarmState {
    period: AtomicU32,
    tick_hz: AtomicU32,
    started_at: AtomicU32,
    running: AtomicBool,
    notify: AtomicBool,
    command: Signal<CriticalSectionRawMutex, Command>,
}

impl AlarmState {
    pub const fn new() -> Self {
        Self {
            period: AtomicU32::new(0),
            tick_hz: AtomicU32::new(1_000_000),
            started_at: AtomicU32::new(0),
            running: AtomicBool::new(false),
            notify: AtomicBool::new(false),
            command: Signal::new(),
        }
    }

    fn countdown(&self) -> Duration {
        ticks_duration(self.period.load(Ordering::Relaxed), self.tick_hz.load(Ordering::Relaxed))
    }

    fn now() -> u32 {
        Instant::now().as_ticks() as u32
    }
}

impl Default for AlarmState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle on an [`AlarmState`]; the countdown itself runs in [`run_alarm`].
pub struct AlarmTimer(&'static AlarmState);

impl AlarmTimer {
    pub fn new(state: &'static AlarmState) -> Self {
        Self(state)
    }
}

impl TimerChannel for AlarmTimer {
    fn set_period(&mut self, ticks: u32) {
        self.0.period.store(ticks, Ordering::Relaxed);
    }

    /// No-op: the alarm has no compare output and only fires at its period.
    fn set_compare(&mut self, _ticks: u32) {}

    fn set_tick_rate(&mut self, hz: u32) {
        self.0.tick_hz.store(hz, Ordering::Relaxed);
    }

    fn start(&mut self) {
        self.0.started_at.store(AlarmState::now(), Ordering::Relaxed);
        self.0.running.store(true, Ordering::Release);
        self.0.command.signal(Command::Start);
    }

    fn stop(&mut self) {
        self.0.running.store(false, Ordering::Release);
        self.0.command.signal(Command::Stop);
    }

    fn clear(&mut self) {
        self.0.started_at.store(AlarmState::now(), Ordering::Relaxed);
    }

    fn enable_compare_interrupt(&mut self) {
        self.0.notify.store(true, Ordering::Release);
    }

    /// Ticks since start; reads 0 while stopped.
    fn read_counter(&self) -> u32 {
        if !self.0.running.load(Ordering::Acquire) {
            return 0;
        }
        let elapsed = AlarmState::now().wrapping_sub(self.0.started_at.load(Ordering::Relaxed));
        let hz = self.0.tick_hz.load(Ordering::Relaxed) as u64;
        (elapsed as u64 * hz / embassy_time::TICK_HZ) as u32
    }
}

/// Runs the countdowns requested through `state`, forever.
pub async fn run_alarm(state: &'static AlarmState, events: EventSender<'static>) -> ! {
    loop {
        let mut command = state.command.wait().await;
        loop {
            match command {
                Command::Stop => break,
                Command::Start => {
                    let expiry = Timer::after(state.countdown());
                    match select(expiry, state.command.wait()).await {
                        Either::First(()) => {
                            if state.notify.load(Ordering::Acquire) {
                                events.send(Event::SettleExpired).await;
                            }
                            break;
                        }
                        Either::Second(next) => command = next,
                    }
                }
            }
        }
    }
}
