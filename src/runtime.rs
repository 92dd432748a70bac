//! Foreground loops.
//!
//! Hardware notifications only enqueue an [`Event`](crate::event::Event);
//! [`dispatch`] runs the handlers one at a time. With the software strategy
//! a second task runs [`software_pwm`], which yields after every iteration
//! so event delivery is never starved.

use embassy_futures::yield_now;

use crate::device::Device;
use crate::event::EventReceiver;
use crate::hardware::traits::{EdgeNotifier, Led, TimerChannel};
use crate::pwm::{DutySink, SoftwarePwm};

/// Handles events as they arrive, forever.
///
/// Between events the executor has nothing to run and waits for the next
/// interrupt in low-power mode.
pub async fn dispatch<L, T, S, I>(device: &mut Device<L, T, S, I>, events: EventReceiver<'_>) -> !
where
    L: EdgeNotifier,
    T: TimerChannel,
    S: DutySink,
    I: Led,
{
    loop {
        let event = events.receive().await;
        device.handle(event);
    }
}

/// Handles every event already queued. Returns how many there were.
pub fn drain<L, T, S, I>(device: &mut Device<L, T, S, I>, events: EventReceiver<'_>) -> usize
where
    L: EdgeNotifier,
    T: TimerChannel,
    S: DutySink,
    I: Led,
{
    let mut handled = 0;
    while let Ok(event) = events.try_receive() {
        device.handle(event);
        handled += 1;
    }
    handled
}

/// Polls the software PWM for the lifetime of the device.
pub async fn software_pwm<T, P>(pwm: &mut SoftwarePwm<'_, T, P>) -> !
where
    T: TimerChannel,
    P: Led,
{
    loop {
        pwm.step();
        yield_now().await;
    }
}
