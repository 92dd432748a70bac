use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::digital::InputPin;

use super::traits::{Button, Edge, EdgeNotifier};

/// Push button on an input pin with pull resistor.
pub struct GpioButton<P> {
    pin: P,
    active_low: bool,
}

impl<P> GpioButton<P>
where
    P: InputPin<Error = Infallible>,
{
    /// Button shorting the pin to ground against a pull-up.
    pub fn active_low(pin: P) -> Self {
        Self { pin, active_low: true }
    }

    pub fn active_high(pin: P) -> Self {
        Self { pin, active_low: false }
    }

    /// Electrical edge produced by pressing the button.
    pub fn press_edge(&self) -> Edge {
        if self.active_low { Edge::Falling } else { Edge::Rising }
    }
}

impl<P> Button for GpioButton<P>
where
    P: InputPin<Error = Infallible>,
{
    fn is_pressed(&mut self) -> bool {
        let Ok(low) = self.pin.is_low();
        low == self.active_low
    }
}

/// Edge-notification state of the button line, shared between the edge
/// watcher task and the debounce controller.
///
/// A delivered notification masks the line until the controller enables it
/// again, so contact bounce after the first edge never reaches the event queue.
pub struct ButtonLine {
    enabled: AtomicBool,
    rising: AtomicBool,
    pending: AtomicBool,
    rearmed: Signal<CriticalSectionRawMutex, ()>,
}

impl ButtonLine {
    /// A line sensitive to `edge`, notifications enabled.
    pub const fn new(edge: Edge) -> Self {
        Self {
            enabled: AtomicBool::new(true),
            rising: AtomicBool::new(matches!(edge, Edge::Rising)),
            pending: AtomicBool::new(false),
            rearmed: Signal::new(),
        }
    }

    pub fn edge(&self) -> Edge {
        if self.rising.load(Ordering::Acquire) { Edge::Rising } else { Edge::Falling }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Latches an observed edge. Returns `false` if the line was masked.
    pub fn latch(&self) -> bool {
        if self.enabled.swap(false, Ordering::AcqRel) {
            self.pending.store(true, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Resolves once notifications are enabled.
    pub async fn enabled(&self) {
        while !self.is_enabled() {
            self.rearmed.wait().await;
        }
    }
}

impl EdgeNotifier for &ButtonLine {
    fn set_edge(&mut self, edge: Edge) {
        self.rising.store(matches!(edge, Edge::Rising), Ordering::Release);
    }

    fn enable_notification(&mut self) {
        self.enabled.store(true, Ordering::Release);
        self.rearmed.signal(());
    }

    fn disable_notification(&mut self) {
        self.enabled.store(false, Ordering::Release);
    }

    fn clear_pending(&mut self) {
        self.pending.store(false, Ordering::Release);
    }
}

#[cfg(feature = "async")]
mod watcher {
    use core::convert::Infallible;

    use embedded_hal::digital::InputPin;
    use embedded_hal_async::digital::Wait;

    use super::{ButtonLine, GpioButton};
    use crate::event::{Event, EventSender};
    use crate::hardware::traits::{Button, Edge};

    impl<P> GpioButton<P>
    where
        P: InputPin<Error = Infallible> + Wait,
    {
        pub async fn wait_for_edge(&mut self, edge: Edge) {
            let Ok(()) = match edge {
                Edge::Falling => self.pin.wait_for_falling_edge().await,
                Edge::Rising => self.pin.wait_for_rising_edge().await,
            };
        }
    }

    /// Forwards edges seen on `button` to the event queue while `line` is enabled.
    pub async fn watch_edges<P>(
        button: &mut GpioButton<P>,
        line: &ButtonLine,
        events: EventSender<'_>,
    ) -> !
    where
        P: InputPin<Error = Infallible> + Wait,
    {
        loop {
            line.enabled().await;
            let edge = line.edge();
            button.wait_for_edge(edge).await;

            if line.latch() {
                trace!("button edge {:?}, pressed = {}", edge, button.is_pressed());
                events.send(Event::ButtonEdge).await;
            }
        }
    }
}

#[cfg(feature = "async")]
pub use watcher::watch_edges;
