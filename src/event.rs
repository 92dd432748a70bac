//! Hardware notifications delivered to the device context.
//!
//! Interrupt-side code (the edge watcher and the settle timer) only posts an
//! [`Event`]; the handlers run from the dispatch loop in [`crate::runtime`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};

pub const EVENT_QUEUE_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The button line saw the edge it was sensitive to.
    ButtonEdge,
    /// The settle timer reached its period.
    SettleExpired,
}

pub type EventChannel = Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>;
pub type EventSender<'a> = Sender<'a, CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>;
pub type EventReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>;
