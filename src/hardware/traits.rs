/// Edge a button line is sensitive to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Falling,
    Rising,
}

impl Edge {
    pub const fn opposite(self) -> Self {
        match self {
            Edge::Falling => Edge::Rising,
            Edge::Rising => Edge::Falling,
        }
    }
}

pub trait Led {
    fn on(&mut self);
    fn off(&mut self);
    fn toggle(&mut self);

    fn set(&mut self, on: bool) {
        if on { self.on() } else { self.off() }
    }
}

pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

/// Edge notification control of an interrupt-capable input line.
pub trait EdgeNotifier {
    fn set_edge(&mut self, edge: Edge);
    fn enable_notification(&mut self);
    fn disable_notification(&mut self);
    fn clear_pending(&mut self);
}

/// One channel of a hardware timer counting up from 0 to its period.
pub trait TimerChannel {
    fn set_period(&mut self, ticks: u32);
    fn set_compare(&mut self, ticks: u32);
    /// Selects the counting clock, in ticks per second.
    fn set_tick_rate(&mut self, hz: u32);
    fn start(&mut self);
    fn stop(&mut self);
    /// Resets the counter to 0.
    fn clear(&mut self);
    /// Enables the interrupt raised when the counter reaches its period.
    fn enable_compare_interrupt(&mut self);
    fn read_counter(&self) -> u32;
}
