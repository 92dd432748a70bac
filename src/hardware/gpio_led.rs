use core::convert::Infallible;

use embedded_hal::digital::StatefulOutputPin;

use super::traits::Led;

/// LED on a push-pull output pin.
///
/// The Blue Pill's PC13 LED is wired to 3V3 and lights when the pin is low;
/// an LED wired to ground lights when the pin is high.
pub struct GpioLed<P> {
    pin: P,
    active_low: bool,
}

impl<P> GpioLed<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    pub fn active_low(pin: P) -> Self {
        Self { pin, active_low: true }
    }

    pub fn active_high(pin: P) -> Self {
        Self { pin, active_low: false }
    }

    pub fn is_on(&mut self) -> bool {
        let Ok(high) = self.pin.is_set_high();
        high != self.active_low
    }

    fn drive(&mut self, high: bool) {
        let Ok(()) = self.pin.set_state(high.into());
    }
}

impl<P> Led for GpioLed<P>
where
    P: StatefulOutputPin<Error = Infallible>,
{
    fn on(&mut self) {
        self.drive(!self.active_low);
    }

    fn off(&mut self) {
        self.drive(self.active_low);
    }

    fn toggle(&mut self) {
        let Ok(()) = self.pin.toggle();
    }
}
