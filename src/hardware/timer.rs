use embassy_stm32::timer::low_level::{OutputCompareMode, Timer};
use embassy_stm32::timer::{Channel, GeneralInstance4Channel};

use super::traits::TimerChannel;
use crate::config::Config;
use crate::error::Error;
use crate::frequency::{auto_reload, prescaler};

/// One channel of a 16-bit general purpose timer, programmed through its registers.
///
/// Both constructors refuse a [`Config`] whose PWM tick rate or period this
/// timer cannot produce exactly, so the register writes below only ever see
/// values that fit.
pub struct Stm32Timer<'d, T: GeneralInstance4Channel> {
    timer: Timer<'d, T>,
    channel: Channel,
}

impl<'d, T: GeneralInstance4Channel> Stm32Timer<'d, T> {
    /// Free-running up-counter; `channel` is left untouched.
    pub fn counter(timer: Timer<'d, T>, channel: Channel, config: &Config) -> Result<Self, Error> {
        config.validate_for_timer(timer.get_clock_frequency().0)?;
        timer.stop();
        Ok(Self { timer, channel })
    }

    /// Edge-aligned PWM on `channel`: the pin is high while the counter is
    /// below the compare value.
    pub fn pwm_output(
        timer: Timer<'d, T>,
        channel: Channel,
        config: &Config,
    ) -> Result<Self, Error> {
        config.validate_for_timer(timer.get_clock_frequency().0)?;
        timer.stop();
        timer.set_output_compare_mode(channel, OutputCompareMode::PwmMode1);
        timer.set_output_compare_preload(channel, true);
        timer.enable_channel(channel, true);
        Ok(Self { timer, channel })
    }
}

impl<'d, T: GeneralInstance4Channel> TimerChannel for Stm32Timer<'d, T> {
    fn set_period(&mut self, ticks: u32) {
        match auto_reload(ticks) {
            Ok(arr) => self.timer.regs_core().arr().write(|w| w.set_arr(arr)),
            Err(err) => error!("period left unchanged: {}", err),
        }
    }

    fn set_compare(&mut self, ticks: u32) {
        self.timer.set_compare_value(self.channel, ticks);
    }

    fn set_tick_rate(&mut self, hz: u32) {
        let psc = match prescaler(self.timer.get_clock_frequency().0, hz) {
            Ok(psc) => psc,
            Err(err) => {
                error!("tick rate left unchanged: {}", err);
                return;
            }
        };
        let regs = self.timer.regs_core();
        regs.psc().write_value(psc);
        // Latch the prescaler now rather than at the next overflow.
        regs.egr().write(|w| w.set_ug(true));
    }

    fn start(&mut self) {
        self.timer.start();
    }

    fn stop(&mut self) {
        self.timer.stop();
    }

    fn clear(&mut self) {
        self.timer.reset();
    }

    fn enable_compare_interrupt(&mut self) {
        self.timer.enable_update_interrupt(true);
    }

    fn read_counter(&self) -> u32 {
        self.timer.regs_core().cnt().read().cnt() as u32
    }
}
