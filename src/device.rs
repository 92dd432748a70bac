//! Device context: all state touched by the event handlers.

use crate::config::{Config, Indicator};
use crate::debounce::{ButtonState, Confirmed, DebounceController};
use crate::duty::{DutyCycle, DutyCycleEngine, RampIndex};
use crate::error::Error;
use crate::event::Event;
use crate::hardware::traits::{Edge, EdgeNotifier, Led, TimerChannel};
use crate::pwm::DutySink;
use crate::settle::SettleTimer;

/// Owns the debounce controller, the ramp engine and the duty-cycle output.
///
/// Handlers run to completion on one `&mut Device`, so button state, duty
/// cycle and ramp index have a single writer.
pub struct Device<L, T, S, I> {
    controller: DebounceController<L, T>,
    engine: DutyCycleEngine,
    sink: S,
    indicator: I,
    indicator_mode: Indicator,
}

impl<L, T, S, I> Device<L, T, S, I>
where
    L: EdgeNotifier,
    T: TimerChannel,
    S: DutySink,
    I: Led,
{
    pub fn new(
        controller: DebounceController<L, T>,
        engine: DutyCycleEngine,
        mut sink: S,
        mut indicator: I,
        indicator_mode: Indicator,
    ) -> Self {
        sink.apply(engine.duty());
        indicator.off();

        Self {
            controller,
            engine,
            sink,
            indicator,
            indicator_mode,
        }
    }

    /// Wires a device from `config`: `settle_timer` ticks at the configured
    /// clock base and `line` belongs to a button producing `press_edge`.
    pub fn from_config(
        config: &Config,
        line: L,
        settle_timer: T,
        press_edge: Edge,
        sink: S,
        indicator: I,
    ) -> Result<Self, Error> {
        config.validate()?;
        let settle = SettleTimer::new(
            settle_timer,
            config.clock_base_hz,
            config.settle_period_ticks()?,
        );
        let controller = DebounceController::new(line, settle, press_edge);
        let engine = config.ramp_engine()?;
        debug!("settle period {} us", config.settle_period()?.as_micros());
        info!(
            "{:?} ramp from {}%, {:?} PWM, indicator {:?}",
            config.ramp,
            config.initial_duty,
            config.strategy,
            config.indicator
        );

        Ok(Self::new(controller, engine, sink, indicator, config.indicator))
    }

    /// Runs the handler for `event`.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::ButtonEdge => self.on_button_edge(),
            Event::SettleExpired => self.on_settle_expired(),
        }
    }

    fn on_button_edge(&mut self) {
        let settling = self.controller.on_raw_edge();
        if settling && self.indicator_mode == Indicator::LitWhileSettling {
            self.indicator.on();
        }
    }

    fn on_settle_expired(&mut self) {
        let Self {
            controller,
            engine,
            sink,
            indicator,
            indicator_mode,
        } = self;

        controller.on_settle_expired(|confirmed| {
            match confirmed {
                Confirmed::Press => {
                    let duty = engine.advance();
                    sink.apply(duty);
                    info!("press: duty {}% (step {})", duty.percent(), engine.index().get());
                }
                Confirmed::Release => debug!("release"),
            }

            let toggle = match indicator_mode {
                Indicator::ToggleOnTransition => true,
                Indicator::ToggleOnRelease => confirmed == Confirmed::Release,
                Indicator::None | Indicator::LitWhileSettling => false,
            };
            if toggle {
                indicator.toggle();
            }
        });

        if *indicator_mode == Indicator::LitWhileSettling {
            indicator.off();
        }
    }

    pub fn duty(&self) -> DutyCycle {
        self.engine.duty()
    }

    pub fn ramp_index(&self) -> RampIndex {
        self.engine.index()
    }

    pub fn button_state(&self) -> ButtonState {
        self.controller.state()
    }

    pub fn controller(&self) -> &DebounceController<L, T> {
        &self.controller
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duty::{RampPolicy, SharedDuty};
    use crate::hardware::mock::{MockLed, MockLine, MockTimer};
    use crate::pwm::{HardwarePwm, PWM_PERIOD_TICKS, PwmStrategy};

    type HwDevice = Device<MockLine, MockTimer, HardwarePwm<MockTimer>, MockLed>;

    fn hardware_device(config: Config) -> HwDevice {
        let pwm = HardwarePwm::new(
            MockTimer::default(),
            config.pwm_tick_hz,
            PWM_PERIOD_TICKS,
            config.initial_duty_cycle().unwrap(),
        );
        Device::from_config(
            &config,
            MockLine::default(),
            MockTimer::default(),
            Edge::Falling,
            pwm,
            MockLed::default(),
        )
        .unwrap()
    }

    fn press(device: &mut Device<impl EdgeNotifier, impl TimerChannel, impl DutySink, impl Led>) {
        device.handle(Event::ButtonEdge);
        device.handle(Event::ButtonEdge);
        device.handle(Event::SettleExpired);
    }

    fn release(device: &mut Device<impl EdgeNotifier, impl TimerChannel, impl DutySink, impl Led>) {
        device.handle(Event::ButtonEdge);
        device.handle(Event::SettleExpired);
    }

    #[test]
    fn compare_register_follows_every_press() {
        let config = Config::new(PwmStrategy::Hardware)
            .with_ramp(RampPolicy::Linear)
            .with_initial_duty(50);
        let mut device = hardware_device(config);
        assert_eq!(device.sink().timer().compare, 50);

        for _ in 0..20 {
            press(&mut device);
            assert_eq!(device.sink().timer().compare, device.duty().percent() as u32);
            release(&mut device);
        }
    }

    #[test]
    fn release_does_not_change_duty() {
        let config = Config::new(PwmStrategy::Hardware).with_ramp(RampPolicy::Logarithmic);
        let mut device = hardware_device(config);

        press(&mut device);
        assert_eq!(device.duty().percent(), 2);
        assert_eq!(device.button_state(), ButtonState::AwaitingRisingEdge);
        release(&mut device);
        assert_eq!(device.duty().percent(), 2);
        assert_eq!(device.button_state(), ButtonState::Idle);
    }

    #[test]
    fn indicator_lit_only_while_settling() {
        let mut device = hardware_device(Config::new(PwmStrategy::Hardware));
        device.handle(Event::ButtonEdge);
        assert!(device.indicator().lit);
        device.handle(Event::SettleExpired);
        assert!(!device.indicator().lit);
    }

    #[test]
    fn indicator_toggles_per_mode() {
        let shared = SharedDuty::new(DutyCycle::OFF);
        let config = Config::new(PwmStrategy::Software).with_ramp(RampPolicy::Linear);

        let mut device = Device::from_config(
            &config,
            MockLine::default(),
            MockTimer::default(),
            Edge::Falling,
            &shared,
            MockLed::default(),
        )
        .unwrap();
        press(&mut device);
        release(&mut device);
        assert_eq!(device.indicator().toggles, 2);

        let config = config.with_indicator(Indicator::ToggleOnRelease);
        let mut device = Device::from_config(
            &config,
            MockLine::default(),
            MockTimer::default(),
            Edge::Falling,
            &shared,
            MockLed::default(),
        )
        .unwrap();
        press(&mut device);
        assert_eq!(device.indicator().toggles, 0);
        release(&mut device);
        assert_eq!(device.indicator().toggles, 1);
    }

    #[test]
    fn shared_duty_published_for_software_loop() {
        let shared = SharedDuty::new(DutyCycle::OFF);
        let config = Config::new(PwmStrategy::Software)
            .with_ramp(RampPolicy::Linear)
            .with_initial_duty(90);
        let mut device = Device::from_config(
            &config,
            MockLine::default(),
            MockTimer::default(),
            Edge::Falling,
            &shared,
            MockLed::default(),
        )
        .unwrap();
        assert_eq!(shared.load().percent(), 90);

        press(&mut device);
        assert_eq!(shared.load(), DutyCycle::FULL);
        release(&mut device);
        press(&mut device);
        assert_eq!(shared.load(), DutyCycle::OFF);
    }

    #[test]
    fn invalid_config_is_fatal() {
        let config = Config::new(PwmStrategy::Software).with_sample_hz(0);
        let shared = SharedDuty::new(DutyCycle::OFF);
        let result = Device::from_config(
            &config,
            MockLine::default(),
            MockTimer::default(),
            Edge::Falling,
            &shared,
            MockLed::default(),
        );
        assert!(matches!(result, Err(Error::ZeroFrequency)));
    }
}
