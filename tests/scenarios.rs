//! End-to-end press sequences through the public API, with the timer channels
//! and LEDs replaced by recording doubles.

use pwm_dimmer::config::{Config, Indicator};
use pwm_dimmer::debounce::ButtonState;
use pwm_dimmer::duty::{DutyCycle, RampPolicy, SharedDuty};
use pwm_dimmer::event::{Event, EventChannel};
use pwm_dimmer::frequency::{PRESCALED_CLOCK_HZ, UNSCALED_CLOCK_HZ};
use pwm_dimmer::hardware::gpio_button::ButtonLine;
use pwm_dimmer::hardware::traits::{Edge, Led, TimerChannel};
use pwm_dimmer::pwm::{HardwarePwm, PWM_PERIOD_TICKS, PwmStrategy, SoftwarePwm};
use pwm_dimmer::runtime::drain;
use pwm_dimmer::{Device, Error};

#[derive(Default)]
struct Registers {
    period: u32,
    compare: u32,
    tick_hz: u32,
    counter: u32,
    running: bool,
}

impl TimerChannel for Registers {
    fn set_period(&mut self, ticks: u32) {
        self.period = ticks;
    }

    fn set_compare(&mut self, ticks: u32) {
        self.compare = ticks;
    }

    fn set_tick_rate(&mut self, hz: u32) {
        self.tick_hz = hz;
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn clear(&mut self) {
        self.counter = 0;
    }

    fn enable_compare_interrupt(&mut self) {}

    fn read_counter(&self) -> u32 {
        self.counter
    }
}

#[derive(Default)]
struct Lamp {
    lit: bool,
}

impl Led for Lamp {
    fn on(&mut self) {
        self.lit = true;
    }

    fn off(&mut self) {
        self.lit = false;
    }

    fn toggle(&mut self) {
        self.lit = !self.lit;
    }
}

/// What the edge interrupt does: latch the line and post an event if it was enabled.
fn bounce(line: &ButtonLine, events: &EventChannel, edges: usize) {
    for _ in 0..edges {
        if line.latch() {
            events.try_send(Event::ButtonEdge).unwrap();
        }
    }
}

fn expire(events: &EventChannel) {
    events.try_send(Event::SettleExpired).unwrap();
}

#[test]
fn chattering_presses_step_once_each() {
    let line = ButtonLine::new(Edge::Falling);
    let events = EventChannel::new();
    let config = Config::new(PwmStrategy::Hardware)
        .with_ramp(RampPolicy::Linear)
        .with_initial_duty(50);
    let pwm = HardwarePwm::new(
        Registers::default(),
        config.pwm_tick_hz,
        PWM_PERIOD_TICKS,
        config.initial_duty_cycle().unwrap(),
    );
    let mut device = Device::from_config(
        &config,
        &line,
        Registers::default(),
        Edge::Falling,
        pwm,
        Lamp::default(),
    )
    .unwrap();

    let mut seen = Vec::new();
    for chatter in [1, 7, 30, 2, 12, 5] {
        bounce(&line, &events, chatter);
        drain(&mut device, events.receiver());
        assert!(device.indicator().lit);
        expire(&events);
        drain(&mut device, events.receiver());
        assert!(!device.indicator().lit);
        assert_eq!(device.button_state(), ButtonState::AwaitingRisingEdge);
        assert_eq!(line.edge(), Edge::Rising);
        seen.push(device.duty().percent());
        assert_eq!(device.sink().timer().compare, device.duty().percent() as u32);

        bounce(&line, &events, chatter);
        expire(&events);
        drain(&mut device, events.receiver());
        assert_eq!(device.button_state(), ButtonState::Idle);
        assert_eq!(line.edge(), Edge::Falling);
        assert!(!line.is_pending());
    }

    assert_eq!(seen, [60, 70, 80, 90, 100, 0]);
}

#[test]
fn logarithmic_cycle_on_software_pwm() {
    let line = ButtonLine::new(Edge::Falling);
    let events = EventChannel::new();
    let duty = SharedDuty::new(DutyCycle::OFF);
    let config = Config::new(PwmStrategy::Software)
        .with_clock_base(PRESCALED_CLOCK_HZ)
        .with_ramp(RampPolicy::Logarithmic)
        .with_indicator(Indicator::ToggleOnRelease);
    let mut device = Device::from_config(
        &config,
        &line,
        Registers::default(),
        Edge::Falling,
        &duty,
        Lamp::default(),
    )
    .unwrap();
    assert_eq!(device.controller().settle().period_ticks(), 2_500);

    let mut pwm = SoftwarePwm::new(
        Registers::default(),
        Lamp::default(),
        config.pwm_tick_hz,
        config.pwm_period_ticks,
        &duty,
    );

    let mut levels = Vec::new();
    for _ in 0..9 {
        for _ in 0..2 {
            bounce(&line, &events, 3);
            drain(&mut device, events.receiver());
            expire(&events);
            drain(&mut device, events.receiver());
        }
        levels.push(duty.load().percent());
    }
    assert_eq!(levels, [2, 5, 8, 13, 18, 26, 37, 51, 70]);
    assert_eq!(device.ramp_index().get(), 9);
    assert!(device.indicator().lit, "nine releases toggle to lit");

    let high = (0..PWM_PERIOD_TICKS as u32)
        .filter(|&tick| {
            pwm.counter_mut().counter = tick;
            pwm.step()
        })
        .count();
    assert_eq!(high, 71);

    bounce(&line, &events, 1);
    expire(&events);
    drain(&mut device, events.receiver());
    assert_eq!(duty.load(), DutyCycle::OFF);
    assert_eq!(device.ramp_index().get(), 0);
}

#[test]
fn settle_period_from_both_clock_bases() {
    let prescaled = Config::new(PwmStrategy::Hardware).with_clock_base(PRESCALED_CLOCK_HZ);
    let unscaled = Config::new(PwmStrategy::Hardware).with_clock_base(UNSCALED_CLOCK_HZ);
    assert_eq!(prescaled.settle_period_ticks(), Ok(2_500));
    assert_eq!(unscaled.settle_period_ticks(), Ok(10_000));
}

#[test]
fn misconfiguration_refuses_to_start() {
    let line = ButtonLine::new(Edge::Falling);
    let duty = SharedDuty::new(DutyCycle::OFF);
    let config = Config::new(PwmStrategy::Software).with_initial_duty(101);
    let result = Device::from_config(
        &config,
        &line,
        Registers::default(),
        Edge::Falling,
        &duty,
        Lamp::default(),
    );
    assert!(matches!(result, Err(Error::DutyOutOfRange(101))));
}
