//! STM32F103 Blue Pill Software PWM Dimmer
//! =============================================================================================
//!
//! Each debounced press of the button steps the LED brightness up one ramp
//! step (linear by default, logarithmic with the `log-ramp` feature). The LED
//! sits on a plain GPIO; the main task polls the free-running TIM4 counter and
//! drives the pin high while the counter is at or below the duty threshold.
//!
//! Hardware Connections:
//!   Button:
//!      PB1  -> button -> GND (internal pull-up)
//!
//!   LED:
//!      PA1  -> 1k resistor -> LED -> GND
//!      PC13 onboard LED: toggled on every confirmed press and release
//!
//! Run with `cargo run --release --features stm32f103 --bin software_pwm`

#![no_std]
#![no_main]

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    timer::{Channel, low_level::Timer},
};
use pwm_dimmer::{
    Config, Device,
    duty::{DutyCycle, SharedDuty},
    event::EventChannel,
    frequency::PRESCALED_CLOCK_HZ,
    hardware::{
        alarm_timer::{AlarmState, AlarmTimer, run_alarm},
        gpio_button::{ButtonLine, GpioButton, watch_edges},
        gpio_led::GpioLed,
        timer::Stm32Timer,
        traits::Edge,
    },
    pwm::{PwmStrategy, SoftwarePwm},
    runtime::{dispatch, software_pwm},
};
use {defmt_rtt as _, panic_probe as _}; // Logging and panic handlers

// 100 kHz counter over 100 ticks: 1 kHz PWM, slow enough for the polling loop
const CONFIG: Config = Config::new(PwmStrategy::Software)
    .with_clock_base(PRESCALED_CLOCK_HZ)
    .with_pwm_tick_hz(100_000);

type Dimmer = Device<
    &'static ButtonLine,
    AlarmTimer,
    &'static SharedDuty,
    GpioLed<Output<'static>>,
>;

static EVENTS: EventChannel = EventChannel::new();
static BUTTON_LINE: ButtonLine = ButtonLine::new(Edge::Falling);
static SETTLE_ALARM: AlarmState = AlarmState::new();

// Written by the press handler, read by the polling loop
static DUTY: SharedDuty = SharedDuty::new(DutyCycle::OFF);

/// Forwards button edges while the line is enabled
#[embassy_executor::task]
async fn button_edges(mut button: GpioButton<ExtiInput<'static>>) {
    watch_edges(&mut button, &BUTTON_LINE, EVENTS.sender()).await
}

/// Runs the settle countdowns
#[embassy_executor::task]
async fn settle_alarm() {
    run_alarm(&SETTLE_ALARM, EVENTS.sender()).await
}

/// Runs the event handlers
#[embassy_executor::task]
async fn events(mut device: Dimmer) {
    dispatch(&mut device, EVENTS.receiver()).await
}

/// Main application entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // Initialize peripherals with default configuration
    let p = embassy_stm32::init(Default::default());
    info!("software PWM dimmer starting: {}", CONFIG);

    // Button on PB1 with pull-up, pressing pulls the line low
    let button = GpioButton::active_low(ExtiInput::new(p.PB1, p.EXTI1, Pull::Up));

    // Onboard LED (PC13), off at startup
    let indicator = GpioLed::active_low(Output::new(p.PC13, Level::High, Speed::Low));

    let device = unwrap!(Device::from_config(
        &CONFIG,
        &BUTTON_LINE,
        AlarmTimer::new(&SETTLE_ALARM),
        button.press_edge(),
        &DUTY,
        indicator,
    ));

    // TIM4 as free-running duty counter, LED on PA1
    let led = GpioLed::active_high(Output::new(p.PA1, Level::Low, Speed::Low));
    let mut pwm = SoftwarePwm::new(
        unwrap!(Stm32Timer::counter(Timer::new(p.TIM4), Channel::Ch1, &CONFIG)),
        led,
        CONFIG.pwm_tick_hz,
        CONFIG.pwm_period_ticks,
        &DUTY,
    );

    unwrap!(spawner.spawn(button_edges(button)));
    unwrap!(spawner.spawn(settle_alarm()));
    unwrap!(spawner.spawn(events(device)));

    // Poll the counter for the lifetime of the device
    software_pwm(&mut pwm).await
}
