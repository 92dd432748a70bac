//! STM32F103 Blue Pill Hardware PWM Dimmer
//! =============================================================================================
//!
//! Each debounced press of the button steps the LED brightness up one ramp
//! step (linear by default, logarithmic with the `log-ramp` feature). TIM3
//! generates the PWM waveform by itself; the CPU only rewrites the compare
//! register on a press and otherwise sleeps.
//!
//! Hardware Connections:
//!   Button:
//!      PB1  -> button -> GND (internal pull-up)
//!
//!   LED:
//!      PA6 (TIM3_CH1) -> 1k resistor -> LED -> GND
//!      PC13 onboard LED: lit while a button edge is settling
//!
//! Run with `cargo run --release --features stm32f103 --bin hardware_pwm`

#![no_std]
#![no_main]

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_stm32::{
    exti::ExtiInput,
    gpio::{Level, Output, OutputType, Pull, Speed},
    timer::{Channel, low_level::Timer, simple_pwm::PwmPin},
};
use pwm_dimmer::{
    Config, Device,
    event::EventChannel,
    hardware::{
        alarm_timer::{AlarmState, AlarmTimer, run_alarm},
        gpio_button::{ButtonLine, GpioButton, watch_edges},
        gpio_led::GpioLed,
        timer::Stm32Timer,
        traits::Edge,
    },
    pwm::{HardwarePwm, PwmStrategy},
    runtime::dispatch,
};
use {defmt_rtt as _, panic_probe as _}; // Logging and panic handlers

const CONFIG: Config = Config::new(PwmStrategy::Hardware);

// Events posted by the edge watcher and the settle alarm
static EVENTS: EventChannel = EventChannel::new();

// Edge notification state of the button line
static BUTTON_LINE: ButtonLine = ButtonLine::new(Edge::Falling);

// Settle countdown driven by the embassy time driver
static SETTLE_ALARM: AlarmState = AlarmState::new();

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

/// Main application entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // Initialize peripherals with default configuration
    let p = embassy_stm32::init(Default::default());
    info!("hardware PWM dimmer starting: {}", CONFIG);

    // Button on PB1 with pull-up, pressing pulls the line low
    let button = GpioButton::active_low(ExtiInput::new(p.PB1, p.EXTI1, Pull::Up));

    // TIM3_CH1 drives the LED on PA6
    let _led_pin = PwmPin::new_ch1(p.PA6, OutputType::PushPull);
    let pwm = HardwarePwm::new(
        unwrap!(Stm32Timer::pwm_output(Timer::new(p.TIM3), Channel::Ch1, &CONFIG)),
        CONFIG.pwm_tick_hz,
        CONFIG.pwm_period_ticks,
        unwrap!(CONFIG.initial_duty_cycle()),
    );

    // Onboard LED (PC13), off at startup
    let indicator = GpioLed::active_low(Output::new(p.PC13, Level::High, Speed::Low));

    let mut device = unwrap!(Device::from_config(
        &CONFIG,
        &BUTTON_LINE,
        AlarmTimer::new(&SETTLE_ALARM),
        button.press_edge(),
        pwm,
        indicator,
    ));

    unwrap!(spawner.spawn(button_edges(button)));
    unwrap!(spawner.spawn(settle_alarm()));

    // Handle events; the executor sleeps in between
    dispatch(&mut device, EVENTS.receiver()).await
}
