pub mod alarm_timer;
pub mod gpio_button;
pub mod gpio_led;
pub mod traits;

#[cfg(feature = "stm32f103")]
pub mod timer;
