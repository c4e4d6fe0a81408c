//! LEDC-driven display backlight

use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::ledc::channel::{self, ChannelHW, ChannelIFace};
use esp_hal::ledc::timer::{self, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::time::Rate;
use lcd_touch_core::backlight::{BacklightPwm, DUTY_MAX};
use lcd_touch_core::error::TouchError;
use log::error;
use static_cell::StaticCell;

use crate::board::BACKLIGHT_PWM_KHZ;

/// 10-bit low-speed LEDC channel on the backlight pin
pub struct LedcBacklight {
    channel: channel::Channel<'static, LowSpeed>,
}

impl LedcBacklight {
    /// Configure timer 0 and channel 1. The light starts off.
    pub fn new(
        ledc: esp_hal::peripherals::LEDC<'static>,
        pin: impl PeripheralOutput<'static>,
    ) -> Result<Self, TouchError> {
        static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
        static TIMER: StaticCell<timer::Timer<'static, LowSpeed>> = StaticCell::new();

        let ledc = LEDC.init(Ledc::new(ledc));
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
        let ledc: &'static Ledc<'static> = ledc;

        let pwm_timer = TIMER.init(ledc.timer::<LowSpeed>(timer::Number::Timer0));
        pwm_timer
            .configure(timer::config::Config {
                duty: timer::config::Duty::Duty10Bit,
                clock_source: timer::LSClockSource::APBClk,
                frequency: Rate::from_khz(BACKLIGHT_PWM_KHZ),
            })
            .map_err(|e| {
                error!("Backlight timer config failed: {:?}", e);
                TouchError::hardware("configure backlight timer")
            })?;
        let pwm_timer: &'static timer::Timer<'static, LowSpeed> = pwm_timer;

        let mut channel = ledc.channel(channel::Number::Channel1, pin);
        channel
            .configure(channel::config::Config {
                timer: pwm_timer,
                duty_pct: 0,
                pin_config: channel::config::PinConfig::PushPull,
            })
            .map_err(|e| {
                error!("Backlight channel config failed: {:?}", e);
                TouchError::hardware("configure backlight channel")
            })?;

        let mut backlight = Self { channel };
        backlight.set_duty(0)?;
        Ok(backlight)
    }
}

impl BacklightPwm for LedcBacklight {
    fn set_duty(&mut self, duty: u16) -> Result<(), TouchError> {
        // The backlight driver is active low: full duty means dark
        let inverted = DUTY_MAX - duty.min(DUTY_MAX);
        self.channel.set_duty_hw(inverted as u32);
        Ok(())
    }
}
