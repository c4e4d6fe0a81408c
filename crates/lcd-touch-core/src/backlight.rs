//! Display backlight brightness

use log::{debug, error};

use crate::error::TouchError;

/// Full scale of the 10-bit PWM duty
pub const DUTY_MAX: u16 = 1023;

/// Brightness in percent, always within `0..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Brightness(u8);

impl Brightness {
    pub const OFF: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// Out-of-range requests are clamped rather than rejected
    pub const fn from_percent(percent: i32) -> Self {
        let clamped = if percent < 0 {
            0
        } else if percent > 100 {
            100
        } else {
            percent
        };
        Self(clamped as u8)
    }

    pub const fn percent(self) -> u8 {
        self.0
    }

    pub const fn duty(self) -> u16 {
        (DUTY_MAX as u32 * self.0 as u32 / 100) as u16
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::FULL
    }
}

/// PWM output that drives the backlight
pub trait BacklightPwm {
    /// Apply a raw duty in `0..=DUTY_MAX`
    fn set_duty(&mut self, duty: u16) -> Result<(), TouchError>;
}

pub struct Backlight<P> {
    pwm: P,
    brightness: Brightness,
}

impl<P: BacklightPwm> Backlight<P> {
    /// Wrap a PWM output. The output is left untouched until the first set.
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            brightness: Brightness::OFF,
        }
    }

    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    pub fn set_brightness(&mut self, percent: i32) -> Result<(), TouchError> {
        let brightness = Brightness::from_percent(percent);
        self.pwm.set_duty(brightness.duty()).inspect_err(|e| {
            error!("Setting backlight to {}% failed: {}", brightness.percent(), e);
        })?;
        debug!("Backlight {}% (duty {})", brightness.percent(), brightness.duty());
        self.brightness = brightness;
        Ok(())
    }

    pub fn on(&mut self) -> Result<(), TouchError> {
        self.set_brightness(100)
    }

    pub fn off(&mut self) -> Result<(), TouchError> {
        self.set_brightness(0)
    }
}
