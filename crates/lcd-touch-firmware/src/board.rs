//! Board wiring and build-time settings
//!
//! Pin assignments for the ESP32-S3 board with the 320x240 SPI panel and the
//! FT5x06-family touch controller. User-tunable values come from `.env` at
//! build time (see `build.rs`).

use lcd_touch_core::backlight::Brightness;
use lcd_touch_core::config::{Calibration, OrientationFlags, PinConfig, TouchConfig};
use log::warn;

pub const DISPLAY_WIDTH: u16 = 320;
pub const DISPLAY_HEIGHT: u16 = 240;

/// Shared bus for the touch controller and the IMU
pub const I2C_FREQUENCY_KHZ: u32 = 400;
pub const I2C_SDA_GPIO: u8 = 1;
pub const I2C_SCL_GPIO: u8 = 2;

pub const BACKLIGHT_GPIO: u8 = 42;
pub const BACKLIGHT_PWM_KHZ: u32 = 5;

pub const IMU_PERIOD_MS: u64 = 1000;
/// WHO_AM_I polls before the IMU is given up on
pub const IMU_PROBE_ATTEMPTS: u8 = 5;

const DEFAULT_POLL_MS: u64 = 20;

/// The panel's oriented Y axis runs 81 rows past the display's
const DEFAULT_Y_OFFSET: i16 = -81;

/// Settings baked in from `.env`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSettings {
    pub flags: OrientationFlags,
    pub calibration: Calibration,
    pub poll_ms: u64,
    pub interrupt_gpio: Option<u8>,
    pub brightness: Brightness,
}

impl BoardSettings {
    pub fn from_build_env() -> Self {
        Self::parse(
            env!("TOUCH_SWAP_XY"),
            env!("TOUCH_MIRROR_X"),
            env!("TOUCH_MIRROR_Y"),
            env!("TOUCH_X_OFFSET"),
            env!("TOUCH_Y_OFFSET"),
            env!("TOUCH_POLL_MS"),
            env!("TOUCH_INT_GPIO"),
            env!("BACKLIGHT_PERCENT"),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn parse(
        swap_xy: &str,
        mirror_x: &str,
        mirror_y: &str,
        x_offset: &str,
        y_offset: &str,
        poll_ms: &str,
        interrupt_gpio: &str,
        backlight: &str,
    ) -> Self {
        Self {
            flags: OrientationFlags::new(
                parse_flag("TOUCH_SWAP_XY", swap_xy),
                parse_flag("TOUCH_MIRROR_X", mirror_x),
                parse_flag("TOUCH_MIRROR_Y", mirror_y),
            ),
            calibration: Calibration::new(
                parse_or("TOUCH_X_OFFSET", x_offset, 0),
                parse_or("TOUCH_Y_OFFSET", y_offset, DEFAULT_Y_OFFSET),
            ),
            poll_ms: parse_or("TOUCH_POLL_MS", poll_ms, DEFAULT_POLL_MS).max(1),
            interrupt_gpio: match interrupt_gpio.trim() {
                "" => None,
                value => value.parse().ok().or_else(|| {
                    warn!("TOUCH_INT_GPIO={} is not a GPIO number, polling instead", value);
                    None
                }),
            },
            brightness: Brightness::from_percent(parse_or("BACKLIGHT_PERCENT", backlight, 100)),
        }
    }

    /// Normalizer configuration for this board
    pub fn touch_config(&self) -> TouchConfig {
        let config = TouchConfig::new(DISPLAY_WIDTH, DISPLAY_HEIGHT).with_flags(self.flags);
        match self.interrupt_gpio {
            Some(gpio) => config.with_interrupt_pin(PinConfig::active_low(gpio)),
            None => config,
        }
    }
}

fn parse_flag(key: &str, value: &str) -> bool {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" => true,
        "0" | "false" | "FALSE" | "no" | "" => false,
        other => {
            warn!("{}={} is not a boolean, using false", key, other);
            false
        }
    }
}

fn parse_or<T: core::str::FromStr>(key: &str, value: &str, default: T) -> T {
    value.trim().parse().unwrap_or_else(|_| {
        warn!("{}={} could not be parsed, using the default", key, value);
        default
    })
}
