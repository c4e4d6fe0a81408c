//! Compact snapshot of the user-adjustable touch settings
//!
//! Orientation, calibration and backlight level packed with postcard, small
//! enough to print on one log line and paste back into a host tool.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::backlight::Brightness;
use crate::config::{Calibration, OrientationFlags, TouchConfig};
use crate::error::TouchError;

/// Upper bound on the encoded size
pub const SETTINGS_MAX_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchSettings {
    pub flags: OrientationFlags,
    pub calibration: Calibration,
    pub brightness_percent: u8,
}

impl TouchSettings {
    /// Settings matching a freshly built config at full brightness
    pub fn from_config(config: &TouchConfig, calibration: Calibration) -> Self {
        Self {
            flags: config.flags,
            calibration,
            brightness_percent: Brightness::FULL.percent(),
        }
    }

    pub fn brightness(&self) -> Brightness {
        Brightness::from_percent(self.brightness_percent as i32)
    }

    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], TouchError> {
        postcard::to_slice(self, buf).map_err(|e| {
            warn!("Encoding touch settings failed: {:?}", e);
            TouchError::invalid("settings do not fit the buffer")
        })
    }

    /// Decode a snapshot. An out-of-range brightness is clamped.
    pub fn decode(bytes: &[u8]) -> Result<Self, TouchError> {
        let mut settings: Self = postcard::from_bytes(bytes).map_err(|e| {
            warn!("Decoding touch settings failed: {:?}", e);
            TouchError::invalid("corrupt settings")
        })?;
        settings.brightness_percent = settings.brightness().percent();
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_survive_encoding() {
        let config = TouchConfig::new(320, 240).with_swap_xy(true).with_mirror_x(true);
        let mut settings = TouchSettings::from_config(&config, Calibration::new(0, -81));
        settings.brightness_percent = 40;

        let mut buf = [0u8; SETTINGS_MAX_SIZE];
        let encoded = settings.encode(&mut buf).unwrap();
        assert_eq!(TouchSettings::decode(encoded).unwrap(), settings);
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        let settings = TouchSettings::from_config(&TouchConfig::new(320, 240), Calibration::NONE);
        let mut buf = [0u8; SETTINGS_MAX_SIZE];
        let len = settings.encode(&mut buf).unwrap().len();

        assert!(TouchSettings::decode(&buf[..len - 1]).is_err());
        assert!(TouchSettings::decode(&[]).is_err());
    }

    #[test]
    fn test_decode_clamps_brightness() {
        let mut settings = TouchSettings::from_config(&TouchConfig::new(320, 240), Calibration::NONE);
        settings.brightness_percent = 200;
        let mut buf = [0u8; SETTINGS_MAX_SIZE];
        let encoded = settings.encode(&mut buf).unwrap();

        assert_eq!(TouchSettings::decode(encoded).unwrap().brightness_percent, 100);
    }

    #[test]
    fn test_small_buffer_is_an_error() {
        let settings = TouchSettings::from_config(&TouchConfig::new(320, 240), Calibration::NONE);
        let mut buf = [0u8; 2];
        assert!(settings.encode(&mut buf).is_err());
    }
}
