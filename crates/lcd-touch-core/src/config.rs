//! Touch panel configuration
//!
//! A [`TouchConfig`] is built once when the driver is brought up and is only
//! changed afterwards through the orientation setters on
//! [`TouchNormalizer`](crate::normalizer::TouchNormalizer).

use serde::{Deserialize, Serialize};

use crate::error::TouchError;

/// Electrical level at which a reset or interrupt line is asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActiveLevel {
    #[default]
    Low,
    High,
}

impl ActiveLevel {
    /// Level to drive when asserting the line
    pub const fn asserted(self) -> bool {
        matches!(self, Self::High)
    }
}

/// A GPIO line wired to the touch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinConfig {
    /// GPIO number on the host MCU (or expander port)
    pub gpio: u8,
    /// Level at which the line is considered active
    pub active_level: ActiveLevel,
}

impl PinConfig {
    pub const fn active_low(gpio: u8) -> Self {
        Self {
            gpio,
            active_level: ActiveLevel::Low,
        }
    }

    pub const fn active_high(gpio: u8) -> Self {
        Self {
            gpio,
            active_level: ActiveLevel::High,
        }
    }
}

/// Orientation intents requested by the user.
///
/// These say what the application wants, not who performs it. Whether a flag
/// is honoured by the controller or in software is decided per poll from the
/// driver's [`CapabilitySet`](crate::controller::CapabilitySet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrientationFlags {
    pub swap_xy: bool,
    pub mirror_x: bool,
    pub mirror_y: bool,
}

impl OrientationFlags {
    pub const NONE: Self = Self {
        swap_xy: false,
        mirror_x: false,
        mirror_y: false,
    };

    pub const fn new(swap_xy: bool, mirror_x: bool, mirror_y: bool) -> Self {
        Self {
            swap_xy,
            mirror_x,
            mirror_y,
        }
    }

    /// Whether any transform is requested at all
    pub const fn any(&self) -> bool {
        self.swap_xy || self.mirror_x || self.mirror_y
    }
}

/// Static configuration of one touch panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchConfig {
    /// Horizontal resolution in display pixels
    pub x_max: u16,
    /// Vertical resolution in display pixels
    pub y_max: u16,
    /// Requested orientation transforms
    pub flags: OrientationFlags,
    /// Controller reset line, if wired
    pub reset_pin: Option<PinConfig>,
    /// Controller interrupt line; `None` means the panel is polled
    pub interrupt_pin: Option<PinConfig>,
}

impl TouchConfig {
    /// Configuration for a polled panel with no orientation transforms
    pub const fn new(x_max: u16, y_max: u16) -> Self {
        Self {
            x_max,
            y_max,
            flags: OrientationFlags::NONE,
            reset_pin: None,
            interrupt_pin: None,
        }
    }

    pub const fn with_flags(mut self, flags: OrientationFlags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn with_swap_xy(mut self, swap: bool) -> Self {
        self.flags.swap_xy = swap;
        self
    }

    pub const fn with_mirror_x(mut self, mirror: bool) -> Self {
        self.flags.mirror_x = mirror;
        self
    }

    pub const fn with_mirror_y(mut self, mirror: bool) -> Self {
        self.flags.mirror_y = mirror;
        self
    }

    pub const fn with_reset_pin(mut self, pin: PinConfig) -> Self {
        self.reset_pin = Some(pin);
        self
    }

    pub const fn with_interrupt_pin(mut self, pin: PinConfig) -> Self {
        self.interrupt_pin = Some(pin);
        self
    }

    /// True when no interrupt line is configured
    pub const fn is_polling(&self) -> bool {
        self.interrupt_pin.is_none()
    }

    /// Check the invariants a normalizer relies on
    pub fn validate(&self) -> Result<(), TouchError> {
        if self.x_max == 0 {
            return Err(TouchError::invalid("x_max must be greater than zero"));
        }
        if self.y_max == 0 {
            return Err(TouchError::invalid("y_max must be greater than zero"));
        }
        Ok(())
    }
}

/// Display-space offset applied by the normalizer.
///
/// Some panels report a constant shift relative to the display they are glued
/// to. The offset is added after orientation transforms and before the point
/// is clamped into the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Calibration {
    pub x_offset: i16,
    pub y_offset: i16,
}

impl Calibration {
    pub const NONE: Self = Self {
        x_offset: 0,
        y_offset: 0,
    };

    pub const fn new(x_offset: i16, y_offset: i16) -> Self {
        Self { x_offset, y_offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bounds_rejected() {
        assert!(matches!(
            TouchConfig::new(0, 240).validate(),
            Err(TouchError::InvalidArgument { .. })
        ));
        assert!(matches!(
            TouchConfig::new(320, 0).validate(),
            Err(TouchError::InvalidArgument { .. })
        ));
        assert!(TouchConfig::new(320, 240).validate().is_ok());
    }

    #[test]
    fn test_builder_sets_flags_and_pins() {
        let config = TouchConfig::new(320, 240)
            .with_swap_xy(true)
            .with_mirror_x(true)
            .with_interrupt_pin(PinConfig::active_low(3));

        assert_eq!(config.flags, OrientationFlags::new(true, true, false));
        assert!(!config.is_polling());
        assert_eq!(config.interrupt_pin.map(|p| p.gpio), Some(3));
        assert!(config.reset_pin.is_none());
    }

    #[test]
    fn test_active_level() {
        assert!(!ActiveLevel::Low.asserted());
        assert!(ActiveLevel::High.asserted());
        assert_eq!(PinConfig::active_high(7).active_level, ActiveLevel::High);
    }
}
