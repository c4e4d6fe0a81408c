//! Tilt angles from a static accelerometer reading

use core::fmt::Write;

use heapless::String;
use libm::{atanf, copysignf, sqrtf};

use crate::qmi8658::ImuSample;

const RAD_TO_DEG: f32 = 57.29578;

/// Capacity of the formatted readout
pub const LABEL_CAPACITY: usize = 64;

/// Inclination of each axis against gravity, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TiltAngles {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl TiltAngles {
    pub fn from_acceleration(ax: i16, ay: i16, az: i16) -> Self {
        let (ax, ay, az) = (ax as f32, ay as f32, az as f32);
        Self {
            x: ratio_angle(ax, sqrtf(ay * ay + az * az)),
            y: ratio_angle(ay, sqrtf(ax * ax + az * az)),
            z: ratio_angle(sqrtf(ax * ax + ay * ay), az),
        }
    }

    pub fn from_sample(sample: &ImuSample) -> Self {
        Self::from_acceleration(sample.acc[0], sample.acc[1], sample.acc[2])
    }

    /// Readout text, e.g. `qmi8658: X:0.0° Y:0.0° Z:0.0°`
    pub fn label(&self) -> String<LABEL_CAPACITY> {
        let mut text = String::new();
        // Worst case ("-90.0" per axis) fits the capacity
        let _ = write!(text, "qmi8658: X:{:.1}° Y:{:.1}° Z:{:.1}°", self.x, self.y, self.z);
        text
    }
}

/// `atan(num / den)` in degrees, with a zero denominator read as +-90°
fn ratio_angle(num: f32, den: f32) -> f32 {
    if den == 0.0 {
        if num == 0.0 {
            0.0
        } else {
            copysignf(90.0, num)
        }
    } else {
        atanf(num / den) * RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        libm::fabsf(a - b) < 0.05
    }

    #[test]
    fn test_flat_board() {
        let angles = TiltAngles::from_acceleration(0, 0, 8192);
        assert!(close(angles.x, 0.0));
        assert!(close(angles.y, 0.0));
        assert!(close(angles.z, 0.0));
    }

    #[test]
    fn test_forty_five_degrees_about_y() {
        let angles = TiltAngles::from_acceleration(4096, 0, 4096);
        assert!(close(angles.x, 45.0), "{angles:?}");
        assert!(close(angles.y, 0.0), "{angles:?}");
        assert!(close(angles.z, 45.0), "{angles:?}");
    }

    #[test]
    fn test_upside_down_gives_negative_z() {
        let angles = TiltAngles::from_acceleration(4096, 0, -4096);
        assert!(close(angles.z, -45.0), "{angles:?}");
    }

    #[test]
    fn test_standing_on_edge() {
        let angles = TiltAngles::from_acceleration(8192, 0, 0);
        assert!(close(angles.x, 90.0));
        assert!(close(angles.z, 90.0));

        let still = TiltAngles::from_acceleration(0, 0, 0);
        assert_eq!(still, TiltAngles::default());
    }

    #[test]
    fn test_label_format() {
        let angles = TiltAngles {
            x: 12.34,
            y: -5.0,
            z: 90.0,
        };
        assert_eq!(angles.label().as_str(), "qmi8658: X:12.3° Y:-5.0° Z:90.0°");

        let worst = TiltAngles {
            x: -90.0,
            y: -90.0,
            z: -90.0,
        };
        assert_eq!(worst.label().as_str(), "qmi8658: X:-90.0° Y:-90.0° Z:-90.0°");
    }
}
