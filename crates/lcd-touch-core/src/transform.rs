//! Software orientation transforms
//!
//! Applied per point in a fixed order: mirror-x, mirror-y, then swap. Mirrors
//! are computed against the axis bounds the flags were declared for, before
//! the axes are exchanged. A calibration offset is added to the oriented
//! point, and only then is the result clamped into the display bounds.

use crate::config::{Calibration, OrientationFlags};
use crate::controller::CapabilitySet;

/// The transforms that must be done in software for one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoftwareTransform {
    pub mirror_x: bool,
    pub mirror_y: bool,
    pub swap_xy: bool,
}

impl SoftwareTransform {
    /// A requested flag needs software only when the controller can't do it
    pub const fn resolve(flags: OrientationFlags, capabilities: CapabilitySet) -> Self {
        Self {
            mirror_x: flags.mirror_x && !capabilities.mirror_x,
            mirror_y: flags.mirror_y && !capabilities.mirror_y,
            swap_xy: flags.swap_xy && !capabilities.swap_xy,
        }
    }

    pub const fn is_identity(&self) -> bool {
        !(self.mirror_x || self.mirror_y || self.swap_xy)
    }

    /// Transform one coordinate pair and clamp it into `[0, x_max) x [0, y_max)`
    pub fn apply(&self, x: u16, y: u16, x_max: u16, y_max: u16) -> (u16, u16) {
        self.apply_with_offset(x, y, x_max, y_max, Calibration::NONE)
    }

    /// Transform, shift by `offset`, then clamp.
    ///
    /// The shift happens on the unclamped oriented point, so a panel whose
    /// oriented axis overshoots the display can still be moved back onto it.
    pub fn apply_with_offset(
        &self,
        x: u16,
        y: u16,
        x_max: u16,
        y_max: u16,
        offset: Calibration,
    ) -> (u16, u16) {
        let (x, y) = self.orient(x, y, x_max, y_max);
        (
            offset_into_bound(x, offset.x_offset, x_max),
            offset_into_bound(y, offset.y_offset, y_max),
        )
    }

    fn orient(&self, x: u16, y: u16, x_max: u16, y_max: u16) -> (u16, u16) {
        let mut x = x;
        let mut y = y;

        if self.mirror_x {
            x = mirror(x, x_max);
        }
        if self.mirror_y {
            y = mirror(y, y_max);
        }
        if self.swap_xy {
            core::mem::swap(&mut x, &mut y);
        }

        (x, y)
    }
}

/// Reflect `value` across `max`. Values past `max` saturate at zero.
pub const fn mirror(value: u16, max: u16) -> u16 {
    max.saturating_sub(value)
}

/// Saturate `value` into `[0, bound)`. `bound` must be non-zero.
pub const fn clamp_to_bound(value: u16, bound: u16) -> u16 {
    if value >= bound { bound - 1 } else { value }
}

/// Shift `value` by a signed offset and saturate into `[0, bound)`
pub fn offset_into_bound(value: u16, offset: i16, bound: u16) -> u16 {
    let shifted = (value as i32 + offset as i32).clamp(0, u16::MAX as i32);
    clamp_to_bound(shifted as u16, bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    const X_MAX: u16 = 320;
    const Y_MAX: u16 = 240;

    fn all_flag_combinations() -> impl Iterator<Item = OrientationFlags> {
        (0u8..8).map(|bits| OrientationFlags::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0))
    }

    #[test]
    fn test_mirror_twice_is_identity() {
        for x in 0..=X_MAX {
            assert_eq!(mirror(mirror(x, X_MAX), X_MAX), x);
        }
    }

    #[test]
    fn test_mirror_x_example() {
        let transform = SoftwareTransform::resolve(
            OrientationFlags::new(false, true, false),
            CapabilitySet::NONE,
        );
        assert_eq!(transform.apply(300, 50, X_MAX, Y_MAX), (20, 50));
    }

    #[test]
    fn test_swap_examples() {
        let transform = SoftwareTransform::resolve(
            OrientationFlags::new(true, false, false),
            CapabilitySet::NONE,
        );
        assert_eq!(transform.apply(10, 10, X_MAX, Y_MAX), (10, 10));
        assert_eq!(transform.apply(10, 200, X_MAX, Y_MAX), (200, 10));
    }

    #[test]
    fn test_mirror_happens_before_swap() {
        let transform = SoftwareTransform::resolve(
            OrientationFlags::new(true, true, false),
            CapabilitySet::NONE,
        );
        // x mirrored against x_max first (320 - 100 = 220), then exchanged with y
        assert_eq!(transform.apply(100, 30, X_MAX, Y_MAX), (30, 220));
    }

    #[test]
    fn test_every_combination_stays_in_bounds_and_is_deterministic() {
        for flags in all_flag_combinations() {
            let transform = SoftwareTransform::resolve(flags, CapabilitySet::NONE);
            for x in (0..X_MAX).step_by(7) {
                for y in (0..Y_MAX).step_by(5) {
                    let first = transform.apply(x, y, X_MAX, Y_MAX);
                    let second = transform.apply(x, y, X_MAX, Y_MAX);
                    assert_eq!(first, second);
                    assert!(first.0 < X_MAX, "{flags:?} ({x},{y}) -> {first:?}");
                    assert!(first.1 < Y_MAX, "{flags:?} ({x},{y}) -> {first:?}");
                }
            }
        }
    }

    #[test]
    fn test_hardware_capabilities_suppress_software() {
        let flags = OrientationFlags::new(true, true, true);
        let transform = SoftwareTransform::resolve(flags, CapabilitySet::ALL);
        assert!(transform.is_identity());
        assert_eq!(transform.apply(300, 50, X_MAX, Y_MAX), (300, 50));

        let partial = SoftwareTransform::resolve(
            flags,
            CapabilitySet {
                mirror_x: true,
                ..CapabilitySet::NONE
            },
        );
        assert!(!partial.mirror_x);
        assert!(partial.mirror_y);
        assert!(partial.swap_xy);
    }

    #[test]
    fn test_out_of_range_saturates() {
        // Raw value larger than the bound: mirror gives 0 rather than wrapping
        let mirror_x = SoftwareTransform::resolve(
            OrientationFlags::new(false, true, false),
            CapabilitySet::NONE,
        );
        assert_eq!(mirror_x.apply(400, 10, X_MAX, Y_MAX), (0, 10));

        // Raw zero mirrors onto the bound itself, which is clamped inside
        assert_eq!(mirror_x.apply(0, 10, X_MAX, Y_MAX), (X_MAX - 1, 10));

        // Without any transform, out-of-range input is still clamped
        let identity = SoftwareTransform::default();
        assert_eq!(identity.apply(5000, 5000, X_MAX, Y_MAX), (X_MAX - 1, Y_MAX - 1));
    }

    #[test]
    fn test_offset_applies_before_clamp() {
        // Board mount: swap + mirror_x puts y in 80..320 before the -81 shift
        let transform = SoftwareTransform::resolve(
            OrientationFlags::new(true, true, false),
            CapabilitySet::NONE,
        );
        let board = Calibration::new(0, -81);
        assert_eq!(transform.apply_with_offset(10, 100, X_MAX, Y_MAX, board), (100, 229));
        assert_eq!(transform.apply_with_offset(300, 5, X_MAX, Y_MAX, board), (5, 0));
        assert_eq!(transform.apply_with_offset(1, 5, X_MAX, Y_MAX, board), (5, 238));
    }

    #[test]
    fn test_offset_into_bound_saturates_both_ways() {
        assert_eq!(offset_into_bound(10, -81, Y_MAX), 0);
        assert_eq!(offset_into_bound(300, 20, X_MAX), X_MAX - 1);
        assert_eq!(offset_into_bound(u16::MAX, i16::MAX, X_MAX), X_MAX - 1);
        assert_eq!(offset_into_bound(50, 0, Y_MAX), 50);
    }

    #[test]
    fn test_swap_clamps_against_output_bounds() {
        let transform = SoftwareTransform::resolve(
            OrientationFlags::new(true, false, false),
            CapabilitySet::NONE,
        );
        // Raw x=300 becomes y, which must fit under y_max
        assert_eq!(transform.apply(300, 20, X_MAX, Y_MAX), (20, Y_MAX - 1));
    }
}
