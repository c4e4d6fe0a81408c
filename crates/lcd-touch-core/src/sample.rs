//! Raw and normalized touch frames

use embedded_graphics::prelude::Point;
use heapless::Vec;

/// Most contacts any supported controller reports in one frame
pub const MAX_TOUCH_POINTS: usize = 5;

/// One contact as reported by the controller, in sensor coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawPoint {
    pub x: u16,
    pub y: u16,
    /// Pressure or contact area, when the controller reports one
    pub strength: Option<u16>,
}

impl RawPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            strength: None,
        }
    }

    pub const fn with_strength(mut self, strength: u16) -> Self {
        self.strength = Some(strength);
        self
    }
}

/// One frame of raw controller output.
///
/// The contact count is the number of stored points, so a frame can never
/// claim more contacts than it carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TouchSample {
    points: Vec<RawPoint, MAX_TOUCH_POINTS>,
}

impl TouchSample {
    /// A frame with no contacts
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Build a frame from a slice, keeping at most [`MAX_TOUCH_POINTS`]
    pub fn from_points(points: &[RawPoint]) -> Self {
        let mut sample = Self::empty();
        for point in points.iter().take(MAX_TOUCH_POINTS) {
            sample.push(*point);
        }
        sample
    }

    /// Append a contact. Returns `false` if the frame is full.
    pub fn push(&mut self, point: RawPoint) -> bool {
        self.points.push(point).is_ok()
    }

    pub fn contact_count(&self) -> u8 {
        self.points.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[RawPoint] {
        &self.points
    }

    /// Mutable access for coordinate post-processors
    pub fn points_mut(&mut self) -> &mut [RawPoint] {
        &mut self.points
    }

    /// Drop contacts beyond `len`
    pub fn truncate(&mut self, len: usize) {
        self.points.truncate(len);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// A contact in display coordinates, inside `[0, x_max) x [0, y_max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizedPoint {
    pub x: u16,
    pub y: u16,
    pub strength: Option<u16>,
}

impl NormalizedPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            strength: None,
        }
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

/// Result of one [`get_coordinates`](crate::normalizer::TouchNormalizer::get_coordinates) poll
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TouchReport {
    /// Whether the controller reported at least one contact
    pub touched: bool,
    /// Transformed points, at most the requested maximum
    pub points: Vec<NormalizedPoint, MAX_TOUCH_POINTS>,
}

impl TouchReport {
    pub const fn released() -> Self {
        Self {
            touched: false,
            points: Vec::new(),
        }
    }

    /// First contact, which single-pointer consumers use
    pub fn primary(&self) -> Option<NormalizedPoint> {
        self.points.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_caps_at_max() {
        let raw = [RawPoint::new(1, 1); MAX_TOUCH_POINTS + 2];
        let sample = TouchSample::from_points(&raw);
        assert_eq!(sample.contact_count() as usize, MAX_TOUCH_POINTS);
    }

    #[test]
    fn test_push_reports_full_frame() {
        let mut sample = TouchSample::empty();
        for i in 0..MAX_TOUCH_POINTS {
            assert!(sample.push(RawPoint::new(i as u16, 0)));
        }
        assert!(!sample.push(RawPoint::new(99, 99)));
        assert_eq!(sample.points()[4].x, 4);
    }

    #[test]
    fn test_released_report_has_no_primary() {
        let report = TouchReport::released();
        assert!(!report.touched);
        assert!(report.primary().is_none());
    }

    #[test]
    fn test_to_point() {
        assert_eq!(NormalizedPoint::new(12, 34).to_point(), Point::new(12, 34));
    }
}
