//! Pointer input adapter
//!
//! Bridges a [`TouchNormalizer`] to a GUI input layer that polls one pointer
//! on a fixed cadence. Read failures never reach the GUI: they are logged and
//! reported as a release, and the next poll simply tries again.

use log::{debug, info, warn};

use crate::config::Calibration;
use crate::controller::TouchController;
use crate::error::TouchError;
use crate::normalizer::{CoordinateProcessor, NoProcessing, TouchNormalizer};
use crate::sample::NormalizedPoint;

/// Polls between "still alive" debug lines
const HEARTBEAT_POLLS: u32 = 1000;

/// Read failures that are logged before going quiet
const MAX_LOGGED_FAILURES: u32 = 100;

/// What the input layer sees on each poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerState {
    Pressed(NormalizedPoint),
    Released,
}

impl PointerState {
    pub fn is_pressed(&self) -> bool {
        matches!(self, Self::Pressed(_))
    }
}

/// Edge-aware pointer events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// Finger went down
    Press(NormalizedPoint),
    /// Finger moved while down
    Drag(NormalizedPoint),
    /// Finger lifted; carries the last reported position
    Release(NormalizedPoint),
}

/// Single-pointer input device backed by a touch normalizer
pub struct PointerInput<C, P = NoProcessing> {
    touch: TouchNormalizer<C, P>,
    pressed: bool,
    last_point: NormalizedPoint,
    polls: u32,
    read_failures: u32,
}

impl<C, P> PointerInput<C, P>
where
    C: TouchController,
    P: CoordinateProcessor,
{
    /// Take over `touch`, installing `calibration` as its display offset
    pub fn new(mut touch: TouchNormalizer<C, P>, calibration: Calibration) -> Self {
        touch.set_calibration(calibration);
        Self {
            touch,
            pressed: false,
            last_point: NormalizedPoint::default(),
            polls: 0,
            read_failures: 0,
        }
    }

    pub fn normalizer(&self) -> &TouchNormalizer<C, P> {
        &self.touch
    }

    pub fn normalizer_mut(&mut self) -> &mut TouchNormalizer<C, P> {
        &mut self.touch
    }

    pub fn calibration(&self) -> Calibration {
        self.touch.calibration()
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.touch.set_calibration(calibration);
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Total read failures since creation
    pub fn read_failures(&self) -> u32 {
        self.read_failures
    }

    /// Whether this poll should hit the bus.
    ///
    /// Polled panels are always read. With an interrupt attached, the bus is
    /// read when the line fired, and on every poll while a finger is down so
    /// the release is seen. Consumes the pending notification.
    pub fn take_read_request(&mut self) -> bool {
        match self.touch.notifier() {
            None => true,
            Some(notifier) => notifier.take() || self.pressed,
        }
    }

    /// Sleep until the next poll should hit the bus.
    ///
    /// Returns at once for polled panels and while a finger is down. With an
    /// interrupt attached and the panel idle, waits for the line to fire and
    /// consumes that notification.
    pub async fn wait_for_read_request(&mut self) {
        if let Some(notifier) = self.touch.notifier() {
            if !self.pressed {
                notifier.wait().await;
            }
        }
    }

    /// One read at startup to confirm the controller answers
    pub async fn self_test(&mut self) -> Result<(), TouchError> {
        match self.touch.get_coordinates(1).await {
            Ok(report) => {
                info!(
                    "Touch communication test passed, currently {}",
                    if report.touched { "touched" } else { "not touched" }
                );
                Ok(())
            }
            Err(e) => {
                warn!("Touch communication test failed: {}", e);
                Err(e)
            }
        }
    }

    /// Poll the panel for the input layer
    pub async fn read(&mut self) -> PointerState {
        self.polls = self.polls.wrapping_add(1);
        if self.polls % HEARTBEAT_POLLS == 0 {
            debug!("Touch read called {} times", self.polls);
        }

        let report = match self.touch.get_coordinates(1).await {
            Ok(report) => report,
            Err(e) => {
                if self.read_failures < MAX_LOGGED_FAILURES {
                    warn!("Touch read failed: {} (failure #{})", e, self.read_failures + 1);
                }
                self.read_failures = self.read_failures.saturating_add(1);
                self.pressed = false;
                return PointerState::Released;
            }
        };

        match report.primary() {
            Some(point) if report.touched => {
                debug!("Touch at ({}, {})", point.x, point.y);
                self.pressed = true;
                self.last_point = point;
                PointerState::Pressed(point)
            }
            _ => {
                self.pressed = false;
                PointerState::Released
            }
        }
    }

    /// Poll and translate the state change into an event, if any
    pub async fn poll_event(&mut self) -> Option<TouchEvent> {
        let was_pressed = self.pressed;
        let previous = self.last_point;

        match (was_pressed, self.read().await) {
            (false, PointerState::Pressed(point)) => Some(TouchEvent::Press(point)),
            (true, PointerState::Pressed(point)) => Some(TouchEvent::Drag(point)),
            (true, PointerState::Released) => Some(TouchEvent::Release(previous)),
            (false, PointerState::Released) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PinConfig, TouchConfig};
    use crate::interrupt::TouchNotifier;
    use crate::sample::RawPoint;
    use crate::test_support::ScriptedController;
    use embassy_futures::block_on;

    fn pointer(controller: ScriptedController, calibration: Calibration) -> PointerInput<ScriptedController> {
        let touch = TouchNormalizer::new(controller, TouchConfig::new(320, 240)).unwrap();
        PointerInput::new(touch, calibration)
    }

    #[test]
    fn test_read_reports_first_point() {
        let mut controller = ScriptedController::new();
        controller.push_points(&[RawPoint::new(40, 60), RawPoint::new(100, 100)]);
        let mut input = pointer(controller, Calibration::NONE);

        assert_eq!(
            block_on(input.read()),
            PointerState::Pressed(NormalizedPoint::new(40, 60))
        );
        assert!(input.is_pressed());
    }

    #[test]
    fn test_read_failure_degrades_to_released() {
        let mut controller = ScriptedController::new();
        controller.push_points(&[RawPoint::new(40, 60)]);
        controller.push_error(TouchError::io("read touch points"));
        let mut input = pointer(controller, Calibration::NONE);

        assert!(block_on(input.read()).is_pressed());
        assert_eq!(block_on(input.read()), PointerState::Released);
        assert!(!input.is_pressed());
        assert_eq!(input.read_failures(), 1);
    }

    #[test]
    fn test_calibration_offset_is_clamped_to_display() {
        let mut controller = ScriptedController::new();
        controller.push_points(&[RawPoint::new(10, 84)]);
        controller.push_points(&[RawPoint::new(10, 40)]);
        controller.push_points(&[RawPoint::new(315, 200)]);
        let mut input = pointer(controller, Calibration::new(0, -81));

        assert_eq!(
            block_on(input.read()),
            PointerState::Pressed(NormalizedPoint::new(10, 3))
        );
        assert_eq!(
            block_on(input.read()),
            PointerState::Pressed(NormalizedPoint::new(10, 0))
        );

        input.set_calibration(Calibration::new(10, 0));
        assert_eq!(
            block_on(input.read()),
            PointerState::Pressed(NormalizedPoint::new(319, 200))
        );
    }

    #[test]
    fn test_board_offset_reaches_lower_rows() {
        // Swap + mirror_x leaves y in 80..320; the -81 offset must act on
        // that range before it is clamped to the 240 row display
        let mut controller = ScriptedController::new();
        controller.push_points(&[RawPoint::new(10, 100)]);
        controller.push_points(&[RawPoint::new(2, 60)]);
        let config = TouchConfig::new(320, 240).with_swap_xy(true).with_mirror_x(true);
        let touch = TouchNormalizer::new(controller, config).unwrap();
        let mut input = PointerInput::new(touch, Calibration::new(0, -81));

        assert_eq!(input.calibration(), Calibration::new(0, -81));
        assert_eq!(
            block_on(input.read()),
            PointerState::Pressed(NormalizedPoint::new(100, 229))
        );
        assert_eq!(
            block_on(input.read()),
            PointerState::Pressed(NormalizedPoint::new(60, 237))
        );
    }

    #[test]
    fn test_event_sequence() {
        let mut controller = ScriptedController::new();
        controller.push_points(&[RawPoint::new(10, 10)]);
        controller.push_points(&[RawPoint::new(12, 15)]);
        controller.push_empty();
        controller.push_empty();
        let mut input = pointer(controller, Calibration::NONE);

        assert_eq!(
            block_on(input.poll_event()),
            Some(TouchEvent::Press(NormalizedPoint::new(10, 10)))
        );
        assert_eq!(
            block_on(input.poll_event()),
            Some(TouchEvent::Drag(NormalizedPoint::new(12, 15)))
        );
        assert_eq!(
            block_on(input.poll_event()),
            Some(TouchEvent::Release(NormalizedPoint::new(12, 15)))
        );
        assert_eq!(block_on(input.poll_event()), None);
    }

    #[test]
    fn test_polling_mode_always_reads() {
        let mut input = pointer(ScriptedController::new(), Calibration::NONE);
        assert!(input.take_read_request());
        assert!(input.take_read_request());
        // A polled panel is never parked
        block_on(input.wait_for_read_request());
    }

    #[test]
    fn test_interrupt_mode_reads_on_notification_or_while_pressed() {
        static NOTIFIER: TouchNotifier = TouchNotifier::new();
        struct NullIrq;
        impl crate::interrupt::InterruptController for NullIrq {
            fn install_service(&mut self) -> Result<(), crate::interrupt::IsrError> {
                Ok(())
            }
            fn enable(&mut self, _: PinConfig) -> Result<(), crate::interrupt::IsrError> {
                Ok(())
            }
            fn disable(&mut self, _: PinConfig) -> Result<(), crate::interrupt::IsrError> {
                Ok(())
            }
            fn attach(&mut self, _: PinConfig, _: &'static TouchNotifier) -> Result<(), crate::interrupt::IsrError> {
                Ok(())
            }
            fn detach(&mut self, _: PinConfig) -> Result<(), crate::interrupt::IsrError> {
                Ok(())
            }
        }

        let mut controller = ScriptedController::new();
        controller.push_points(&[RawPoint::new(1, 1)]);
        let config = TouchConfig::new(320, 240).with_interrupt_pin(PinConfig::active_low(3));
        let mut touch = TouchNormalizer::new(controller, config).unwrap();
        touch.register_interrupt_callback(&mut NullIrq, Some(&NOTIFIER)).unwrap();
        let mut input = PointerInput::new(touch, Calibration::NONE);

        assert!(!input.take_read_request());
        NOTIFIER.notify();
        assert!(input.take_read_request());
        assert!(block_on(input.read()).is_pressed());
        // Finger still down: keep reading until it lifts
        assert!(input.take_read_request());
        block_on(input.wait_for_read_request());

        // Released and idle: the wait completes once the line fires
        assert_eq!(block_on(input.read()), PointerState::Released);
        NOTIFIER.notify();
        block_on(input.wait_for_read_request());
        assert!(!input.take_read_request());
    }

    #[test]
    fn test_self_test_reports_failure() {
        let mut controller = ScriptedController::new();
        controller.push_error(TouchError::io("read touch points"));
        let mut input = pointer(controller, Calibration::NONE);
        assert!(block_on(input.self_test()).is_err());
        assert!(block_on(input.self_test()).is_ok());
    }
}
