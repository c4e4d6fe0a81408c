//! Touch controller abstraction
//!
//! Every concrete controller (FT5x06, ...) implements [`TouchController`]. The
//! only required operations are fetching a frame and handing it out; every
//! orientation, sleep and button hook is optional and defaults to "not
//! supported" so the normalizer can fall back to software.

use crate::error::TouchError;
use crate::sample::TouchSample;

/// Orientation transforms the controller can perform natively.
///
/// A set flag means the controller exposes a setter for that transform and
/// the normalizer must not repeat it in software.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet {
    pub swap_xy: bool,
    pub mirror_x: bool,
    pub mirror_y: bool,
}

impl CapabilitySet {
    /// No native transforms
    pub const NONE: Self = Self {
        swap_xy: false,
        mirror_x: false,
        mirror_y: false,
    };

    /// All three transforms handled by the controller
    pub const ALL: Self = Self {
        swap_xy: true,
        mirror_x: true,
        mirror_y: true,
    };
}

/// Raw-sample provider implemented by each touch controller driver
pub trait TouchController {
    /// Native transforms supported by this controller instance
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::NONE
    }

    /// Fetch the current frame from the controller into the driver's cache.
    ///
    /// May block for as long as the bus transaction takes. Errors are
    /// reported as [`TouchError::Io`].
    fn read_data(&mut self) -> impl Future<Output = Result<(), TouchError>>;

    /// Hand out the cached frame, leaving the cache empty.
    ///
    /// A frame is consumed exactly once; calling this twice without a
    /// [`read_data`](Self::read_data) in between yields an empty sample.
    fn get_xy(&mut self) -> TouchSample;

    /// Swap axes in hardware
    fn set_swap_xy(&mut self, _swap: bool) -> impl Future<Output = Result<(), TouchError>> {
        async { Err(TouchError::unsupported("set_swap_xy")) }
    }

    /// Mirror the X axis in hardware
    fn set_mirror_x(&mut self, _mirror: bool) -> impl Future<Output = Result<(), TouchError>> {
        async { Err(TouchError::unsupported("set_mirror_x")) }
    }

    /// Mirror the Y axis in hardware
    fn set_mirror_y(&mut self, _mirror: bool) -> impl Future<Output = Result<(), TouchError>> {
        async { Err(TouchError::unsupported("set_mirror_y")) }
    }

    /// Read back the hardware swap state. `Ok(None)` means no getter exists.
    fn swap_xy(&mut self) -> impl Future<Output = Result<Option<bool>, TouchError>> {
        async { Ok(None) }
    }

    /// Read back the hardware X mirror state. `Ok(None)` means no getter exists.
    fn mirror_x(&mut self) -> impl Future<Output = Result<Option<bool>, TouchError>> {
        async { Ok(None) }
    }

    /// Read back the hardware Y mirror state. `Ok(None)` means no getter exists.
    fn mirror_y(&mut self) -> impl Future<Output = Result<Option<bool>, TouchError>> {
        async { Ok(None) }
    }

    fn enter_sleep(&mut self) -> impl Future<Output = Result<(), TouchError>> {
        async { Err(TouchError::unsupported("enter_sleep")) }
    }

    fn exit_sleep(&mut self) -> impl Future<Output = Result<(), TouchError>> {
        async { Err(TouchError::unsupported("exit_sleep")) }
    }

    /// State of a capacitive key outside the active area, if the panel has any
    fn button_state(&mut self, _button: u8) -> impl Future<Output = Result<bool, TouchError>> {
        async { Err(TouchError::unsupported("button_state")) }
    }

    /// Release controller resources. Controllers with nothing to release
    /// succeed.
    fn teardown(&mut self) -> impl Future<Output = Result<(), TouchError>> {
        async { Ok(()) }
    }
}
