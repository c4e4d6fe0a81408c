//! Hardware-independent core library for lcd-touch
//!
//! Turns raw capacitive touch frames into display-space coordinates: the
//! controller abstraction, the FT5x06 driver, orientation transforms, the
//! interrupt handoff and the pointer adapter a GUI polls. The board's IMU tilt
//! readout and backlight mapping live here too.
//!
//! It is `#![no_std]` so it compiles on both the ESP32-S3 target and desktop
//! hosts (for the simulator and tests).

#![no_std]

pub mod backlight;
pub mod config;
pub mod controller;
pub mod error;
pub mod ft5x06;
pub mod input;
pub mod interrupt;
pub mod normalizer;
pub mod qmi8658;
pub mod sample;
pub mod settings;
pub mod tilt;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use config::{ActiveLevel, Calibration, OrientationFlags, PinConfig, TouchConfig};
pub use controller::{CapabilitySet, TouchController};
pub use error::TouchError;
pub use input::{PointerInput, PointerState, TouchEvent};
pub use interrupt::{InterruptController, IsrError, TouchNotifier};
pub use normalizer::{CoordinateProcessor, NoProcessing, ProcessFn, TouchNormalizer};
pub use sample::{MAX_TOUCH_POINTS, NormalizedPoint, RawPoint, TouchReport, TouchSample};
