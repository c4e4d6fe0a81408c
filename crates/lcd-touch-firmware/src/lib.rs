//! ESP32-S3 firmware-specific modules for lcd-touch
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: I2C and LEDC peripheral setup, the GPIO interrupt handler for the
//! touch INT line, and the embassy tasks that drive the core crate.

#![no_std]

pub mod backlight;
pub mod board;
pub mod hardware;
pub mod tasks;
pub mod touch_irq;
