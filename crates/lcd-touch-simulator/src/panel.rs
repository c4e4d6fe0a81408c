//! Simulated touch hardware driven by the mouse

use embedded_graphics::prelude::Point;
use lcd_touch_core::config::{OrientationFlags, PinConfig};
use lcd_touch_core::controller::TouchController;
use lcd_touch_core::error::TouchError;
use lcd_touch_core::interrupt::{InterruptController, IsrError, TouchNotifier};
use lcd_touch_core::sample::{RawPoint, TouchSample};
use lcd_touch_core::transform::mirror;
use log::{debug, info};

/// A panel glued to the display with a fixed mounting orientation.
///
/// Mouse positions are display coordinates; the panel reports what the real
/// controller would, i.e. the position before the mounting transforms. A
/// normalizer configured with matching flags maps it back onto the cursor.
pub struct SimulatedPanel {
    mount: OrientationFlags,
    x_max: u16,
    y_max: u16,
    contact: Option<RawPoint>,
    frame: TouchSample,
    fail_next_read: bool,
    asleep: bool,
}

impl SimulatedPanel {
    pub fn new(mount: OrientationFlags, x_max: u16, y_max: u16) -> Self {
        Self {
            mount,
            x_max,
            y_max,
            contact: None,
            frame: TouchSample::empty(),
            fail_next_read: false,
            asleep: false,
        }
    }

    pub fn press(&mut self, display: Point) {
        let x = display.x.clamp(0, self.x_max as i32 - 1) as u16;
        let y = display.y.clamp(0, self.y_max as i32 - 1) as u16;
        let raw = self.to_raw(x, y);
        debug!("Panel contact: display ({}, {}) -> raw ({}, {})", x, y, raw.x, raw.y);
        self.contact = Some(raw);
    }

    pub fn release(&mut self) {
        self.contact = None;
    }

    pub fn is_touched(&self) -> bool {
        self.contact.is_some()
    }

    /// Make the next bus read fail, as a flaky I2C line would
    pub fn inject_read_failure(&mut self) {
        info!("Next panel read will fail");
        self.fail_next_read = true;
    }

    /// Undo the mounting transforms: swap first, then the mirrors
    fn to_raw(&self, x: u16, y: u16) -> RawPoint {
        let (mut raw_x, mut raw_y) = if self.mount.swap_xy { (y, x) } else { (x, y) };
        if self.mount.mirror_y {
            raw_y = mirror(raw_y, self.y_max);
        }
        if self.mount.mirror_x {
            raw_x = mirror(raw_x, self.x_max);
        }
        RawPoint::new(raw_x, raw_y).with_strength(40)
    }
}

impl TouchController for SimulatedPanel {
    async fn read_data(&mut self) -> Result<(), TouchError> {
        // A hibernating controller does not acknowledge its address
        if self.asleep || core::mem::take(&mut self.fail_next_read) {
            return Err(TouchError::io("read touch points"));
        }
        self.frame = match self.contact {
            Some(point) => TouchSample::from_points(&[point]),
            None => TouchSample::empty(),
        };
        Ok(())
    }

    fn get_xy(&mut self) -> TouchSample {
        core::mem::take(&mut self.frame)
    }

    async fn enter_sleep(&mut self) -> Result<(), TouchError> {
        self.asleep = true;
        Ok(())
    }

    async fn exit_sleep(&mut self) -> Result<(), TouchError> {
        self.asleep = false;
        Ok(())
    }
}

/// GPIO interrupt service for the virtual INT line
#[derive(Default)]
pub struct SimulatedIrq {
    installed: bool,
    enabled: bool,
    notifier: Option<&'static TouchNotifier>,
}

impl SimulatedIrq {
    /// Raise the INT line, as the controller does on new data
    pub fn fire(&self) {
        if let (true, Some(notifier)) = (self.enabled, self.notifier) {
            notifier.notify();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.enabled && self.notifier.is_some()
    }
}

impl InterruptController for SimulatedIrq {
    fn install_service(&mut self) -> Result<(), IsrError> {
        if self.installed {
            return Err(IsrError::AlreadyInstalled);
        }
        self.installed = true;
        Ok(())
    }

    fn enable(&mut self, _pin: PinConfig) -> Result<(), IsrError> {
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self, _pin: PinConfig) -> Result<(), IsrError> {
        self.enabled = false;
        Ok(())
    }

    fn attach(&mut self, _pin: PinConfig, notifier: &'static TouchNotifier) -> Result<(), IsrError> {
        self.notifier = Some(notifier);
        Ok(())
    }

    fn detach(&mut self, _pin: PinConfig) -> Result<(), IsrError> {
        self.notifier = None;
        Ok(())
    }
}
