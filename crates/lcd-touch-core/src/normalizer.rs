//! Touch coordinate normalizer
//!
//! Turns raw controller frames into display coordinates. Each orientation
//! flag is honoured exactly once: by the controller when it advertises the
//! capability, otherwise here in software.
//!
//! # Example
//!
//! ```ignore
//! let config = TouchConfig::new(320, 240).with_swap_xy(true).with_mirror_x(true);
//! let mut touch = TouchNormalizer::new(Ft5x06::new(i2c, NoReset), config)?;
//!
//! let report = touch.get_coordinates(1).await?;
//! if let Some(point) = report.primary() {
//!     info!("pressed at ({}, {})", point.x, point.y);
//! }
//! ```

use log::{debug, error, info};

use crate::config::{Calibration, TouchConfig};
use crate::controller::{CapabilitySet, TouchController};
use crate::error::TouchError;
use crate::interrupt::{InterruptController, IsrError, TouchNotifier};
use crate::sample::{MAX_TOUCH_POINTS, NormalizedPoint, TouchReport, TouchSample};
use crate::transform::SoftwareTransform;

/// Hook run on every touched frame before any built-in transform.
///
/// Site-specific corrections belong here, e.g. a linear fix for a panel whose
/// raw axis doesn't start at zero. The hook sees raw sensor coordinates.
pub trait CoordinateProcessor {
    fn process(&mut self, sample: &mut TouchSample, config: &TouchConfig);
}

/// Leaves frames untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProcessing;

impl CoordinateProcessor for NoProcessing {
    #[inline]
    fn process(&mut self, _sample: &mut TouchSample, _config: &TouchConfig) {}
}

/// Adapts a closure into a [`CoordinateProcessor`]. Captured state plays the
/// role of callback user data.
pub struct ProcessFn<F>(pub F);

impl<F> CoordinateProcessor for ProcessFn<F>
where
    F: FnMut(&mut TouchSample, &TouchConfig),
{
    fn process(&mut self, sample: &mut TouchSample, config: &TouchConfig) {
        (self.0)(sample, config)
    }
}

/// Owns one touch controller and its configuration.
///
/// Meant to be driven from a single task. The only thing that may touch it
/// from interrupt context is the registered [`TouchNotifier`], which it does
/// not own.
pub struct TouchNormalizer<C, P = NoProcessing> {
    controller: C,
    config: TouchConfig,
    processor: P,
    calibration: Calibration,
    notifier: Option<&'static TouchNotifier>,
    sleeping: bool,
}

impl<C> TouchNormalizer<C, NoProcessing>
where
    C: TouchController,
{
    /// Wrap a controller. Fails with `InvalidArgument` on zero bounds.
    pub fn new(controller: C, config: TouchConfig) -> Result<Self, TouchError> {
        config.validate()?;

        let capabilities = controller.capabilities();
        info!(
            "Touch normalizer {}x{} swap_xy={} mirror_x={} mirror_y={} ({} mode)",
            config.x_max,
            config.y_max,
            config.flags.swap_xy,
            config.flags.mirror_x,
            config.flags.mirror_y,
            if config.is_polling() { "polling" } else { "interrupt" },
        );
        debug!("Controller capabilities: {:?}", capabilities);

        Ok(Self {
            controller,
            config,
            processor: NoProcessing,
            calibration: Calibration::NONE,
            notifier: None,
            sleeping: false,
        })
    }
}

impl<C, P> TouchNormalizer<C, P>
where
    C: TouchController,
    P: CoordinateProcessor,
{
    /// Install a raw-coordinate hook, replacing the current one
    pub fn with_processor<Q>(self, processor: Q) -> TouchNormalizer<C, Q>
    where
        Q: CoordinateProcessor,
    {
        TouchNormalizer {
            controller: self.controller,
            config: self.config,
            processor,
            calibration: self.calibration,
            notifier: self.notifier,
            sleeping: self.sleeping,
        }
    }

    pub fn config(&self) -> &TouchConfig {
        &self.config
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Offset added to every oriented point before it is clamped to the
    /// display. Takes effect on the next poll.
    pub fn set_calibration(&mut self, calibration: Calibration) {
        if calibration != self.calibration {
            info!(
                "Touch calibration offset x={} y={}",
                calibration.x_offset, calibration.y_offset
            );
        }
        self.calibration = calibration;
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.controller.capabilities()
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Give the controller back, e.g. after [`teardown`](Self::teardown)
    pub fn into_controller(self) -> C {
        self.controller
    }

    /// Whether the last successful sleep transition put the panel to sleep
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Notifier attached by [`register_interrupt_callback`](Self::register_interrupt_callback)
    pub fn notifier(&self) -> Option<&'static TouchNotifier> {
        self.notifier
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Read one raw frame from the controller.
    ///
    /// Transport errors are returned as-is and never retried here.
    pub async fn read_raw(&mut self) -> Result<TouchSample, TouchError> {
        self.controller.read_data().await?;
        Ok(self.controller.get_xy())
    }

    /// Read a frame and return it in display coordinates.
    ///
    /// At most `max_points` (capped at [`MAX_TOUCH_POINTS`]) points are
    /// returned. Without contact the report is `touched = false` with no
    /// points, whatever the orientation flags say.
    pub async fn get_coordinates(&mut self, max_points: usize) -> Result<TouchReport, TouchError> {
        let mut sample = self.read_raw().await?;
        if sample.is_empty() {
            return Ok(TouchReport::released());
        }

        sample.truncate(max_points.min(MAX_TOUCH_POINTS));
        self.processor.process(&mut sample, &self.config);

        let transform = SoftwareTransform::resolve(self.config.flags, self.controller.capabilities());
        let TouchConfig { x_max, y_max, .. } = self.config;

        let mut report = TouchReport {
            touched: true,
            ..TouchReport::released()
        };
        for raw in sample.points() {
            let (x, y) = transform.apply_with_offset(raw.x, raw.y, x_max, y_max, self.calibration);
            // Capacity matches the sample's, so this can't overflow
            let _ = report.points.push(NormalizedPoint {
                x,
                y,
                strength: raw.strength,
            });
        }

        Ok(report)
    }

    // =========================================================================
    // Orientation
    // =========================================================================

    /// Request axis swapping. Forwarded to the controller when it can do it,
    /// otherwise applied in software from the next poll on.
    pub async fn set_swap_xy(&mut self, swap: bool) -> Result<(), TouchError> {
        self.config.flags.swap_xy = swap;
        debug!("swap_xy -> {}", swap);
        if self.controller.capabilities().swap_xy {
            return self.controller.set_swap_xy(swap).await;
        }
        Ok(())
    }

    /// Request X mirroring; see [`set_swap_xy`](Self::set_swap_xy)
    pub async fn set_mirror_x(&mut self, mirror: bool) -> Result<(), TouchError> {
        self.config.flags.mirror_x = mirror;
        debug!("mirror_x -> {}", mirror);
        if self.controller.capabilities().mirror_x {
            return self.controller.set_mirror_x(mirror).await;
        }
        Ok(())
    }

    /// Request Y mirroring; see [`set_swap_xy`](Self::set_swap_xy)
    pub async fn set_mirror_y(&mut self, mirror: bool) -> Result<(), TouchError> {
        self.config.flags.mirror_y = mirror;
        debug!("mirror_y -> {}", mirror);
        if self.controller.capabilities().mirror_y {
            return self.controller.set_mirror_y(mirror).await;
        }
        Ok(())
    }

    /// Current swap state: the controller's answer if it has a getter,
    /// otherwise the stored flag
    pub async fn get_swap_xy(&mut self) -> Result<bool, TouchError> {
        let hardware = self.controller.swap_xy().await?;
        Ok(hardware.unwrap_or(self.config.flags.swap_xy))
    }

    pub async fn get_mirror_x(&mut self) -> Result<bool, TouchError> {
        let hardware = self.controller.mirror_x().await?;
        Ok(hardware.unwrap_or(self.config.flags.mirror_x))
    }

    pub async fn get_mirror_y(&mut self) -> Result<bool, TouchError> {
        let hardware = self.controller.mirror_y().await?;
        Ok(hardware.unwrap_or(self.config.flags.mirror_y))
    }

    // =========================================================================
    // Power and lifecycle
    // =========================================================================

    pub async fn enter_sleep(&mut self) -> Result<(), TouchError> {
        match self.controller.enter_sleep().await {
            Ok(()) => {
                self.sleeping = true;
                Ok(())
            }
            Err(e) => {
                if e.is_unsupported() {
                    error!("Sleep mode not supported by this controller");
                }
                Err(e)
            }
        }
    }

    pub async fn exit_sleep(&mut self) -> Result<(), TouchError> {
        match self.controller.exit_sleep().await {
            Ok(()) => {
                self.sleeping = false;
                Ok(())
            }
            Err(e) => {
                if e.is_unsupported() {
                    error!("Sleep mode not supported by this controller");
                }
                Err(e)
            }
        }
    }

    /// State of a capacitive key, for panels that have them
    pub async fn button_state(&mut self, button: u8) -> Result<bool, TouchError> {
        self.controller.button_state(button).await
    }

    /// Release the controller's resources
    pub async fn teardown(&mut self) -> Result<(), TouchError> {
        self.controller.teardown().await
    }

    // =========================================================================
    // Interrupts
    // =========================================================================

    /// Attach `notifier` to the configured interrupt line, or detach with `None`.
    ///
    /// Attaching installs the shared GPIO interrupt service if nobody has,
    /// enables the line and routes it to the notifier. Detaching removes the
    /// handler and disables the line; a later attach works as the first one
    /// did. Fails with `InvalidArgument` when the panel is configured for
    /// polling. A failure leaves the previous registration recorded.
    pub fn register_interrupt_callback<I>(
        &mut self,
        irq: &mut I,
        notifier: Option<&'static TouchNotifier>,
    ) -> Result<(), TouchError>
    where
        I: InterruptController,
    {
        let Some(pin) = self.config.interrupt_pin else {
            return Err(TouchError::invalid("no interrupt pin configured"));
        };

        match notifier {
            Some(notifier) => {
                match irq.install_service() {
                    Ok(()) | Err(IsrError::AlreadyInstalled) => {}
                    Err(e) => {
                        error!("GPIO interrupt service install failed: {:?}", e);
                        return Err(TouchError::hardware("install interrupt service"));
                    }
                }
                irq.enable(pin).map_err(|e| {
                    error!("Enabling touch interrupt on GPIO{} failed: {:?}", pin.gpio, e);
                    TouchError::hardware("enable interrupt")
                })?;
                irq.attach(pin, notifier).map_err(|e| {
                    error!("Attaching touch handler on GPIO{} failed: {:?}", pin.gpio, e);
                    TouchError::hardware("attach handler")
                })?;
                info!("Touch interrupt attached on GPIO{}", pin.gpio);
            }
            None => {
                irq.detach(pin).map_err(|e| {
                    error!("Removing touch handler on GPIO{} failed: {:?}", pin.gpio, e);
                    TouchError::hardware("detach handler")
                })?;
                irq.disable(pin).map_err(|e| {
                    error!("Disabling touch interrupt on GPIO{} failed: {:?}", pin.gpio, e);
                    TouchError::hardware("disable interrupt")
                })?;
                info!("Touch interrupt detached from GPIO{}", pin.gpio);
            }
        }

        self.notifier = notifier;
        Ok(())
    }
}
