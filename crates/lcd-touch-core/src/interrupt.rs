//! Touch interrupt handoff
//!
//! The interrupt handler never reads the controller. It only raises a
//! [`TouchNotifier`]; a task waiting on the notifier performs the I2C read and
//! the coordinate transform on the normal executor path.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::config::PinConfig;

/// "Data ready" flag shared between an interrupt handler and a task.
///
/// Raising it is a short critical section that neither allocates nor blocks,
/// so [`notify`](Self::notify) is safe to call from an ISR. Repeated raises
/// before the task runs collapse into one.
pub struct TouchNotifier {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl TouchNotifier {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Mark touch data as ready. Interrupt safe.
    #[inline]
    pub fn notify(&self) {
        self.signal.signal(());
    }

    /// Wait until the line fires, consuming the notification
    pub async fn wait(&self) {
        self.signal.wait().await
    }

    /// Consume a pending notification without waiting
    pub fn take(&self) -> bool {
        self.signal.try_take().is_some()
    }
}

impl Default for TouchNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure reported by a platform interrupt controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsrError {
    /// The shared GPIO interrupt service was installed earlier
    AlreadyInstalled,
    /// The pin can't be used as an interrupt source
    InvalidPin(u8),
    /// Any other platform failure
    Failed,
}

/// GPIO interrupt plumbing provided by the platform.
///
/// Mirrors the usual MCU split: one shared interrupt service, then per-pin
/// enable/disable and handler attachment.
pub trait InterruptController {
    /// Install the shared GPIO interrupt service.
    ///
    /// Returns [`IsrError::AlreadyInstalled`] if someone did it before; the
    /// normalizer treats that as success.
    fn install_service(&mut self) -> Result<(), IsrError>;

    /// Start delivering edges on `pin` at its active level
    fn enable(&mut self, pin: PinConfig) -> Result<(), IsrError>;

    /// Stop delivering edges on `pin`
    fn disable(&mut self, pin: PinConfig) -> Result<(), IsrError>;

    /// Route edges on `pin` to `notifier`
    fn attach(&mut self, pin: PinConfig, notifier: &'static TouchNotifier) -> Result<(), IsrError>;

    /// Remove whatever handler is attached to `pin`
    fn detach(&mut self, pin: PinConfig) -> Result<(), IsrError>;
}
