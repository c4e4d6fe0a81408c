//! GPIO interrupt plumbing for the touch INT line
//!
//! The handler runs in interrupt context and only acknowledges the edge and
//! raises the attached [`TouchNotifier`]. The touch task does the bus read.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use esp_hal::gpio::{AnyPin, Event, Input, InputConfig, Io, Pull};
use esp_hal::{handler, ram};
use lcd_touch_core::config::{ActiveLevel, PinConfig};
use lcd_touch_core::interrupt::{InterruptController, IsrError, TouchNotifier};
use log::debug;

static TOUCH_INT: Mutex<RefCell<Option<Input<'static>>>> = Mutex::new(RefCell::new(None));
static TOUCH_NOTIFIER: Mutex<Cell<Option<&'static TouchNotifier>>> = Mutex::new(Cell::new(None));

/// Notifier the board's touch task waits on
pub static TOUCH_READY: TouchNotifier = TouchNotifier::new();

#[handler]
#[ram]
fn touch_gpio_handler() {
    critical_section::with(|cs| {
        let mut binding = TOUCH_INT.borrow_ref_mut(cs);
        let Some(input) = binding.as_mut() else {
            return;
        };
        if !input.is_interrupt_set() {
            return;
        }
        input.clear_interrupt();

        if let Some(notifier) = TOUCH_NOTIFIER.borrow(cs).get() {
            notifier.notify();
        }
    });
}

/// The board's GPIO interrupt service with the touch INT line
pub struct GpioInterrupts {
    io: Io<'static>,
    gpio: u8,
    installed: bool,
}

impl GpioInterrupts {
    /// Take the touch INT pin by number.
    ///
    /// # Safety
    ///
    /// `gpio` must not be in use by any other driver. The number comes from
    /// build-time configuration, so the type system can't check it.
    pub unsafe fn new(io: Io<'static>, gpio: u8) -> Self {
        // SAFETY: exclusivity is the caller's contract
        let pin = unsafe { AnyPin::steal(gpio) };
        let input = Input::new(pin, InputConfig::default().with_pull(Pull::Up));
        critical_section::with(|cs| TOUCH_INT.borrow_ref_mut(cs).replace(input));

        Self {
            io,
            gpio,
            installed: false,
        }
    }

    fn with_input<R>(
        &self,
        pin: PinConfig,
        f: impl FnOnce(&mut Input<'static>) -> R,
    ) -> Result<R, IsrError> {
        if pin.gpio != self.gpio {
            return Err(IsrError::InvalidPin(pin.gpio));
        }
        critical_section::with(|cs| {
            TOUCH_INT
                .borrow_ref_mut(cs)
                .as_mut()
                .map(f)
                .ok_or(IsrError::Failed)
        })
    }
}

impl InterruptController for GpioInterrupts {
    fn install_service(&mut self) -> Result<(), IsrError> {
        if self.installed {
            return Err(IsrError::AlreadyInstalled);
        }
        self.io.set_interrupt_handler(touch_gpio_handler);
        self.installed = true;
        debug!("GPIO interrupt handler installed");
        Ok(())
    }

    fn enable(&mut self, pin: PinConfig) -> Result<(), IsrError> {
        let event = match pin.active_level {
            ActiveLevel::Low => Event::FallingEdge,
            ActiveLevel::High => Event::RisingEdge,
        };
        self.with_input(pin, |input| input.listen(event))
    }

    fn disable(&mut self, pin: PinConfig) -> Result<(), IsrError> {
        self.with_input(pin, |input| {
            input.unlisten();
            input.clear_interrupt();
        })
    }

    fn attach(&mut self, pin: PinConfig, notifier: &'static TouchNotifier) -> Result<(), IsrError> {
        if pin.gpio != self.gpio {
            return Err(IsrError::InvalidPin(pin.gpio));
        }
        critical_section::with(|cs| TOUCH_NOTIFIER.borrow(cs).set(Some(notifier)));
        Ok(())
    }

    fn detach(&mut self, pin: PinConfig) -> Result<(), IsrError> {
        if pin.gpio != self.gpio {
            return Err(IsrError::InvalidPin(pin.gpio));
        }
        critical_section::with(|cs| TOUCH_NOTIFIER.borrow(cs).set(None));
        Ok(())
    }
}
