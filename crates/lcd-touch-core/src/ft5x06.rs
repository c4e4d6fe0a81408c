use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{debug, error, info, warn};

use crate::config::ActiveLevel;
use crate::controller::{CapabilitySet, TouchController};
use crate::error::TouchError;
use crate::sample::{MAX_TOUCH_POINTS, RawPoint, TouchSample};

// =============================================================================
// I2C Address
// =============================================================================

/// FT5x06 / FT6x36 I2C address
pub const I2C_ADDR: u8 = 0x38;

// =============================================================================
// Register Addresses
// =============================================================================

// Touch Status Registers
pub const ADDR_TD_STATUS: u8 = 0x02;

/// TD_STATUS low nibble while the controller is still booting
const TD_STATUS_INVALID: u8 = 0x0F;

/// First touch point record. Each record is 6 bytes:
/// XH (event flag + x[11:8]), XL, YH (id + y[11:8]), YL, weight, misc
pub const ADDR_TOUCH_POINTS: u8 = 0x03;
pub const POINT_RECORD_LEN: usize = 6;

// Threshold / Period Registers
pub const ADDR_THGROUP: u8 = 0x80;
pub const ADDR_THPEAK: u8 = 0x81;
pub const ADDR_THCAL: u8 = 0x82;
pub const ADDR_THWATER: u8 = 0x83;
pub const ADDR_THTEMP: u8 = 0x84;
pub const ADDR_THDIFF: u8 = 0x85;
pub const ADDR_TIME_ENTER_MONITOR: u8 = 0x87;
pub const ADDR_PERIOD_ACTIVE: u8 = 0x88;
pub const ADDR_PERIOD_MONITOR: u8 = 0x89;

// System Information Registers
pub const ADDR_CHIP_ID: u8 = 0xA3;
pub const ADDR_G_MODE: u8 = 0xA4;
pub const ADDR_POWER_MODE: u8 = 0xA5;
pub const ADDR_FIRMWARE_ID: u8 = 0xA6;
pub const ADDR_VENDOR_ID: u8 = 0xA8;

/// Vendor defaults written at init, as (register, value)
const INIT_SEQUENCE: [(u8, u8); 9] = [
    // Valid touch detect threshold
    (ADDR_THGROUP, 70),
    // Valid touch peak detect threshold
    (ADDR_THPEAK, 60),
    // Touch focus threshold
    (ADDR_THCAL, 16),
    // Threshold with water on the surface
    (ADDR_THWATER, 60),
    // Temperature compensation threshold
    (ADDR_THTEMP, 10),
    // Touch difference threshold
    (ADDR_THDIFF, 20),
    // Seconds before entering monitor mode
    (ADDR_TIME_ENTER_MONITOR, 2),
    // Active scan period (ms)
    (ADDR_PERIOD_ACTIVE, 12),
    // Monitor scan period (ms)
    (ADDR_PERIOD_MONITOR, 40),
];

// =============================================================================
// Enums
// =============================================================================

/// Power mode register values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMode {
    Active = 0x00,
    Monitor = 0x01,
    Hibernate = 0x03,
}

impl PowerMode {
    /// Convert from raw register value
    pub fn from_register(val: u8) -> Option<Self> {
        match val {
            0x00 => Some(Self::Active),
            0x01 => Some(Self::Monitor),
            0x03 => Some(Self::Hibernate),
            _ => None,
        }
    }
}

/// Interrupt mode (G_MODE register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InterruptMode {
    /// INT held low while a finger is down
    Polling = 0,
    /// INT pulses once per report
    Trigger = 1,
}

impl InterruptMode {
    /// Pulse the INT line only when the host listens for edges on it
    pub const fn for_interrupt_line(wired: bool) -> Self {
        if wired { Self::Trigger } else { Self::Polling }
    }
}

// =============================================================================
// Reset Line
// =============================================================================

/// Hardware reset for the controller.
///
/// The reset line may be a plain GPIO or a pin on an I/O expander, so the
/// driver only needs something that can pulse it.
pub trait ResetLine {
    /// Whether a reset line is wired at all
    fn is_present(&self) -> bool {
        true
    }

    /// Assert the line, wait, release it and wait for the controller to boot
    fn reset(&mut self) -> impl Future<Output = Result<(), TouchError>>;
}

/// Panel without a reset line
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReset;

impl ResetLine for NoReset {
    fn is_present(&self) -> bool {
        false
    }

    async fn reset(&mut self) -> Result<(), TouchError> {
        Err(TouchError::unsupported("reset"))
    }
}

/// Reset through an `OutputPin`, honouring the configured active level
pub struct GpioReset<P, D> {
    pin: P,
    delay: D,
    active_level: ActiveLevel,
}

impl<P, D> GpioReset<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Pulse width and boot time after release
    const PULSE_MS: u32 = 10;

    pub fn new(pin: P, delay: D, active_level: ActiveLevel) -> Self {
        Self {
            pin,
            delay,
            active_level,
        }
    }

    fn drive(&mut self, asserted: bool) -> Result<(), TouchError> {
        let high = self.active_level.asserted() == asserted;
        self.pin
            .set_state(PinState::from(high))
            .map_err(|_| TouchError::hardware("drive reset line"))
    }
}

impl<P, D> ResetLine for GpioReset<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    async fn reset(&mut self) -> Result<(), TouchError> {
        self.drive(true)?;
        self.delay.delay_ms(Self::PULSE_MS).await;
        self.drive(false)?;
        self.delay.delay_ms(Self::PULSE_MS).await;
        Ok(())
    }
}

// =============================================================================
// Driver Error Type
// =============================================================================

/// Errors that can occur during FT5x06 operations
#[derive(Debug)]
pub enum Error<E> {
    /// I2C communication error
    I2c(E),
    /// Invalid data received from device
    InvalidData,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Self::I2c(e)
    }
}

impl<E: core::fmt::Debug> Error<E> {
    /// Log the bus error and collapse it into a [`TouchError::Io`]
    fn into_touch_error(self, operation: &'static str) -> TouchError {
        error!("FT5x06 {} failed: {:?}", operation, self);
        TouchError::io(operation)
    }
}

// =============================================================================
// Driver Implementation
// =============================================================================

/// FT5x06-family capacitive touch controller (FT5206, FT5306, FT6x36, ...)
/// with an async I2C interface.
///
/// The controller has no native orientation support, so every transform is
/// left to the normalizer. Reads are two transactions: the contact count from
/// `TD_STATUS`, then all point records in one burst.
pub struct Ft5x06<I2C, RST = NoReset> {
    /// I2C bus for communicating with the touch controller
    i2c: I2C,
    /// Reset line, if wired
    reset: RST,
    /// 7-bit device address
    address: u8,
    /// Frame fetched by the last `read_data`, consumed by `get_xy`
    frame: TouchSample,
}

impl<I2C, RST> Ft5x06<I2C, RST>
where
    I2C: I2c,
    RST: ResetLine,
{
    /// Create a new driver instance at the default address
    pub fn new(i2c: I2C, reset: RST) -> Self {
        Self {
            i2c,
            reset,
            address: I2C_ADDR,
            frame: TouchSample::empty(),
        }
    }

    /// Give back the bus and reset line
    pub fn release(self) -> (I2C, RST) {
        (self.i2c, self.reset)
    }

    // =========================================================================
    // Private I2C Helper Methods
    // =========================================================================

    /// Read a single byte from a register
    async fn read_byte(&mut self, addr: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[addr], &mut buf).await?;
        Ok(buf[0])
    }

    /// Write a single byte to a register
    async fn write_byte(&mut self, addr: u8, data: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(self.address, &[addr, data]).await?;
        Ok(())
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Reset the controller (if a line is wired), check that it answers,
    /// load the vendor threshold and scan-period defaults and select how the
    /// INT line behaves.
    pub async fn init(&mut self, mode: InterruptMode) -> Result<(), TouchError> {
        if self.reset.is_present() {
            self.reset.reset().await?;
        }

        let chip_id = self
            .read_chip_id()
            .await
            .map_err(|e| e.into_touch_error("read chip id"))?;
        debug!("FT5x06 chip id 0x{:02X}", chip_id);

        for (register, value) in INIT_SEQUENCE {
            self.write_byte(register, value)
                .await
                .map_err(|e| e.into_touch_error("write init register"))?;
        }
        self.write_interrupt_mode(mode)
            .await
            .map_err(|e| e.into_touch_error("write interrupt mode"))?;

        let firmware = self
            .read_firmware_id()
            .await
            .map_err(|e| e.into_touch_error("read firmware id"))?;
        let vendor = self
            .read_vendor_id()
            .await
            .map_err(|e| e.into_touch_error("read vendor id"))?;
        info!(
            "FT5x06 @ 0x{:02X} ready (chip 0x{:02X}, firmware 0x{:02X}, vendor 0x{:02X}, {:?} INT)",
            self.address, chip_id, firmware, vendor, mode
        );
        Ok(())
    }

    // =========================================================================
    // Register Access
    // =========================================================================

    /// Read the number of detected touch points (low nibble of TD_STATUS)
    pub async fn read_touch_number(&mut self) -> Result<u8, Error<I2C::Error>> {
        let val = self.read_byte(ADDR_TD_STATUS).await?;
        Ok(val & 0x0F)
    }

    /// Read the chip ID
    pub async fn read_chip_id(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_byte(ADDR_CHIP_ID).await
    }

    /// Read the firmware ID
    pub async fn read_firmware_id(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_byte(ADDR_FIRMWARE_ID).await
    }

    /// Read the panel vendor ID
    pub async fn read_vendor_id(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_byte(ADDR_VENDOR_ID).await
    }

    /// Read the power mode
    pub async fn read_power_mode(&mut self) -> Result<PowerMode, Error<I2C::Error>> {
        let val = self.read_byte(ADDR_POWER_MODE).await?;
        PowerMode::from_register(val).ok_or(Error::InvalidData)
    }

    /// Write the power mode
    pub async fn write_power_mode(&mut self, mode: PowerMode) -> Result<(), Error<I2C::Error>> {
        self.write_byte(ADDR_POWER_MODE, mode as u8).await
    }

    /// Write the interrupt mode
    pub async fn write_interrupt_mode(&mut self, mode: InterruptMode) -> Result<(), Error<I2C::Error>> {
        self.write_byte(ADDR_G_MODE, mode as u8).await
    }

    // =========================================================================
    // High-Level Scan Method
    // =========================================================================

    /// Read every active touch point.
    ///
    /// The contact count is capped at [`MAX_TOUCH_POINTS`]. The 0x0F the
    /// controller reports right after reset is treated as no touch.
    pub async fn scan(&mut self) -> Result<TouchSample, Error<I2C::Error>> {
        let status = self.read_touch_number().await?;
        if status == 0 {
            return Ok(TouchSample::empty());
        }
        if status == TD_STATUS_INVALID {
            debug!("FT5x06 not ready, ignoring frame");
            return Ok(TouchSample::empty());
        }
        let count = (status as usize).min(MAX_TOUCH_POINTS);

        let mut buf = [0u8; POINT_RECORD_LEN * MAX_TOUCH_POINTS];
        let len = count * POINT_RECORD_LEN;
        self.i2c
            .write_read(self.address, &[ADDR_TOUCH_POINTS], &mut buf[..len])
            .await?;

        let mut sample = TouchSample::empty();
        for record in buf[..len].chunks_exact(POINT_RECORD_LEN) {
            sample.push(parse_point(record));
        }
        Ok(sample)
    }
}

/// Decode one 6-byte point record
fn parse_point(record: &[u8]) -> RawPoint {
    let x = (((record[0] & 0x0F) as u16) << 8) | record[1] as u16;
    let y = (((record[2] & 0x0F) as u16) << 8) | record[3] as u16;
    let weight = record[4];

    let point = RawPoint::new(x, y);
    if weight == 0 {
        point
    } else {
        point.with_strength(weight as u16)
    }
}

impl<I2C, RST> TouchController for Ft5x06<I2C, RST>
where
    I2C: I2c,
    RST: ResetLine,
{
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::NONE
    }

    async fn read_data(&mut self) -> Result<(), TouchError> {
        self.frame = self
            .scan()
            .await
            .map_err(|e| e.into_touch_error("read touch points"))?;
        Ok(())
    }

    fn get_xy(&mut self) -> TouchSample {
        core::mem::take(&mut self.frame)
    }

    async fn enter_sleep(&mut self) -> Result<(), TouchError> {
        self.write_power_mode(PowerMode::Hibernate)
            .await
            .map_err(|e| e.into_touch_error("enter hibernate"))
    }

    /// Hibernate is only left through a hardware reset
    async fn exit_sleep(&mut self) -> Result<(), TouchError> {
        if !self.reset.is_present() {
            return Err(TouchError::unsupported("exit_sleep without reset line"));
        }
        self.reset.reset().await?;
        self.frame.clear();
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), TouchError> {
        self.frame.clear();
        if let Err(e) = self.write_power_mode(PowerMode::Hibernate).await {
            warn!("FT5x06 could not be put to sleep on teardown: {:?}", e);
            return Err(TouchError::io("enter hibernate"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_async::i2c::{ErrorType, Operation};

    /// Register-file backed I2C device
    struct MockBus {
        registers: [u8; 256],
        pointer: u8,
        fail: bool,
    }

    impl MockBus {
        fn new() -> Self {
            Self {
                registers: [0; 256],
                pointer: 0,
                fail: false,
            }
        }

        fn with_points(points: &[(u16, u16, u8)]) -> Self {
            let mut bus = Self::new();
            bus.registers[ADDR_TD_STATUS as usize] = points.len() as u8;
            for (i, (x, y, weight)) in points.iter().enumerate() {
                let base = ADDR_TOUCH_POINTS as usize + i * POINT_RECORD_LEN;
                // Event flag "contact" (0b10) in the top bits of XH
                bus.registers[base] = 0x80 | (x >> 8) as u8;
                bus.registers[base + 1] = *x as u8;
                bus.registers[base + 2] = (i as u8) << 4 | (y >> 8) as u8;
                bus.registers[base + 3] = *y as u8;
                bus.registers[base + 4] = *weight;
            }
            bus
        }
    }

    impl ErrorType for MockBus {
        type Error = ErrorKind;
    }

    impl I2c for MockBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail || address != I2C_ADDR {
                return Err(ErrorKind::Other);
            }
            for operation in operations {
                match operation {
                    Operation::Write(bytes) => {
                        if let Some((register, data)) = bytes.split_first() {
                            self.pointer = *register;
                            for (offset, value) in data.iter().enumerate() {
                                self.registers[self.pointer as usize + offset] = *value;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        let start = self.pointer as usize;
                        buf.copy_from_slice(&self.registers[start..start + buf.len()]);
                    }
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Records every level driven onto the reset line
    #[derive(Default)]
    struct RecordingPin {
        levels: heapless::Vec<bool, 8>,
    }

    impl PinErrorType for RecordingPin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            let _ = self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            let _ = self.levels.push(true);
            Ok(())
        }
    }

    #[test]
    fn test_scan_decodes_twelve_bit_coordinates() {
        let mut touch = Ft5x06::new(MockBus::with_points(&[(0x123, 0x0AB, 0), (300, 200, 17)]), NoReset);
        let sample = block_on(touch.scan()).unwrap();

        assert_eq!(sample.contact_count(), 2);
        assert_eq!(sample.points()[0], RawPoint::new(0x123, 0x0AB));
        assert_eq!(sample.points()[1], RawPoint::new(300, 200).with_strength(17));
    }

    #[test]
    fn test_post_reset_status_is_no_touch() {
        let mut bus = MockBus::new();
        bus.registers[ADDR_TD_STATUS as usize] = 0xFF;
        let mut touch = Ft5x06::new(bus, NoReset);
        assert!(block_on(touch.scan()).unwrap().is_empty());
    }

    #[test]
    fn test_contact_count_is_capped() {
        let points = [(10, 10, 0), (20, 20, 0), (30, 30, 0), (40, 40, 0), (50, 50, 0), (60, 60, 0)];
        let mut touch = Ft5x06::new(MockBus::with_points(&points), NoReset);
        let sample = block_on(touch.scan()).unwrap();

        assert_eq!(sample.contact_count() as usize, MAX_TOUCH_POINTS);
        assert_eq!(sample.points()[4], RawPoint::new(50, 50));
    }

    #[test]
    fn test_get_xy_consumes_frame() {
        let mut touch = Ft5x06::new(MockBus::with_points(&[(10, 20, 0)]), NoReset);
        block_on(touch.read_data()).unwrap();
        assert_eq!(touch.get_xy().contact_count(), 1);
        assert!(touch.get_xy().is_empty());
    }

    #[test]
    fn test_bus_failure_maps_to_io_error() {
        let mut bus = MockBus::new();
        bus.fail = true;
        let mut touch = Ft5x06::new(bus, NoReset);
        assert!(matches!(block_on(touch.read_data()), Err(TouchError::Io { .. })));
    }

    #[test]
    fn test_init_writes_vendor_defaults() {
        let mut touch = Ft5x06::new(MockBus::new(), NoReset);
        block_on(touch.init(InterruptMode::Polling)).unwrap();
        let (bus, _) = touch.release();
        assert_eq!(bus.registers[ADDR_THGROUP as usize], 70);
        assert_eq!(bus.registers[ADDR_PERIOD_ACTIVE as usize], 12);
        assert_eq!(bus.registers[ADDR_PERIOD_MONITOR as usize], 40);
        assert_eq!(bus.registers[ADDR_G_MODE as usize], InterruptMode::Polling as u8);
    }

    #[test]
    fn test_init_selects_trigger_mode_for_wired_int() {
        let mode = InterruptMode::for_interrupt_line(true);
        assert_eq!(mode, InterruptMode::Trigger);
        assert_eq!(InterruptMode::for_interrupt_line(false), InterruptMode::Polling);

        let mut touch = Ft5x06::new(MockBus::new(), NoReset);
        block_on(touch.init(mode)).unwrap();
        let (bus, _) = touch.release();
        assert_eq!(bus.registers[ADDR_G_MODE as usize], InterruptMode::Trigger as u8);
    }

    #[test]
    fn test_init_fails_when_chip_does_not_answer() {
        let mut bus = MockBus::new();
        bus.fail = true;
        let mut touch = Ft5x06::new(bus, NoReset);
        assert!(matches!(
            block_on(touch.init(InterruptMode::Polling)),
            Err(TouchError::Io { operation: "read chip id" })
        ));
        let (bus, _) = touch.release();
        assert_eq!(bus.registers[ADDR_THGROUP as usize], 0);
    }

    #[test]
    fn test_sleep_requires_reset_line_to_wake() {
        let mut touch = Ft5x06::new(MockBus::new(), NoReset);
        block_on(touch.enter_sleep()).unwrap();
        assert_eq!(block_on(touch.read_power_mode()).unwrap(), PowerMode::Hibernate);
        assert!(block_on(touch.exit_sleep()).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_exit_sleep_pulses_active_low_reset() {
        let reset = GpioReset::new(RecordingPin::default(), NoDelay, ActiveLevel::Low);
        let mut touch = Ft5x06::new(MockBus::new(), reset);
        block_on(touch.enter_sleep()).unwrap();
        block_on(touch.exit_sleep()).unwrap();

        let (_, reset) = touch.release();
        assert_eq!(reset.pin.levels.as_slice(), &[false, true]);
    }

    #[test]
    fn test_has_no_native_orientation() {
        let touch = Ft5x06::new(MockBus::new(), NoReset);
        assert_eq!(touch.capabilities(), CapabilitySet::NONE);
    }
}
