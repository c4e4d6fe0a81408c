//! QMI8658 6-axis IMU driver
//!
//! Only what the tilt readout needs: identity check, a fixed accelerometer and
//! gyroscope configuration, and raw sample reads.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{debug, info, warn};

pub const I2C_ADDR: u8 = 0x6A;

pub const CHIP_ID: u8 = 0x05;

// =============================================================================
// Registers
// =============================================================================

pub const REG_WHO_AM_I: u8 = 0x00;
pub const REG_CTRL1: u8 = 0x02;
pub const REG_CTRL2: u8 = 0x03;
pub const REG_CTRL3: u8 = 0x04;
pub const REG_CTRL7: u8 = 0x08;
pub const REG_STATUS0: u8 = 0x2E;
pub const REG_AX_L: u8 = 0x35;
pub const REG_RESET: u8 = 0x60;

const RESET_COMMAND: u8 = 0xB0;
const RESET_SETTLE_MS: u32 = 10;

/// STATUS0 bits: accelerometer / gyroscope data available
const STATUS_DATA_READY: u8 = 0x03;

/// Register writes applied after reset, in order
const CONFIG_SEQUENCE: [(u8, u8); 4] = [
    // Address auto-increment
    (REG_CTRL1, 0x40),
    // Enable accelerometer and gyroscope
    (REG_CTRL7, 0x03),
    // Accelerometer +-4 g, 250 Hz
    (REG_CTRL2, 0x95),
    // Gyroscope 512 dps, 250 Hz
    (REG_CTRL3, 0xD5),
];

#[derive(Debug)]
pub enum Error<E> {
    I2c(E),
    /// WHO_AM_I never reported the QMI8658 id; holds the last value read
    UnexpectedChipId(u8),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}

/// One accelerometer + gyroscope sample in raw sensor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImuSample {
    pub acc: [i16; 3],
    pub gyr: [i16; 3],
}

impl ImuSample {
    /// Decode the 12 little-endian bytes starting at AX_L
    pub fn from_le_bytes(buf: &[u8; 12]) -> Self {
        let word = |i: usize| i16::from_le_bytes([buf[i * 2], buf[i * 2 + 1]]);
        Self {
            acc: [word(0), word(1), word(2)],
            gyr: [word(3), word(4), word(5)],
        }
    }
}

pub struct Qmi8658<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Qmi8658<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: I2C_ADDR,
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn read_registers(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c.write_read(self.address, &[register], buf).await?;
        Ok(())
    }

    async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c.write(self.address, &[register, value]).await?;
        Ok(())
    }

    pub async fn read_chip_id(&mut self) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.read_registers(REG_WHO_AM_I, &mut buf).await?;
        Ok(buf[0])
    }

    /// Wait for the chip to identify itself, then reset and configure it.
    ///
    /// The identity check is retried up to `attempts` times, one second apart.
    pub async fn init<D: DelayNs>(&mut self, delay: &mut D, attempts: u8) -> Result<(), Error<E>> {
        let mut id = 0;
        for attempt in 0..attempts.max(1) {
            if attempt > 0 {
                delay.delay_ms(1000).await;
            }
            match self.read_chip_id().await {
                Ok(CHIP_ID) => {
                    id = CHIP_ID;
                    break;
                }
                Ok(other) => {
                    warn!("QMI8658: chip id {:#04x}, waiting for {:#04x}", other, CHIP_ID);
                    id = other;
                }
                Err(_) => warn!("QMI8658: no answer on attempt {}", attempt + 1),
            }
        }
        if id != CHIP_ID {
            return Err(Error::UnexpectedChipId(id));
        }
        info!("QMI8658 OK!");

        self.write_register(REG_RESET, RESET_COMMAND).await?;
        delay.delay_ms(RESET_SETTLE_MS).await;

        for (register, value) in CONFIG_SEQUENCE {
            self.write_register(register, value).await?;
        }

        info!("QMI8658 configured");
        Ok(())
    }

    /// Read one sample if the sensor has fresh data, `None` otherwise
    pub async fn read_sample(&mut self) -> Result<Option<ImuSample>, Error<E>> {
        let mut status = [0u8; 1];
        self.read_registers(REG_STATUS0, &mut status).await?;
        if status[0] & STATUS_DATA_READY == 0 {
            debug!("QMI8658: no new data (status {:#04x})", status[0]);
            return Ok(None);
        }

        let mut buf = [0u8; 12];
        self.read_registers(REG_AX_L, &mut buf).await?;
        Ok(Some(ImuSample::from_le_bytes(&buf)))
    }
}
