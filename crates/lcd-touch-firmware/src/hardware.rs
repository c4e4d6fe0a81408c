//! Peripheral setup for the touch board

use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use esp_hal::i2c::master::{Config as I2cConfig, ConfigError, I2c};
use esp_hal::time::Rate;
use esp_hal::Async;
use log::info;
use static_cell::StaticCell;

use crate::board::I2C_FREQUENCY_KHZ;

pub type BoardI2cBus = I2c<'static, Async>;

/// One device's handle on the board's shared I2C bus. A transaction holds
/// the bus lock across its awaits, so the touch and IMU tasks never
/// interleave transfers.
pub type BoardI2c = I2cDevice<'static, CriticalSectionRawMutex, BoardI2cBus>;

/// Handles for the two devices on the shared bus
pub struct I2cDevices {
    pub touch: BoardI2c,
    pub imu: BoardI2c,
}

/// Create the async I2C master on the board's SDA/SCL pins
pub fn create_i2c_bus(
    i2c0: esp_hal::peripherals::I2C0<'static>,
    sda: esp_hal::peripherals::GPIO1<'static>,
    scl: esp_hal::peripherals::GPIO2<'static>,
) -> Result<BoardI2cBus, ConfigError> {
    let bus = I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ)),
    )?
    .with_sda(sda)
    .with_scl(scl)
    .into_async();
    info!("I2C bus up at {} kHz", I2C_FREQUENCY_KHZ);
    Ok(bus)
}

/// Move the bus into static storage and hand out one device per driver
pub fn share_i2c_bus(bus: BoardI2cBus) -> I2cDevices {
    static I2C0_BUS: StaticCell<Mutex<CriticalSectionRawMutex, BoardI2cBus>> = StaticCell::new();
    let bus = I2C0_BUS.init(Mutex::new(bus));

    I2cDevices {
        touch: I2cDevice::new(bus),
        imu: I2cDevice::new(bus),
    }
}
