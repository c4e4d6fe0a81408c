//! Embassy tasks for touch input and the tilt readout

use embassy_time::{Duration, Ticker};
use lcd_touch_core::ft5x06::Ft5x06;
use lcd_touch_core::input::{PointerInput, TouchEvent};
use lcd_touch_core::qmi8658::Qmi8658;
use lcd_touch_core::tilt::TiltAngles;
use log::{debug, info, warn};

use crate::board::IMU_PERIOD_MS;
use crate::hardware::BoardI2c;

pub type BoardTouch = PointerInput<Ft5x06<BoardI2c>>;
pub type BoardImu = Qmi8658<BoardI2c>;

/// Poll the panel on a fixed cadence and report pointer edges
#[embassy_executor::task]
pub async fn touch_task(mut input: BoardTouch, period_ms: u64) {
    info!("Touch task polling every {} ms", period_ms);
    let mut ticker = Ticker::every(Duration::from_millis(period_ms));

    loop {
        ticker.next().await;

        // With an INT line wired, an idle panel parks the task until it fires
        if !input.take_read_request() {
            input.wait_for_read_request().await;
        }

        match input.poll_event().await {
            Some(TouchEvent::Press(point)) => info!("Touch down at ({}, {})", point.x, point.y),
            Some(TouchEvent::Drag(point)) => debug!("Touch moved to ({}, {})", point.x, point.y),
            Some(TouchEvent::Release(point)) => info!("Touch up at ({}, {})", point.x, point.y),
            None => {}
        }
    }
}

/// Sample the accelerometer once a second and log the tilt readout
#[embassy_executor::task]
pub async fn imu_task(mut imu: BoardImu) {
    let mut ticker = Ticker::every(Duration::from_millis(IMU_PERIOD_MS));

    loop {
        ticker.next().await;

        match imu.read_sample().await {
            Ok(Some(sample)) => {
                let tilt = TiltAngles::from_sample(&sample);
                info!("{}", tilt.label());
            }
            Ok(None) => {}
            Err(e) => warn!("QMI8658 read failed: {:?}", e),
        }
    }
}
