#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::Io;
use esp_hal::timer::timg::TimerGroup;
use lcd_touch_core::backlight::Backlight;
use lcd_touch_core::ft5x06::{Ft5x06, InterruptMode, NoReset};
use lcd_touch_core::input::PointerInput;
use lcd_touch_core::normalizer::TouchNormalizer;
use lcd_touch_core::qmi8658::Qmi8658;
use lcd_touch_firmware::backlight::LedcBacklight;
use lcd_touch_firmware::board::{BoardSettings, IMU_PROBE_ATTEMPTS};
use lcd_touch_firmware::hardware::{create_i2c_bus, share_i2c_bus};
use lcd_touch_firmware::tasks::{imu_task, touch_task};
use lcd_touch_firmware::touch_irq::{GpioInterrupts, TOUCH_READY};
use log::{error, info, warn};
use static_cell::StaticCell;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let settings = BoardSettings::from_build_env();
    info!("Board settings: {:?}", settings);

    // Backlight
    let pwm = LedcBacklight::new(peripherals.LEDC, peripherals.GPIO42)
        .expect("Failed to configure backlight PWM");
    let mut backlight = Backlight::new(pwm);
    if let Err(e) = backlight.set_brightness(settings.brightness.percent() as i32) {
        warn!("Backlight stays dark: {}", e);
    }

    // Shared I2C bus: touch controller and IMU
    let bus = create_i2c_bus(peripherals.I2C0, peripherals.GPIO1, peripherals.GPIO2)
        .expect("Failed to create I2C bus");
    let devices = share_i2c_bus(bus);

    // Touch
    let mut controller = Ft5x06::new(devices.touch, NoReset);
    let int_mode = InterruptMode::for_interrupt_line(settings.interrupt_gpio.is_some());
    if let Err(e) = controller.init(int_mode).await {
        error!("Touch controller init failed: {}", e);
    }

    let mut touch = TouchNormalizer::new(controller, settings.touch_config())
        .expect("Invalid touch configuration");

    if let Some(gpio) = settings.interrupt_gpio {
        static GPIO_INTERRUPTS: StaticCell<GpioInterrupts> = StaticCell::new();
        // SAFETY: TOUCH_INT_GPIO names a pin that nothing else on this board
        // drives; the bus, backlight and strapping pins are taken above
        let irq = GPIO_INTERRUPTS.init(unsafe { GpioInterrupts::new(Io::new(peripherals.IO_MUX), gpio) });
        if let Err(e) = touch.register_interrupt_callback(irq, Some(&TOUCH_READY)) {
            warn!("Touch interrupt unavailable ({}), polling instead", e);
        }
    }

    let mut input = PointerInput::new(touch, settings.calibration);
    // Failure is logged; the task keeps polling and recovers if the panel wakes
    let _ = input.self_test().await;

    spawner.spawn(touch_task(input, settings.poll_ms).expect("touch task already running"));

    // IMU
    let mut imu = Qmi8658::new(devices.imu);
    match imu.init(&mut Delay, IMU_PROBE_ATTEMPTS).await {
        Ok(()) => spawner.spawn(imu_task(imu).expect("imu task already running")),
        Err(e) => error!("QMI8658 unavailable, tilt readout disabled: {:?}", e),
    }

    loop {
        Timer::after(Duration::from_secs(60)).await;
        info!("Alive, backlight at {}%", backlight.brightness().percent());
    }
}
