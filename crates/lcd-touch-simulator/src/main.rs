//! Desktop simulator for the lcd-touch input path.
//!
//! A simulated panel, mounted with the same orientation as the real board,
//! feeds mouse input through the core normalizer and pointer adapter. The
//! normalized pointer is drawn as a crosshair, so a wrong orientation flag
//! shows up as the crosshair drifting away from the cursor.
//!
//! # Key bindings
//!
//! | Key     | Action                                  |
//! |---------|-----------------------------------------|
//! | S       | Toggle swap-xy                          |
//! | X       | Toggle mirror-x                         |
//! | Y       | Toggle mirror-y                         |
//! | I       | Switch between polling and interrupt    |
//! | F       | Fail the next panel read                |
//! | Z       | Put the panel to sleep / wake it        |
//! | [ ]     | Nudge the Y calibration offset          |
//! | Up/Down | Backlight brightness                    |
//! | P       | Log a settings snapshot                 |
//! | Q       | Quit                                    |

mod panel;
mod render;

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use embassy_futures::block_on;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use lcd_touch_core::backlight::{Backlight, BacklightPwm, DUTY_MAX};
use lcd_touch_core::config::{Calibration, OrientationFlags, PinConfig, TouchConfig};
use lcd_touch_core::error::TouchError;
use lcd_touch_core::input::{PointerInput, TouchEvent};
use lcd_touch_core::interrupt::TouchNotifier;
use lcd_touch_core::normalizer::TouchNormalizer;
use lcd_touch_core::sample::NormalizedPoint;
use lcd_touch_core::settings::{SETTINGS_MAX_SIZE, TouchSettings};
use lcd_touch_core::tilt::TiltAngles;
use log::{debug, error, info, warn};

use panel::{SimulatedIrq, SimulatedPanel};
use render::{Scene, draw_scene};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH: u16 = 320;
const DISPLAY_HEIGHT: u16 = 240;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Input poll period, same cadence as the firmware default.
const FRAME_DURATION: Duration = Duration::from_millis(20);

const IMU_INTERVAL: Duration = Duration::from_secs(1);

const TRAIL_LEN: usize = 48;

/// How the board's panel is glued to the display
const MOUNT: OrientationFlags = OrientationFlags::new(true, true, false);

/// Virtual INT line of the simulated controller
const INT_PIN: PinConfig = PinConfig::active_low(4);

static SIM_TOUCH_READY: TouchNotifier = TouchNotifier::new();

type SimInput = PointerInput<SimulatedPanel>;

// ---------------------------------------------------------------------------
// Simulated peripherals
// ---------------------------------------------------------------------------

/// Backlight PWM for the window; the scene dims itself from the brightness
struct WindowBacklight;

impl BacklightPwm for WindowBacklight {
    fn set_duty(&mut self, duty: u16) -> Result<(), TouchError> {
        debug!("Window backlight duty {}/{}", duty, DUTY_MAX);
        Ok(())
    }
}

/// Accelerometer reading of a board rocking gently on a desk
fn synthetic_acceleration(t: f64) -> (i16, i16, i16) {
    const ONE_G: f64 = 8192.0;
    let roll = 0.6 * (t / 6.0).sin();
    let pitch = 0.4 * (t / 9.0).cos();
    (
        (ONE_G * roll.sin()) as i16,
        (ONE_G * pitch.sin()) as i16,
        (ONE_G * roll.cos() * pitch.cos()) as i16,
    )
}

// ---------------------------------------------------------------------------
// Key handling
// ---------------------------------------------------------------------------

fn handle_key(
    keycode: Keycode,
    input: &mut SimInput,
    irq: &mut SimulatedIrq,
    backlight: &mut Backlight<WindowBacklight>,
) {
    let flags = input.normalizer().config().flags;
    let touch = input.normalizer_mut();

    let result = match keycode {
        Keycode::S => block_on(touch.set_swap_xy(!flags.swap_xy)),
        Keycode::X => block_on(touch.set_mirror_x(!flags.mirror_x)),
        Keycode::Y => block_on(touch.set_mirror_y(!flags.mirror_y)),
        Keycode::I => {
            let notifier = if irq.is_attached() { None } else { Some(&SIM_TOUCH_READY) };
            touch.register_interrupt_callback(irq, notifier)
        }
        Keycode::F => {
            touch.controller_mut().inject_read_failure();
            Ok(())
        }
        Keycode::Z => {
            if touch.is_sleeping() {
                block_on(touch.exit_sleep())
            } else {
                block_on(touch.enter_sleep())
            }
        }
        Keycode::LeftBracket | Keycode::RightBracket => {
            let step = if keycode == Keycode::LeftBracket { -1 } else { 1 };
            let mut calibration = input.calibration();
            calibration.y_offset = calibration.y_offset.saturating_add(step);
            input.set_calibration(calibration);
            info!("Calibration y offset {}", calibration.y_offset);
            Ok(())
        }
        Keycode::Up | Keycode::Down => {
            let step = if keycode == Keycode::Up { 10 } else { -10 };
            backlight.set_brightness(backlight.brightness().percent() as i32 + step)
        }
        Keycode::P => {
            log_snapshot(input, backlight);
            Ok(())
        }
        _ => Ok(()),
    };

    if let Err(e) = result {
        warn!("{:?} failed: {}", keycode, e);
    }
}

fn log_snapshot(input: &SimInput, backlight: &Backlight<WindowBacklight>) {
    let mut settings = TouchSettings::from_config(input.normalizer().config(), input.calibration());
    settings.brightness_percent = backlight.brightness().percent();

    let mut buf = [0u8; SETTINGS_MAX_SIZE];
    match settings.encode(&mut buf) {
        Ok(bytes) => {
            let hex = bytes.iter().fold(String::new(), |mut out, b| {
                let _ = write!(out, "{b:02x}");
                out
            });
            info!("Settings snapshot ({} bytes): {}", bytes.len(), hex);
        }
        Err(e) => error!("Snapshot failed: {}", e),
    }
}

fn status_lines(input: &SimInput, irq: &SimulatedIrq, backlight: u8, tilt: &str) -> Vec<String> {
    let touch = input.normalizer();
    let flags = touch.config().flags;
    let on = |v: bool| if v { "on" } else { "off" };

    vec![
        format!(
            "swap:{} mirror_x:{} mirror_y:{}",
            on(flags.swap_xy),
            on(flags.mirror_x),
            on(flags.mirror_y)
        ),
        format!(
            "{} {} cal y:{}",
            if irq.is_attached() { "interrupt" } else { "polling" },
            if touch.is_sleeping() { "asleep" } else { "awake" },
            input.calibration().y_offset
        ),
        format!(
            "contact:{} failures:{} backlight:{}%",
            on(touch.controller().is_touched()),
            input.read_failures(),
            backlight
        ),
        tilt.to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting lcd-touch simulator");
    info!(
        "Display: {}×{} (scale {}×), panel mount {:?}",
        DISPLAY_WIDTH, DISPLAY_HEIGHT, WINDOW_SCALE, MOUNT
    );
    info!("Keys: S/X/Y=flags  I=irq  F=fail  Z=sleep  [ ]=cal  Up/Down=backlight  P=snapshot  Q=Quit");

    let config = TouchConfig::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
        .with_flags(MOUNT)
        .with_interrupt_pin(INT_PIN);
    let panel = SimulatedPanel::new(MOUNT, DISPLAY_WIDTH, DISPLAY_HEIGHT);
    let touch = match TouchNormalizer::new(panel, config) {
        Ok(touch) => touch,
        Err(e) => {
            error!("Touch setup failed: {}", e);
            return;
        }
    };
    let mut input = PointerInput::new(touch, Calibration::NONE);
    let mut irq = SimulatedIrq::default();
    let _ = block_on(input.self_test());

    let mut backlight = Backlight::new(WindowBacklight);
    if let Err(e) = backlight.on() {
        warn!("Backlight: {}", e);
    }

    // SDL2 display and window
    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(
        DISPLAY_WIDTH as u32,
        DISPLAY_HEIGHT as u32,
    ));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("lcd-touch Simulator", &output_settings);

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = display.clear(Rgb565::BLACK);
    window.update(&display);

    let started = Instant::now();
    let mut last_imu = Instant::now();
    let mut tilt = TiltAngles::default().label().as_str().to_string();
    let mut pointer: Option<NormalizedPoint> = None;
    let mut trail: VecDeque<Point> = VecDeque::with_capacity(TRAIL_LEN);
    let mut mouse_down = false;

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }
                    handle_key(keycode, &mut input, &mut irq, &mut backlight);
                }

                SimulatorEvent::MouseButtonDown { point, .. } => {
                    mouse_down = true;
                    input.normalizer_mut().controller_mut().press(point);
                    irq.fire();
                }

                SimulatorEvent::MouseMove { point } if mouse_down => {
                    input.normalizer_mut().controller_mut().press(point);
                    irq.fire();
                }

                SimulatorEvent::MouseButtonUp { .. } => {
                    mouse_down = false;
                    input.normalizer_mut().controller_mut().release();
                    irq.fire();
                }

                _ => {}
            }
        }

        // --- Touch poll ---------------------------------------------------
        if input.take_read_request() {
            match block_on(input.poll_event()) {
                Some(TouchEvent::Press(point)) | Some(TouchEvent::Drag(point)) => {
                    pointer = Some(point);
                    if trail.len() == TRAIL_LEN {
                        trail.pop_front();
                    }
                    trail.push_back(point.to_point());
                }
                Some(TouchEvent::Release(point)) => {
                    info!("Released at ({}, {})", point.x, point.y);
                    pointer = None;
                }
                None => {}
            }
        }

        // --- Tilt readout -------------------------------------------------
        if last_imu.elapsed() >= IMU_INTERVAL {
            let (ax, ay, az) = synthetic_acceleration(started.elapsed().as_secs_f64());
            tilt = TiltAngles::from_acceleration(ax, ay, az).label().as_str().to_string();
            last_imu = Instant::now();
        }

        // --- Render -------------------------------------------------------
        let brightness = backlight.brightness().percent();
        let status = status_lines(&input, &irq, brightness, &tilt);
        let scene = Scene {
            pointer,
            trail: &trail,
            status: &status,
            brightness,
        };
        if let Err(e) = draw_scene(&mut display, &scene) {
            error!("Draw error: {:?}", e);
        }
        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    if let Err(e) = block_on(input.normalizer_mut().teardown()) {
        warn!("Teardown: {}", e);
    }
    info!("Simulator exiting");
}
