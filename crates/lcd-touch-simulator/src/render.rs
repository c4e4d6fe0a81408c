//! Scene drawing for the simulator window

use std::collections::VecDeque;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::iso_8859_1::FONT_6X10;
use embedded_graphics::pixelcolor::{Rgb565, WebColors};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use embedded_graphics::text::Text;
use lcd_touch_core::sample::NormalizedPoint;

const LINE_HEIGHT: i32 = 12;
const CROSSHAIR_ARM: i32 = 8;

/// Everything one frame shows
pub struct Scene<'a> {
    pub pointer: Option<NormalizedPoint>,
    pub trail: &'a VecDeque<Point>,
    pub status: &'a [String],
    /// Backlight level, 0..=100
    pub brightness: u8,
}

pub fn draw_scene<D>(display: &mut D, scene: &Scene<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(Rgb565::BLACK)?;

    let text_color = dimmed(Rgb565::WHITE, scene.brightness);
    let trail_color = dimmed(Rgb565::CSS_DODGER_BLUE, scene.brightness);
    let pointer_color = dimmed(Rgb565::CSS_ORANGE, scene.brightness);

    for point in scene.trail {
        Circle::with_center(*point, 3)
            .into_styled(PrimitiveStyle::with_fill(trail_color))
            .draw(display)?;
    }

    if let Some(pointer) = scene.pointer {
        let center = pointer.to_point();
        let stroke = PrimitiveStyle::with_stroke(pointer_color, 1);
        Line::new(center - Point::new(CROSSHAIR_ARM, 0), center + Point::new(CROSSHAIR_ARM, 0))
            .into_styled(stroke)
            .draw(display)?;
        Line::new(center - Point::new(0, CROSSHAIR_ARM), center + Point::new(0, CROSSHAIR_ARM))
            .into_styled(stroke)
            .draw(display)?;
        Circle::with_center(center, 11).into_styled(stroke).draw(display)?;
    }

    let style = MonoTextStyle::new(&FONT_6X10, text_color);
    for (row, line) in scene.status.iter().enumerate() {
        Text::new(line, Point::new(4, 10 + row as i32 * LINE_HEIGHT), style).draw(display)?;
    }

    Ok(())
}

/// Scale a color by the backlight percentage
fn dimmed(color: Rgb565, brightness: u8) -> Rgb565 {
    let scale = |channel: u8| (channel as u16 * brightness as u16 / 100) as u8;
    Rgb565::new(scale(color.r()), scale(color.g()), scale(color.b()))
}
