// Color Selector - picks the color for a slot or beam from the active color mode
use rand::Rng;

use crate::settings::ColorMode;
use crate::types::Rgb;

/// Pick a color for the given mode.
///
/// Random mode draws a hue directly at full saturation and brightness, so the
/// result is never black and no retry is needed.
pub fn pick_color<R: Rng + ?Sized>(color_mode: ColorMode, hue: u8, rng: &mut R) -> Rgb {
    match color_mode {
        ColorMode::Black => Rgb::BLACK,
        ColorMode::Random => Rgb::from_hue(rng.gen()),
        ColorMode::White => Rgb::WHITE,
        ColorMode::Hue => Rgb::from_hue(hue),
    }
}
