// Shared types module - Color value and 8-bit color math used by every renderer
use colorgrad::Color;

// RGB color representation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Build a color from a packed 0xRRGGBB value
    pub const fn from_u32(color: u32) -> Self {
        Rgb {
            r: ((color >> 16) & 0xFF) as u8,
            g: ((color >> 8) & 0xFF) as u8,
            b: (color & 0xFF) as u8,
        }
    }

    /// Fully saturated, full brightness color for an 8-bit hue (0-255 covers the whole wheel)
    pub fn from_hue(hue: u8) -> Self {
        Self::from_hsv(hue, 255, 255)
    }

    pub fn from_hsv(hue: u8, saturation: u8, value: u8) -> Self {
        let degrees = hue as f64 * 360.0 / 256.0;
        let rgba = Color::from_hsva(
            degrees,
            saturation as f64 / 255.0,
            value as f64 / 255.0,
            1.0,
        )
        .to_rgba8();
        Rgb { r: rgba[0], g: rgba[1], b: rgba[2] }
    }

    pub fn is_black(&self) -> bool {
        *self == Rgb::BLACK
    }

    /// Scale every channel by `brightness` (0 = off, 255 = unchanged)
    pub fn scaled(self, brightness: u8) -> Self {
        if brightness == 255 {
            return self;
        }
        Rgb {
            r: scale8(self.r, brightness),
            g: scale8(self.g, brightness),
            b: scale8(self.b, brightness),
        }
    }

    /// Linear blend towards `other` (0 = all self, 255 = almost all other)
    pub fn blend(self, other: Rgb, amount_of_other: u8) -> Self {
        Rgb {
            r: blend8(self.r, other.r, amount_of_other),
            g: blend8(self.g, other.g, amount_of_other),
            b: blend8(self.b, other.b, amount_of_other),
        }
    }
}

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
#[inline]
pub fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * scale as u16) >> 8) as u8
}

/// Blend two 8-bit values, exact when both are equal or `amount_of_b` is 0
#[inline]
pub fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let a = i32::from(a);
    let b = i32::from(b);
    (a + (((b - a) * i32::from(amount_of_b)) >> 8)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_zero_is_red() {
        let red = Rgb::from_hue(0);
        assert_eq!(red.r, 255);
        assert_eq!(red.g, 0);
        assert_eq!(red.b, 0);
    }

    #[test]
    fn full_hue_colors_are_never_black() {
        for hue in 0..=255u8 {
            assert!(!Rgb::from_hue(hue).is_black(), "hue {} rendered black", hue);
        }
    }

    #[test]
    fn scaling_keeps_full_and_zero() {
        let c = Rgb::new(200, 100, 50);
        assert_eq!(c.scaled(255), c);
        assert_eq!(c.scaled(0), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.scaled(128), Rgb::new(127, 127, 127));
    }

    #[test]
    fn blend_endpoints() {
        let a = Rgb::new(255, 0, 0);
        let b = Rgb::new(0, 0, 255);
        assert_eq!(a.blend(b, 0), a);
        assert_eq!(a.blend(b, 255), Rgb::new(0, 0, 254));
        let mid = a.blend(b, 128);
        assert!(mid.r > 100 && mid.b > 100);
    }

    #[test]
    fn blending_a_color_with_itself_is_lossless() {
        let c = Rgb::new(0, 100, 0);
        for amount in [1, 64, 128, 255] {
            assert_eq!(c.blend(c, amount), c, "amount {}", amount);
        }
    }

    #[test]
    fn packed_color_unpacks() {
        assert_eq!(Rgb::from_u32(0x123456), Rgb::new(0x12, 0x34, 0x56));
    }
}
