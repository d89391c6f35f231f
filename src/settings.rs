// Settings Module - Externally controlled display/color modes read by the engine on every call
use crate::engine::Shape;

const SOLID_BRIGHTNESS: u8 = 100;
const PATTERN_BRIGHTNESS: u8 = 200;

/// Top-level rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Beat-pattern driven shapes
    #[default]
    Normal,
    /// Every beam fully lit, one color per beam
    Solid,
    /// Fire simulation on every beam
    Fire,
}

impl DisplayMode {
    pub fn name(&self) -> &'static str {
        match self {
            DisplayMode::Normal => "normal",
            DisplayMode::Solid => "solid",
            DisplayMode::Fire => "fire",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "pattern" => Some(DisplayMode::Normal),
            "solid" => Some(DisplayMode::Solid),
            "fire" => Some(DisplayMode::Fire),
            _ => None,
        }
    }

    /// Brightness the driver applies to frames rendered in this mode
    pub fn brightness(&self) -> u8 {
        match self {
            DisplayMode::Solid => SOLID_BRIGHTNESS,
            DisplayMode::Normal | DisplayMode::Fire => PATTERN_BRIGHTNESS,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            DisplayMode::Normal => DisplayMode::Solid,
            DisplayMode::Solid => DisplayMode::Fire,
            DisplayMode::Fire => DisplayMode::Normal,
        }
    }
}

/// How the color selector picks slot colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// `Settings::hue` at full saturation
    Hue,
    /// A fresh random hue per pick
    #[default]
    Random,
    /// Monochrome white
    White,
    /// Everything off
    Black,
}

impl ColorMode {
    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Hue => "hue",
            ColorMode::Random => "random",
            ColorMode::White => "white",
            ColorMode::Black => "black",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hue" | "fixed" => Some(ColorMode::Hue),
            "random" => Some(ColorMode::Random),
            "white" | "mono" | "monochrome" => Some(ColorMode::White),
            "black" | "off" => Some(ColorMode::Black),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ColorMode::Hue => ColorMode::Random,
            ColorMode::Random => ColorMode::White,
            ColorMode::White => ColorMode::Black,
            ColorMode::Black => ColorMode::Hue,
        }
    }
}

/// Palette the fire simulation maps heat through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirePalette {
    #[default]
    Heat,
    Rainbow,
    Ocean,
    Forest,
    Party,
}

impl FirePalette {
    pub const ALL: [FirePalette; 5] = [
        FirePalette::Heat,
        FirePalette::Rainbow,
        FirePalette::Ocean,
        FirePalette::Forest,
        FirePalette::Party,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FirePalette::Heat => "heat",
            FirePalette::Rainbow => "rainbow",
            FirePalette::Ocean => "ocean",
            FirePalette::Forest => "forest",
            FirePalette::Party => "party",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.iter().copied().find(|p| p.name() == s)
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Named hue presets matching the controller's color buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Red,
    Green,
    Gold,
    Blue,
    Pink,
    Cyan,
}

impl NamedColor {
    pub const ALL: [NamedColor; 6] = [
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Gold,
        NamedColor::Blue,
        NamedColor::Pink,
        NamedColor::Cyan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NamedColor::Red => "red",
            NamedColor::Green => "green",
            NamedColor::Gold => "gold",
            NamedColor::Blue => "blue",
            NamedColor::Pink => "pink",
            NamedColor::Cyan => "cyan",
        }
    }

    /// 8-bit hue (0-255 around the wheel)
    pub fn hue(&self) -> u8 {
        match self {
            NamedColor::Red => 0,
            NamedColor::Gold => 30,
            NamedColor::Green => 85,
            NamedColor::Cyan => 128,
            NamedColor::Blue => 170,
            NamedColor::Pink => 224,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.iter().copied().find(|c| c.name() == s)
    }
}

/// Resolve a color setting: either a preset name or a raw 0-255 hue
pub fn parse_hue(s: &str) -> Option<u8> {
    NamedColor::parse(s)
        .map(|c| c.hue())
        .or_else(|| s.trim().parse::<u8>().ok())
}

/// Settings record handed to the engine on every construction/call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    pub display_mode: DisplayMode,
    pub color_mode: ColorMode,
    pub hue: u8,
    /// 0 = per-slot random shape, 1..=7 = force every slot to that shape
    pub forced_pattern: u8,
    pub fire_palette: FirePalette,
}

impl Settings {
    /// Shape forced by `forced_pattern`, if any. Out-of-range values count as no override.
    pub fn forced_shape(&self) -> Option<Shape> {
        if self.forced_pattern == 0 {
            return None;
        }
        Shape::from_index(self.forced_pattern)
    }
}
