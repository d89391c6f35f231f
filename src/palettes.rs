// Palettes Module - 16-entry color palettes the fire simulation maps heat through
//
// Sampling blends between neighbouring entries and wraps from the last entry
// back to the first, so an index covers the palette as a closed loop.
use crate::settings::FirePalette;
use crate::types::Rgb;

const fn palette(entries: [u32; 16]) -> [Rgb; 16] {
    let mut out = [Rgb::BLACK; 16];
    let mut i = 0;
    while i < 16 {
        out[i] = Rgb::from_u32(entries[i]);
        i += 1;
    }
    out
}

// black -> red -> yellow -> white
static HEAT: [Rgb; 16] = palette([
    0x000000, 0x330000, 0x660000, 0x990000, 0xCC0000, 0xFF0000, 0xFF3300, 0xFF6600,
    0xFF9900, 0xFFCC00, 0xFFFF00, 0xFFFF33, 0xFFFF66, 0xFFFF99, 0xFFFFCC, 0xFFFFFF,
]);

static RAINBOW: [Rgb; 16] = palette([
    0xFF0000, 0xD52A00, 0xAB5500, 0xAB7F00, 0xABAB00, 0x56D500, 0x00FF00, 0x00D52A,
    0x00AB55, 0x0056AA, 0x0000FF, 0x2A00D5, 0x5500AB, 0x7F0081, 0xAB0055, 0xD5002B,
]);

static OCEAN: [Rgb; 16] = palette([
    0x191970, 0x00008B, 0x191970, 0x000080, 0x00008B, 0x0000CD, 0x2E8B57, 0x008080,
    0x5F9EA0, 0x0000FF, 0x008B8B, 0x6495ED, 0x7FFFD4, 0x2E8B57, 0x00FFFF, 0x87CEFA,
]);

static FOREST: [Rgb; 16] = palette([
    0x006400, 0x006400, 0x556B2F, 0x006400, 0x008000, 0x228B22, 0x6B8E23, 0x008000,
    0x2E8B57, 0x66CDAA, 0x32CD32, 0x9ACD32, 0x90EE90, 0x7CFC00, 0x66CDAA, 0x228B22,
]);

static PARTY: [Rgb; 16] = palette([
    0x5500AB, 0x84007C, 0xB5004B, 0xE5001B, 0xE81700, 0xB84700, 0xAB7700, 0xABAB00,
    0xAB5500, 0xDD2200, 0xF2000E, 0xC2003E, 0x8F0071, 0x5F00A1, 0x2F00D0, 0x0007F9,
]);

impl FirePalette {
    pub fn entries(&self) -> &'static [Rgb; 16] {
        match self {
            FirePalette::Heat => &HEAT,
            FirePalette::Rainbow => &RAINBOW,
            FirePalette::Ocean => &OCEAN,
            FirePalette::Forest => &FOREST,
            FirePalette::Party => &PARTY,
        }
    }

    /// Sample the palette at `index` (0-255)
    pub fn color_at(&self, index: u8) -> Rgb {
        let entries = self.entries();
        let hi = (index >> 4) as usize;
        let lo = index & 0x0F;
        let base = entries[hi];
        if lo == 0 {
            return base;
        }
        let next = entries[(hi + 1) % entries.len()];
        base.blend(next, lo << 4)
    }
}
