//! Colors used by the visual tree.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
    /// Body copy. Never replaced by a template accent.
    pub const TEXT: Rgba = Rgba::rgb(0x33, 0x33, 0x33);
    pub const MUTED: Rgba = Rgba::rgb(0x66, 0x66, 0x66);
    pub const RULE: Rgba = Rgba::rgb(0xdd, 0xdd, 0xdd);
    pub const NEUTRAL_TAG: Rgba = Rgba::rgb(0xed, 0xf2, 0xf7);
    /// Used when a template's `primaryColor` cannot be parsed.
    pub const FALLBACK_ACCENT: Rgba = Rgba::rgb(0x2c, 0x3e, 0x50);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 0xff }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Rgba { a, ..self }
    }

    /// Parses `#rrggbb`, `#rrggbbaa` or `#rgb`. The leading `#` is optional.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
        match hex.len() {
            3 => Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?).with_alpha(byte(6)?)),
            _ => None,
        }
    }

    /// Composites this color over an opaque background, returning an opaque color.
    pub fn over(self, background: Rgba) -> Rgba {
        let a = self.a as u32;
        let mix = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        Rgba::rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}
