//! Font metrics for surface layout.
//!
//! Two sources of advance widths:
//! - a static em-width table for a humanist sans (Inter proportions), always available;
//! - a TrueType/OpenType face loaded with `ttf-parser`, used when a font file is configured.
//!
//! Both measure in em units scaled by the font size in CSS pixels. The static table is an
//! approximation; it is good enough for word wrap and lets the engine run without any font file.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters). Index = (char as usize) - 32.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Bold runs are measured (and drawn) this much wider than regular ones.
pub const BOLD_WIDTH: f32 = 1.06;

// ────────────────────────────────────────────────────────────────────────────
// Text style
// ────────────────────────────────────────────────────────────────────────────

/// Size in CSS pixels plus weight. Everything a measurement needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
}

impl TextStyle {
    pub fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    pub fn width_factor(self) -> f32 {
        if self.bold {
            BOLD_WIDTH
        } else {
            1.0
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table.
///
/// `widths[i]` = width of ASCII character `(i + 32)` in em units, covering 0x20 (space)
/// through 0x7E (~).
#[derive(Debug)]
pub struct MetricTable {
    pub name: &'static str,
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    /// Ascent above the baseline, in em.
    pub ascent: f32,
}

impl MetricTable {
    /// Width of a string in em units. Non-ASCII characters use `average_char_width`.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }
}

/// Humanist sans-serif, Inter proportions.
pub static SANS: MetricTable = MetricTable {
    name: "sans",
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
    ascent: 0.80,
};

// ────────────────────────────────────────────────────────────────────────────
// Loaded font face
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FontError {
    #[error("could not read font file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse font: {0}")]
    Parse(ttf_parser::FaceParsingError),

    #[error("font has no usable units-per-em")]
    NoMetrics,
}

/// A parsed TrueType/OpenType face.
///
/// Owns the font bytes; `ttf_parser::Face` borrows them and is cheap to re-parse, so the
/// parsed face is produced on demand by `face()`. ASCII advances are cached at load time.
pub struct FontFace {
    data: Vec<u8>,
    units_per_em: f32,
    ascent: f32,
    ascii_advances: [f32; 95],
    average_advance: f32,
}

impl FontFace {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(FontError::Parse)?;
        let units_per_em = face.units_per_em() as f32;
        if units_per_em <= 0.0 {
            return Err(FontError::NoMetrics);
        }

        let mut ascii_advances = [0.0_f32; 95];
        for (slot, code) in ascii_advances.iter_mut().zip(32u8..=126) {
            *slot = face
                .glyph_index(code as char)
                .and_then(|g| face.glyph_hor_advance(g))
                .map(|adv| adv as f32 / units_per_em)
                .unwrap_or(0.0);
        }
        let known: Vec<f32> = ascii_advances.iter().copied().filter(|w| *w > 0.0).collect();
        let average_advance = if known.is_empty() {
            SANS.average_char_width
        } else {
            known.iter().sum::<f32>() / known.len() as f32
        };
        let ascent = face.ascender() as f32 / units_per_em;

        debug!(
            "Loaded font face: {} glyphs, {} units/em",
            face.number_of_glyphs(),
            units_per_em
        );

        Ok(Self {
            data,
            units_per_em,
            ascent,
            ascii_advances,
            average_advance,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, FontError> {
        let data = tokio::fs::read(path).await?;
        Self::from_bytes(data)
    }

    /// The parsed face. `None` only if the bytes stopped parsing, which `from_bytes` rules out.
    pub fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }

    pub fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    /// Advance of one character in em units.
    pub fn advance_em(&self, face: Option<&ttf_parser::Face<'_>>, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            let cached = self.ascii_advances[code - 32];
            if cached > 0.0 {
                return cached;
            }
        }
        face.and_then(|f| f.glyph_index(c).and_then(|g| f.glyph_hor_advance(g)))
            .map(|adv| adv as f32 / self.units_per_em)
            .unwrap_or(self.average_advance)
    }

    pub fn measure_em(&self, s: &str) -> f32 {
        if s.is_ascii() {
            return s.chars().map(|c| self.advance_em(None, c)).sum();
        }
        let face = self.face();
        s.chars().map(|c| self.advance_em(face.as_ref(), c)).sum()
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes", &self.data.len())
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typeface
// ────────────────────────────────────────────────────────────────────────────

/// What layout measures with and the rasterizer draws with.
#[derive(Debug, Clone)]
pub enum Typeface {
    Builtin(&'static MetricTable),
    Loaded(Arc<FontFace>),
}

impl Default for Typeface {
    fn default() -> Self {
        Typeface::Builtin(&SANS)
    }
}

impl Typeface {
    /// Width of `s` in CSS pixels.
    pub fn measure(&self, s: &str, style: TextStyle) -> f32 {
        let em = match self {
            Typeface::Builtin(table) => table.measure_em(s),
            Typeface::Loaded(face) => face.measure_em(s),
        };
        em * style.size * style.width_factor()
    }

    /// Distance from the top of the em box to the baseline, in CSS pixels.
    pub fn ascent(&self, style: TextStyle) -> f32 {
        let em = match self {
            Typeface::Builtin(table) => table.ascent,
            Typeface::Loaded(face) => face.ascent,
        };
        em * style.size
    }

    /// The outline source, if this typeface can draw glyphs.
    pub fn font_face(&self) -> Option<&FontFace> {
        match self {
            Typeface::Builtin(_) => None,
            Typeface::Loaded(face) => Some(face),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
