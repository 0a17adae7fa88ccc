//! Rasterizes a laid-out `Surface` with tiny-skia, one page band at a time.
//!
//! Only a single page-sized pixmap is alive at once, so the surface can be arbitrarily tall.

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::warn;
use ttf_parser::OutlineBuilder;

use crate::export::pagination::{PagePlan, PageSlice};
use crate::export::ExportError;
use crate::layout::{DrawOp, FontFace, Surface, TextStyle, Typeface};
use crate::render::Rgba;

/// Upper bound on one page band; past this the surface is reported unavailable.
pub const MAX_BAND_PIXELS: u64 = 64 * 1024 * 1024;

/// Greeked text bars are this fraction of the font size tall.
const BAR_HEIGHT: f32 = 0.45;

/// One page worth of opaque RGB pixels: exactly the raster rows of its window.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Row-major RGB, 3 bytes per pixel.
    pub rgb: Vec<u8>,
}

// ────────────────────────────────────────────────────────────────────────────
// Rasterization
// ────────────────────────────────────────────────────────────────────────────

struct PathConverter(PathBuilder);

impl OutlineBuilder for PathConverter {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

fn paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Pixel size of the whole surface at `scale` device pixels per CSS pixel.
pub fn raster_size(surface: &Surface, scale: f32) -> Result<(u32, u32), ExportError> {
    let width = (surface.width * scale).round().max(0.0) as u32;
    let height = (surface.height * scale).round().max(0.0) as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::SurfaceUnavailable { width, height });
    }
    Ok((width, height))
}

/// Draws raster rows `top..top + rows` of the surface at `scale`.
///
/// Text is drawn from glyph outlines when the typeface has a font face. Without one, each word
/// becomes a proportional bar so the page structure stays readable.
pub fn rasterize_band(
    surface: &Surface,
    typeface: &Typeface,
    scale: f32,
    top: u32,
    rows: u32,
) -> Result<Pixmap, ExportError> {
    let width = (surface.width * scale).round().max(0.0) as u32;
    let unavailable = ExportError::SurfaceUnavailable {
        width,
        height: rows,
    };
    if width == 0 || rows == 0 || width as u64 * rows as u64 > MAX_BAND_PIXELS {
        return Err(unavailable);
    }
    let mut pixmap = Pixmap::new(width, rows).ok_or(unavailable)?;
    let bg = surface.background;
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));

    let base = Transform::from_scale(scale, scale).post_translate(0.0, -(top as f32));
    // band edges in surface units, with a pixel of slack for anti-aliasing
    let band_top = (top as f32 - 1.0) / scale;
    let band_bottom = (top + rows) as f32 / scale + 1.0 / scale;
    let face = typeface.font_face();

    for op in surface.ops.iter().filter(|op| {
        let (op_top, op_bottom) = vertical_extent(op);
        op_bottom >= band_top && op_top <= band_bottom
    }) {
        match op {
            DrawOp::FillRect { x, y, w, h, color } => {
                if let Some(rect) = Rect::from_xywh(*x, *y, *w, *h) {
                    pixmap.fill_rect(rect, &paint(*color), base, None);
                }
            }
            DrawOp::StrokeRect {
                x,
                y,
                w,
                h,
                width,
                color,
            } => {
                if let Some(rect) = Rect::from_xywh(*x, *y, *w, *h) {
                    let path = PathBuilder::from_rect(rect);
                    let stroke = Stroke {
                        width: *width,
                        ..Stroke::default()
                    };
                    pixmap.stroke_path(&path, &paint(*color), &stroke, base, None);
                }
            }
            DrawOp::Circle { cx, cy, r, color } => {
                if let Some(path) = PathBuilder::from_circle(*cx, *cy, *r) {
                    pixmap.fill_path(&path, &paint(*color), FillRule::Winding, base, None);
                }
            }
            DrawOp::Text {
                x,
                baseline,
                style,
                color,
                text,
            } => match face {
                Some(face) => draw_glyphs(&mut pixmap, face, base, *x, *baseline, *style, *color, text),
                None => draw_bars(&mut pixmap, typeface, base, *x, *baseline, *style, *color, text),
            },
        }
    }

    Ok(pixmap)
}

/// Top and bottom of what `op` can paint, in surface units.
fn vertical_extent(op: &DrawOp) -> (f32, f32) {
    match op {
        DrawOp::FillRect { y, h, .. } => (*y, y + h),
        DrawOp::StrokeRect { y, h, width, .. } => (y - width, y + h + width),
        DrawOp::Circle { cy, r, .. } => (cy - r, cy + r),
        // generous: covers ascenders, descenders and faux-bold strokes
        DrawOp::Text {
            baseline, style, ..
        } => (baseline - style.size * 1.5, baseline + style.size * 0.5),
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_glyphs(
    pixmap: &mut Pixmap,
    font: &FontFace,
    base: Transform,
    x: f32,
    baseline: f32,
    style: TextStyle,
    color: Rgba,
    text: &str,
) {
    let Some(face) = font.face() else {
        return;
    };
    let units = style.size / font.units_per_em();
    let paint = paint(color);
    // faux bold: outline stroke in font units
    let embolden = style.bold.then(|| Stroke {
        width: font.units_per_em() * 0.03,
        ..Stroke::default()
    });

    let mut pen_x = x;
    for c in text.chars() {
        let advance = font.advance_em(Some(&face), c) * style.size * style.width_factor();
        if let Some(glyph) = face.glyph_index(c) {
            let mut converter = PathConverter(PathBuilder::new());
            if face.outline_glyph(glyph, &mut converter).is_some() {
                if let Some(path) = converter.0.finish() {
                    let transform = base.pre_translate(pen_x, baseline).pre_scale(units, -units);
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                    if let Some(stroke) = &embolden {
                        pixmap.stroke_path(&path, &paint, stroke, transform, None);
                    }
                }
            }
        }
        pen_x += advance;
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_bars(
    pixmap: &mut Pixmap,
    typeface: &Typeface,
    base: Transform,
    x: f32,
    baseline: f32,
    style: TextStyle,
    color: Rgba,
    text: &str,
) {
    let paint = paint(color);
    let space = typeface.measure(" ", style);
    let bar_h = style.size * BAR_HEIGHT;
    let top = baseline - bar_h;

    let mut pen_x = x;
    for word in text.split(' ') {
        let w = typeface.measure(word, style);
        if let Some(rect) = Rect::from_xywh(pen_x, top, w, bar_h) {
            pixmap.fill_rect(rect, &paint, base, None);
        }
        pen_x += w + space;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page images
// ────────────────────────────────────────────────────────────────────────────

/// Rasterizes the planned windows one at a time, in page order.
pub fn render_pages<'a>(
    surface: &'a Surface,
    typeface: &'a Typeface,
    scale: f32,
    plan: &'a PagePlan,
) -> impl Iterator<Item = Result<PageImage, ExportError>> + 'a {
    if typeface.font_face().is_none()
        && surface.ops.iter().any(|op| matches!(op, DrawOp::Text { .. }))
    {
        warn!("No font face configured; text is drawn as placeholder bars");
    }
    plan.pages
        .iter()
        .map(move |slice| render_page(surface, typeface, scale, slice))
}

fn render_page(
    surface: &Surface,
    typeface: &Typeface,
    scale: f32,
    slice: &PageSlice,
) -> Result<PageImage, ExportError> {
    let pixmap = rasterize_band(surface, typeface, scale, slice.src_top, slice.rows())?;
    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }
    Ok(PageImage {
        index: slice.index,
        width: pixmap.width(),
        height: pixmap.height(),
        rgb,
    })
}
