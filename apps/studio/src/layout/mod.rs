// Surface layout: turns a rendered VisualDocument into positioned draw operations.
// Pure and synchronous; the export engine runs it before rasterizing.

pub mod flow;
pub mod font_metrics;

use serde::{Deserialize, Serialize};

pub use flow::{layout_document, wrap_text, DrawOp, Surface};
pub use font_metrics::{FontError, FontFace, TextStyle, Typeface};

/// Layout parameters for the résumé surface, in CSS pixels.
///
/// The width is an A4 sheet at 96 dpi (210 mm ≈ 794 px); height follows the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub width: f32,
    pub padding: f32,
    /// Share of the width given to a sidebar column, when the family has one.
    pub sidebar_fraction: f32,
    pub name_size: f32,
    pub title_size: f32,
    pub heading_size: f32,
    pub item_title_size: f32,
    pub body_size: f32,
    pub small_size: f32,
    /// Multiple of the font size.
    pub line_height: f32,
    pub section_gap: f32,
    pub heading_gap: f32,
    pub item_gap: f32,
    pub bullet_indent: f32,
    pub border_inset: f32,
    pub tag_padding_x: f32,
    pub tag_padding_y: f32,
    pub tag_gap: f32,
}

pub fn default_surface_config() -> SurfaceConfig {
    SurfaceConfig {
        width: 794.0,
        padding: 40.0,
        sidebar_fraction: 0.32,
        name_size: 28.0,
        title_size: 18.0,
        heading_size: 18.0,
        item_title_size: 16.0,
        body_size: 14.0,
        small_size: 13.0,
        line_height: 1.4,
        section_gap: 24.0,
        heading_gap: 10.0,
        item_gap: 14.0,
        bullet_indent: 20.0,
        border_inset: 15.0,
        tag_padding_x: 10.0,
        tag_padding_y: 4.0,
        tag_gap: 8.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_surface_config_sanity() {
        let config = default_surface_config();
        assert_eq!(config.width, 794.0);
        assert!(config.padding * 2.0 < config.width);
        assert!(config.sidebar_fraction > 0.0 && config.sidebar_fraction < 0.5);
        assert!(config.name_size > config.heading_size);
        assert!(config.body_size > config.small_size);
    }
}
