//! Page planning — slices a tall raster into fixed-size A4 windows.
//!
//! # Rules
//! - The raster is scaled to the page width: `scaled_height = H * page_width / W`.
//! - Page 1 shows the image at offset 0; page k+1 exists while
//!   `scaled_height - k * page_height > 0` and shows the image shifted up by `k * page_height`.
//!   Page count is therefore `max(1, ceil(scaled_height / page_height))`.
//! - Each page carries only its own pixel window. Windows are contiguous: concatenated they
//!   reproduce the raster rows exactly once.

use serde::Serialize;

use crate::export::ExportError;

/// Below this many page units a remainder is rounding noise, not another page.
const REMAINDER_EPSILON: f64 = 1e-6;

const MM_PER_INCH: f32 = 25.4;
const PT_PER_INCH: f32 = 72.0;

/// Page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
    };

    pub fn width_pt(&self) -> f32 {
        self.width / MM_PER_INCH * PT_PER_INCH
    }

    pub fn height_pt(&self) -> f32 {
        self.height / MM_PER_INCH * PT_PER_INCH
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSlice {
    pub index: usize,
    /// Vertical placement of the whole scaled image relative to this page, in millimetres
    /// (0, -297, -594, ...).
    pub offset: f32,
    /// First raster row shown on this page.
    pub src_top: u32,
    /// One past the last raster row shown on this page.
    pub src_bottom: u32,
}

impl PageSlice {
    pub fn rows(&self) -> u32 {
        self.src_bottom - self.src_top
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePlan {
    pub geometry: PageGeometry,
    pub raster_width: u32,
    pub raster_height: u32,
    /// Raster height in page units once scaled to the page width.
    pub scaled_height: f32,
    /// Raster rows one full page spans, rounded up. No window is taller.
    pub page_height_px: u32,
    pub pages: Vec<PageSlice>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Plans the pages for a `width × height` pixel raster.
pub fn plan_pages(
    raster_width: u32,
    raster_height: u32,
    geometry: PageGeometry,
) -> Result<PagePlan, ExportError> {
    if raster_width == 0 || raster_height == 0 {
        return Err(ExportError::SurfaceUnavailable {
            width: raster_width,
            height: raster_height,
        });
    }

    let page_w = geometry.width as f64;
    let page_h = geometry.height as f64;
    let scaled_height = raster_height as f64 * page_w / raster_width as f64;
    let px_per_page = page_h * raster_width as f64 / page_w;

    let mut pages = Vec::new();
    let mut k = 0usize;
    loop {
        let src_top = ((k as f64 * px_per_page).floor() as u32).min(raster_height);
        let src_bottom = (((k + 1) as f64 * px_per_page).floor() as u32).min(raster_height);
        pages.push(PageSlice {
            index: k,
            offset: -((k as f64 * page_h) as f32),
            src_top,
            src_bottom,
        });
        k += 1;
        if scaled_height - k as f64 * page_h <= REMAINDER_EPSILON {
            break;
        }
    }
    // the last window always runs to the end of the raster
    if let Some(last) = pages.last_mut() {
        last.src_bottom = raster_height;
    }

    Ok(PagePlan {
        geometry,
        raster_width,
        raster_height,
        scaled_height: scaled_height as f32,
        page_height_px: (px_per_page.ceil() as u32).max(1),
        pages,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seven_by_thirty_is_four_pages() {
        let plan = plan_pages(7, 30, PageGeometry::A4).unwrap();
        assert!((plan.scaled_height - 900.0).abs() < 1e-3);
        assert_eq!(plan.page_count(), 4);
        let offsets: Vec<f32> = plan.pages.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![0.0, -297.0, -594.0, -891.0]);
        assert_eq!(plan.page_height_px, 10);
        let windows: Vec<(u32, u32)> = plan.pages.iter().map(|p| (p.src_top, p.src_bottom)).collect();
        assert_eq!(windows, vec![(0, 9), (9, 19), (19, 29), (29, 30)]);
    }

    #[test]
    fn test_short_content_is_one_page() {
        let plan = plan_pages(1588, 100, PageGeometry::A4).unwrap();
        assert_eq!(plan.page_count(), 1);
        assert_eq!(plan.pages[0].src_top, 0);
        assert_eq!(plan.pages[0].src_bottom, 100);
    }

    #[test]
    fn test_exact_page_height_is_one_page() {
        // 210 x 297 pixels scales to exactly one page
        let plan = plan_pages(210, 297, PageGeometry::A4).unwrap();
        assert_eq!(plan.page_count(), 1);
        let plan = plan_pages(210, 594, PageGeometry::A4).unwrap();
        assert_eq!(plan.page_count(), 2);
        let plan = plan_pages(210, 595, PageGeometry::A4).unwrap();
        assert_eq!(plan.page_count(), 3);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(matches!(
            plan_pages(0, 10, PageGeometry::A4),
            Err(ExportError::SurfaceUnavailable { width: 0, height: 10 })
        ));
        assert!(matches!(
            plan_pages(10, 0, PageGeometry::A4),
            Err(ExportError::SurfaceUnavailable { .. })
        ));
    }

    #[test]
    fn test_a4_in_points() {
        let a4 = PageGeometry::A4;
        assert!((a4.width_pt() - 595.28).abs() < 0.01);
        assert!((a4.height_pt() - 841.89).abs() < 0.01);
    }

    proptest! {
        #[test]
        fn prop_page_count_is_ceil(w in 1u32..4000, h in 1u32..60000) {
            let plan = plan_pages(w, h, PageGeometry::A4).unwrap();
            let n = plan.page_count() as f64;
            let scaled = h as f64 * 210.0 / w as f64;
            prop_assert!(n >= 1.0);
            // n pages cover the content, n - 1 pages do not
            prop_assert!(n * 297.0 >= scaled - 1e-6);
            prop_assert!(n == 1.0 || (n - 1.0) * 297.0 < scaled + 1e-6);
        }

        #[test]
        fn prop_windows_are_contiguous(w in 1u32..4000, h in 1u32..60000) {
            let plan = plan_pages(w, h, PageGeometry::A4).unwrap();
            prop_assert_eq!(plan.pages[0].src_top, 0);
            prop_assert_eq!(plan.pages.last().unwrap().src_bottom, h);
            for pair in plan.pages.windows(2) {
                prop_assert_eq!(pair[0].src_bottom, pair[1].src_top);
            }
            let total: u32 = plan.pages.iter().map(PageSlice::rows).sum();
            prop_assert_eq!(total, h);
            for page in &plan.pages {
                prop_assert!(page.rows() <= plan.page_height_px);
            }
        }
    }
}
