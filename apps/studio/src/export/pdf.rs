//! Page container: one A4 page per page image, each image a Flate-compressed RGB XObject.
//!
//! Images are placed at true scale from the top of the page: the raster width spans the page
//! width, and an image shorter than a full page leaves background below it.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};

use crate::export::pagination::PageGeometry;
use crate::export::raster::PageImage;
use crate::export::ExportError;
use crate::render::Rgba;

const IMAGE_NAME: Name<'static> = Name(b"Im0");

/// A page image after FlateDecode compression.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPage {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

pub fn encode_page(page: &PageImage) -> Result<EncodedPage, ExportError> {
    Ok(EncodedPage {
        index: page.index,
        width: page.width,
        height: page.height,
        data: deflate(&page.rgb)?,
    })
}

/// The `cm` matrix that draws `page` at true scale, anchored to the top of the sheet.
fn placement(page: &EncodedPage, geometry: PageGeometry) -> [f32; 6] {
    let (page_w, page_h) = (geometry.width_pt(), geometry.height_pt());
    let image_h = page.height as f32 * page_w / page.width.max(1) as f32;
    [page_w, 0.0, 0.0, image_h, 0.0, page_h - image_h]
}

/// Assembles the encoded page images into a PDF document.
pub fn assemble_pdf(
    pages: &[EncodedPage],
    geometry: PageGeometry,
    background: Rgba,
    title: &str,
) -> Result<Vec<u8>, ExportError> {
    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let info_id = Ref::new(3);
    let mut next_id = 4;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .creator(TextStr(env!("CARGO_PKG_NAME")));

    let (page_w, page_h) = (geometry.width_pt(), geometry.height_pt());
    let channel = |v: u8| v as f32 / 255.0;
    let mut page_ids = Vec::with_capacity(pages.len());

    for page in pages {
        let page_id = alloc();
        let image_id = alloc();
        let content_id = alloc();
        page_ids.push(page_id);

        let mut image = pdf.image_xobject(image_id, &page.data);
        image.filter(Filter::FlateDecode);
        image.width(page.width as i32);
        image.height(page.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        image.finish();

        let mut content = Content::new();
        content.set_fill_rgb(
            channel(background.r),
            channel(background.g),
            channel(background.b),
        );
        content.rect(0.0, 0.0, page_w, page_h);
        content.fill_nonzero();
        content.save_state();
        content.transform(placement(page, geometry));
        content.x_object(IMAGE_NAME);
        content.restore_state();
        pdf.stream(content_id, &content.finish());

        let mut pdf_page = pdf.page(page_id);
        pdf_page.media_box(Rect::new(0.0, 0.0, page_w, page_h));
        pdf_page.parent(page_tree_id);
        pdf_page.contents(content_id);
        pdf_page.resources().x_objects().pair(IMAGE_NAME, image_id);
        pdf_page.finish();
    }

    let count = page_ids.len() as i32;
    pdf.pages(page_tree_id).kids(page_ids).count(count);

    Ok(pdf.finish())
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(ExportError::Encode)?;
    encoder.finish().map_err(ExportError::Encode)
}
