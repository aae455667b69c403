use crate::fields::{self, FieldWriter, lunits};
use crate::image::{AfpImageHandler, header_field};
use log::{debug, info, warn};
use quire_render_core::{
    DocumentInfo, DocumentRenderer, EncodingError, FormattedPage, ImageObjectInfo, PageImageError,
    PageItem, PaintingState, PlacedImage, RenderError, encode_placed_image,
};
use quire_types::Color;
use std::io::Write;

const TEXT_RECORD: u8 = 0x01;
const RULE_RECORD: u8 = 0x02;
const PICTURE_CHUNK: usize = 8192;

/// Writes pages as a stream of AFP-style structured fields.
pub struct AfpRenderer<W: Write + Send> {
    out: FieldWriter<W>,
    handler: AfpImageHandler,
    state: PaintingState,
    started: bool,
    finished: bool,
    pages: usize,
    images: usize,
    substituted: usize,
}

impl<W: Write + Send> AfpRenderer<W> {
    pub fn new(writer: W, state: PaintingState) -> Self {
        Self {
            out: FieldWriter::new(writer),
            handler: AfpImageHandler::new(),
            state,
            started: false,
            finished: false,
            pages: 0,
            images: 0,
            substituted: 0,
        }
    }

    pub fn painting_state(&self) -> &PaintingState {
        &self.state
    }

    pub fn pages_written(&self) -> usize {
        self.pages
    }

    /// Images replaced by a placeholder because their data was unreadable.
    pub fn images_substituted(&self) -> usize {
        self.substituted
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_text_records(&mut self, page: &FormattedPage) -> Result<(), RenderError> {
        let mut records = Vec::new();
        for item in &page.items {
            match item {
                PageItem::Text(run) => {
                    text_record(&mut records, run.x, run.y, run.font_size, run.color, &run.text)
                }
                PageItem::Citation(c) => {
                    text_record(&mut records, c.x, c.y, c.font_size, c.color, &c.display_text())
                }
                PageItem::Rule { rect, color } => {
                    records.push(RULE_RECORD);
                    for v in [rect.x, rect.y, rect.width, rect.height] {
                        records.extend_from_slice(&lunits(v).to_be_bytes());
                    }
                    records.extend_from_slice(&[color.r, color.g, color.b]);
                }
                PageItem::Image(_) => {}
            }
        }
        if !records.is_empty() {
            self.out
                .write_chunked(fields::PRESENTATION_TEXT, &records, fields::MAX_PAYLOAD)?;
        }
        Ok(())
    }

    fn write_image(&mut self, page: usize, placed: &PlacedImage) -> Result<(), RenderError> {
        self.images += 1;
        let name = format!("I{:07}", self.images);
        // Header values are checked before any field is written.
        let prepared = encode_placed_image(&self.handler, page, placed, &self.state)
            .and_then(|info| {
                let header = image_header(&info).map_err(|error| PageImageError {
                    page,
                    image: placed.source.to_string(),
                    error,
                })?;
                Ok((info, header))
            });
        match prepared {
            Ok((info, header)) => self.write_image_object(&name, placed, &info, &header),
            Err(err) => {
                warn!("[AFP] {}; writing a placeholder instead", err);
                self.substituted += 1;
                let note = format!("image unavailable: {}", placed.source);
                self.out.write_field(fields::NO_OPERATION, note.as_bytes())
            }
        }
    }

    fn write_image_object(
        &mut self,
        name: &str,
        placed: &PlacedImage,
        info: &ImageObjectInfo,
        header: &ImageHeader,
    ) -> Result<(), RenderError> {
        debug!(
            "[AFP] Image {} '{}': {}x{} at {} bpp via {:?}",
            name, placed.source, info.width, info.height, info.bits_per_pixel, info.path
        );
        self.out.write_field(fields::BEGIN_IMAGE, name.as_bytes())?;

        let mut area = Vec::with_capacity(8);
        area.extend_from_slice(&header.area_resolution.to_be_bytes());
        area.extend_from_slice(&lunits(placed.rect.width).to_be_bytes());
        area.extend_from_slice(&lunits(placed.rect.height).to_be_bytes());
        self.out.write_field(fields::OBJECT_AREA_DESCRIPTOR, &area)?;

        let mut position = Vec::with_capacity(4);
        position.extend_from_slice(&lunits(placed.rect.x).to_be_bytes());
        position.extend_from_slice(&lunits(placed.rect.y).to_be_bytes());
        self.out.write_field(fields::OBJECT_AREA_POSITION, &position)?;

        self.out
            .write_field(fields::IMAGE_DATA_DESCRIPTOR, &header.descriptor)?;
        self.out
            .write_chunked(fields::IMAGE_PICTURE_DATA, &info.data, PICTURE_CHUNK)?;
        self.out.write_field(fields::END_IMAGE, name.as_bytes())
    }
}

fn text_record(out: &mut Vec<u8>, x: f32, y: f32, size: f32, color: Color, text: &str) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(u16::MAX as usize);
    out.push(TEXT_RECORD);
    out.extend_from_slice(&lunits(x).to_be_bytes());
    out.extend_from_slice(&lunits(y).to_be_bytes());
    out.extend_from_slice(&((size * 10.0).round() as u16).to_be_bytes());
    out.extend_from_slice(&[color.r, color.g, color.b]);
    out.extend_from_slice(&(len as u16).to_be_bytes());
    out.extend_from_slice(&bytes[..len]);
}

/// The 16-bit header values of one image object.
struct ImageHeader {
    area_resolution: u16,
    descriptor: Vec<u8>,
}

fn image_header(info: &ImageObjectInfo) -> Result<ImageHeader, EncodingError> {
    Ok(ImageHeader {
        area_resolution: header_field("resolution", info.area_resolution)?,
        descriptor: image_descriptor(info)?,
    })
}

/// Image data descriptor payload:
/// `resolution:u16 resolution:u16 width:u16 height:u16 bpp:u8 color:u8`.
pub fn image_descriptor(info: &ImageObjectInfo) -> Result<Vec<u8>, EncodingError> {
    let resolution = header_field("resolution", info.data_resolution)?;
    let mut out = Vec::with_capacity(10);
    out.extend_from_slice(&resolution.to_be_bytes());
    out.extend_from_slice(&resolution.to_be_bytes());
    out.extend_from_slice(&header_field("width", info.width)?.to_be_bytes());
    out.extend_from_slice(&header_field("height", info.height)?.to_be_bytes());
    out.push(info.bits_per_pixel);
    out.push(u8::from(info.color));
    Ok(out)
}

impl<W: Write + Send> DocumentRenderer for AfpRenderer<W> {
    fn name(&self) -> &'static str {
        "afp"
    }

    fn start_document(&mut self, doc: &DocumentInfo) -> Result<(), RenderError> {
        if self.started {
            return Err(RenderError::State("document already started".into()));
        }
        self.started = true;
        let name: String = doc.title.as_deref().unwrap_or("QUIRE").chars().take(64).collect();
        self.out.write_field(fields::BEGIN_DOCUMENT, name.as_bytes())?;
        self.out
            .write_field(fields::NO_OPERATION, doc.producer.as_bytes())?;
        info!(
            "[AFP] Started document '{}' ({} bpp, color {}, {} dpi)",
            name, self.state.bits_per_pixel, self.state.color_images, self.state.resolution
        );
        Ok(())
    }

    fn render_page(&mut self, page: &FormattedPage) -> Result<(), RenderError> {
        if !self.started || self.finished {
            return Err(RenderError::State(format!(
                "page {} rendered outside start/finish",
                page.number
            )));
        }
        let name = format!("P{:07}", page.number);
        self.out.write_field(fields::BEGIN_PAGE, name.as_bytes())?;

        let mut descriptor = Vec::with_capacity(8);
        descriptor.extend_from_slice(&(self.state.resolution as u16).to_be_bytes());
        descriptor.extend_from_slice(&(self.state.resolution as u16).to_be_bytes());
        descriptor.extend_from_slice(&lunits(page.width).to_be_bytes());
        descriptor.extend_from_slice(&lunits(page.height).to_be_bytes());
        self.out.write_field(fields::PAGE_DESCRIPTOR, &descriptor)?;

        self.write_text_records(page)?;
        for placed in page.images() {
            self.write_image(page.number, placed)?;
        }

        self.out.write_field(fields::END_PAGE, name.as_bytes())?;
        self.pages += 1;
        Ok(())
    }

    fn finish_document(&mut self) -> Result<(), RenderError> {
        if !self.started || self.finished {
            return Err(RenderError::State("finish without a started document".into()));
        }
        self.finished = true;
        self.out.write_field(fields::END_DOCUMENT, &[])?;
        self.out.flush()?;
        info!(
            "[AFP] Finished document: {} pages, {} images ({} substituted)",
            self.pages, self.images, self.substituted
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Field, read_fields};
    use quire_render_core::{ColorModel, ImageData, RasterImage, TextRun};
    use quire_types::{Rect, ResourceUri};
    use std::sync::Arc;

    fn page_with(number: usize, items: Vec<PageItem>) -> FormattedPage {
        let mut page = FormattedPage::new(number, 595.0, 842.0);
        page.items = items;
        page
    }

    fn ids(fields: &[Field]) -> Vec<[u8; 3]> {
        fields.iter().map(|f| f.id).collect()
    }

    fn render(pages: &[FormattedPage], state: PaintingState) -> (Vec<Field>, usize) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut r = AfpRenderer::new(Vec::new(), state);
        r.start_document(&DocumentInfo::default()).unwrap();
        for p in pages {
            r.render_page(p).unwrap();
        }
        r.finish_document().unwrap();
        let substituted = r.images_substituted();
        (read_fields(&r.into_inner()).unwrap(), substituted)
    }

    #[test]
    fn document_is_bracketed_and_pages_are_ordered() {
        let text = PageItem::Text(TextRun {
            x: 72.0,
            y: 100.0,
            font_size: 12.0,
            color: Color::BLACK,
            text: "Hello".into(),
        });
        let (fields, _) = render(
            &[page_with(1, vec![text]), page_with(2, vec![])],
            PaintingState::default(),
        );
        let ids = ids(&fields);
        assert_eq!(ids.first(), Some(&fields::BEGIN_DOCUMENT));
        assert_eq!(ids.last(), Some(&fields::END_DOCUMENT));
        let pages: Vec<_> = fields
            .iter()
            .filter(|f| f.id == fields::BEGIN_PAGE)
            .map(|f| String::from_utf8_lossy(&f.payload).into_owned())
            .collect();
        assert_eq!(pages, ["P0000001", "P0000002"]);
        let ptx = fields
            .iter()
            .find(|f| f.id == fields::PRESENTATION_TEXT)
            .unwrap();
        assert!(ptx.payload.ends_with(b"Hello"));
    }

    #[test]
    fn image_descriptor_matches_payload() {
        let raster = RasterImage::new(
            4,
            2,
            ColorModel::Gray {
                bits: 8,
                zero_is_black: true,
            },
            vec![0, 64, 128, 255, 255, 128, 64, 0],
        )
        .unwrap();
        let image = PageItem::Image(PlacedImage {
            rect: Rect::new(10.0, 10.0, 40.0, 20.0),
            source: ResourceUri::new("gradient.png"),
            data: ImageData::Raster(Arc::new(raster)),
        });
        let state = PaintingState {
            bits_per_pixel: 4,
            color_images: false,
            resolution: 300,
        };
        let (fields, _) = render(&[page_with(1, vec![image])], state);

        let idd = fields
            .iter()
            .find(|f| f.id == fields::IMAGE_DATA_DESCRIPTOR)
            .unwrap();
        assert_eq!(idd.payload, vec![0x01, 0x2C, 0x01, 0x2C, 0, 4, 0, 2, 4, 0]);
        let picture: usize = fields
            .iter()
            .filter(|f| f.id == fields::IMAGE_PICTURE_DATA)
            .map(|f| f.payload.len())
            .sum();
        assert_eq!(picture, 2 * 2);
        let oad = fields
            .iter()
            .find(|f| f.id == fields::OBJECT_AREA_DESCRIPTOR)
            .unwrap();
        assert_eq!(&oad.payload[..2], &300u16.to_be_bytes());
    }

    #[test]
    fn unreadable_image_becomes_placeholder() {
        let image = PageItem::Image(PlacedImage {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            source: ResourceUri::new("missing.png"),
            data: ImageData::Missing("no such file".into()),
        });
        let (fields, substituted) = render(&[page_with(3, vec![image])], PaintingState::default());
        assert_eq!(substituted, 1);
        assert!(!fields.iter().any(|f| f.id == fields::BEGIN_IMAGE));
        assert!(fields.iter().any(|f| f.id == fields::NO_OPERATION
            && f.payload == b"image unavailable: missing.png"));
        assert!(fields.iter().any(|f| f.id == fields::END_PAGE));
    }

    #[test]
    fn descriptor_refuses_values_wider_than_its_fields() {
        let info = ImageObjectInfo {
            bits_per_pixel: 1,
            color: false,
            width: 65_536,
            height: 1,
            data_resolution: 300,
            area_resolution: 300,
            path: quire_render_core::EncodingPath::Direct,
            data: vec![0; 8192],
        };
        assert!(matches!(
            image_descriptor(&info),
            Err(EncodingError::OutOfRange {
                field: "width",
                value: 65_536,
                limit: 65_535
            })
        ));
        let fits = ImageObjectInfo {
            width: 65_535,
            data: vec![0; 8192],
            ..info
        };
        assert_eq!(&image_descriptor(&fits).unwrap()[4..6], &[0xFF, 0xFF]);
    }

    #[test]
    fn image_beyond_header_limits_becomes_placeholder() {
        let raster = RasterImage::new(
            2,
            1,
            ColorModel::Gray {
                bits: 8,
                zero_is_black: true,
            },
            vec![0, 255],
        )
        .unwrap();
        let image = PageItem::Image(PlacedImage {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            source: ResourceUri::new("fine.png"),
            data: ImageData::Raster(Arc::new(raster)),
        });
        let state = PaintingState {
            bits_per_pixel: 8,
            color_images: false,
            resolution: 70_000,
        };
        let (fields, substituted) = render(&[page_with(1, vec![image])], state);
        assert_eq!(substituted, 1);
        assert!(!fields.iter().any(|f| f.id == fields::BEGIN_IMAGE));
        assert!(fields.iter().any(|f| f.id == fields::NO_OPERATION
            && f.payload == b"image unavailable: fine.png"));
    }

    #[test]
    fn pages_outside_the_document_are_rejected() {
        let mut r = AfpRenderer::new(Vec::new(), PaintingState::default());
        assert!(matches!(
            r.render_page(&page_with(1, vec![])),
            Err(RenderError::State(_))
        ));
    }
}
