use crate::image::PdfImageEncoder;
use log::{debug, info, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use quire_render_core::{
    DocumentInfo, DocumentRenderer, FormattedPage, ImageObjectInfo, PageItem, PaintingState,
    PlacedImage, RenderError, encode_placed_image,
};
use quire_types::{Color, Rect};
use std::io::Write;

const FONT_NAME: &str = "F1";
const PLACEHOLDER_GRAY: f32 = 0.85;

/// A PDF renderer that builds the document's object graph in memory and
/// writes it to the output when the document finishes.
pub struct LopdfRenderer<W: Write + Send> {
    writer: W,
    document: Document,
    pages_id: ObjectId,
    font_id: Option<ObjectId>,
    page_ids: Vec<ObjectId>,
    info: Option<DocumentInfo>,
    encoder: PdfImageEncoder,
    state: PaintingState,
    finished: bool,
    images: usize,
    substituted: usize,
}

impl<W: Write + Send> LopdfRenderer<W> {
    pub fn new(writer: W, state: PaintingState) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        Self {
            writer,
            document,
            pages_id,
            font_id: None,
            page_ids: Vec::new(),
            info: None,
            encoder: PdfImageEncoder,
            state,
            finished: false,
            images: 0,
            substituted: 0,
        }
    }

    pub fn pages_written(&self) -> usize {
        self.page_ids.len()
    }

    pub fn images_substituted(&self) -> usize {
        self.substituted
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn add_image_xobject(&mut self, info: &ImageObjectInfo) -> ObjectId {
        let color_space = if info.color { "DeviceRGB" } else { "DeviceGray" };
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => info.width as i64,
            "Height" => info.height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
        };
        self.document
            .add_object(Stream::new(dict, info.data.clone()))
    }
}

struct PageContent {
    page_height: f32,
    ops: Vec<Operation>,
    xobjects: Dictionary,
    fill: Option<Color>,
}

impl PageContent {
    fn new(page_height: f32) -> Self {
        Self {
            page_height,
            ops: Vec::new(),
            xobjects: Dictionary::new(),
            fill: None,
        }
    }

    fn set_fill(&mut self, color: Color) {
        if self.fill != Some(color) {
            self.ops.push(Operation::new(
                "rg",
                vec![
                    (color.r as f32 / 255.0).into(),
                    (color.g as f32 / 255.0).into(),
                    (color.b as f32 / 255.0).into(),
                ],
            ));
            self.fill = Some(color);
        }
    }

    fn text(&mut self, x: f32, baseline: f32, size: f32, color: Color, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.set_fill(color);
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![FONT_NAME.into(), size.into()]));
        self.ops.push(Operation::new(
            "Td",
            vec![x.into(), (self.page_height - baseline).into()],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(text.to_string())],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn rect(&mut self, rect: &Rect, color: Color) {
        self.set_fill(color);
        let y = self.page_height - (rect.y + rect.height);
        self.ops.push(Operation::new(
            "re",
            vec![rect.x.into(), y.into(), rect.width.into(), rect.height.into()],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn image(&mut self, name: &str, id: ObjectId, rect: &Rect) {
        let y = self.page_height - (rect.y + rect.height);
        self.xobjects.set(name.as_bytes(), id);
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                rect.width.into(),
                0.into(),
                0.into(),
                rect.height.into(),
                rect.x.into(),
                y.into(),
            ],
        ));
        self.ops
            .push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.ops.push(Operation::new("Q", vec![]));
    }
}

impl<W: Write + Send> LopdfRenderer<W> {
    fn draw_image(
        &mut self,
        page: usize,
        placed: &PlacedImage,
        content: &mut PageContent,
    ) {
        match encode_placed_image(&self.encoder, page, placed, &self.state) {
            Ok(info) => {
                self.images += 1;
                let name = format!("Im{}", self.images);
                let id = self.add_image_xobject(&info);
                content.image(&name, id, &placed.rect);
            }
            Err(err) => {
                warn!("[PDF] {}; drawing a placeholder instead", err);
                self.substituted += 1;
                content.rect(&placed.rect, Color::gray((PLACEHOLDER_GRAY * 255.0) as u8));
            }
        }
    }
}

impl<W: Write + Send> DocumentRenderer for LopdfRenderer<W> {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn start_document(&mut self, doc: &DocumentInfo) -> Result<(), RenderError> {
        if self.font_id.is_some() {
            return Err(RenderError::State("document already started".into()));
        }
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        };
        self.font_id = Some(self.document.add_object(font));
        self.info = Some(doc.clone());
        info!("[PDF] Started document {:?}", doc.title);
        Ok(())
    }

    fn render_page(&mut self, page: &FormattedPage) -> Result<(), RenderError> {
        let font_id = match self.font_id {
            Some(id) if !self.finished => id,
            _ => {
                return Err(RenderError::State(format!(
                    "page {} rendered outside start/finish",
                    page.number
                )));
            }
        };

        let mut content = PageContent::new(page.height);
        for item in &page.items {
            match item {
                PageItem::Text(run) => {
                    content.text(run.x, run.y, run.font_size, run.color, &run.text)
                }
                PageItem::Citation(c) => {
                    content.text(c.x, c.y, c.font_size, c.color, &c.display_text())
                }
                PageItem::Rule { rect, color } => content.rect(rect, *color),
                PageItem::Image(placed) => self.draw_image(page.number, placed, &mut content),
            }
        }

        let PageContent { ops, xobjects, .. } = content;
        let encoded = Content { operations: ops }.encode()?;
        let content_id = self
            .document
            .add_object(Stream::new(dictionary! {}, encoded));

        let mut resources = dictionary! {
            "Font" => dictionary! { FONT_NAME => font_id },
        };
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }
        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width.into(), page.height.into()],
            "Contents" => content_id,
            "Resources" => resources,
        };
        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        debug!("[PDF] Page {} written as object {:?}", page.number, page_id);
        Ok(())
    }

    fn finish_document(&mut self) -> Result<(), RenderError> {
        if self.font_id.is_none() || self.finished {
            return Err(RenderError::State("finish without a started document".into()));
        }
        self.finished = true;

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        if let Some(doc) = &self.info {
            let mut info = dictionary! {
                "Producer" => Object::string_literal(doc.producer.clone()),
            };
            if let Some(title) = &doc.title {
                info.set("Title", Object::string_literal(title.clone()));
            }
            let info_id = self.document.add_object(info);
            self.document.trailer.set("Info", info_id);
        }

        self.document.save_to(&mut self.writer)?;
        self.writer.flush()?;
        info!(
            "[PDF] Finished document: {} pages, {} images ({} substituted)",
            self.page_ids.len(),
            self.images,
            self.substituted
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_render_core::{ImageData, TextRun};
    use quire_types::ResourceUri;

    fn render(pages: Vec<FormattedPage>) -> (Document, usize) {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut r = LopdfRenderer::new(Vec::new(), PaintingState::default());
        r.start_document(&DocumentInfo {
            title: Some("Report".into()),
            ..DocumentInfo::default()
        })
        .unwrap();
        for p in &pages {
            r.render_page(p).unwrap();
        }
        r.finish_document().unwrap();
        let substituted = r.images_substituted();
        let bytes = r.into_inner();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        (Document::load_mem(&bytes).unwrap(), substituted)
    }

    fn text_page(number: usize, text: &str) -> FormattedPage {
        let mut page = FormattedPage::new(number, 300.0, 400.0);
        page.items.push(PageItem::Text(TextRun {
            x: 20.0,
            y: 40.0,
            font_size: 11.0,
            color: Color::BLACK,
            text: text.into(),
        }));
        page
    }

    #[test]
    fn pages_are_written_in_order() {
        let (doc, _) = render(vec![text_page(1, "first"), text_page(2, "second")]);
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);
        let first = doc.get_page_content(pages[&1]).unwrap();
        let ops = Content::decode(&first).unwrap().operations;
        let td = ops.iter().find(|op| op.operator == "Td").unwrap();
        assert_eq!(td.operands[1].as_float().unwrap(), 360.0);
    }

    #[test]
    fn missing_image_draws_a_placeholder() {
        let mut page = FormattedPage::new(1, 300.0, 400.0);
        page.items.push(PageItem::Image(PlacedImage {
            rect: Rect::new(10.0, 10.0, 50.0, 50.0),
            source: ResourceUri::new("logo.png"),
            data: ImageData::Missing("not found".into()),
        }));
        let (doc, substituted) = render(vec![page]);
        assert_eq!(substituted, 1);
        let pages = doc.get_pages();
        let ops = Content::decode(&doc.get_page_content(pages[&1]).unwrap())
            .unwrap()
            .operations;
        assert!(ops.iter().any(|op| op.operator == "re"));
        assert!(!ops.iter().any(|op| op.operator == "Do"));
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut r = LopdfRenderer::new(Vec::new(), PaintingState::default());
        assert!(r.finish_document().is_err());
        assert!(r.render_page(&text_page(1, "x")).is_err());
    }
}
