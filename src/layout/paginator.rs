//! A reference paginator: flows the blocks of each page sequence onto pages
//! of its simple-page-master and hands every finished page to a [`PageSink`].
//!
//! Glyph widths are estimated from the font size, so line breaks are
//! approximate. What matters downstream is exact: identifiers are resolved
//! (with their page number) the moment the line holding their defining node
//! is placed, and every page carries the citations that were still
//! unresolved when it was finished.

use super::lines::{
    Align, Area, Line, Paragraph, TextStyle, Token, break_lines, emit_line, push_text,
};
use crate::resource::ResourceProvider;
use log::{debug, info, trace};
use quire_props::{PropertyId, PropertyValue};
use quire_render_core::{FormattedPage, ImageData, PageItem, RenderError};
use quire_tree::{Child, Document, Location, Node, NodeId, NodeKind, ReferenceDims};
use quire_types::{Color, IdName, IdRegistry, Rect, ResourceUri};
use std::collections::HashMap;
use thiserror::Error;

/// Pixels to points at the 96 dpi assumed for images without size properties.
const PX_TO_PT: f32 = 0.75;
const DEFAULT_GRAPHIC_SIZE: f32 = 72.0;
const FOOTNOTE_RULE_WIDTH: f32 = 72.0;
const FOOTNOTE_RULE_THICKNESS: f32 = 0.5;
/// Space between the last body line and the first footnote, rule included.
const FOOTNOTE_GAP: f32 = 6.0;
const DEFAULT_LINE_HEIGHT: f32 = 1.2;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("page-sequence at {location} refers to unknown page master '{name}'")]
    UnknownMaster { name: String, location: Location },

    #[error("Document has no root element")]
    EmptyDocument,

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Receives finished pages in document order and owns the identifier
/// registry layout resolves names in.
pub trait PageSink {
    fn registry_mut(&mut self) -> &mut IdRegistry;

    fn emit(&mut self, page: FormattedPage) -> Result<(), RenderError>;
}

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Overrides every block's `line-height` when set.
    pub line_height: Option<f32>,
    /// Shown by citations whose target never resolves.
    pub citation_fallback: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            line_height: None,
            citation_fallback: "?".to_string(),
        }
    }
}

pub struct FlowPaginator<'r> {
    options: LayoutOptions,
    resources: &'r dyn ResourceProvider,
}

impl<'r> FlowPaginator<'r> {
    pub fn new(options: LayoutOptions, resources: &'r dyn ResourceProvider) -> Self {
        Self { options, resources }
    }

    /// Lays out every page sequence of `document` and returns the number of
    /// pages emitted. Each sequence starts on a new page.
    pub fn paginate<S: PageSink>(
        &self,
        document: &Document,
        sink: &mut S,
    ) -> Result<usize, LayoutError> {
        let root = document.root().ok_or(LayoutError::EmptyDocument)?;

        let masters: HashMap<&str, PageGeometry> = document
            .descendants_of_kind(root, NodeKind::SimplePageMaster)
            .into_iter()
            .filter_map(|id| document.get(id))
            .filter_map(|master| {
                let name = master.property(PropertyId::MasterName)?.as_text()?;
                Some((name, PageGeometry::of(document, master)))
            })
            .collect();

        let mut next_page = 1;
        for sequence_id in document.descendants_of_kind(root, NodeKind::PageSequence) {
            let Some(sequence) = document.get(sequence_id) else {
                continue;
            };
            let reference = sequence
                .property(PropertyId::MasterReference)
                .and_then(PropertyValue::as_text)
                .unwrap_or_default();
            let geometry = *masters
                .get(reference)
                .ok_or_else(|| LayoutError::UnknownMaster {
                    name: reference.to_string(),
                    location: sequence.location,
                })?;

            let mut layout = SequenceLayout::new(self, document, sink, geometry, next_page);
            if let Some(name) = &sequence.id {
                layout.pending_ids.push(name.clone());
            }
            for flow in sequence.child_nodes() {
                if let Some(node) = document.get(flow).filter(|n| n.kind == NodeKind::Flow) {
                    for block in node.child_nodes() {
                        layout.block(block)?;
                    }
                }
            }
            let pages = layout.finish()?;
            debug!(
                "[LAYOUT] Sequence '{}' produced pages {}..={}",
                reference,
                next_page,
                next_page + pages - 1
            );
            next_page += pages;
        }

        info!("[LAYOUT] Laid out {} pages", next_page - 1);
        Ok(next_page - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PageGeometry {
    width: f32,
    height: f32,
    body: Rect,
}

impl PageGeometry {
    /// Page size from the master, body area inside its margins less the side
    /// regions' extents.
    fn of(document: &Document, master: &Node) -> Self {
        let len = |id| master.length(id).unwrap_or(0.0);
        let width = master.length(PropertyId::PageWidth).unwrap_or(595.0);
        let height = master.length(PropertyId::PageHeight).unwrap_or(842.0);
        let mut body = Rect::new(
            len(PropertyId::MarginLeft),
            len(PropertyId::MarginTop),
            (width - len(PropertyId::MarginLeft) - len(PropertyId::MarginRight)).max(0.0),
            (height - len(PropertyId::MarginTop) - len(PropertyId::MarginBottom)).max(0.0),
        );
        let dims = ReferenceDims {
            ipd: body.width,
            bpd: body.height,
        };

        for region in master.child_nodes().filter_map(|id| document.get(id)) {
            let Some(viewport) = region.viewport_rect(dims) else {
                continue;
            };
            let horizontal = region.writing_mode().is_horizontal();
            match (region.kind, horizontal) {
                (NodeKind::RegionStart, true) => {
                    body.x += viewport.width;
                    body.width -= viewport.width;
                }
                (NodeKind::RegionStart, false) => {
                    body.y += viewport.height;
                    body.height -= viewport.height;
                }
                (NodeKind::RegionEnd, true) => body.width -= viewport.width,
                (NodeKind::RegionEnd, false) => body.height -= viewport.height,
                _ => {}
            }
        }
        body.width = body.width.max(0.0);
        body.height = body.height.max(0.0);
        Self {
            width,
            height,
            body,
        }
    }
}

/// State while one page sequence is being laid out.
struct SequenceLayout<'a, S> {
    options: &'a LayoutOptions,
    resources: &'a dyn ResourceProvider,
    document: &'a Document,
    sink: &'a mut S,
    geometry: PageGeometry,
    page: FormattedPage,
    cursor: f32,
    area: Area,
    at_top: bool,
    break_pending: bool,
    /// Depth of absolutely positioned containers being laid out; no page
    /// breaks happen inside one.
    absolute: usize,
    /// Block identifiers waiting for their first line to be placed.
    pending_ids: Vec<IdName>,
    footnote_bodies: Vec<Vec<Line>>,
    page_footnotes: Vec<usize>,
    footnote_height: f32,
    /// Footnote bodies met inside absolute containers, placed as plain blocks.
    deferred: Vec<NodeId>,
    emitted: usize,
}

impl<'a, S: PageSink> SequenceLayout<'a, S> {
    fn new(
        paginator: &'a FlowPaginator<'_>,
        document: &'a Document,
        sink: &'a mut S,
        geometry: PageGeometry,
        first_page: usize,
    ) -> Self {
        Self {
            options: &paginator.options,
            resources: paginator.resources,
            document,
            sink,
            geometry,
            page: FormattedPage::new(first_page, geometry.width, geometry.height),
            cursor: geometry.body.y,
            area: Area {
                x: geometry.body.x,
                width: geometry.body.width,
            },
            at_top: true,
            break_pending: false,
            absolute: 0,
            pending_ids: Vec::new(),
            footnote_bodies: Vec::new(),
            page_footnotes: Vec::new(),
            footnote_height: 0.0,
            deferred: Vec::new(),
            emitted: 0,
        }
    }

    fn bottom(&self) -> f32 {
        self.geometry.body.y + self.geometry.body.height - self.footnote_height
    }

    fn fallback(&self) -> &'a str {
        &self.options.citation_fallback
    }

    /// Nearest value of `id` on `node` or its ancestors.
    fn inherited(&self, node: NodeId, id: PropertyId) -> Option<&'a PropertyValue> {
        let document = self.document;
        std::iter::once(node)
            .chain(document.ancestors(node))
            .find_map(|n| document.get(n)?.property(id))
    }

    fn text_style(&self, node: NodeId) -> TextStyle {
        let defaults = TextStyle::default();
        TextStyle {
            size: self
                .inherited(node, PropertyId::FontSize)
                .and_then(PropertyValue::as_length)
                .unwrap_or(defaults.size),
            color: self
                .inherited(node, PropertyId::Color)
                .and_then(PropertyValue::as_color)
                .unwrap_or(defaults.color),
        }
    }

    fn paragraph(&self, block: NodeId, first: bool) -> Paragraph {
        let line_height = self.options.line_height.unwrap_or_else(|| {
            self.inherited(block, PropertyId::LineHeight)
                .and_then(PropertyValue::as_number)
                .unwrap_or(DEFAULT_LINE_HEIGHT)
        });
        let indent = if first {
            self.inherited(block, PropertyId::TextIndent)
                .and_then(PropertyValue::as_length)
                .unwrap_or(0.0)
        } else {
            0.0
        };
        let align = self
            .inherited(block, PropertyId::TextAlign)
            .and_then(PropertyValue::as_keyword)
            .map(Align::from_keyword)
            .unwrap_or_default();
        Paragraph {
            area: self.area,
            indent,
            align,
            line_height,
        }
    }

    fn resolve(&mut self, name: IdName) {
        let page = self.page.number;
        trace!("[LAYOUT] '{}' resolved on page {}", name, page);
        self.sink.registry_mut().resolve_on_page(name, page);
    }

    /// Vertical space, discarded at the top of a page.
    fn space(&mut self, amount: f32) {
        if amount > 0.0 && !self.at_top {
            self.cursor += amount;
        }
    }

    fn block(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let document = self.document;
        let Some(node) = document.get(id) else {
            return Ok(());
        };
        let forced_before = is_forced(node, PropertyId::BreakBefore);
        if (forced_before || self.break_pending) && self.absolute == 0 && !self.at_top {
            self.new_page()?;
        }
        self.break_pending = false;

        if node.kind == NodeKind::BlockContainer && is_absolute(node) {
            return self.absolute_container(node);
        }

        let len = |p| node.length(p).unwrap_or(0.0);
        self.space(len(PropertyId::SpaceBefore) + len(PropertyId::MarginTop));
        self.cursor += len(PropertyId::PaddingTop);
        if let Some(name) = &node.id {
            self.pending_ids.push(name.clone());
        }

        let saved = self.area;
        let start = len(PropertyId::MarginLeft) + len(PropertyId::PaddingStart);
        let end = len(PropertyId::MarginRight) + len(PropertyId::PaddingEnd);
        let mut width = saved.width - start - end;
        if let Some(explicit) = node.length(PropertyId::Width) {
            width = width.min(explicit);
        }
        self.area = Area {
            x: saved.x + start,
            width: width.max(0.0),
        };

        if node.kind == NodeKind::Block {
            self.block_content(id, node)?;
        } else {
            for child in node.child_nodes() {
                self.block(child)?;
            }
        }

        self.area = saved;
        self.cursor += len(PropertyId::PaddingBottom);
        self.space(len(PropertyId::SpaceAfter) + len(PropertyId::MarginBottom));
        if is_forced(node, PropertyId::BreakAfter) && self.absolute == 0 {
            self.break_pending = true;
        }
        Ok(())
    }

    /// Places an absolutely positioned container against the body area
    /// without moving the flow's cursor.
    fn absolute_container(&mut self, node: &'a Node) -> Result<(), LayoutError> {
        let body = self.geometry.body;
        let left = node.length(PropertyId::Left).unwrap_or(0.0);
        let top = node.length(PropertyId::Top).unwrap_or(0.0);
        let width = node
            .length(PropertyId::Width)
            .unwrap_or(body.width - left)
            .max(0.0);
        debug!(
            "[LAYOUT] Absolute container at ({}, {}) width {} on page {}",
            left, top, width, self.page.number
        );

        let (area, cursor, at_top) = (self.area, self.cursor, self.at_top);
        self.area = Area {
            x: body.x + left,
            width,
        };
        self.cursor = body.y + top;
        self.absolute += 1;
        if let Some(name) = &node.id {
            self.pending_ids.push(name.clone());
        }

        let result = node
            .child_nodes()
            .try_for_each(|child| self.block(child));

        self.absolute -= 1;
        self.area = area;
        self.cursor = cursor;
        self.at_top = at_top;
        result
    }

    /// Mixed content of a block: runs of text and inline-level nodes become
    /// paragraphs, nested blocks are laid out between them.
    fn block_content(&mut self, id: NodeId, node: &'a Node) -> Result<(), LayoutError> {
        let document = self.document;
        let style = self.text_style(id);
        let mut tokens = Vec::new();
        let mut first = true;

        for child in &node.children {
            match child {
                Child::Text(text) => push_text(&mut tokens, text, style),
                Child::Node(child_id) => {
                    let Some(child) = document.get(*child_id) else {
                        continue;
                    };
                    if child.kind.is_block_level() {
                        let paragraph = std::mem::take(&mut tokens);
                        if self.set_paragraph(id, paragraph, first)? {
                            first = false;
                        }
                        self.block(*child_id)?;
                    } else {
                        self.inline(*child_id, &mut tokens);
                    }
                }
            }
        }
        self.set_paragraph(id, tokens, first)?;

        for body in std::mem::take(&mut self.deferred) {
            if let Some(body) = document.get(body) {
                for child in body.child_nodes() {
                    self.block(child)?;
                }
            }
        }
        Ok(())
    }

    /// Breaks and places one paragraph. Returns whether any line was placed.
    fn set_paragraph(
        &mut self,
        block: NodeId,
        tokens: Vec<Token>,
        first: bool,
    ) -> Result<bool, LayoutError> {
        if tokens.is_empty() {
            return Ok(false);
        }
        let paragraph = self.paragraph(block, first);
        let lines = break_lines(tokens, &paragraph, self.fallback());
        for line in &lines {
            self.place_line(line)?;
        }
        Ok(!lines.is_empty())
    }

    fn inline(&mut self, id: NodeId, tokens: &mut Vec<Token>) {
        let document = self.document;
        let Some(node) = document.get(id) else {
            return;
        };
        if let Some(name) = &node.id {
            tokens.push(Token::Anchor(name.clone()));
        }

        match node.kind {
            NodeKind::Inline => {
                let style = self.text_style(id);
                for child in &node.children {
                    match child {
                        Child::Text(text) => push_text(tokens, text, style),
                        Child::Node(child) => self.inline(*child, tokens),
                    }
                }
            }
            NodeKind::PageNumberCitation => {
                if let Some(target) = &node.ref_id {
                    tokens.push(Token::Citation {
                        ref_id: target.clone(),
                        style: self.text_style(id),
                    });
                }
            }
            NodeKind::ExternalGraphic => tokens.push(self.graphic(node)),
            NodeKind::Footnote => {
                for child in node.child_nodes() {
                    let Some(kind) = document.get(child).map(|n| n.kind) else {
                        continue;
                    };
                    match kind {
                        NodeKind::Inline => self.inline(child, tokens),
                        NodeKind::FootnoteBody if self.absolute > 0 => self.deferred.push(child),
                        NodeKind::FootnoteBody => {
                            let lines = self.footnote_lines(child);
                            tokens.push(Token::Footnote(self.footnote_bodies.len()));
                            self.footnote_bodies.push(lines);
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn graphic(&self, node: &Node) -> Token {
        let source = node.src.clone().unwrap_or_else(|| ResourceUri::new(""));
        let data = self.resources.load_image(&source);
        if let ImageData::Missing(reason) = &data {
            debug!("[LAYOUT] Graphic '{}' unavailable: {}", source, reason);
        }

        let (natural_w, natural_h) = data
            .dimensions()
            .filter(|&(w, h)| w > 0 && h > 0)
            .map(|(w, h)| (w as f32 * PX_TO_PT, h as f32 * PX_TO_PT))
            .unwrap_or((DEFAULT_GRAPHIC_SIZE, DEFAULT_GRAPHIC_SIZE));
        let wanted_w = node
            .length(PropertyId::ContentWidth)
            .or_else(|| node.length(PropertyId::Width));
        let wanted_h = node
            .length(PropertyId::ContentHeight)
            .or_else(|| node.length(PropertyId::Height));

        let (mut width, mut height) = match (wanted_w, wanted_h) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * natural_h / natural_w),
            (None, Some(h)) => (h * natural_w / natural_h, h),
            (None, None) => (natural_w, natural_h),
        };
        if width > self.area.width && width > 0.0 {
            height *= self.area.width / width;
            width = self.area.width;
        }

        Token::Image {
            source,
            data,
            width,
            height,
        }
    }

    /// Lines of a footnote body, set against the full body width.
    fn footnote_lines(&mut self, body: NodeId) -> Vec<Line> {
        let saved = self.area;
        self.area = Area {
            x: self.geometry.body.x,
            width: self.geometry.body.width,
        };
        let mut lines = Vec::new();
        if let Some(node) = self.document.get(body) {
            for block in node.child_nodes() {
                self.collect_lines(block, &mut lines);
            }
        }
        self.area = saved;
        lines
    }

    fn collect_lines(&mut self, id: NodeId, out: &mut Vec<Line>) {
        let document = self.document;
        let Some(node) = document.get(id) else {
            return;
        };
        let mut tokens = Vec::new();
        if let Some(name) = &node.id {
            tokens.push(Token::Anchor(name.clone()));
        }
        let style = self.text_style(id);

        for child in &node.children {
            match child {
                Child::Text(text) if node.kind == NodeKind::Block => {
                    push_text(&mut tokens, text, style)
                }
                Child::Text(_) => {}
                Child::Node(child_id) => {
                    let is_block = document
                        .get(*child_id)
                        .is_some_and(|c| c.kind.is_block_level());
                    if is_block {
                        self.flush_lines(id, std::mem::take(&mut tokens), out);
                        self.collect_lines(*child_id, out);
                    } else {
                        self.inline(*child_id, &mut tokens);
                    }
                }
            }
        }
        self.flush_lines(id, tokens, out);
    }

    fn flush_lines(&self, block: NodeId, tokens: Vec<Token>, out: &mut Vec<Line>) {
        if !tokens.is_empty() {
            let paragraph = self.paragraph(block, false);
            out.extend(break_lines(tokens, &paragraph, self.fallback()));
        }
    }

    fn place_line(&mut self, line: &Line) -> Result<(), LayoutError> {
        let notes: Vec<usize> = line
            .items
            .iter()
            .filter_map(|(_, token)| match token {
                Token::Footnote(index) => Some(*index),
                _ => None,
            })
            .collect();
        let mut needed: f32 = notes
            .iter()
            .map(|&i| self.footnote_block_height(i))
            .sum();
        if !notes.is_empty() && self.page_footnotes.is_empty() {
            needed += FOOTNOTE_GAP;
        }

        if self.absolute == 0 && !self.at_top && self.cursor + line.height + needed > self.bottom() {
            self.new_page()?;
        }

        let fallback = self.fallback();
        let placed = emit_line(line, self.cursor, &mut self.page.items, fallback);
        self.cursor += line.height;
        self.at_top = false;

        for name in std::mem::take(&mut self.pending_ids) {
            self.resolve(name);
        }
        for name in placed.anchors {
            self.resolve(name);
        }
        for index in placed.footnotes {
            if self.page_footnotes.is_empty() {
                self.footnote_height += FOOTNOTE_GAP;
            }
            self.footnote_height += self.footnote_block_height(index);
            self.page_footnotes.push(index);
        }
        Ok(())
    }

    fn footnote_block_height(&self, index: usize) -> f32 {
        self.footnote_bodies
            .get(index)
            .map_or(0.0, |lines| lines.iter().map(|l| l.height).sum())
    }

    fn new_page(&mut self) -> Result<(), LayoutError> {
        self.finish_page()?;
        self.cursor = self.geometry.body.y;
        self.at_top = true;
        Ok(())
    }

    /// Places the page's footnotes, snapshots its unresolved citations and
    /// emits it. A fresh page numbered one higher takes its place.
    fn finish_page(&mut self) -> Result<(), LayoutError> {
        let next = FormattedPage::new(
            self.page.number + 1,
            self.geometry.width,
            self.geometry.height,
        );
        let mut page = std::mem::replace(&mut self.page, next);

        if !self.page_footnotes.is_empty() {
            let body = self.geometry.body;
            let mut top = body.y + body.height - self.footnote_height;
            page.items.push(PageItem::Rule {
                rect: Rect::new(
                    body.x,
                    top,
                    FOOTNOTE_RULE_WIDTH.min(body.width),
                    FOOTNOTE_RULE_THICKNESS,
                ),
                color: Color::BLACK,
            });
            top += FOOTNOTE_GAP;
            let fallback = self.fallback();
            for index in std::mem::take(&mut self.page_footnotes) {
                let Some(lines) = self.footnote_bodies.get(index) else {
                    continue;
                };
                for line in lines {
                    let placed = emit_line(line, top, &mut page.items, fallback);
                    top += line.height;
                    for name in placed.anchors {
                        trace!("[LAYOUT] '{}' resolved on page {}", name, page.number);
                        self.sink.registry_mut().resolve_on_page(name, page.number);
                    }
                }
            }
        }
        self.footnote_height = 0.0;

        let waiting: Vec<IdName> = {
            let registry = self.sink.registry_mut();
            page.citations()
                .filter(|c| !registry.is_resolved(c.ref_id.as_str()))
                .map(|c| c.ref_id.clone())
                .collect()
        };
        for name in waiting {
            page.add_unresolved(name);
        }

        debug!(
            "[LAYOUT] Page {} finished with {} items, {} unresolved references",
            page.number,
            page.items.len(),
            page.unresolved_refs.len()
        );
        self.sink.emit(page)?;
        self.emitted += 1;
        Ok(())
    }

    /// Ends the sequence: names still pending land on the last page.
    fn finish(mut self) -> Result<usize, LayoutError> {
        for name in std::mem::take(&mut self.pending_ids) {
            self.resolve(name);
        }
        self.finish_page()?;
        Ok(self.emitted)
    }
}

fn is_forced(node: &Node, id: PropertyId) -> bool {
    node.properties
        .keyword(id)
        .is_some_and(|keyword| keyword != "auto")
}

fn is_absolute(node: &Node) -> bool {
    matches!(
        node.properties.keyword(PropertyId::AbsolutePosition),
        Some("absolute" | "fixed")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::InMemoryResourceProvider;
    use crate::source::XmlEventSource;
    use quire_tree::build_document;

    #[derive(Default)]
    struct Collect {
        registry: IdRegistry,
        pages: Vec<FormattedPage>,
    }

    impl PageSink for Collect {
        fn registry_mut(&mut self) -> &mut IdRegistry {
            &mut self.registry
        }

        fn emit(&mut self, page: FormattedPage) -> Result<(), RenderError> {
            self.pages.push(page);
            Ok(())
        }
    }

    fn fo(page_height: &str, flow: &str) -> String {
        format!(
            concat!(
                r#"<fo:root xmlns:fo="http://www.w3.org/1999/XSL/Format">"#,
                r#"<fo:layout-master-set><fo:simple-page-master master-name="p" page-width="200pt" page-height="{}">"#,
                r#"<fo:region-body/></fo:simple-page-master></fo:layout-master-set>"#,
                r#"<fo:page-sequence master-reference="p"><fo:flow>{}</fo:flow></fo:page-sequence></fo:root>"#
            ),
            page_height, flow
        )
    }

    fn layout(source: &str) -> Collect {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut sink = Collect::default();
        let document = build_document(XmlEventSource::new(source), &mut sink.registry).unwrap();
        let resources = InMemoryResourceProvider::new();
        FlowPaginator::new(LayoutOptions::default(), &resources)
            .paginate(&document, &mut sink)
            .unwrap();
        sink
    }

    fn texts(page: &FormattedPage) -> Vec<(f32, String)> {
        page.items
            .iter()
            .filter_map(|item| match item {
                PageItem::Text(t) => Some((t.y, t.text.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn overflowing_flow_continues_on_a_new_page() {
        // 12pt text at line-height 1.2 is 14.4pt a line: six lines fit in 100pt
        let blocks: String = (1..=10).map(|i| format!("<fo:block>line {i}</fo:block>")).collect();
        let sink = layout(&fo("100pt", &blocks));

        assert_eq!(sink.pages.len(), 2);
        assert_eq!(sink.pages[0].number, 1);
        assert_eq!(sink.pages[1].number, 2);
        assert_eq!(texts(&sink.pages[0]).len(), 6);
        assert_eq!(texts(&sink.pages[1])[0].1, "line 7");
    }

    #[test]
    fn forward_citation_is_left_unresolved_on_its_page() {
        let sink = layout(&fo(
            "200pt",
            concat!(
                r#"<fo:block>See page <fo:page-number-citation ref-id="end"/></fo:block>"#,
                r#"<fo:block id="end" break-before="page">The end</fo:block>"#
            ),
        ));

        assert_eq!(sink.pages.len(), 2);
        assert_eq!(sink.pages[0].unresolved_refs, [IdName::new("end")]);
        assert!(sink.pages[1].unresolved_refs.is_empty());
        assert_eq!(sink.registry.page_of("end"), Some(2));
    }

    #[test]
    fn backward_citation_is_resolved_at_once() {
        let sink = layout(&fo(
            "200pt",
            concat!(
                r#"<fo:block id="start">Intro</fo:block>"#,
                r#"<fo:block>Back to <fo:page-number-citation ref-id="start"/></fo:block>"#
            ),
        ));
        assert_eq!(sink.pages.len(), 1);
        assert!(sink.pages[0].unresolved_refs.is_empty());
    }

    #[test]
    fn footnote_body_sits_below_a_rule() {
        let sink = layout(&fo(
            "200pt",
            concat!(
                r#"<fo:block>Body<fo:footnote><fo:inline>1</fo:inline>"#,
                r#"<fo:footnote-body><fo:block id="fn1">Note text</fo:block></fo:footnote-body>"#,
                r#"</fo:footnote></fo:block>"#
            ),
        ));

        let page = &sink.pages[0];
        let rule_y = page
            .items
            .iter()
            .find_map(|item| match item {
                PageItem::Rule { rect, .. } => Some(rect.y),
                _ => None,
            })
            .unwrap();
        let note = texts(page)
            .into_iter()
            .find(|(_, text)| text == "Note text")
            .unwrap();
        assert!(note.0 > rule_y);
        assert!(note.0 <= 200.0);
        assert_eq!(sink.registry.page_of("fn1"), Some(1));
    }

    #[test]
    fn absolute_container_does_not_move_the_flow() {
        let plain = layout(&fo("200pt", "<fo:block>Flow</fo:block>"));
        let with_box = layout(&fo(
            "200pt",
            concat!(
                r#"<fo:block-container absolute-position="absolute" top="150pt" left="10pt">"#,
                r#"<fo:block>Boxed</fo:block></fo:block-container>"#,
                r#"<fo:block>Flow</fo:block>"#
            ),
        ));

        let runs = texts(&with_box.pages[0]);
        let flow = runs.iter().find(|(_, t)| t == "Flow").unwrap();
        let boxed = runs.iter().find(|(_, t)| t == "Boxed").unwrap();
        assert_eq!(flow.0, texts(&plain.pages[0])[0].0);
        assert!(boxed.0 > 150.0);
    }

    #[test]
    fn missing_graphic_gets_a_default_box() {
        let sink = layout(&fo(
            "200pt",
            r#"<fo:block><fo:external-graphic src="nope.png"/></fo:block>"#,
        ));
        let image = sink.pages[0].images().next().unwrap();
        assert_eq!(image.rect.width, DEFAULT_GRAPHIC_SIZE);
        assert!(matches!(image.data, ImageData::Missing(_)));
    }

    #[test]
    fn unknown_master_is_reported() {
        let source = fo("200pt", "<fo:block>x</fo:block>").replace(
            r#"master-reference="p""#,
            r#"master-reference="q""#,
        );
        let mut sink = Collect::default();
        let document = build_document(XmlEventSource::new(&source), &mut sink.registry).unwrap();
        let resources = InMemoryResourceProvider::new();
        let result = FlowPaginator::new(LayoutOptions::default(), &resources).paginate(&document, &mut sink);
        assert!(matches!(result, Err(LayoutError::UnknownMaster { name, .. }) if name == "q"));
    }
}
