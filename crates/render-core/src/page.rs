//! Formatted pages as handed over by the layout collaborator.

use crate::raster::ImageData;
use quire_types::{Color, IdName, IdRegistry, Rect, ResourceUri};

/// Metadata written once per output stream.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub producer: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: None,
            producer: concat!("quire ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Left edge, in points from the page's left edge.
    pub x: f32,
    /// Baseline, in points from the page's top edge.
    pub y: f32,
    pub font_size: f32,
    pub color: Color,
    pub text: String,
}

/// A page-number citation. Carries the fallback text baked in by layout and,
/// once the target is known, the page number that replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Citation {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub color: Color,
    pub ref_id: IdName,
    pub fallback: String,
    pub resolved: Option<usize>,
}

impl Citation {
    pub fn display_text(&self) -> String {
        match self.resolved {
            Some(page) => page.to_string(),
            None => self.fallback.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub rect: Rect,
    pub source: ResourceUri,
    pub data: ImageData,
}

#[derive(Debug, Clone)]
pub enum PageItem {
    Text(TextRun),
    Citation(Citation),
    Image(PlacedImage),
    Rule { rect: Rect, color: Color },
}

#[derive(Debug, Clone)]
pub struct FormattedPage {
    /// 1-based position in the document.
    pub number: usize,
    pub width: f32,
    pub height: f32,
    pub items: Vec<PageItem>,
    /// Names this page cites that were unresolved when it was formatted.
    pub unresolved_refs: Vec<IdName>,
}

impl FormattedPage {
    pub fn new(number: usize, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            items: Vec::new(),
            unresolved_refs: Vec::new(),
        }
    }

    /// Adds `name` to the unresolved snapshot if it is not already there.
    pub fn add_unresolved(&mut self, name: IdName) {
        if !self.unresolved_refs.contains(&name) {
            self.unresolved_refs.push(name);
        }
    }

    pub fn citations(&self) -> impl Iterator<Item = &Citation> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Citation(c) => Some(c),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &PlacedImage> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Image(img) => Some(img),
            _ => None,
        })
    }

    /// Fills in the page number of every citation whose target now has one.
    /// Returns how many citations were filled.
    pub fn resolve_citations(&mut self, registry: &IdRegistry) -> usize {
        let mut filled = 0;
        for item in &mut self.items {
            if let PageItem::Citation(c) = item {
                if c.resolved.is_none() {
                    if let Some(page) = registry.page_of(c.ref_id.as_str()) {
                        c.resolved = Some(page);
                        filled += 1;
                    }
                }
            }
        }
        filled
    }

    /// Every text run on the page in item order, with citations rendered.
    pub fn plain_text(&self) -> String {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                PageItem::Text(t) => out.push(t.text.clone()),
                PageItem::Citation(c) => out.push(c.display_text()),
                _ => {}
            }
        }
        out.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(ref_id: &str) -> PageItem {
        PageItem::Citation(Citation {
            x: 0.0,
            y: 0.0,
            font_size: 10.0,
            color: Color::BLACK,
            ref_id: IdName::new(ref_id),
            fallback: "??".into(),
            resolved: None,
        })
    }

    #[test]
    fn citations_take_resolved_page_numbers() {
        let mut page = FormattedPage::new(1, 100.0, 100.0);
        page.items.push(citation("a"));
        page.items.push(citation("b"));

        let mut registry = IdRegistry::new();
        registry.resolve_on_page("a", 7);
        registry.resolve("b");

        assert_eq!(page.resolve_citations(&registry), 1);
        assert_eq!(page.plain_text(), "7 ??");
    }

    #[test]
    fn unresolved_snapshot_has_no_duplicates() {
        let mut page = FormattedPage::new(2, 1.0, 1.0);
        page.add_unresolved("x".into());
        page.add_unresolved("x".into());
        assert_eq!(page.unresolved_refs.len(), 1);
    }
}
