use lopdf::content::Content;
use lopdf::{Document as LopdfDocument, Object};

/// Every string drawn with `Tj` on 1-based page `number`.
pub fn shown_strings(doc: &LopdfDocument, number: u32) -> Vec<String> {
    let pages = doc.get_pages();
    let Some(page_id) = pages.get(&number) else {
        return Vec::new();
    };
    let Ok(data) = doc.get_page_content(*page_id) else {
        return Vec::new();
    };
    let Ok(content) = Content::decode(&data) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

/// Number of image XObjects drawn (`Do`) on page `number`.
pub fn images_drawn(doc: &LopdfDocument, number: u32) -> usize {
    let pages = doc.get_pages();
    pages
        .get(&number)
        .and_then(|id| doc.get_page_content(*id).ok())
        .and_then(|data| Content::decode(&data).ok())
        .map_or(0, |c| c.operations.iter().filter(|op| op.operator == "Do").count())
}

#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $expected:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $expected,
            "expected {} pages, got {}",
            $expected,
            $pdf.page_count()
        );
    };
}

#[macro_export]
macro_rules! assert_page_shows {
    ($pdf:expr, $page:expr, $text:expr) => {
        let shown = $pdf.page_text($page);
        assert!(
            shown.iter().any(|s| s.contains($text)),
            "page {} does not show {:?}; it shows {:?}",
            $page,
            $text,
            shown
        );
    };
}
