//! Small formatting-object documents for the integration tests.

/// A document with one A4 page master named "a4" and `flow` as its only flow.
pub fn document(flow: &str) -> String {
    document_with_master(r#"page-width="595pt" page-height="842pt" margin-top="36pt" margin-bottom="36pt" margin-left="36pt" margin-right="36pt""#, flow)
}

/// Like [`document`] with explicit master attributes.
pub fn document_with_master(master_attributes: &str, flow: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            "\n",
            r#"<fo:root xmlns:fo="http://www.w3.org/1999/XSL/Format">"#,
            r#"<fo:layout-master-set>"#,
            r#"<fo:simple-page-master master-name="a4" {}><fo:region-body/></fo:simple-page-master>"#,
            r#"</fo:layout-master-set>"#,
            r#"<fo:page-sequence master-reference="a4"><fo:flow>{}</fo:flow></fo:page-sequence>"#,
            r#"</fo:root>"#
        ),
        master_attributes, flow
    )
}

pub fn block(text: &str) -> String {
    format!("<fo:block>{}</fo:block>", text)
}

pub fn block_with_id(id: &str, text: &str) -> String {
    format!(r#"<fo:block id="{}">{}</fo:block>"#, id, text)
}

/// A block that starts a new page.
pub fn page_break_block(id: &str, text: &str) -> String {
    format!(r#"<fo:block id="{}" break-before="page">{}</fo:block>"#, id, text)
}

pub fn citation(ref_id: &str) -> String {
    format!(r#"<fo:page-number-citation ref-id="{}"/>"#, ref_id)
}

pub fn footnote(mark: &str, body_id: &str, body: &str) -> String {
    format!(
        r#"<fo:footnote><fo:inline>{}</fo:inline><fo:footnote-body><fo:block id="{}">{}</fo:block></fo:footnote-body></fo:footnote>"#,
        mark, body_id, body
    )
}

pub fn graphic(src: &str) -> String {
    format!(r#"<fo:external-graphic src="{}"/>"#, src)
}

/// An 8-bit gray PNG with a horizontal ramp.
pub fn gray_png(width: u32, height: u32) -> Vec<u8> {
    let image = image::GrayImage::from_fn(width, height, |x, _| {
        image::Luma([(x * 255 / width.max(1)) as u8])
    });
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png encoding");
    bytes.into_inner()
}
