//! PDF output for formatted pages, built on an in-memory `lopdf` document
//! that is written out when the document finishes.

mod image;
mod renderer;

pub use image::PdfImageEncoder;
pub use renderer::LopdfRenderer;
