//! Renderer abstraction shared by every output format.
//!
//! - [`DocumentRenderer`]: header, one call per page, trailer
//! - [`FormattedPage`]: the page model handed over by layout
//! - [`RasterImage`] and the bit-depth helpers used by image encoders

mod encode;
mod error;
mod page;
mod raster;
mod renderer;

pub use encode::{
    EncodingPath, ImageEncoder, ImageObjectInfo, PaintingState, encode_placed_image,
    native_samples, packed_depth, rgb_to_grayscale, to_rgb,
};
pub use error::{EncodingError, PageImageError, RenderError};
pub use page::{Citation, DocumentInfo, FormattedPage, PageItem, PlacedImage, TextRun};
pub use raster::{ColorModel, ImageData, RasterImage, is_packed_depth};
pub use renderer::DocumentRenderer;
