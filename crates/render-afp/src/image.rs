//! Image encoding under device bit-depth and colour constraints.

use log::{debug, trace};
use quire_render_core::{
    ColorModel, EncodingError, EncodingPath, ImageEncoder, ImageObjectInfo, PaintingState,
    RasterImage, native_samples, packed_depth, rgb_to_grayscale, to_rgb,
};

/// Largest value an image descriptor or object area field can carry.
pub const HEADER_FIELD_MAX: u32 = u16::MAX as u32;

/// Fails when `value` does not fit a 16-bit header field.
pub fn header_field(field: &'static str, value: u32) -> Result<u16, EncodingError> {
    u16::try_from(value).map_err(|_| EncodingError::OutOfRange {
        field,
        value,
        limit: HEADER_FIELD_MAX,
    })
}

/// Encodes raster images for the AFP renderer.
///
/// An image is emitted at its native pixel size when the device can take it
/// as is. Otherwise it is converted to 24-bit RGB and, when colour output is
/// off, reduced to gray at the device bit depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct AfpImageHandler;

impl AfpImageHandler {
    pub fn new() -> Self {
        Self
    }

    /// Whether `image` can be emitted without conversion under `state`.
    pub fn can_encode_directly(&self, image: &RasterImage, state: &PaintingState) -> bool {
        let fits = image.pixel_size() <= state.max_pixel_size();
        let small_palette = image.palette_len().is_none_or(|n| n <= 2);
        // Inverted monochrome is not supported on the direct path.
        let inverted_mono = image.is_monochrome() && image.is_zero_black();
        fits && small_palette && !inverted_mono
    }
}

impl ImageEncoder for AfpImageHandler {
    fn encode_image(
        &self,
        image: &RasterImage,
        state: &PaintingState,
    ) -> Result<ImageObjectInfo, EncodingError> {
        image.validate()?;
        header_field("width", image.width)?;
        header_field("height", image.height)?;
        header_field("resolution", state.resolution)?;
        trace!(
            "[AFP] Image {}x{}, color model {:?}, pixel size {}, device max {}",
            image.width,
            image.height,
            image.color_model,
            image.pixel_size(),
            state.max_pixel_size()
        );

        let (bits_per_pixel, color, path, data) = if self.can_encode_directly(image, state) {
            debug!("[AFP] Encoding image directly at {} bpp", image.pixel_size());
            let color = matches!(
                image.color_model,
                ColorModel::Rgb { .. } | ColorModel::Indexed { .. }
            ) && image.pixel_size() > 1;
            (
                image.pixel_size() as u8,
                color,
                EncodingPath::Direct,
                native_samples(image),
            )
        } else {
            debug!("[AFP] Encoding image via RGB");
            let rgb = to_rgb(image);
            if state.color_images {
                (24, true, EncodingPath::Rgb, rgb)
            } else {
                let bits = packed_depth(state.bits_per_pixel);
                debug!("[AFP] Converting RGB image to grayscale at {} bpp", bits);
                (
                    bits,
                    false,
                    EncodingPath::Grayscale,
                    rgb_to_grayscale(&rgb, image.width, image.height, bits),
                )
            }
        };

        let info = ImageObjectInfo {
            bits_per_pixel,
            color,
            width: image.width,
            height: image.height,
            data_resolution: state.resolution,
            area_resolution: state.resolution,
            path,
            data,
        };
        debug_assert!(info.is_consistent());
        Ok(info)
    }
}
