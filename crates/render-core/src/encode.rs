//! Colour-space and bit-depth conversion for embedded images.

use crate::error::{EncodingError, PageImageError};
use crate::page::PlacedImage;
use crate::raster::{ColorModel, ImageData, RasterImage};

/// Output device constraints that govern image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintingState {
    /// Device bit depth per colour component.
    pub bits_per_pixel: u8,
    pub color_images: bool,
    /// Dots per inch.
    pub resolution: u32,
}

impl Default for PaintingState {
    fn default() -> Self {
        Self {
            bits_per_pixel: 8,
            color_images: false,
            resolution: 240,
        }
    }
}

impl PaintingState {
    /// The largest pixel size the device accepts.
    pub fn max_pixel_size(&self) -> u32 {
        let bpp = self.bits_per_pixel as u32;
        if self.color_images { bpp * 3 } else { bpp }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingPath {
    /// Emitted at the native pixel size.
    Direct,
    /// Converted to 24-bit RGB.
    Rgb,
    /// Converted to RGB, then reduced to gray at the device depth.
    Grayscale,
}

/// An encoded image together with the header values that describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageObjectInfo {
    pub bits_per_pixel: u8,
    pub color: bool,
    pub width: u32,
    pub height: u32,
    pub data_resolution: u32,
    pub area_resolution: u32,
    pub path: EncodingPath,
    pub data: Vec<u8>,
}

impl ImageObjectInfo {
    pub fn row_bytes(&self) -> usize {
        (self.width as usize * self.bits_per_pixel as usize).div_ceil(8)
    }

    /// True when the payload length matches the declared depth and size.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.row_bytes() * self.height as usize
    }
}

/// The image-encoding capability of a renderer variant.
pub trait ImageEncoder {
    fn encode_image(
        &self,
        image: &RasterImage,
        state: &PaintingState,
    ) -> Result<ImageObjectInfo, EncodingError>;
}

/// Loads and encodes the image placed on `page`, attaching page and image
/// context to any failure.
pub fn encode_placed_image<E: ImageEncoder + ?Sized>(
    encoder: &E,
    page: usize,
    placed: &PlacedImage,
    state: &PaintingState,
) -> Result<ImageObjectInfo, PageImageError> {
    let wrap = |error| PageImageError {
        page,
        image: placed.source.to_string(),
        error,
    };
    let raster = ImageData::load(&placed.data).map_err(wrap)?;
    encoder.encode_image(&raster, state).map_err(wrap)
}

/// The native samples, alpha stripped.
pub fn native_samples(image: &RasterImage) -> Vec<u8> {
    match image.color_model {
        ColorModel::Rgb { has_alpha: true } => image
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        _ => image.data.clone(),
    }
}

/// Interleaved 8-bit RGB, three bytes per pixel.
pub fn to_rgb(image: &RasterImage) -> Vec<u8> {
    if image.color_model == (ColorModel::Rgb { has_alpha: false }) {
        return image.data.clone();
    }
    let mut out = Vec::with_capacity(image.width as usize * image.height as usize * 3);
    for y in 0..image.height {
        for x in 0..image.width {
            let c = image.pixel(x, y);
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
    }
    out
}

/// The deepest packed sample depth (1, 2, 4 or 8) not above `bits`.
pub fn packed_depth(bits: u8) -> u8 {
    match bits {
        0 | 1 => 1,
        2 | 3 => 2,
        4..=7 => 4,
        _ => 8,
    }
}

/// Reduces interleaved RGB to packed gray samples of [`packed_depth`]`(bits)`
/// each.
///
/// At one bit a set bit marks a dark (inked) pixel. At higher depths larger
/// values are lighter.
pub fn rgb_to_grayscale(rgb: &[u8], width: u32, height: u32, bits: u8) -> Vec<u8> {
    let bits = packed_depth(bits);
    let row_bytes = (width as usize * bits as usize).div_ceil(8);
    let mut out = vec![0u8; row_bytes * height as usize];
    let max = (1u16 << bits) - 1;
    for y in 0..height as usize {
        let row = &mut out[y * row_bytes..(y + 1) * row_bytes];
        for x in 0..width as usize {
            let i = (y * width as usize + x) * 3;
            let lum = quire_types::Color::rgb(rgb[i], rgb[i + 1], rgb[i + 2]).luminance() as u16;
            let sample = if bits == 1 {
                u16::from(lum < 128)
            } else {
                (lum * max + 127) / 255
            };
            write_packed(row, x, bits, sample as u8);
        }
    }
    out
}

fn write_packed(row: &mut [u8], x: usize, bits: u8, sample: u8) {
    let bit_offset = x * bits as usize;
    let shift = 8 - bits as usize - (bit_offset % 8);
    row[bit_offset / 8] |= sample << shift;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_triples_the_device_depth() {
        let mut state = PaintingState {
            bits_per_pixel: 4,
            color_images: false,
            resolution: 300,
        };
        assert_eq!(state.max_pixel_size(), 4);
        state.color_images = true;
        assert_eq!(state.max_pixel_size(), 12);
    }

    #[test]
    fn grayscale_packs_at_requested_depth() {
        // white, black, mid gray
        let rgb = [255, 255, 255, 0, 0, 0, 128, 128, 128];
        assert_eq!(rgb_to_grayscale(&rgb, 3, 1, 8), vec![255, 0, 128]);
        assert_eq!(rgb_to_grayscale(&rgb, 3, 1, 4), vec![0xF0, 0x80]);
        assert_eq!(rgb_to_grayscale(&rgb, 3, 1, 1), vec![0b0100_0000]);
    }

    #[test]
    fn odd_depths_fall_back_to_a_packed_depth() {
        assert_eq!(packed_depth(0), 1);
        assert_eq!(packed_depth(3), 2);
        assert_eq!(packed_depth(7), 4);
        assert_eq!(packed_depth(12), 8);
        // five pixels at 3 bits are packed at 2: two bytes, nothing straddles
        let rgb = [255u8; 15];
        assert_eq!(rgb_to_grayscale(&rgb, 5, 1, 3), vec![0xFF, 0xC0]);
    }

    #[test]
    fn alpha_is_stripped_from_native_samples() {
        let img = RasterImage::new(2, 1, ColorModel::Rgb { has_alpha: true }, vec![1, 2, 3, 9, 4, 5, 6, 9])
            .unwrap();
        assert_eq!(native_samples(&img), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn consistency_checks_payload_length() {
        let info = ImageObjectInfo {
            bits_per_pixel: 4,
            color: false,
            width: 3,
            height: 2,
            data_resolution: 240,
            area_resolution: 240,
            path: EncodingPath::Grayscale,
            data: vec![0; 4],
        };
        assert!(info.is_consistent());
    }
}
