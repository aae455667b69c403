//! Raster images and their native colour models.

use crate::error::EncodingError;
use image::DynamicImage;
use log::trace;
use quire_types::Color;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ColorModel {
    /// Packed gray samples. `zero_is_black` gives the polarity of the samples.
    Gray { bits: u8, zero_is_black: bool },
    /// Packed palette indices.
    Indexed { bits: u8, palette: Vec<Color> },
    /// Interleaved 8-bit channels, optionally followed by alpha.
    Rgb { has_alpha: bool },
}

/// A decoded image. Rows are packed most significant bit first and padded to
/// a whole byte.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub color_model: ColorModel,
    pub data: Vec<u8>,
}

impl RasterImage {
    pub fn new(
        width: u32,
        height: u32,
        color_model: ColorModel,
        data: Vec<u8>,
    ) -> Result<Self, EncodingError> {
        let image = Self {
            width,
            height,
            color_model,
            data,
        };
        image.validate()?;
        Ok(image)
    }

    /// Decodes PNG, JPEG or GIF bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        let dynamic = image::load_from_memory(bytes)?;
        Ok(Self::from_dynamic(dynamic))
    }

    pub fn from_dynamic(dynamic: DynamicImage) -> Self {
        let (width, height) = (dynamic.width(), dynamic.height());
        match dynamic {
            DynamicImage::ImageLuma8(buf) => Self {
                width,
                height,
                color_model: ColorModel::Gray {
                    bits: 8,
                    zero_is_black: true,
                },
                data: buf.into_raw(),
            },
            DynamicImage::ImageRgb8(buf) => Self {
                width,
                height,
                color_model: ColorModel::Rgb { has_alpha: false },
                data: buf.into_raw(),
            },
            other if other.color().has_alpha() => Self {
                width,
                height,
                color_model: ColorModel::Rgb { has_alpha: true },
                data: other.to_rgba8().into_raw(),
            },
            other => Self {
                width,
                height,
                color_model: ColorModel::Rgb { has_alpha: false },
                data: other.to_rgb8().into_raw(),
            },
        }
    }

    /// Bits per pixel as stored, alpha included.
    pub fn stored_bits_per_pixel(&self) -> u32 {
        match &self.color_model {
            ColorModel::Gray { bits, .. } | ColorModel::Indexed { bits, .. } => *bits as u32,
            ColorModel::Rgb { has_alpha: true } => 32,
            ColorModel::Rgb { has_alpha: false } => 24,
        }
    }

    /// Bits per pixel that carry colour; an alpha channel does not count.
    pub fn pixel_size(&self) -> u32 {
        match &self.color_model {
            ColorModel::Rgb { .. } => 24,
            _ => self.stored_bits_per_pixel(),
        }
    }

    pub fn palette_len(&self) -> Option<usize> {
        match &self.color_model {
            ColorModel::Indexed { palette, .. } => Some(palette.len()),
            _ => None,
        }
    }

    pub fn is_monochrome(&self) -> bool {
        match &self.color_model {
            ColorModel::Gray { bits, .. } => *bits == 1,
            ColorModel::Indexed { bits, palette } => *bits == 1 && palette.len() <= 2,
            ColorModel::Rgb { .. } => false,
        }
    }

    /// True for a monochrome image whose 0 samples are black.
    pub fn is_zero_black(&self) -> bool {
        match &self.color_model {
            ColorModel::Gray {
                bits: 1,
                zero_is_black,
            } => *zero_is_black,
            ColorModel::Indexed { bits: 1, palette } if palette.len() == 2 => {
                palette[0].luminance() < palette[1].luminance()
            }
            _ => false,
        }
    }

    pub fn row_bytes(&self) -> usize {
        (self.width as usize * self.stored_bits_per_pixel() as usize).div_ceil(8)
    }

    pub fn expected_len(&self) -> usize {
        self.row_bytes() * self.height as usize
    }

    pub fn validate(&self) -> Result<(), EncodingError> {
        if let ColorModel::Gray { bits, .. } | ColorModel::Indexed { bits, .. } = &self.color_model
            && !is_packed_depth(*bits)
        {
            return Err(EncodingError::UnsupportedDepth(*bits));
        }
        if self.data.len() != self.expected_len() {
            return Err(EncodingError::DataLength {
                expected: self.expected_len(),
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// The colour of pixel `(x, y)`, alpha discarded. Only meaningful for an
    /// image that passed [`validate`](Self::validate).
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let row = &self.data[y as usize * self.row_bytes()..];
        match &self.color_model {
            ColorModel::Gray { bits, zero_is_black } => {
                let max = (1u16 << bits) - 1;
                let sample = read_packed(row, x, *bits) as u16;
                let level = if *zero_is_black { sample } else { max - sample };
                Color::gray((level * 255 / max) as u8)
            }
            ColorModel::Indexed { bits, palette } => {
                let index = read_packed(row, x, *bits) as usize;
                palette.get(index).copied().unwrap_or(Color::BLACK)
            }
            ColorModel::Rgb { has_alpha } => {
                let stride = if *has_alpha { 4 } else { 3 };
                let i = x as usize * stride;
                Color::rgb(row[i], row[i + 1], row[i + 2])
            }
        }
    }
}

/// Depths at which packed samples never straddle a byte.
pub fn is_packed_depth(bits: u8) -> bool {
    matches!(bits, 1 | 2 | 4 | 8)
}

fn read_packed(row: &[u8], x: u32, bits: u8) -> u8 {
    let bit_offset = x as usize * bits as usize;
    let byte = row[bit_offset / 8];
    let shift = 8 - bits as usize - (bit_offset % 8);
    (byte >> shift) & (((1u16 << bits) - 1) as u8)
}

/// Image bytes as they reached the page: still encoded, already decoded, or
/// unavailable.
#[derive(Debug, Clone)]
pub enum ImageData {
    Encoded(Arc<[u8]>),
    Raster(Arc<RasterImage>),
    /// The resource could not be fetched; carries the reason.
    Missing(String),
}

impl ImageData {
    /// The decoded image, or the reason it cannot be read.
    pub fn load(&self) -> Result<Arc<RasterImage>, EncodingError> {
        match self {
            ImageData::Encoded(bytes) => {
                let image = RasterImage::decode(bytes)?;
                trace!(
                    "Decoded {}x{} image, {:?}",
                    image.width, image.height, image.color_model
                );
                Ok(Arc::new(image))
            }
            ImageData::Raster(image) => {
                image.validate()?;
                Ok(Arc::clone(image))
            }
            ImageData::Missing(reason) => Err(EncodingError::Unreadable(reason.clone())),
        }
    }

    /// Intrinsic size in pixels, when it can be known without failing.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            ImageData::Raster(image) => Some((image.width, image.height)),
            ImageData::Encoded(bytes) => image::load_from_memory(bytes)
                .ok()
                .map(|d| (d.width(), d.height())),
            ImageData::Missing(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_does_not_count_toward_pixel_size() {
        let img = RasterImage::new(1, 1, ColorModel::Rgb { has_alpha: true }, vec![1, 2, 3, 4])
            .unwrap();
        assert_eq!(img.stored_bits_per_pixel(), 32);
        assert_eq!(img.pixel_size(), 24);
        assert_eq!(img.pixel(0, 0), Color::rgb(1, 2, 3));
    }

    #[test]
    fn packed_rows_are_padded() {
        let img = RasterImage::new(
            10,
            2,
            ColorModel::Gray {
                bits: 1,
                zero_is_black: false,
            },
            vec![0b1000_0000, 0b0100_0000, 0, 0],
        )
        .unwrap();
        assert_eq!(img.row_bytes(), 2);
        assert_eq!(img.pixel(0, 0), Color::BLACK);
        assert_eq!(img.pixel(1, 0), Color::WHITE);
        assert_eq!(img.pixel(9, 0), Color::BLACK);
        assert!(img.is_monochrome());
        assert!(!img.is_zero_black());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = RasterImage::new(2, 2, ColorModel::Rgb { has_alpha: false }, vec![0; 5])
            .unwrap_err();
        assert!(matches!(
            err,
            EncodingError::DataLength {
                expected: 12,
                actual: 5
            }
        ));
    }

    #[test]
    fn depths_that_straddle_bytes_are_rejected() {
        for bits in [0, 3, 5, 6, 7, 9] {
            let err = RasterImage::new(
                3,
                1,
                ColorModel::Gray {
                    bits,
                    zero_is_black: true,
                },
                vec![0; (3 * bits as usize).div_ceil(8)],
            )
            .unwrap_err();
            assert!(matches!(err, EncodingError::UnsupportedDepth(b) if b == bits));
        }
        let indexed = RasterImage {
            width: 2,
            height: 1,
            color_model: ColorModel::Indexed {
                bits: 3,
                palette: vec![Color::BLACK; 8],
            },
            data: vec![0],
        };
        let err = ImageData::Raster(Arc::new(indexed)).load().unwrap_err();
        assert!(matches!(err, EncodingError::UnsupportedDepth(3)));
    }

    #[test]
    fn two_bit_samples_are_read_across_bytes() {
        // 0, 1, 2, 3 | 3, 0: the fifth pixel starts the second byte
        let img = RasterImage::new(
            6,
            1,
            ColorModel::Gray {
                bits: 2,
                zero_is_black: true,
            },
            vec![0b0001_1011, 0b1100_0000],
        )
        .unwrap();
        assert_eq!(img.row_bytes(), 2);
        assert_eq!(img.pixel(0, 0), Color::BLACK);
        assert_eq!(img.pixel(1, 0), Color::gray(85));
        assert_eq!(img.pixel(3, 0), Color::WHITE);
        assert_eq!(img.pixel(4, 0), Color::WHITE);
        assert_eq!(img.pixel(5, 0), Color::BLACK);
    }

    #[test]
    fn indexed_polarity_follows_palette() {
        let img = RasterImage::new(
            8,
            1,
            ColorModel::Indexed {
                bits: 1,
                palette: vec![Color::BLACK, Color::WHITE],
            },
            vec![0],
        )
        .unwrap();
        assert!(img.is_zero_black());
        assert_eq!(img.palette_len(), Some(2));
    }

    #[test]
    fn missing_data_is_unreadable() {
        let err = ImageData::Missing("not found".into()).load().unwrap_err();
        assert!(matches!(err, EncodingError::Unreadable(_)));
        let err = ImageData::Encoded(Arc::from(&b"not an image"[..]))
            .load()
            .unwrap_err();
        assert!(matches!(err, EncodingError::Decode(_)));
    }
}
