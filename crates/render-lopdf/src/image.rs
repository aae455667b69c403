use log::debug;
use quire_render_core::{
    ColorModel, EncodingError, EncodingPath, ImageEncoder, ImageObjectInfo, PaintingState,
    RasterImage, native_samples, rgb_to_grayscale, to_rgb,
};

/// Encodes images as 8-bit `DeviceGray` or `DeviceRGB` samples.
///
/// Colour images stay RGB when the painting state allows colour; everything
/// else is reduced to 8-bit gray.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfImageEncoder;

impl ImageEncoder for PdfImageEncoder {
    fn encode_image(
        &self,
        image: &RasterImage,
        state: &PaintingState,
    ) -> Result<ImageObjectInfo, EncodingError> {
        image.validate()?;
        let (bits_per_pixel, color, path, data) = match &image.color_model {
            ColorModel::Gray {
                bits: 8,
                zero_is_black: true,
            } => (8, false, EncodingPath::Direct, native_samples(image)),
            ColorModel::Rgb { .. } if state.color_images => {
                (24, true, EncodingPath::Direct, native_samples(image))
            }
            ColorModel::Indexed { .. } if state.color_images => {
                (24, true, EncodingPath::Rgb, to_rgb(image))
            }
            _ => {
                let rgb = to_rgb(image);
                (
                    8,
                    false,
                    EncodingPath::Grayscale,
                    rgb_to_grayscale(&rgb, image.width, image.height, 8),
                )
            }
        };
        debug!(
            "[PDF] Image {}x{} encoded at {} bpp via {:?}",
            image.width, image.height, bits_per_pixel, path
        );
        Ok(ImageObjectInfo {
            bits_per_pixel,
            color,
            width: image.width,
            height: image.height,
            data_resolution: state.resolution,
            area_resolution: state.resolution,
            path,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_types::Color;

    #[test]
    fn colour_is_kept_only_when_allowed() {
        let img = RasterImage::new(
            2,
            1,
            ColorModel::Indexed {
                bits: 1,
                palette: vec![Color::rgb(255, 0, 0), Color::WHITE],
            },
            vec![0b0100_0000],
        )
        .unwrap();
        let mut state = PaintingState::default();
        let gray = PdfImageEncoder.encode_image(&img, &state).unwrap();
        assert_eq!(gray.path, EncodingPath::Grayscale);
        assert_eq!(gray.data.len(), 2);
        assert_eq!(gray.data[1], 255);

        state.color_images = true;
        let rgb = PdfImageEncoder.encode_image(&img, &state).unwrap();
        assert!(rgb.color);
        assert_eq!(rgb.data, vec![255, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn packed_gray_is_widened_to_eight_bits() {
        let img = RasterImage::new(
            4,
            1,
            ColorModel::Gray {
                bits: 2,
                zero_is_black: true,
            },
            vec![0b0001_1011],
        )
        .unwrap();
        let info = PdfImageEncoder
            .encode_image(&img, &PaintingState::default())
            .unwrap();
        assert_eq!(info.bits_per_pixel, 8);
        assert_eq!(info.data, vec![0, 85, 170, 255]);
        assert!(info.is_consistent());
    }
}
