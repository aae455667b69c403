mod common;

use common::fixtures::*;
use common::{TestResult, init_logger, render_afp};
use quire::{InMemoryResourceProvider, OutputFormat, PaintingState, PipelineBuilder, ResourceProvider};
use quire_render_afp::fields::{
    self, Field, IMAGE_DATA_DESCRIPTOR, IMAGE_PICTURE_DATA, NO_OPERATION, read_fields,
};
use std::sync::Arc;

fn resources_with_logo() -> Arc<dyn ResourceProvider> {
    let provider = InMemoryResourceProvider::new();
    provider
        .add("logo.png", gray_png(8, 4))
        .expect("resource store");
    Arc::new(provider)
}

fn state(bits_per_pixel: u8, color_images: bool) -> PaintingState {
    PaintingState {
        bits_per_pixel,
        color_images,
        resolution: 300,
    }
}

fn logo_document() -> String {
    document(&block(&format!("Logo {}", graphic("logo.png"))))
}

fn fields_with_id(fields: &[Field], id: fields::FieldId) -> Vec<&Field> {
    fields.iter().filter(|f| f.id == id).collect()
}

fn picture_bytes(fields: &[Field]) -> usize {
    fields_with_id(fields, IMAGE_PICTURE_DATA)
        .iter()
        .map(|f| f.payload.len())
        .sum()
}

#[test]
fn eight_bit_gray_image_is_encoded_directly_on_an_eight_bit_device() -> TestResult {
    init_logger();
    let (bytes, stats) = render_afp(&logo_document(), state(8, false), resources_with_logo())?;
    let fields = read_fields(&bytes)?;

    assert_eq!(stats.pages, 1);
    let descriptors = fields_with_id(&fields, IMAGE_DATA_DESCRIPTOR);
    assert_eq!(descriptors.len(), 1);
    // 300 dpi both ways, 8x4 pixels, 8 bpp, no colour
    assert_eq!(
        descriptors[0].payload,
        [0x01, 0x2C, 0x01, 0x2C, 0, 8, 0, 4, 8, 0]
    );
    assert_eq!(picture_bytes(&fields), 8 * 4);
    Ok(())
}

#[test]
fn four_bit_device_gets_grayscale_at_its_depth() -> TestResult {
    init_logger();
    let (bytes, _) = render_afp(&logo_document(), state(4, false), resources_with_logo())?;
    let fields = read_fields(&bytes)?;

    let descriptor = &fields_with_id(&fields, IMAGE_DATA_DESCRIPTOR)[0].payload;
    assert_eq!(descriptor[8], 4);
    assert_eq!(descriptor[9], 0);
    // Two pixels per byte: 4 bytes a row, 4 rows
    assert_eq!(picture_bytes(&fields), 16);
    Ok(())
}

#[test]
fn colour_device_still_takes_gray_directly() -> TestResult {
    init_logger();
    let (bytes, _) = render_afp(&logo_document(), state(8, true), resources_with_logo())?;
    let fields = read_fields(&bytes)?;

    let descriptor = &fields_with_id(&fields, IMAGE_DATA_DESCRIPTOR)[0].payload;
    assert_eq!(descriptor[8], 8);
    assert_eq!(picture_bytes(&fields), 32);
    Ok(())
}

#[test]
fn unreadable_image_is_replaced_and_the_page_survives() -> TestResult {
    init_logger();
    let provider = InMemoryResourceProvider::new();
    provider.add("broken.png", b"not a png".to_vec())?;
    let source = document(&block(&format!("Broken {}", graphic("broken.png"))));

    let (bytes, stats) = render_afp(&source, state(8, false), Arc::new(provider))?;
    let fields = read_fields(&bytes)?;

    assert_eq!(stats.pages, 1);
    assert!(fields_with_id(&fields, IMAGE_DATA_DESCRIPTOR).is_empty());
    assert!(
        fields_with_id(&fields, NO_OPERATION)
            .iter()
            .any(|f| f.payload == b"image unavailable: broken.png")
    );
    assert_eq!(fields.last().map(|f| f.id), Some(fields::END_DOCUMENT));
    Ok(())
}

#[test]
fn pdf_output_draws_the_image_as_an_xobject() -> TestResult {
    init_logger();
    let pipeline = PipelineBuilder::new()
        .with_format(OutputFormat::Pdf)
        .with_resources(resources_with_logo())
        .build()?;
    let (bytes, _) = pipeline.render_str(&logo_document(), Vec::new())?;
    let doc = lopdf::Document::load_mem(&bytes)?;

    assert_eq!(common::pdf_assertions::images_drawn(&doc, 1), 1);
    Ok(())
}
