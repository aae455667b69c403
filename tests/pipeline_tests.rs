mod common;

use common::fixtures::*;
use common::{TestResult, init_logger, render_pdf};
use quire::{OutputFormat, PipelineBuilder, PipelineError, RenderConfig};

#[test]
fn render_file_writes_the_finished_document() -> TestResult {
    init_logger();
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("letter.fo");
    let output = dir.path().join("out").join("letter.pdf");
    std::fs::write(&input, document(&block("Dear reader")))?;

    let pipeline = PipelineBuilder::new().with_format(OutputFormat::Pdf).build()?;
    let stats = pipeline.render_file(&input, &output)?;

    assert_eq!(stats.pages, 1);
    let bytes = std::fs::read(&output)?;
    let doc = lopdf::Document::load_mem(&bytes)?;
    let shown = common::pdf_assertions::shown_strings(&doc, 1);
    assert!(shown.iter().any(|s| s.contains("Dear reader")), "{:?}", shown);
    // Nothing but the output is left behind.
    assert_eq!(std::fs::read_dir(output.parent().unwrap())?.count(), 1);
    Ok(())
}

#[test]
fn render_file_reports_a_missing_input() -> TestResult {
    let dir = tempfile::tempdir()?;
    let pipeline = PipelineBuilder::new().build()?;

    let result = pipeline.render_file(dir.path().join("absent.fo"), dir.path().join("x.pdf"));

    match result {
        Err(PipelineError::Io(e)) => assert!(e.to_string().contains("absent.fo")),
        other => panic!("expected an I/O error, got {:?}", other.map(|s| s.pages)),
    }
    assert!(!dir.path().join("x.pdf").exists());
    Ok(())
}

#[test]
fn configuration_is_read_from_toml() -> TestResult {
    let config = RenderConfig::from_toml(
        r#"
        [output]
        format = "afp"

        [afp]
        bits_per_pixel = 4
        color_images = false
        resolution = 600

        [document]
        title = "Statement"
        "#,
    )?;

    assert_eq!(config.output.format, OutputFormat::Afp);
    let state = config.painting_state();
    assert_eq!(state.bits_per_pixel, 4);
    assert_eq!(state.resolution, 600);
    assert_eq!(config.document.title.as_deref(), Some("Statement"));
    Ok(())
}

#[test]
fn configuration_is_loaded_from_a_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("quire.toml");
    std::fs::write(&path, "[layout]\nline_height = 1.5\n")?;

    let config = RenderConfig::load(Some(&path))?;

    assert_eq!(config.layout.line_height, Some(1.5));
    Ok(())
}

#[test]
fn out_of_range_settings_are_rejected() {
    let result = RenderConfig::from_toml("[afp]\nbits_per_pixel = 12\n");
    assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
}

#[test]
fn long_flows_paginate_in_order() -> TestResult {
    init_logger();
    let flow: String = (1..=200).map(|i| block(&format!("Line {}", i))).collect();

    let pdf = render_pdf(&document(&flow))?;

    assert!(pdf.page_count() > 1);
    assert_pdf_page_count!(pdf, pdf.stats.pages);
    let mut seen = Vec::new();
    for page in 1..=pdf.page_count() as u32 {
        seen.extend(pdf.page_text(page));
    }
    let expected: Vec<String> = (1..=200).map(|i| format!("Line {}", i)).collect();
    assert_eq!(seen, expected);
    Ok(())
}
