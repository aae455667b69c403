pub mod fixtures;
pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use quire::{OutputFormat, PaintingState, PipelineBuilder, PipelineError, RenderStats, ResourceProvider};
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
    pub stats: RenderStats,
}

impl GeneratedPdf {
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Strings shown on 1-based page `number`, in content order.
    pub fn page_text(&self, number: u32) -> Vec<String> {
        pdf_assertions::shown_strings(&self.doc, number)
    }

    /// Save PDF to a file for manual debugging
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Formats `source` as PDF with default settings.
pub fn render_pdf(source: &str) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    let pipeline = PipelineBuilder::new().with_format(OutputFormat::Pdf).build()?;
    let (bytes, stats) = pipeline.render_str(source, Vec::new())?;
    let doc = LopdfDocument::load_mem(&bytes)?;
    Ok(GeneratedPdf { bytes, doc, stats })
}

/// Formats `source` as AFP under `state`, loading graphics from `resources`.
pub fn render_afp(
    source: &str,
    state: PaintingState,
    resources: Arc<dyn ResourceProvider>,
) -> Result<(Vec<u8>, RenderStats), PipelineError> {
    PipelineBuilder::new()
        .with_format(OutputFormat::Afp)
        .with_painting_state(state)
        .with_resources(resources)
        .build()?
        .render_str(source, Vec::new())
}
