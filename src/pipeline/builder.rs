use super::session::{RenderSession, RenderStats};
use crate::config::{OutputFormat, RenderConfig};
use crate::error::PipelineError;
use crate::layout::{FlowPaginator, LayoutOptions};
use crate::resource::{InMemoryResourceProvider, ResourceProvider};
use crate::source::XmlEventSource;
use log::info;
use quire_render_afp::AfpRenderer;
use quire_render_core::{DocumentInfo, DocumentRenderer, PaintingState};
use quire_render_lopdf::LopdfRenderer;
use quire_tree::build_document;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a [`Pipeline`].
pub struct PipelineBuilder {
    config: RenderConfig,
    resources: Option<Arc<dyn ResourceProvider>>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            config: RenderConfig::default(),
            resources: None,
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self { Default::default() }

    /// Replaces every setting with those of `config`.
    pub fn with_config(mut self, config: RenderConfig) -> Self { self.config = config; self }

    pub fn with_format(mut self, format: OutputFormat) -> Self { self.config.output.format = format; self }

    /// Sets the device bit depth, colour support and resolution used for images.
    pub fn with_painting_state(mut self, state: PaintingState) -> Self {
        self.config.afp.bits_per_pixel = state.bits_per_pixel;
        self.config.afp.color_images = state.color_images;
        self.config.afp.resolution = state.resolution;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self { self.config.document.title = Some(title.into()); self }

    /// Where `external-graphic` sources are loaded from. Defaults to an empty
    /// in-memory store, so every graphic renders as a placeholder.
    pub fn with_resources(mut self, resources: Arc<dyn ResourceProvider>) -> Self { self.resources = Some(resources); self }

    /// Fixes the line-height factor for every block.
    pub fn with_line_height(mut self, factor: f32) -> Self { self.config.layout.line_height = Some(factor); self }

    /// Validates the settings and creates the `Pipeline`.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        self.config.validate()?;
        let resources = self
            .resources
            .unwrap_or_else(|| Arc::new(InMemoryResourceProvider::new()));
        info!(
            "[PIPELINE] {} output, {} bpp, {} dpi, colour images {}",
            self.config.output.format,
            self.config.afp.bits_per_pixel,
            self.config.afp.resolution,
            if self.config.afp.color_images { "on" } else { "off" }
        );
        Ok(Pipeline {
            config: self.config,
            resources,
        })
    }
}

/// Formats documents with one fixed configuration. Every call gets its own
/// identifier registry, render queue and renderer, so a `Pipeline` can be
/// shared between threads.
pub struct Pipeline {
    config: RenderConfig,
    resources: Arc<dyn ResourceProvider>,
}

impl Pipeline {
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Formats the XML document in `source` into `writer` and hands the
    /// writer back with the run's statistics.
    pub fn render_str<W: Write + Send>(
        &self,
        source: &str,
        writer: W,
    ) -> Result<(W, RenderStats), PipelineError> {
        let state = self.config.painting_state();
        match self.config.output.format {
            OutputFormat::Afp => {
                let (renderer, stats) = self.run(source, AfpRenderer::new(writer, state))?;
                Ok((renderer.into_inner(), stats))
            }
            OutputFormat::Pdf => {
                let (renderer, stats) = self.run(source, LopdfRenderer::new(writer, state))?;
                Ok((renderer.into_inner(), stats))
            }
        }
    }

    /// Formats `input` into `output`. With the `tempfile` feature the output
    /// is written next to its destination and moved into place only once the
    /// document is complete.
    pub fn render_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<RenderStats, PipelineError> {
        let input = input.as_ref();
        let output = output.as_ref();
        let source = fs::read_to_string(input).map_err(|e| {
            PipelineError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read '{}': {}", input.display(), e),
            ))
        })?;
        let parent = output.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        #[cfg(feature = "tempfile")]
        let stats = {
            let temp = tempfile::NamedTempFile::new_in(parent.unwrap_or_else(|| Path::new(".")))?;
            let (writer, stats) = self.render_str(&source, io::BufWriter::new(temp))?;
            let temp = writer.into_inner().map_err(|e| PipelineError::Io(e.into_error()))?;
            temp.persist(output).map_err(|e| PipelineError::Io(e.error))?;
            stats
        };
        #[cfg(not(feature = "tempfile"))]
        let stats = {
            let file = fs::File::create(output)?;
            self.render_str(&source, io::BufWriter::new(file))?.1
        };

        info!(
            "[PIPELINE] Wrote {} ({} pages)",
            output.display(),
            stats.pages
        );
        Ok(stats)
    }

    fn run<R: DocumentRenderer>(
        &self,
        source: &str,
        renderer: R,
    ) -> Result<(R, RenderStats), PipelineError> {
        let info = DocumentInfo {
            title: self.config.document.title.clone(),
            ..Default::default()
        };
        let mut session = RenderSession::new(renderer, info);
        let document = build_document(XmlEventSource::new(source), session.registry_mut())?;

        session.start()?;
        let options = LayoutOptions {
            line_height: self.config.layout.line_height,
            ..Default::default()
        };
        FlowPaginator::new(options, self.resources.as_ref()).paginate(&document, &mut session)?;
        Ok(session.stop()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = concat!(
        r#"<fo:root xmlns:fo="http://www.w3.org/1999/XSL/Format">"#,
        r#"<fo:layout-master-set><fo:simple-page-master master-name="a4">"#,
        r#"<fo:region-body/></fo:simple-page-master></fo:layout-master-set>"#,
        r#"<fo:page-sequence master-reference="a4"><fo:flow>"#,
        r#"<fo:block>Hello</fo:block></fo:flow></fo:page-sequence></fo:root>"#
    );

    #[test]
    fn invalid_settings_fail_the_build() {
        let state = PaintingState {
            bits_per_pixel: 3,
            ..Default::default()
        };
        assert!(matches!(
            PipelineBuilder::new().with_painting_state(state).build(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn format_selects_the_renderer() {
        let _ = env_logger::builder().is_test(true).try_init();
        let afp = PipelineBuilder::new().with_format(OutputFormat::Afp).build().unwrap();
        let (bytes, stats) = afp.render_str(DOC, Vec::new()).unwrap();
        assert_eq!(stats.pages, 1);
        assert_eq!(bytes[0], 0x5A);

        let pdf = PipelineBuilder::new().build().unwrap();
        let (bytes, _) = pdf.render_str(DOC, Vec::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn tree_errors_surface_before_any_output() {
        let pipeline = PipelineBuilder::new().build().unwrap();
        let result = pipeline.render_str("<fo:root/>", Vec::new());
        assert!(matches!(result, Err(PipelineError::Tree(_))));
    }
}
