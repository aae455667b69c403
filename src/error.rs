use crate::layout::LayoutError;
use crate::resource::ResourceError;
use quire_render_core::RenderError;
use quire_tree::TreeError;
use thiserror::Error;

/// A comprehensive error type for the entire formatting pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Tree construction failed: {0}")]
    Tree(#[from] TreeError),

    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
