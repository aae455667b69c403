//! quire: a streaming formatting-object processor.
//!
//! An XML formatting-object document is read as markup events, built into a
//! checked tree, laid out page by page and written as AFP or PDF. Pages that
//! cite an identifier which has not been placed yet are held back by the
//! render queue until it resolves, so output always stays in document order.

pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod resource;
pub mod source;

pub use config::{OutputFormat, RenderConfig};
pub use error::PipelineError;
pub use layout::{FlowPaginator, LayoutError, LayoutOptions, PageSink};
pub use pipeline::{
    BatchResult, Pipeline, PipelineBuilder, QueueStats, RenderQueue, RenderSession, RenderStats,
    Submission,
};
pub use resource::{
    FilesystemResourceProvider, InMemoryResourceProvider, ResourceError, ResourceProvider,
};
pub use source::XmlEventSource;

pub use quire_render_core::{DocumentInfo, DocumentRenderer, FormattedPage, PaintingState};
pub use quire_types::{IdName, IdRegistry};
