//! Document processing: one session per document, pages released in order.
//!
//! - [`RenderQueue`]: holds pages back until every name they cite resolves
//! - [`RenderSession`]: registry, queue and renderer for one document
//! - [`PipelineBuilder`] / [`Pipeline`]: configured end-to-end formatting
//!
//! # Example
//!
//! ```ignore
//! use quire::{OutputFormat, PipelineBuilder};
//!
//! let pipeline = PipelineBuilder::new()
//!     .with_format(OutputFormat::Afp)
//!     .with_title("Statement")
//!     .build()?;
//!
//! pipeline.render_file("statement.fo", "statement.afp")?;
//! ```

mod batch;
mod builder;
mod queue;
mod session;

pub use batch::BatchResult;
pub use builder::{Pipeline, PipelineBuilder};
pub use queue::{QueueStats, RenderQueue, Submission};
pub use session::{RenderSession, RenderStats};
