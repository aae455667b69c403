//! Independent documents formatted side by side.
//!
//! With the `rayon-executor` feature documents are spread over rayon's global
//! pool; otherwise they run one after another. Either way each document has
//! its own session, so nothing but the [`Pipeline`] itself is shared.

use super::builder::Pipeline;
use super::session::RenderStats;
use crate::error::PipelineError;
use log::info;
#[cfg(feature = "rayon-executor")]
use rayon::prelude::*;

/// Output bytes and statistics of one document.
pub type BatchResult = Result<(Vec<u8>, RenderStats), PipelineError>;

impl Pipeline {
    /// Formats every source into memory. Results keep the order of `sources`,
    /// and one document failing does not stop the others.
    pub fn render_many<S: AsRef<str> + Sync>(&self, sources: &[S]) -> Vec<BatchResult> {
        info!(
            "[BATCH] Rendering {} documents on {} threads",
            sources.len(),
            parallelism()
        );

        #[cfg(feature = "rayon-executor")]
        let results: Vec<BatchResult> = sources
            .par_iter()
            .map(|source| self.render_str(source.as_ref(), Vec::new()))
            .collect();
        #[cfg(not(feature = "rayon-executor"))]
        let results: Vec<BatchResult> = sources
            .iter()
            .map(|source| self.render_str(source.as_ref(), Vec::new()))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "[BATCH] {} documents done, {} failed",
            results.len(),
            failed
        );
        results
    }
}

#[cfg(feature = "rayon-executor")]
fn parallelism() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "rayon-executor"))]
fn parallelism() -> usize {
    1
}
