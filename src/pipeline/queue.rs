//! The order-preserving render queue.
//!
//! Pages arrive in document order. A page whose cross-references are all
//! resolved goes straight to the renderer when nothing is waiting ahead of
//! it; otherwise it waits in FIFO order until every name it was formatted
//! against has resolved. The front entry gates everything behind it.

use log::{debug, info, warn};
use quire_render_core::{DocumentRenderer, FormattedPage, RenderError};
use quire_types::{IdName, IdRegistry};
use std::collections::VecDeque;

/// How a submitted page was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Rendered before `submit` returned, without touching the queue.
    Direct,
    /// Held in the queue (and possibly released by the drain that followed).
    Queued,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub direct: usize,
    pub queued: usize,
    /// Pages released by a forced flush while still waiting on a name.
    pub flushed_unresolved: usize,
    pub max_depth: usize,
}

struct QueueEntry {
    page: FormattedPage,
    /// Names unresolved when the page was formatted; only ever shrinks.
    unresolved: Vec<IdName>,
}

impl QueueEntry {
    /// Drops every name that has resolved since the last check.
    fn is_resolved(&mut self, registry: &IdRegistry) -> bool {
        self.unresolved
            .retain(|name| !registry.is_resolved(name.as_str()));
        self.unresolved.is_empty()
    }
}

pub struct RenderQueue<R: DocumentRenderer> {
    renderer: R,
    entries: VecDeque<QueueEntry>,
    forwarded: usize,
    stats: QueueStats,
}

impl<R: DocumentRenderer> RenderQueue<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            entries: VecDeque::new(),
            forwarded: 0,
            stats: QueueStats::default(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Pages currently held back.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pages handed to the renderer so far.
    pub fn forwarded(&self) -> usize {
        self.forwarded
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    /// Accepts the next page in document order.
    pub fn submit(
        &mut self,
        page: FormattedPage,
        registry: &IdRegistry,
    ) -> Result<Submission, RenderError> {
        self.drain(registry)?;

        let unresolved: Vec<IdName> = page
            .unresolved_refs
            .iter()
            .filter(|name| !registry.is_resolved(name.as_str()))
            .cloned()
            .collect();

        if self.entries.is_empty() && unresolved.is_empty() {
            debug!("[QUEUE] Page {} forwarded directly", page.number);
            self.stats.direct += 1;
            self.forward(page, registry)?;
            return Ok(Submission::Direct);
        }

        debug!(
            "[QUEUE] Page {} held back (waiting on {:?}, {} ahead)",
            page.number,
            unresolved,
            self.entries.len()
        );
        self.stats.queued += 1;
        self.entries.push_back(QueueEntry { page, unresolved });
        self.stats.max_depth = self.stats.max_depth.max(self.entries.len());
        self.drain(registry)?;
        Ok(Submission::Queued)
    }

    /// Forwards entries from the front for as long as the front entry has no
    /// unresolved names left. Returns the number of pages released.
    pub fn drain(&mut self, registry: &IdRegistry) -> Result<usize, RenderError> {
        let mut released = 0;
        while let Some(front) = self.entries.front_mut() {
            if !front.is_resolved(registry) {
                break;
            }
            let Some(entry) = self.entries.pop_front() else {
                break;
            };
            debug!("[QUEUE] Page {} released", entry.page.number);
            self.forward(entry.page, registry)?;
            released += 1;
        }
        Ok(released)
    }

    /// Forwards everything still queued, in order, whether resolved or not.
    /// Safe to call on an empty queue.
    pub fn flush(&mut self, registry: &IdRegistry) -> Result<usize, RenderError> {
        if self.entries.is_empty() {
            return Ok(0);
        }
        let mut still_waiting = 0;
        let count = self.entries.len();
        while let Some(mut entry) = self.entries.pop_front() {
            if !entry.is_resolved(registry) {
                still_waiting += 1;
                warn!(
                    "[QUEUE] Page {} rendered with unresolved references: {}",
                    entry.page.number,
                    entry
                        .unresolved
                        .iter()
                        .map(IdName::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            self.forward(entry.page, registry)?;
        }
        self.stats.flushed_unresolved += still_waiting;
        info!(
            "[QUEUE] Flushed {} pages ({} with unresolved references)",
            count, still_waiting
        );
        Ok(count)
    }

    fn forward(&mut self, mut page: FormattedPage, registry: &IdRegistry) -> Result<(), RenderError> {
        page.resolve_citations(registry);
        self.renderer.render_page(&page)?;
        self.forwarded += 1;
        Ok(())
    }
}
