use super::queue::{QueueStats, RenderQueue, Submission};
use crate::layout::PageSink;
use log::info;
use quire_render_core::{DocumentInfo, DocumentRenderer, FormattedPage, RenderError};
use quire_types::IdRegistry;
use std::time::{Duration, Instant};

/// End-of-run figures for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub pages: usize,
    pub queue: QueueStats,
    pub elapsed: Duration,
}

impl RenderStats {
    pub fn average_ms_per_page(&self) -> f64 {
        if self.pages == 0 {
            0.0
        } else {
            self.elapsed.as_secs_f64() * 1000.0 / self.pages as f64
        }
    }
}

/// The per-document processing context: one identifier registry, one render
/// queue and the renderer behind it.
///
/// Nothing in a session is shared with other documents, so independent
/// sessions can run on different threads.
pub struct RenderSession<R: DocumentRenderer> {
    registry: IdRegistry,
    queue: RenderQueue<R>,
    info: DocumentInfo,
    started: Option<Instant>,
}

impl<R: DocumentRenderer> RenderSession<R> {
    pub fn new(renderer: R, info: DocumentInfo) -> Self {
        Self {
            registry: IdRegistry::new(),
            queue: RenderQueue::new(renderer),
            info,
            started: None,
        }
    }

    pub fn registry(&self) -> &IdRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut IdRegistry {
        &mut self.registry
    }

    pub fn queue(&self) -> &RenderQueue<R> {
        &self.queue
    }

    /// Writes the document header.
    pub fn start(&mut self) -> Result<(), RenderError> {
        if self.started.is_some() {
            return Err(RenderError::State("session already started".into()));
        }
        self.queue.renderer_mut().start_document(&self.info)?;
        self.started = Some(Instant::now());
        info!(
            "[SESSION] Rendering {:?} with the {} renderer",
            self.info.title.as_deref().unwrap_or("untitled"),
            self.queue.renderer().name()
        );
        Ok(())
    }

    pub fn queue_page(&mut self, page: FormattedPage) -> Result<Submission, RenderError> {
        if self.started.is_none() {
            return Err(RenderError::State(format!(
                "page {} submitted before the session started",
                page.number
            )));
        }
        self.queue.submit(page, &self.registry)
    }

    /// Releases whatever the registry now allows, without a new page.
    pub fn drain(&mut self) -> Result<usize, RenderError> {
        self.queue.drain(&self.registry)
    }

    /// Force-flushes the queue, writes the trailer and reports statistics.
    pub fn stop(mut self) -> Result<(R, RenderStats), RenderError> {
        let Some(started) = self.started else {
            return Err(RenderError::State("session stopped before it started".into()));
        };
        self.queue.flush(&self.registry)?;
        self.queue.renderer_mut().finish_document()?;

        let stats = RenderStats {
            pages: self.queue.forwarded(),
            queue: self.queue.stats(),
            elapsed: started.elapsed(),
        };
        info!(
            "[SESSION] {} pages rendered in {:.1} ms ({:.2} ms/page; {} direct, {} queued, max depth {})",
            stats.pages,
            stats.elapsed.as_secs_f64() * 1000.0,
            stats.average_ms_per_page(),
            stats.queue.direct,
            stats.queue.queued,
            stats.queue.max_depth
        );
        let unresolved: Vec<&str> = self.registry.unresolved().map(|n| n.as_str()).collect();
        if !unresolved.is_empty() {
            info!("[SESSION] Never resolved: {}", unresolved.join(", "));
        }
        Ok((self.queue.into_renderer(), stats))
    }
}

impl<R: DocumentRenderer> PageSink for RenderSession<R> {
    fn registry_mut(&mut self) -> &mut IdRegistry {
        &mut self.registry
    }

    fn emit(&mut self, page: FormattedPage) -> Result<(), RenderError> {
        self.queue_page(page).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_types::IdName;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl DocumentRenderer for Log {
        fn name(&self) -> &'static str {
            "log"
        }
        fn start_document(&mut self, _: &DocumentInfo) -> Result<(), RenderError> {
            self.0.push("start".into());
            Ok(())
        }
        fn render_page(&mut self, page: &FormattedPage) -> Result<(), RenderError> {
            self.0.push(format!("page {}", page.number));
            Ok(())
        }
        fn finish_document(&mut self) -> Result<(), RenderError> {
            self.0.push("finish".into());
            Ok(())
        }
    }

    #[test]
    fn pages_are_bracketed_by_header_and_trailer() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut session = RenderSession::new(Log::default(), DocumentInfo::default());
        session.start().unwrap();

        let mut first = FormattedPage::new(1, 10.0, 10.0);
        first.add_unresolved(IdName::new("later"));
        session.queue_page(first).unwrap();
        session.queue_page(FormattedPage::new(2, 10.0, 10.0)).unwrap();

        let (log, stats) = session.stop().unwrap();
        assert_eq!(log.0, ["start", "page 1", "page 2", "finish"]);
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.queue.flushed_unresolved, 1);
    }

    #[test]
    fn pages_before_start_are_rejected() {
        let mut session = RenderSession::new(Log::default(), DocumentInfo::default());
        assert!(matches!(
            session.queue_page(FormattedPage::new(1, 1.0, 1.0)),
            Err(RenderError::State(_))
        ));
    }
}
