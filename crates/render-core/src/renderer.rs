use crate::error::RenderError;
use crate::page::{DocumentInfo, FormattedPage};

/// One output format. Pages arrive in document order between a single
/// `start_document` and a single `finish_document`.
pub trait DocumentRenderer: Send {
    /// Short format name used in logs.
    fn name(&self) -> &'static str;

    fn start_document(&mut self, info: &DocumentInfo) -> Result<(), RenderError>;

    fn render_page(&mut self, page: &FormattedPage) -> Result<(), RenderError>;

    fn finish_document(&mut self) -> Result<(), RenderError>;
}

impl<R: DocumentRenderer + ?Sized> DocumentRenderer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn start_document(&mut self, info: &DocumentInfo) -> Result<(), RenderError> {
        (**self).start_document(info)
    }

    fn render_page(&mut self, page: &FormattedPage) -> Result<(), RenderError> {
        (**self).render_page(page)
    }

    fn finish_document(&mut self) -> Result<(), RenderError> {
        (**self).finish_document()
    }
}
