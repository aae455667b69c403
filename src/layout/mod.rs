//! Page layout: turns the formatting-object tree into formatted pages.
//!
//! - [`FlowPaginator`]: flows each page sequence onto pages of its master
//! - [`PageSink`]: where finished pages (and resolved identifiers) go

mod lines;
mod paginator;

pub use paginator::{FlowPaginator, LayoutError, LayoutOptions, PageSink};
