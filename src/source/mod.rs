//! Markup event sources.

mod xml;

pub use xml::XmlEventSource;
