//! Formatting-object tree construction.
//!
//! [`TreeBuilder`] pulls [`MarkupEvent`]s from an [`EventSource`], checks
//! each element against its content model and the structural flags in scope,
//! resolves its property slot table and records identifiers in the
//! per-document [`IdRegistry`](quire_types::IdRegistry).

pub mod builder;
pub mod error;
pub mod event;
pub mod kind;
pub mod node;
pub mod region;

pub use builder::{TreeBuilder, build_document};
pub use error::{Location, StructuralError, TreeError};
pub use event::{EventList, EventSource, MarkupEvent};
pub use kind::{ChildSet, ContentModel, NodeKind, Occurs, Particle, StructuralFlags};
pub use node::{Child, Document, Node, NodeId};
pub use region::{ReferenceDims, default_region_name, viewport_rect};
