//! The per-document identifier registry.
//!
//! One registry exists per document being processed. The tree builder declares
//! and defines names as it meets them, the layout collaborator resolves a name
//! once the node that defines it has been placed on a page, and the render
//! queue consults the registry to decide whether a held-back page may proceed.
//!
//! Resolution is monotonic: a name goes from unresolved to resolved at most
//! once and never goes back.

use crate::ids::IdName;
use log::trace;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// An opaque reference to the tree node that defines an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub u32);

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raised when two different nodes claim the same identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryInconsistency {
    #[error("identifier '{name}' is defined by node {first} and again by node {second}")]
    ConflictingDefinition {
        name: IdName,
        first: NodeRef,
        second: NodeRef,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdState {
    Unresolved,
    /// Citable. `page` is the 1-based page the defining node landed on, when known.
    Resolved { page: Option<usize> },
}

#[derive(Debug, Clone)]
struct Entry {
    state: IdState,
    defined_by: Option<NodeRef>,
}

#[derive(Debug, Default)]
pub struct IdRegistry {
    entries: BTreeMap<IdName, Entry>,
    unresolved: usize,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `name` exists. Declaring a known name is a no-op.
    pub fn declare(&mut self, name: impl Into<IdName>) {
        self.entry(name.into());
    }

    /// Records that `node` defines `name`.
    ///
    /// Redefinition by the same node is harmless; a second, different node is
    /// an inconsistency and leaves the first definition in place.
    pub fn define(
        &mut self,
        name: impl Into<IdName>,
        node: NodeRef,
    ) -> Result<(), RegistryInconsistency> {
        let name = name.into();
        let entry = self.entry(name.clone());
        match entry.defined_by {
            Some(first) if first != node => Err(RegistryInconsistency::ConflictingDefinition {
                name,
                first,
                second: node,
            }),
            _ => {
                entry.defined_by = Some(node);
                Ok(())
            }
        }
    }

    /// Marks `name` as citable, declaring it first if it is unknown.
    pub fn resolve(&mut self, name: impl Into<IdName>) {
        self.mark_resolved(name.into(), None);
    }

    /// Like [`resolve`](Self::resolve), also recording the page number on which
    /// the defining node was placed. An already resolved name keeps its page.
    pub fn resolve_on_page(&mut self, name: impl Into<IdName>, page: usize) {
        self.mark_resolved(name.into(), Some(page));
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        matches!(
            self.entries.get(name).map(|e| e.state),
            Some(IdState::Resolved { .. })
        )
    }

    /// True iff no declared name is still unresolved.
    pub fn all_resolved(&self) -> bool {
        self.unresolved == 0
    }

    pub fn state(&self, name: &str) -> Option<IdState> {
        self.entries.get(name).map(|e| e.state)
    }

    pub fn page_of(&self, name: &str) -> Option<usize> {
        match self.state(name) {
            Some(IdState::Resolved { page }) => page,
            _ => None,
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|e| e.defined_by.is_some())
    }

    pub fn defined_by(&self, name: &str) -> Option<NodeRef> {
        self.entries.get(name).and_then(|e| e.defined_by)
    }

    /// Names still waiting for resolution, in name order.
    pub fn unresolved(&self) -> impl Iterator<Item = &IdName> {
        self.entries
            .iter()
            .filter(|(_, e)| e.state == IdState::Unresolved)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&mut self, name: IdName) -> &mut Entry {
        let unresolved = &mut self.unresolved;
        self.entries.entry(name).or_insert_with(|| {
            *unresolved += 1;
            Entry {
                state: IdState::Unresolved,
                defined_by: None,
            }
        })
    }

    fn mark_resolved(&mut self, name: IdName, page: Option<usize>) {
        let entry = self.entry(name.clone());
        if entry.state == IdState::Unresolved {
            entry.state = IdState::Resolved { page };
            self.unresolved -= 1;
            trace!("[REGISTRY] '{}' resolved (page {:?})", name, page);
        }
    }
}
