//! The arena-backed formatting-object tree.
//!
//! Nodes own their children through index lists; the parent link is a plain
//! index into the same arena.

use crate::error::Location;
use crate::kind::{NodeKind, StructuralFlags};
use quire_props::{PropertyId, PropertySlots, PropertyValue};
use quire_types::{IdName, NodeRef, ResourceUri, WritingMode};
use std::sync::Arc;

pub type NodeId = NodeRef;

/// One entry in a node's ordered child list.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(NodeId),
    Text(Arc<str>),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<Child>,
    /// Inherited flags plus any this node introduces. Fixed at construction.
    pub flags: StructuralFlags,
    pub properties: PropertySlots,
    /// The identifier this node defines, if any.
    pub id: Option<IdName>,
    /// The identifier a citation refers to.
    pub ref_id: Option<IdName>,
    pub src: Option<ResourceUri>,
    pub location: Location,
}

impl Node {
    pub fn property(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.properties.get(id)
    }

    pub fn length(&self, id: PropertyId) -> Option<f32> {
        self.properties.length(id)
    }

    pub fn writing_mode(&self) -> WritingMode {
        self.properties
            .keyword(PropertyId::WritingMode)
            .and_then(|k| k.parse().ok())
            .unwrap_or_default()
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().filter_map(|c| match c {
            Child::Node(id) => Some(*id),
            Child::Text(_) => None,
        })
    }
}

#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeRef(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Nodes in the arena, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeRef(i as u32), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of `kind` in the subtree under `from` (inclusive), in document order.
    pub fn descendants_of_kind(&self, from: NodeId, kind: NodeKind) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            if node.kind == kind {
                out.push(id);
            }
            let children: Vec<NodeId> = node.child_nodes().collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.get(id) {
            for child in &node.children {
                match child {
                    Child::Text(t) => out.push_str(t),
                    Child::Node(c) => self.collect_text(*c, out),
                }
            }
        }
    }
}
