//! Builds the formatting-object tree from a stream of markup events.
//!
//! Construction is recursive and strictly sequential: a node's children are
//! complete before the node is attached to its parent, so a failure deep in a
//! subtree never leaves a partially built child hanging off the tree.

use crate::error::{Location, StructuralError, TreeError};
use crate::event::{EventSource, MarkupEvent};
use crate::kind::{ContentModel, NodeKind, Particle, StructuralFlags};
use crate::node::{Child, Document, Node, NodeId};
use log::{trace, warn};
use quire_props::{InheritedProperties, PropertyId, resolve_properties};
use quire_types::{IdName, IdRegistry, ResourceUri};

pub struct TreeBuilder<'r, S> {
    source: S,
    registry: &'r mut IdRegistry,
    document: Document,
    peeked: Option<MarkupEvent>,
}

impl<'r, S: EventSource> TreeBuilder<'r, S> {
    pub fn new(source: S, registry: &'r mut IdRegistry) -> Self {
        Self {
            source,
            registry,
            document: Document::new(),
            peeked: None,
        }
    }

    /// The tree as built so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consumes the whole event stream and returns the finished tree.
    pub fn build(mut self) -> Result<Document, TreeError> {
        self.skip_whitespace()?;
        let root = match self.next()? {
            MarkupEvent::Start {
                tag,
                attributes,
                location,
            } => match NodeKind::from_tag(&tag) {
                Some(NodeKind::Root) => self.build_element(
                    NodeKind::Root,
                    None,
                    attributes,
                    location,
                    StructuralFlags::empty(),
                    &InheritedProperties::default(),
                )?,
                Some(_) => {
                    return Err(StructuralError::MissingRequiredChild {
                        element: "document",
                        expected: NodeKind::Root.tag().to_string(),
                        model: "(root)".to_string(),
                        location,
                    }
                    .into());
                }
                None => return Err(StructuralError::UnknownElement { tag, location }.into()),
            },
            MarkupEvent::EndOfStream => {
                return Err(StructuralError::UnexpectedEndOfInput {
                    element: "document",
                    model: "(root)".to_string(),
                    location: Location::default(),
                }
                .into());
            }
            other => {
                return Err(StructuralError::UnexpectedChild {
                    element: "document",
                    found: describe(&other),
                    model: "(root)".to_string(),
                    location: other.location(),
                }
                .into());
            }
        };
        self.document.set_root(root);

        self.skip_whitespace()?;
        match self.next()? {
            MarkupEvent::EndOfStream => Ok(self.document),
            other => Err(StructuralError::UnexpectedChild {
                element: "root",
                found: describe(&other),
                model: NodeKind::Root.content_model().to_string(),
                location: other.location(),
            }
            .into()),
        }
    }

    /// Builds one node of `kind` from its start event, consuming events up to
    /// and including the matching end event. The node is attached to
    /// `parent` only once it and all its descendants are complete.
    pub fn build_node(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        event: MarkupEvent,
        inherited_flags: StructuralFlags,
        inherited: &InheritedProperties,
    ) -> Result<NodeId, TreeError> {
        match event {
            MarkupEvent::Start {
                attributes,
                location,
                ..
            } => self.build_element(kind, parent, attributes, location, inherited_flags, inherited),
            other => Err(TreeError::Source(format!(
                "expected a start event for fo:{}, got {}",
                kind.tag(),
                describe(&other)
            ))),
        }
    }

    fn build_element(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        attributes: Vec<(String, String)>,
        location: Location,
        inherited_flags: StructuralFlags,
        inherited: &InheritedProperties,
    ) -> Result<NodeId, TreeError> {
        let clash = kind.forbidden_flags() & inherited_flags;
        if !clash.is_empty() {
            return Err(StructuralError::ForbiddenAncestor {
                element: kind.tag(),
                ancestor: clash.introduced_by(),
                location,
            }
            .into());
        }
        if kind == NodeKind::Footnote && inherited_flags.contains(StructuralFlags::IN_ABSOLUTE) {
            warn!(
                "[TREE] fo:footnote inside an absolutely positioned block-container at {}; its body is placed as normal blocks",
                location
            );
        }

        let mut id = None;
        let mut ref_id = None;
        let mut src = None;
        let mut specified = Vec::with_capacity(attributes.len());
        for (name, value) in attributes {
            match name.as_str() {
                "id" => id = Some(IdName::from(value)),
                "ref-id" => ref_id = Some(IdName::from(value)),
                "src" => src = Some(ResourceUri::from(value)),
                _ => specified.push((name, value)),
            }
        }
        for &required in kind.required_attributes() {
            let present = match required {
                "ref-id" => ref_id.is_some(),
                "src" => src.is_some(),
                other => specified.iter().any(|(n, _)| n == other),
            };
            if !present {
                return Err(StructuralError::MissingAttribute {
                    element: kind.tag(),
                    attribute: required,
                    location,
                }
                .into());
            }
        }

        let resolution = resolve_properties(kind.family(), &specified, inherited).map_err(|e| {
            StructuralError::InvalidProperty {
                element: kind.tag(),
                message: e.to_string(),
                location,
            }
        })?;

        let mut flags = inherited_flags;
        match kind {
            NodeKind::Footnote => flags |= StructuralFlags::IN_FOOTNOTE,
            NodeKind::BlockContainer => {
                if matches!(
                    resolution.slots.keyword(PropertyId::AbsolutePosition),
                    Some("absolute" | "fixed")
                ) {
                    flags |= StructuralFlags::IN_ABSOLUTE;
                }
            }
            _ => {}
        }

        let node_id = self.document.push(Node {
            kind,
            parent,
            children: Vec::new(),
            flags,
            properties: resolution.slots,
            id: id.clone(),
            ref_id: ref_id.clone(),
            src,
            location,
        });
        if let Some(name) = id {
            self.registry.define(name, node_id)?;
        }
        if let Some(name) = ref_id {
            self.registry.declare(name);
        }

        match kind.content_model() {
            ContentModel::Empty => self.expect_end(kind, location)?,
            ContentModel::Sequence(particles) => {
                self.build_sequence(kind, node_id, particles, location, flags, &resolution.inherited)?
            }
            model @ ContentModel::Mixed { .. } => {
                self.build_mixed(kind, node_id, model, location, flags, &resolution.inherited)?
            }
        }

        trace!(
            "[TREE] Built {} {} with {} property slots",
            kind,
            node_id,
            self.document.get(node_id).map_or(0, |n| n.properties.len())
        );
        if let Some(p) = parent {
            self.attach(p, Child::Node(node_id));
        }
        Ok(node_id)
    }

    fn build_sequence(
        &mut self,
        kind: NodeKind,
        node_id: NodeId,
        particles: &'static [Particle],
        start: Location,
        flags: StructuralFlags,
        inherited: &InheritedProperties,
    ) -> Result<(), TreeError> {
        for particle in particles {
            let mut count = 0usize;
            loop {
                self.skip_whitespace()?;
                let child = match self.peek()? {
                    MarkupEvent::Start { tag, location, .. } => match NodeKind::from_tag(tag) {
                        Some(k) => Some(k),
                        None => {
                            return Err(StructuralError::UnknownElement {
                                tag: tag.clone(),
                                location: *location,
                            }
                            .into());
                        }
                    },
                    MarkupEvent::EndOfStream => {
                        return Err(StructuralError::UnexpectedEndOfInput {
                            element: kind.tag(),
                            model: kind.content_model().to_string(),
                            location: start,
                        }
                        .into());
                    }
                    _ => None,
                };
                match child {
                    Some(child_kind) if particle.of.matches(child_kind) => {
                        let event = self.next()?;
                        self.build_node(child_kind, Some(node_id), event, flags, inherited)?;
                        count += 1;
                        if !particle.occurs.is_repeatable() {
                            break;
                        }
                    }
                    _ => break,
                }
            }
            if count == 0 && particle.occurs.is_required() {
                let location = self.peek()?.location();
                return Err(StructuralError::MissingRequiredChild {
                    element: kind.tag(),
                    expected: particle.of.to_string(),
                    model: kind.content_model().to_string(),
                    location,
                }
                .into());
            }
        }
        self.expect_end(kind, start)
    }

    fn build_mixed(
        &mut self,
        kind: NodeKind,
        node_id: NodeId,
        model: ContentModel,
        start: Location,
        flags: StructuralFlags,
        inherited: &InheritedProperties,
    ) -> Result<(), TreeError> {
        loop {
            match self.next()? {
                MarkupEvent::Text { text, .. } => self.attach(node_id, Child::Text(text.into())),
                MarkupEvent::Start {
                    tag,
                    attributes,
                    location,
                } => {
                    let Some(child_kind) = NodeKind::from_tag(&tag) else {
                        return Err(StructuralError::UnknownElement { tag, location }.into());
                    };
                    if !model.admits_in_mixed(child_kind) {
                        return Err(StructuralError::UnexpectedChild {
                            element: kind.tag(),
                            found: tag,
                            model: model.to_string(),
                            location,
                        }
                        .into());
                    }
                    self.build_element(
                        child_kind,
                        Some(node_id),
                        attributes,
                        location,
                        flags,
                        inherited,
                    )?;
                }
                MarkupEvent::End { tag, location } => {
                    return if NodeKind::from_tag(&tag) == Some(kind) {
                        Ok(())
                    } else {
                        Err(StructuralError::MismatchedEnd {
                            element: kind.tag(),
                            found: tag,
                            location,
                        }
                        .into())
                    };
                }
                MarkupEvent::EndOfStream => {
                    return Err(StructuralError::UnexpectedEndOfInput {
                        element: kind.tag(),
                        model: model.to_string(),
                        location: start,
                    }
                    .into());
                }
            }
        }
    }

    fn expect_end(&mut self, kind: NodeKind, start: Location) -> Result<(), TreeError> {
        self.skip_whitespace()?;
        let model = kind.content_model().to_string();
        match self.next()? {
            MarkupEvent::End { tag, location } => {
                if NodeKind::from_tag(&tag) == Some(kind) {
                    Ok(())
                } else {
                    Err(StructuralError::MismatchedEnd {
                        element: kind.tag(),
                        found: tag,
                        location,
                    }
                    .into())
                }
            }
            MarkupEvent::Start { tag, location, .. } => Err(StructuralError::UnexpectedChild {
                element: kind.tag(),
                found: tag,
                model,
                location,
            }
            .into()),
            MarkupEvent::Text { location, .. } => Err(StructuralError::UnexpectedText {
                element: kind.tag(),
                model,
                location,
            }
            .into()),
            MarkupEvent::EndOfStream => Err(StructuralError::UnexpectedEndOfInput {
                element: kind.tag(),
                model,
                location: start,
            }
            .into()),
        }
    }

    fn attach(&mut self, parent: NodeId, child: Child) {
        if let Some(node) = self.document.get_mut(parent) {
            node.children.push(child);
        }
    }

    fn peek(&mut self) -> Result<&MarkupEvent, TreeError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.source.next_event()?);
        }
        Ok(self.peeked.get_or_insert(MarkupEvent::EndOfStream))
    }

    fn next(&mut self) -> Result<MarkupEvent, TreeError> {
        match self.peeked.take() {
            Some(event) => Ok(event),
            None => self.source.next_event(),
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), TreeError> {
        while self.peek()?.is_whitespace() {
            self.next()?;
        }
        Ok(())
    }
}

fn describe(event: &MarkupEvent) -> String {
    match event {
        MarkupEvent::Start { tag, .. } => format!("<{}>", tag),
        MarkupEvent::End { tag, .. } => format!("</{}>", tag),
        MarkupEvent::Text { .. } => "text".to_string(),
        MarkupEvent::EndOfStream => "end of input".to_string(),
    }
}

/// Builds the tree for one document, registering its identifiers in `registry`.
pub fn build_document(
    source: impl EventSource,
    registry: &mut IdRegistry,
) -> Result<Document, TreeError> {
    TreeBuilder::new(source, registry).build()
}
