//! Region viewport geometry.
//!
//! Side regions sit along the start or end edge of the page reference area.
//! Their viewport depends on `extent` and on whether the writing mode
//! progresses lines horizontally or vertically.

use crate::kind::NodeKind;
use crate::node::Node;
use quire_props::PropertyId;
use quire_types::{Rect, WritingMode};

/// Inline- and block-progression dimensions of the page reference area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceDims {
    pub ipd: f32,
    pub bpd: f32,
}

/// The viewport of a region relative to the page reference area, or `None`
/// for nodes that are not regions.
pub fn viewport_rect(
    kind: NodeKind,
    extent: f32,
    wm: WritingMode,
    dims: ReferenceDims,
) -> Option<Rect> {
    let rect = match (kind, wm.is_horizontal()) {
        (NodeKind::RegionBody, true) => Rect::new(0.0, 0.0, dims.ipd, dims.bpd),
        (NodeKind::RegionBody, false) => Rect::new(0.0, 0.0, dims.bpd, dims.ipd),
        (NodeKind::RegionStart, true) => Rect::new(0.0, 0.0, extent, dims.bpd),
        (NodeKind::RegionStart, false) => Rect::new(0.0, 0.0, dims.bpd, extent),
        (NodeKind::RegionEnd, true) => Rect::new(dims.ipd - extent, 0.0, extent, dims.bpd),
        (NodeKind::RegionEnd, false) => Rect::new(0.0, dims.ipd - extent, dims.bpd, extent),
        _ => return None,
    };
    Some(rect)
}

pub fn default_region_name(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::RegionBody => Some("xsl-region-body"),
        NodeKind::RegionStart => Some("xsl-region-start"),
        NodeKind::RegionEnd => Some("xsl-region-end"),
        _ => None,
    }
}

impl Node {
    /// `region-name`, falling back to the kind's default.
    pub fn region_name(&self) -> Option<&str> {
        let explicit = self
            .properties
            .get(PropertyId::RegionName)
            .and_then(|v| v.as_text())
            .filter(|s| !s.is_empty());
        explicit.or_else(|| default_region_name(self.kind))
    }

    pub fn viewport_rect(&self, dims: ReferenceDims) -> Option<Rect> {
        let extent = self.length(PropertyId::Extent).unwrap_or(0.0);
        viewport_rect(self.kind, extent, self.writing_mode(), dims)
    }
}
