//! The closed set of node kinds, their structural flags and content models.

use bitflags::bitflags;
use quire_props::PropertyFamily;
use std::fmt;

bitflags! {
    /// Context inherited from ancestors, used only for constraint checking.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StructuralFlags: u8 {
        /// Somewhere below a `footnote`.
        const IN_FOOTNOTE = 1 << 0;
        /// Somewhere below an absolutely positioned `block-container`.
        const IN_ABSOLUTE = 1 << 1;
    }
}

impl StructuralFlags {
    /// The element that introduces `self`, for error messages.
    pub fn introduced_by(self) -> &'static str {
        if self.contains(StructuralFlags::IN_FOOTNOTE) {
            "footnote"
        } else if self.contains(StructuralFlags::IN_ABSOLUTE) {
            "block-container"
        } else {
            "none"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    LayoutMasterSet,
    SimplePageMaster,
    RegionBody,
    RegionStart,
    RegionEnd,
    PageSequence,
    Flow,
    Block,
    BlockContainer,
    Inline,
    Footnote,
    FootnoteBody,
    PageNumberCitation,
    ExternalGraphic,
}

impl NodeKind {
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Root,
        NodeKind::LayoutMasterSet,
        NodeKind::SimplePageMaster,
        NodeKind::RegionBody,
        NodeKind::RegionStart,
        NodeKind::RegionEnd,
        NodeKind::PageSequence,
        NodeKind::Flow,
        NodeKind::Block,
        NodeKind::BlockContainer,
        NodeKind::Inline,
        NodeKind::Footnote,
        NodeKind::FootnoteBody,
        NodeKind::PageNumberCitation,
        NodeKind::ExternalGraphic,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::LayoutMasterSet => "layout-master-set",
            NodeKind::SimplePageMaster => "simple-page-master",
            NodeKind::RegionBody => "region-body",
            NodeKind::RegionStart => "region-start",
            NodeKind::RegionEnd => "region-end",
            NodeKind::PageSequence => "page-sequence",
            NodeKind::Flow => "flow",
            NodeKind::Block => "block",
            NodeKind::BlockContainer => "block-container",
            NodeKind::Inline => "inline",
            NodeKind::Footnote => "footnote",
            NodeKind::FootnoteBody => "footnote-body",
            NodeKind::PageNumberCitation => "page-number-citation",
            NodeKind::ExternalGraphic => "external-graphic",
        }
    }

    /// Looks up a kind by element name. An `fo:` prefix is accepted.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let local = tag.strip_prefix("fo:").unwrap_or(tag);
        Self::ALL.into_iter().find(|k| k.tag() == local)
    }

    pub fn family(self) -> PropertyFamily {
        match self {
            NodeKind::Root => PropertyFamily::Root,
            NodeKind::LayoutMasterSet | NodeKind::SimplePageMaster | NodeKind::PageSequence => {
                PropertyFamily::Pagination
            }
            NodeKind::RegionBody | NodeKind::RegionStart | NodeKind::RegionEnd => {
                PropertyFamily::Region
            }
            NodeKind::Flow => PropertyFamily::Flow,
            NodeKind::Block => PropertyFamily::Block,
            NodeKind::BlockContainer => PropertyFamily::BlockContainer,
            NodeKind::Inline => PropertyFamily::Inline,
            NodeKind::Footnote => PropertyFamily::Footnote,
            NodeKind::FootnoteBody => PropertyFamily::FootnoteBody,
            NodeKind::PageNumberCitation => PropertyFamily::Citation,
            NodeKind::ExternalGraphic => PropertyFamily::Graphic,
        }
    }

    pub fn is_block_level(self) -> bool {
        matches!(self, NodeKind::Block | NodeKind::BlockContainer)
    }

    pub fn is_inline_level(self) -> bool {
        matches!(
            self,
            NodeKind::Inline
                | NodeKind::Footnote
                | NodeKind::PageNumberCitation
                | NodeKind::ExternalGraphic
        )
    }

    /// Flags that must not already be in scope when this kind is built.
    pub fn forbidden_flags(self) -> StructuralFlags {
        match self {
            NodeKind::Footnote => StructuralFlags::IN_FOOTNOTE,
            _ => StructuralFlags::empty(),
        }
    }

    /// Attributes that must be present on the start event.
    pub fn required_attributes(self) -> &'static [&'static str] {
        match self {
            NodeKind::PageNumberCitation => &["ref-id"],
            NodeKind::ExternalGraphic => &["src"],
            NodeKind::SimplePageMaster => &["master-name"],
            NodeKind::PageSequence => &["master-reference"],
            _ => &[],
        }
    }

    pub fn content_model(self) -> ContentModel {
        match self {
            NodeKind::Root => ContentModel::Sequence(ROOT_MODEL),
            NodeKind::LayoutMasterSet => ContentModel::Sequence(MASTER_SET_MODEL),
            NodeKind::SimplePageMaster => ContentModel::Sequence(PAGE_MASTER_MODEL),
            NodeKind::RegionBody
            | NodeKind::RegionStart
            | NodeKind::RegionEnd
            | NodeKind::PageNumberCitation
            | NodeKind::ExternalGraphic => ContentModel::Empty,
            NodeKind::PageSequence => ContentModel::Sequence(PAGE_SEQUENCE_MODEL),
            NodeKind::Flow | NodeKind::BlockContainer => ContentModel::Sequence(BLOCKS_MODEL),
            NodeKind::Block => ContentModel::Mixed { blocks: true },
            NodeKind::Inline => ContentModel::Mixed { blocks: false },
            NodeKind::Footnote => ContentModel::Sequence(FOOTNOTE_MODEL),
            NodeKind::FootnoteBody => ContentModel::Sequence(FOOTNOTE_BODY_MODEL),
        }
    }
}

const ROOT_MODEL: &[Particle] = &[
    Particle::new(ChildSet::Kind(NodeKind::LayoutMasterSet), Occurs::One),
    Particle::new(ChildSet::Kind(NodeKind::PageSequence), Occurs::OneOrMore),
];
const MASTER_SET_MODEL: &[Particle] = &[Particle::new(
    ChildSet::Kind(NodeKind::SimplePageMaster),
    Occurs::OneOrMore,
)];
const PAGE_MASTER_MODEL: &[Particle] = &[
    Particle::new(ChildSet::Kind(NodeKind::RegionBody), Occurs::One),
    Particle::new(ChildSet::Kind(NodeKind::RegionStart), Occurs::Optional),
    Particle::new(ChildSet::Kind(NodeKind::RegionEnd), Occurs::Optional),
];
const PAGE_SEQUENCE_MODEL: &[Particle] =
    &[Particle::new(ChildSet::Kind(NodeKind::Flow), Occurs::One)];
const BLOCKS_MODEL: &[Particle] = &[Particle::new(ChildSet::BlockLevel, Occurs::ZeroOrMore)];
const FOOTNOTE_MODEL: &[Particle] = &[
    Particle::new(ChildSet::Kind(NodeKind::Inline), Occurs::One),
    Particle::new(ChildSet::Kind(NodeKind::FootnoteBody), Occurs::One),
];
const FOOTNOTE_BODY_MODEL: &[Particle] =
    &[Particle::new(ChildSet::BlockLevel, Occurs::OneOrMore)];

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fo:{}", self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    One,
    Optional,
    OneOrMore,
    ZeroOrMore,
}

impl Occurs {
    pub fn is_required(self) -> bool {
        matches!(self, Occurs::One | Occurs::OneOrMore)
    }

    pub fn is_repeatable(self) -> bool {
        matches!(self, Occurs::OneOrMore | Occurs::ZeroOrMore)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSet {
    Kind(NodeKind),
    BlockLevel,
    InlineLevel,
}

impl ChildSet {
    pub fn matches(self, kind: NodeKind) -> bool {
        match self {
            ChildSet::Kind(k) => k == kind,
            ChildSet::BlockLevel => kind.is_block_level(),
            ChildSet::InlineLevel => kind.is_inline_level(),
        }
    }
}

impl fmt::Display for ChildSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildSet::Kind(k) => f.write_str(k.tag()),
            ChildSet::BlockLevel => f.write_str("%block"),
            ChildSet::InlineLevel => f.write_str("%inline"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Particle {
    pub of: ChildSet,
    pub occurs: Occurs,
}

impl Particle {
    pub const fn new(of: ChildSet, occurs: Occurs) -> Self {
        Self { of, occurs }
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.occurs {
            Occurs::One => "",
            Occurs::Optional => "?",
            Occurs::OneOrMore => "+",
            Occurs::ZeroOrMore => "*",
        };
        write!(f, "{}{}", self.of, suffix)
    }
}

/// What an element may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    Empty,
    /// Children in this exact order. Whitespace-only text is discarded.
    Sequence(&'static [Particle]),
    /// Text interleaved with inline-level children, and block-level ones when
    /// `blocks` is set.
    Mixed { blocks: bool },
}

impl ContentModel {
    pub fn admits_in_mixed(self, kind: NodeKind) -> bool {
        match self {
            ContentModel::Mixed { blocks } => {
                kind.is_inline_level() || (blocks && kind.is_block_level())
            }
            _ => false,
        }
    }
}

impl fmt::Display for ContentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentModel::Empty => f.write_str("EMPTY"),
            ContentModel::Sequence(particles) => {
                f.write_str("(")?;
                for (i, p) in particles.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                f.write_str(")")
            }
            ContentModel::Mixed { blocks: true } => f.write_str("(#PCDATA | %inline | %block)*"),
            ContentModel::Mixed { blocks: false } => f.write_str("(#PCDATA | %inline)*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_with_and_without_prefix() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
            assert_eq!(NodeKind::from_tag(&format!("fo:{}", kind.tag())), Some(kind));
        }
        assert_eq!(NodeKind::from_tag("table"), None);
    }

    #[test]
    fn footnote_model_renders_readably() {
        assert_eq!(
            NodeKind::Footnote.content_model().to_string(),
            "(inline, footnote-body)"
        );
        assert_eq!(
            NodeKind::SimplePageMaster.content_model().to_string(),
            "(region-body, region-start?, region-end?)"
        );
    }

    #[test]
    fn footnote_forbids_itself() {
        assert!(
            NodeKind::Footnote
                .forbidden_flags()
                .intersects(StructuralFlags::IN_FOOTNOTE)
        );
        assert!(NodeKind::Inline.forbidden_flags().is_empty());
    }
}
