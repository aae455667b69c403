use crate::category::{PropertyCategory, PropertySet};

/// A group of node kinds that share one applicable-property set and therefore
/// one slot mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyFamily {
    Root,
    Pagination,
    Region,
    Flow,
    Block,
    BlockContainer,
    Inline,
    Footnote,
    FootnoteBody,
    Citation,
    Graphic,
}

impl PropertyFamily {
    pub const ALL: [PropertyFamily; 11] = [
        PropertyFamily::Root,
        PropertyFamily::Pagination,
        PropertyFamily::Region,
        PropertyFamily::Flow,
        PropertyFamily::Block,
        PropertyFamily::BlockContainer,
        PropertyFamily::Inline,
        PropertyFamily::Footnote,
        PropertyFamily::FootnoteBody,
        PropertyFamily::Citation,
        PropertyFamily::Graphic,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    /// The categories whose properties apply to this family.
    pub fn categories(self) -> &'static [PropertyCategory] {
        use PropertyCategory::*;
        match self {
            PropertyFamily::Root => &[],
            PropertyFamily::Pagination => &[PageGeometry, Margin, WritingMode],
            PropertyFamily::Region => &[RegionGeometry, Border, Padding, Background, WritingMode],
            PropertyFamily::Flow => &[Accessibility],
            PropertyFamily::Block => &[
                Accessibility,
                Font,
                Color,
                Background,
                Border,
                Padding,
                Margin,
                TextBlock,
                KeepsAndBreaks,
            ],
            PropertyFamily::BlockContainer => &[
                Accessibility,
                AbsolutePosition,
                AreaDimension,
                Background,
                Border,
                Padding,
                Margin,
                KeepsAndBreaks,
                WritingMode,
            ],
            PropertyFamily::Inline => &[
                Accessibility,
                Font,
                Color,
                Background,
                Border,
                Padding,
                KeepsAndBreaks,
            ],
            // Only the accessibility properties apply to a footnote itself.
            PropertyFamily::Footnote => &[Accessibility],
            PropertyFamily::FootnoteBody => &[Accessibility],
            PropertyFamily::Citation => &[Accessibility, Font, Color, Background, Border, Padding],
            PropertyFamily::Graphic => &[
                Accessibility,
                Graphic,
                AreaDimension,
                Background,
                Border,
                Padding,
            ],
        }
    }

    pub fn applicable(self) -> PropertySet {
        PropertySet::of_categories(self.categories())
    }
}
