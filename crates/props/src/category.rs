use crate::property::{PROPERTY_COUNT, PropertyId};

/// A group of related properties. Families declare which categories apply to
/// them instead of listing properties one by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyCategory {
    Accessibility,
    Font,
    Color,
    Background,
    Border,
    Padding,
    Margin,
    TextBlock,
    AreaDimension,
    AbsolutePosition,
    KeepsAndBreaks,
    PageGeometry,
    RegionGeometry,
    WritingMode,
    Graphic,
}

const WORDS: usize = PROPERTY_COUNT.div_ceil(64);

/// A fixed-size bit set over the global property indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertySet {
    bits: [u64; WORDS],
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All properties belonging to `category`.
    pub fn of_category(category: PropertyCategory) -> Self {
        let mut set = Self::new();
        for id in PropertyId::ALL {
            if id.category() == category {
                set.insert(*id);
            }
        }
        set
    }

    /// The union over several categories.
    pub fn of_categories(categories: &[PropertyCategory]) -> Self {
        categories
            .iter()
            .fold(Self::new(), |acc, c| acc.union(&Self::of_category(*c)))
    }

    pub fn insert(&mut self, id: PropertyId) {
        let i = id.index();
        self.bits[i / 64] |= 1u64 << (i % 64);
    }

    pub fn contains(&self, id: PropertyId) -> bool {
        let i = id.index();
        self.bits[i / 64] & (1u64 << (i % 64)) != 0
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut bits = self.bits;
        for (w, o) in bits.iter_mut().zip(other.bits.iter()) {
            *w |= o;
        }
        Self { bits }
    }

    pub fn cardinality(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Members in ascending global index order.
    pub fn iter(&self) -> impl Iterator<Item = PropertyId> + '_ {
        PropertyId::ALL.iter().copied().filter(|id| self.contains(*id))
    }
}
