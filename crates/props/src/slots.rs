//! Per-family slot mappings and the per-node slot tables built from them.
//!
//! A [`PropertySlotMap`] translates a global [`PropertyId`] into the dense slot
//! index used by every node of one family. Each family's map is built at most
//! once per process and handed out as a `&'static` reference afterwards.

use crate::family::PropertyFamily;
use crate::property::{PROPERTY_COUNT, PropertyId};
use crate::value::PropertyValue;
use log::debug;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Marks a property the family does not carry.
pub const NOT_APPLICABLE: u16 = u16::MAX;

#[derive(Debug)]
pub struct PropertySlotMap {
    family: PropertyFamily,
    slot_of: [u16; PROPERTY_COUNT],
    applicable: Box<[PropertyId]>,
}

impl PropertySlotMap {
    fn build(family: PropertyFamily) -> Self {
        let applicable: Box<[PropertyId]> = family.applicable().iter().collect();
        let mut slot_of = [NOT_APPLICABLE; PROPERTY_COUNT];
        for (slot, id) in applicable.iter().enumerate() {
            slot_of[id.index()] = slot as u16;
        }
        Self {
            family,
            slot_of,
            applicable,
        }
    }

    pub fn family(&self) -> PropertyFamily {
        self.family
    }

    /// Number of slots in every table built from this map.
    pub fn num_props(&self) -> usize {
        self.applicable.len()
    }

    pub fn slot(&self, id: PropertyId) -> Option<usize> {
        match self.slot_of[id.index()] {
            NOT_APPLICABLE => None,
            slot => Some(slot as usize),
        }
    }

    pub fn is_applicable(&self, id: PropertyId) -> bool {
        self.slot(id).is_some()
    }

    /// Applicable properties, in slot order.
    pub fn applicable(&self) -> &[PropertyId] {
        &self.applicable
    }

    /// The raw mapping array, one entry per known property.
    pub fn raw(&self) -> &[u16; PROPERTY_COUNT] {
        &self.slot_of
    }
}

static SLOT_MAPS: [OnceLock<PropertySlotMap>; PropertyFamily::COUNT] =
    [const { OnceLock::new() }; PropertyFamily::COUNT];

static BUILDS: [AtomicUsize; PropertyFamily::COUNT] =
    [const { AtomicUsize::new(0) }; PropertyFamily::COUNT];

/// The shared slot map of `family`, building it on first use.
pub fn slot_map(family: PropertyFamily) -> &'static PropertySlotMap {
    SLOT_MAPS[family.index()].get_or_init(|| {
        BUILDS[family.index()].fetch_add(1, Ordering::Relaxed);
        let map = PropertySlotMap::build(family);
        debug!(
            "[PROPS] Built slot map for {:?}: {} applicable properties",
            family,
            map.num_props()
        );
        map
    })
}

/// How many times the map for `family` has been built in this process.
pub fn build_count(family: PropertyFamily) -> usize {
    BUILDS[family.index()].load(Ordering::Relaxed)
}

/// Builds every family's map up front.
pub fn init_slot_maps() {
    for family in PropertyFamily::ALL {
        slot_map(family);
    }
}

/// The resolved property values of one node, one per applicable property.
#[derive(Debug, Clone)]
pub struct PropertySlots {
    map: &'static PropertySlotMap,
    values: Box<[PropertyValue]>,
}

impl PropertySlots {
    pub(crate) fn new(map: &'static PropertySlotMap, values: Box<[PropertyValue]>) -> Self {
        debug_assert_eq!(values.len(), map.num_props());
        Self { map, values }
    }

    pub fn map(&self) -> &'static PropertySlotMap {
        self.map
    }

    /// The value of `id`, or `None` when the node's family does not carry it.
    pub fn get(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.map.slot(id).map(|slot| &self.values[slot])
    }

    pub fn length(&self, id: PropertyId) -> Option<f32> {
        self.get(id).and_then(PropertyValue::as_length)
    }

    pub fn keyword(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).and_then(PropertyValue::as_keyword)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyValue)> {
        self.map.applicable().iter().copied().zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::PropertySet;

    #[test]
    fn maps_are_built_once_and_shared() {
        init_slot_maps();
        for family in PropertyFamily::ALL {
            let a = slot_map(family);
            let b = slot_map(family);
            assert!(std::ptr::eq(a, b));
            assert_eq!(build_count(family), 1);
        }
    }

    #[test]
    fn num_props_matches_applicable_cardinality() {
        for family in PropertyFamily::ALL {
            let map = slot_map(family);
            assert_eq!(map.num_props(), family.applicable().cardinality());
            let populated = map.raw().iter().filter(|s| **s != NOT_APPLICABLE).count();
            assert_eq!(populated, map.num_props());
        }
    }

    #[test]
    fn slots_are_dense_and_ascending() {
        let map = slot_map(PropertyFamily::Block);
        let ids: PropertySet = {
            let mut s = PropertySet::new();
            for id in map.applicable() {
                s.insert(*id);
            }
            s
        };
        for (slot, id) in ids.iter().enumerate() {
            assert_eq!(map.slot(id), Some(slot));
        }
        assert_eq!(map.slot(PropertyId::Extent), None);
    }
}
