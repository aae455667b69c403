use crate::family::PropertyFamily;
use crate::parsers::{PropertyParseError, parse_value};
use crate::property::{PROPERTY_COUNT, PropertyId};
use crate::slots::{PropertySlots, slot_map};
use crate::value::PropertyValue;
use log::warn;

/// Inherited values in effect at a point in the tree, indexed by global id.
///
/// Carries inherited properties through nodes whose family does not carry
/// them, so a `font-size` set on a `flow` still reaches the blocks inside it.
#[derive(Debug, Clone)]
pub struct InheritedProperties {
    values: Vec<Option<PropertyValue>>,
}

impl Default for InheritedProperties {
    fn default() -> Self {
        Self {
            values: vec![None; PROPERTY_COUNT],
        }
    }
}

impl InheritedProperties {
    pub fn get(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.values[id.index()].as_ref()
    }

    fn set(&mut self, id: PropertyId, value: PropertyValue) {
        self.values[id.index()] = Some(value);
    }
}

#[derive(Debug)]
pub struct Resolution {
    pub slots: PropertySlots,
    /// The context to hand to this node's children.
    pub inherited: InheritedProperties,
    /// Attribute names that were neither known properties nor applicable here.
    pub ignored: Vec<String>,
}

/// Resolves the slot table of a node of `family`.
///
/// Each applicable property takes its specified value when present, otherwise
/// the parent's value if the property is inherited, otherwise its initial
/// value.
pub fn resolve_properties(
    family: PropertyFamily,
    specified: &[(String, String)],
    parent: &InheritedProperties,
) -> Result<Resolution, PropertyParseError> {
    let map = slot_map(family);
    let mut given: Vec<(PropertyId, PropertyValue)> = Vec::with_capacity(specified.len());
    let mut ignored = Vec::new();

    for (name, raw) in specified {
        match PropertyId::from_name(name) {
            Some(id) if map.is_applicable(id) || id.is_inherited() => {
                given.push((id, parse_value(id, raw)?));
            }
            _ => {
                warn!(
                    "[PROPS] Ignoring '{}' on {:?}: not an applicable property",
                    name, family
                );
                ignored.push(name.clone());
            }
        }
    }

    let lookup = |id: PropertyId| given.iter().rev().find(|(g, _)| *g == id).map(|(_, v)| v);

    let mut inherited = parent.clone();
    for (id, value) in &given {
        if id.is_inherited() {
            inherited.set(*id, value.clone());
        }
    }

    let values: Box<[PropertyValue]> = map
        .applicable()
        .iter()
        .map(|&id| {
            let value = match lookup(id) {
                Some(v) => v.clone(),
                None if id.is_inherited() => parent
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.initial_value()),
                None => id.initial_value(),
            };
            if id.is_inherited() {
                inherited.set(id, value.clone());
            }
            value
        })
        .collect();

    Ok(Resolution {
        slots: PropertySlots::new(map, values),
        inherited,
        ignored,
    })
}
