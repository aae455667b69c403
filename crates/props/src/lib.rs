//! Property resolution for formatting-object nodes.
//!
//! Every node family carries only the properties its categories make
//! applicable. Values live in a dense per-node table indexed by a per-family
//! slot, and the global-id → slot mapping is built once per family and shared.

pub mod category;
pub mod family;
pub mod parsers;
pub mod property;
pub mod resolve;
pub mod slots;
pub mod value;

pub use category::{PropertyCategory, PropertySet};
pub use family::PropertyFamily;
pub use parsers::PropertyParseError;
pub use property::{PROPERTY_COUNT, PropertyId, ValueKind};
pub use resolve::{InheritedProperties, Resolution, resolve_properties};
pub use slots::{
    NOT_APPLICABLE, PropertySlotMap, PropertySlots, build_count, init_slot_maps, slot_map,
};
pub use value::PropertyValue;
