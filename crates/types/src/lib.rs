pub mod color;
pub mod geometry;
pub mod ids;
pub mod registry;

pub use color::Color;
pub use geometry::{Rect, Size, WritingMode};
pub use ids::{IdName, ResourceUri};
pub use registry::{IdRegistry, IdState, NodeRef, RegistryInconsistency};
