//! AFP-style output.
//!
//! Pages are written as a flat stream of structured fields (see [`fields`]).
//! Raster images go through [`AfpImageHandler`], which fits them to the
//! device bit depth and colour support in the painting state.

pub mod fields;
mod image;
mod renderer;

pub use image::AfpImageHandler;
pub use renderer::{AfpRenderer, image_descriptor};
