//! Geometric transforms
//!
//! Order of operations is fixed: scale, then flip and rotate about the surface
//! center, then an optional crop in the resulting canvas space.

mod geometry;
pub mod orientation;
mod render;

pub use geometry::{compute_geometry, Geometry};
pub use orientation::ImageOrientation;
pub use render::{crop_surface, render};
