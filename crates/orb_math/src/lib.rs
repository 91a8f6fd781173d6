//! Orb Math - vectors, rays and colours for the orb renderer.
//!
//! Vectors come from `glam` and are re-exported whole; `Vec3` doubles as
//! position, direction and linear colour.

pub use glam::*;

mod bounds;
mod color;
mod interval;
mod ray;

pub use bounds::BoundingSphere;
pub use color::{clamp_color, encode_bgr, from_srgb, to_srgb, Color};
pub use interval::Interval;
pub use ray::Ray;
