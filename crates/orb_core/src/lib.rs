//! Orb Core - renderer-agnostic scene data.
//!
//! This crate provides:
//!
//! - **Textures**: decoded pixel grids sampled with spherical coordinates,
//!   plus a cache so shared image files are decoded once
//! - **Scene descriptions**: the JSON format read by the `orb` binary
//!
//! # Example
//!
//! ```ignore
//! use orb_core::description::SceneDescription;
//!
//! let description = SceneDescription::load("demos/cornell_box.json")?;
//! println!("{} spheres, {} lights",
//!     description.spheres.len(),
//!     description.lights.len());
//! ```

pub mod description;
pub mod texture;

// Re-export commonly used types
pub use description::{Acceleration, DescriptionError, RenderMode, SceneDescription};
pub use texture::{PixelSource, Texture, TextureCache, TextureError};
