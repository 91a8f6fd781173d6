//! Orb Renderer - CPU ray tracing for sphere scenes.
//!
//! Two light transport strategies share one geometry pipeline:
//! - [`Scene`]: Whitted-style recursive ray tracing with Phong highlights,
//!   soft shadows and Fresnel-weighted mirror reflections
//! - [`PathtracingScene`]: a depth-limited Monte Carlo path tracer
//!
//! Objects live in a [`SceneObjectContainer`], either a plain list or a
//! bounding volume hierarchy of bounding spheres.

mod bvh;
mod camera;
mod container;
mod error;
mod hit;
mod light;
mod loader;
mod material;
mod pathtracing;
mod renderer;
mod sampling;
mod scene;
mod sphere;

pub use bvh::BoundingVolumeHierarchy;
pub use camera::Camera;
pub use container::{create_container, SceneObjectContainer, SceneObjectList};
pub use error::SceneError;
pub use hit::{HitPoint, SceneObject};
pub use light::LightSource;
pub use loader::{build_camera, build_objects, build_pathtracing_scene, build_scene};
pub use material::Material;
pub use pathtracing::PathtracingScene;
pub use renderer::{
    pixel_ndc, render, render_pathtraced, ImageBuffer, PathtraceOptions, Pathtracer,
    RaytraceOptions, Raytracer,
};
pub use scene::{fresnel, Scene, HIT_POINT_ADJUSTMENT};
pub use sphere::Sphere;

/// Re-export math and scene data types
pub use orb_core::{Acceleration, RenderMode, SceneDescription, Texture, TextureCache};
pub use orb_math::{Color, Ray, Vec2, Vec3};
