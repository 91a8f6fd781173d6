//! Scene description files.
//!
//! A description is plain data: camera, render settings, named materials,
//! spheres and lights. It is deserialized from JSON and handed to the
//! renderer, which turns it into runtime scene objects.

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::texture::DEFAULT_TEXTURE_GAMMA;

/// Errors that can occur while reading a scene description.
#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid scene description: {0}")]
    Invalid(String),
}

/// Acceleration structure used to store a scene's objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Acceleration {
    /// Plain list, every object tested for every ray
    #[default]
    None,
    /// Bounding volume hierarchy of bounding spheres
    Bvh,
    /// Uniform spatial grid (not implemented)
    Grid,
}

impl std::fmt::Display for Acceleration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Acceleration::None => "none",
            Acceleration::Bvh => "bvh",
            Acceleration::Grid => "grid",
        };
        f.write_str(name)
    }
}

/// Which light transport algorithm renders the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Whitted-style recursive ray tracing
    #[default]
    Raytrace,
    /// Monte Carlo path tracing
    Pathtrace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDescription {
    pub position: Vec3,
    pub look_at: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    /// Aperture radius; 0 disables depth of field
    #[serde(default)]
    pub aperture: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDescription {
    pub width: u32,
    pub height: u32,
    pub mode: RenderMode,
    /// Eye rays per pixel (ray tracing)
    pub super_sampling: u32,
    /// Shadow feelers per area light (ray tracing)
    pub shadow_samples: u32,
    /// Mirror reflection bounces (ray tracing)
    pub reflection_depth: u32,
    /// Anti-aliasing jitter, standard deviation in pixels
    pub gauss_sigma: f32,
    pub gamma: f32,
    /// Paths per pixel (path tracing)
    pub samples: u32,
    /// Maximum path length (path tracing)
    pub max_depth: u32,
    pub seed: u64,
}

impl Default for RenderDescription {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            mode: RenderMode::Raytrace,
            super_sampling: 1,
            shadow_samples: 1,
            reflection_depth: 2,
            gauss_sigma: 0.5,
            gamma: 2.2,
            samples: 1,
            max_depth: 4,
            seed: 0,
        }
    }
}

/// Scene-wide shading parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub acceleration: Acceleration,
    pub ambient_light: Vec3,
    pub shadow_brightness: f32,
    pub phong_k: i32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            acceleration: Acceleration::None,
            ambient_light: Vec3::ZERO,
            shadow_brightness: 0.1,
            phong_k: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureDescription {
    /// Image path, relative to the description file
    pub path: String,
    #[serde(default = "default_texture_gamma")]
    pub gamma: f32,
    /// Horizontal rotation in radians
    #[serde(default)]
    pub rotation_offset: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDescription {
    pub diffuse: Vec3,
    #[serde(default)]
    pub specular: Vec3,
    #[serde(default)]
    pub reflective: Vec3,
    #[serde(default)]
    pub emissive: Vec3,
    #[serde(default)]
    pub texture: Option<TextureDescription>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereDescription {
    pub center: Vec3,
    pub radius: f32,
    /// Key into [`SceneDescription::materials`]
    pub material: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightDescription {
    pub position: Vec3,
    #[serde(alias = "color")]
    pub colour: Vec3,
    /// 0 for a point light, otherwise the radius of a disk light
    #[serde(default)]
    pub radius: f32,
}

/// A complete scene as read from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    pub camera: CameraDescription,
    #[serde(default)]
    pub render: RenderDescription,
    #[serde(default)]
    pub settings: SceneSettings,
    #[serde(default)]
    pub materials: HashMap<String, MaterialDescription>,
    #[serde(default)]
    pub spheres: Vec<SphereDescription>,
    #[serde(default)]
    pub lights: Vec<LightDescription>,
}

impl SceneDescription {
    /// Parse and validate a description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DescriptionError> {
        let description: SceneDescription = serde_json::from_str(json)?;
        description.validate()?;
        Ok(description)
    }

    /// Read, parse and validate a description file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DescriptionError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let description = Self::from_json(&json)?;

        log::debug!(
            "Loaded scene description {}: {} materials, {} spheres, {} lights",
            path.display(),
            description.materials.len(),
            description.spheres.len(),
            description.lights.len()
        );

        Ok(description)
    }

    /// Check the values serde cannot check for us.
    pub fn validate(&self) -> Result<(), DescriptionError> {
        if self.render.width == 0 || self.render.height == 0 {
            return Err(DescriptionError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.render.width, self.render.height
            )));
        }
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(DescriptionError::Invalid(format!(
                "camera fov must be between 0 and 180 degrees, got {}",
                self.camera.fov
            )));
        }
        if self.camera.position == self.camera.look_at {
            return Err(DescriptionError::Invalid(
                "camera position and look_at must differ".to_string(),
            ));
        }
        if self.render.gamma <= 0.0 {
            return Err(DescriptionError::Invalid(format!(
                "gamma must be positive, got {}",
                self.render.gamma
            )));
        }
        Ok(())
    }
}

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_texture_gamma() -> f32 {
    DEFAULT_TEXTURE_GAMMA
}
