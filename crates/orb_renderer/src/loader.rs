//! Turn scene descriptions into runtime scenes.
//!
//! Every texture is decoded here, before rendering starts, so a missing or
//! corrupt image fails the load instead of a render worker.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use orb_core::description::{CameraDescription, MaterialDescription, RenderDescription};
use orb_core::{SceneDescription, TextureCache};

use crate::{
    Camera, LightSource, Material, PathtraceOptions, PathtracingScene, RaytraceOptions, Scene,
    SceneError, SceneObject, Sphere,
};

/// Build the camera. The description's fov is in degrees.
pub fn build_camera(description: &CameraDescription) -> Camera {
    Camera::new(
        description.position,
        description.look_at,
        description.fov.to_radians(),
    )
    .with_up(description.up)
    .with_aperture(description.aperture)
}

fn build_material(
    description: &MaterialDescription,
    textures: &mut TextureCache,
) -> Result<Material, SceneError> {
    let mut material = Material::new(
        description.diffuse,
        description.specular,
        description.reflective,
    )
    .with_emissive(description.emissive);

    if let Some(texture) = &description.texture {
        let texture = textures.load(&texture.path, texture.gamma, texture.rotation_offset)?;
        material = material.with_texture(texture);
    }

    Ok(material)
}

/// Build the spheres of a description. Spheres naming the same material
/// share one `Material`.
pub fn build_objects(
    description: &SceneDescription,
    textures: &mut TextureCache,
) -> Result<Vec<Box<dyn SceneObject>>, SceneError> {
    let mut materials: HashMap<&str, Arc<Material>> = HashMap::new();
    for (name, material) in &description.materials {
        materials.insert(name.as_str(), Arc::new(build_material(material, textures)?));
    }

    description
        .spheres
        .iter()
        .map(|sphere| -> Result<Box<dyn SceneObject>, SceneError> {
            let material = materials
                .get(sphere.material.as_str())
                .ok_or_else(|| SceneError::UnknownMaterial(sphere.material.clone()))?;
            let sphere = Sphere::new(sphere.center, sphere.radius, Arc::clone(material))?;
            Ok(Box::new(sphere))
        })
        .collect()
}

/// Build a ray traced scene. Texture paths resolve against `base_dir`.
pub fn build_scene(description: &SceneDescription, base_dir: impl AsRef<Path>) -> Result<Scene, SceneError> {
    let mut textures = TextureCache::with_base_dir(base_dir.as_ref());
    let objects = build_objects(description, &mut textures)?;
    let lights = description
        .lights
        .iter()
        .map(|light| LightSource::new(light.position, light.colour).with_radius(light.radius))
        .collect();

    let settings = &description.settings;
    let scene = Scene::new(objects, lights, settings.acceleration)?
        .with_ambient_light(settings.ambient_light)
        .with_shadow_brightness(settings.shadow_brightness)
        .with_phong_k(settings.phong_k);

    log::debug!(
        "Built scene: {} objects, {} lights, {} textures, acceleration {}",
        scene.object_count(),
        scene.lights().len(),
        textures.len(),
        settings.acceleration
    );

    Ok(scene)
}

/// Build a path traced scene. Lights are ignored; only emissive materials
/// contribute light.
pub fn build_pathtracing_scene(
    description: &SceneDescription,
    base_dir: impl AsRef<Path>,
) -> Result<PathtracingScene, SceneError> {
    let mut textures = TextureCache::with_base_dir(base_dir.as_ref());
    let objects = build_objects(description, &mut textures)?;

    if !description.lights.is_empty() {
        log::warn!(
            "Path tracing ignores {} light source(s); use emissive materials",
            description.lights.len()
        );
    }

    let scene = PathtracingScene::new(objects, description.settings.acceleration)?;
    log::debug!(
        "Built path tracing scene: {} objects, {} textures",
        scene.object_count(),
        textures.len()
    );
    Ok(scene)
}

impl From<&RenderDescription> for RaytraceOptions {
    fn from(render: &RenderDescription) -> Self {
        Self {
            super_sampling: render.super_sampling,
            shadow_samples: render.shadow_samples,
            reflection_depth: render.reflection_depth,
            gauss_sigma: render.gauss_sigma,
            gamma: render.gamma,
            seed: render.seed,
        }
    }
}

impl From<&RenderDescription> for PathtraceOptions {
    fn from(render: &RenderDescription) -> Self {
        Self {
            samples: render.samples,
            recursion_depth: render.max_depth,
            gauss_sigma: render.gauss_sigma,
            gamma: render.gamma,
            seed: render.seed,
        }
    }
}
