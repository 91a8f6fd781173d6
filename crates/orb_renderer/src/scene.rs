//! Whitted-style ray traced scene.
//!
//! Shading per hit: ambient + emission, then for every light a Lambertian
//! term scaled by how much of the light is visible, a Phong highlight on
//! fully lit surfaces, and finally a Fresnel-weighted mirror reflection.

use orb_core::Acceleration;
use orb_math::{Color, Interval, Ray, Vec3};
use rand::RngCore;

use crate::{create_container, HitPoint, LightSource, SceneError, SceneObject, SceneObjectContainer};

/// Distance secondary rays are pulled back from the surface they leave.
pub const HIT_POINT_ADJUSTMENT: f32 = 0.01;

/// Visibility at or above which a surface counts as fully lit and gets a
/// specular highlight.
const FULLY_LIT: f32 = 0.9;

/// Objects, lights and shading parameters for Whitted ray tracing.
pub struct Scene {
    objects: Box<dyn SceneObjectContainer>,
    lights: Vec<LightSource>,
    ambient_light: Color,
    shadow_brightness: f32,
    phong_k: i32,
}

impl Scene {
    /// Create a scene. The acceleration structure is fixed for the scene's
    /// lifetime; unimplemented structures are rejected here.
    pub fn new(
        objects: Vec<Box<dyn SceneObject>>,
        lights: Vec<LightSource>,
        acceleration: Acceleration,
    ) -> Result<Self, SceneError> {
        Ok(Self::from_container(create_container(acceleration, objects)?, lights))
    }

    pub fn from_container(objects: Box<dyn SceneObjectContainer>, lights: Vec<LightSource>) -> Self {
        Self {
            objects,
            lights,
            ambient_light: Color::ZERO,
            shadow_brightness: 0.1,
            phong_k: 40,
        }
    }

    /// Light added everywhere, also the background colour. Clamped to [0, 1].
    pub fn with_ambient_light(mut self, ambient_light: Color) -> Self {
        self.ambient_light = orb_math::clamp_color(ambient_light);
        self
    }

    /// Brightness of full shadow: 0 is black, 1 disables shadows. Clamped to [0, 1].
    pub fn with_shadow_brightness(mut self, shadow_brightness: f32) -> Self {
        self.shadow_brightness = Interval::UNIT.clamp(shadow_brightness);
        self
    }

    /// Exponent of the Phong highlight.
    pub fn with_phong_k(mut self, phong_k: i32) -> Self {
        self.phong_k = phong_k;
        self
    }

    pub fn ambient_light(&self) -> Color {
        self.ambient_light
    }

    pub fn shadow_brightness(&self) -> f32 {
        self.shadow_brightness
    }

    pub fn phong_k(&self) -> i32 {
        self.phong_k
    }

    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn add_object(&mut self, object: Box<dyn SceneObject>) {
        self.objects.add(object);
    }

    pub fn add_objects(&mut self, objects: Vec<Box<dyn SceneObject>>) {
        self.objects.add_range(objects);
    }

    pub fn add_light(&mut self, light: LightSource) {
        self.lights.push(light);
    }

    pub fn add_lights(&mut self, lights: impl IntoIterator<Item = LightSource>) {
        self.lights.extend(lights);
    }

    pub fn find_closest_hit(&self, ray: &Ray) -> Option<HitPoint<'_>> {
        self.objects.find_closest_hit(ray)
    }

    /// Colour seen along `ray`, in linear space and unclamped.
    ///
    /// `shadow_samples` feelers are cast towards every disk light (point
    /// lights always use one). Mirror reflections recurse `recursion_depth`
    /// more times.
    pub fn calculate_colour(
        &self,
        ray: &Ray,
        shadow_samples: u32,
        rng: &mut dyn RngCore,
        recursion_depth: u32,
    ) -> Color {
        let Some(hit) = self.find_closest_hit(ray) else {
            return self.ambient_light;
        };

        let mut colour = self.ambient_light + hit.material.emissive;

        for light in &self.lights {
            let visibility = self.illumination(&hit, ray, light, shadow_samples, rng);

            colour += diffuse(&hit, light) * visibility;
            if visibility >= FULLY_LIT {
                colour += specular(&hit, ray, light, self.phong_k);
            }
        }

        if recursion_depth > 0 && hit.material.is_reflective() {
            let origin = hit.adjusted_position(ray, HIT_POINT_ADJUSTMENT);
            let reflected = Ray::new(origin, reflect(ray.direction(), hit.normal));
            let reflection = self.calculate_colour(&reflected, shadow_samples, rng, recursion_depth - 1);
            colour += reflection * fresnel(hit.material.specular, hit.normal, ray.direction());
        }

        colour
    }

    /// Fraction of `light` visible from the hit point, in
    /// [shadow_brightness, 1].
    pub fn illumination(
        &self,
        hit: &HitPoint<'_>,
        ray: &Ray,
        light: &LightSource,
        shadow_samples: u32,
        rng: &mut dyn RngCore,
    ) -> f32 {
        let origin = hit.adjusted_position(ray, HIT_POINT_ADJUSTMENT);
        let samples = if light.is_point() { 1 } else { shadow_samples.max(1) };

        let unoccluded = (0..samples)
            .filter(|_| {
                let target = light.sample_point(origin, rng);
                let to_light = target - origin;
                let feeler = Ray::new(origin, to_light);
                !self
                    .find_closest_hit(&feeler)
                    .is_some_and(|h| h.lambda <= to_light.length())
            })
            .count();

        (unoccluded as f32 / samples as f32).max(self.shadow_brightness)
    }
}

/// Lambertian reflection of `light` at the hit point.
fn diffuse(hit: &HitPoint<'_>, light: &LightSource) -> Color {
    let to_light = (light.position - hit.position).normalize();
    let n_dot_l = hit.normal.dot(to_light).max(0.0);
    light.colour * hit.surface_colour() * n_dot_l
}

/// Phong highlight of `light` as seen along `ray`.
fn specular(hit: &HitPoint<'_>, ray: &Ray, light: &LightSource, phong_k: i32) -> Color {
    let to_light = (light.position - hit.position).normalize();
    let n_dot_l = hit.normal.dot(to_light);
    if n_dot_l <= 0.0 {
        return Color::ZERO;
    }

    let reflected = (2.0 * n_dot_l * hit.normal - to_light).normalize();
    let to_viewer = -ray.direction();
    light.colour * reflected.dot(to_viewer).max(0.0).powi(phong_k) * hit.material.specular
}

/// Mirror `direction` about `normal`.
#[inline]
fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Schlick's approximation of the Fresnel reflectance.
///
/// `F = specular + (1 - specular) * (1 - n·r)^5` where `r` is the mirror
/// direction of `direction`. At normal incidence this is `specular`.
pub fn fresnel(specular: Color, normal: Vec3, direction: Vec3) -> Color {
    let cos = Interval::UNIT.clamp(normal.dot(reflect(direction, normal)));
    specular + (Color::ONE - specular) * (1.0 - cos).powi(5)
}
