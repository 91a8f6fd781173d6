//! Monte Carlo path tracing.

use std::f32::consts::TAU;

use orb_core::Acceleration;
use orb_math::{Color, Ray};
use rand::RngCore;

use crate::sampling::random_in_hemisphere;
use crate::{create_container, HitPoint, SceneError, SceneObject, SceneObjectContainer, HIT_POINT_ADJUSTMENT};

/// A scene rendered by unbiased path tracing.
///
/// Light only enters through emissive surfaces; there are no explicit light
/// sources. Paths end after a fixed number of bounces.
pub struct PathtracingScene {
    objects: Box<dyn SceneObjectContainer>,
}

impl PathtracingScene {
    pub fn new(objects: Vec<Box<dyn SceneObject>>, acceleration: Acceleration) -> Result<Self, SceneError> {
        Ok(Self::from_container(create_container(acceleration, objects)?))
    }

    pub fn from_container(objects: Box<dyn SceneObjectContainer>) -> Self {
        Self { objects }
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

    pub fn find_closest_hit(&self, ray: &Ray) -> Option<HitPoint<'_>> {
        self.objects.find_closest_hit(ray)
    }

    /// One-sample estimate of the radiance arriving along `ray`.
    ///
    /// `recursion_depth` is the number of surface interactions left; at 0
    /// the path is cut off and contributes black.
    pub fn calculate_colour(&self, ray: &Ray, rng: &mut dyn RngCore, recursion_depth: u32) -> Color {
        if recursion_depth == 0 {
            return Color::ZERO;
        }
        let Some(hit) = self.find_closest_hit(ray) else {
            return Color::ZERO;
        };

        let direction = random_in_hemisphere(rng, hit.normal);
        let bounce = Ray::new(hit.adjusted_position(ray, HIT_POINT_ADJUSTMENT), direction);
        let incoming = self.calculate_colour(&bounce, rng, recursion_depth - 1);

        // Uniform hemisphere sampling: pdf = 1 / 2pi
        let lambert = direction.dot(hit.normal);
        hit.material.emissive + incoming * lambert * hit.surface_colour() * TAU
    }
}
