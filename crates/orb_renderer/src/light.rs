use orb_math::{Color, Vec3};
use rand::RngCore;

use crate::sampling::random_in_unit_disk;

/// A light source. Radius 0 is an ideal point light with hard shadows;
/// a positive radius makes a disk light that casts soft shadows.
#[derive(Debug, Clone, Copy)]
pub struct LightSource {
    pub position: Vec3,
    pub colour: Color,
    pub radius: f32,
}

impl LightSource {
    pub fn new(position: Vec3, colour: Color) -> Self {
        Self {
            position,
            colour,
            radius: 0.0,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn is_point(&self) -> bool {
        self.radius <= 0.0
    }

    /// Random point on the light's disk as seen from `from`.
    ///
    /// The disk is centered on the light and faces `from`.
    pub fn sample_point(&self, from: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.is_point() {
            return self.position;
        }

        let axis = (self.position - from).normalize();
        let (u, v) = axis.any_orthonormal_pair();
        let p = random_in_unit_disk(rng) * self.radius;
        self.position + p.x * u + p.y * v
    }
}
