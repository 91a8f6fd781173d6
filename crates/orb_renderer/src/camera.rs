//! Camera for eye ray generation.

use crate::sampling::{gaussian, random_in_unit_disk};
use orb_math::{Ray, Vec2, Vec3};
use rand::RngCore;

/// A pinhole camera with an optional thin-lens aperture.
///
/// The orthonormal basis is derived once from position, look-at target and
/// up vector. Each `with_*` builder re-derives it.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    position: Vec3,
    look_at: Vec3,
    up: Vec3,

    // Lens settings
    fov: f32,             // Field of view in radians
    aperture_radius: f32, // 0 disables depth of field

    // Derived basis
    forward: Vec3,
    right: Vec3,
    up_prime: Vec3,
    half_extent: f32, // tan(fov / 2)
}

impl Camera {
    /// Create a camera with up vector (0, 1, 0) and no aperture.
    ///
    /// `fov` is in radians. `position` must differ from `look_at` and the
    /// view direction must not be parallel to the up vector.
    pub fn new(position: Vec3, look_at: Vec3, fov: f32) -> Self {
        Self {
            position,
            look_at,
            up: Vec3::Y,
            fov,
            aperture_radius: 0.0,
            forward: Vec3::Z,
            right: Vec3::X,
            up_prime: Vec3::Y,
            half_extent: 1.0,
        }
        .orient()
    }

    /// Set the up vector.
    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self.orient()
    }

    /// Set the aperture radius for depth of field.
    pub fn with_aperture(mut self, aperture_radius: f32) -> Self {
        self.aperture_radius = aperture_radius.max(0.0);
        self
    }

    fn orient(mut self) -> Self {
        self.forward = (self.look_at - self.position).normalize();
        self.right = self.forward.cross(self.up).normalize();
        self.up_prime = self.right.cross(self.forward).normalize();
        self.half_extent = (self.fov / 2.0).tan();
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aperture_radius(&self) -> f32 {
        self.aperture_radius
    }

    /// Unit vector from the camera towards the look-at target.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Camera up vector, orthogonal to forward and right.
    pub fn up(&self) -> Vec3 {
        self.up_prime
    }

    /// Distance to the plane of perfect focus.
    pub fn focus_distance(&self) -> f32 {
        (self.look_at - self.position).length()
    }

    /// Unnormalized direction through a point on the picture plane.
    /// Its component along `forward` is always 1.
    fn direction(&self, pixel: Vec2) -> Vec3 {
        self.forward + (pixel.x * self.right + pixel.y * self.up_prime) * self.half_extent
    }

    /// Create the eye ray through `pixel`, given in normalized device
    /// coordinates with y pointing up. y spans [-1, 1] across the vertical
    /// field of view; x spans [-aspect, aspect] so pixels stay square.
    pub fn create_eye_ray(&self, pixel: Vec2) -> Ray {
        Ray::new(self.position, self.direction(pixel))
    }

    /// Create an eye ray through `pixel` that starts at a random point on the
    /// aperture disk and passes through the same point on the focal plane as
    /// the pinhole ray would. Without an aperture this is `create_eye_ray`.
    pub fn create_lens_ray(&self, pixel: Vec2, rng: &mut dyn RngCore) -> Ray {
        if self.aperture_radius <= 0.0 {
            return self.create_eye_ray(pixel);
        }

        let focal_point = self.position + self.direction(pixel) * self.focus_distance();
        let lens = random_in_unit_disk(rng) * self.aperture_radius;
        let origin = self.position + lens.x * self.right + lens.y * self.up_prime;
        Ray::towards(origin, focal_point)
    }

    /// Create one eye ray with `pixel` jittered by a 2D Gaussian of standard
    /// deviation `sigma` (in NDC units).
    pub fn create_jittered_ray(&self, pixel: Vec2, sigma: f32, rng: &mut dyn RngCore) -> Ray {
        let x = gaussian(rng, pixel.x, sigma);
        let y = gaussian(rng, pixel.y, sigma);
        self.create_lens_ray(Vec2::new(x, y), rng)
    }

    /// Create `n` independent jittered eye rays for one pixel.
    pub fn create_eye_rays(
        &self,
        pixel: Vec2,
        n: usize,
        sigma: f32,
        rng: &mut dyn RngCore,
    ) -> Vec<Ray> {
        (0..n)
            .map(|_| self.create_jittered_ray(pixel, sigma, rng))
            .collect()
    }
}
