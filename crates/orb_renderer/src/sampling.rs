//! Random sampling helpers.
//!
//! Every function takes the generator explicitly. Render workers each own
//! one, so nothing here touches shared state.

use std::f32::consts::PI;

use orb_math::{Vec2, Vec3};
use rand::{Rng, RngCore};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Normally distributed float (Box-Muller).
pub fn gaussian(rng: &mut dyn RngCore, mean: f32, sigma: f32) -> f32 {
    // 1 - u keeps the log argument in (0, 1]
    let u1 = 1.0 - gen_f32(rng);
    let u2 = gen_f32(rng);
    let standard = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin();
    mean + sigma * standard
}

/// Uniform point in the unit disk.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec2 {
    let r = gen_f32(rng).sqrt();
    let theta = gen_f32(rng) * 2.0 * PI;
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Uniform unit direction in the hemisphere around `normal`.
///
/// Rejection sampling: draw from the cube [-1, 1]^3 until the point lies
/// inside the unit ball and on the normal's side.
pub fn random_in_hemisphere(rng: &mut dyn RngCore, normal: Vec3) -> Vec3 {
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 && v.dot(normal) > 0.0 {
            return v / len_sq.sqrt();
        }
    }
}
