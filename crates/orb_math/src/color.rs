//! Linear colour helpers and sRGB gamma conversion.
//!
//! All light transport happens in linear space. Conversion to the
//! nonlinear sRGB representation only happens when bytes are written.

use crate::Vec3;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Clamp every channel to [0, 1].
#[inline]
pub fn clamp_color(color: Color) -> Color {
    color.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Convert a linear colour to sRGB using the given gamma.
///
/// Channels are clamped to [0, 1] first. The result is in [0, 255].
#[inline]
pub fn to_srgb(color: Color, gamma: f32) -> Vec3 {
    let inv = 1.0 / gamma;
    let c = clamp_color(color);
    255.0 * Vec3::new(c.x.powf(inv), c.y.powf(inv), c.z.powf(inv))
}

/// Convert an sRGB colour with channels in [0, 255] to linear space.
#[inline]
pub fn from_srgb(color: Vec3, gamma: f32) -> Color {
    let c = color.clamp(Vec3::ZERO, Vec3::splat(255.0)) / 255.0;
    Vec3::new(c.x.powf(gamma), c.y.powf(gamma), c.z.powf(gamma))
}

/// Encode a linear colour as three sRGB bytes in B, G, R order.
#[inline]
pub fn encode_bgr(color: Color, gamma: f32) -> [u8; 3] {
    let srgb = to_srgb(color, gamma);
    [srgb.z as u8, srgb.y as u8, srgb.x as u8]
}
