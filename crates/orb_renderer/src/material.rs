//! Surface materials.

use std::sync::Arc;

use orb_core::Texture;
use orb_math::{clamp_color, Color, Vec3};

/// How a surface interacts with light.
///
/// Every coefficient is clamped to [0, 1] per channel on construction.
/// Materials are shared between objects through `Arc` and never change.
#[derive(Debug, Clone)]
pub struct Material {
    /// Lambertian reflectance
    pub diffuse: Color,
    /// Phong highlight strength, also the Fresnel base reflectivity
    pub specular: Color,
    /// Mirror reflection coefficient
    pub reflective: Color,
    /// Light emitted by the surface itself
    pub emissive: Color,
    /// Replaces `diffuse` when present
    pub texture: Option<Arc<Texture>>,
}

impl Material {
    /// Create a non-emissive, untextured material.
    pub fn new(diffuse: Color, specular: Color, reflective: Color) -> Self {
        Self {
            diffuse: clamp_color(diffuse),
            specular: clamp_color(specular),
            reflective: clamp_color(reflective),
            emissive: Color::ZERO,
            texture: None,
        }
    }

    /// Purely diffuse material.
    pub fn diffuse(diffuse: Color) -> Self {
        Self::new(diffuse, Color::ZERO, Color::ZERO)
    }

    pub fn with_emissive(mut self, emissive: Color) -> Self {
        self.emissive = clamp_color(emissive);
        self
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Diffuse colour at a point on a sphere with the given unit normal.
    pub fn diffuse_at(&self, normal: Vec3) -> Color {
        match &self.texture {
            Some(texture) => texture.sample_sphere(normal),
            None => self.diffuse,
        }
    }

    /// True if this material reflects mirror rays at all.
    pub fn is_reflective(&self) -> bool {
        self.specular != Color::ZERO
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::diffuse(Color::splat(0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_unit_range(c: Color) -> bool {
        c.min_element() >= 0.0 && c.max_element() <= 1.0
    }

    #[test]
    fn test_channels_are_clamped() {
        let material = Material::new(
            Vec3::new(2.0, -1.0, 0.5),
            Vec3::new(-0.1, 1.1, 100.0),
            Vec3::splat(-3.0),
        )
        .with_emissive(Vec3::new(20.0, 20.0, -20.0));

        assert!(in_unit_range(material.diffuse));
        assert!(in_unit_range(material.specular));
        assert!(in_unit_range(material.reflective));
        assert!(in_unit_range(material.emissive));

        assert_eq!(material.diffuse, Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(material.emissive, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_reflective_follows_specular() {
        assert!(!Material::diffuse(Vec3::ONE).is_reflective());
        assert!(Material::new(Vec3::ONE, Vec3::new(0.0, 0.1, 0.0), Vec3::ZERO).is_reflective());
    }

    #[test]
    fn test_diffuse_at_uses_texture() {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 255, 0]));
        let texture = Texture::from_source(&img, 2.2, 0.0, "<green>").unwrap();
        let material = Material::diffuse(Vec3::new(1.0, 0.0, 0.0)).with_texture(Arc::new(texture));

        assert!((material.diffuse_at(Vec3::Y) - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }
}
