//! SceneObject trait and HitPoint for ray-object intersection.

use orb_math::{BoundingSphere, Color, Ray, Vec3};

use crate::Material;

/// Where a ray met a surface.
///
/// Hit points are produced by an intersection test and consumed right away
/// by the shading code that asked for them.
#[derive(Debug, Clone, Copy)]
pub struct HitPoint<'a> {
    /// Ray parameter of the intersection, always > 0
    pub lambda: f32,
    /// Point of intersection
    pub position: Vec3,
    /// Unit surface normal, pointing out of the object
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> HitPoint<'a> {
    /// Diffuse colour of the surface here, texture included.
    pub fn surface_colour(&self) -> Color {
        self.material.diffuse_at(self.normal)
    }

    /// Origin for secondary rays: pulled back along the incoming ray so the
    /// surface just hit is not hit again.
    pub fn adjusted_position(&self, ray: &Ray, epsilon: f32) -> Vec3 {
        self.position - ray.direction() * epsilon
    }

    /// Keep whichever of two optional hits is closer to the ray origin.
    pub fn closer(a: Option<HitPoint<'a>>, b: Option<HitPoint<'a>>) -> Option<HitPoint<'a>> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.lambda < a.lambda { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait SceneObject: Send + Sync {
    /// Closest intersection strictly in front of the ray origin, if any.
    fn hit(&self, ray: &Ray) -> Option<HitPoint<'_>>;

    /// A sphere that fully encloses this object.
    fn bounding_sphere(&self) -> BoundingSphere;
}
