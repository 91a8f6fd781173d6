//! Sphere primitive for ray tracing.

use std::sync::Arc;

use crate::{
    hit::{HitPoint, SceneObject},
    Material, SceneError,
};
use orb_math::{BoundingSphere, Interval, Ray, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    /// Create a new sphere. The radius must be positive.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Result<Self, SceneError> {
        if !(radius > 0.0) {
            return Err(SceneError::InvalidSphere { radius });
        }
        Ok(Self {
            center,
            radius,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

impl SceneObject for Sphere {
    fn hit(&self, ray: &Ray) -> Option<HitPoint<'_>> {
        // |o + t*d - c|^2 = r^2 with |d| = 1, so a = 1
        let oc = ray.origin() - self.center;
        let b = 2.0 * oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in front of the origin
        let mut lambda = (-b - sqrtd) / 2.0;
        if !Interval::POSITIVE.surrounds(lambda) {
            lambda = (-b + sqrtd) / 2.0;
            if !Interval::POSITIVE.surrounds(lambda) {
                return None;
            }
        }

        let position = ray.at(lambda);
        Some(HitPoint {
            lambda,
            position,
            normal: (position - self.center).normalize(),
            material: &self.material,
        })
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::ZERO, 1.0, Arc::new(Material::default())).unwrap()
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        let hit = sphere.hit(&ray).expect("ray should hit");
        assert!((hit.lambda - 4.0).abs() < 1e-4);
        assert!(close(hit.position, Vec3::new(0.0, 0.0, -1.0)));
        assert!(close(hit.normal, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere();

        // Passes at distance 1.5 from the center
        let ray = Ray::new(Vec3::new(0.0, 1.5, -5.0), Vec3::Z);
        assert!(sphere.hit(&ray).is_none());

        // Pointing away from the sphere
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(sphere.hit(&ray).is_none());
    }

    #[test]
    fn test_origin_inside_hits_far_side() {
        let sphere = unit_sphere();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.5), Vec3::Z);

        let hit = sphere.hit(&ray).expect("ray from inside should hit");
        assert!((hit.lambda - 0.5).abs() < 1e-4);
        assert!(close(hit.position, Vec3::new(0.0, 0.0, 1.0)));

        // Normal still points outwards
        assert!(close(hit.normal, Vec3::Z));
    }

    #[test]
    fn test_offset_origin_does_not_self_intersect() {
        let sphere = unit_sphere();
        let incoming = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let hit = sphere.hit(&incoming).unwrap();

        // Secondary ray leaving the surface back towards the camera
        let origin = hit.adjusted_position(&incoming, crate::HIT_POINT_ADJUSTMENT);
        let reflected = Ray::new(origin, -Vec3::Z);
        assert!(sphere.hit(&reflected).is_none());
    }

    #[test]
    fn test_bounding_sphere_is_self() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5, Arc::new(Material::default())).unwrap();
        let bounds = sphere.bounding_sphere();
        assert_eq!(bounds.center, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.radius, 0.5);
    }

    #[test]
    fn test_invalid_radius() {
        let material = Arc::new(Material::default());
        assert!(matches!(
            Sphere::new(Vec3::ZERO, 0.0, material.clone()),
            Err(SceneError::InvalidSphere { .. })
        ));
        assert!(Sphere::new(Vec3::ZERO, -1.0, material).is_err());
    }
}
