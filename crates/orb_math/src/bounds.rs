use crate::{Ray, Vec3};

/// Relative slack applied when testing rays against bounds, so that
/// grazing hits on a primitive are never rejected by its own bounds.
const HIT_SLACK: f32 = 1e-4;

/// A sphere that encloses some piece of geometry.
///
/// Used by the bounding volume hierarchy in place of boxes. Bounds are
/// sufficient, not minimal: a merged sphere always contains both inputs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns true if `other` lies entirely inside this sphere.
    pub fn contains(&self, other: &BoundingSphere) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius + self.radius * HIT_SLACK
    }

    /// Create the sphere that tightly surrounds two other spheres.
    ///
    /// If one sphere already contains the other it is returned unchanged.
    /// Otherwise the result touches both spheres on the line through their
    /// centers: `radius = (d + r_a + r_b) / 2`.
    pub fn surrounding(a: &BoundingSphere, b: &BoundingSphere) -> Self {
        let distance = a.center.distance(b.center);

        if distance + b.radius <= a.radius {
            return *a;
        }
        if distance + a.radius <= b.radius {
            return *b;
        }

        // distance > 0 here, otherwise one sphere would contain the other
        let radius = (distance + a.radius + b.radius) / 2.0;
        let center = a.center + (b.center - a.center) / distance * (radius - a.radius);
        Self { center, radius }
    }

    /// Returns true if the ray passes through this sphere anywhere in front
    /// of its origin, or starts inside it.
    pub fn hit(&self, ray: &Ray) -> bool {
        let radius = self.radius * (1.0 + HIT_SLACK);
        let oc = ray.origin() - self.center;
        let c = oc.length_squared() - radius * radius;
        if c <= 0.0 {
            return true;
        }

        // Outside and moving away
        let h = oc.dot(ray.direction());
        if h > 0.0 {
            return false;
        }

        h * h - c >= 0.0
    }
}
