//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of bounding spheres, built bottom-up by repeatedly merging
//! the pair of nodes whose combined bounding sphere is smallest. The build
//! is O(n^3) in the number of objects; it runs once per scene, before any
//! rendering starts, and the tree is read-only afterwards.

use std::time::Instant;

use crate::{HitPoint, SceneObject, SceneObjectContainer};
use orb_math::{BoundingSphere, Ray};

/// BVH node - either a branch with two children or a leaf with one object.
enum BvhNode {
    /// Internal node whose bounds contain both children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bounds: BoundingSphere,
    },
    /// Leaf node wrapping one object by index.
    Leaf {
        object: usize,
        bounds: BoundingSphere,
    },
}

impl BvhNode {
    fn bounds(&self) -> &BoundingSphere {
        match self {
            BvhNode::Branch { bounds, .. } | BvhNode::Leaf { bounds, .. } => bounds,
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Scene objects organised in a tree of bounding spheres.
pub struct BoundingVolumeHierarchy {
    objects: Vec<Box<dyn SceneObject>>,
    root: Option<BvhNode>,
}

impl BoundingVolumeHierarchy {
    /// Create a BVH from a list of scene objects.
    pub fn new(objects: Vec<Box<dyn SceneObject>>) -> Self {
        let mut bvh = Self {
            objects,
            root: None,
        };
        bvh.rebuild();
        bvh
    }

    /// Depth of the tree, 0 when empty.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::depth)
    }

    fn rebuild(&mut self) {
        let start = Instant::now();

        let mut nodes: Vec<BvhNode> = self
            .objects
            .iter()
            .enumerate()
            .map(|(object, o)| BvhNode::Leaf {
                object,
                bounds: o.bounding_sphere(),
            })
            .collect();

        while nodes.len() > 1 {
            merge_smallest_pair(&mut nodes);
        }
        self.root = nodes.pop();

        log::debug!(
            "Built BVH over {} objects (depth {}) in {:?}",
            self.objects.len(),
            self.depth(),
            start.elapsed()
        );
    }

    fn closest_hit<'a>(&'a self, node: &BvhNode, ray: &Ray) -> Option<HitPoint<'a>> {
        match node {
            BvhNode::Leaf { object, .. } => self.objects[*object].hit(ray),
            BvhNode::Branch { left, right, bounds } => {
                if !bounds.hit(ray) {
                    return None;
                }
                HitPoint::closer(self.closest_hit(left, ray), self.closest_hit(right, ray))
            }
        }
    }
}

/// Replace the two nodes with the smallest merged bounding sphere by a
/// branch holding both. Ties go to the first pair found.
fn merge_smallest_pair(nodes: &mut Vec<BvhNode>) {
    let mut best = (0, 1);
    let mut best_bounds = BoundingSphere::surrounding(nodes[0].bounds(), nodes[1].bounds());

    for i in 0..nodes.len() - 1 {
        for j in i + 1..nodes.len() {
            let merged = BoundingSphere::surrounding(nodes[i].bounds(), nodes[j].bounds());
            if merged.radius < best_bounds.radius {
                best = (i, j);
                best_bounds = merged;
            }
        }
    }

    // j > i, so removing j first leaves i in place
    let (i, j) = best;
    let right = nodes.swap_remove(j);
    let left = nodes.swap_remove(i);
    nodes.push(BvhNode::Branch {
        left: Box::new(left),
        right: Box::new(right),
        bounds: best_bounds,
    });
}

impl SceneObjectContainer for BoundingVolumeHierarchy {
    /// Adds the object and rebuilds the whole tree. Prefer `add_range`.
    fn add(&mut self, object: Box<dyn SceneObject>) {
        self.objects.push(object);
        self.rebuild();
    }

    fn add_range(&mut self, objects: Vec<Box<dyn SceneObject>>) {
        self.objects.extend(objects);
        self.rebuild();
    }

    fn find_closest_hit(&self, ray: &Ray) -> Option<HitPoint<'_>> {
        self.root.as_ref().and_then(|root| self.closest_hit(root, ray))
    }

    fn len(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, SceneObjectList, Sphere};
    use orb_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn sphere(center: Vec3, radius: f32) -> Box<dyn SceneObject> {
        Box::new(Sphere::new(center, radius, Arc::new(Material::default())).unwrap())
    }

    /// Check every branch contains both of its children.
    fn assert_contains_children(node: &BvhNode) {
        if let BvhNode::Branch { left, right, bounds } = node {
            assert!(bounds.contains(left.bounds()));
            assert!(bounds.contains(right.bounds()));
            assert!(bounds.radius >= left.bounds().radius.max(right.bounds().radius));
            assert_contains_children(left);
            assert_contains_children(right);
        }
    }

    /// Random spheres in a 20 unit cube that do not overlap each other.
    fn random_spheres(rng: &mut StdRng, n: usize) -> Vec<(Vec3, f32)> {
        let mut spheres: Vec<(Vec3, f32)> = Vec::new();
        while spheres.len() < n {
            let center = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            let radius = rng.gen_range(0.2..1.5);
            if spheres
                .iter()
                .all(|(c, r)| c.distance(center) > r + radius)
            {
                spheres.push((center, radius));
            }
        }
        spheres
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BoundingVolumeHierarchy::new(vec![]);
        assert!(bvh.is_empty());
        assert_eq!(bvh.depth(), 0);
        assert!(bvh.find_closest_hit(&Ray::new(Vec3::ZERO, Vec3::Z)).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BoundingVolumeHierarchy::new(vec![sphere(Vec3::new(0.0, 0.0, -1.0), 0.5)]);
        assert_eq!(bvh.depth(), 1);

        let hit = bvh.find_closest_hit(&Ray::new(Vec3::ZERO, -Vec3::Z));
        assert!((hit.unwrap().lambda - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres = (0..10)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, -5.0), 0.5))
            .collect();
        let bvh = BoundingVolumeHierarchy::new(spheres);
        assert_eq!(bvh.len(), 10);

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = bvh.find_closest_hit(&ray).unwrap();

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((hit.position.z - (-4.5)).abs() < 0.01);
        assert!((hit.position.x - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_bvh_merges_closest_pair_first() {
        // Two nearby spheres and one far away: the near pair forms a subtree
        let bvh = BoundingVolumeHierarchy::new(vec![
            sphere(Vec3::new(100.0, 0.0, 0.0), 1.0),
            sphere(Vec3::new(0.0, 0.0, 0.0), 1.0),
            sphere(Vec3::new(3.0, 0.0, 0.0), 1.0),
        ]);
        assert_eq!(bvh.depth(), 3);

        match bvh.root.as_ref().unwrap() {
            BvhNode::Branch { left, right, .. } => {
                let leaf = if matches!(**left, BvhNode::Leaf { .. }) { left } else { right };
                assert!(matches!(**leaf, BvhNode::Leaf { object: 0, .. }));
            }
            BvhNode::Leaf { .. } => panic!("root should be a branch"),
        }
    }

    #[test]
    fn test_bvh_bounds_contain_children() {
        let mut rng = StdRng::seed_from_u64(11);
        let spheres = random_spheres(&mut rng, 25)
            .into_iter()
            .map(|(c, r)| sphere(c, r))
            .collect();
        let bvh = BoundingVolumeHierarchy::new(spheres);
        assert_contains_children(bvh.root.as_ref().unwrap());
    }

    #[test]
    fn test_bvh_matches_list() {
        let mut rng = StdRng::seed_from_u64(1234);

        for scene in 0..5 {
            let spheres = random_spheres(&mut rng, 3 + scene * 6);
            let list = SceneObjectList::from_objects(
                spheres.iter().map(|&(c, r)| sphere(c, r)).collect(),
            );
            let bvh = BoundingVolumeHierarchy::new(
                spheres.iter().map(|&(c, r)| sphere(c, r)).collect(),
            );

            for _ in 0..200 {
                let origin = Vec3::new(
                    rng.gen_range(-15.0..15.0),
                    rng.gen_range(-15.0..15.0),
                    rng.gen_range(-15.0..15.0),
                );
                // Aim at a random sphere half of the time so most rays hit
                let target = if rng.gen_bool(0.5) {
                    spheres[rng.gen_range(0..spheres.len())].0
                } else {
                    Vec3::new(
                        rng.gen_range(-10.0..10.0),
                        rng.gen_range(-10.0..10.0),
                        rng.gen_range(-10.0..10.0),
                    )
                };
                if origin.distance(target) < 1e-3 {
                    continue;
                }
                let ray = Ray::towards(origin, target);

                let expected = list.find_closest_hit(&ray);
                let actual = bvh.find_closest_hit(&ray);
                match (expected, actual) {
                    (Some(e), Some(a)) => {
                        assert!((e.position - a.position).length() < 1e-4)
                    }
                    (None, None) => {}
                    (e, a) => panic!(
                        "list and BVH disagree: {:?} vs {:?}",
                        e.map(|h| h.position),
                        a.map(|h| h.position)
                    ),
                }
            }
        }
    }

    #[test]
    fn test_bvh_add_rebuilds() {
        let mut bvh = BoundingVolumeHierarchy::new(vec![sphere(Vec3::new(0.0, 0.0, -10.0), 1.0)]);
        bvh.add(sphere(Vec3::new(0.0, 0.0, -5.0), 1.0));
        bvh.add_range(vec![sphere(Vec3::new(5.0, 0.0, -5.0), 1.0)]);
        assert_eq!(bvh.len(), 3);

        let hit = bvh.find_closest_hit(&Ray::new(Vec3::ZERO, -Vec3::Z)).unwrap();
        assert!((hit.position.z - -4.0).abs() < 1e-4);
    }
}
