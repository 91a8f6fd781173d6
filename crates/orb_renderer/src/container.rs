//! Containers that answer closest-hit queries over a set of scene objects.

use orb_core::Acceleration;
use orb_math::Ray;

use crate::{BoundingVolumeHierarchy, HitPoint, SceneError, SceneObject};

/// Storage for a scene's objects.
///
/// Filled before rendering, then only read. Implementations differ in
/// speed, never in which hit they return.
pub trait SceneObjectContainer: Send + Sync {
    fn add(&mut self, object: Box<dyn SceneObject>);

    fn add_range(&mut self, objects: Vec<Box<dyn SceneObject>>);

    /// The hit with the smallest positive lambda over all objects.
    fn find_closest_hit(&self, ray: &Ray) -> Option<HitPoint<'_>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Create the container for an acceleration structure.
///
/// Fails for structures that are not implemented, so a bad configuration
/// is caught while the scene is built rather than during rendering.
pub fn create_container(
    acceleration: Acceleration,
    objects: Vec<Box<dyn SceneObject>>,
) -> Result<Box<dyn SceneObjectContainer>, SceneError> {
    match acceleration {
        Acceleration::None => Ok(Box::new(SceneObjectList::from_objects(objects))),
        Acceleration::Bvh => Ok(Box::new(BoundingVolumeHierarchy::new(objects))),
        Acceleration::Grid => Err(SceneError::UnsupportedAcceleration(acceleration)),
    }
}

/// A list of scene objects, scanned linearly for every query.
#[derive(Default)]
pub struct SceneObjectList {
    objects: Vec<Box<dyn SceneObject>>,
}

impl SceneObjectList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: Vec<Box<dyn SceneObject>>) -> Self {
        Self { objects }
    }
}

impl SceneObjectContainer for SceneObjectList {
    fn add(&mut self, object: Box<dyn SceneObject>) {
        self.objects.push(object);
    }

    fn add_range(&mut self, objects: Vec<Box<dyn SceneObject>>) {
        self.objects.extend(objects);
    }

    fn find_closest_hit(&self, ray: &Ray) -> Option<HitPoint<'_>> {
        self.objects
            .iter()
            .fold(None, |closest, object| HitPoint::closer(closest, object.hit(ray)))
    }

    fn len(&self) -> usize {
        self.objects.len()
    }
}
