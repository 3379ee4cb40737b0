//! Host collaborator traits.
//!
//! The engine never owns live scene data. Adapters implement these traits and
//! pass themselves into every engine call that reads or writes live values.

use hashbrown::HashMap;

use crate::pose::Pose;

/// Live pose access for captured targets (controls).
pub trait PoseSource {
    fn live_pose(&self, target: &str) -> Option<Pose>;
    fn set_live_pose(&mut self, target: &str, pose: Pose);
}

/// Live scalar access for morph-like captures.
pub trait ScalarSource {
    fn scalar(&self, id: &str) -> Option<f32>;
    fn set_scalar(&mut self, id: &str, value: f32);
}

/// Resolves anchor references `(atom, control)` to their current world pose.
pub trait ReferenceResolver {
    fn resolve_reference(&self, atom: &str, control: &str) -> Option<Pose>;
}

/// Everything the engine needs from the host, as one object-safe bundle.
pub trait Host: PoseSource + ScalarSource + ReferenceResolver {}

impl<T: PoseSource + ScalarSource + ReferenceResolver + ?Sized> Host for T {}

/// In-memory host: plain maps of poses, scalars and anchor references.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    poses: HashMap<String, Pose>,
    scalars: HashMap<String, f32>,
    references: HashMap<(String, String), Pose>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pose(&mut self, target: &str, pose: Pose) {
        self.poses.insert(target.to_string(), pose);
    }

    pub fn pose(&self, target: &str) -> Option<Pose> {
        self.poses.get(target).copied()
    }

    pub fn insert_scalar(&mut self, id: &str, value: f32) {
        self.scalars.insert(id.to_string(), value);
    }

    pub fn scalar_value(&self, id: &str) -> Option<f32> {
        self.scalars.get(id).copied()
    }

    pub fn insert_reference(&mut self, atom: &str, control: &str, pose: Pose) {
        self.references
            .insert((atom.to_string(), control.to_string()), pose);
    }

    pub fn remove_reference(&mut self, atom: &str, control: &str) {
        self.references
            .remove(&(atom.to_string(), control.to_string()));
    }
}

impl PoseSource for Scene {
    fn live_pose(&self, target: &str) -> Option<Pose> {
        self.pose(target)
    }

    /// Writes only to targets that exist.
    fn set_live_pose(&mut self, target: &str, pose: Pose) {
        if let Some(slot) = self.poses.get_mut(target) {
            *slot = pose;
        }
    }
}

impl ScalarSource for Scene {
    fn scalar(&self, id: &str) -> Option<f32> {
        self.scalar_value(id)
    }

    fn set_scalar(&mut self, id: &str, value: f32) {
        if let Some(slot) = self.scalars.get_mut(id) {
            *slot = value;
        }
    }
}

impl ReferenceResolver for Scene {
    fn resolve_reference(&self, atom: &str, control: &str) -> Option<Pose> {
        self.references
            .get(&(atom.to_string(), control.to_string()))
            .copied()
    }
}
