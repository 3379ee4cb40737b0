//! Anchored pose entries: a state's captured pose for one control, stored
//! relative to zero, one or two external reference poses.
//!
//! `resolve` turns the stored offset back into a world pose (optionally
//! damped), `offset_for` is its inverse and is what capturing stores.

use serde::{Deserialize, Serialize};

use crate::config::{AnchorDefaults, OwnerCfg};
use crate::host::ReferenceResolver;
use crate::interp::functions::{add_vec3, quat_inverse, quat_mul, sub_vec3};
use crate::pose::Pose;

/// How an entry's offset is interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorMode {
    /// Offset is an absolute world pose.
    World,
    /// Offset is relative to `anchor_a`.
    Single,
    /// Offset is relative to a blend of `anchor_a` and `anchor_b` by `blend_ratio`.
    Blend,
}

impl AnchorMode {
    /// Person-like owners anchor their controls to themselves, except the root control.
    pub fn default_for(owner: &OwnerCfg, control: &str) -> Self {
        if !owner.person_like || control == owner.root_control {
            AnchorMode::World
        } else {
            AnchorMode::Single
        }
    }
}

/// An `(atom, control)` pair naming an external reference pose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRef {
    pub atom: String,
    pub control: String,
}

impl AnchorRef {
    pub fn new(atom: impl Into<String>, control: impl Into<String>) -> Self {
        Self {
            atom: atom.into(),
            control: control.into(),
        }
    }
}

/// Requested anchoring for one entry. `None` fields keep the entry's current value.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorSpec {
    pub mode: AnchorMode,
    pub anchor_a: Option<AnchorRef>,
    pub anchor_b: Option<AnchorRef>,
    pub blend_ratio: Option<f32>,
    pub damping_time: Option<f32>,
}

impl AnchorSpec {
    pub fn world() -> Self {
        Self {
            mode: AnchorMode::World,
            anchor_a: None,
            anchor_b: None,
            blend_ratio: None,
            damping_time: None,
        }
    }

    pub fn single(anchor: AnchorRef) -> Self {
        Self {
            mode: AnchorMode::Single,
            anchor_a: Some(anchor),
            ..Self::world()
        }
    }

    pub fn blend(a: AnchorRef, b: AnchorRef, ratio: f32) -> Self {
        Self {
            mode: AnchorMode::Blend,
            anchor_a: Some(a),
            anchor_b: Some(b),
            blend_ratio: Some(ratio.clamp(0.0, 1.0)),
            damping_time: None,
        }
    }

    pub fn with_damping(mut self, seconds: f32) -> Self {
        self.damping_time = Some(seconds.max(0.0));
        self
    }
}

enum Reference {
    World,
    Resolved(Pose),
    Unresolved,
}

/// Per-(state, control capture) record.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchoredEntry {
    pub mode: AnchorMode,
    pub anchor_a: AnchorRef,
    pub anchor_b: AnchorRef,
    pub blend_ratio: f32,
    pub damping_time: f32,
    offset: Pose,
    /// Smoothed world pose, advanced by `resolve`.
    current: Pose,
}

impl AnchoredEntry {
    /// New entry anchored to the owner's root control, with identity offset.
    pub fn new(mode: AnchorMode, owner: &OwnerCfg, defaults: &AnchorDefaults) -> Self {
        let anchor = AnchorRef::new(owner.id.clone(), owner.root_control.clone());
        Self {
            mode,
            anchor_a: anchor.clone(),
            anchor_b: anchor,
            blend_ratio: defaults.blend_ratio,
            damping_time: defaults.damping_time,
            offset: Pose::IDENTITY,
            current: Pose::IDENTITY,
        }
    }

    /// Copy the anchoring scheme (references and mode) of `other`; offset and damping stay.
    pub fn inherit_anchoring(&mut self, other: &AnchoredEntry) {
        self.mode = other.mode;
        self.anchor_a = other.anchor_a.clone();
        self.anchor_b = other.anchor_b.clone();
    }

    pub fn apply_spec(&mut self, spec: &AnchorSpec) {
        self.mode = spec.mode;
        if let Some(a) = &spec.anchor_a {
            self.anchor_a = a.clone();
        }
        if let Some(b) = &spec.anchor_b {
            self.anchor_b = b.clone();
        }
        if let Some(r) = spec.blend_ratio {
            self.blend_ratio = r;
        }
        if let Some(d) = spec.damping_time {
            self.damping_time = d;
        }
    }

    #[inline]
    pub fn offset(&self) -> Pose {
        self.offset
    }

    #[inline]
    pub(crate) fn set_offset(&mut self, offset: Pose) {
        self.offset = offset;
    }

    /// Last resolved world pose.
    #[inline]
    pub fn current(&self) -> Pose {
        self.current
    }

    #[inline]
    pub(crate) fn set_current(&mut self, pose: Pose) {
        self.current = pose;
    }

    fn reference<R: ReferenceResolver + ?Sized>(&self, resolver: &R) -> Reference {
        match self.mode {
            AnchorMode::World => Reference::World,
            AnchorMode::Single => {
                match resolver.resolve_reference(&self.anchor_a.atom, &self.anchor_a.control) {
                    Some(a) => Reference::Resolved(a.normalized()),
                    None => Reference::Unresolved,
                }
            }
            AnchorMode::Blend => {
                let a = resolver.resolve_reference(&self.anchor_a.atom, &self.anchor_a.control);
                let b = resolver.resolve_reference(&self.anchor_b.atom, &self.anchor_b.control);
                match (a, b) {
                    (Some(a), Some(b)) => {
                        Reference::Resolved(Pose::interpolate(&a.normalized(), &b.normalized(), self.blend_ratio))
                    }
                    _ => Reference::Unresolved,
                }
            }
        }
    }

    /// Advance the cached world pose toward `reference ∘ offset`.
    ///
    /// With a damping time of at least `snap_below` seconds the cache moves by
    /// `clamp01(dt / damping_time)` of the remaining distance; otherwise it
    /// snaps. An unresolved reference leaves the cache untouched.
    pub fn resolve<R: ReferenceResolver + ?Sized>(&mut self, resolver: &R, dt: f32, snap_below: f32) -> Pose {
        match self.reference(resolver) {
            Reference::World => self.current = self.offset,
            Reference::Unresolved => {}
            Reference::Resolved(reference) => {
                let target = reference.compose(&self.offset);
                if self.damping_time >= snap_below {
                    let t = (dt / self.damping_time).clamp(0.0, 1.0);
                    self.current = Pose::interpolate(&self.current, &target, t);
                } else {
                    self.current = target;
                }
            }
        }
        self.current
    }

    /// [`resolve`](Self::resolve) without damping.
    pub fn resolve_instant<R: ReferenceResolver + ?Sized>(&mut self, resolver: &R) -> Pose {
        match self.reference(resolver) {
            Reference::World => self.current = self.offset,
            Reference::Unresolved => {}
            Reference::Resolved(reference) => self.current = reference.compose(&self.offset),
        }
        self.current
    }

    /// Offset that makes this entry resolve to `live`, or `None` while a reference is missing.
    pub fn offset_for<R: ReferenceResolver + ?Sized>(&self, resolver: &R, live: &Pose) -> Option<Pose> {
        match self.reference(resolver) {
            Reference::World => Some(*live),
            Reference::Resolved(reference) => Some(reference.offset_to(live)),
            Reference::Unresolved => None,
        }
    }

    /// Store `live` as this entry's pose. Returns false if a reference is missing.
    pub fn capture<R: ReferenceResolver + ?Sized>(&mut self, resolver: &R, live: &Pose) -> bool {
        match self.offset_for(resolver, live) {
            Some(offset) => {
                self.offset = offset;
                true
            }
            None => false,
        }
    }

    pub(crate) fn rename_atom(&mut self, old: &str, new: &str) {
        for anchor in [&mut self.anchor_a, &mut self.anchor_b] {
            if anchor.atom == old {
                anchor.atom = new.to_string();
            }
        }
    }
}

/// Move a sibling's offset by the change from `old_root` to `new_root`:
/// positions shift by the difference, rotations are pre-multiplied by
/// `old_root⁻¹ · new_root`.
pub fn rebase_offset(sibling: &Pose, old_root: &Pose, new_root: &Pose) -> Pose {
    let delta_rotation = quat_mul(quat_inverse(old_root.rotation), new_root.rotation);
    Pose {
        position: add_vec3(sibling.position, sub_vec3(new_root.position, old_root.position)),
        rotation: quat_mul(delta_rotation, sibling.rotation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Scene;

    #[test]
    fn default_mode_follows_owner_kind() {
        let mut owner = OwnerCfg::default();
        assert_eq!(AnchorMode::default_for(&owner, "headControl"), AnchorMode::Single);
        assert_eq!(AnchorMode::default_for(&owner, "control"), AnchorMode::World);
        owner.person_like = false;
        assert_eq!(AnchorMode::default_for(&owner, "headControl"), AnchorMode::World);
    }

    #[test]
    fn unresolved_reference_keeps_cache_and_offset() {
        let scene = Scene::new();
        let mut entry = AnchoredEntry::new(AnchorMode::Single, &OwnerCfg::default(), &AnchorDefaults::default());
        entry.set_current(Pose::from_position([1.0, 1.0, 1.0]));
        assert!(!entry.capture(&scene, &Pose::from_position([5.0, 0.0, 0.0])));
        assert_eq!(entry.offset(), Pose::IDENTITY);
        assert_eq!(entry.resolve(&scene, 0.1, 0.001).position, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn rename_touches_both_references() {
        let mut entry = AnchoredEntry::new(AnchorMode::Blend, &OwnerCfg::default(), &AnchorDefaults::default());
        entry.anchor_b = AnchorRef::new("chair", "control");
        entry.rename_atom("owner", "Person#2");
        assert_eq!(entry.anchor_a.atom, "Person#2");
        assert_eq!(entry.anchor_b.atom, "chair");
    }
}
