//! Rigid pose (position + orientation) and the compositions anchoring relies on.

use serde::{Deserialize, Serialize};

use crate::interp::functions::{
    add_vec3, lerp_vec3, normalize4, quat_inverse, quat_mul, quat_rotate, slerp_quat, sub_vec3,
    QUAT_IDENTITY,
};

/// World or anchor-relative pose of one target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: [f32; 3],
    /// Quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: [0.0; 3],
        rotation: QUAT_IDENTITY,
    };

    #[inline]
    pub fn new(position: [f32; 3], rotation: [f32; 4]) -> Self {
        Self { position, rotation }
    }

    #[inline]
    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            rotation: QUAT_IDENTITY,
        }
    }

    /// Same pose with a unit-length rotation.
    #[inline]
    pub fn normalized(&self) -> Pose {
        Pose {
            position: self.position,
            rotation: normalize4(self.rotation),
        }
    }

    /// `self ∘ offset`: the offset's position is rotated by this pose and then
    /// translated; rotations compose as `self.rotation * offset.rotation`.
    pub fn compose(&self, offset: &Pose) -> Pose {
        Pose {
            position: add_vec3(self.position, quat_rotate(self.rotation, offset.position)),
            rotation: quat_mul(self.rotation, offset.rotation),
        }
    }

    /// Offset `o` such that `self.compose(&o)` reproduces `world`.
    pub fn offset_to(&self, world: &Pose) -> Pose {
        let inv = quat_inverse(self.rotation);
        Pose {
            position: quat_rotate(inv, sub_vec3(world.position, self.position)),
            rotation: quat_mul(inv, world.rotation),
        }
    }

    /// Linear position, spherical rotation; unclamped in `t`.
    pub fn interpolate(a: &Pose, b: &Pose, t: f32) -> Pose {
        Pose {
            position: lerp_vec3(a.position, b.position, t),
            rotation: slerp_quat(a.rotation, b.rotation, t),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::functions::quat_from_axis_angle;
    use approx::assert_abs_diff_eq;

    #[test]
    fn offset_to_inverts_compose() {
        let reference = Pose::new([1.0, 2.0, 3.0], quat_from_axis_angle([0.0, 1.0, 0.0], 0.9));
        let world = Pose::new([-4.0, 0.5, 2.0], quat_from_axis_angle([1.0, 0.0, 0.0], 0.3));
        let back = reference.compose(&reference.offset_to(&world));
        for i in 0..3 {
            assert_abs_diff_eq!(back.position[i], world.position[i], epsilon = 1e-5);
        }
        for i in 0..4 {
            assert_abs_diff_eq!(back.rotation[i], world.rotation[i], epsilon = 1e-5);
        }
    }
}
