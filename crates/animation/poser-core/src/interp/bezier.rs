//! Linear, quadratic and cubic Bézier curves over positions, rotations and scalars.
//!
//! Positions and scalars use Bernstein polynomials; rotations use de Casteljau's
//! algorithm with spherical interpolation. A single control point is returned
//! as-is. Inputs longer than [`MAX_CONTROL_POINTS`] use their first four points.

use crate::interp::functions::slerp_quat;
use crate::pose::Pose;

/// Largest supported curve (cubic).
pub const MAX_CONTROL_POINTS: usize = 4;

pub fn bezier_position(points: &[[f32; 3]], t: f32) -> [f32; 3] {
    let mut out = [0.0; 3];
    for (axis, slot) in out.iter_mut().enumerate() {
        let mut coords = [0.0f32; MAX_CONTROL_POINTS];
        let n = points.len().min(MAX_CONTROL_POINTS);
        for (c, p) in coords.iter_mut().zip(points.iter()) {
            *c = p[axis];
        }
        *slot = bezier_scalar(&coords[..n], t);
    }
    out
}

pub fn bezier_scalar(points: &[f32], t: f32) -> f32 {
    let s = 1.0 - t;
    match points.len() {
        0 => 0.0,
        1 => points[0],
        2 => s * points[0] + t * points[1],
        3 => (s * s) * points[0] + (2.0 * s * t) * points[1] + (t * t) * points[2],
        _ => {
            let (t2, s2) = (t * t, s * s);
            (s * s2) * points[0]
                + (3.0 * s2 * t) * points[1]
                + (3.0 * s * t2) * points[2]
                + (t * t2) * points[3]
        }
    }
}

pub fn bezier_rotation(points: &[[f32; 4]], t: f32) -> [f32; 4] {
    match points.len() {
        0 => crate::interp::functions::QUAT_IDENTITY,
        1 => points[0],
        n => {
            let mut work = [[0.0f32; 4]; MAX_CONTROL_POINTS];
            let n = n.min(MAX_CONTROL_POINTS);
            work[..n].copy_from_slice(&points[..n]);
            for level in (1..n).rev() {
                for i in 0..level {
                    work[i] = slerp_quat(work[i], work[i + 1], t);
                }
            }
            work[0]
        }
    }
}

/// Evaluate a pose curve; position and rotation are evaluated independently.
pub fn bezier_pose(points: &[Pose], t: f32) -> Pose {
    match points.len() {
        0 => Pose::IDENTITY,
        1 => points[0],
        n => {
            let n = n.min(MAX_CONTROL_POINTS);
            let mut positions = [[0.0f32; 3]; MAX_CONTROL_POINTS];
            let mut rotations = [[0.0f32; 4]; MAX_CONTROL_POINTS];
            for (i, p) in points[..n].iter().enumerate() {
                positions[i] = p.position;
                rotations[i] = p.rotation;
            }
            Pose {
                position: bezier_position(&positions[..n], t),
                rotation: bezier_rotation(&rotations[..n], t),
            }
        }
    }
}
