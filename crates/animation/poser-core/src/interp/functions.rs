//! Vector and quaternion helpers on plain arrays.
//!
//! Positions are `[f32; 3]`, rotations are unit quaternions `(x, y, z, w)`.

/// Identity rotation.
pub const QUAT_IDENTITY: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Linear interpolation of scalars (unclamped).
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Inverse of [`lerp_f32`], clamped to `[0, 1]`. Returns 0 for an empty span.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

#[inline]
pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

#[inline]
pub fn add_vec3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub_vec3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale_vec3(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn distance_vec3(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d = sub_vec3(a, b);
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
}

#[inline]
pub fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
pub fn normalize4(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        q[0] *= inv_len;
        q[1] *= inv_len;
        q[2] *= inv_len;
        q[3] *= inv_len;
    }
    q
}

/// Hamilton product `a * b` (apply `b`, then `a`).
#[inline]
pub fn quat_mul(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

/// Multiplicative inverse; equals the conjugate for unit quaternions.
#[inline]
pub fn quat_inverse(q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 <= 0.0 {
        return QUAT_IDENTITY;
    }
    let inv = len2.recip();
    [-q[0] * inv, -q[1] * inv, -q[2] * inv, q[3] * inv]
}

/// Rotate vector `v` by unit quaternion `q`.
#[inline]
pub fn quat_rotate(q: [f32; 4], v: [f32; 3]) -> [f32; 3] {
    let u = [q[0], q[1], q[2]];
    let t = scale_vec3(cross(u, v), 2.0);
    add_vec3(add_vec3(v, scale_vec3(t, q[3])), cross(u, t))
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
#[inline]
pub fn nlerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    if dot4(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    normalize4([
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ])
}

/// Spherical interpolation along the shortest arc, unclamped in `t`.
///
/// `t == 0`, `t == 1` and identical inputs return an input untouched. Nearly
/// parallel inputs fall back to [`nlerp_quat`].
pub fn slerp_quat(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    if t == 0.0 || a == b {
        return a;
    }
    if t == 1.0 {
        return b;
    }
    let mut d = dot4(a, b);
    let mut end = b;
    if d < 0.0 {
        end = [-b[0], -b[1], -b[2], -b[3]];
        d = -d;
    }
    if d > 0.9995 {
        return nlerp_quat(a, end, t);
    }
    let theta = d.clamp(-1.0, 1.0).acos();
    let sin_theta = theta.sin();
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;
    normalize4([
        a[0] * wa + end[0] * wb,
        a[1] * wa + end[1] * wb,
        a[2] * wa + end[2] * wb,
        a[3] * wa + end[3] * wb,
    ])
}

/// Rotation of `angle` radians about `axis` (any length). A zero axis yields identity.
pub fn quat_from_axis_angle(axis: [f32; 3], angle: f32) -> [f32; 4] {
    let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
    if len <= f32::EPSILON {
        return QUAT_IDENTITY;
    }
    let (s, c) = (0.5 * angle).sin_cos();
    let k = s / len;
    [axis[0] * k, axis[1] * k, axis[2] * k, c]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotate_quarter_turn_about_y() {
        let q = quat_from_axis_angle([0.0, 1.0, 0.0], FRAC_PI_2);
        let v = quat_rotate(q, [1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v[2], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn inverse_cancels() {
        let q = quat_from_axis_angle([0.0, 0.0, 1.0], 0.7);
        let id = quat_mul(q, quat_inverse(q));
        for (got, want) in id.iter().zip(QUAT_IDENTITY.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
        }
    }

    #[test]
    fn slerp_midpoint_halves_angle() {
        let a = QUAT_IDENTITY;
        let b = quat_from_axis_angle([1.0, 0.0, 0.0], 1.2);
        let mid = slerp_quat(a, b, 0.5);
        let want = quat_from_axis_angle([1.0, 0.0, 0.0], 0.6);
        for i in 0..4 {
            assert_abs_diff_eq!(mid[i], want[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn axis_angle_normalizes_the_axis() {
        let q = quat_from_axis_angle([0.0, 3.0, 0.0], FRAC_PI_2);
        assert_abs_diff_eq!(dot4(q, q), 1.0, epsilon = 1e-6);
        let v = quat_rotate(q, [1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(v[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v[2], -1.0, epsilon = 1e-6);
        let skew = quat_from_axis_angle([0.3, 1.0, 0.0], 1.2);
        assert_abs_diff_eq!(dot4(skew, skew), 1.0, epsilon = 1e-6);
        assert_eq!(quat_from_axis_angle([0.0; 3], 1.0), QUAT_IDENTITY);
    }

    #[test]
    fn inverse_lerp_clamps_and_handles_empty_span() {
        assert_eq!(inverse_lerp(1.0, 1.0, 5.0), 0.0);
        assert_eq!(inverse_lerp(0.0, 2.0, 3.0), 1.0);
        assert_abs_diff_eq!(inverse_lerp(0.0, 2.0, 0.5), 0.25);
    }
}
