//! Arc-length reparametrization of Bézier position curves.
//!
//! The curve is sampled at a fixed number of interior points, a cumulative
//! distance table is built, and the linear parameter is remapped so that equal
//! steps of `t` cover equal distances along the polyline approximation.

use crate::interp::bezier::{bezier_position, MAX_CONTROL_POINTS};
use crate::interp::functions::{distance_vec3, inverse_lerp, lerp_f32};

/// Interior samples per control-point count (index = number of points).
const DISTANCE_SAMPLES: [usize; MAX_CONTROL_POINTS + 1] = [0, 0, 0, 11, 20];
const TABLE_LEN: usize = DISTANCE_SAMPLES[MAX_CONTROL_POINTS] + 2;

/// Remap `t` proportionally to travelled distance.
///
/// Curves with two or fewer control points are already uniform and return `t`.
/// Values outside the distance table clamp to 0 and 1.
pub fn arc_length_parametrization(points: &[[f32; 3]], t: f32) -> f32 {
    let n = points.len();
    if n <= 2 || n > MAX_CONTROL_POINTS {
        return t;
    }
    let num_samples = DISTANCE_SAMPLES[n];
    let num_lines = (num_samples + 1) as f32;

    let mut table = [0.0f32; TABLE_LEN];
    let mut distance = 0.0f32;
    let mut previous = points[0];
    for (i, slot) in table.iter_mut().enumerate().take(num_samples + 1).skip(1) {
        let current = bezier_position(points, i as f32 / num_lines);
        distance += distance_vec3(previous, current);
        *slot = distance;
        previous = current;
    }
    distance += distance_vec3(previous, points[n - 1]);
    table[num_samples + 1] = distance;

    let table = &table[..num_samples + 2];
    let target = t * distance;
    match table.binary_search_by(|d| d.total_cmp(&target)) {
        Ok(idx) => idx as f32 / num_lines,
        Err(0) => 0.0,
        Err(idx) if idx >= table.len() => 1.0,
        Err(idx) => {
            let u = inverse_lerp(table[idx - 1], table[idx], target);
            lerp_f32((idx - 1) as f32 / num_lines, idx as f32 / num_lines, u)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const BENT: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 1.0, 0.0]];

    #[test]
    fn linear_curves_pass_through() {
        let pts = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert_eq!(arc_length_parametrization(&pts, 0.37), 0.37);
    }

    #[test]
    fn clamps_at_ends() {
        assert_eq!(arc_length_parametrization(&BENT, 0.0), 0.0);
        assert_abs_diff_eq!(arc_length_parametrization(&BENT, 1.0), 1.0, epsilon = 1e-6);
        assert_eq!(arc_length_parametrization(&BENT, -0.5), 0.0);
        assert_eq!(arc_length_parametrization(&BENT, 1.5), 1.0);
    }

    #[test]
    fn remap_is_monotonic() {
        let cubic = [[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [3.0, 3.0, 0.0], [3.0, 3.0, 3.0]];
        let mut last = -1.0;
        for i in 0..=50 {
            let u = arc_length_parametrization(&cubic, i as f32 / 50.0);
            assert!(u >= last, "step {i}: {u} < {last}");
            assert!((0.0..=1.0).contains(&u));
            last = u;
        }
    }
}
