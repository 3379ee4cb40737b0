//! Eased transition progress.
//!
//! The velocity profile is a smoothstep (`3x² − 2x³`) ramp at both ends joined
//! by a constant middle section. Integrating it yields a three-piece position
//! curve that is continuous in value and velocity, with continuous
//! acceleration inside each ease segment.

/// Minimum total duration, guards the division below.
const MIN_DURATION: f32 = 0.01;

/// Progress in `[0, 1]` after `elapsed` seconds of a blend lasting `duration`.
///
/// `ease_out` is the acceleration time leaving the source, `ease_in` the
/// deceleration time arriving at the target. When they sum to more than the
/// duration both are scaled down to fit exactly. With no easing the result is
/// the linear ramp `elapsed / duration`.
pub fn ease(ease_out: f32, ease_in: f32, duration: f32, elapsed: f32) -> f32 {
    let d = duration.max(MIN_DURATION);
    let t = elapsed.clamp(0.0, d);
    let (mut a, mut b) = (ease_out, ease_in);
    if a + b > d {
        let scale = d / (a + b);
        a *= scale;
        b *= scale;
    }
    // Length of the equivalent constant-velocity run.
    let n = d - 0.5 * (a + b);
    let s = d - t;

    if t < a {
        let ta = t / a;
        (a - 0.5 * t) * (ta * ta * ta / n)
    } else if s >= b {
        (t - 0.5 * a) / n
    } else {
        let sb = s / b;
        (0.5 * s - b) * (sb * sb * sb / n) + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn endpoints_are_exact() {
        for (out, inn) in [(0.0, 0.0), (0.3, 0.0), (0.0, 0.4), (0.25, 0.25), (2.0, 3.0)] {
            assert_eq!(ease(out, inn, 1.5, 0.0), 0.0, "out={out} in={inn}");
            assert_eq!(ease(out, inn, 1.5, 1.5), 1.0, "out={out} in={inn}");
        }
    }

    #[test]
    fn pieces_join_continuously() {
        let (a, b, d) = (0.4, 0.6, 2.0);
        let eps = 1e-4;
        for knot in [a, d - b] {
            let left = ease(a, b, d, knot - eps);
            let right = ease(a, b, d, knot + eps);
            assert_abs_diff_eq!(left, right, epsilon = 1e-3);
        }
    }

    #[test]
    fn tiny_duration_is_floored() {
        assert_eq!(ease(0.0, 0.0, 0.0, 1.0), 1.0);
        assert_abs_diff_eq!(ease(0.0, 0.0, 0.0, 0.005), 0.5, epsilon = 1e-6);
    }
}
