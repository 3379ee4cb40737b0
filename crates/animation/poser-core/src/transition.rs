//! Concrete transitions and weighted selection.
//!
//! A [`Transition`] is built fresh each time a layer starts blending; the
//! persistent edges are the [`TransitionSpec`]s stored on states.

use crate::config::StateTiming;
use crate::graph::{Message, TransitionParams, TransitionSpec};
use crate::ids::{LayerId, RoleId, StateId};
use crate::random::RandomSource;

/// One in-flight blend from `source` to `target`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub source: StateId,
    pub target: StateId,
    pub via: Vec<StateId>,
    pub probability: f32,
    pub duration: f32,
    pub duration_noise: f32,
    pub ease_in: f32,
    pub ease_out: f32,
    pub messages: Vec<(RoleId, String)>,
    pub sync_targets: Vec<(LayerId, StateId)>,
}

impl Transition {
    fn with_params(source: StateId, target: StateId, params: &TransitionParams, defaults: &StateTiming) -> Self {
        Self {
            source,
            target,
            via: params.via.clone(),
            probability: params.probability.unwrap_or(defaults.probability),
            duration: params.duration.unwrap_or(defaults.duration),
            duration_noise: params.duration_noise,
            ease_in: params.ease_in.unwrap_or(defaults.ease_in),
            ease_out: params.ease_out.unwrap_or(defaults.ease_out),
            messages: params.messages.clone(),
            sync_targets: params.sync_targets.clone(),
        }
    }

    /// Instantiate an authored edge; unset parameters come from the target's timing.
    pub fn from_template(source: StateId, spec: &TransitionSpec, target_timing: &StateTiming) -> Self {
        Self::with_params(source, spec.target, &spec.params, target_timing)
    }

    /// Instantiate a message. Role messages are not carried over.
    pub fn from_message(source: StateId, message: &Message, target_timing: &StateTiming) -> Self {
        let mut t = Self::with_params(source, message.target, &message.params, target_timing);
        t.messages.clear();
        t
    }

    /// Un-eased blend used on activation and on arrival in another animation.
    pub fn blend(source: StateId, target: StateId, duration: f32) -> Self {
        Self {
            source,
            target,
            via: Vec::new(),
            probability: 1.0,
            duration,
            duration_noise: 0.0,
            ease_in: 0.0,
            ease_out: 0.0,
            messages: Vec::new(),
            sync_targets: Vec::new(),
        }
    }

    /// Source, intermediates, target.
    pub fn control_points(&self) -> Vec<StateId> {
        let mut points = Vec::with_capacity(self.via.len() + 2);
        points.push(self.source);
        points.extend_from_slice(&self.via);
        points.push(self.target);
        points
    }
}

/// Roulette pick for a draw `r` in `[0, total)`.
///
/// Returns the first index whose running sum reaches `r`. Zero-weight
/// entries are skipped, so they are never chosen while a positive one exists. The last positive
/// entry absorbs float shortfall. `None` when the weights sum to zero.
pub fn pick_index(weights: &[f32], r: f32) -> Option<usize> {
    let mut last_positive = None;
    let mut acc = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        acc += w;
        last_positive = Some(i);
        if r <= acc {
            return Some(i);
        }
    }
    last_positive
}

/// Draw from `rng` and pick by weight.
pub fn select_weighted(weights: &[f32], rng: &mut dyn RandomSource) -> Option<usize> {
    let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    pick_index(weights, rng.range(0.0, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedRandom, SeededRandom};

    #[test]
    fn zero_weights_select_nothing() {
        assert_eq!(pick_index(&[0.0, 0.0], 0.0), None);
        assert_eq!(pick_index(&[], 0.0), None);
        assert_eq!(select_weighted(&[0.0, 0.0, 0.0], &mut SeededRandom::new(1)), None);
    }

    #[test]
    fn single_positive_weight_always_wins() {
        let weights = [0.0, 0.0, 0.0, 2.5];
        for frac in [0.0, 0.3, 0.999, 1.0] {
            assert_eq!(select_weighted(&weights, &mut FixedRandom(frac)), Some(3));
        }
    }

    #[test]
    fn roulette_follows_cumulative_weights() {
        let weights = [1.0, 2.0, 1.0];
        assert_eq!(pick_index(&weights, 0.0), Some(0));
        assert_eq!(pick_index(&weights, 0.99), Some(0));
        assert_eq!(pick_index(&weights, 1.0), Some(0));
        assert_eq!(pick_index(&weights, 1.01), Some(1));
        assert_eq!(pick_index(&weights, 3.0), Some(1));
        assert_eq!(pick_index(&weights, 3.5), Some(2));
        // float shortfall falls back to the last eligible entry
        assert_eq!(pick_index(&weights, 4.0), Some(2));
    }

    #[test]
    fn draw_on_a_boundary_stays_with_the_earlier_entry() {
        assert_eq!(pick_index(&[1.0, 2.0], 1.0), Some(0));
        // range(0, 2) at one half is exactly 1.0
        assert_eq!(select_weighted(&[1.0, 1.0], &mut FixedRandom(0.5)), Some(0));
        assert_eq!(pick_index(&[0.0, 1.0, 1.0], 1.0), Some(1));
    }

    #[test]
    fn template_defaults_come_from_target_timing() {
        let timing = StateTiming {
            duration: 2.0,
            ease_in: 0.3,
            ..StateTiming::default()
        };
        let spec = TransitionSpec {
            target: StateId(1),
            params: TransitionParams::default().with_duration(1.0),
        };
        let t = Transition::from_template(StateId(0), &spec, &timing);
        assert_eq!(t.duration, 1.0);
        assert_eq!(t.ease_in, 0.3);
        assert_eq!(t.probability, 0.5);
        assert_eq!(t.control_points(), vec![StateId(0), StateId(1)]);
    }
}
