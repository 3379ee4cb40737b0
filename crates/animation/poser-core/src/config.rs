//! Core configuration for poser-core.

use serde::{Deserialize, Serialize};

/// Engine-wide tuning and authoring defaults.
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Timing assigned to newly created states.
    pub state_defaults: StateTiming,
    /// Anchor parameters assigned to newly created anchored entries.
    pub anchor_defaults: AnchorDefaults,
    /// Blend-in length on activation and animation switches, multiplied by the animation speed.
    pub blend_duration_factor: f32,
    /// Upper bound of a layer clock.
    pub clock_limit: f32,
    /// Remap blend progress by distance travelled (only affects curves with 3+ control poses).
    pub arc_length_parametrization: bool,
    /// Maximum events buffered between two `Engine::update` calls.
    pub max_events_per_tick: usize,
    /// The object whose controls this engine drives.
    pub owner: OwnerCfg,
}

/// Per-state timing and selection weight. Also the defaults for transitions
/// into the state that do not override them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateTiming {
    pub wait_min: f32,
    pub wait_max: f32,
    pub duration: f32,
    pub ease_in: f32,
    pub ease_out: f32,
    pub probability: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnchorDefaults {
    pub blend_ratio: f32,
    pub damping_time: f32,
    /// Damping times below this snap straight to the anchored pose.
    pub damping_threshold: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OwnerCfg {
    /// Atom id used as the default anchor reference.
    pub id: String,
    /// Person-like owners anchor their controls to themselves by default.
    pub person_like: bool,
    /// The owner's root control; it is never anchored by default.
    pub root_control: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_defaults: StateTiming::default(),
            anchor_defaults: AnchorDefaults::default(),
            blend_duration_factor: 0.1,
            clock_limit: 100_000.0,
            arc_length_parametrization: false,
            max_events_per_tick: 1024,
            owner: OwnerCfg::default(),
        }
    }
}

impl Default for StateTiming {
    fn default() -> Self {
        Self {
            wait_min: 0.0,
            wait_max: 0.0,
            duration: 0.5,
            ease_in: 0.0,
            ease_out: 0.0,
            probability: 0.5,
        }
    }
}

impl Default for AnchorDefaults {
    fn default() -> Self {
        Self {
            blend_ratio: 0.5,
            damping_time: 0.2,
            damping_threshold: 0.001,
        }
    }
}

impl Default for OwnerCfg {
    fn default() -> Self {
        Self {
            id: "owner".to_string(),
            person_like: true,
            root_control: "control".to_string(),
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json_str(
            r#"{ "blend_duration_factor": 0.25, "state_defaults": { "wait_max": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.blend_duration_factor, 0.25);
        assert_eq!(cfg.state_defaults.wait_max, 3.0);
        assert_eq!(cfg.state_defaults.duration, 0.5);
        assert_eq!(cfg.owner.root_control, "control");
        assert_eq!(cfg.clock_limit, 100_000.0);
    }
}
