//! Construction-time errors.
//!
//! Only graph authoring can fail. Playback (`Engine::update` and friends)
//! treats missing references, zero weights and unbound roles as states, not errors.

use crate::ids::{AnimId, LayerId, RoleId, StateId};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("duplicate animation name: {name}")]
    DuplicateAnimation { name: String },

    #[error("duplicate layer name '{name}' in animation {animation:?}")]
    DuplicateLayer { animation: AnimId, name: String },

    #[error("duplicate state name '{name}' in layer {layer:?}")]
    DuplicateState { layer: LayerId, name: String },

    #[error("duplicate message name '{name}' in layer {layer:?}")]
    DuplicateMessage { layer: LayerId, name: String },

    #[error("duplicate role name '{name}' in animation {animation:?}")]
    DuplicateRole { animation: AnimId, name: String },

    #[error("layer {layer:?} already captures '{target}'")]
    DuplicateCapture { layer: LayerId, target: String },

    #[error("unknown animation: {name}")]
    UnknownAnimationName { name: String },

    #[error("unknown animation id {0:?}")]
    UnknownAnimation(AnimId),

    #[error("unknown layer id {0:?}")]
    UnknownLayer(LayerId),

    #[error("unknown state id {0:?}")]
    UnknownState(StateId),

    #[error("unknown role id {0:?}")]
    UnknownRole(RoleId),

    #[error("unknown target state {0:?}")]
    UnknownTargetState(StateId),

    #[error("state {state:?} is not part of layer {layer:?}")]
    StateNotInLayer { layer: LayerId, state: StateId },

    #[error("transition {from:?} -> {to:?} crosses layers within one animation")]
    CrossLayerTransition { from: StateId, to: StateId },

    #[error("sync target layer {layer:?} is outside the destination animation {animation:?}")]
    SyncTargetOutsideAnimation { animation: AnimId, layer: LayerId },

    #[error("role {role:?} does not belong to animation {animation:?}")]
    RoleOutsideAnimation { animation: AnimId, role: RoleId },

    #[error("speed of animation {animation:?} must be finite and non-negative, got {value}")]
    InvalidSpeed { animation: AnimId, value: f32 },

    #[error("probability must be non-negative, got {value}")]
    NegativeProbability { value: f32 },

    #[error("{field} must be non-negative, got {value}")]
    NegativeDuration { field: &'static str, value: f32 },

    #[error("wait range is inverted: min {min} > max {max}")]
    InvalidWaitRange { min: f32, max: f32 },

    #[error("layer {layer:?} already has root state {existing:?}")]
    RootStateExists { layer: LayerId, existing: StateId },

    #[error("a transition takes at most {max} intermediate states, got {count}")]
    TooManyControlPoints { count: usize, max: usize },

    #[error("capture index {index} out of range for layer {layer:?}")]
    CaptureOutOfRange { layer: LayerId, index: usize },
}

pub type GraphResult<T> = Result<T, GraphError>;
