//! Poser Core (engine-agnostic)
//!
//! Layered state-machine pose blending. An [`Engine`] owns a [`Graph`] of
//! animations, layers and states; each tick it advances every layer of the
//! active animation, blending captured poses and scalars between states and
//! writing them to a [`Host`]. Triggers and role messages come back as
//! [`CoreEvent`]s in [`Outputs`].

pub mod anchor;
pub mod capture;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod graph;
pub mod host;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod outputs;
pub mod pose;
pub mod random;
pub mod transition;

// Re-exports for consumers (adapters)
pub use anchor::{rebase_offset, AnchorMode, AnchorRef, AnchorSpec, AnchoredEntry};
pub use capture::{ControlCapture, MorphCapture};
pub use config::{AnchorDefaults, Config, OwnerCfg, StateTiming};
pub use engine::{Engine, LayerPhase};
pub use error::{GraphError, GraphResult};
pub use graph::{
    Animation, Graph, Layer, Message, Role, RoleBinding, State, StateTriggers, Trigger, TriggerKind,
    TransitionParams, TransitionSpec,
};
pub use host::{Host, PoseSource, ReferenceResolver, ScalarSource, Scene};
pub use ids::{AnimId, CaptureIdx, LayerId, RoleId, StateId};
pub use inputs::{Command, Inputs};
pub use interp::{arc_length_parametrization, bezier_pose, ease};
pub use outputs::{CoreEvent, Outputs};
pub use pose::Pose;
pub use random::{FixedRandom, RandomSource, SeededRandom};
pub use transition::{pick_index, select_weighted, Transition};
