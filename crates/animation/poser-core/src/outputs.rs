//! Output contracts from the core engine.
//!
//! Poses and scalars are written straight to the host during `update`; what
//! comes back is the ordered list of semantic events for this tick.
//! Adapters deliver triggers and messages from here.

use serde::{Deserialize, Serialize};

use crate::graph::TriggerKind;
use crate::ids::{AnimId, LayerId, RoleId, StateId};

/// Discrete signals emitted during stepping, in the order they happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    AnimationActivated {
        animation: AnimId,
        name: String,
    },
    TransitionStarted {
        layer: LayerId,
        from: StateId,
        to: StateId,
        duration: f32,
    },
    StateEntered {
        layer: LayerId,
        state: StateId,
        name: String,
    },
    /// Outgoing weights of the current state sum to zero; the layer holds its pose.
    NoValidTransition {
        layer: LayerId,
        state: StateId,
    },
    TriggerFired {
        layer: LayerId,
        state: StateId,
        kind: TriggerKind,
        trigger: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<String>,
    },
    /// A held trigger's timer ran out.
    TriggerFinished {
        layer: LayerId,
        state: StateId,
        trigger: String,
    },
    /// A transition delivered its message to a bound, accepting role.
    MessageSent {
        role: RoleId,
        recipient: String,
        message: String,
    },
    /// `receive_message` started a transition in this layer.
    MessageAccepted {
        layer: LayerId,
        message: String,
    },
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// True when nothing happened since the last update.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Events raised between two `update` calls, bounded by `max_events_per_tick`.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    events: Vec<CoreEvent>,
    cap: usize,
    dropped: usize,
}

impl EventQueue {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            events: Vec::new(),
            cap,
            dropped: 0,
        }
    }

    pub(crate) fn push(&mut self, event: CoreEvent) {
        if self.events.len() >= self.cap {
            self.dropped += 1;
            return;
        }
        self.events.push(event);
    }

    pub(crate) fn drain_into(&mut self, outputs: &mut Outputs) {
        if self.dropped > 0 {
            log::warn!("dropped {} events over the per-tick cap of {}", self.dropped, self.cap);
            self.dropped = 0;
        }
        outputs.events.append(&mut self.events);
    }
}
