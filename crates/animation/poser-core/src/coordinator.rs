//! Animation switching.
//!
//! Only the active animation's layers are stepped. Activating an animation
//! blends each of its layers, in name order, into its first state by name.
//! A transition whose target lives in another animation activates that
//! animation and then blends the target layer and every sync-target layer
//! into their requested states.

use log::{debug, warn};

use crate::engine::Engine;
use crate::error::{GraphError, GraphResult};
use crate::host::Host;
use crate::ids::{AnimId, LayerId, StateId};
use crate::outputs::CoreEvent;
use crate::transition::Transition;

impl Engine {
    pub fn set_animation(&mut self, animation: AnimId, host: &mut dyn Host) -> GraphResult<()> {
        if self.graph().animation(animation).is_none() {
            return Err(GraphError::UnknownAnimation(animation));
        }
        self.activate_animation(animation, host);
        Ok(())
    }

    pub fn set_animation_by_name(&mut self, name: &str, host: &mut dyn Host) -> GraphResult<AnimId> {
        let animation = self
            .graph()
            .animation_by_name(name)
            .ok_or_else(|| GraphError::UnknownAnimationName {
                name: name.to_string(),
            })?;
        self.activate_animation(animation, host);
        Ok(animation)
    }

    fn activate_animation(&mut self, animation: AnimId, host: &mut dyn Host) {
        self.active = Some(animation);
        let name = self
            .graph()
            .animation(animation)
            .map(|a| a.name.clone())
            .unwrap_or_default();
        debug!("activating animation '{}'", name);
        self.events.push(CoreEvent::AnimationActivated { animation, name });
        for layer in self.graph().layers_by_name(animation) {
            self.activate_layer(layer, host);
        }
    }

    /// Blend `layer` into its lexicographically first state. Layers without states stay inactive.
    fn activate_layer(&mut self, layer: LayerId, host: &mut dyn Host) {
        if let Some(first) = self.graph().first_state_by_name(layer) {
            self.set_blend_transition(layer, first, host);
        }
    }

    pub(crate) fn transition_to_animation(&mut self, transition: Transition, host: &mut dyn Host) {
        let Some(target) = self.graph().state(transition.target) else {
            return;
        };
        let (animation, layer) = (target.animation, target.layer);
        self.activate_animation(animation, host);
        self.arrive(layer, transition.target, host);
        for (sync_layer, sync_state) in transition.sync_targets {
            let in_animation = self
                .graph()
                .layer(sync_layer)
                .is_some_and(|l| l.animation == animation);
            if !in_animation {
                warn!("sync target {:?} is outside animation {:?}; skipped", sync_layer, animation);
                continue;
            }
            self.arrive(sync_layer, sync_state, host);
        }
    }

    fn arrive(&mut self, layer: LayerId, state: StateId, host: &mut dyn Host) {
        self.set_blend_transition(layer, state, host);
    }
}
