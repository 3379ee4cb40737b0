//! Engine: graph ownership, per-layer playback and the public stepping API.
//!
//! Methods:
//! - new, with_random, add_state, capture_state, set_anchor (authoring against live host values)
//! - update (apply inputs → advance every layer of the active animation → drain events)
//! - receive_message, pause/play, inspection helpers

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::anchor::AnchorSpec;
use crate::capture::CaptureCtx;
use crate::config::Config;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Graph, State, TriggerKind};
use crate::host::Host;
use crate::ids::{AnimId, CaptureIdx, LayerId, StateId};
use crate::inputs::{Command, Inputs};
use crate::interp::ease;
use crate::outputs::{CoreEvent, EventQueue, Outputs};
use crate::random::{RandomSource, SeededRandom};
use crate::transition::{select_weighted, Transition};

/// A fired trigger whose hold timer is still running.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PendingTrigger {
    state: StateId,
    name: String,
    remaining: f32,
}

/// Runtime side of a layer: current state, clock and in-flight transition.
#[derive(Clone, Debug)]
pub(crate) struct Playback {
    pub current: Option<StateId>,
    pub transition: Option<Transition>,
    /// Duration noise drawn for the in-flight transition.
    pub noise: f32,
    pub clock: f32,
    /// Wait drawn for the current state.
    pub wait: f32,
    pub no_valid: bool,
    pub pending: Vec<PendingTrigger>,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            current: None,
            transition: None,
            noise: 0.0,
            clock: 0.0,
            wait: 1.0,
            no_valid: false,
            pending: Vec::new(),
        }
    }
}

/// Observable phase of a layer's state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerPhase {
    /// Never activated.
    Inactive,
    /// Waiting in the current state.
    Idle,
    /// Wait elapsed but every outgoing weight is zero.
    NoValidTransition,
    Transitioning,
    Paused,
}

pub struct Engine {
    cfg: Config,
    graph: Graph,
    pub(crate) active: Option<AnimId>,
    paused: bool,
    rng: Box<dyn RandomSource>,
    pub(crate) events: EventQueue,
    outputs: Outputs,
}

fn fire_trigger(
    events: &mut EventQueue,
    playback: &mut Playback,
    layer: LayerId,
    state_id: StateId,
    state: &State,
    kind: TriggerKind,
) {
    let Some(trigger) = state.triggers.get(kind) else {
        return;
    };
    events.push(CoreEvent::TriggerFired {
        layer,
        state: state_id,
        kind,
        trigger: trigger.name.clone(),
        receiver: trigger.receiver.clone(),
    });
    if trigger.hold > 0.0 {
        playback.pending.push(PendingTrigger {
            state: state_id,
            name: trigger.name.clone(),
            remaining: trigger.hold,
        });
    }
}

impl Engine {
    /// Engine with an entropy-seeded random source.
    pub fn new(cfg: Config) -> Self {
        Self::with_random(cfg, Box::new(SeededRandom::from_entropy()))
    }

    pub fn with_random(cfg: Config, rng: Box<dyn RandomSource>) -> Self {
        let events = EventQueue::new(cfg.max_events_per_tick);
        Self {
            cfg,
            graph: Graph::new(),
            active: None,
            paused: false,
            rng,
            events,
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn active_animation(&self) -> Option<AnimId> {
        self.active
    }

    // ---- authoring against live values ---------------------------------

    /// Create a state and capture the live values of every capture in its layer.
    /// New anchored entries copy the anchoring scheme of the layer's current state.
    pub fn add_state(&mut self, layer: LayerId, name: &str, host: &mut dyn Host) -> GraphResult<StateId> {
        let timing = self.cfg.state_defaults.clone();
        let id = self.graph.insert_state(layer, name, timing)?;
        let inherit = self.graph.layers[layer.index()].playback.current;
        self.capture_into(layer, id, inherit, host);
        Ok(id)
    }

    /// Re-capture the live values into an existing state.
    pub fn capture_state(&mut self, state: StateId, host: &mut dyn Host) -> GraphResult<()> {
        let layer = self
            .graph
            .state(state)
            .filter(|s| !s.is_blend)
            .ok_or(GraphError::UnknownState(state))?
            .layer;
        self.capture_into(layer, state, None, host);
        Ok(())
    }

    /// Change how one entry is anchored while keeping its world pose.
    pub fn set_anchor(&mut self, state: StateId, capture: CaptureIdx, spec: &AnchorSpec, host: &dyn Host) -> GraphResult<()> {
        let s = self
            .graph
            .states
            .get_mut(state.index())
            .filter(|s| !s.is_blend)
            .ok_or(GraphError::UnknownState(state))?;
        let layer = s.layer;
        let entry = s
            .control_entry_mut(capture)
            .ok_or(GraphError::CaptureOutOfRange { layer, index: capture })?;
        let world = entry.resolve_instant(host);
        entry.apply_spec(spec);
        if !entry.capture(host, &world) {
            warn!("new anchor for {:?}/{} did not resolve; offset kept", state, capture);
        }
        Ok(())
    }

    fn capture_into(&mut self, layer: LayerId, state: StateId, inherit: Option<StateId>, host: &mut dyn Host) {
        let Graph { layers, states, .. } = &mut self.graph;
        let l = &layers[layer.index()];
        let mut ctx = CaptureCtx {
            states: &mut states[..],
            host: &mut *host,
            cfg: &self.cfg,
        };
        for (i, c) in l.control_captures.iter().enumerate() {
            c.capture_entry(i, state, &l.states, inherit, &mut ctx);
        }
        for (i, m) in l.morph_captures.iter().enumerate() {
            m.capture_entry(i, state, &mut ctx);
        }
    }

    // ---- playback ------------------------------------------------------

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn apply_inputs(&mut self, inputs: Inputs, host: &mut dyn Host) {
        for cmd in inputs.commands {
            match cmd {
                Command::Pause => self.pause(),
                Command::Play => self.play(),
                Command::SetSpeed { animation, speed } => {
                    if let Err(e) = self.graph.set_speed(animation, speed) {
                        warn!("ignoring speed command: {e}");
                    }
                }
                Command::SendMessage { message } => self.receive_message(&message, host),
                Command::SetAnimation { animation } => {
                    if let Err(e) = self.set_animation_by_name(&animation, host) {
                        warn!("ignoring animation switch: {e}");
                    }
                }
            }
        }
    }

    /// Step every layer of the active animation by `dt` seconds.
    /// Poses are written to `host`; the returned events cover everything since the last call.
    pub fn update(&mut self, dt: f32, inputs: Inputs, host: &mut dyn Host) -> &Outputs {
        self.outputs.clear();
        self.apply_inputs(inputs, host);

        if let Some(anim) = self.active {
            let layers = self.graph.animations[anim.index()].layers.clone();
            for layer in layers {
                self.advance_layer(layer, dt, host);
                if self.active != Some(anim) {
                    break;
                }
            }
        }

        self.events.drain_into(&mut self.outputs);
        &self.outputs
    }

    /// `update` without commands.
    pub fn advance(&mut self, dt: f32, host: &mut dyn Host) -> &Outputs {
        self.update(dt, Inputs::default(), host)
    }

    pub(crate) fn advance_layer(&mut self, layer: LayerId, dt: f32, host: &mut dyn Host) {
        let l = &mut self.graph.layers[layer.index()];
        let speed = self.graph.animations[l.animation.index()].speed;
        let pb = &mut l.playback;

        let events = &mut self.events;
        pb.pending.retain_mut(|p| {
            p.remaining -= dt;
            if p.remaining > 0.0 {
                return true;
            }
            events.push(CoreEvent::TriggerFinished {
                layer,
                state: p.state,
                trigger: p.name.clone(),
            });
            false
        });

        if pb.current.is_none() && pb.transition.is_none() {
            return;
        }
        if self.paused && pb.transition.is_none() {
            self.hold_pose(layer, dt, host);
            return;
        }

        pb.clock = (pb.clock + dt * speed).min(self.cfg.clock_limit);

        if pb.clock >= pb.wait && pb.transition.is_none() && !pb.no_valid {
            self.pick_random_transition(layer, host);
        } else if let Some(tr) = &pb.transition {
            let t = ease(tr.ease_out, tr.ease_in, tr.duration, pb.clock - pb.wait);
            let done = pb.clock >= pb.wait + tr.duration + pb.noise;
            self.evaluate_captures(layer, t, dt, host);
            if done {
                self.commit(layer);
            }
        } else {
            self.hold_pose(layer, dt, host);
        }
    }

    fn evaluate_captures(&mut self, layer: LayerId, t: f32, dt: f32, host: &mut dyn Host) {
        let Graph { layers, states, .. } = &mut self.graph;
        let l = &layers[layer.index()];
        let mut ctx = CaptureCtx {
            states: &mut states[..],
            host: &mut *host,
            cfg: &self.cfg,
        };
        for (i, c) in l.control_captures.iter().enumerate() {
            c.evaluate(i, t, dt, &mut ctx);
        }
        for m in &l.morph_captures {
            m.evaluate(t, &mut *ctx.host);
        }
    }

    /// Apply the current state's poses relative to their live anchors.
    fn hold_pose(&mut self, layer: LayerId, dt: f32, host: &mut dyn Host) {
        let Graph { layers, states, .. } = &mut self.graph;
        let l = &layers[layer.index()];
        let Some(current) = l.playback.current else {
            return;
        };
        trace!("layer '{}' holding {:?}", l.name, current);
        let mut ctx = CaptureCtx {
            states: &mut states[..],
            host: &mut *host,
            cfg: &self.cfg,
        };
        for (i, c) in l.control_captures.iter().enumerate() {
            c.apply_static(i, current, dt, &mut ctx);
        }
    }

    /// Weighted pick among the current state's outgoing transitions.
    fn pick_random_transition(&mut self, layer: LayerId, host: &mut dyn Host) {
        let Some(current) = self.graph.layers[layer.index()].playback.current else {
            return;
        };
        let state = &self.graph.states[current.index()];
        let weights: Vec<f32> = state
            .transitions
            .iter()
            .map(|t| self.graph.effective_probability(t))
            .collect();
        match select_weighted(&weights, self.rng.as_mut()) {
            None => {
                debug!("layer {:?}: no valid transition out of '{}'", layer, state.name);
                let pb = &mut self.graph.layers[layer.index()].playback;
                pb.transition = None;
                pb.no_valid = true;
                self.events.push(CoreEvent::NoValidTransition { layer, state: current });
            }
            Some(i) => {
                let target = state.transitions[i].target;
                let Some(spec) = state.incoming_transition_template(target) else {
                    return;
                };
                let transition =
                    Transition::from_template(current, spec, &self.graph.states[target.index()].timing);
                self.set_transition(layer, transition, host);
            }
        }
    }

    /// Start `transition` on `layer`, replacing any in flight. A target in
    /// another animation switches animations instead.
    pub(crate) fn set_transition(&mut self, layer: LayerId, transition: Transition, host: &mut dyn Host) {
        {
            let pb = &mut self.graph.layers[layer.index()].playback;
            pb.no_valid = false;
            pb.clock = 0.0;
        }
        let target_anim = self.graph.states[transition.target.index()].animation;
        if self.active != Some(target_anim) {
            self.transition_to_animation(transition, host);
            return;
        }

        debug!(
            "layer {:?}: {:?} -> {:?} over {}s",
            layer, transition.source, transition.target, transition.duration
        );
        let points = transition.control_points();
        let Graph { layers, states, .. } = &mut self.graph;
        let l = &mut layers[layer.index()];
        {
            let mut ctx = CaptureCtx {
                states: &mut states[..],
                host: &mut *host,
                cfg: &self.cfg,
            };
            for (i, c) in l.control_captures.iter_mut().enumerate() {
                c.set_transition_endpoints(i, &points, &l.states, &mut ctx);
            }
            for (i, m) in l.morph_captures.iter_mut().enumerate() {
                m.set_transition_endpoints(i, &points, &mut ctx);
            }
        }

        let pb = &mut l.playback;
        pb.noise = self
            .rng
            .range(-transition.duration_noise, transition.duration_noise);
        self.events.push(CoreEvent::TransitionStarted {
            layer,
            from: transition.source,
            to: transition.target,
            duration: transition.duration,
        });
        fire_trigger(
            &mut self.events,
            pb,
            layer,
            transition.source,
            &states[transition.source.index()],
            TriggerKind::ExitBegin,
        );
        fire_trigger(
            &mut self.events,
            pb,
            layer,
            transition.target,
            &states[transition.target.index()],
            TriggerKind::EnterBegin,
        );
        pb.transition = Some(transition);
    }

    /// Finish the in-flight transition: enter its target, fire end triggers, deliver role messages.
    fn commit(&mut self, layer: LayerId) {
        let Graph {
            layers,
            states,
            roles,
            ..
        } = &mut self.graph;
        let pb = &mut layers[layer.index()].playback;
        let Some(transition) = pb.transition.take() else {
            return;
        };
        let previous = pb.current;
        let target = &states[transition.target.index()];
        pb.current = Some(transition.target);
        pb.clock = 0.0;
        pb.wait = self.rng.range(target.timing.wait_min, target.timing.wait_max);
        pb.no_valid = false;

        debug!("layer {:?} entered '{}'", layer, target.name);
        self.events.push(CoreEvent::StateEntered {
            layer,
            state: transition.target,
            name: target.name.clone(),
        });
        if let Some(prev) = previous {
            fire_trigger(&mut self.events, pb, layer, prev, &states[prev.index()], TriggerKind::ExitEnd);
        }
        fire_trigger(&mut self.events, pb, layer, transition.target, target, TriggerKind::EnterEnd);

        for (role, message) in &transition.messages {
            match roles.get(role.index()).and_then(|r| r.binding.as_ref()) {
                Some(binding) if binding.accepting => self.events.push(CoreEvent::MessageSent {
                    role: *role,
                    recipient: binding.recipient.clone(),
                    message: message.clone(),
                }),
                _ => trace!("role {:?} unbound or not accepting; '{}' dropped", role, message),
            }
        }
    }

    /// Blend from the current pose into `target`. A layer without a current
    /// state blends from a fresh capture of the live values.
    pub(crate) fn set_blend_transition(&mut self, layer: LayerId, target: StateId, host: &mut dyn Host) {
        let l = &self.graph.layers[layer.index()];
        let speed = self.graph.animations[l.animation.index()].speed;
        let duration = self.cfg.blend_duration_factor * speed;
        let current = l.playback.current;
        let blend = l.blend_state;
        let source = match current {
            Some(current) => current,
            None => {
                self.capture_into(layer, blend, None, host);
                blend
            }
        };
        self.set_transition(layer, Transition::blend(source, target, duration), host);
        let pb = &mut self.graph.layers[layer.index()].playback;
        pb.clock = pb.wait;
    }

    /// Trigger every message named `text` whose source set contains its layer's current state.
    pub fn receive_message(&mut self, text: &str, host: &mut dyn Host) {
        let Some(anim) = self.active else {
            return;
        };
        let mut accepted = Vec::new();
        for layer in self.graph.layers_by_name(anim) {
            let l = &self.graph.layers[layer.index()];
            let Some(current) = l.playback.current else {
                continue;
            };
            for m in l
                .messages
                .iter()
                .filter(|m| m.message == text && m.sources.contains(&current))
            {
                let timing = &self.graph.states[m.target.index()].timing;
                accepted.push((layer, m.name.clone(), Transition::from_message(current, m, timing)));
            }
        }
        if accepted.is_empty() {
            trace!("message '{}' matched nothing", text);
        }
        for (layer, name, transition) in accepted {
            debug!("layer {:?} accepted message '{}'", layer, name);
            self.events.push(CoreEvent::MessageAccepted { layer, message: name });
            self.set_transition(layer, transition, host);
        }
    }

    // ---- inspection ----------------------------------------------------

    pub fn current_state(&self, layer: LayerId) -> Option<StateId> {
        self.graph.layer(layer)?.playback.current
    }

    pub fn current_state_name(&self, layer: LayerId) -> Option<&str> {
        let state = self.current_state(layer)?;
        self.graph.state(state).map(|s| s.name.as_str())
    }

    pub fn current_animation_name(&self) -> Option<&str> {
        self.graph.animation(self.active?).map(|a| a.name.as_str())
    }

    pub fn layer_phase(&self, layer: LayerId) -> Option<LayerPhase> {
        let pb = &self.graph.layer(layer)?.playback;
        Some(if pb.current.is_none() && pb.transition.is_none() {
            LayerPhase::Inactive
        } else if pb.transition.is_some() {
            LayerPhase::Transitioning
        } else if self.paused {
            LayerPhase::Paused
        } else if pb.no_valid {
            LayerPhase::NoValidTransition
        } else {
            LayerPhase::Idle
        })
    }

    pub fn clock(&self, layer: LayerId) -> Option<f32> {
        Some(self.graph.layer(layer)?.playback.clock)
    }

    pub fn wait_duration(&self, layer: LayerId) -> Option<f32> {
        Some(self.graph.layer(layer)?.playback.wait)
    }

    pub fn in_flight(&self, layer: LayerId) -> Option<&Transition> {
        self.graph.layer(layer)?.playback.transition.as_ref()
    }

    pub fn pending_triggers(&self, layer: LayerId) -> usize {
        self.graph
            .layer(layer)
            .map_or(0, |l| l.playback.pending.len())
    }
}
