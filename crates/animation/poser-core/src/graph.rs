//! Animation graph: animations own layers, layers own states, messages and
//! captures. Everything lives in flat arenas inside [`Graph`]; children point
//! back at their parents by id.
//!
//! All mutators validate their input and return [`GraphError`] on bad
//! configuration, so a graph that was built successfully can be played back
//! without further checks.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::anchor::AnchoredEntry;
use crate::capture::{ControlCapture, MorphCapture};
use crate::config::StateTiming;
use crate::engine::Playback;
use crate::error::{GraphError, GraphResult};
use crate::ids::{AnimId, CaptureIdx, LayerId, RoleId, StateId};
use crate::interp::MAX_CONTROL_POINTS;

/// Lifecycle points at which a state fires its triggers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    EnterBegin,
    EnterEnd,
    ExitBegin,
    ExitEnd,
}

/// Opaque host trigger. A positive `hold` keeps it pending for that many
/// seconds after firing, after which a `TriggerFinished` event is emitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    #[serde(default)]
    pub hold: f32,
    /// Atom the host delivers this trigger to, if any.
    #[serde(default)]
    pub receiver: Option<String>,
}

impl Trigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hold: 0.0,
            receiver: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateTriggers {
    pub enter_begin: Option<Trigger>,
    pub enter_end: Option<Trigger>,
    pub exit_begin: Option<Trigger>,
    pub exit_end: Option<Trigger>,
}

impl StateTriggers {
    pub fn get(&self, kind: TriggerKind) -> Option<&Trigger> {
        match kind {
            TriggerKind::EnterBegin => self.enter_begin.as_ref(),
            TriggerKind::EnterEnd => self.enter_end.as_ref(),
            TriggerKind::ExitBegin => self.exit_begin.as_ref(),
            TriggerKind::ExitEnd => self.exit_end.as_ref(),
        }
    }

    fn slot(&mut self, kind: TriggerKind) -> &mut Option<Trigger> {
        match kind {
            TriggerKind::EnterBegin => &mut self.enter_begin,
            TriggerKind::EnterEnd => &mut self.enter_end,
            TriggerKind::ExitBegin => &mut self.exit_begin,
            TriggerKind::ExitEnd => &mut self.exit_end,
        }
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Trigger> {
        [
            &mut self.enter_begin,
            &mut self.enter_end,
            &mut self.exit_begin,
            &mut self.exit_end,
        ]
        .into_iter()
        .flatten()
    }
}

/// Transition parameters. `None` falls back to the target state's defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionParams {
    pub probability: Option<f32>,
    pub duration: Option<f32>,
    /// Half-width of the uniform noise added to the duration.
    pub duration_noise: f32,
    pub ease_in: Option<f32>,
    pub ease_out: Option<f32>,
    /// Intermediate states whose poses bend the blend into a Bézier curve.
    pub via: Vec<StateId>,
    /// Messages delivered to bound roles when the transition completes.
    pub messages: Vec<(RoleId, String)>,
    /// Layers that jump along when this transition switches animations.
    pub sync_targets: Vec<(LayerId, StateId)>,
}

impl TransitionParams {
    pub fn with_probability(mut self, p: f32) -> Self {
        self.probability = Some(p);
        self
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_noise(mut self, seconds: f32) -> Self {
        self.duration_noise = seconds;
        self
    }

    pub fn with_easing(mut self, ease_out: f32, ease_in: f32) -> Self {
        self.ease_out = Some(ease_out);
        self.ease_in = Some(ease_in);
        self
    }

    pub fn with_via(mut self, state: StateId) -> Self {
        self.via.push(state);
        self
    }

    pub fn with_message(mut self, role: RoleId, message: impl Into<String>) -> Self {
        self.messages.push((role, message.into()));
        self
    }

    pub fn with_sync_target(mut self, layer: LayerId, state: StateId) -> Self {
        self.sync_targets.push((layer, state));
        self
    }
}

/// Authored outgoing edge of a state.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionSpec {
    pub target: StateId,
    pub params: TransitionParams,
}

/// Externally triggerable transition, valid only from its source states.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub name: String,
    /// Text matched by `Engine::receive_message`.
    pub message: String,
    pub sources: Vec<StateId>,
    pub target: StateId,
    pub params: TransitionParams,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleBinding {
    pub recipient: String,
    pub accepting: bool,
}

/// Named slot bound at runtime to another engine's owner.
#[derive(Clone, Debug, PartialEq)]
pub struct Role {
    pub name: String,
    pub animation: AnimId,
    pub binding: Option<RoleBinding>,
}

#[derive(Debug)]
pub struct Animation {
    pub name: String,
    /// Playback speed multiplier for all of this animation's layers.
    pub speed: f32,
    pub(crate) layers: Vec<LayerId>,
    pub(crate) roles: Vec<RoleId>,
    layer_names: HashMap<String, LayerId>,
    role_names: HashMap<String, RoleId>,
}

impl Animation {
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    pub fn roles(&self) -> &[RoleId] {
        &self.roles
    }
}

/// Independent state machine inside an animation.
#[derive(Debug)]
pub struct Layer {
    pub name: String,
    pub animation: AnimId,
    /// Authored states in creation order.
    pub(crate) states: Vec<StateId>,
    state_names: HashMap<String, StateId>,
    pub(crate) messages: Vec<Message>,
    pub(crate) control_captures: Vec<ControlCapture>,
    pub(crate) morph_captures: Vec<MorphCapture>,
    /// Synthetic origin for blends when the layer has no current state.
    pub(crate) blend_state: StateId,
    pub(crate) playback: Playback,
}

impl Layer {
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn control_captures(&self) -> &[ControlCapture] {
        &self.control_captures
    }

    pub fn morph_captures(&self) -> &[MorphCapture] {
        &self.morph_captures
    }

    pub fn root_state(&self, states: &[State]) -> Option<StateId> {
        self.states
            .iter()
            .copied()
            .find(|s| states[s.index()].is_root)
    }
}

/// Authored pose snapshot with timing defaults and outgoing transitions.
#[derive(Clone, Debug)]
pub struct State {
    pub name: String,
    pub animation: AnimId,
    pub layer: LayerId,
    pub timing: StateTiming,
    pub is_root: bool,
    pub triggers: StateTriggers,
    pub transitions: Vec<TransitionSpec>,
    pub(crate) is_blend: bool,
    pub(crate) control_entries: Vec<Option<AnchoredEntry>>,
    pub(crate) morph_entries: Vec<Option<f32>>,
}

impl State {
    fn new(name: String, animation: AnimId, layer: LayerId, timing: StateTiming) -> Self {
        Self {
            name,
            animation,
            layer,
            timing,
            is_root: false,
            triggers: StateTriggers::default(),
            transitions: Vec::new(),
            is_blend: false,
            control_entries: Vec::new(),
            morph_entries: Vec::new(),
        }
    }

    /// Targets of the outgoing transitions, in authored order (duplicates kept).
    pub fn reachable_states(&self) -> Vec<StateId> {
        self.transitions.iter().map(|t| t.target).collect()
    }

    pub fn is_reachable(&self, target: StateId) -> bool {
        self.transitions.iter().any(|t| t.target == target)
    }

    /// First authored transition into `target`.
    pub fn incoming_transition_template(&self, target: StateId) -> Option<&TransitionSpec> {
        self.transitions.iter().find(|t| t.target == target)
    }

    pub fn control_entry(&self, capture: CaptureIdx) -> Option<&AnchoredEntry> {
        self.control_entries.get(capture).and_then(Option::as_ref)
    }

    pub(crate) fn control_entry_mut(&mut self, capture: CaptureIdx) -> Option<&mut AnchoredEntry> {
        self.control_entries.get_mut(capture).and_then(Option::as_mut)
    }

    pub(crate) fn insert_control_entry(&mut self, capture: CaptureIdx, entry: AnchoredEntry) {
        if self.control_entries.len() <= capture {
            self.control_entries.resize(capture + 1, None);
        }
        self.control_entries[capture] = Some(entry);
    }

    pub fn morph_value(&self, capture: CaptureIdx) -> Option<f32> {
        self.morph_entries.get(capture).copied().flatten()
    }

    pub(crate) fn set_morph_value(&mut self, capture: CaptureIdx, value: f32) {
        if self.morph_entries.len() <= capture {
            self.morph_entries.resize(capture + 1, None);
        }
        self.morph_entries[capture] = Some(value);
    }
}

/// Arena of every animation, layer, state and role.
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) animations: Vec<Animation>,
    animation_names: HashMap<String, AnimId>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) states: Vec<State>,
    pub(crate) roles: Vec<Role>,
}

fn check_non_negative(field: &'static str, value: f32) -> GraphResult<()> {
    if value < 0.0 {
        return Err(GraphError::NegativeDuration { field, value });
    }
    Ok(())
}

fn check_timing(timing: &StateTiming) -> GraphResult<()> {
    check_non_negative("wait_min", timing.wait_min)?;
    check_non_negative("wait_max", timing.wait_max)?;
    check_non_negative("duration", timing.duration)?;
    check_non_negative("ease_in", timing.ease_in)?;
    check_non_negative("ease_out", timing.ease_out)?;
    if timing.probability < 0.0 {
        return Err(GraphError::NegativeProbability {
            value: timing.probability,
        });
    }
    if timing.wait_min > timing.wait_max {
        return Err(GraphError::InvalidWaitRange {
            min: timing.wait_min,
            max: timing.wait_max,
        });
    }
    Ok(())
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- lookups -------------------------------------------------------

    pub fn animation(&self, id: AnimId) -> Option<&Animation> {
        self.animations.get(id.index())
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.index())
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.get(id.index())
    }

    pub fn animation_by_name(&self, name: &str) -> Option<AnimId> {
        self.animation_names.get(name).copied()
    }

    pub fn layer_by_name(&self, animation: AnimId, name: &str) -> Option<LayerId> {
        self.animation(animation)?.layer_names.get(name).copied()
    }

    pub fn state_by_name(&self, layer: LayerId, name: &str) -> Option<StateId> {
        self.layer(layer)?.state_names.get(name).copied()
    }

    pub fn role_by_name(&self, animation: AnimId, name: &str) -> Option<RoleId> {
        self.animation(animation)?.role_names.get(name).copied()
    }

    /// Layers of `animation` in lexicographic name order.
    pub fn layers_by_name(&self, animation: AnimId) -> Vec<LayerId> {
        let Some(anim) = self.animation(animation) else {
            return Vec::new();
        };
        let mut layers = anim.layers.clone();
        layers.sort_by(|a, b| self.layers[a.index()].name.cmp(&self.layers[b.index()].name));
        layers
    }

    /// The lexicographically first authored state of `layer`.
    pub fn first_state_by_name(&self, layer: LayerId) -> Option<StateId> {
        self.layer(layer)?
            .states
            .iter()
            .copied()
            .min_by(|a, b| self.states[a.index()].name.cmp(&self.states[b.index()].name))
    }

    pub fn reachable_states(&self, state: StateId) -> Vec<StateId> {
        self.state(state)
            .map(State::reachable_states)
            .unwrap_or_default()
    }

    pub fn incoming_transition_template(&self, state: StateId, target: StateId) -> Option<&TransitionSpec> {
        self.state(state)?.incoming_transition_template(target)
    }

    pub fn is_reachable(&self, state: StateId, target: StateId) -> bool {
        self.state(state).is_some_and(|s| s.is_reachable(target))
    }

    /// Selection weight of an outgoing edge.
    pub fn effective_probability(&self, spec: &TransitionSpec) -> f32 {
        spec.params
            .probability
            .unwrap_or(self.states[spec.target.index()].timing.probability)
    }

    fn authored_state(&self, id: StateId) -> GraphResult<&State> {
        match self.state(id) {
            Some(s) if !s.is_blend => Ok(s),
            _ => Err(GraphError::UnknownState(id)),
        }
    }

    fn layer_mut(&mut self, id: LayerId) -> GraphResult<&mut Layer> {
        self.layers
            .get_mut(id.index())
            .ok_or(GraphError::UnknownLayer(id))
    }

    fn state_mut(&mut self, id: StateId) -> GraphResult<&mut State> {
        match self.states.get_mut(id.index()) {
            Some(s) if !s.is_blend => Ok(s),
            _ => Err(GraphError::UnknownState(id)),
        }
    }

    // ---- construction --------------------------------------------------

    pub fn add_animation(&mut self, name: &str) -> GraphResult<AnimId> {
        if self.animation_names.contains_key(name) {
            return Err(GraphError::DuplicateAnimation {
                name: name.to_string(),
            });
        }
        let id = AnimId::from_index(self.animations.len());
        self.animations.push(Animation {
            name: name.to_string(),
            speed: 1.0,
            layers: Vec::new(),
            roles: Vec::new(),
            layer_names: HashMap::new(),
            role_names: HashMap::new(),
        });
        self.animation_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn add_layer(&mut self, animation: AnimId, name: &str) -> GraphResult<LayerId> {
        let anim = self
            .animations
            .get(animation.index())
            .ok_or(GraphError::UnknownAnimation(animation))?;
        if anim.layer_names.contains_key(name) {
            return Err(GraphError::DuplicateLayer {
                animation,
                name: name.to_string(),
            });
        }
        let id = LayerId::from_index(self.layers.len());
        let blend_state = StateId::from_index(self.states.len());
        let mut blend = State::new("BlendState".to_string(), animation, id, StateTiming::default());
        blend.is_blend = true;
        self.states.push(blend);
        self.layers.push(Layer {
            name: name.to_string(),
            animation,
            states: Vec::new(),
            state_names: HashMap::new(),
            messages: Vec::new(),
            control_captures: Vec::new(),
            morph_captures: Vec::new(),
            blend_state,
            playback: Playback::default(),
        });
        let anim = &mut self.animations[animation.index()];
        anim.layers.push(id);
        anim.layer_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn add_role(&mut self, animation: AnimId, name: &str) -> GraphResult<RoleId> {
        let anim = self
            .animations
            .get(animation.index())
            .ok_or(GraphError::UnknownAnimation(animation))?;
        if anim.role_names.contains_key(name) {
            return Err(GraphError::DuplicateRole {
                animation,
                name: name.to_string(),
            });
        }
        let id = RoleId::from_index(self.roles.len());
        self.roles.push(Role {
            name: name.to_string(),
            animation,
            binding: None,
        });
        let anim = &mut self.animations[animation.index()];
        anim.roles.push(id);
        anim.role_names.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn set_speed(&mut self, animation: AnimId, speed: f32) -> GraphResult<()> {
        let anim = self
            .animations
            .get_mut(animation.index())
            .ok_or(GraphError::UnknownAnimation(animation))?;
        if !speed.is_finite() || speed < 0.0 {
            return Err(GraphError::InvalidSpeed {
                animation,
                value: speed,
            });
        }
        anim.speed = speed;
        Ok(())
    }

    pub fn add_control_capture(&mut self, layer: LayerId, target: &str) -> GraphResult<CaptureIdx> {
        let l = self.layer_mut(layer)?;
        if l.control_captures.iter().any(|c| c.target == target) {
            return Err(GraphError::DuplicateCapture {
                layer,
                target: target.to_string(),
            });
        }
        l.control_captures.push(ControlCapture::new(target));
        Ok(l.control_captures.len() - 1)
    }

    pub fn add_morph_capture(&mut self, layer: LayerId, id: &str) -> GraphResult<CaptureIdx> {
        let l = self.layer_mut(layer)?;
        if l.morph_captures.iter().any(|c| c.id == id) {
            return Err(GraphError::DuplicateCapture {
                layer,
                target: id.to_string(),
            });
        }
        l.morph_captures.push(MorphCapture::new(id));
        Ok(l.morph_captures.len() - 1)
    }

    pub fn control_capture_mut(&mut self, layer: LayerId, index: CaptureIdx) -> GraphResult<&mut ControlCapture> {
        self.layer_mut(layer)?
            .control_captures
            .get_mut(index)
            .ok_or(GraphError::CaptureOutOfRange { layer, index })
    }

    pub fn morph_capture_mut(&mut self, layer: LayerId, index: CaptureIdx) -> GraphResult<&mut MorphCapture> {
        self.layer_mut(layer)?
            .morph_captures
            .get_mut(index)
            .ok_or(GraphError::CaptureOutOfRange { layer, index })
    }

    /// Register a state without capturing anything into it.
    pub(crate) fn insert_state(&mut self, layer: LayerId, name: &str, timing: StateTiming) -> GraphResult<StateId> {
        check_timing(&timing)?;
        let id = StateId::from_index(self.states.len());
        let l = self.layer_mut(layer)?;
        if l.state_names.contains_key(name) {
            return Err(GraphError::DuplicateState {
                layer,
                name: name.to_string(),
            });
        }
        l.states.push(id);
        l.state_names.insert(name.to_string(), id);
        let animation = l.animation;
        self.states
            .push(State::new(name.to_string(), animation, layer, timing));
        Ok(id)
    }

    pub fn set_state_timing(&mut self, state: StateId, timing: StateTiming) -> GraphResult<()> {
        check_timing(&timing)?;
        self.state_mut(state)?.timing = timing;
        self.graph_changed();
        Ok(())
    }

    /// Mark or unmark the layer's root state. A layer has at most one.
    pub fn set_root_state(&mut self, state: StateId, is_root: bool) -> GraphResult<()> {
        let layer = self.authored_state(state)?.layer;
        if is_root {
            if let Some(existing) = self.layers[layer.index()].root_state(&self.states) {
                if existing != state {
                    return Err(GraphError::RootStateExists { layer, existing });
                }
            }
        }
        self.states[state.index()].is_root = is_root;
        Ok(())
    }

    pub fn set_trigger(&mut self, state: StateId, kind: TriggerKind, trigger: Option<Trigger>) -> GraphResult<()> {
        if let Some(t) = &trigger {
            check_non_negative("trigger hold", t.hold)?;
        }
        *self.state_mut(state)?.triggers.slot(kind) = trigger;
        Ok(())
    }

    fn check_params(&self, source_anim: AnimId, target: StateId, params: &TransitionParams) -> GraphResult<()> {
        if let Some(p) = params.probability {
            if p < 0.0 {
                return Err(GraphError::NegativeProbability { value: p });
            }
        }
        for (field, value) in [
            ("duration", params.duration),
            ("ease_in", params.ease_in),
            ("ease_out", params.ease_out),
            ("duration_noise", Some(params.duration_noise)),
        ] {
            if let Some(v) = value {
                check_non_negative(field, v)?;
            }
        }
        let target_state = self
            .authored_state(target)
            .map_err(|_| GraphError::UnknownTargetState(target))?;
        let target_anim = target_state.animation;
        let max = MAX_CONTROL_POINTS - 2;
        if params.via.len() > max {
            return Err(GraphError::TooManyControlPoints {
                count: params.via.len(),
                max,
            });
        }
        for &v in &params.via {
            let layer = target_state.layer;
            match self.authored_state(v) {
                Ok(s) if s.layer == layer => {}
                _ => return Err(GraphError::StateNotInLayer { layer, state: v }),
            }
        }
        for &(layer, state) in &params.sync_targets {
            let l = self.layer(layer).ok_or(GraphError::UnknownLayer(layer))?;
            if l.animation != target_anim {
                return Err(GraphError::SyncTargetOutsideAnimation {
                    animation: target_anim,
                    layer,
                });
            }
            if !l.states.contains(&state) {
                return Err(GraphError::StateNotInLayer { layer, state });
            }
        }
        for (role, _) in &params.messages {
            let r = self.role(*role).ok_or(GraphError::UnknownRole(*role))?;
            if r.animation != source_anim {
                return Err(GraphError::RoleOutsideAnimation {
                    animation: source_anim,
                    role: *role,
                });
            }
        }
        Ok(())
    }

    /// Transitions stay inside one layer unless they jump to another animation.
    fn check_edge(&self, from: &State, from_id: StateId, to: StateId) -> GraphResult<()> {
        let target = self
            .authored_state(to)
            .map_err(|_| GraphError::UnknownTargetState(to))?;
        if target.animation == from.animation && target.layer != from.layer {
            return Err(GraphError::CrossLayerTransition { from: from_id, to });
        }
        Ok(())
    }

    pub fn add_transition(&mut self, from: StateId, to: StateId, params: TransitionParams) -> GraphResult<()> {
        let source = self.authored_state(from)?;
        self.check_edge(source, from, to)?;
        self.check_params(source.animation, to, &params)?;
        self.states[from.index()]
            .transitions
            .push(TransitionSpec { target: to, params });
        self.graph_changed();
        Ok(())
    }

    /// Layers stalled on zero weights get another selection attempt.
    fn graph_changed(&mut self) {
        for layer in &mut self.layers {
            layer.playback.no_valid = false;
        }
    }

    /// Remove every outgoing transition of `from` that targets `to`; returns how many went.
    pub fn remove_transitions_to(&mut self, from: StateId, to: StateId) -> GraphResult<usize> {
        let state = self.state_mut(from)?;
        let before = state.transitions.len();
        state.transitions.retain(|t| t.target != to);
        Ok(before - state.transitions.len())
    }

    pub fn add_message(
        &mut self,
        layer: LayerId,
        name: &str,
        message: &str,
        sources: &[StateId],
        target: StateId,
        params: TransitionParams,
    ) -> GraphResult<()> {
        let l = self.layer(layer).ok_or(GraphError::UnknownLayer(layer))?;
        if l.messages.iter().any(|m| m.name == name) {
            return Err(GraphError::DuplicateMessage {
                layer,
                name: name.to_string(),
            });
        }
        for &s in sources {
            if !l.states.contains(&s) {
                return Err(GraphError::StateNotInLayer { layer, state: s });
            }
        }
        let animation = l.animation;
        let target_state = self
            .authored_state(target)
            .map_err(|_| GraphError::UnknownTargetState(target))?;
        if target_state.animation == animation && target_state.layer != layer {
            return Err(GraphError::StateNotInLayer {
                layer,
                state: target,
            });
        }
        self.check_params(animation, target, &params)?;
        self.layers[layer.index()].messages.push(Message {
            name: name.to_string(),
            message: message.to_string(),
            sources: sources.to_vec(),
            target,
            params,
        });
        Ok(())
    }

    pub fn bind_role(&mut self, role: RoleId, recipient: &str, accepting: bool) -> GraphResult<()> {
        let r = self
            .roles
            .get_mut(role.index())
            .ok_or(GraphError::UnknownRole(role))?;
        r.binding = Some(RoleBinding {
            recipient: recipient.to_string(),
            accepting,
        });
        Ok(())
    }

    pub fn unbind_role(&mut self, role: RoleId) -> GraphResult<()> {
        self.roles
            .get_mut(role.index())
            .ok_or(GraphError::UnknownRole(role))?
            .binding = None;
        Ok(())
    }

    /// Copy timing, triggers and captured data of `source` into a new state of the same layer.
    /// Outgoing transitions and the root flag are not copied.
    pub fn duplicate_state(&mut self, source: StateId, name: &str) -> GraphResult<StateId> {
        let src = self.authored_state(source)?.clone();
        let id = self.insert_state(src.layer, name, src.timing)?;
        let dup = &mut self.states[id.index()];
        dup.triggers = src.triggers;
        dup.control_entries = src.control_entries;
        dup.morph_entries = src.morph_entries;
        Ok(id)
    }

    /// Point anchor references and trigger receivers at a renamed atom.
    pub fn rename_atom(&mut self, old: &str, new: &str) {
        for state in &mut self.states {
            for entry in state.control_entries.iter_mut().flatten() {
                entry.rename_atom(old, new);
            }
            for trigger in state.triggers.iter_mut() {
                if trigger.receiver.as_deref() == Some(old) {
                    trigger.receiver = Some(new.to_string());
                }
            }
        }
    }
}
