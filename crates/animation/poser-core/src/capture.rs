//! Captures: accessors bound to one host target that record per-state values
//! and write blended values back during playback.
//!
//! A capture never owns state data. Entries live on [`State`] in the slot
//! matching the capture's index within its layer.

use log::{trace, warn};

use crate::anchor::{rebase_offset, AnchorMode, AnchoredEntry};
use crate::config::Config;
use crate::graph::State;
use crate::host::{Host, PoseSource, ScalarSource};
use crate::ids::{CaptureIdx, StateId};
use crate::interp::{arc_length_parametrization, bezier_pose, bezier_scalar, MAX_CONTROL_POINTS};
use crate::pose::Pose;

/// Disjoint borrows a capture needs while recording or applying values.
pub(crate) struct CaptureCtx<'a> {
    pub states: &'a mut [State],
    pub host: &'a mut dyn Host,
    pub cfg: &'a Config,
}

/// Position/orientation capture of one named control.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlCapture {
    pub target: String,
    pub apply_position: bool,
    pub apply_rotation: bool,
    /// Control states of the transition in flight.
    endpoints: Vec<StateId>,
}

impl ControlCapture {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            apply_position: true,
            apply_rotation: true,
            endpoints: Vec::new(),
        }
    }

    /// Whether the host currently exposes this capture's target.
    pub fn is_valid<H: PoseSource + ?Sized>(&self, host: &H) -> bool {
        host.live_pose(&self.target).is_some()
    }

    pub fn endpoints(&self) -> &[StateId] {
        &self.endpoints
    }

    /// Record the live pose into `state`, creating its entry if missing.
    ///
    /// A new entry copies the anchoring scheme of `inherit`'s entry when given.
    /// Re-capturing an existing entry of the layer's root state moves every
    /// sibling's offset by the same delta.
    pub(crate) fn capture_entry(
        &self,
        idx: CaptureIdx,
        state: StateId,
        siblings: &[StateId],
        inherit: Option<StateId>,
        ctx: &mut CaptureCtx<'_>,
    ) {
        let Some(live) = ctx.host.live_pose(&self.target) else {
            warn!("capture target '{}' is not available; state {:?} left unchanged", self.target, state);
            return;
        };
        let template = inherit.and_then(|s| ctx.states[s.index()].control_entry(idx).cloned());
        let st = &mut ctx.states[state.index()];
        let is_root = st.is_root;
        let existed = st.control_entry(idx).is_some();
        if !existed {
            let mode = AnchorMode::default_for(&ctx.cfg.owner, &self.target);
            let mut entry = AnchoredEntry::new(mode, &ctx.cfg.owner, &ctx.cfg.anchor_defaults);
            if let Some(t) = &template {
                entry.inherit_anchoring(t);
            }
            entry.set_current(live);
            st.insert_control_entry(idx, entry);
        }
        let Some(entry) = st.control_entry_mut(idx) else {
            return;
        };
        let old = entry.offset();
        let Some(new) = entry.offset_for(&*ctx.host, &live) else {
            warn!("anchor of '{}' did not resolve; offset of {:?} kept", self.target, state);
            return;
        };
        entry.set_offset(new);

        if is_root && existed {
            for &sibling in siblings.iter().filter(|&&s| s != state) {
                if let Some(e) = ctx.states[sibling.index()].control_entry_mut(idx) {
                    let rebased = rebase_offset(&e.offset(), &old, &new);
                    e.set_offset(rebased);
                }
            }
        }
    }

    /// Fix the control states of a new transition, capturing any that lack an entry.
    pub(crate) fn set_transition_endpoints(
        &mut self,
        idx: CaptureIdx,
        points: &[StateId],
        siblings: &[StateId],
        ctx: &mut CaptureCtx<'_>,
    ) {
        self.endpoints.clear();
        for &p in points.iter().take(MAX_CONTROL_POINTS) {
            if ctx.states[p.index()].control_entry(idx).is_none() {
                self.capture_entry(idx, p, siblings, None, ctx);
            }
            if ctx.states[p.index()].control_entry(idx).is_some() {
                self.endpoints.push(p);
            }
        }
    }

    /// Resolve every control pose and write the curve at `t` to the target.
    pub(crate) fn evaluate(&self, idx: CaptureIdx, t: f32, dt: f32, ctx: &mut CaptureCtx<'_>) {
        let snap = ctx.cfg.anchor_defaults.damping_threshold;
        let mut poses = [Pose::IDENTITY; MAX_CONTROL_POINTS];
        let mut count = 0;
        for &s in &self.endpoints {
            if let Some(entry) = ctx.states[s.index()].control_entry_mut(idx) {
                poses[count] = entry.resolve(&*ctx.host, dt, snap);
                count += 1;
            }
        }
        if count == 0 {
            return;
        }
        let points = &poses[..count];
        let t = if ctx.cfg.arc_length_parametrization && count > 2 {
            let positions: Vec<[f32; 3]> = points.iter().map(|p| p.position).collect();
            arc_length_parametrization(&positions, t)
        } else {
            t
        };
        self.write(ctx.host, bezier_pose(points, t));
    }

    /// Hold `state`'s resolved pose on the target.
    pub(crate) fn apply_static(&self, idx: CaptureIdx, state: StateId, dt: f32, ctx: &mut CaptureCtx<'_>) {
        let snap = ctx.cfg.anchor_defaults.damping_threshold;
        let Some(entry) = ctx.states[state.index()].control_entry_mut(idx) else {
            return;
        };
        let pose = entry.resolve(&*ctx.host, dt, snap);
        self.write(ctx.host, pose);
    }

    fn write(&self, host: &mut dyn Host, pose: Pose) {
        if !self.apply_position && !self.apply_rotation {
            return;
        }
        let Some(live) = host.live_pose(&self.target) else {
            trace!("skipping write to missing target '{}'", self.target);
            return;
        };
        let out = Pose {
            position: if self.apply_position { pose.position } else { live.position },
            rotation: if self.apply_rotation { pose.rotation } else { live.rotation },
        };
        host.set_live_pose(&self.target, out);
    }
}

/// Scalar capture (morph weight or any other float parameter).
#[derive(Clone, Debug, PartialEq)]
pub struct MorphCapture {
    pub id: String,
    pub apply: bool,
    /// Control values of the transition in flight; empty when nothing moves.
    endpoints: Vec<f32>,
}

impl MorphCapture {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            apply: true,
            endpoints: Vec::new(),
        }
    }

    pub fn is_valid<H: ScalarSource + ?Sized>(&self, host: &H) -> bool {
        host.scalar(&self.id).is_some()
    }

    pub fn endpoints(&self) -> &[f32] {
        &self.endpoints
    }

    pub(crate) fn capture_entry(&self, idx: CaptureIdx, state: StateId, ctx: &mut CaptureCtx<'_>) {
        match ctx.host.scalar(&self.id) {
            Some(v) => ctx.states[state.index()].set_morph_value(idx, v),
            None => warn!("scalar '{}' is not available; state {:?} left unchanged", self.id, state),
        }
    }

    /// Fix the control values of a new transition. If every stored value
    /// already equals the live value the transition writes nothing.
    pub(crate) fn set_transition_endpoints(&mut self, idx: CaptureIdx, points: &[StateId], ctx: &mut CaptureCtx<'_>) {
        self.endpoints.clear();
        let live = ctx.host.scalar(&self.id);
        let mut identical = true;
        for &p in points.iter().take(MAX_CONTROL_POINTS) {
            match ctx.states[p.index()].morph_value(idx) {
                Some(v) => {
                    identical &= live == Some(v);
                    self.endpoints.push(v);
                }
                None => {
                    if let Some(v) = live {
                        ctx.states[p.index()].set_morph_value(idx, v);
                        self.endpoints.push(v);
                    }
                }
            }
        }
        if identical {
            self.endpoints.clear();
        }
    }

    pub(crate) fn evaluate(&self, t: f32, host: &mut dyn Host) {
        if !self.apply || self.endpoints.is_empty() {
            return;
        }
        host.set_scalar(&self.id, bezier_scalar(&self.endpoints, t));
    }
}
