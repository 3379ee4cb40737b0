#![allow(dead_code)]

use poser_core::{
    AnimId, CaptureIdx, Config, CoreEvent, Engine, FixedRandom, LayerId, Pose, Scene, StateId, StateTiming,
    TransitionParams,
};

/// Unanchored entries without damping: resolved poses equal captured ones.
pub fn world_config() -> Config {
    let mut cfg = Config::default();
    cfg.owner.person_like = false;
    cfg.anchor_defaults.damping_time = 0.0;
    cfg
}

/// Engine whose random draws always return the low end of the range.
pub fn engine(cfg: Config) -> Engine {
    Engine::with_random(cfg, Box::new(FixedRandom(0.0)))
}

pub fn timing(wait: f32, duration: f32) -> StateTiming {
    StateTiming {
        wait_min: wait,
        wait_max: wait,
        duration,
        ..StateTiming::default()
    }
}

/// One animation "idle" with layer "body" capturing the "hand" control.
pub struct Rig {
    pub engine: Engine,
    pub scene: Scene,
    pub anim: AnimId,
    pub layer: LayerId,
    pub hand: CaptureIdx,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(world_config())
    }

    pub fn with_config(cfg: Config) -> Self {
        let mut engine = engine(cfg);
        let mut scene = Scene::new();
        scene.insert_pose("hand", Pose::IDENTITY);
        let g = engine.graph_mut();
        let anim = g.add_animation("idle").unwrap();
        let layer = g.add_layer(anim, "body").unwrap();
        let hand = g.add_control_capture(layer, "hand").unwrap();
        Self {
            engine,
            scene,
            anim,
            layer,
            hand,
        }
    }

    /// Author a state with the hand at `x` (wait 0, duration 1s).
    pub fn state_at(&mut self, name: &str, x: f32) -> StateId {
        self.scene.insert_pose("hand", Pose::from_position([x, 0.0, 0.0]));
        let id = self.engine.add_state(self.layer, name, &mut self.scene).unwrap();
        self.engine
            .graph_mut()
            .set_state_timing(id, timing(0.0, 1.0))
            .unwrap();
        id
    }

    pub fn link(&mut self, from: StateId, to: StateId) {
        self.link_with(from, to, TransitionParams::default());
    }

    pub fn link_with(&mut self, from: StateId, to: StateId, params: TransitionParams) {
        let params = TransitionParams {
            probability: params.probability.or(Some(1.0)),
            ..params
        };
        self.engine
            .graph_mut()
            .add_transition(from, to, params)
            .unwrap();
    }

    pub fn tick(&mut self, dt: f32) -> Vec<CoreEvent> {
        self.engine.advance(dt, &mut self.scene).events.clone()
    }

    /// Activate "idle" and finish the entry blend into its first state.
    pub fn activate(&mut self) -> Vec<CoreEvent> {
        self.engine.set_animation(self.anim, &mut self.scene).unwrap();
        self.tick(0.1)
    }

    pub fn hand_x(&self) -> f32 {
        self.scene.pose("hand").unwrap().position[0]
    }
}

pub fn fired(events: &[CoreEvent], name: &str) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, CoreEvent::TriggerFired { trigger, .. } if trigger == name))
        .count()
}

pub fn count<F: Fn(&CoreEvent) -> bool>(events: &[CoreEvent], pred: F) -> usize {
    events.iter().filter(|e| pred(e)).count()
}
