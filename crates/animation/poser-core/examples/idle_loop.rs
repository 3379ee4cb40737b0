use poser_core::{
    Command, Config, Engine, Inputs, Pose, Scene, StateTiming, TransitionParams, Trigger, TriggerKind,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(Config::default());
    let mut scene = Scene::new();
    scene.insert_pose("head", Pose::IDENTITY);

    let anim = engine.graph_mut().add_animation("idle")?;
    let layer = engine.graph_mut().add_layer(anim, "head")?;
    engine.graph_mut().add_control_capture(layer, "head")?;

    // Author two looks by posing the scene and capturing it.
    let timing = StateTiming {
        wait_min: 0.5,
        wait_max: 1.5,
        duration: 0.8,
        ease_in: 0.3,
        ease_out: 0.3,
        ..StateTiming::default()
    };
    scene.insert_pose("head", Pose::from_position([-0.2, 1.6, 0.0]));
    let left = engine.add_state(layer, "look_left", &mut scene)?;
    scene.insert_pose("head", Pose::from_position([0.2, 1.6, 0.0]));
    let right = engine.add_state(layer, "look_right", &mut scene)?;
    for state in [left, right] {
        engine.graph_mut().set_state_timing(state, timing.clone())?;
    }
    engine.graph_mut().add_transition(left, right, TransitionParams::default())?;
    engine.graph_mut().add_transition(right, left, TransitionParams::default())?;
    engine
        .graph_mut()
        .set_trigger(right, TriggerKind::EnterEnd, Some(Trigger::new("blink")))?;

    let mut inputs = Inputs::default().with(Command::SetAnimation {
        animation: "idle".into(),
    });
    for frame in 0..300 {
        let out = engine.update(1.0 / 60.0, std::mem::take(&mut inputs), &mut scene);
        if out.is_empty() {
            continue;
        }
        for event in &out.events {
            println!("frame {frame:3}: {}", serde_json::to_string(event)?);
        }
    }

    if let Some(pose) = scene.pose("head") {
        println!("final head position: {:?}", pose.position);
    }
    println!("current state: {:?}", engine.current_state_name(layer));
    Ok(())
}
