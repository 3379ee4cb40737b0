mod common;

use approx::assert_abs_diff_eq;
use common::Rig;
use poser_core::interp::functions::{quat_from_axis_angle, quat_mul};
use poser_core::{
    rebase_offset, AnchorDefaults, AnchorMode, AnchorRef, AnchorSpec, AnchoredEntry, Config, OwnerCfg, Pose,
    Scene, StateId,
};

fn assert_pose_eq(a: &Pose, b: &Pose) {
    for i in 0..3 {
        assert_abs_diff_eq!(a.position[i], b.position[i], epsilon = 1e-4);
    }
    // q and -q are the same rotation
    let sign = if a.rotation.iter().zip(b.rotation.iter()).map(|(x, y)| x * y).sum::<f32>() < 0.0 {
        -1.0
    } else {
        1.0
    };
    for i in 0..4 {
        assert_abs_diff_eq!(a.rotation[i], sign * b.rotation[i], epsilon = 1e-4);
    }
}

fn entry(mode: AnchorMode, damping: f32) -> AnchoredEntry {
    let mut e = AnchoredEntry::new(mode, &OwnerCfg::default(), &AnchorDefaults::default());
    e.damping_time = damping;
    e
}

#[test]
fn world_mode_ignores_references() {
    let mut scene = Scene::new();
    scene.insert_reference("owner", "control", Pose::from_position([9.0, 9.0, 9.0]));
    let mut e = entry(AnchorMode::World, 0.0);
    let live = Pose::new([1.0, 2.0, 3.0], quat_from_axis_angle([0.0, 0.0, 1.0], 0.4));
    assert!(e.capture(&scene, &live));
    assert_eq!(e.offset(), live);
    scene.insert_reference("owner", "control", Pose::from_position([-3.0, 0.0, 0.0]));
    assert_eq!(e.resolve(&scene, 0.016, 0.001), live);
}

#[test]
fn single_mode_round_trips_captured_pose() {
    let mut scene = Scene::new();
    let reference = Pose::new([0.5, -1.0, 2.0], quat_from_axis_angle([0.3, 1.0, 0.0], 1.2));
    scene.insert_reference("owner", "control", reference);
    let mut e = entry(AnchorMode::Single, 0.0);
    for live in [
        Pose::IDENTITY,
        Pose::new([3.0, 1.0, -2.0], quat_from_axis_angle([1.0, 0.0, 0.0], 2.5)),
        Pose::new([-7.5, 0.2, 0.0], quat_from_axis_angle([0.0, 1.0, 1.0], -0.7)),
    ] {
        assert!(e.capture(&scene, &live));
        assert_pose_eq(&e.resolve(&scene, 0.016, 0.001), &live);
    }
}

#[test]
fn unnormalized_host_rotation_still_round_trips() {
    let mut scene = Scene::new();
    // a quarter turn about y, scaled by 2
    let h = std::f32::consts::FRAC_1_SQRT_2 * 2.0;
    scene.insert_reference("owner", "control", Pose::new([1.0, 0.0, 0.0], [0.0, h, 0.0, h]));
    let mut e = entry(AnchorMode::Single, 0.0);
    let live = Pose::new([2.0, 1.0, -1.0], quat_from_axis_angle([1.0, 1.0, 0.0], 0.9));
    assert!(e.capture(&scene, &live));
    assert_pose_eq(&e.resolve(&scene, 0.016, 0.001), &live);
    // offset position is expressed in the reference's unit frame
    let offset = e.offset();
    assert_abs_diff_eq!(offset.position[0], 1.0, epsilon = 1e-5);
    assert_abs_diff_eq!(offset.position[1], 1.0, epsilon = 1e-5);
    assert_abs_diff_eq!(offset.position[2], 1.0, epsilon = 1e-5);
}

#[test]
fn blend_mode_follows_the_weighted_reference() {
    let mut scene = Scene::new();
    scene.insert_reference("chair", "seat", Pose::IDENTITY);
    scene.insert_reference("bed", "control", Pose::from_position([10.0, 0.0, 0.0]));
    let mut e = entry(AnchorMode::World, 0.0);
    e.apply_spec(&AnchorSpec::blend(
        AnchorRef::new("chair", "seat"),
        AnchorRef::new("bed", "control"),
        0.5,
    ));
    assert!(e.capture(&scene, &Pose::from_position([6.0, 1.0, 0.0])));
    assert_pose_eq(&e.offset(), &Pose::from_position([1.0, 1.0, 0.0]));

    scene.insert_reference("bed", "control", Pose::from_position([20.0, 0.0, 0.0]));
    assert_pose_eq(&e.resolve_instant(&scene), &Pose::from_position([11.0, 1.0, 0.0]));
}

#[test]
fn damping_moves_a_bounded_fraction_per_tick() {
    let mut scene = Scene::new();
    scene.insert_reference("owner", "control", Pose::IDENTITY);
    let mut e = entry(AnchorMode::Single, 1.0);
    assert!(e.capture(&scene, &Pose::from_position([10.0, 0.0, 0.0])));
    assert_abs_diff_eq!(e.resolve(&scene, 0.1, 0.001).position[0], 1.0, epsilon = 1e-5);
    assert_abs_diff_eq!(e.resolve(&scene, 0.1, 0.001).position[0], 1.9, epsilon = 1e-5);

    e.damping_time = 0.0;
    assert_abs_diff_eq!(e.resolve(&scene, 0.1, 0.001).position[0], 10.0, epsilon = 1e-6);
}

#[test]
fn missing_reference_holds_the_cached_pose() {
    let mut scene = Scene::new();
    scene.insert_reference("owner", "control", Pose::from_position([1.0, 0.0, 0.0]));
    let mut e = entry(AnchorMode::Single, 0.0);
    assert!(e.capture(&scene, &Pose::from_position([2.0, 0.0, 0.0])));
    let before = e.resolve(&scene, 0.1, 0.001);
    scene.remove_reference("owner", "control");
    assert_eq!(e.resolve(&scene, 0.1, 0.001), before);
}

#[test]
fn rebase_shifts_by_the_root_delta() {
    let old_root = Pose::new([1.0, 0.0, 0.0], quat_from_axis_angle([0.0, 1.0, 0.0], 0.3));
    let new_root = Pose::new([2.0, 1.0, 0.0], quat_from_axis_angle([0.0, 1.0, 0.0], 0.8));
    let sibling = Pose::new([0.0, 0.0, 4.0], quat_from_axis_angle([1.0, 0.0, 0.0], 0.2));
    let rebased = rebase_offset(&sibling, &old_root, &new_root);
    let expected = Pose::new(
        [1.0, 1.0, 4.0],
        quat_mul(quat_from_axis_angle([0.0, 1.0, 0.0], 0.5), sibling.rotation),
    );
    assert_pose_eq(&rebased, &expected);
}

fn hand_offset(rig: &Rig, state: StateId) -> Pose {
    rig.engine
        .graph()
        .state(state)
        .unwrap()
        .control_entry(rig.hand)
        .unwrap()
        .offset()
}

#[test]
fn recapturing_the_root_rebases_its_siblings() {
    let mut rig = Rig::new();
    let root = rig.state_at("root", 1.0);
    let sibling = rig.state_at("sibling", 4.0);
    let untouched = rig.state_at("other", 6.0);
    let g = rig.engine.graph_mut();
    g.set_root_state(root, true).unwrap();

    rig.scene.insert_pose("hand", Pose::from_position([3.0, 0.0, 0.0]));
    rig.engine.capture_state(root, &mut rig.scene).unwrap();

    assert_pose_eq(&hand_offset(&rig, root), &Pose::from_position([3.0, 0.0, 0.0]));
    assert_pose_eq(&hand_offset(&rig, sibling), &Pose::from_position([6.0, 0.0, 0.0]));
    assert_pose_eq(&hand_offset(&rig, untouched), &Pose::from_position([8.0, 0.0, 0.0]));

    // non-root captures do not touch siblings
    rig.scene.insert_pose("hand", Pose::from_position([0.0, 0.0, 0.0]));
    rig.engine.capture_state(sibling, &mut rig.scene).unwrap();
    assert_pose_eq(&hand_offset(&rig, root), &Pose::from_position([3.0, 0.0, 0.0]));
    assert_pose_eq(&hand_offset(&rig, untouched), &Pose::from_position([8.0, 0.0, 0.0]));
}

#[test]
fn set_anchor_keeps_the_world_pose() {
    let mut cfg = Config::default();
    cfg.anchor_defaults.damping_time = 0.0;
    let mut rig = Rig::with_config(cfg);
    rig.scene.insert_reference("owner", "control", Pose::from_position([1.0, 0.0, 0.0]));
    rig.scene.insert_reference("chair", "seat", Pose::from_position([5.0, 0.0, 0.0]));
    let s = rig.state_at("sit", 2.0);
    let hand = rig.hand;
    let e = rig.engine.graph().state(s).unwrap().control_entry(hand).unwrap();
    assert_eq!(e.mode, AnchorMode::Single);
    assert_pose_eq(&e.offset(), &Pose::from_position([1.0, 0.0, 0.0]));

    let spec = AnchorSpec::single(AnchorRef::new("chair", "seat"));
    rig.engine.set_anchor(s, hand, &spec, &rig.scene).unwrap();
    let e = rig.engine.graph().state(s).unwrap().control_entry(hand).unwrap();
    assert_eq!(e.anchor_a, AnchorRef::new("chair", "seat"));
    assert_pose_eq(&e.offset(), &Pose::from_position([-3.0, 0.0, 0.0]));

    rig.engine.graph_mut().rename_atom("chair", "stool");
    let e = rig.engine.graph().state(s).unwrap().control_entry(hand).unwrap();
    assert_eq!(e.anchor_a.atom, "stool");
    assert_eq!(e.anchor_b.atom, "owner");
}

#[test]
fn new_states_inherit_anchoring_from_the_current_state() {
    let mut cfg = Config::default();
    cfg.anchor_defaults.damping_time = 0.0;
    let mut rig = Rig::with_config(cfg);
    rig.scene.insert_reference("owner", "control", Pose::IDENTITY);
    rig.scene.insert_reference("chair", "seat", Pose::from_position([5.0, 0.0, 0.0]));
    let first = rig.state_at("first", 2.0);
    let hand = rig.hand;
    rig.engine
        .set_anchor(first, hand, &AnchorSpec::single(AnchorRef::new("chair", "seat")), &rig.scene)
        .unwrap();
    rig.activate();
    assert_eq!(rig.engine.current_state(rig.layer), Some(first));

    let second = rig.state_at("second", 7.0);
    let e = rig.engine.graph().state(second).unwrap().control_entry(hand).unwrap();
    assert_eq!(e.anchor_a, AnchorRef::new("chair", "seat"));
    assert_pose_eq(&e.offset(), &Pose::from_position([2.0, 0.0, 0.0]));
}
