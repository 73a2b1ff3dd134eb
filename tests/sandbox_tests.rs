//! Integration tests for building and running sandboxes.

use geopose::app::{GeoPoseSandbox, SandboxData, SandboxSettings, DEFAULT_SPACE, DEFAULT_USER};
use geopose::core::{names, Model, TypeRegistry};
use geopose::geo::{GeoFrame, GeoPosition};
use geopose::util::{approx_eq, DVec3};
use scene_graph::Node;

#[test]
fn test_default_sandbox_has_one_space_and_one_user() {
    let sandbox = GeoPoseSandbox::new(SandboxSettings::default(), SandboxData::default()).unwrap();
    let world = sandbox.world();

    assert_eq!(sandbox.spaces().len(), 1);
    assert_eq!(sandbox.users().len(), 1);
    assert_eq!(sandbox.spaces()[0].name(world).unwrap(), DEFAULT_SPACE);
    assert_eq!(sandbox.users()[0].name(world).unwrap(), DEFAULT_USER);
    assert!(sandbox.find_space(DEFAULT_SPACE).is_some());
    assert!(sandbox.find_user(DEFAULT_USER).is_some());
    assert!(sandbox.find_user("Nobody").is_none());

    let layers = sandbox.view().layers();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].space.id(), sandbox.spaces()[0].id());
    assert_eq!(layers[0].user.id(), sandbox.users()[0].id());
    assert_eq!(sandbox.spaces()[0].frame, sandbox.default_frame());
}

#[test]
fn test_run_frames_renders_default_space() {
    let mut sandbox = GeoPoseSandbox::with_defaults().unwrap();
    let step = 1.0 / 60.0;
    let stats = sandbox.run_frames(5, step).unwrap();

    assert_eq!(stats.frame, 5);
    // Terrain, atmosphere and background meshes plus the graticule lines.
    assert_eq!(stats.meshes, 3);
    assert_eq!(stats.lines, 1);
    assert!(stats.vertices > 0);
    assert!(approx_eq(sandbox.time(), 4.0 * step, 1e-12));
    assert_eq!(sandbox.view().fps().frames(), 5);

    let more = sandbox.run_frames(2, step).unwrap();
    assert_eq!(more.frame, 7);
    assert!(approx_eq(sandbox.time(), 6.0 * step, 1e-12));
}

#[test]
fn test_moving_presence_moves_camera() {
    let mut sandbox = GeoPoseSandbox::with_defaults().unwrap();
    sandbox.update(0.0).unwrap();
    let user = *sandbox.find_user(DEFAULT_USER).unwrap();
    let camera = user.presence.camera.entity.node();
    let before = sandbox.world().scene.world_matrix(camera).unwrap().transform_point3(DVec3::ZERO);

    user.presence.set_location(sandbox.world_mut(), 90.0, 0.0, 1.0e6).unwrap();
    sandbox.update(0.1).unwrap();
    let after = sandbox.world().scene.world_matrix(camera).unwrap().transform_point3(DVec3::ZERO);

    assert!(before.x > 2.0e7);
    assert!(after.abs_diff_eq(DVec3::new(0.0, 0.0, 6_378_137.0 + 1.0e6), 1e-3));
    let ypr = user.presence.to_basic_ypr(sandbox.world()).unwrap();
    assert!(approx_eq(ypr.position.lon, 90.0, 1e-9));
}

#[test]
fn test_custom_space_and_user_from_data() {
    let data = SandboxData::from_json(
        r#"{
            "spaces": [
                {"name": "Earth"},
                {"name": "Mars", "frame": {"name": "mars", "equatorial_radius": 3396190, "polar_radius": 3376200},
                 "entities": ["terrain", "axes"]}
            ],
            "users": [
                {"name": "rover", "space": "Mars",
                 "presence": {"position": {"lat": 4.5, "lon": 137.4, "h": 100},
                              "angles": {"yaw": 45, "pitch": 0, "roll": 0}}},
                {"name": "orbiter"}
            ]
        }"#,
    )
    .unwrap();
    let mut sandbox = GeoPoseSandbox::new(SandboxSettings::default(), data).unwrap();
    sandbox.run_frames(1, 0.0).unwrap();

    let mars = sandbox.find_space("Mars").unwrap().clone();
    assert!(mars.atmosphere.is_none());
    assert!(mars.axes.is_some());
    let terrain = sandbox.world().scene.get(mars.terrain.unwrap().entity.node()).unwrap();
    assert!(approx_eq(terrain.scale.y, 3376200.0 / 3396190.0, 1e-12));

    let rover = *sandbox.find_user("rover").unwrap();
    assert_eq!(rover.presence.space(), mars.id());
    let ypr = rover.presence.to_basic_ypr(sandbox.world()).unwrap();
    assert!(approx_eq(ypr.position.lat, 4.5, 1e-9));
    assert!(approx_eq(ypr.angles.yaw, 45.0, 1e-9));

    let orbiter = *sandbox.find_user("orbiter").unwrap();
    assert_eq!(orbiter.presence.space(), sandbox.find_space("Earth").unwrap().id());
    assert_eq!(sandbox.view().layers().len(), 2);
}

#[test]
fn test_duplicate_space_names_are_rejected() {
    let data = SandboxData::from_json(r#"{"spaces": [{"name": "A"}, {"name": "A"}]}"#).unwrap();
    assert!(GeoPoseSandbox::new(SandboxSettings::default(), data).is_err());
}

#[test]
fn test_layer_widgets_render_with_sandbox() {
    let mut sandbox = GeoPoseSandbox::with_defaults().unwrap();
    let layer = sandbox.view().layers()[0].clone();
    let frame = layer.space.frame;
    let widget = layer
        .add_widget(sandbox.world_mut(), "pin", names::ENTITY, frame.into(), Node::group("pin"))
        .unwrap();
    let pose = widget.entity.geo_pose(sandbox.world()).unwrap();
    pose.position.set(&mut sandbox.world_mut().model, -90.0, 0.0, 0.0).unwrap();

    sandbox.update(0.0).unwrap();
    let node = sandbox.world().scene.get(widget.entity.node()).unwrap();
    assert!(approx_eq(node.position.z, -6_378_137.0, 1e-6));
    assert!(sandbox.world().model.is_updated(widget.id()));
}

#[test]
fn test_type_is_follows_declared_chain() {
    let types = TypeRegistry::with_builtins();
    for ancestor in [names::SPHERE, names::SHAPE, names::ITEM] {
        assert!(types.is_named(names::SPHERE, ancestor));
    }
    assert!(!types.is_named(names::SPHERE, names::CUBOID));
    assert!(!types.is_named(names::SHAPE, names::SPHERE));
    assert!(types.is_named(names::GEO_POSE, names::POSE));
    assert!(types.is_named(names::PRESENCE_ENTITY, names::ENTITY));
}

#[test]
fn test_geo_position_on_sphere() {
    let radius = 1000.0;
    let mut model = Model::new();
    let frame = GeoFrame::create(&mut model, None, "sphere", radius, radius).unwrap();
    let position = GeoPosition::create(&mut model, None, "p", &frame).unwrap();
    position.set(&mut model, 0.0, 0.0, 0.0).unwrap();
    model.update(position.id(), 0.0, false).unwrap();

    let state = position.state(&model).unwrap();
    assert!(state.relative.abs_diff_eq(DVec3::new(radius, 0.0, 0.0), 1e-9));
    assert!(approx_eq(state.vertical.length(), 1.0, 1e-12));
}
