//! Integration tests for settings files, sandbox data files and pose serialization.

use geopose::app::{GeoPoseSandbox, SandboxData, SandboxSettings, SpaceData, SpaceEntity, UserData};
use geopose::core::{deserialize, deserialize_csv, serialize, to_csv, to_json};
use geopose::geo::{BasicPosition, BasicYpr, YprAngles};
use geopose::util::approx_eq;
use serde_json::json;

use tempfile::{tempdir, NamedTempFile};

fn rover_pose() -> BasicYpr {
    BasicYpr {
        position: BasicPosition { lat: -14.57, lon: 175.47, h: 250.0 },
        angles: YprAngles { yaw: 30.0, pitch: -5.0, roll: 2.0 },
    }
}

fn assert_same_pose(a: &BasicYpr, b: &BasicYpr) {
    for (x, y) in [
        (a.position.lat, b.position.lat),
        (a.position.lon, b.position.lon),
        (a.position.h, b.position.h),
        (a.angles.yaw, b.angles.yaw),
        (a.angles.pitch, b.angles.pitch),
        (a.angles.roll, b.angles.roll),
    ] {
        assert!(approx_eq(x, y, 1e-9), "{x} != {y}");
    }
}

#[test]
fn test_settings_roundtrip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let settings = SandboxSettings {
        camera_fov: 70.0,
        show_axes: true,
        graticule_step: 10.0,
        terrain_texture: Some("textures/earth.jpg".into()),
        ..SandboxSettings::default()
    };
    settings.save_to(&path).unwrap();
    let loaded = SandboxSettings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_settings_file_is_repaired_on_load() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), r#"{"camera_fov": 500, "target_fps": -1, "show_graticule": false}"#).unwrap();

    let loaded = SandboxSettings::load_from(file.path()).unwrap();
    assert_eq!(loaded.camera_fov, 45.0);
    assert_eq!(loaded.target_fps, 60.0);
    assert!(!loaded.show_graticule);

    std::fs::write(file.path(), "not json").unwrap();
    assert!(SandboxSettings::load_from(file.path()).is_err());
}

#[test]
fn test_sandbox_data_file() {
    let data = SandboxData {
        spaces: vec![SpaceData {
            name: "Earth".to_string(),
            frame: None,
            entities: Some(vec![SpaceEntity::Terrain, SpaceEntity::Graticule]),
        }],
        users: vec![UserData {
            name: "rover".to_string(),
            space: Some("Earth".to_string()),
            presence: Some(rover_pose()),
        }],
    };
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), data.to_json().unwrap()).unwrap();

    let loaded = SandboxData::load(file.path()).unwrap();
    assert_eq!(loaded, data);

    let mut sandbox = GeoPoseSandbox::new(SandboxSettings::default(), loaded).unwrap();
    let stats = sandbox.run_frames(1, 0.0).unwrap();
    assert_eq!((stats.meshes, stats.lines), (1, 1));
    let rover = *sandbox.find_user("rover").unwrap();
    assert_same_pose(&rover.presence.to_basic_ypr(sandbox.world()).unwrap(), &rover_pose());
}

#[test]
fn test_pose_json_transfers_between_sandboxes() {
    let source_data = SandboxData {
        users: vec![UserData {
            name: "rover".to_string(),
            space: None,
            presence: Some(rover_pose()),
        }],
        ..SandboxData::default()
    };
    let source = GeoPoseSandbox::new(SandboxSettings::default(), source_data).unwrap();
    let rover = source.users()[0];
    let json = serialize(&source.world().model, rover.presence.pose.id()).unwrap();
    assert!(json["position"]["latitude"].is_number());
    assert!(to_json(&source.world().model, rover.presence.pose.id(), true).unwrap().contains("yaw"));

    let mut target = GeoPoseSandbox::with_defaults().unwrap();
    let user = target.users()[0];
    deserialize(&mut target.world_mut().model, user.presence.pose.id(), &json).unwrap();
    assert_same_pose(&user.presence.to_basic_ypr(target.world()).unwrap(), &rover_pose());
}

#[test]
fn test_pose_csv_transfers_between_sandboxes() {
    let source = GeoPoseSandbox::new(
        SandboxSettings::default(),
        SandboxData {
            users: vec![UserData {
                name: "rover".to_string(),
                space: None,
                presence: Some(rover_pose()),
            }],
            ..SandboxData::default()
        },
    )
    .unwrap();
    let rover = source.users()[0];
    let csv = to_csv(&source.world().model, rover.presence.pose.id()).unwrap();
    assert!(csv.starts_with("path,value,unit\n"));
    assert!(csv.contains("orientation/yaw,"));

    let mut target = GeoPoseSandbox::with_defaults().unwrap();
    let user = target.users()[0];
    let applied = deserialize_csv(&mut target.world_mut().model, user.presence.pose.id(), &csv).unwrap();
    assert_eq!(applied, csv.lines().count() - 1);
    assert_same_pose(&user.presence.to_basic_ypr(target.world()).unwrap(), &rover_pose());
}

#[test]
fn test_pose_csv_keeps_altitude_unit() {
    let mut source = GeoPoseSandbox::new(
        SandboxSettings::default(),
        SandboxData {
            users: vec![UserData {
                name: "rover".to_string(),
                space: None,
                presence: Some(rover_pose()),
            }],
            ..SandboxData::default()
        },
    )
    .unwrap();
    let rover = source.users()[0];
    let altitude = rover.presence.pose.position.altitude;
    altitude.set_unit(&mut source.world_mut().model, "km").unwrap();
    let csv = to_csv(&source.world().model, rover.presence.pose.id()).unwrap();
    assert!(csv.contains("position/altitude,0.25,kilometers\n"));

    let mut target = GeoPoseSandbox::with_defaults().unwrap();
    let user = target.users()[0];
    deserialize_csv(&mut target.world_mut().model, user.presence.pose.id(), &csv).unwrap();
    let copied = user.presence.pose.position.altitude;
    assert_eq!(copied.unit(&target.world().model).unwrap(), "kilometers");
    assert!(approx_eq(copied.meters(&target.world().model).unwrap(), 250.0, 1e-9));
    assert_same_pose(&user.presence.to_basic_ypr(target.world()).unwrap(), &rover_pose());
}

#[test]
fn test_graticule_step_accepts_other_units() {
    let mut sandbox = GeoPoseSandbox::with_defaults().unwrap();
    let graticule = sandbox.spaces()[0].graticule.unwrap();
    let model = &mut sandbox.world_mut().model;

    deserialize(model, graticule.entity.id(), &json!({"step": {"value": 0.5, "unit": "rad"}})).unwrap();
    assert_eq!(graticule.step.unit(model).unwrap(), "radians");
    assert!(approx_eq(graticule.step.degrees(model).unwrap(), 0.5f64.to_degrees(), 1e-9));

    model.update(graticule.entity.id(), 0.0, false).unwrap();
    let bad = json!({"step": {"value": 200, "unit": "deg"}});
    assert!(deserialize(model, graticule.entity.id(), &bad).is_err());
    assert_eq!(graticule.step.unit(model).unwrap(), "radians");
    assert_eq!(graticule.step.get(model).unwrap(), 0.5);
    assert!(model.is_updated(graticule.step.id()));

    let stats = sandbox.run_frames(1, 0.0).unwrap();
    assert_eq!(stats.lines, 1);
}
