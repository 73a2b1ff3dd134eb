//! The sandbox: one world with its spaces, users and view.

use scene_graph::{FrameStats, PerspectiveCamera};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, info_span};

use super::{Layer, SandboxSettings, Space, SpaceEntity, User, View};
use crate::core::{names, ItemId};
use crate::geo::{BasicYpr, GeoFrame};
use crate::scene::World;
use crate::util::Result;
use crate::Error;

pub const DEFAULT_SPACE: &str = "DefaultSpace";
pub const DEFAULT_USER: &str = "DefaultUser";

fn default_frame_name() -> String {
    "frame".to_string()
}

/// Ellipsoid of a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    #[serde(default = "default_frame_name")]
    pub name: String,
    pub equatorial_radius: f64,
    pub polar_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceData {
    pub name: String,
    /// Ellipsoid; the sandbox's WGS84 frame when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameData>,
    /// Entities to create; the ones enabled in the settings when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<SpaceEntity>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub name: String,
    /// Name of the space the user is in; the first space when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    /// Initial presence pose in Basic-YPR form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<BasicYpr>,
}

/// Sandbox contents as read from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxData {
    pub spaces: Vec<SpaceData>,
    pub users: Vec<UserData>,
}

impl SandboxData {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Spaces, users and a view over one [`World`].
///
/// Every user gets a layer joining it to its space; the view renders through the
/// first layer's camera.
#[derive(Debug)]
pub struct GeoPoseSandbox {
    settings: SandboxSettings,
    world: World,
    root: ItemId,
    frame: GeoFrame,
    spaces: Vec<Space>,
    users: Vec<User>,
    view: View,
    time: f64,
}

impl GeoPoseSandbox {
    /// Build a sandbox. Missing spaces or users are replaced by `DefaultSpace` and
    /// `DefaultUser`.
    pub fn new(mut settings: SandboxSettings, data: SandboxData) -> Result<Self> {
        let _span = info_span!("sandbox_new").entered();
        settings.validate();

        let mut world = World::new();
        let root = world.model.create(None, names::ITEM, "GeoPoseSandbox")?;
        let frame = GeoFrame::create_default(&mut world.model, Some(root))?;

        let mut space_data = data.spaces;
        if space_data.is_empty() {
            space_data.push(SpaceData {
                name: DEFAULT_SPACE.to_string(),
                frame: None,
                entities: None,
            });
        }
        let mut spaces: Vec<Space> = Vec::with_capacity(space_data.len());
        for sd in &space_data {
            if spaces.iter().any(|s| world.model.name(s.id()).is_ok_and(|n| n == sd.name)) {
                return Err(Error::invalid("spaces", format!("duplicate space '{}'", sd.name)));
            }
            let space_frame = match &sd.frame {
                Some(fd) => GeoFrame::create(
                    &mut world.model,
                    Some(root),
                    &fd.name,
                    fd.equatorial_radius,
                    fd.polar_radius,
                )?,
                None => frame,
            };
            let entities = sd.entities.clone().unwrap_or_else(|| SpaceEntity::enabled(&settings));
            spaces.push(Space::create(
                &mut world,
                Some(root),
                &sd.name,
                Some(space_frame),
                &entities,
                &settings,
            )?);
        }

        let mut user_data = data.users;
        if user_data.is_empty() {
            user_data.push(UserData {
                name: DEFAULT_USER.to_string(),
                space: None,
                presence: None,
            });
        }
        let mut view = View::headless(
            &mut world,
            Some(root),
            (settings.window_width, settings.window_height),
            (settings.screen_width, settings.screen_height),
        )?;
        let mut users = Vec::with_capacity(user_data.len());
        for ud in &user_data {
            let space = match &ud.space {
                Some(name) => spaces
                    .iter()
                    .find(|s| world.model.name(s.id()).is_ok_and(|n| n == name.as_str()))
                    .ok_or_else(|| Error::invalid(ud.name.as_str(), format!("unknown space '{name}'")))?,
                None => &spaces[0],
            };
            let camera = PerspectiveCamera::new(
                settings.camera_fov,
                settings.aspect(),
                settings.camera_near,
                settings.camera_far,
            );
            let user = User::create(&mut world, Some(root), &ud.name, space, camera)?;
            match &ud.presence {
                Some(ypr) => user.presence.apply_basic_ypr(&mut world, ypr)?,
                None => user
                    .presence
                    .set_location(&mut world, 0.0, 0.0, settings.presence_altitude)?,
            }

            let layer = Layer::create(&mut world, Some(view.id()), &format!("{}Layer", ud.name), space, &user)?;
            view.add_layer(&mut world, layer)?;
            users.push(user);
        }

        info!(
            spaces = spaces.len(),
            users = users.len(),
            items = world.model.len(),
            nodes = world.scene.len(),
            "sandbox ready"
        );
        Ok(Self {
            settings,
            world,
            root,
            frame,
            spaces,
            users,
            view,
            time: 0.0,
        })
    }

    /// Sandbox with default settings and contents.
    pub fn with_defaults() -> Result<Self> {
        Self::new(SandboxSettings::default(), SandboxData::default())
    }

    pub fn settings(&self) -> &SandboxSettings {
        &self.settings
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Root item of the sandbox tree.
    pub fn root(&self) -> ItemId {
        self.root
    }

    /// The WGS84 frame shared by spaces without their own ellipsoid.
    pub fn default_frame(&self) -> GeoFrame {
        self.frame
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> (&mut View, &mut World) {
        (&mut self.view, &mut self.world)
    }

    pub fn find_space(&self, name: &str) -> Option<&Space> {
        self.spaces
            .iter()
            .find(|s| self.world.model.name(s.id()).is_ok_and(|n| n == name))
    }

    pub fn find_user(&self, name: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| self.world.model.name(u.id()).is_ok_and(|n| n == name))
    }

    /// Seconds of sandbox time rendered so far.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Run one frame at `time` seconds.
    pub fn update(&mut self, time: f64) -> Result<FrameStats> {
        self.time = time;
        self.view.update(&mut self.world, time)
    }

    /// Run `count` frames `step` seconds apart, continuing from the current time.
    pub fn run_frames(&mut self, count: usize, step: f64) -> Result<FrameStats> {
        let mut stats = self.view.last_stats();
        for _ in 0..count {
            let time = if self.view.fps().frames() == 0 { self.time } else { self.time + step };
            stats = self.update(time)?;
        }
        debug!(frames = count, time = self.time, fps = self.view.fps().fps(), "frames run");
        Ok(stats)
    }
}
