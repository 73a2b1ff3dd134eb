//! The view: renderer, layers, window state and the per-frame loop.

use scene_graph::{FrameStats, HeadlessRenderer, Renderer};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info_span};

use super::Layer;
use crate::core::{names, ItemId};
use crate::scene::World;
use crate::util::Result;
use crate::Error;

/// Presentation mode of the view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewState {
    #[default]
    Normal,
    Maximized,
    FullScreen,
    VR,
    AR,
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "Normal",
            Self::Maximized => "Maximized",
            Self::FullScreen => "FullScreen",
            Self::VR => "VR",
            Self::AR => "AR",
        };
        f.write_str(name)
    }
}

/// Frames per second over the last second of frame times.
#[derive(Clone, Debug, Default)]
pub struct FpsCounter {
    times: VecDeque<f64>,
    frames: u64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `time` seconds.
    pub fn tick(&mut self, time: f64) {
        self.frames += 1;
        self.times.push_back(time);
        while self.times.front().is_some_and(|t| time - t >= 1.0) {
            self.times.pop_front();
        }
    }

    pub fn fps(&self) -> f64 {
        self.times.len() as f64
    }

    /// Frames recorded since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Owns the renderer and the layers, and drives one frame per [`View::update`].
pub struct View {
    id: ItemId,
    renderer: Box<dyn Renderer>,
    layers: Vec<Layer>,
    state: ViewState,
    window_size: (u32, u32),
    screen_size: (u32, u32),
    fps: FpsCounter,
    last_time: Option<f64>,
    last_stats: FrameStats,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("layers", &self.layers.len())
            .field("state", &self.state)
            .field("size", &self.size())
            .field("fps", &self.fps.fps())
            .finish()
    }
}

impl View {
    /// View drawing through a [`HeadlessRenderer`].
    pub fn headless(world: &mut World, parent: Option<ItemId>, window: (u32, u32), screen: (u32, u32)) -> Result<Self> {
        Self::with_renderer(world, parent, Box::new(HeadlessRenderer::new()), window, screen)
    }

    pub fn with_renderer(
        world: &mut World,
        parent: Option<ItemId>,
        mut renderer: Box<dyn Renderer>,
        window: (u32, u32),
        screen: (u32, u32),
    ) -> Result<Self> {
        let id = world.model.create(parent, names::VIEW, "view")?;
        renderer.set_size(window.0, window.1);
        Ok(Self {
            id,
            renderer,
            layers: Vec::new(),
            state: ViewState::Normal,
            window_size: window,
            screen_size: screen,
            fps: FpsCounter::new(),
            last_time: None,
            last_stats: FrameStats::default(),
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Add a layer; its camera takes the view's aspect ratio.
    pub fn add_layer(&mut self, world: &mut World, layer: Layer) -> Result<()> {
        let (width, height) = self.size();
        layer.user.presence.camera.set_aspect(world, aspect(width, height))?;
        self.layers.push(layer);
        Ok(())
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Switch presentation mode. Maximized and full screen use the screen size.
    pub fn set_state(&mut self, world: &mut World, state: ViewState) -> Result<()> {
        if matches!(state, ViewState::VR | ViewState::AR) {
            return Err(Error::Unsupported(format!("view state {state}")));
        }
        self.state = state;
        let (width, height) = self.size();
        self.apply_size(world, width, height)?;
        debug!(%state, width, height, "view state changed");
        Ok(())
    }

    /// Current output size in pixels.
    pub fn size(&self) -> (u32, u32) {
        match self.state {
            ViewState::Normal | ViewState::VR | ViewState::AR => self.window_size,
            ViewState::Maximized | ViewState::FullScreen => self.screen_size,
        }
    }

    /// Resize the window. Leaves maximized and full screen modes.
    pub fn resize(&mut self, world: &mut World, width: u32, height: u32) -> Result<()> {
        self.window_size = (width, height);
        self.state = ViewState::Normal;
        self.apply_size(world, width, height)
    }

    fn apply_size(&mut self, world: &mut World, width: u32, height: u32) -> Result<()> {
        self.renderer.set_size(width, height);
        for layer in &self.layers {
            layer.user.presence.camera.set_aspect(world, aspect(width, height))?;
        }
        Ok(())
    }

    pub fn fps(&self) -> &FpsCounter {
        &self.fps
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Update every layer for the time elapsed since the previous call and render a
    /// frame through the first layer's camera.
    pub fn update(&mut self, world: &mut World, time: f64) -> Result<FrameStats> {
        let _span = info_span!("view_update", frame = self.fps.frames() + 1).entered();
        let delta_time = self.last_time.map_or(0.0, |last| (time - last).max(0.0));
        self.last_time = Some(time);

        for layer in &self.layers {
            layer.update(world, delta_time)?;
        }
        world.model.update(self.id, delta_time, false)?;

        let stats = match self.layers.first() {
            Some(layer) => {
                let _span = info_span!("render").entered();
                self.renderer.render(&world.scene, layer.user.presence.camera.entity.node())?
            }
            None => FrameStats::default(),
        };
        self.fps.tick(time);
        self.last_stats = stats;
        Ok(stats)
    }
}

fn aspect(width: u32, height: u32) -> f64 {
    if height == 0 {
        1.0
    } else {
        width as f64 / height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_counts_last_second() {
        let mut fps = FpsCounter::new();
        for i in 0..40 {
            fps.tick(i as f64 * 0.03);
        }
        // Frames at 0.18..1.17 are within one second of the last.
        assert_eq!(fps.fps(), 34.0);
        assert_eq!(fps.frames(), 40);
    }

    #[test]
    fn test_state_changes_size() {
        let mut world = World::new();
        let mut view = View::headless(&mut world, None, (800, 600), (1920, 1080)).unwrap();
        view.set_state(&mut world, ViewState::FullScreen).unwrap();
        assert_eq!(view.size(), (1920, 1080));
        assert!(matches!(view.set_state(&mut world, ViewState::VR), Err(Error::Unsupported(_))));
        assert_eq!(view.state(), ViewState::FullScreen);

        view.resize(&mut world, 640, 480).unwrap();
        assert_eq!(view.state(), ViewState::Normal);
        assert_eq!(view.size(), (640, 480));
        assert_eq!(view.update(&mut world, 0.0).unwrap(), FrameStats::default());
    }
}
