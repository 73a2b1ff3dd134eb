//! Bridge from the item model to the scene graph.
//!
//! - [`World`] - a [`Model`](crate::core::Model) plus the scene graph it drives
//! - [`Entity`] - item with a pose and a scene node, synced on update
//! - [`Shape`] - sphere, cylinder, cone and cuboid items
//! - Concrete entities: terrain, atmosphere, background, graticule, arrow, axes, camera

mod entities;
mod entity;
mod shape;
mod world;

pub use entities::{
    graticule_lines, ArrowEntity, AtmosphereEntity, AxesEntity, BackgroundEntity, CameraEntity, GraticuleEntity,
    TerrainEntity,
};
pub use entity::{Entity, FrameRef};
pub use shape::Shape;
pub use world::World;
