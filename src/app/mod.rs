//! Application layer: spaces, users, layers and the view that renders them.
//!
//! - [`GeoPoseSandbox`] - builds everything from [`SandboxSettings`] and [`SandboxData`]
//! - [`Space`] - geo frame plus terrain, atmosphere, background, graticule and axes
//! - [`User`] / [`Presence`] - a camera posed in a space
//! - [`Layer`] / [`Widget`] - user-facing entities bound to a space and a user
//! - [`View`] - renderer, window state and the frame loop

mod layer;
mod sandbox;
mod settings;
mod space;
mod user;
mod view;
mod widget;

pub use layer::Layer;
pub use sandbox::{
    FrameData, GeoPoseSandbox, SandboxData, SpaceData, UserData, DEFAULT_SPACE, DEFAULT_USER,
};
pub use settings::SandboxSettings;
pub use space::{Space, SpaceEntity};
pub use user::{Presence, User};
pub use view::{FpsCounter, View, ViewState};
pub use widget::Widget;
