//! # GeoPose sandbox
//!
//! A reflective data-item model for geographic poses that drives a 3D scene graph.
//!
//! Items form an arena-backed tree with typed values, cross links and dirty-flag
//! propagation. Geodetic positions on an ellipsoid, orientations and poses are items
//! whose derived state is recomputed on update. Entities copy pose transforms onto
//! scene graph nodes, and the sandbox wires spaces, users and a view together.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math helpers
//! - [`core`] - Type registry, item model, events, collections, serialization
//! - [`values`] - Number, Boolean, Text, measures and complex values
//! - [`geo`] - Frames, positions, orientations and poses
//! - [`scene`] - Entities and shapes bound to the scene graph
//! - [`app`] - Spaces, users, layers, widgets, the view and the sandbox
//!
//! ## Example
//!
//! ```
//! use geopose::app::{GeoPoseSandbox, DEFAULT_USER};
//!
//! let mut sandbox = GeoPoseSandbox::with_defaults()?;
//! let stats = sandbox.run_frames(3, 1.0 / 60.0)?;
//! assert_eq!(stats.frame, 3);
//!
//! let user = *sandbox.find_user(DEFAULT_USER).unwrap();
//! let pose = user.presence.to_basic_ypr(sandbox.world())?;
//! println!("{}", pose.to_json()?);
//! # Ok::<(), geopose::Error>(())
//! ```

pub mod util;
pub mod core;
pub mod values;
pub mod geo;
pub mod scene;
pub mod app;

// Re-export commonly used types
pub use util::{Error, Result};
pub use core::{ItemId, Model};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::core::{names, ItemId, Model, TypeRegistry};
    pub use crate::values::{Angle, Boolean, Color, Distance, Number, Text, Vector};
    pub use crate::geo::{BasicYpr, EuclideanFrame, GeoFrame, GeoPose, GeoPosition, Pose, YawPitchRollOrientation};
    pub use crate::scene::{Entity, FrameRef, World};
    pub use crate::app::{GeoPoseSandbox, SandboxData, SandboxSettings};
}
