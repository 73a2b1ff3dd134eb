//! Core layer - the item model every domain type is built on.
//!
//! This module provides:
//! - [`Model`] / [`ItemId`] - arena of items with lazy dirty tracking
//! - [`TypeRegistry`] - nominal type hierarchy with `is()` checks
//! - [`Collection`] - ordered storage with position control
//! - [`Event`] / [`EventBus`] - listener lists for lifecycle notifications
//! - JSON and CSV serialization of item subtrees

mod collection;
mod event;
mod item;
mod serialization;
mod types;

pub use collection::{Collection, Named};
pub use event::{Event, EventBus, ItemEvents, ListenerId};
pub use item::{ItemId, Model};
pub(crate) use item::Payload;
pub use serialization::{
    deserialize, deserialize_csv, from_csv, from_json, serialize, to_csv, to_json, CsvRecord,
};
pub use types::{names, Type, TypeId, TypeRegistry, BUILTIN_TYPES};
