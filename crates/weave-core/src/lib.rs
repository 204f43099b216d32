//! Weave Core Library
//!
//! Platform-agnostic object store, transform engine and persistence for the Weave
//! spatial whiteboard. Rendering and hit-testing belong to the host.

pub mod board;
pub mod config;
pub mod geometry;
pub mod input;
pub mod object;
pub mod selection;
pub mod storage;
pub mod store;
pub mod style;
pub mod tools;
pub mod transform;

#[cfg(test)]
mod testing;

pub use board::{Board, BoardAction, ObjectView};
pub use config::{ConfigError, WeaveConfig};
pub use geometry::{OutlineCache, ShapeKind};
pub use input::{ClickTracker, KeyEvent, Modifiers, PointerEvent, PointerId, PointerInput, PointerTarget, Ray};
pub use object::{ObjectId, ObjectPatch, ObjectType, WorldObject};
pub use selection::{ClickOutcome, SelectionCoordinator};
pub use storage::{ObjectTable, PersistenceAdapter, StorageError, StorageResult};
pub use store::{InteractionMode, ObjectStore, StoreEvent, SubscriptionId};
pub use style::{ObjectStyle, TextAlign};
pub use tools::ObjectFactory;
pub use transform::{CursorIcon, Decorations, EngineState, HandleKind, TransformEngine};
