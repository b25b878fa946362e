//! Vellum Core Library
//!
//! Document model and interaction engine for the Vellum design canvas:
//! the object store, viewport, grouping, selection geometry, z-order,
//! snapshot history, and the per-tool interaction state machines.

pub mod camera;
pub mod clipboard;
pub mod context;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod group;
pub mod handles;
pub mod history;
pub mod input;
pub mod object;
pub mod snap;
pub mod store;
pub mod tools;
pub mod zorder;

pub use camera::Camera;
pub use clipboard::Clipboard;
pub use context::{ToolContext, UiRequest};
pub use editor::Editor;
pub use error::{DocumentError, DocumentResult};
pub use geometry::{rotated_bounds, AlignEdge, DistributeAxis};
pub use history::{History, Snapshot, MAX_HISTORY};
pub use input::{KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use object::{CanvasObject, ObjectId, ObjectKind, ObjectPatch};
pub use snap::{SnapMode, SnapResult, GRID_SIZE};
pub use store::ObjectStore;
pub use tools::{Tool, ToolKind, ToolManager, ToolResponse};
