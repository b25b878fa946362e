//! The boundary contract between tool state machines and the editor.

use crate::camera::Camera;
use crate::handles::ResizeHandle;
use crate::object::{CanvasObject, ObjectId, ObjectPatch};
use crate::snap::SnapResult;
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// A type-specific continuation requested by a tool (double-click actions,
/// text placement). The host drains these and drives its own UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiRequest {
    /// Open the text editor for a text object.
    EditText(ObjectId),
    /// Start renaming a frame.
    RenameFrame(ObjectId),
    /// Toggle playback on a video object.
    ToggleMediaPlayback(ObjectId),
}

/// Everything a tool may read from or do to the editor.
///
/// Tools own only their private interaction state; every document mutation,
/// selection change, and geometry query goes through this trait. The editor
/// controller implements it; tests can substitute a recording fake.
pub trait ToolContext {
    // --- Reads ---

    /// The live id→object map.
    fn objects(&self) -> &HashMap<ObjectId, CanvasObject>;

    /// Look up a single object.
    fn object(&self, id: ObjectId) -> Option<&CanvasObject>;

    /// The selected ids, in selection order.
    fn selected_ids(&self) -> Vec<ObjectId>;

    /// The current viewport.
    fn viewport(&self) -> &Camera;

    /// The group currently in edit mode, if any.
    fn editing_group_id(&self) -> Option<ObjectId>;

    // --- Writes ---

    fn add_object(&mut self, object: CanvasObject);
    fn update_object(&mut self, id: ObjectId, patch: ObjectPatch);
    /// Batched update; unknown ids are skipped.
    fn update_objects(&mut self, batch: Vec<(ObjectId, ObjectPatch)>);
    fn delete_object(&mut self, id: ObjectId);
    fn set_selection(&mut self, ids: Vec<ObjectId>);

    /// Checkpoint the current document state onto the undo stack.
    fn push_history(&mut self);
    /// Drop the most recent checkpoint (cancelled gesture).
    fn discard_history_checkpoint(&mut self);

    /// Switch the active tool after the current event finishes dispatching.
    fn set_active_tool(&mut self, tool: ToolKind);

    fn enter_group_edit_mode(&mut self, id: ObjectId);
    fn exit_group_edit_mode(&mut self);

    /// Queue a type-specific continuation for the host.
    fn request_ui(&mut self, request: UiRequest);

    /// Set the cursor the host should display.
    fn set_cursor(&mut self, cursor: &'static str);

    /// Pan the viewport by a screen-space delta.
    fn pan_viewport(&mut self, delta: Vec2);

    // --- Geometry and query services ---

    fn screen_to_canvas(&self, point: Point) -> Point;
    fn canvas_to_screen(&self, point: Point) -> Point;

    /// An object's canvas-absolute position (resolved through parents).
    fn absolute_position(&self, id: ObjectId) -> Point;

    /// Topmost visible object at a screen point.
    fn hit_test(&self, screen_point: Point) -> Option<ObjectId>;

    /// Which resize grip of `id` a screen point hits.
    fn hit_test_handle(&self, screen_point: Point, id: ObjectId) -> Option<ResizeHandle>;

    /// Whether a screen point hits the rotation grip of `id`.
    fn hit_test_rotation_handle(&self, screen_point: Point, id: ObjectId) -> bool;

    /// Objects whose rotated bounds intersect the canvas-space rectangle.
    fn objects_in_rect(&self, a: Point, b: Point) -> Vec<ObjectId>;

    /// Snap a canvas position to the grid/objects per the editor's snap mode.
    fn snap_position(&self, point: Point) -> SnapResult;

    /// The next free z-index.
    fn next_z_index(&self) -> i64;

    /// Deep-duplicate objects (fresh ids, small offset); returns new ids.
    fn duplicate_objects(&mut self, ids: &[ObjectId]) -> Vec<ObjectId>;

    /// Objects spatially contained in a frame's rectangle.
    fn objects_inside_frame(&self, frame_id: ObjectId) -> Vec<ObjectId>;
}
