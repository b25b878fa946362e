//! Editor controller: owns the document, camera, history, and tools, and
//! implements the tool context boundary.

use crate::camera::Camera;
use crate::clipboard::Clipboard;
use crate::context::{ToolContext, UiRequest};
use crate::geometry::{self, AlignEdge, BoundsItem, DistributeAxis};
use crate::group::{self, plan_group, plan_ungroup};
use crate::handles::{self, ResizeHandle, HANDLE_HIT_TOLERANCE};
use crate::history::History;
use crate::input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::object::{CanvasObject, ObjectId, ObjectPatch};
use crate::snap::{self, SnapMode, SnapResult};
use crate::store::ObjectStore;
use crate::tools::{ToolKind, ToolManager, ToolResponse};
use crate::zorder;
use kurbo::{Point, Rect, Vec2};
use std::collections::{HashMap, HashSet};

/// Object hit-test tolerance in screen pixels.
const HIT_TOLERANCE: f64 = 4.0;

/// Offset applied by explicit duplication (not alt-drag).
const DUPLICATE_OFFSET: f64 = 10.0;

/// The single owner of all mutable editor state.
///
/// Every pointer/keyboard event enters here, is routed to the active tool's
/// state machine, and mutates the store through the [`ToolContext`] methods
/// this type implements. External layers (rendering, persistence, collab)
/// read the store snapshot through the accessors; an external mutation pass
/// wraps itself in [`Editor::apply_remote`], which turns the interactive
/// mutators into no-ops for its duration.
#[derive(Debug)]
pub struct Editor {
    store: ObjectStore,
    camera: Camera,
    history: History,
    clipboard: Clipboard,
    tools: ToolManager,
    input: InputState,
    snap_mode: SnapMode,
    editing_group_id: Option<ObjectId>,
    applying_remote: bool,
    pending_tool: Option<ToolKind>,
    ui_requests: Vec<UiRequest>,
    cursor: &'static str,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor with an empty document.
    pub fn new() -> Self {
        Self {
            store: ObjectStore::new(),
            camera: Camera::new(),
            history: History::new(),
            clipboard: Clipboard::new(),
            tools: ToolManager::new(),
            input: InputState::new(),
            snap_mode: SnapMode::default(),
            editing_group_id: None,
            applying_remote: false,
            pending_tool: None,
            ui_requests: Vec::new(),
            cursor: "default",
        }
    }

    // --- Accessors ---

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tools.active()
    }

    pub fn snap_mode(&self) -> SnapMode {
        self.snap_mode
    }

    pub fn set_snap_mode(&mut self, mode: SnapMode) {
        self.snap_mode = mode;
    }

    /// The cursor the host should display.
    pub fn cursor(&self) -> &'static str {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drain queued type-specific continuations for the host UI.
    pub fn take_ui_requests(&mut self) -> Vec<UiRequest> {
        std::mem::take(&mut self.ui_requests)
    }

    /// Serialize the object map for external readers (export, persistence).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self.store.objects())
    }

    // --- Event routing ---

    /// Update modifier state (hosts feed this alongside key events).
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    /// Route a pointer event to the active tool.
    pub fn on_pointer_event(&mut self, event: PointerEvent) -> ToolResponse {
        self.input.handle_pointer_event(&event);
        let modifiers = self.input.modifiers;
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => {
                if self.input.take_double_click() {
                    self.dispatch(|tool, editor| tool.on_double_click(editor, position, modifiers))
                } else {
                    self.dispatch(|tool, editor| tool.on_pointer_down(editor, position, modifiers))
                }
            }
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => self.dispatch(|tool, editor| tool.on_pointer_up(editor, position, modifiers)),
            PointerEvent::Move { position } => {
                self.dispatch(|tool, editor| tool.on_pointer_move(editor, position, modifiers))
            }
            PointerEvent::Scroll { position, delta } => {
                if modifiers.ctrl {
                    // Pinch/ctrl-scroll zooms about the pointer.
                    let factor = (-delta.y / 500.0).exp();
                    self.camera.zoom_at(position, factor);
                } else {
                    self.camera.pan(Vec2::new(-delta.x, -delta.y));
                }
                ToolResponse::redraw()
            }
            _ => ToolResponse::ignored(),
        }
    }

    /// Route a key event to the active tool.
    pub fn on_key_event(&mut self, event: KeyEvent) -> ToolResponse {
        self.input.handle_key_event(&event);
        let modifiers = self.input.modifiers;
        match event {
            KeyEvent::Pressed(key) => {
                self.dispatch(|tool, editor| tool.on_key_down(editor, &key, modifiers))
            }
            KeyEvent::Released(key) => {
                self.dispatch(|tool, editor| tool.on_key_up(editor, &key, modifiers))
            }
        }
    }

    /// Switch the active tool, cancelling the old tool's gesture.
    pub fn set_tool(&mut self, kind: ToolKind) {
        self.pending_tool = Some(kind);
        self.apply_pending_tool_switch();
    }

    fn dispatch(
        &mut self,
        f: impl FnOnce(&mut dyn crate::tools::Tool, &mut Editor) -> ToolResponse,
    ) -> ToolResponse {
        let active = self.tools.active();
        let Some(mut tool) = self.tools.take(active) else {
            return ToolResponse::ignored();
        };
        let response = f(tool.as_mut(), self);
        self.tools.put_back(tool);
        if let Some(cursor) = response.cursor {
            self.cursor = cursor;
        }
        self.apply_pending_tool_switch();
        response
    }

    fn apply_pending_tool_switch(&mut self) {
        let Some(next) = self.pending_tool.take() else {
            return;
        };
        let current = self.tools.active();
        if next == current {
            return;
        }
        if let Some(mut tool) = self.tools.take(current) {
            tool.on_deactivate(self);
            self.tools.put_back(tool);
        }
        log::debug!("tool switch: {current:?} -> {next:?}");
        self.tools.set_active(next);
    }

    // --- History ---

    /// Undo the most recent checkpoint. No-op on an empty stack.
    pub fn undo(&mut self) -> bool {
        if self.applying_remote {
            return false;
        }
        let live = self.store.clone_objects();
        let Some(snapshot) = self.history.undo(&live) else {
            return false;
        };
        self.history.set_undo_redoing(true);
        self.store.replace_objects(snapshot.objects);
        self.history.set_undo_redoing(false);
        true
    }

    /// Redo the most recently undone checkpoint. No-op on an empty stack.
    pub fn redo(&mut self) -> bool {
        if self.applying_remote {
            return false;
        }
        let live = self.store.clone_objects();
        let Some(snapshot) = self.history.redo(&live) else {
            return false;
        };
        self.history.set_undo_redoing(true);
        self.store.replace_objects(snapshot.objects);
        self.history.set_undo_redoing(false);
        true
    }

    // --- Selection-level operations ---

    /// Select every top-level object.
    pub fn select_all(&mut self) {
        let ids: Vec<ObjectId> = self
            .store
            .ids_by_z()
            .into_iter()
            .filter(|&id| self.store.get(id).is_some_and(|o| o.parent_id.is_none()))
            .collect();
        self.store.set_selection(ids);
    }

    /// Delete the selected objects (with their descendants).
    pub fn delete_selected(&mut self) {
        if self.applying_remote || self.store.selected_ids().is_empty() {
            return;
        }
        self.push_history();
        for id in self.store.selected_ids().to_vec() {
            self.store.remove(id);
        }
    }

    /// Duplicate the selection with a small offset and select the copies.
    pub fn duplicate_selected(&mut self) -> Vec<ObjectId> {
        if self.applying_remote || self.store.selected_ids().is_empty() {
            return Vec::new();
        }
        self.push_history();
        let ids = self.store.selected_ids().to_vec();
        let new_ids = self
            .store
            .duplicate(&ids, Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET));
        self.store.set_selection(new_ids.clone());
        new_ids
    }

    /// Group the selection into a new group. Returns the group id, or `None`
    /// when fewer than two objects are selected.
    pub fn group_selected(&mut self) -> Option<ObjectId> {
        if self.applying_remote {
            return None;
        }
        let ids = self.store.selected_ids().to_vec();
        let plan = plan_group(&self.store, &ids)?;
        self.push_history();
        let group_id = plan.group.id;
        self.store.insert(plan.group);
        self.store.apply_patches(&plan.child_updates);
        self.store.set_selection(vec![group_id]);
        log::debug!("grouped {} objects into {group_id}", ids.len());
        Some(group_id)
    }

    /// Dissolve the selected groups; children are restored to absolute
    /// coordinates and selected.
    pub fn ungroup_selected(&mut self) -> Vec<ObjectId> {
        if self.applying_remote {
            return Vec::new();
        }
        let ids = self.store.selected_ids().to_vec();
        let plan = plan_ungroup(&self.store, &ids);
        if plan.is_empty() {
            return Vec::new();
        }
        self.push_history();
        self.store.apply_patches(&plan.child_updates);
        for &group_id in &plan.delete {
            self.store.remove(group_id);
            if self.editing_group_id == Some(group_id) {
                self.editing_group_id = None;
            }
        }
        self.store.set_selection(plan.select.clone());
        plan.select
    }

    /// Align the selection on the given edge (requires at least two objects).
    pub fn align_selected(&mut self, edge: AlignEdge) {
        if self.applying_remote {
            return;
        }
        let items = self.selected_bounds_items();
        let updates = geometry::align(&items, edge);
        self.apply_deltas(updates);
    }

    /// Distribute the selection along the axis (requires at least three).
    pub fn distribute_selected(&mut self, axis: DistributeAxis) {
        if self.applying_remote {
            return;
        }
        let items = self.selected_bounds_items();
        let updates = geometry::distribute(&items, axis);
        self.apply_deltas(updates);
    }

    fn selected_bounds_items(&self) -> Vec<BoundsItem> {
        self.store
            .selected_ids()
            .iter()
            .filter_map(|&id| {
                let object = self.store.get(id)?;
                let origin = group::absolute_position(&self.store, id);
                Some(BoundsItem {
                    id,
                    bounds: geometry::rotated_bounds(object.rect_at(origin), object.rotation),
                })
            })
            .collect()
    }

    fn apply_deltas(&mut self, updates: Vec<(ObjectId, Vec2)>) {
        if updates.is_empty() {
            return;
        }
        self.push_history();
        let batch: Vec<(ObjectId, ObjectPatch)> = updates
            .into_iter()
            .filter_map(|(id, delta)| {
                let object = self.store.get(id)?;
                Some((
                    id,
                    ObjectPatch::move_to(object.x + delta.x, object.y + delta.y),
                ))
            })
            .collect();
        self.store.apply_patches(&batch);
    }

    // --- Z-order ---

    pub fn bring_selected_to_front(&mut self) {
        let updates = zorder::bring_to_front(&self.store, self.store.selected_ids());
        self.apply_z_updates(updates);
    }

    pub fn send_selected_to_back(&mut self) {
        let updates = zorder::send_to_back(&self.store, self.store.selected_ids());
        self.apply_z_updates(updates);
    }

    pub fn bring_selected_forward(&mut self) {
        let updates = zorder::bring_forward(&self.store, self.store.selected_ids());
        self.apply_z_updates(updates);
    }

    pub fn send_selected_backward(&mut self) {
        let updates = zorder::send_backward(&self.store, self.store.selected_ids());
        self.apply_z_updates(updates);
    }

    fn apply_z_updates(&mut self, updates: Vec<(ObjectId, ObjectPatch)>) {
        if self.applying_remote || updates.is_empty() {
            return;
        }
        self.push_history();
        self.store.apply_patches(&updates);
    }

    // --- Clipboard ---

    /// Deep-copy the selection (with descendants) to the clipboard. Copied
    /// roots are rewritten to canvas-absolute coordinates.
    pub fn copy_selection(&mut self) {
        let ids = self.store.selected_ids().to_vec();
        if ids.is_empty() {
            return;
        }
        let mut contents = Vec::new();
        let mut seen = HashSet::new();
        for &id in &ids {
            for sub_id in self.store.subtree_ids(id) {
                if !seen.insert(sub_id) {
                    continue;
                }
                let Some(object) = self.store.get(sub_id) else {
                    continue;
                };
                let mut clone = object.clone();
                if ids.contains(&sub_id) {
                    let origin = group::absolute_position(&self.store, sub_id);
                    clone.x = origin.x;
                    clone.y = origin.y;
                    clone.parent_id = None;
                }
                contents.push(clone);
            }
        }
        self.clipboard.copy(contents);
    }

    /// Cut = copy + delete.
    pub fn cut_selection(&mut self) {
        if self.applying_remote {
            return;
        }
        self.copy_selection();
        self.delete_selected();
    }

    /// Paste the clipboard contents with the cumulative offset; the pasted
    /// roots become the selection. Returns the pasted root ids.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        if self.applying_remote || self.clipboard.is_empty() {
            return Vec::new();
        }
        self.push_history();
        let clones = self.clipboard.paste();
        let mut z = self.store.next_z_index();
        let mut roots = Vec::new();
        for mut clone in clones {
            clone.z_index = z;
            z += 1;
            if clone.parent_id.is_none() {
                roots.push(clone.id);
            }
            self.store.insert(clone);
        }
        self.store.set_selection(roots.clone());
        roots
    }

    // --- External mutation ---

    /// Run an external (e.g. collaborative-sync) mutation pass against the
    /// store. While it runs, the interactive mutators are no-ops, so a tool
    /// gesture can never interleave with remote state application. The
    /// selection is pruned afterwards.
    pub fn apply_remote(&mut self, apply: impl FnOnce(&mut ObjectStore)) {
        self.applying_remote = true;
        apply(&mut self.store);
        self.store.prune_selection();
        self.applying_remote = false;
    }

    // --- Internal geometry helpers ---

    fn hit_tolerance(&self) -> f64 {
        HIT_TOLERANCE / self.camera.zoom
    }

    fn absolute_box(&self, id: ObjectId) -> Option<Rect> {
        let object = self.store.get(id)?;
        Some(object.rect_at(group::absolute_position(&self.store, id)))
    }

    /// Climb from a hit object to the outermost selectable ancestor: the
    /// top-level ancestor normally, or the direct child of the group being
    /// edited while group-edit mode is active.
    fn promote_hit(&self, id: ObjectId) -> ObjectId {
        let mut current = id;
        let mut visited = HashSet::from([id]);
        while let Some(parent) = self.store.get(current).and_then(|o| o.parent_id) {
            if self.editing_group_id == Some(parent) {
                break;
            }
            if !visited.insert(parent) {
                break;
            }
            if !self.store.contains(parent) {
                break;
            }
            current = parent;
        }
        current
    }
}

impl ToolContext for Editor {
    fn objects(&self) -> &HashMap<ObjectId, CanvasObject> {
        self.store.objects()
    }

    fn object(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.store.get(id)
    }

    fn selected_ids(&self) -> Vec<ObjectId> {
        self.store.selected_ids().to_vec()
    }

    fn viewport(&self) -> &Camera {
        &self.camera
    }

    fn editing_group_id(&self) -> Option<ObjectId> {
        self.editing_group_id
    }

    fn add_object(&mut self, object: CanvasObject) {
        if self.applying_remote {
            return;
        }
        log::debug!("add {} {}", object.kind.name(), object.id);
        self.store.insert(object);
    }

    fn update_object(&mut self, id: ObjectId, patch: ObjectPatch) {
        if self.applying_remote {
            return;
        }
        self.store.apply_patch(id, &patch);
    }

    fn update_objects(&mut self, batch: Vec<(ObjectId, ObjectPatch)>) {
        if self.applying_remote {
            return;
        }
        self.store.apply_patches(&batch);
    }

    fn delete_object(&mut self, id: ObjectId) {
        if self.applying_remote {
            return;
        }
        self.store.remove(id);
    }

    fn set_selection(&mut self, ids: Vec<ObjectId>) {
        if self.applying_remote {
            return;
        }
        self.store.set_selection(ids);
    }

    fn push_history(&mut self) {
        if self.applying_remote {
            return;
        }
        self.history.push_snapshot(self.store.objects());
    }

    fn discard_history_checkpoint(&mut self) {
        self.history.discard_last();
    }

    fn set_active_tool(&mut self, tool: ToolKind) {
        self.pending_tool = Some(tool);
    }

    fn enter_group_edit_mode(&mut self, id: ObjectId) {
        if self.store.get(id).is_some_and(|o| o.is_group()) {
            self.editing_group_id = Some(id);
        }
    }

    fn exit_group_edit_mode(&mut self) {
        self.editing_group_id = None;
    }

    fn request_ui(&mut self, request: UiRequest) {
        self.ui_requests.push(request);
    }

    fn set_cursor(&mut self, cursor: &'static str) {
        self.cursor = cursor;
    }

    fn pan_viewport(&mut self, delta: Vec2) {
        self.camera.pan(delta);
    }

    fn screen_to_canvas(&self, point: Point) -> Point {
        self.camera.screen_to_canvas(point)
    }

    fn canvas_to_screen(&self, point: Point) -> Point {
        self.camera.canvas_to_screen(point)
    }

    fn absolute_position(&self, id: ObjectId) -> Point {
        group::absolute_position(&self.store, id)
    }

    fn hit_test(&self, screen_point: Point) -> Option<ObjectId> {
        let canvas = self.camera.screen_to_canvas(screen_point);
        let tolerance = self.hit_tolerance();
        for id in self.store.ids_by_z().into_iter().rev() {
            let Some(object) = self.store.get(id) else {
                continue;
            };
            if !object.visible {
                continue;
            }
            let origin = group::absolute_position(&self.store, id);
            if object.hit_test(origin, canvas, tolerance) {
                return Some(self.promote_hit(id));
            }
        }
        None
    }

    fn hit_test_handle(&self, screen_point: Point, id: ObjectId) -> Option<ResizeHandle> {
        let bounds = self.absolute_box(id)?;
        let rotation = self.store.get(id)?.rotation;
        let canvas = self.camera.screen_to_canvas(screen_point);
        handles::hit_test_handles(
            bounds,
            rotation,
            canvas,
            HANDLE_HIT_TOLERANCE / self.camera.zoom,
        )
    }

    fn hit_test_rotation_handle(&self, screen_point: Point, id: ObjectId) -> bool {
        let Some(bounds) = self.absolute_box(id) else {
            return false;
        };
        let Some(object) = self.store.get(id) else {
            return false;
        };
        let canvas = self.camera.screen_to_canvas(screen_point);
        handles::hit_test_rotation_handle(
            bounds,
            object.rotation,
            canvas,
            HANDLE_HIT_TOLERANCE / self.camera.zoom,
        )
    }

    fn objects_in_rect(&self, a: Point, b: Point) -> Vec<ObjectId> {
        let rect = Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y));
        self.store
            .ids_by_z()
            .into_iter()
            .filter(|&id| {
                let Some(object) = self.store.get(id) else {
                    return false;
                };
                if !object.visible || object.parent_id.is_some() {
                    return false;
                }
                let origin = group::absolute_position(&self.store, id);
                let bounds = geometry::rotated_bounds(object.rect_at(origin), object.rotation);
                rect.intersect(bounds).area() > 0.0
            })
            .collect()
    }

    fn snap_position(&self, point: Point) -> SnapResult {
        if !self.snap_mode.is_enabled() {
            return SnapResult::none(point);
        }
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        if self.snap_mode.snaps_to_objects() {
            let selected = self.store.selected_ids();
            for (&id, object) in self.store.objects() {
                if !object.visible || object.parent_id.is_some() || selected.contains(&id) {
                    continue;
                }
                let origin = group::absolute_position(&self.store, id);
                let bounds = geometry::rotated_bounds(object.rect_at(origin), object.rotation);
                let (bx, by) = snap::snap_targets_from_bounds(bounds);
                xs.extend(bx);
                ys.extend(by);
            }
        }
        snap::snap_position(point, self.snap_mode, &xs, &ys)
    }

    fn next_z_index(&self) -> i64 {
        self.store.next_z_index()
    }

    fn duplicate_objects(&mut self, ids: &[ObjectId]) -> Vec<ObjectId> {
        if self.applying_remote {
            return Vec::new();
        }
        // Alt-drag duplicates start exactly on their sources; the drag
        // supplies the displacement.
        self.store.duplicate(ids, Vec2::ZERO)
    }

    fn objects_inside_frame(&self, frame_id: ObjectId) -> Vec<ObjectId> {
        let Some(frame_rect) = self.absolute_box(frame_id) else {
            return Vec::new();
        };
        self.store
            .ids_by_z()
            .into_iter()
            .filter(|&id| {
                if id == frame_id {
                    return false;
                }
                let Some(object) = self.store.get(id) else {
                    return false;
                };
                if !object.visible || object.parent_id.is_some() {
                    return false;
                }
                let origin = group::absolute_position(&self.store, id);
                let bounds = geometry::rotated_bounds(object.rect_at(origin), object.rotation);
                frame_rect.x0 <= bounds.x0
                    && frame_rect.y0 <= bounds.y0
                    && frame_rect.x1 >= bounds.x1
                    && frame_rect.y1 >= bounds.y1
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    fn press(editor: &mut Editor, x: f64, y: f64) {
        editor.on_pointer_event(PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        });
    }

    fn drag_to(editor: &mut Editor, x: f64, y: f64) {
        editor.on_pointer_event(PointerEvent::Move {
            position: Point::new(x, y),
        });
    }

    fn release(editor: &mut Editor, x: f64, y: f64) {
        editor.on_pointer_event(PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        });
    }

    fn add_rect(editor: &mut Editor, x: f64, y: f64, w: f64, h: f64) -> ObjectId {
        let mut object = CanvasObject::new(
            ObjectKind::Rect { corner_radius: 0.0 },
            Point::new(x, y),
            w,
            h,
        );
        object.z_index = editor.store().next_z_index();
        let id = object.id;
        editor.add_object(object);
        id
    }

    #[test]
    fn test_click_selects_and_drag_moves() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);

        press(&mut editor, 30.0, 30.0);
        assert_eq!(editor.store().selected_ids(), &[id]);

        drag_to(&mut editor, 80.0, 80.0);
        release(&mut editor, 80.0, 80.0);

        let object = editor.store().get(id).unwrap();
        assert!((object.x - 60.0).abs() < 1e-9);
        assert!((object.y - 60.0).abs() < 1e-9);

        // The drag checkpointed before moving.
        assert!(editor.undo());
        let object = editor.store().get(id).unwrap();
        assert!((object.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_movement_is_a_click_not_a_drag() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);

        press(&mut editor, 30.0, 30.0);
        drag_to(&mut editor, 31.0, 31.0);
        release(&mut editor, 31.0, 31.0);

        let object = editor.store().get(id).unwrap();
        assert!((object.x - 10.0).abs() < 1e-9);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_escape_reverts_drag() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);

        press(&mut editor, 30.0, 30.0);
        drag_to(&mut editor, 130.0, 130.0);
        editor.on_key_event(KeyEvent::Pressed("Escape".to_string()));

        let object = editor.store().get(id).unwrap();
        assert!((object.x - 10.0).abs() < 1e-9);
        // The cancelled gesture left no checkpoint behind.
        assert!(!editor.can_undo());

        release(&mut editor, 130.0, 130.0);
        let object = editor.store().get(id).unwrap();
        assert!((object.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_object_is_selectable_but_not_draggable() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        editor.update_object(
            id,
            ObjectPatch {
                locked: Some(true),
                ..ObjectPatch::default()
            },
        );

        press(&mut editor, 30.0, 30.0);
        assert_eq!(editor.store().selected_ids(), &[id]);
        drag_to(&mut editor, 130.0, 130.0);
        release(&mut editor, 130.0, 130.0);

        let object = editor.store().get(id).unwrap();
        assert!((object.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_alt_drag_duplicates() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);

        editor.set_modifiers(Modifiers {
            alt: true,
            ..Modifiers::default()
        });
        press(&mut editor, 30.0, 30.0);
        drag_to(&mut editor, 80.0, 80.0);
        release(&mut editor, 80.0, 80.0);

        assert_eq!(editor.store().len(), 2);
        // The original stays in place.
        let original = editor.store().get(id).unwrap();
        assert!((original.x - 10.0).abs() < 1e-9);
        // The duplicate is selected and moved.
        let selected = editor.store().selected_ids().to_vec();
        assert_eq!(selected.len(), 1);
        assert_ne!(selected[0], id);
        let duplicate = editor.store().get(selected[0]).unwrap();
        assert!((duplicate.x - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_marquee_selects_intersecting_objects() {
        let mut editor = Editor::new();
        let a = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        let b = add_rect(&mut editor, 100.0, 10.0, 50.0, 50.0);
        let _far = add_rect(&mut editor, 500.0, 500.0, 50.0, 50.0);

        press(&mut editor, 0.0, 0.0);
        drag_to(&mut editor, 160.0, 70.0);
        release(&mut editor, 160.0, 70.0);

        let selected = editor.store().selected_ids();
        assert_eq!(selected.len(), 2);
        assert!(selected.contains(&a));
        assert!(selected.contains(&b));
    }

    #[test]
    fn test_tiny_marquee_clears_selection() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        press(&mut editor, 30.0, 30.0);
        release(&mut editor, 30.0, 30.0);
        assert_eq!(editor.store().selected_ids(), &[id]);

        press(&mut editor, 300.0, 300.0);
        release(&mut editor, 301.0, 301.0);
        assert!(editor.store().selected_ids().is_empty());
    }

    #[test]
    fn test_resize_via_handle() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        editor.set_selection(vec![id]);

        // Bottom-right handle sits at (60, 60); corner resize is
        // proportional by default.
        press(&mut editor, 60.0, 60.0);
        drag_to(&mut editor, 110.0, 60.0);
        release(&mut editor, 110.0, 60.0);

        let object = editor.store().get(id).unwrap();
        assert!((object.width - 100.0).abs() < 1e-9);
        assert!((object.height - 100.0).abs() < 1e-9);
        assert!((object.x - 10.0).abs() < 1e-9);
        assert!((object.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_never_collapses_below_minimum() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        editor.set_selection(vec![id]);

        press(&mut editor, 60.0, 60.0);
        drag_to(&mut editor, -5000.0, -5000.0);
        release(&mut editor, -5000.0, -5000.0);

        let object = editor.store().get(id).unwrap();
        assert!(object.width >= crate::object::MIN_OBJECT_SIZE);
        assert!(object.height >= crate::object::MIN_OBJECT_SIZE);
    }

    #[test]
    fn test_rotate_via_handle() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        editor.set_selection(vec![id]);

        // Rotation handle sits above the top edge at (35, -15); dragging to
        // the right of the center yields 90 degrees.
        press(&mut editor, 35.0, -15.0);
        drag_to(&mut editor, 85.0, 35.0);
        release(&mut editor, 85.0, 35.0);

        let object = editor.store().get(id).unwrap();
        assert!((object.rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_align_right_scenario() {
        let mut editor = Editor::new();
        let ids = [
            add_rect(&mut editor, 0.0, 0.0, 50.0, 50.0),
            add_rect(&mut editor, 100.0, 100.0, 50.0, 50.0),
            add_rect(&mut editor, 200.0, 200.0, 50.0, 50.0),
        ];
        editor.set_selection(ids.to_vec());
        editor.align_selected(AlignEdge::Right);

        for id in ids {
            let object = editor.store().get(id).unwrap();
            assert!((object.x - 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distribute_horizontal_scenario() {
        let mut editor = Editor::new();
        let ids = [
            add_rect(&mut editor, 0.0, 0.0, 50.0, 50.0),
            add_rect(&mut editor, 120.0, 100.0, 50.0, 50.0),
            add_rect(&mut editor, 200.0, 200.0, 50.0, 50.0),
        ];
        editor.set_selection(ids.to_vec());
        editor.distribute_selected(DistributeAxis::Horizontal);

        let first = editor.store().get(ids[0]).unwrap();
        let middle = editor.store().get(ids[1]).unwrap();
        let last = editor.store().get(ids[2]).unwrap();
        assert!((first.x - 0.0).abs() < 1e-9);
        assert!((last.x - 200.0).abs() < 1e-9);
        let gap1 = middle.x - (first.x + 50.0);
        let gap2 = last.x - (middle.x + 50.0);
        assert!((gap1 - gap2).abs() < 1e-9);
    }

    #[test]
    fn test_align_requires_two_selected() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 5.0, 5.0, 50.0, 50.0);
        editor.set_selection(vec![id]);
        editor.align_selected(AlignEdge::Left);
        assert!((editor.store().get(id).unwrap().x - 5.0).abs() < 1e-9);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_undo_redo_round_trip_restores_content() {
        let mut editor = Editor::new();
        let ids = [
            add_rect(&mut editor, 0.0, 0.0, 50.0, 50.0),
            add_rect(&mut editor, 100.0, 100.0, 50.0, 50.0),
        ];
        editor.set_selection(vec![ids[0]]);
        editor.delete_selected();

        let after_delete = editor.store().clone_objects();
        assert!(editor.undo());
        assert!(editor.store().contains(ids[0]));
        assert!(editor.redo());
        assert_eq!(editor.store().clone_objects(), after_delete);
    }

    #[test]
    fn test_bring_forward_scenario() {
        let mut editor = Editor::new();
        let bottom = add_rect(&mut editor, 0.0, 0.0, 50.0, 50.0);
        let middle = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        let top = add_rect(&mut editor, 20.0, 20.0, 50.0, 50.0);
        editor.update_objects(vec![
            (
                bottom,
                ObjectPatch {
                    z_index: Some(1),
                    ..ObjectPatch::default()
                },
            ),
            (
                middle,
                ObjectPatch {
                    z_index: Some(2),
                    ..ObjectPatch::default()
                },
            ),
            (
                top,
                ObjectPatch {
                    z_index: Some(3),
                    ..ObjectPatch::default()
                },
            ),
        ]);

        editor.set_selection(vec![bottom]);
        editor.bring_selected_forward();

        assert_eq!(editor.store().get(bottom).unwrap().z_index, 2);
        assert_eq!(editor.store().get(middle).unwrap().z_index, 1);
        assert_eq!(editor.store().get(top).unwrap().z_index, 3);
    }

    #[test]
    fn test_group_and_ungroup_via_editor() {
        let mut editor = Editor::new();
        let a = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        let b = add_rect(&mut editor, 100.0, 100.0, 50.0, 50.0);
        editor.set_selection(vec![a, b]);

        let group_id = editor.group_selected().unwrap();
        assert_eq!(editor.store().selected_ids(), &[group_id]);
        assert_eq!(editor.store().get(a).unwrap().parent_id, Some(group_id));

        let children = editor.ungroup_selected();
        assert_eq!(children.len(), 2);
        assert!(!editor.store().contains(group_id));
        let a_obj = editor.store().get(a).unwrap();
        assert!((a_obj.x - 10.0).abs() < 1e-9);
        assert_eq!(a_obj.parent_id, None);
    }

    #[test]
    fn test_shape_tool_draws_and_returns_to_select() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Rect);

        press(&mut editor, 10.0, 10.0);
        drag_to(&mut editor, 110.0, 90.0);
        release(&mut editor, 110.0, 90.0);

        assert_eq!(editor.store().len(), 1);
        let selected = editor.store().selected_ids().to_vec();
        assert_eq!(selected.len(), 1);
        let object = editor.store().get(selected[0]).unwrap();
        assert!((object.width - 100.0).abs() < 1e-9);
        assert!((object.height - 80.0).abs() < 1e-9);
        assert_eq!(editor.active_tool(), ToolKind::Select);
    }

    #[test]
    fn test_shape_tool_discards_accidental_click() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Rect);

        press(&mut editor, 10.0, 10.0);
        release(&mut editor, 10.5, 10.5);

        assert!(editor.store().is_empty());
        assert!(!editor.can_undo());
        assert_eq!(editor.active_tool(), ToolKind::Rect);
    }

    #[test]
    fn test_line_tool_records_relative_endpoint() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Line);

        press(&mut editor, 10.0, 10.0);
        drag_to(&mut editor, 110.0, 60.0);
        release(&mut editor, 110.0, 60.0);

        let selected = editor.store().selected_ids().to_vec();
        let object = editor.store().get(selected[0]).unwrap();
        match object.kind {
            ObjectKind::Line { x2, y2 } => {
                assert!((x2 - 100.0).abs() < 1e-9);
                assert!((y2 - 50.0).abs() < 1e-9);
            }
            _ => panic!("expected a line"),
        }
    }

    #[test]
    fn test_pen_tool_stays_active_and_clears_selection() {
        let mut editor = Editor::new();
        editor.set_tool(ToolKind::Pen);

        press(&mut editor, 10.0, 10.0);
        drag_to(&mut editor, 20.0, 30.0);
        drag_to(&mut editor, 40.0, 20.0);
        release(&mut editor, 40.0, 20.0);

        assert_eq!(editor.store().len(), 1);
        assert!(editor.store().selected_ids().is_empty());
        assert_eq!(editor.active_tool(), ToolKind::Pen);

        // Second stroke with the same tool.
        press(&mut editor, 100.0, 100.0);
        drag_to(&mut editor, 150.0, 150.0);
        release(&mut editor, 150.0, 150.0);
        assert_eq!(editor.store().len(), 2);
    }

    #[test]
    fn test_frame_drag_carries_contents() {
        let mut editor = Editor::new();
        let mut frame = CanvasObject::new(ObjectKind::Frame, Point::new(0.0, 0.0), 200.0, 200.0);
        frame.z_index = 0;
        let frame_id = frame.id;
        editor.add_object(frame);
        let inner = add_rect(&mut editor, 50.0, 50.0, 50.0, 50.0);
        let outside = add_rect(&mut editor, 400.0, 400.0, 50.0, 50.0);

        // Press on the frame where nothing else sits.
        press(&mut editor, 150.0, 30.0);
        assert_eq!(editor.store().selected_ids(), &[frame_id]);
        drag_to(&mut editor, 160.0, 40.0);
        release(&mut editor, 160.0, 40.0);

        assert!((editor.store().get(frame_id).unwrap().x - 10.0).abs() < 1e-9);
        assert!((editor.store().get(inner).unwrap().x - 60.0).abs() < 1e-9);
        assert!((editor.store().get(outside).unwrap().x - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_click_group_enters_edit_mode() {
        let mut editor = Editor::new();
        let a = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        let b = add_rect(&mut editor, 100.0, 100.0, 50.0, 50.0);
        editor.set_selection(vec![a, b]);
        let group_id = editor.group_selected().unwrap();

        press(&mut editor, 30.0, 30.0);
        release(&mut editor, 30.0, 30.0);
        press(&mut editor, 30.0, 30.0);
        release(&mut editor, 30.0, 30.0);

        assert_eq!(editor.editing_group_id(), Some(group_id));

        // Escape leaves group-edit mode.
        editor.on_key_event(KeyEvent::Pressed("Escape".to_string()));
        assert_eq!(editor.editing_group_id(), None);
    }

    #[test]
    fn test_copy_paste_cycle() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        editor.set_selection(vec![id]);
        editor.copy_selection();

        let pasted = editor.paste();
        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], id);
        let clone = editor.store().get(pasted[0]).unwrap();
        assert!((clone.x - 20.0).abs() < 1e-9);
        assert_eq!(editor.store().selected_ids(), &pasted[..]);

        let again = editor.paste();
        let clone = editor.store().get(again[0]).unwrap();
        assert!((clone.x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_remote_prunes_selection_and_restores_mutators() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        editor.set_selection(vec![id]);

        editor.apply_remote(|store| {
            store.remove(id);
        });
        assert!(editor.store().selected_ids().is_empty());

        // Interactive mutation works again after the pass.
        let other = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
        assert!(editor.store().contains(other));
    }

    #[test]
    fn test_select_all_is_top_level_only() {
        let mut editor = Editor::new();
        let a = add_rect(&mut editor, 10.0, 10.0, 50.0, 50.0);
        let b = add_rect(&mut editor, 100.0, 100.0, 50.0, 50.0);
        editor.set_selection(vec![a, b]);
        let group_id = editor.group_selected().unwrap();
        let c = add_rect(&mut editor, 300.0, 300.0, 50.0, 50.0);

        editor.select_all();
        let selected = editor.store().selected_ids();
        assert_eq!(selected.len(), 2);
        assert!(selected.contains(&group_id));
        assert!(selected.contains(&c));
    }
}
