//! Select tool: click selection, drag, resize, rotate, and marquee.

use crate::context::{ToolContext, UiRequest};
use crate::handles::{apply_resize, ResizeHandle, ResizeStart};
use crate::input::Modifiers;
use crate::object::{ObjectId, ObjectKind, ObjectPatch};
use crate::snap::{snap_angle, ANGLE_SNAP_INCREMENT};
use crate::tools::{Tool, ToolKind, ToolResponse};
use kurbo::{Point, Rect, Vec2};

/// Screen-space movement required before a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

/// A marquee smaller than this (screen pixels, both axes) degenerates to a
/// click on empty space.
pub const MIN_MARQUEE_SIZE: f64 = 3.0;

/// Geometry captured when a resize gesture starts, for live updates and for
/// restoring on Escape.
#[derive(Debug, Clone)]
struct ResizeGesture {
    id: ObjectId,
    handle: ResizeHandle,
    start_canvas: Point,
    /// Absolute box and font size at gesture start.
    start: ResizeStart,
    /// Absolute origin minus local origin, for writing parent-relative
    /// coordinates back.
    parent_offset: Vec2,
    /// Local fields at gesture start, for Escape.
    original: ObjectPatch,
}

#[derive(Debug, Clone, Default)]
enum SelectState {
    #[default]
    Idle,
    /// Pressed on an object; becomes a drag once the threshold is passed.
    PendingDrag {
        start_screen: Point,
        start_canvas: Point,
    },
    Dragging {
        start_canvas: Point,
        /// Dragged ids with their local positions at gesture start.
        originals: Vec<(ObjectId, Point)>,
        /// Alt-drag: the dragged ids are fresh duplicates; `sources` is the
        /// selection to restore if the gesture is cancelled.
        duplicated: bool,
        sources: Vec<ObjectId>,
    },
    Resizing(ResizeGesture),
    Rotating {
        id: ObjectId,
        original_rotation: f64,
    },
    Marquee {
        start_screen: Point,
        start_canvas: Point,
        additive: bool,
    },
}

/// The select tool's state machine.
#[derive(Debug, Default)]
pub struct SelectTool {
    state: SelectState,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any in-progress gesture, restoring pre-gesture state.
    fn cancel(&mut self, ctx: &mut dyn ToolContext) -> ToolResponse {
        match std::mem::take(&mut self.state) {
            SelectState::Idle | SelectState::PendingDrag { .. } => ToolResponse::ignored(),
            SelectState::Dragging {
                originals,
                duplicated,
                sources,
                ..
            } => {
                if duplicated {
                    for (id, _) in &originals {
                        ctx.delete_object(*id);
                    }
                    ctx.set_selection(sources);
                } else {
                    let batch = originals
                        .into_iter()
                        .map(|(id, origin)| (id, ObjectPatch::move_to(origin.x, origin.y)))
                        .collect();
                    ctx.update_objects(batch);
                }
                ctx.discard_history_checkpoint();
                ToolResponse::redraw()
            }
            SelectState::Resizing(gesture) => {
                ctx.update_object(gesture.id, gesture.original);
                ctx.discard_history_checkpoint();
                ToolResponse::redraw()
            }
            SelectState::Rotating {
                id,
                original_rotation,
            } => {
                ctx.update_object(
                    id,
                    ObjectPatch {
                        rotation: Some(original_rotation),
                        ..ObjectPatch::default()
                    },
                );
                ctx.discard_history_checkpoint();
                ToolResponse::redraw()
            }
            SelectState::Marquee { .. } => ToolResponse::redraw(),
        }
    }

    /// Absolute box of a single object, for handle hit-testing and resize.
    fn absolute_box(ctx: &dyn ToolContext, id: ObjectId) -> Option<Rect> {
        let object = ctx.object(id)?;
        let origin = ctx.absolute_position(id);
        Some(object.rect_at(origin))
    }

    /// Begin a resize gesture on the only selected object.
    fn begin_resize(
        &mut self,
        ctx: &mut dyn ToolContext,
        id: ObjectId,
        handle: ResizeHandle,
        start_canvas: Point,
    ) -> ToolResponse {
        let Some(object) = ctx.object(id) else {
            return ToolResponse::ignored();
        };
        let font_size = match &object.kind {
            ObjectKind::Text { font_size, .. } => Some(*font_size),
            _ => None,
        };
        let original = ObjectPatch {
            x: Some(object.x),
            y: Some(object.y),
            width: Some(object.width),
            height: Some(object.height),
            font_size,
            ..ObjectPatch::default()
        };
        let local = Point::new(object.x, object.y);
        let origin = ctx.absolute_position(id);
        let rect = Rect::new(
            origin.x,
            origin.y,
            origin.x + original.width.unwrap_or(0.0),
            origin.y + original.height.unwrap_or(0.0),
        );
        ctx.push_history();
        self.state = SelectState::Resizing(ResizeGesture {
            id,
            handle,
            start_canvas,
            start: ResizeStart { rect, font_size },
            parent_offset: Vec2::new(origin.x - local.x, origin.y - local.y),
            original,
        });
        ToolResponse::handled().with_cursor(handle.cursor())
    }

    /// Promote a pending press into a drag, duplicating first on Alt.
    fn begin_drag(
        &mut self,
        ctx: &mut dyn ToolContext,
        start_canvas: Point,
        modifiers: Modifiers,
    ) {
        let sources: Vec<ObjectId> = ctx
            .selected_ids()
            .into_iter()
            .filter(|&id| ctx.object(id).is_some_and(|o| !o.locked))
            .collect();
        if sources.is_empty() {
            return;
        }

        ctx.push_history();
        let (drag_roots, duplicated) = if modifiers.alt {
            let duplicates = ctx.duplicate_objects(&sources);
            if duplicates.is_empty() {
                ctx.discard_history_checkpoint();
                return;
            }
            ctx.set_selection(duplicates.clone());
            (duplicates, true)
        } else {
            (sources.clone(), false)
        };

        // Dragging a frame carries the objects spatially inside it.
        let mut drag_ids = drag_roots.clone();
        for &id in &drag_roots {
            if ctx.object(id).is_some_and(|o| o.is_frame()) {
                for inside in ctx.objects_inside_frame(id) {
                    let movable = ctx
                        .object(inside)
                        .is_some_and(|o| !o.locked && o.parent_id.is_none());
                    if movable && !drag_ids.contains(&inside) {
                        drag_ids.push(inside);
                    }
                }
            }
        }

        let originals = drag_ids
            .into_iter()
            .filter_map(|id| ctx.object(id).map(|o| (id, Point::new(o.x, o.y))))
            .collect();
        self.state = SelectState::Dragging {
            start_canvas,
            originals,
            duplicated,
            sources,
        };
    }

    /// Apply the current drag delta as one batched move.
    fn apply_drag(
        ctx: &mut dyn ToolContext,
        start_canvas: Point,
        originals: &[(ObjectId, Point)],
        position: Point,
    ) -> ToolResponse {
        let canvas = ctx.screen_to_canvas(position);
        let delta = Vec2::new(canvas.x - start_canvas.x, canvas.y - start_canvas.y);

        // Snap the primary object's would-be origin; every dragged object
        // moves by the same adjusted delta so the group stays rigid.
        let delta = match originals.first() {
            Some(&(_, origin)) => {
                let snapped =
                    ctx.snap_position(Point::new(origin.x + delta.x, origin.y + delta.y));
                Vec2::new(snapped.x - origin.x, snapped.y - origin.y)
            }
            None => delta,
        };

        let batch = originals
            .iter()
            .map(|&(id, origin)| {
                (
                    id,
                    ObjectPatch::move_to(origin.x + delta.x, origin.y + delta.y),
                )
            })
            .collect();
        ctx.update_objects(batch);
        ToolResponse::redraw().with_cursor("move")
    }

    fn apply_resize_move(
        ctx: &mut dyn ToolContext,
        gesture: &ResizeGesture,
        position: Point,
        modifiers: Modifiers,
    ) -> ToolResponse {
        let canvas = ctx.screen_to_canvas(position);
        let delta = Vec2::new(
            canvas.x - gesture.start_canvas.x,
            canvas.y - gesture.start_canvas.y,
        );
        // Corners are proportional by default; the modifier frees them.
        let proportional = !modifiers.shift;
        let outcome = apply_resize(&gesture.start, gesture.handle, delta, proportional);
        let patch = ObjectPatch {
            x: Some(outcome.rect.x0 - gesture.parent_offset.x),
            y: Some(outcome.rect.y0 - gesture.parent_offset.y),
            width: Some(outcome.rect.width()),
            height: Some(outcome.rect.height()),
            font_size: outcome.font_size,
            ..ObjectPatch::default()
        };
        ctx.update_object(gesture.id, patch);
        ToolResponse::redraw().with_cursor(gesture.handle.cursor())
    }

    fn apply_rotate_move(
        ctx: &mut dyn ToolContext,
        id: ObjectId,
        position: Point,
        modifiers: Modifiers,
    ) -> ToolResponse {
        let Some(bounds) = Self::absolute_box(ctx, id) else {
            return ToolResponse::ignored();
        };
        // Angle from the object's center to the pointer, in screen space,
        // with 0° pointing up.
        let center = ctx.canvas_to_screen(bounds.center());
        let dx = position.x - center.x;
        let dy = position.y - center.y;
        let mut degrees = dy.atan2(dx).to_degrees() + 90.0;
        if modifiers.shift {
            degrees = snap_angle(degrees, ANGLE_SNAP_INCREMENT);
        }
        ctx.update_object(
            id,
            ObjectPatch {
                rotation: Some(degrees),
                ..ObjectPatch::default()
            },
        );
        ToolResponse::redraw().with_cursor("grabbing")
    }

    /// Close a marquee gesture: tiny rectangles degenerate to a click on
    /// empty space.
    fn finish_marquee(
        &mut self,
        ctx: &mut dyn ToolContext,
        start_screen: Point,
        start_canvas: Point,
        additive: bool,
        position: Point,
    ) -> ToolResponse {
        self.state = SelectState::Idle;
        let width = (position.x - start_screen.x).abs();
        let height = (position.y - start_screen.y).abs();
        if width < MIN_MARQUEE_SIZE && height < MIN_MARQUEE_SIZE {
            if !additive {
                ctx.set_selection(Vec::new());
            }
            return ToolResponse::redraw();
        }

        let canvas = ctx.screen_to_canvas(position);
        let hits = ctx.objects_in_rect(start_canvas, canvas);
        let selection = if additive {
            let mut merged = ctx.selected_ids();
            for id in hits {
                if !merged.contains(&id) {
                    merged.push(id);
                }
            }
            merged
        } else {
            hits
        };
        ctx.set_selection(selection);
        ToolResponse::redraw()
    }

    /// Hover feedback while idle.
    fn hover_cursor(ctx: &mut dyn ToolContext, position: Point) -> ToolResponse {
        let selected = ctx.selected_ids();
        if let [id] = selected[..] {
            if ctx.object(id).is_some_and(|o| !o.locked) {
                if ctx.hit_test_rotation_handle(position, id) {
                    return ToolResponse::ignored().with_cursor("grab");
                }
                if let Some(handle) = ctx.hit_test_handle(position, id) {
                    return ToolResponse::ignored().with_cursor(handle.cursor());
                }
            }
        }
        if ctx.hit_test(position).is_some() {
            ToolResponse::ignored().with_cursor("move")
        } else {
            ToolResponse::ignored().with_cursor("default")
        }
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn on_pointer_down(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        modifiers: Modifiers,
    ) -> ToolResponse {
        let canvas = ctx.screen_to_canvas(position);

        // Handles first, and only for a single unlocked selection.
        let selected = ctx.selected_ids();
        if let [id] = selected[..] {
            if ctx.object(id).is_some_and(|o| !o.locked) {
                if ctx.hit_test_rotation_handle(position, id) {
                    let original_rotation = ctx.object(id).map_or(0.0, |o| o.rotation);
                    ctx.push_history();
                    self.state = SelectState::Rotating {
                        id,
                        original_rotation,
                    };
                    return ToolResponse::handled().with_cursor("grabbing");
                }
                if let Some(handle) = ctx.hit_test_handle(position, id) {
                    return self.begin_resize(ctx, id, handle, canvas);
                }
            }
        }

        match ctx.hit_test(position) {
            Some(id) => {
                if modifiers.shift {
                    let mut selection = ctx.selected_ids();
                    if let Some(index) = selection.iter().position(|&s| s == id) {
                        selection.remove(index);
                    } else {
                        selection.push(id);
                    }
                    ctx.set_selection(selection);
                } else if !ctx.selected_ids().contains(&id) {
                    ctx.set_selection(vec![id]);
                }
                self.state = SelectState::PendingDrag {
                    start_screen: position,
                    start_canvas: canvas,
                };
                ToolResponse::redraw()
            }
            None => {
                self.state = SelectState::Marquee {
                    start_screen: position,
                    start_canvas: canvas,
                    additive: modifiers.shift,
                };
                ToolResponse::handled()
            }
        }
    }

    fn on_pointer_move(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        modifiers: Modifiers,
    ) -> ToolResponse {
        // Promote a pending press into a drag once the threshold is passed.
        if let SelectState::PendingDrag {
            start_screen,
            start_canvas,
        } = &self.state
        {
            let moved = (position.x - start_screen.x)
                .abs()
                .max((position.y - start_screen.y).abs());
            let start_canvas = *start_canvas;
            if moved > DRAG_THRESHOLD {
                self.begin_drag(ctx, start_canvas, modifiers);
            }
        }

        match &self.state {
            SelectState::Idle => Self::hover_cursor(ctx, position),
            SelectState::PendingDrag { .. } => ToolResponse::handled(),
            SelectState::Dragging {
                start_canvas,
                originals,
                ..
            } => Self::apply_drag(ctx, *start_canvas, originals, position),
            SelectState::Resizing(gesture) => {
                Self::apply_resize_move(ctx, gesture, position, modifiers)
            }
            SelectState::Rotating { id, .. } => {
                Self::apply_rotate_move(ctx, *id, position, modifiers)
            }
            SelectState::Marquee { .. } => ToolResponse::redraw(),
        }
    }

    fn on_pointer_up(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        match std::mem::take(&mut self.state) {
            SelectState::Idle => ToolResponse::ignored(),
            SelectState::PendingDrag { .. } => ToolResponse::handled(),
            SelectState::Dragging { .. } | SelectState::Resizing(_) | SelectState::Rotating { .. } => {
                ToolResponse::redraw().with_cursor("default")
            }
            SelectState::Marquee {
                start_screen,
                start_canvas,
                additive,
            } => self.finish_marquee(ctx, start_screen, start_canvas, additive, position),
        }
    }

    fn on_double_click(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        let Some(id) = ctx.hit_test(position) else {
            return ToolResponse::ignored();
        };
        let Some(object) = ctx.object(id) else {
            return ToolResponse::ignored();
        };
        match object.kind {
            ObjectKind::Text { .. } => {
                ctx.set_selection(vec![id]);
                ctx.request_ui(UiRequest::EditText(id));
                ToolResponse::redraw()
            }
            ObjectKind::Frame => {
                ctx.set_selection(vec![id]);
                ctx.request_ui(UiRequest::RenameFrame(id));
                ToolResponse::handled()
            }
            ObjectKind::Group { .. } => {
                ctx.enter_group_edit_mode(id);
                ToolResponse::redraw()
            }
            ObjectKind::Video { .. } => {
                ctx.request_ui(UiRequest::ToggleMediaPlayback(id));
                ToolResponse::handled()
            }
            _ => ToolResponse::ignored(),
        }
    }

    fn on_key_down(
        &mut self,
        ctx: &mut dyn ToolContext,
        key: &str,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        if key != "Escape" {
            return ToolResponse::ignored();
        }
        if !matches!(self.state, SelectState::Idle) {
            return self.cancel(ctx);
        }
        if ctx.editing_group_id().is_some() {
            ctx.exit_group_edit_mode();
            return ToolResponse::redraw();
        }
        if !ctx.selected_ids().is_empty() {
            ctx.set_selection(Vec::new());
            return ToolResponse::redraw();
        }
        ToolResponse::ignored()
    }

    fn on_deactivate(&mut self, ctx: &mut dyn ToolContext) {
        self.cancel(ctx);
    }
}
