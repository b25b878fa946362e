//! Pen tool: free-form point accumulation into path objects.

use crate::context::ToolContext;
use crate::input::Modifiers;
use crate::object::{CanvasObject, ObjectId, ObjectKind, ObjectPatch, MIN_OBJECT_SIZE};
use crate::tools::{Tool, ToolKind, ToolResponse};
use kurbo::Point;

/// Paths with fewer points than this on release are discarded.
pub const MIN_PATH_POINTS: usize = 2;

#[derive(Debug, Clone)]
struct PenGesture {
    id: ObjectId,
    /// Accumulated points in canvas-absolute coordinates.
    points: Vec<Point>,
}

/// The pen tool's state machine.
///
/// Unlike the shape tools it stays active after a stroke finishes, so the
/// user can keep drawing; each finished stroke clears the selection instead
/// of selecting the new path.
#[derive(Debug, Default)]
pub struct PenTool {
    gesture: Option<PenGesture>,
}

impl PenTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn discard_stroke(&mut self, ctx: &mut dyn ToolContext) -> bool {
        match self.gesture.take() {
            Some(gesture) => {
                ctx.delete_object(gesture.id);
                ctx.discard_history_checkpoint();
                true
            }
            None => false,
        }
    }
}

impl Tool for PenTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pen
    }

    fn on_pointer_down(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        let canvas = ctx.screen_to_canvas(position);
        ctx.push_history();
        let mut object = CanvasObject::new(
            ObjectKind::Path {
                points: vec![Point::ZERO],
            },
            canvas,
            0.0,
            0.0,
        );
        object.z_index = ctx.next_z_index();
        let id = object.id;
        ctx.add_object(object);
        self.gesture = Some(PenGesture {
            id,
            points: vec![canvas],
        });
        ToolResponse::redraw().with_cursor("crosshair")
    }

    fn on_pointer_move(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        let Some(gesture) = &mut self.gesture else {
            return ToolResponse::ignored().with_cursor("crosshair");
        };
        let canvas = ctx.screen_to_canvas(position);
        gesture.points.push(canvas);

        // Recompute the bounding box and re-normalize the point list
        // relative to its origin on every move.
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for point in &gesture.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        let normalized: Vec<Point> = gesture
            .points
            .iter()
            .map(|p| Point::new(p.x - min_x, p.y - min_y))
            .collect();
        let patch = ObjectPatch {
            x: Some(min_x),
            y: Some(min_y),
            width: Some((max_x - min_x).max(MIN_OBJECT_SIZE)),
            height: Some((max_y - min_y).max(MIN_OBJECT_SIZE)),
            points: Some(normalized),
            ..ObjectPatch::default()
        };
        let id = gesture.id;
        ctx.update_object(id, patch);
        ToolResponse::redraw().with_cursor("crosshair")
    }

    fn on_pointer_up(
        &mut self,
        ctx: &mut dyn ToolContext,
        _position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        let Some(gesture) = self.gesture.take() else {
            return ToolResponse::ignored();
        };
        if gesture.points.len() < MIN_PATH_POINTS {
            ctx.delete_object(gesture.id);
            ctx.discard_history_checkpoint();
            return ToolResponse::redraw();
        }
        // Stay on the pen tool for the next stroke; a finished stroke is not
        // selected.
        ctx.set_selection(Vec::new());
        ToolResponse::redraw().with_cursor("crosshair")
    }

    fn on_key_down(
        &mut self,
        ctx: &mut dyn ToolContext,
        key: &str,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        if key == "Escape" && self.discard_stroke(ctx) {
            return ToolResponse::redraw();
        }
        ToolResponse::ignored()
    }

    fn on_deactivate(&mut self, ctx: &mut dyn ToolContext) {
        self.discard_stroke(ctx);
    }
}
