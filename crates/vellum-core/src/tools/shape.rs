//! Shape-drawing tools: rectangle, ellipse, frame, line, and arrow.

use crate::context::ToolContext;
use crate::input::Modifiers;
use crate::object::{CanvasObject, ObjectId, ObjectKind, ObjectPatch, MIN_OBJECT_SIZE};
use crate::snap::{snap_line_endpoint, LINE_ANGLE_INCREMENT};
use crate::tools::{Tool, ToolKind, ToolResponse};
use kurbo::Point;

/// Objects smaller than this on release are discarded as accidental clicks.
pub const MIN_DRAW_SIZE: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
struct DrawGesture {
    id: ObjectId,
    start_canvas: Point,
}

/// One state machine shared by the five drag-to-draw shape tools.
///
/// Press inserts a zero-size object immediately so the preview is live; drag
/// updates its geometry; release discards accidental clicks, selects the new
/// object, and hands control back to Select.
#[derive(Debug)]
pub struct ShapeTool {
    kind: ToolKind,
    gesture: Option<DrawGesture>,
}

impl ShapeTool {
    /// Create a shape tool. `kind` must be one of the drag-to-draw kinds.
    pub fn new(kind: ToolKind) -> Self {
        debug_assert!(matches!(
            kind,
            ToolKind::Rect | ToolKind::Ellipse | ToolKind::Frame | ToolKind::Line | ToolKind::Arrow
        ));
        Self {
            kind,
            gesture: None,
        }
    }

    fn new_object(&self, origin: Point) -> CanvasObject {
        let kind = match self.kind {
            ToolKind::Ellipse => ObjectKind::Ellipse,
            ToolKind::Frame => ObjectKind::Frame,
            ToolKind::Line => ObjectKind::Line { x2: 0.0, y2: 0.0 },
            ToolKind::Arrow => ObjectKind::Arrow { x2: 0.0, y2: 0.0 },
            _ => ObjectKind::Rect { corner_radius: 0.0 },
        };
        let mut object = CanvasObject::new(kind, origin, 0.0, 0.0);
        if self.kind == ToolKind::Frame {
            object.name = Some("Frame".to_string());
        }
        object
    }

    fn is_line_like(&self) -> bool {
        matches!(self.kind, ToolKind::Line | ToolKind::Arrow)
    }

    /// Delete the in-progress preview and drop its history checkpoint.
    fn discard_preview(&mut self, ctx: &mut dyn ToolContext) -> bool {
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

impl Tool for ShapeTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn on_pointer_down(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        let canvas = ctx.screen_to_canvas(position);
        ctx.push_history();
        let mut object = self.new_object(canvas);
        object.z_index = ctx.next_z_index();
        let id = object.id;
        ctx.add_object(object);
        self.gesture = Some(DrawGesture {
            id,
            start_canvas: canvas,
        });
        ToolResponse::redraw().with_cursor("crosshair")
    }

    fn on_pointer_move(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        modifiers: Modifiers,
    ) -> ToolResponse {
        let Some(gesture) = self.gesture else {
            return ToolResponse::ignored().with_cursor("crosshair");
        };
        let canvas = ctx.screen_to_canvas(position);
        let start = gesture.start_canvas;

        let patch = if self.is_line_like() {
            // The origin stays at the press point; the free endpoint follows
            // the pointer, optionally snapped to 45-degree increments.
            let end = if modifiers.shift {
                snap_line_endpoint(start, canvas, LINE_ANGLE_INCREMENT)
            } else {
                canvas
            };
            let dx = end.x - start.x;
            let dy = end.y - start.y;
            ObjectPatch {
                x2: Some(dx),
                y2: Some(dy),
                width: Some(dx.abs()),
                height: Some(dy.abs()),
                ..ObjectPatch::default()
            }
        } else {
            let mut width = (canvas.x - start.x).abs();
            let mut height = (canvas.y - start.y).abs();
            if modifiers.shift {
                // Constrain to a square (circle for the ellipse tool).
                let side = width.max(height);
                width = side;
                height = side;
            }
            let x = if canvas.x < start.x { start.x - width } else { start.x };
            let y = if canvas.y < start.y { start.y - height } else { start.y };
            ObjectPatch {
                x: Some(x),
                y: Some(y),
                width: Some(width),
                height: Some(height),
                ..ObjectPatch::default()
            }
        };
        ctx.update_object(gesture.id, patch);
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

        let big_enough = ctx.object(gesture.id).is_some_and(|object| {
            if self.is_line_like() {
                match object.kind {
                    ObjectKind::Line { x2, y2 } | ObjectKind::Arrow { x2, y2 } => {
                        (x2 * x2 + y2 * y2).sqrt() >= MIN_DRAW_SIZE
                    }
                    _ => false,
                }
            } else {
                // A bare click leaves both dimensions at the store minimum.
                object.width.max(object.height) >= MIN_DRAW_SIZE.max(MIN_OBJECT_SIZE)
            }
        });

        if !big_enough {
            ctx.delete_object(gesture.id);
            ctx.discard_history_checkpoint();
            return ToolResponse::redraw();
        }

        ctx.set_selection(vec![gesture.id]);
        ctx.set_active_tool(ToolKind::Select);
        ToolResponse::redraw().with_cursor("default")
    }

    fn on_key_down(
        &mut self,
        ctx: &mut dyn ToolContext,
        key: &str,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        if key == "Escape" && self.discard_preview(ctx) {
            return ToolResponse::redraw();
        }
        ToolResponse::ignored()
    }

    fn on_deactivate(&mut self, ctx: &mut dyn ToolContext) {
        self.discard_preview(ctx);
    }
}
