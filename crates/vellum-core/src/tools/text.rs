//! Text tool: click to place a text object and open the editor.

use crate::context::{ToolContext, UiRequest};
use crate::input::Modifiers;
use crate::object::{CanvasObject, ObjectKind};
use crate::tools::{Tool, ToolKind, ToolResponse};
use kurbo::Point;

const DEFAULT_TEXT_WIDTH: f64 = 120.0;
const DEFAULT_TEXT_HEIGHT: f64 = 28.0;
const DEFAULT_FONT_SIZE: f64 = 16.0;

/// The text tool: a single click places an empty text object, requests the
/// host's text editor, and hands control back to Select.
#[derive(Debug, Default)]
pub struct TextTool;

impl TextTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
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
            ObjectKind::Text {
                content: String::new(),
                font_size: DEFAULT_FONT_SIZE,
            },
            canvas,
            DEFAULT_TEXT_WIDTH,
            DEFAULT_TEXT_HEIGHT,
        );
        object.z_index = ctx.next_z_index();
        object.stroke = None;
        let id = object.id;
        ctx.add_object(object);
        ctx.set_selection(vec![id]);
        ctx.request_ui(UiRequest::EditText(id));
        ctx.set_active_tool(ToolKind::Select);
        ToolResponse::redraw().with_cursor("text")
    }

    fn on_pointer_move(
        &mut self,
        _ctx: &mut dyn ToolContext,
        _position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        ToolResponse::ignored().with_cursor("text")
    }
}
