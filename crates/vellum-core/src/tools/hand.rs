//! Hand tool: drag to pan the viewport. Never mutates the document.

use crate::context::ToolContext;
use crate::input::Modifiers;
use crate::tools::{Tool, ToolKind, ToolResponse};
use kurbo::{Point, Vec2};

/// The hand tool's state machine.
#[derive(Debug, Default)]
pub struct HandTool {
    /// Last pointer position while panning, in screen coordinates.
    last_screen: Option<Point>,
}

impl HandTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for HandTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Hand
    }

    fn on_pointer_down(
        &mut self,
        _ctx: &mut dyn ToolContext,
        position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        self.last_screen = Some(position);
        ToolResponse::handled().with_cursor("grabbing")
    }

    fn on_pointer_move(
        &mut self,
        ctx: &mut dyn ToolContext,
        position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        let Some(last) = self.last_screen else {
            return ToolResponse::ignored().with_cursor("grab");
        };
        ctx.pan_viewport(Vec2::new(position.x - last.x, position.y - last.y));
        self.last_screen = Some(position);
        ToolResponse::redraw().with_cursor("grabbing")
    }

    fn on_pointer_up(
        &mut self,
        _ctx: &mut dyn ToolContext,
        _position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        self.last_screen = None;
        ToolResponse::handled().with_cursor("grab")
    }

    fn on_deactivate(&mut self, _ctx: &mut dyn ToolContext) {
        self.last_screen = None;
    }
}
