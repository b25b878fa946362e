//! Tool system: one state machine per tool, dispatched through a registry.

mod hand;
mod pen;
mod select;
mod shape;
mod text;

pub use hand::HandTool;
pub use pen::PenTool;
pub use select::SelectTool;
pub use shape::ShapeTool;
pub use text::TextTool;

use crate::context::ToolContext;
use crate::input::Modifiers;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Rect,
    Ellipse,
    Frame,
    Line,
    Arrow,
    Pen,
    Text,
    Hand,
}

/// What a tool did with an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolResponse {
    /// Whether the event was consumed.
    pub handled: bool,
    /// Cursor the host should display, if the tool wants to change it.
    pub cursor: Option<&'static str>,
    /// Whether the canvas needs to be redrawn.
    pub request_redraw: bool,
}

impl ToolResponse {
    /// Event not consumed.
    pub fn ignored() -> Self {
        Self::default()
    }

    /// Event consumed, no visual change.
    pub fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    /// Event consumed and the canvas changed.
    pub fn redraw() -> Self {
        Self {
            handled: true,
            request_redraw: true,
            ..Self::default()
        }
    }

    /// Attach a cursor to the response.
    pub fn with_cursor(mut self, cursor: &'static str) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// A tool state machine.
///
/// Tools receive the normalized event set with screen-space positions and
/// react by mutating the document through the [`ToolContext`]. Each tool owns
/// only its private state; it never reaches into another tool.
pub trait Tool: std::fmt::Debug {
    fn kind(&self) -> ToolKind;

    fn on_pointer_down(
        &mut self,
        _ctx: &mut dyn ToolContext,
        _position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        ToolResponse::ignored()
    }

    fn on_pointer_move(
        &mut self,
        _ctx: &mut dyn ToolContext,
        _position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        ToolResponse::ignored()
    }

    fn on_pointer_up(
        &mut self,
        _ctx: &mut dyn ToolContext,
        _position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        ToolResponse::ignored()
    }

    fn on_double_click(
        &mut self,
        _ctx: &mut dyn ToolContext,
        _position: Point,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        ToolResponse::ignored()
    }

    fn on_key_down(
        &mut self,
        _ctx: &mut dyn ToolContext,
        _key: &str,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        ToolResponse::ignored()
    }

    fn on_key_up(
        &mut self,
        _ctx: &mut dyn ToolContext,
        _key: &str,
        _modifiers: Modifiers,
    ) -> ToolResponse {
        ToolResponse::ignored()
    }

    /// Called when the tool stops being active; must cancel any in-progress
    /// gesture and leave the tool in its idle state.
    fn on_deactivate(&mut self, _ctx: &mut dyn ToolContext) {}
}

/// Registry of tool state machines and the active selection among them.
#[derive(Debug)]
pub struct ToolManager {
    tools: HashMap<ToolKind, Box<dyn Tool>>,
    active: ToolKind,
}

impl ToolManager {
    /// Create a manager with the full tool set registered.
    pub fn new() -> Self {
        let mut tools: HashMap<ToolKind, Box<dyn Tool>> = HashMap::new();
        tools.insert(ToolKind::Select, Box::new(SelectTool::new()));
        tools.insert(ToolKind::Rect, Box::new(ShapeTool::new(ToolKind::Rect)));
        tools.insert(
            ToolKind::Ellipse,
            Box::new(ShapeTool::new(ToolKind::Ellipse)),
        );
        tools.insert(ToolKind::Frame, Box::new(ShapeTool::new(ToolKind::Frame)));
        tools.insert(ToolKind::Line, Box::new(ShapeTool::new(ToolKind::Line)));
        tools.insert(ToolKind::Arrow, Box::new(ShapeTool::new(ToolKind::Arrow)));
        tools.insert(ToolKind::Pen, Box::new(PenTool::new()));
        tools.insert(ToolKind::Text, Box::new(TextTool::new()));
        tools.insert(ToolKind::Hand, Box::new(HandTool::new()));
        Self {
            tools,
            active: ToolKind::Select,
        }
    }

    /// The active tool kind.
    pub fn active(&self) -> ToolKind {
        self.active
    }

    /// Mark a tool active. The caller is responsible for deactivating the
    /// previous tool first.
    pub fn set_active(&mut self, kind: ToolKind) {
        self.active = kind;
    }

    /// Temporarily take a tool out of the registry for dispatch, so the
    /// editor can be borrowed mutably as the tool context.
    pub fn take(&mut self, kind: ToolKind) -> Option<Box<dyn Tool>> {
        self.tools.remove(&kind)
    }

    /// Return a tool taken with [`ToolManager::take`].
    pub fn put_back(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.kind(), tool);
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}
