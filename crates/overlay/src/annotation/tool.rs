//! Drawing tools and per-tool state

use super::primitive::{Color, Primitive, Stroke, DEFAULT_COLOR, DEFAULT_STROKE_WIDTH};

/// Active drawing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    None,
    Rectangle,
    Ellipse,
    Arrow,
    FreehandBrush,
    Text,
    Mosaic,
}

impl Tool {
    /// Tools shown on the toolbar, in order
    pub const DRAWING: [Tool; 6] = [
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Arrow,
        Tool::FreehandBrush,
        Tool::Text,
        Tool::Mosaic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::None => "none",
            Tool::Rectangle => "rectangle",
            Tool::Ellipse => "ellipse",
            Tool::Arrow => "arrow",
            Tool::FreehandBrush => "brush",
            Tool::Text => "text",
            Tool::Mosaic => "mosaic",
        }
    }
}

/// What a toolbar tool click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSwitch {
    /// Same tool clicked again; carries the new panel visibility
    PanelToggled(bool),
    Switched { from: Tool, to: Tool },
}

/// Current tool, colour and width plus the primitive being grown
#[derive(Debug, Clone)]
pub struct ToolState {
    pub current: Tool,
    pub color: Color,
    pub stroke_width: f64,
    pub(crate) pending: Option<Primitive>,
    panel_open: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            current: Tool::None,
            color: DEFAULT_COLOR,
            stroke_width: DEFAULT_STROKE_WIDTH,
            pending: None,
            panel_open: false,
        }
    }
}

impl ToolState {
    pub fn stroke(&self) -> Stroke {
        Stroke { color: self.color, width: self.stroke_width }
    }

    /// True between a tool's pointer-down and pointer-up
    pub fn is_drawing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&Primitive> {
        self.pending.as_ref()
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub(crate) fn switch(&mut self, tool: Tool) -> ToolSwitch {
        if tool == self.current {
            self.panel_open = !self.panel_open;
            return ToolSwitch::PanelToggled(self.panel_open);
        }

        let from = self.current;
        self.current = tool;
        self.pending = None;
        self.panel_open = tool != Tool::None;
        ToolSwitch::Switched { from, to: tool }
    }
}
