//! Pointer-driven annotation state machine

use super::layer::{AnnotationLayer, TextDraft, Undone, DRAFT_MIN_WIDTH};
use super::mosaic::{pixelate, MOSAIC_BLOCK, MOSAIC_WIDTH_FACTOR};
use super::primitive::{
    Arrow, Color, MosaicStroke, Primitive, Shape, StrokePath, TextLabel, TEXT_BASELINE_NUDGE,
    TEXT_FONT_SIZE,
};
use super::text::{ApproxMeasure, TextMeasure};
use super::tool::{Tool, ToolState, ToolSwitch};
use crate::geometry::{Point, Rectangle};
use image::RgbaImage;
use std::sync::Arc;

/// Drag of a committed label, alive while the pointer is captured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelDrag {
    pub index: usize,
    pub anchor_point: Point,
    pub anchor_position: Point,
}

/// Result of a pointer-down routed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownOutcome {
    /// An open draft was committed (or discarded if blank); nothing else happened
    DraftClosed,
    DraggingLabel(usize),
    Drawing,
    DraftOpened,
    /// Outside the selection, or no drawing tool active
    Ignored,
}

pub struct AnnotationEngine {
    tools: ToolState,
    layer: AnnotationLayer,
    label_drag: Option<LabelDrag>,
    source: Option<Arc<RgbaImage>>,
    pattern: Option<Arc<RgbaImage>>,
    measure: Box<dyn TextMeasure>,
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationEngine {
    pub fn new() -> Self {
        Self {
            tools: ToolState::default(),
            layer: AnnotationLayer::new(),
            label_drag: None,
            source: None,
            pattern: None,
            measure: Box::new(ApproxMeasure),
        }
    }

    /// Screenshot that mosaic strokes pixelate
    pub fn with_source(mut self, source: Arc<RgbaImage>) -> Self {
        self.source = Some(source);
        self.pattern = None;
        self
    }

    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn layer(&self) -> &AnnotationLayer {
        &self.layer
    }

    pub fn tool(&self) -> Tool {
        self.tools.current
    }

    pub fn set_color(&mut self, color: Color) {
        self.tools.color = color;
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.tools.stroke_width = width.max(1.0);
    }

    pub fn is_drawing(&self) -> bool {
        self.tools.is_drawing()
    }

    pub fn is_dragging_label(&self) -> bool {
        self.label_drag.is_some()
    }

    /// Toolbar tool click
    pub fn select_tool(&mut self, tool: Tool) -> ToolSwitch {
        if tool != self.tools.current {
            self.commit_text();
        }
        let switch = self.tools.switch(tool);
        log::debug!("Tool click {} -> {:?}", tool.name(), switch);
        switch
    }

    /// Topmost committed label under `p`
    pub fn label_at(&self, p: Point) -> Option<usize> {
        self.layer.label_at(p)
    }

    pub fn pointer_down(&mut self, p: Point, selection: &Rectangle) -> DownOutcome {
        if self.layer.draft().is_some() {
            self.commit_text();
            return DownOutcome::DraftClosed;
        }

        if let Some(index) = self.layer.label_at(p) {
            if let Some(Primitive::Text(label)) = self.layer.primitives().get(index) {
                self.label_drag = Some(LabelDrag {
                    index,
                    anchor_point: p,
                    anchor_position: label.position,
                });
                return DownOutcome::DraggingLabel(index);
            }
        }

        if self.tools.current == Tool::None || !selection.contains(p) {
            return DownOutcome::Ignored;
        }

        let stroke = self.tools.stroke();
        let pending = match self.tools.current {
            Tool::None => return DownOutcome::Ignored,
            Tool::Text => {
                self.layer.open_draft(TextDraft {
                    position: p,
                    text: String::new(),
                    color: self.tools.color,
                    font_size: TEXT_FONT_SIZE,
                });
                return DownOutcome::DraftOpened;
            }
            Tool::Rectangle => Primitive::Rectangle(Shape::new(p, stroke)),
            Tool::Ellipse => Primitive::Ellipse(Shape::new(p, stroke)),
            Tool::Arrow => Primitive::Arrow(Arrow { start: p, end: p, stroke }),
            Tool::FreehandBrush => Primitive::Freehand(StrokePath { points: vec![p], stroke }),
            Tool::Mosaic => match self.mosaic_pattern() {
                Some(pattern) => Primitive::Mosaic(MosaicStroke {
                    points: vec![p],
                    width: stroke.width * MOSAIC_WIDTH_FACTOR,
                    pattern,
                }),
                None => {
                    log::warn!("Mosaic tool used without a source image");
                    return DownOutcome::Ignored;
                }
            },
        };

        self.tools.pending = Some(pending);
        DownOutcome::Drawing
    }

    /// Grow the pending primitive or move the captured label.
    ///
    /// Rectangle and ellipse updates are rejected while the pointer is over
    /// `blocked` (the toolbar). Returns true when anything changed.
    pub fn pointer_move(&mut self, p: Point, blocked: Option<&Rectangle>) -> bool {
        if let Some(drag) = self.label_drag {
            let (dx, dy) = p.delta_from(drag.anchor_point);
            if let Some(Primitive::Text(label)) = self.layer.get_mut(drag.index) {
                label.position = drag.anchor_position.offset(dx, dy);
                return true;
            }
            return false;
        }

        let Some(pending) = self.tools.pending.as_mut() else {
            return false;
        };

        match pending {
            Primitive::Rectangle(shape) | Primitive::Ellipse(shape) => {
                if blocked.is_some_and(|r| r.contains(p)) {
                    return false;
                }
                shape.stretch_to(p);
            }
            Primitive::Arrow(arrow) => arrow.end = p,
            Primitive::Freehand(path) => path.points.push(p),
            Primitive::Mosaic(stroke) => stroke.points.push(p),
            Primitive::Text(_) => return false,
        }
        true
    }

    /// Finalize the pending primitive or release a label drag.
    ///
    /// Returns the layer index of a newly committed primitive.
    pub fn pointer_up(&mut self) -> Option<usize> {
        if self.label_drag.take().is_some() {
            return None;
        }
        let pending = self.tools.pending.take()?;
        Some(self.layer.push(pending))
    }

    pub fn draft(&self) -> Option<&TextDraft> {
        self.layer.draft()
    }

    pub fn draft_text_mut(&mut self) -> Option<&mut String> {
        self.layer.draft_mut().map(|d| &mut d.text)
    }

    /// Area occupied by the open draft's entry box
    pub fn draft_rect(&self) -> Option<Rectangle> {
        let draft = self.layer.draft()?;
        let (w, h) = self.measure.measure(&draft.text, draft.font_size);
        Some(Rectangle::new(draft.position.x, draft.position.y, w.max(DRAFT_MIN_WIDTH), h))
    }

    /// Turn the open draft into a label; blank drafts are discarded
    pub fn commit_text(&mut self) -> Option<usize> {
        let draft = self.layer.take_draft()?;
        if draft.text.trim().is_empty() {
            log::debug!("Discarding blank text draft");
            return None;
        }

        let extent = self.measure.measure(&draft.text, draft.font_size);
        let label = TextLabel {
            position: draft.position.offset(0.0, TEXT_BASELINE_NUDGE),
            text: draft.text,
            color: draft.color,
            font_size: draft.font_size,
            extent,
        };
        Some(self.layer.push(Primitive::Text(label)))
    }

    pub fn cancel_text(&mut self) -> bool {
        self.layer.take_draft().is_some()
    }

    /// Remove the newest layer item
    pub fn undo(&mut self) -> Option<Undone> {
        let undone = self.layer.undo();
        if let (Some(Undone::Primitive(_)), Some(drag)) = (&undone, self.label_drag) {
            if drag.index >= self.layer.primitives().len() {
                self.label_drag = None;
            }
        }
        undone
    }

    fn mosaic_pattern(&mut self) -> Option<Arc<RgbaImage>> {
        if self.pattern.is_none() {
            let source = self.source.as_ref()?;
            self.pattern = Some(Arc::new(pixelate(source, MOSAIC_BLOCK)));
        }
        self.pattern.clone()
    }
}
