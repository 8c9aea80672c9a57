//! Annotation tools, primitives and the undo log

pub mod engine;
pub mod layer;
pub mod mosaic;
pub mod primitive;
pub mod text;
pub mod tool;

pub use engine::{AnnotationEngine, DownOutcome, LabelDrag};
pub use layer::{AnnotationLayer, TextDraft, Undone};
pub use primitive::{
    arrow_head, Arrow, ArrowHead, Color, MosaicStroke, Primitive, Shape, Stroke, StrokePath,
    TextLabel, DEFAULT_COLOR, PALETTE, STROKE_WIDTHS,
};
pub use text::{ApproxMeasure, LabelFont, TextMeasure};
pub use tool::{Tool, ToolState, ToolSwitch};
