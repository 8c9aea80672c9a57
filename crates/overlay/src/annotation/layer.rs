//! Ordered annotation log with an optional open text draft

use super::primitive::{Color, Primitive};
use crate::geometry::Point;

/// Minimum width of the text entry box
pub const DRAFT_MIN_WIDTH: f64 = 50.0;

/// Editable text that has not been committed yet
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraft {
    pub position: Point,
    pub text: String,
    pub color: Color,
    pub font_size: f64,
}

/// Item removed by an undo
#[derive(Debug, Clone)]
pub enum Undone {
    Primitive(Primitive),
    Draft(TextDraft),
}

/// Insertion order is both z-order and undo order. The draft, when present,
/// is always the newest item.
#[derive(Debug, Clone, Default)]
pub struct AnnotationLayer {
    primitives: Vec<Primitive>,
    draft: Option<TextDraft>,
}

impl AnnotationLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn draft(&self) -> Option<&TextDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut TextDraft> {
        self.draft.as_mut()
    }

    /// Number of items, counting an open draft
    pub fn len(&self) -> usize {
        self.primitives.len() + usize::from(self.draft.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when a render would show nothing: no primitives and no draft
    /// holding visible text
    pub fn is_blank(&self) -> bool {
        self.primitives.is_empty()
            && self.draft.as_ref().map_or(true, |d| d.text.trim().is_empty())
    }

    pub(crate) fn push(&mut self, primitive: Primitive) -> usize {
        self.primitives.push(primitive);
        self.primitives.len() - 1
    }

    pub(crate) fn open_draft(&mut self, draft: TextDraft) {
        self.draft = Some(draft);
    }

    pub(crate) fn take_draft(&mut self) -> Option<TextDraft> {
        self.draft.take()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Primitive> {
        self.primitives.get_mut(index)
    }

    /// Remove the newest item; a no-op on an empty layer
    pub fn undo(&mut self) -> Option<Undone> {
        if let Some(draft) = self.draft.take() {
            return Some(Undone::Draft(draft));
        }
        self.primitives.pop().map(Undone::Primitive)
    }

    /// Topmost committed text label under `p`
    pub fn label_at(&self, p: Point) -> Option<usize> {
        self.primitives
            .iter()
            .enumerate()
            .rev()
            .find(|(_, prim)| prim.as_text().is_some_and(|t| t.bounds().contains(p)))
            .map(|(i, _)| i)
    }
}
