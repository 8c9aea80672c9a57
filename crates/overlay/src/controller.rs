//! Routes window input to the selection and annotation state machines

use crate::annotation::{
    AnnotationEngine, AnnotationLayer, Color, DownOutcome, TextDraft, TextMeasure, Tool, Undone,
};
use crate::assist::{layout_results, AssistError, AssistKind, AssistOutput, AssistPanel};
use crate::chrome::OverlayChrome;
use crate::dpi::DpiContext;
use crate::geometry::{Point, Rectangle};
use crate::pipeline::{CapturePipeline, ExportImage};
use crate::render::WindowRenderer;
use crate::selection::{CursorHint, SelectionModel};
use crate::OverlayResult;
use image::RgbaImage;
use std::sync::Arc;

/// Gap between the selection and the toolbar
pub const TOOLBAR_GAP: f64 = 5.0;

/// Toolbar size assumed until the UI reports the measured one
pub const DEFAULT_TOOLBAR_SIZE: (f64, f64) = (400.0, 36.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    Escape,
    Enter,
    Undo,
}

/// Toolbar buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Tool(Tool),
    Undo,
    Save,
    Copy,
    Recognize,
    Translate,
    Cancel,
}

/// What the window should do after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    Redraw,
    Close,
    Save,
    Copy,
    Assist(AssistKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Selecting,
    Annotating,
}

/// Bitmap to hand to the OCR or translation worker
#[derive(Debug, Clone)]
pub struct AssistRequest {
    pub kind: AssistKind,
    pub generation: u64,
    pub image: ExportImage,
}

pub struct OverlayController {
    source: Arc<RgbaImage>,
    dpi: DpiContext,
    window_size: (f64, f64),
    selection: SelectionModel,
    engine: AnnotationEngine,
    chrome: OverlayChrome,
    toolbar_size: (f64, f64),
    ui_regions: Vec<Rectangle>,
    mode: Mode,
    assist: AssistPanel,
    generation: u64,
    status: Option<String>,
}

impl OverlayController {
    /// Overlay over a frozen screenshot at physical resolution
    pub fn new(screenshot: RgbaImage, dpi: DpiContext) -> Self {
        let window_size = dpi.logical_size(screenshot.width(), screenshot.height());
        let source = Arc::new(screenshot);
        Self {
            engine: AnnotationEngine::new().with_source(source.clone()),
            source,
            dpi,
            window_size,
            selection: SelectionModel::new(),
            chrome: OverlayChrome::default(),
            toolbar_size: DEFAULT_TOOLBAR_SIZE,
            ui_regions: Vec::new(),
            mode: Mode::Idle,
            assist: AssistPanel::Hidden,
            generation: 0,
            status: None,
        }
    }

    pub fn with_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.engine = std::mem::take(&mut self.engine).with_measure(measure);
        self
    }

    pub fn source(&self) -> &Arc<RgbaImage> {
        &self.source
    }

    pub fn dpi(&self) -> DpiContext {
        self.dpi
    }

    /// Window size in logical units
    pub fn window_size(&self) -> (f64, f64) {
        self.window_size
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn engine(&self) -> &AnnotationEngine {
        &self.engine
    }

    pub fn layer(&self) -> &AnnotationLayer {
        self.engine.layer()
    }

    pub fn chrome(&self) -> &OverlayChrome {
        &self.chrome
    }

    pub fn assist_panel(&self) -> &AssistPanel {
        &self.assist
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn set_color(&mut self, color: Color) {
        self.engine.set_color(color);
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.engine.set_stroke_width(width);
    }

    pub fn set_toolbar_size(&mut self, width: f64, height: f64) {
        self.toolbar_size = (width, height);
    }

    /// Screen areas owned by toolbar, options panel and result widgets
    pub fn set_ui_regions(&mut self, regions: Vec<Rectangle>) {
        self.ui_regions = regions;
    }

    pub fn is_over_ui(&self, p: Point) -> bool {
        self.ui_regions.iter().any(|r| r.contains(p))
    }

    /// Toolbar placement: right-aligned under the selection, flipped above
    /// when it would leave the window, never past the left edge
    pub fn toolbar_rect(&self) -> Option<Rectangle> {
        let sel = self.selection.rect();
        if sel.is_empty() {
            return None;
        }
        let (width, height) = self.toolbar_size;
        let left = (sel.right() - width).max(0.0);
        let mut top = sel.bottom() + TOOLBAR_GAP;
        if top + height > self.window_size.1 {
            top = sel.top() - height - TOOLBAR_GAP;
        }
        Some(Rectangle::new(left, top, width, height))
    }

    pub fn draft(&self) -> Option<&TextDraft> {
        self.engine.draft()
    }

    pub fn draft_rect(&self) -> Option<Rectangle> {
        self.engine.draft_rect()
    }

    pub fn draft_text_mut(&mut self) -> Option<&mut String> {
        self.engine.draft_text_mut()
    }

    pub fn commit_text(&mut self) -> bool {
        self.engine.commit_text().is_some()
    }

    pub fn cancel_text(&mut self) -> bool {
        self.engine.cancel_text()
    }

    pub fn pointer_down(&mut self, p: Point, button: PointerButton) -> Command {
        if button == PointerButton::Secondary {
            if self.engine.draft().is_some() {
                self.engine.commit_text();
                return Command::Redraw;
            }
            return Command::Close;
        }

        if self.mode != Mode::Idle || self.is_over_ui(p) {
            return Command::None;
        }
        if self.draft_rect().is_some_and(|r| r.contains(p)) {
            return Command::None;
        }

        let sel = self.selection.rect();
        let wants_engine = self.engine.draft().is_some()
            || self.engine.label_at(p).is_some()
            || (self.engine.tool() != Tool::None && !sel.is_empty() && sel.contains(p));

        if wants_engine {
            match self.engine.pointer_down(p, &sel) {
                DownOutcome::Drawing | DownOutcome::DraggingLabel(_) => {
                    self.mode = Mode::Annotating;
                    return Command::Redraw;
                }
                DownOutcome::DraftClosed | DownOutcome::DraftOpened => return Command::Redraw,
                DownOutcome::Ignored => {}
            }
        }

        self.selection.begin_drag(p);
        self.mode = Mode::Selecting;
        self.dismiss_assist();
        Command::Redraw
    }

    pub fn pointer_move(&mut self, p: Point) -> Command {
        let changed = match self.mode {
            Mode::Idle => false,
            Mode::Selecting => self.selection.drag_to(p),
            Mode::Annotating => {
                let toolbar = self.toolbar_rect();
                self.engine.pointer_move(p, toolbar.as_ref())
            }
        };
        if changed {
            Command::Redraw
        } else {
            Command::None
        }
    }

    pub fn pointer_up(&mut self, p: Point) -> Command {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Idle => Command::None,
            Mode::Selecting => {
                self.selection.drag_to(p);
                if let Some(rect) = self.selection.end_drag() {
                    log::debug!("Selection settled at {:?}", rect);
                }
                Command::Redraw
            }
            Mode::Annotating => {
                let toolbar = self.toolbar_rect();
                self.engine.pointer_move(p, toolbar.as_ref());
                self.engine.pointer_up();
                Command::Redraw
            }
        }
    }

    pub fn cursor_hint(&self, p: Point) -> CursorHint {
        if self.draft_rect().is_some_and(|r| r.contains(p)) {
            return CursorHint::Text;
        }
        if self.engine.label_at(p).is_some() {
            return CursorHint::Move;
        }
        let sel = self.selection.rect();
        match self.engine.tool() {
            Tool::None => {}
            _ if sel.is_empty() || !sel.contains(p) => {}
            Tool::Text => return CursorHint::Text,
            _ => return CursorHint::Draw,
        }
        self.selection.hit_test(p).into()
    }

    pub fn key(&mut self, key: OverlayKey) -> Command {
        match key {
            OverlayKey::Escape => {
                if self.engine.cancel_text() {
                    Command::Redraw
                } else {
                    Command::Close
                }
            }
            OverlayKey::Enter => {
                if self.engine.draft().is_some() {
                    self.engine.commit_text();
                    Command::Redraw
                } else if self.selection.is_empty() {
                    Command::None
                } else {
                    Command::Copy
                }
            }
            OverlayKey::Undo => self.undo(),
        }
    }

    pub fn toolbar(&mut self, action: ToolbarAction) -> Command {
        if self.mode != Mode::Idle {
            return Command::None;
        }
        match action {
            ToolbarAction::Tool(tool) => {
                self.engine.select_tool(tool);
                Command::Redraw
            }
            ToolbarAction::Undo => self.undo(),
            ToolbarAction::Cancel => Command::Close,
            ToolbarAction::Save | ToolbarAction::Copy | ToolbarAction::Recognize | ToolbarAction::Translate => {
                self.engine.commit_text();
                if self.selection.is_empty() {
                    return Command::None;
                }
                match action {
                    ToolbarAction::Save => Command::Save,
                    ToolbarAction::Copy => Command::Copy,
                    ToolbarAction::Recognize => Command::Assist(AssistKind::Recognize),
                    _ => Command::Assist(AssistKind::Translate),
                }
            }
        }
    }

    fn undo(&mut self) -> Command {
        if self.mode != Mode::Idle {
            return Command::None;
        }
        match self.engine.undo() {
            Some(Undone::Draft(_)) => {
                log::debug!("Undo discarded the open text draft");
                Command::Redraw
            }
            Some(Undone::Primitive(_)) => Command::Redraw,
            None => Command::None,
        }
    }

    /// Export the current selection; `Ok(None)` when nothing is selected.
    ///
    /// A failure is also kept as the status message.
    pub fn export(&mut self, renderer: &dyn WindowRenderer) -> OverlayResult<Option<ExportImage>> {
        let pipeline = CapturePipeline::new(&self.source, self.dpi);
        let rect = self.selection.rect();
        match pipeline.export(&rect, self.engine.layer(), &mut self.chrome, renderer) {
            Ok(image) => {
                self.status = None;
                Ok(image)
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.status = Some(format!("Export failed: {}", e));
                Err(e)
            }
        }
    }

    /// Export the selection for OCR or translation and mark the result area pending
    pub fn begin_assist(
        &mut self,
        kind: AssistKind,
        renderer: &dyn WindowRenderer,
    ) -> Option<AssistRequest> {
        let image = self.export(renderer).ok()??;
        self.generation += 1;
        self.assist = AssistPanel::Pending { kind, generation: self.generation };
        log::info!("{:?} requested for {}x{}", kind, image.width(), image.height());
        Some(AssistRequest { kind, generation: self.generation, image })
    }

    /// Apply a worker result; stale or unexpected results are dropped
    pub fn finish_assist(
        &mut self,
        generation: u64,
        result: Result<AssistOutput, AssistError>,
    ) -> bool {
        let kind = match self.assist {
            AssistPanel::Pending { kind, generation: pending } if pending == generation => kind,
            _ => {
                log::debug!("Dropping stale assist result #{}", generation);
                return false;
            }
        };

        self.assist = match result {
            Ok(output) => {
                let boxes = layout_results(output, &self.dpi, self.selection.rect().top_left());
                if boxes.is_empty() {
                    AssistPanel::Failed { kind, message: AssistError::NoText.to_string() }
                } else {
                    AssistPanel::Ready { kind, boxes }
                }
            }
            Err(e) => {
                log::warn!("{:?} failed: {}", kind, e);
                AssistPanel::Failed { kind, message: e.to_string() }
            }
        };
        true
    }

    pub fn dismiss_assist(&mut self) {
        self.assist = AssistPanel::Hidden;
    }
}
