//! Boundary types for text recognition and translation

use crate::annotation::Color;
use crate::dpi::DpiContext;
use crate::geometry::{Point, Rectangle};
use capture::Rect;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssistError {
    #[error("Text recognition is not available on this system")]
    Unavailable,

    #[error("No text detected")]
    NoText,

    #[error("Recognition failed: {0}")]
    Engine(String),

    #[error("Translation request failed: {0}")]
    Network(String),

    #[error("Unexpected translation response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistKind {
    Recognize,
    Translate,
}

/// Line of recognized text; `bounds` is in pixels of the submitted bitmap
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedLine {
    pub text: String,
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedLine {
    pub text: String,
    pub bounds: Rect,
    pub background: Color,
    pub text_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssistOutput {
    Recognized(Vec<RecognizedLine>),
    Translated(Vec<TranslatedLine>),
}

/// OCR and translation capability. Calls block; run them off the UI thread.
pub trait TextAssist: Send {
    fn recognize(&self, image: &RgbaImage) -> Result<Vec<RecognizedLine>, AssistError>;

    fn translate(&self, image: &RgbaImage) -> Result<Vec<TranslatedLine>, AssistError>;

    fn run(&self, kind: AssistKind, image: &RgbaImage) -> Result<AssistOutput, AssistError> {
        match kind {
            AssistKind::Recognize => self.recognize(image).map(AssistOutput::Recognized),
            AssistKind::Translate => self.translate(image).map(AssistOutput::Translated),
        }
    }
}

/// Background and readable text colour for a line box.
///
/// The background is the mean of the pixels along the box border; the text is
/// black on light backgrounds and white on dark ones.
pub fn sample_line_colors(image: &RgbaImage, bounds: &Rect) -> (Color, Color) {
    let r = bounds.clamp_to(image.width(), image.height());
    let (x0, y0) = (r.x as u32, r.y as u32);
    let (x1, y1) = (x0 + r.width - 1, y0 + r.height - 1);

    let mut sum = [0u64; 3];
    let mut count = 0u64;
    let mut add = |x: u32, y: u32| {
        let p = image.get_pixel(x, y).0;
        for c in 0..3 {
            sum[c] += p[c] as u64;
        }
        count += 1;
    };
    for x in x0..=x1 {
        add(x, y0);
        add(x, y1);
    }
    for y in y0..=y1 {
        add(x0, y);
        add(x1, y);
    }

    let avg = |c: usize| (sum[c] / count.max(1)) as u8;
    let background = Color::rgb(avg(0), avg(1), avg(2));
    let text = if background.luminance() > 0.5 { Color::BLACK } else { Color::WHITE };
    (background, text)
}

/// Positioned result box in logical window coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBox {
    pub text: String,
    pub bounds: Rectangle,
    pub background: Option<Color>,
    pub text_color: Option<Color>,
}

fn place(bounds: &Rect, dpi: &DpiContext, origin: Point) -> Rectangle {
    dpi.to_logical(bounds).translate(origin.x, origin.y)
}

/// Map service output onto the overlay, relative to the selection origin
pub fn layout_results(output: AssistOutput, dpi: &DpiContext, origin: Point) -> Vec<ResultBox> {
    match output {
        AssistOutput::Recognized(lines) => lines
            .into_iter()
            .map(|line| ResultBox {
                bounds: place(&line.bounds, dpi, origin),
                text: line.text,
                background: None,
                text_color: None,
            })
            .collect(),
        AssistOutput::Translated(lines) => lines
            .into_iter()
            .map(|line| ResultBox {
                bounds: place(&line.bounds, dpi, origin),
                text: line.text,
                background: Some(line.background),
                text_color: Some(line.text_color),
            })
            .collect(),
    }
}

/// State of the result area shown over the selection
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AssistPanel {
    #[default]
    Hidden,
    Pending {
        kind: AssistKind,
        generation: u64,
    },
    Ready {
        kind: AssistKind,
        boxes: Vec<ResultBox>,
    },
    Failed {
        kind: AssistKind,
        message: String,
    },
}

impl AssistPanel {
    /// All result text, one line per box
    pub fn joined_text(&self) -> Option<String> {
        match self {
            AssistPanel::Ready { boxes, .. } if !boxes.is_empty() => Some(
                boxes.iter().map(|b| b.text.as_str()).collect::<Vec<_>>().join("\n"),
            ),
            _ => None,
        }
    }
}
