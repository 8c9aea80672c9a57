//! Text measurement for label extents

use ab_glyph::{Font, FontArc, FontVec, ScaleFont};

/// Width and height of a block of text at a font size, in logical units
pub trait TextMeasure: Send + Sync {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// Line height as a multiple of the font size
const LINE_SPACING: f64 = 1.2;

/// Font-free estimate; CJK glyphs count as a full em, everything else as 0.6
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let mut widest: f64 = 0.0;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let width: f64 = line
                .chars()
                .map(|c| if (c as u32) >= 0x2E80 { 1.0 } else { 0.6 })
                .sum::<f64>()
                * font_size;
            widest = widest.max(width);
        }
        (widest, lines.max(1) as f64 * font_size * LINE_SPACING)
    }
}

/// Font used for label measurement and rasterization
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LabelFont")
    }
}

impl LabelFont {
    /// Parse font bytes; `index` selects the face inside a collection
    pub fn from_vec(bytes: Vec<u8>, index: u32) -> Option<Self> {
        match FontVec::try_from_vec_and_index(bytes, index) {
            Ok(font) => Some(Self { font: FontArc::from(font) }),
            Err(e) => {
                log::warn!("Unusable label font: {}", e);
                None
            }
        }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Height of one line at `font_size`
    pub fn line_height(&self, font_size: f64) -> f64 {
        let scaled = self.font.as_scaled(font_size as f32);
        (scaled.ascent() - scaled.descent() + scaled.line_gap()) as f64
    }
}

impl TextMeasure for LabelFont {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let scaled = self.font.as_scaled(font_size as f32);
        let mut widest: f32 = 0.0;
        let mut lines = 0usize;
        for line in text.split('\n') {
            lines += 1;
            let width: f32 = line.chars().map(|c| scaled.h_advance(scaled.glyph_id(c))).sum();
            widest = widest.max(width);
        }
        (widest as f64, lines.max(1) as f64 * self.line_height(font_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_counts_lines_and_wide_glyphs() {
        let (w, h) = ApproxMeasure.measure("ab\n中文", 10.0);
        assert!((w - 20.0).abs() < 1e-9);
        assert!((h - 24.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_has_one_line() {
        let (w, h) = ApproxMeasure.measure("", 24.0);
        assert_eq!(w, 0.0);
        assert!(h > 0.0);
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        assert!(LabelFont::from_vec(vec![0, 1, 2, 3], 0).is_none());
    }
}
