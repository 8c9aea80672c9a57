//! Fonts shared by the egui widgets and the label rasterizer

use eframe::egui;
use once_cell::sync::Lazy;
use overlay::annotation::LabelFont;
use std::fs;

const CJK_FONT_PATHS: [&str; 5] = [
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
    "C:\\Windows\\Fonts\\simsun.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/PingFang.ttc",
];

const CJK_FONT_NAME: &str = "cjk_font";

static SYSTEM_CJK_FONT: Lazy<Option<Vec<u8>>> = Lazy::new(|| {
    for path in CJK_FONT_PATHS {
        if let Ok(bytes) = fs::read(path) {
            log::info!("Loaded font {}", path);
            return Some(bytes);
        }
    }
    log::info!("No system CJK font found, using egui default font");
    None
});

/// Label font: the system CJK font when present, else egui's proportional font
pub static LABEL_FONT: Lazy<Option<LabelFont>> = Lazy::new(|| {
    if let Some(font) = SYSTEM_CJK_FONT.as_ref().and_then(|bytes| LabelFont::from_vec(bytes.clone(), 0)) {
        return Some(font);
    }

    let defaults = egui::FontDefinitions::default();
    let name = defaults.families.get(&egui::FontFamily::Proportional)?.first()?;
    let data = defaults.font_data.get(name)?;
    LabelFont::from_vec(data.font.to_vec(), data.index)
});

/// Put the CJK font first so widgets and labels agree with the rasterizer
pub fn setup_custom_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    if let Some(bytes) = SYSTEM_CJK_FONT.as_ref() {
        fonts
            .font_data
            .insert(CJK_FONT_NAME.to_owned(), egui::FontData::from_owned(bytes.clone()));
        fonts
            .families
            .entry(egui::FontFamily::Proportional)
            .or_default()
            .insert(0, CJK_FONT_NAME.to_owned());
        fonts
            .families
            .entry(egui::FontFamily::Monospace)
            .or_default()
            .push(CJK_FONT_NAME.to_owned());
    }

    ctx.set_fonts(fonts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay::annotation::TextMeasure;

    #[test]
    fn label_font_is_always_available() {
        let font = LABEL_FONT.as_ref().expect("label font");
        let (w, h) = font.measure("Hello", 24.0);
        assert!(w > 0.0 && h > 0.0);
    }
}
