//! Text recognition through Windows.Media.Ocr

use capture::Rect;
use image::{ImageFormat, RgbaImage};
use overlay::assist::{AssistError, RecognizedLine};
use std::io::Cursor;

/// Word box in bitmap pixels as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Smallest pixel rectangle covering every word of a line
pub fn merge_word_boxes(words: &[WordBox]) -> Option<Rect> {
    let first = words.first()?;
    let (mut left, mut top) = (first.x, first.y);
    let (mut right, mut bottom) = (first.x + first.width, first.y + first.height);
    for w in &words[1..] {
        left = left.min(w.x);
        top = top.min(w.y);
        right = right.max(w.x + w.width);
        bottom = bottom.max(w.y + w.height);
    }
    let x = left.floor();
    let y = top.floor();
    Some(Rect::new(
        x as i32,
        y as i32,
        (right.ceil() - x).max(1.0) as u32,
        (bottom.ceil() - y).max(1.0) as u32,
    ))
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, AssistError> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| AssistError::Engine(e.to_string()))?;
    Ok(bytes.into_inner())
}

/// Recognize text lines; `language` is a BCP-47 tag preferred over the
/// user profile languages when the engine supports it.
pub fn recognize_lines(image: &RgbaImage, language: Option<&str>) -> Result<Vec<RecognizedLine>, AssistError> {
    let png = encode_png(image)?;
    let started = std::time::Instant::now();
    let lines = platform::recognize(&png, language)?;
    log::info!("OCR found {} lines in {:?}", lines.len(), started.elapsed());
    Ok(lines)
}

/// Load the engine once so the first request is not slowed by it
pub fn warm_up() {
    platform::warm_up();
}

#[cfg(windows)]
mod platform {
    use super::{merge_word_boxes, WordBox};
    use overlay::assist::{AssistError, RecognizedLine};
    use windows::core::HSTRING;
    use windows::Globalization::Language;
    use windows::Graphics::Imaging::BitmapDecoder;
    use windows::Media::Ocr::OcrEngine;
    use windows::Storage::Streams::{DataWriter, InMemoryRandomAccessStream};

    fn engine(language: Option<&str>) -> windows::core::Result<OcrEngine> {
        if let Some(tag) = language {
            let lang = Language::CreateLanguage(&HSTRING::from(tag))?;
            if OcrEngine::IsLanguageSupported(&lang)? {
                return OcrEngine::TryCreateFromLanguage(&lang);
            }
            log::debug!("OCR language {} not installed, using profile languages", tag);
        }
        OcrEngine::TryCreateFromUserProfileLanguages()
    }

    fn recognize_inner(png: &[u8], language: Option<&str>) -> windows::core::Result<Vec<RecognizedLine>> {
        let stream = InMemoryRandomAccessStream::new()?;
        let writer = DataWriter::CreateDataWriter(&stream)?;
        writer.WriteBytes(png)?;
        writer.StoreAsync()?.get()?;
        writer.FlushAsync()?.get()?;
        writer.DetachStream()?;
        stream.Seek(0)?;

        let decoder = BitmapDecoder::CreateAsync(&stream)?.get()?;
        let bitmap = decoder.GetSoftwareBitmapAsync()?.get()?;
        let result = engine(language)?.RecognizeAsync(&bitmap)?.get()?;

        let mut lines = Vec::new();
        for line in result.Lines()? {
            let text = line.Text()?.to_string();
            let mut words = Vec::new();
            for word in line.Words()? {
                let r = word.BoundingRect()?;
                words.push(WordBox { x: r.X, y: r.Y, width: r.Width, height: r.Height });
            }
            if text.trim().is_empty() {
                continue;
            }
            if let Some(bounds) = merge_word_boxes(&words) {
                lines.push(RecognizedLine { text, bounds });
            }
        }
        Ok(lines)
    }

    pub fn recognize(png: &[u8], language: Option<&str>) -> Result<Vec<RecognizedLine>, AssistError> {
        recognize_inner(png, language).map_err(|e| {
            log::error!("Windows OCR failed: {}", e);
            AssistError::Engine(e.message().to_string())
        })
    }

    pub fn warm_up() {
        match OcrEngine::TryCreateFromUserProfileLanguages() {
            Ok(_) => log::info!("OCR engine ready"),
            Err(e) => log::warn!("OCR engine warm-up failed: {}", e),
        }
    }
}

#[cfg(not(windows))]
mod platform {
    use overlay::assist::{AssistError, RecognizedLine};

    pub fn recognize(_png: &[u8], _language: Option<&str>) -> Result<Vec<RecognizedLine>, AssistError> {
        Err(AssistError::Unavailable)
    }

    pub fn warm_up() {
        log::debug!("No OCR engine on this platform");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_boxes_merge_into_line_box() {
        let words = [
            WordBox { x: 10.2, y: 5.0, width: 30.0, height: 12.0 },
            WordBox { x: 45.0, y: 4.5, width: 20.5, height: 13.0 },
        ];
        assert_eq!(merge_word_boxes(&words), Some(Rect::new(10, 4, 56, 14)));
        assert_eq!(merge_word_boxes(&[]), None);
    }

    #[cfg(not(windows))]
    #[test]
    fn recognition_is_unavailable_off_windows() {
        let img = RgbaImage::new(4, 4);
        assert_eq!(recognize_lines(&img, None), Err(AssistError::Unavailable));
    }
}
