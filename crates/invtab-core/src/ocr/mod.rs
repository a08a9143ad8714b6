//! OCR engines and line-item recognition.
//!
//! An [`OcrEngine`] turns a page image into plain text, one text line per
//! output line. Two engines are available: the `tesseract` program and, with
//! the `native` feature, PaddleOCR models run by `pure-onnx-ocr`.

mod line_items;
#[cfg(feature = "native")]
mod pure_engine;
mod tesseract;

pub use line_items::parse_line_items;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;
pub use tesseract::TesseractEngine;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::OcrError;
use crate::models::config::{OcrConfig, OcrEngineKind};

/// Recognizes text in page images.
pub trait OcrEngine: Send + Sync {
    /// Recognize all text in `image`, lines separated by `\n`.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// A recognized text region, axis-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl TextBox {
    fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// Join text boxes into reading-order lines.
///
/// A box joins the current line when its vertical centre lies within half
/// the line's first box height; boxes on a line are ordered left to right
/// and separated by a space.
pub fn boxes_to_text(mut boxes: Vec<TextBox>) -> String {
    boxes.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

    let mut lines: Vec<Vec<TextBox>> = Vec::new();
    for b in boxes {
        match lines.last_mut() {
            Some(line)
                if (b.center_y() - line[0].center_y()).abs() <= line[0].height().max(1.0) / 2.0 =>
            {
                line.push(b)
            }
            _ => lines.push(vec![b]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            line.iter()
                .map(|b| b.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Create the OCR engine selected in the configuration.
pub fn create_engine(config: &OcrConfig) -> Result<Box<dyn OcrEngine>, OcrError> {
    debug!("Creating {:?} OCR engine", config.engine);
    match config.engine {
        OcrEngineKind::Tesseract => {
            if !TesseractEngine::is_available() {
                warn!("tesseract not found, the OCR strategy will fail on every document");
            }
            Ok(Box::new(TesseractEngine::new(
                config.language.clone(),
                config.psm,
            )))
        }
        #[cfg(feature = "native")]
        OcrEngineKind::Onnx => Ok(Box::new(PureOcrEngine::from_dir(&config.model_dir)?)),
        #[cfg(not(feature = "native"))]
        OcrEngineKind::Onnx => Err(OcrError::Unavailable(
            "built without the `native` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(text: &str, x0: f32, y0: f32) -> TextBox {
        TextBox {
            text: text.to_string(),
            x0,
            y0,
            x1: x0 + 40.0,
            y1: y0 + 20.0,
        }
    }

    #[test]
    fn test_boxes_to_text_rows() {
        let boxes = vec![
            text_box("50.00", 400.0, 102.0),
            text_box("Widget A", 10.0, 100.0),
            text_box("10", 200.0, 99.0),
            text_box("Gadget B", 10.0, 140.0),
        ];
        assert_eq!(boxes_to_text(boxes), "Widget A 10 50.00\nGadget B");
    }

    #[test]
    fn test_boxes_to_text_empty() {
        assert_eq!(boxes_to_text(Vec::new()), "");
    }

    #[test]
    fn test_create_tesseract_engine() {
        let engine = create_engine(&OcrConfig::default()).unwrap();
        assert_eq!(engine.name(), "tesseract");
    }
}
