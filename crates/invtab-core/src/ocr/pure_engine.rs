//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info};

use super::{boxes_to_text, OcrEngine, TextBox};
use crate::error::OcrError;

/// OCR engine backed by `pure-onnx-ocr` (PaddleOCR detection + recognition
/// models, no external ONNX Runtime).
pub struct PureOcrEngine {
    // Inference sessions are used one image at a time.
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
}

impl PureOcrEngine {
    /// Create an engine from `det.onnx`, `latin_rec.onnx` and `latin_dict.txt` in `model_dir`.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());
        Ok(Self {
            engine: Mutex::new(engine),
        })
    }
}

impl OcrEngine for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();

        let engine = self
            .engine
            .lock()
            .map_err(|_| OcrError::Recognition("OCR engine poisoned".to_string()))?;
        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| {
                let (x0, y0, x1, y1) = polygon_bounds(&r.bounding_box);
                TextBox {
                    text: r.text.replace("[UNK]", " "),
                    x0,
                    y0,
                    x1,
                    y1,
                }
            })
            .collect();

        debug!(
            "pure-onnx-ocr returned {} text regions in {}ms",
            boxes.len(),
            start.elapsed().as_millis()
        );
        Ok(boxes_to_text(boxes))
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

/// Axis-aligned bounds of a detection polygon.
fn polygon_bounds(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32, f32, f32) {
    let mut bounds = (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for coord in polygon.exterior().coords() {
        let (x, y) = (coord.x as f32, coord.y as f32);
        bounds.0 = bounds.0.min(x);
        bounds.1 = bounds.1.min(y);
        bounds.2 = bounds.2.max(x);
        bounds.3 = bounds.3.max(y);
    }
    bounds
}
