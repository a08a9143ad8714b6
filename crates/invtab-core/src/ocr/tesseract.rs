//! OCR through the `tesseract` command-line program.

use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace};

use super::OcrEngine;
use crate::error::OcrError;

/// Runs `tesseract <image> stdout -l <language> --psm <psm>` per image.
pub struct TesseractEngine {
    language: String,
    psm: u32,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>, psm: u32) -> Self {
        Self {
            language: language.into(),
            psm,
        }
    }

    /// Whether the `tesseract` program can be executed.
    pub fn is_available() -> bool {
        Command::new("tesseract").arg("--version").output().is_ok()
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::InvalidImage("empty image".to_string()));
        }

        let file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;
        image
            .save_with_format(file.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let output = Command::new("tesseract")
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.psm.to_string())
            .output()
            .map_err(|e| OcrError::Unavailable(format!("failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            return Err(OcrError::Recognition(format!(
                "tesseract failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "tesseract recognized {} chars from {}x{} image",
            text.len(),
            image.width(),
            image.height()
        );
        trace!("tesseract output: {}", text);
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}
