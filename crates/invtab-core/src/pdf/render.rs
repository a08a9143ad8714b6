//! Page rasterization for OCR.
//!
//! Full-page renders come from poppler's `pdftoppm`. Scanned documents can
//! also be served by their embedded page images, which is the fallback when
//! `pdftoppm` is missing.

use std::path::PathBuf;
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, warn};

use super::{PdfExtractor, PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::{PdfConfig, RendererKind};

/// Turns a PDF into one image per page.
pub trait PageRenderer: Send + Sync {
    /// Render at most `max_pages` pages (0 = all).
    fn render(&self, data: &[u8], max_pages: u32) -> Result<Vec<DynamicImage>>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Renders pages through the `pdftoppm` command.
pub struct PdftoppmRenderer {
    dpi: u32,
}

impl PdftoppmRenderer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    /// Whether `pdftoppm` can be executed.
    pub fn is_available() -> bool {
        Command::new("pdftoppm").arg("-v").output().is_ok()
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render(&self, data: &[u8], max_pages: u32) -> Result<Vec<DynamicImage>> {
        let temp_dir = tempfile::tempdir().map_err(|e| PdfError::Render(e.to_string()))?;
        let input = temp_dir.path().join("input.pdf");
        std::fs::write(&input, data).map_err(|e| PdfError::Render(e.to_string()))?;

        let mut command = Command::new("pdftoppm");
        command.arg("-png").arg("-r").arg(self.dpi.to_string());
        if max_pages > 0 {
            command.arg("-l").arg(max_pages.to_string());
        }
        let output = command
            .arg(&input)
            .arg(temp_dir.path().join("page"))
            .output()
            .map_err(|e| PdfError::Render(format!("Failed to run pdftoppm: {}", e)))?;

        if !output.status.success() {
            return Err(PdfError::Render(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // page-1.png, page-2.png, ... zero-padded to the page count width
        let mut files: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())
            .map_err(|e| PdfError::Render(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(PdfError::Render("pdftoppm produced no images".to_string()));
        }

        let images = files
            .iter()
            .map(|path| image::open(path).map_err(|e| PdfError::Render(e.to_string())))
            .collect::<Result<Vec<_>>>()?;

        debug!("Rendered {} pages at {} dpi", images.len(), self.dpi);
        Ok(images)
    }

    fn name(&self) -> &'static str {
        "pdftoppm"
    }
}

/// Uses the largest embedded image of each page as its render.
#[derive(Default)]
pub struct EmbeddedImageRenderer;

impl PageRenderer for EmbeddedImageRenderer {
    fn render(&self, data: &[u8], max_pages: u32) -> Result<Vec<DynamicImage>> {
        let extractor = PdfExtractor::from_bytes(data)?;
        let page_count = match max_pages {
            0 => extractor.page_count(),
            n => n.min(extractor.page_count()),
        };

        let mut images = Vec::new();
        for page in 1..=page_count {
            let largest = extractor
                .extract_images(page)?
                .into_iter()
                .max_by_key(|img| u64::from(img.width()) * u64::from(img.height()));
            if let Some(img) = largest {
                images.push(img);
            }
        }

        if images.is_empty() {
            return Err(PdfError::ImageExtraction(
                "No images found in PDF".to_string(),
            ));
        }
        debug!("Using {} embedded page images", images.len());
        Ok(images)
    }

    fn name(&self) -> &'static str {
        "embedded"
    }
}

/// Tries `primary`, then `secondary` when the first fails.
pub struct FallbackRenderer {
    primary: Box<dyn PageRenderer>,
    secondary: Box<dyn PageRenderer>,
}

impl FallbackRenderer {
    pub fn new(primary: Box<dyn PageRenderer>, secondary: Box<dyn PageRenderer>) -> Self {
        Self { primary, secondary }
    }
}

impl PageRenderer for FallbackRenderer {
    fn render(&self, data: &[u8], max_pages: u32) -> Result<Vec<DynamicImage>> {
        match self.primary.render(data, max_pages) {
            Ok(images) => Ok(images),
            Err(e) => {
                warn!(
                    "{} renderer failed ({}), trying {}",
                    self.primary.name(),
                    e,
                    self.secondary.name()
                );
                self.secondary.render(data, max_pages)
            }
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Build the renderer selected in the configuration.
pub fn create_renderer(config: &PdfConfig) -> Box<dyn PageRenderer> {
    match config.renderer {
        RendererKind::Pdftoppm => Box::new(PdftoppmRenderer::new(config.render_dpi)),
        RendererKind::Embedded => Box::new(EmbeddedImageRenderer),
        RendererKind::Auto if PdftoppmRenderer::is_available() => Box::new(FallbackRenderer::new(
            Box::new(PdftoppmRenderer::new(config.render_dpi)),
            Box::new(EmbeddedImageRenderer),
        )),
        RendererKind::Auto => {
            warn!("pdftoppm not found, OCR will only see embedded page images");
            Box::new(EmbeddedImageRenderer)
        }
    }
}
