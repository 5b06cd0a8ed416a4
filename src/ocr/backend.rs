//! Capability traits behind text acquisition.
//!
//! Text acquisition needs three external capabilities:
//! - Native text extraction from a PDF's embedded text layer
//! - Rasterization of a single PDF page to an image file
//! - OCR recognition of one image file
//!
//! Each one is a trait so the command-line implementations can be swapped
//! for in-process fakes.

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::extractor::ExtractionError;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of OCR processing for one image.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text content.
    pub text: String,
    /// Name of the backend that produced this result.
    pub backend: &'static str,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Check if this backend is available (dependencies installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError>;
}

/// Best-effort reader for the embedded text layer of a PDF.
pub trait PdfTextSource: Send + Sync {
    /// Return the embedded text. Scanned documents yield an empty or
    /// whitespace-only string rather than an error.
    fn extract_text(&self, pdf_path: &Path) -> Result<String, ExtractionError>;
}

/// Renders PDF pages to image files, one page at a time.
pub trait PageRasterizer: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self, pdf_path: &Path) -> Result<u32, ExtractionError>;

    /// Render a single 1-based page into `output_dir`.
    fn render_page(
        &self,
        pdf_path: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PageImage, ExtractionError>;
}

/// A rendered page image on disk.
///
/// The file is removed when this value is dropped, so an image never
/// outlives the OCR pass that consumes it.
#[derive(Debug)]
pub struct PageImage {
    page: u32,
    path: PathBuf,
}

impl PageImage {
    pub fn new(page: u32, path: PathBuf) -> Self {
        Self { page, path }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PageImage {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::trace!("Removed page image {}", self.path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    "Failed to remove page {} image {}: {}",
                    self.page,
                    self.path.display(),
                    e
                );
            }
        }
    }
}
