//! Text acquisition from statement PDFs using pdftotext with a Tesseract fallback.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

use super::backend::{OcrBackend, OcrError, PageRasterizer, PdfTextSource};
use super::command::check_binary;
use super::poppler::{PopplerRasterizer, PopplerText, RasterOptions};
use super::tesseract::TesseractBackend;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("OCR processing failed on page {page}: {source}")]
    Ocr {
        page: u32,
        #[source]
        source: OcrError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Method used to extract text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Embedded text layer read directly.
    Native,
    /// Every page rasterized and recognized with OCR.
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Native => "native",
            ExtractionMethod::Ocr => "ocr",
        }
    }
}

/// Text acquired from one document.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Extracted text content.
    pub text: String,
    /// Method used for extraction.
    pub method: ExtractionMethod,
    /// Number of pages recognized (OCR only).
    pub page_count: Option<u32>,
}

/// Text extractor with native extraction and an OCR fallback for scans.
pub struct TextExtractor {
    text_source: Box<dyn PdfTextSource>,
    rasterizer: Box<dyn PageRasterizer>,
    ocr: Box<dyn OcrBackend>,
    /// Where page images are rendered (system temp dir if unset).
    scratch_dir: Option<PathBuf>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(RasterOptions::default(), super::tesseract::DEFAULT_LANGUAGE)
    }
}

impl TextExtractor {
    /// Create an extractor backed by poppler and Tesseract.
    pub fn new(raster: RasterOptions, language: &str) -> Self {
        Self::with_backends(
            Box::new(PopplerText),
            Box::new(PopplerRasterizer::new(raster)),
            Box::new(TesseractBackend::with_language(language)),
        )
    }

    /// Create an extractor from explicit capability implementations.
    pub fn with_backends(
        text_source: Box<dyn PdfTextSource>,
        rasterizer: Box<dyn PageRasterizer>,
        ocr: Box<dyn OcrBackend>,
    ) -> Self {
        Self {
            text_source,
            rasterizer,
            ocr,
            scratch_dir: None,
        }
    }

    /// Render page images under this directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Acquire the text of a PDF.
    ///
    /// The embedded text layer is used whenever it holds anything besides
    /// whitespace. Otherwise the document is treated as a scan and every page
    /// is rasterized and recognized in order, one page at a time.
    pub fn acquire_text(&self, pdf_path: &Path) -> Result<ExtractedText, ExtractionError> {
        let native = self.text_source.extract_text(pdf_path)?;
        if !native.trim().is_empty() {
            return Ok(ExtractedText {
                text: native,
                method: ExtractionMethod::Native,
                page_count: None,
            });
        }

        tracing::info!(
            "No embedded text in {}, using {} OCR",
            pdf_path.display(),
            self.ocr.name()
        );
        let (text, pages) = self.ocr_pages(pdf_path)?;

        Ok(ExtractedText {
            text,
            method: ExtractionMethod::Ocr,
            page_count: Some(pages),
        })
    }

    /// OCR every page sequentially. Each page image is dropped (and removed
    /// from disk) before the next page is rendered.
    fn ocr_pages(&self, pdf_path: &Path) -> Result<(String, u32), ExtractionError> {
        let page_count = self.rasterizer.page_count(pdf_path)?;

        let scratch = match &self.scratch_dir {
            Some(dir) => tempfile::Builder::new().prefix("pages-").tempdir_in(dir)?,
            None => TempDir::new()?,
        };

        let mut text = String::new();
        for page in 1..=page_count {
            let image = self.rasterizer.render_page(pdf_path, page, scratch.path())?;
            let result = self
                .ocr
                .ocr_image(image.path())
                .map_err(|source| ExtractionError::Ocr { page, source })?;
            drop(image);

            tracing::debug!(
                "OCR page {}/{}: {} chars in {}ms",
                page,
                page_count,
                result.text.len(),
                result.processing_time_ms
            );
            text.push_str(&result.text);
            text.push('\n');
        }

        Ok((text, page_count))
    }

    /// Check if required tools are available.
    pub fn check_tools() -> Vec<(String, bool)> {
        ["pdftotext", "pdfinfo", "pdftoppm", "tesseract"]
            .iter()
            .map(|tool| (tool.to_string(), check_binary(tool)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::backend::{OcrResult, PageImage};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Default)]
    struct CallLog {
        rendered: Vec<u32>,
        recognized: Vec<PathBuf>,
        /// Image files still on disk when each OCR call started.
        live_images: Vec<usize>,
    }

    struct FixedText(&'static str);

    impl PdfTextSource for FixedText {
        fn extract_text(&self, _pdf_path: &Path) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    struct FakeRasterizer {
        pages: u32,
        log: Arc<Mutex<CallLog>>,
    }

    impl PageRasterizer for FakeRasterizer {
        fn page_count(&self, _pdf_path: &Path) -> Result<u32, ExtractionError> {
            Ok(self.pages)
        }

        fn render_page(
            &self,
            _pdf_path: &Path,
            page: u32,
            output_dir: &Path,
        ) -> Result<PageImage, ExtractionError> {
            let path = output_dir.join(format!("page-{}.png", page));
            std::fs::write(&path, format!("page {}", page))?;
            self.log.lock().unwrap().rendered.push(page);
            Ok(PageImage::new(page, path))
        }
    }

    /// Echoes the image contents back as recognized text.
    struct EchoOcr {
        fail_on_page: Option<u32>,
        blank: bool,
        log: Arc<Mutex<CallLog>>,
    }

    impl OcrBackend for EchoOcr {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            String::new()
        }

        fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
            let live = std::fs::read_dir(image_path.parent().unwrap())
                .unwrap()
                .count();
            {
                let mut log = self.log.lock().unwrap();
                log.recognized.push(image_path.to_path_buf());
                log.live_images.push(live);
            }

            let contents = std::fs::read_to_string(image_path)?;
            if let Some(fail) = self.fail_on_page {
                if contents == format!("page {}", fail) {
                    return Err(OcrError::OcrFailed("unreadable image".to_string()));
                }
            }

            Ok(OcrResult {
                text: if self.blank { String::new() } else { contents },
                backend: "echo",
                processing_time_ms: 0,
            })
        }
    }

    fn extractor(
        native: &'static str,
        pages: u32,
        fail_on_page: Option<u32>,
        blank: bool,
    ) -> (TextExtractor, Arc<Mutex<CallLog>>, TempDir) {
        let log = Arc::new(Mutex::new(CallLog::default()));
        let scratch = tempdir().unwrap();
        let extractor = TextExtractor::with_backends(
            Box::new(FixedText(native)),
            Box::new(FakeRasterizer {
                pages,
                log: log.clone(),
            }),
            Box::new(EchoOcr {
                fail_on_page,
                blank,
                log: log.clone(),
            }),
        )
        .with_scratch_dir(scratch.path());
        (extractor, log, scratch)
    }

    #[test]
    fn test_native_text_skips_ocr() {
        let (extractor, log, _scratch) =
            extractor("01-Jan-2023 T Grocery 1.00 2.00Dr\n", 3, None, false);

        let result = extractor.acquire_text(Path::new("statement.pdf")).unwrap();

        assert_eq!(result.method, ExtractionMethod::Native);
        assert_eq!(result.text, "01-Jan-2023 T Grocery 1.00 2.00Dr\n");
        assert_eq!(result.page_count, None);
        let log = log.lock().unwrap();
        assert!(log.rendered.is_empty());
        assert!(log.recognized.is_empty());
    }

    #[test]
    fn test_whitespace_text_falls_back_to_ocr_per_page() {
        let (extractor, log, scratch) = extractor(" \n\t \x0c", 3, None, false);

        let result = extractor.acquire_text(Path::new("scan.pdf")).unwrap();

        assert_eq!(result.method, ExtractionMethod::Ocr);
        assert_eq!(result.page_count, Some(3));
        assert_eq!(result.text, "page 1\npage 2\npage 3\n");

        let log = log.lock().unwrap();
        assert_eq!(log.rendered, vec![1, 2, 3]);
        let names: Vec<_> = log
            .recognized
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["page-1.png", "page-2.png", "page-3.png"]);
        // Only the page being recognized is ever on disk
        assert_eq!(log.live_images, vec![1, 1, 1]);
        for path in &log.recognized {
            assert!(!path.exists());
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_ocr_failure_aborts_and_cleans_up() {
        let (extractor, log, scratch) = extractor("", 3, Some(2), false);

        let err = extractor.acquire_text(Path::new("scan.pdf")).unwrap_err();

        assert!(matches!(err, ExtractionError::Ocr { page: 2, .. }));
        let log = log.lock().unwrap();
        assert_eq!(log.rendered, vec![1, 2]);
        assert!(!log.recognized[1].exists());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_blank_scan_is_not_an_error() {
        let (extractor, _log, _scratch) = extractor("", 2, None, true);

        let result = extractor.acquire_text(Path::new("blank.pdf")).unwrap();

        assert_eq!(result.method, ExtractionMethod::Ocr);
        assert!(result.text.trim().is_empty());
    }

    #[test]
    fn test_check_tools() {
        let tools = TextExtractor::check_tools();
        assert_eq!(tools.len(), 4);
        for (tool, available) in tools {
            println!("{}: {}", tool, if available { "found" } else { "missing" });
        }
    }
}
