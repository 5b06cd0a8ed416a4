//! OCR and text extraction module.
//!
//! Acquires the text of a statement PDF using:
//! - pdftotext (Poppler) for documents with an embedded text layer
//! - pdfinfo + pdftoppm (Poppler) to rasterize scanned pages
//! - Tesseract OCR to recognize each rasterized page
//!
//! The external tools sit behind the `PdfTextSource`, `PageRasterizer` and
//! `OcrBackend` traits.

mod backend;
mod command;
mod extractor;
mod poppler;
mod tesseract;

pub use backend::{OcrBackend, OcrError, OcrResult, PageImage, PageRasterizer, PdfTextSource};
pub use command::check_binary;
pub use extractor::{ExtractedText, ExtractionError, ExtractionMethod, TextExtractor};
pub use poppler::{PopplerRasterizer, PopplerText, RasterOptions};
pub use tesseract::{TesseractBackend, DEFAULT_LANGUAGE};
