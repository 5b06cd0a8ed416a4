//! Poppler command-line tools: pdftotext, pdfinfo and pdftoppm.

use std::path::Path;
use std::process::Command;

use super::backend::{PageImage, PageRasterizer, PdfTextSource};
use super::command::{check_cmd_status, handle_cmd_output};
use super::extractor::ExtractionError;

/// Rendering parameters for scanned pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    /// Resolution in dots per inch.
    pub dpi: u32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        // A4 portrait at 150 DPI output size, rendered from a 300 DPI raster.
        Self {
            dpi: 300,
            width: 1240,
            height: 1754,
        }
    }
}

/// Embedded text via `pdftotext`.
#[derive(Debug, Default, Clone)]
pub struct PopplerText;

impl PdfTextSource for PopplerText {
    fn extract_text(&self, pdf_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8"])
            .arg(pdf_path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(output, "pdftotext (install poppler-utils)", "pdftotext failed")
    }
}

/// Page rendering via `pdfinfo` and `pdftoppm`.
#[derive(Debug, Default, Clone)]
pub struct PopplerRasterizer {
    options: RasterOptions,
}

impl PopplerRasterizer {
    pub fn new(options: RasterOptions) -> Self {
        Self { options }
    }
}

impl PageRasterizer for PopplerRasterizer {
    fn page_count(&self, pdf_path: &Path) -> Result<u32, ExtractionError> {
        let output = Command::new("pdfinfo").arg(pdf_path).output();
        let stdout = handle_cmd_output(output, "pdfinfo (install poppler-utils)", "pdfinfo failed")?;

        parse_page_count(&stdout).ok_or_else(|| {
            ExtractionError::ExtractionFailed("pdfinfo reported no page count".to_string())
        })
    }

    fn render_page(
        &self,
        pdf_path: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PageImage, ExtractionError> {
        let page_str = page.to_string();
        let output_prefix = output_dir.join(format!("page-{}", page));

        // -singlefile writes exactly <prefix>.png with no page-number suffix
        let status = Command::new("pdftoppm")
            .arg("-png")
            .arg("-singlefile")
            .args(["-r", &self.options.dpi.to_string()])
            .args(["-scale-to-x", &self.options.width.to_string()])
            .args(["-scale-to-y", &self.options.height.to_string()])
            .args(["-f", &page_str, "-l", &page_str])
            .arg(pdf_path)
            .arg(&output_prefix)
            .status();

        check_cmd_status(
            status,
            "pdftoppm (install poppler-utils)",
            &format!("pdftoppm failed to convert page {}", page),
        )?;

        let image_path = output_prefix.with_extension("png");
        if !image_path.exists() {
            return Err(ExtractionError::ExtractionFailed(format!(
                "No image generated for page {}",
                page
            )));
        }

        Ok(PageImage::new(page, image_path))
    }
}

/// Read the `Pages:` line from pdfinfo output.
fn parse_page_count(pdfinfo_output: &str) -> Option<u32> {
    pdfinfo_output
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_count() {
        let output = "Title:          Statement\nProducer:       scanner\nPages:          4\nEncrypted:      no\n";
        assert_eq!(parse_page_count(output), Some(4));
    }

    #[test]
    fn test_parse_page_count_missing() {
        assert_eq!(parse_page_count("Title: nothing here\n"), None);
        assert_eq!(parse_page_count("Pages: many\n"), None);
    }

    #[test]
    fn test_default_raster_options() {
        let options = RasterOptions::default();
        assert_eq!(options.dpi, 300);
        assert_eq!((options.width, options.height), (1240, 1754));
    }
}
