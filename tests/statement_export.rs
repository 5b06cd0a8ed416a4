//! End-to-end export tests
//!
//! Runs statement text through row extraction, workbook export and the
//! upload pipeline without any external tools installed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use stmtx::ocr::{
    ExtractionError, OcrBackend, OcrError, OcrResult, PageImage, PageRasterizer, PdfTextSource,
    TextExtractor,
};
use stmtx::pipeline::{Pipeline, PipelineError, RequestState};
use stmtx::sheet::{build_sheet, export, take_artifact};
use stmtx::statement::extract_rows;

const STATEMENT: &str = "\
ACCOUNT STATEMENT                         Page 1 of 2
Date        Type  Description             Amount     Balance
01-Jan-2023 T     Grocery Purchase        1,234.56   100.00Dr
05-Jan-2023 C     Salary Credit           3,000.00   2,900.00Dr
12-Feb-2023 T     Card Fee                25.00      2,875.00Dr
Closing balance                                       2,875.00
";

/// Text layer that returns nothing, as for a scanned statement.
struct NoTextLayer;

impl PdfTextSource for NoTextLayer {
    fn extract_text(&self, _pdf_path: &Path) -> Result<String, ExtractionError> {
        Ok("  \n".to_string())
    }
}

/// Writes one placeholder image per page.
struct TwoPages;

impl PageRasterizer for TwoPages {
    fn page_count(&self, _pdf_path: &Path) -> Result<u32, ExtractionError> {
        Ok(2)
    }

    fn render_page(
        &self,
        _pdf_path: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PageImage, ExtractionError> {
        let path = output_dir.join(format!("page-{}.png", page));
        std::fs::write(&path, b"png")?;
        Ok(PageImage::new(page, path))
    }
}

/// Recognizes half of the statement on each page.
struct SplitStatement;

impl OcrBackend for SplitStatement {
    fn name(&self) -> &'static str {
        "split"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
        let lines: Vec<&str> = STATEMENT.lines().collect();
        let text = if image_path.ends_with("page-1.png") {
            lines[..3].join("\n")
        } else {
            lines[3..].join("\n")
        };
        Ok(OcrResult {
            text,
            backend: "split",
            processing_time_ms: 0,
        })
    }
}

fn read_part(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[tokio::test]
async fn test_export_has_header_and_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let table = build_sheet(extract_rows(STATEMENT));
    assert_eq!(table.rows.len(), 3);

    let artifact = export(&table, dir.path(), "upload123").unwrap();
    assert_eq!(artifact.file_name, "upload123.xlsx");
    assert_eq!(artifact.row_count, 4);

    let sheet = read_part(&artifact.path, "xl/worksheets/sheet1.xml");
    assert_eq!(sheet.matches("<row ").count(), 4);
    let strings = read_part(&artifact.path, "xl/sharedStrings.xml");
    assert!(strings.contains("<t>Date</t>"));
    assert!(strings.contains("<t>12-Feb-2023</t>"));

    let bytes = take_artifact(dir.path(), &artifact.file_name).await.unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert!(!artifact.path.exists());
}

#[tokio::test]
async fn test_scanned_statement_goes_through_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = TextExtractor::with_backends(
        Box::new(NoTextLayer),
        Box::new(TwoPages),
        Box::new(SplitStatement),
    )
    .with_scratch_dir(dir.path());
    let pipeline = Pipeline::new(extractor, dir.path().to_path_buf(), "http://localhost:3000/");

    let processed = pipeline.run(b"%PDF-1.4\n%scan\n").await.unwrap();

    assert_eq!(processed.state, RequestState::Responded);
    assert_eq!(processed.table.rows.len(), 3);
    assert_eq!(
        processed.table.rows[1].description.as_deref(),
        Some("Salary Credit")
    );
    assert_eq!(
        processed.download_url,
        format!("http://localhost:3000/download/{}", processed.sheet.file_name)
    );

    // Only the workbook is left behind
    let remaining: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(remaining, vec![processed.sheet.file_name.clone()]);
}

#[tokio::test]
async fn test_non_pdf_upload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = TextExtractor::with_backends(
        Box::new(NoTextLayer),
        Box::new(TwoPages),
        Box::new(SplitStatement),
    )
    .with_scratch_dir(dir.path());
    let pipeline = Pipeline::new(extractor, dir.path().to_path_buf(), "http://localhost:3000");

    let err = pipeline.run(b"not a pdf").await.unwrap_err();
    assert!(!matches!(err, PipelineError::NoDataFound));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
