//! Per-upload request orchestration.
//!
//! One upload moves through `Received -> TextAcquired -> RowsExtracted ->
//! Exported -> Responded`. Any failing step moves it to `Failed` and the
//! whole request is discarded; there is no partial result and no retry.
//!
//! Cleanup is tied to the steps: the uploaded PDF is removed as soon as text
//! acquisition finishes (either way), and the workbook is removed by its first
//! download.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::ocr::{ExtractedText, ExtractionError, TextExtractor};
use crate::sheet::{self, RowTable, SheetArtifact, SheetError};
use crate::statement::extract_rows;

/// PDF readers accept the `%PDF-` header anywhere in the first kilobyte.
const PDF_HEADER_WINDOW: u64 = 1024;

/// Errors surfaced to the client. All of them are terminal for the request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("OCR processing failed: {0}")]
    OcrFailure(String),

    #[error("Failed to extract text from the PDF: {0}")]
    ExtractionFailure(String),

    #[error("No matching data found in the PDF.")]
    NoDataFound,

    #[error("File operation failed: {0}")]
    IoFailure(String),
}

impl From<ExtractionError> for PipelineError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Ocr { .. } => PipelineError::OcrFailure(err.to_string()),
            ExtractionError::Io(e) => PipelineError::IoFailure(e.to_string()),
            other => PipelineError::ExtractionFailure(other.to_string()),
        }
    }
}

impl From<SheetError> for PipelineError {
    fn from(err: SheetError) -> Self {
        PipelineError::IoFailure(err.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::IoFailure(err.to_string())
    }
}

/// Where a request currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    TextAcquired,
    RowsExtracted,
    Exported,
    Responded,
    Failed,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Received => "received",
            RequestState::TextAcquired => "text_acquired",
            RequestState::RowsExtracted => "rows_extracted",
            RequestState::Exported => "exported",
            RequestState::Responded => "responded",
            RequestState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Responded | RequestState::Failed)
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An uploaded document stored under its unique id.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub id: String,
    pub path: PathBuf,
}

/// Tracks one request's state and logs every transition.
#[derive(Debug)]
struct RequestRun {
    upload_id: String,
    state: RequestState,
}

impl RequestRun {
    fn new(upload_id: &str) -> Self {
        tracing::debug!(upload = upload_id, "Request received");
        Self {
            upload_id: upload_id.to_string(),
            state: RequestState::Received,
        }
    }

    fn advance(&mut self, next: RequestState) {
        tracing::debug!(upload = %self.upload_id, from = %self.state, to = %next, "Request state");
        self.state = next;
    }

    fn fail(&mut self, err: PipelineError) -> PipelineError {
        tracing::warn!(upload = %self.upload_id, state = %self.state, "Request failed: {}", err);
        self.state = RequestState::Failed;
        err
    }
}

/// Result of a successful request.
#[derive(Debug, Clone)]
pub struct ProcessedStatement {
    pub upload_id: String,
    pub table: RowTable,
    pub sheet: SheetArtifact,
    pub download_url: String,
    pub state: RequestState,
}

/// Orchestrates upload -> text -> rows -> workbook.
pub struct Pipeline {
    extractor: Arc<TextExtractor>,
    upload_dir: PathBuf,
    public_url: String,
}

impl Pipeline {
    pub fn new(extractor: TextExtractor, upload_dir: PathBuf, public_url: &str) -> Self {
        Self {
            extractor: Arc::new(extractor),
            upload_dir,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Store and process an uploaded document.
    pub async fn run(&self, bytes: &[u8]) -> Result<ProcessedStatement, PipelineError> {
        let upload = self.store_upload(bytes).await?;
        self.process(upload).await
    }

    /// Write upload bytes to a uniquely named file in the upload directory.
    pub async fn store_upload(&self, bytes: &[u8]) -> Result<StoredUpload, PipelineError> {
        let id = Uuid::new_v4().simple().to_string();
        let path = self.upload_dir.join(&id);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Stored upload {} ({} bytes)", id, bytes.len());
        Ok(StoredUpload { id, path })
    }

    /// Process a stored upload through every step.
    pub async fn process(&self, upload: StoredUpload) -> Result<ProcessedStatement, PipelineError> {
        let mut run = RequestRun::new(&upload.id);

        let acquired = self.acquire(&upload).await;
        let removed = remove_upload(&upload.path).await;
        let text = match (acquired, removed) {
            (Ok(text), Ok(())) => text,
            (Ok(_), Err(e)) => return Err(run.fail(e.into())),
            (Err(e), _) => return Err(run.fail(e)),
        };
        tracing::info!(
            upload = %upload.id,
            method = text.method.as_str(),
            "Acquired {} chars of text",
            text.text.len()
        );
        run.advance(RequestState::TextAcquired);

        let rows = extract_rows(&text.text);
        if rows.is_empty() {
            return Err(run.fail(PipelineError::NoDataFound));
        }
        run.advance(RequestState::RowsExtracted);

        let table = sheet::build_sheet(rows);
        let sheet = match self.export(&table, &upload.id).await {
            Ok(sheet) => sheet,
            Err(e) => return Err(run.fail(e)),
        };
        run.advance(RequestState::Exported);

        let download_url = format!("{}/download/{}", self.public_url, sheet.file_name);
        run.advance(RequestState::Responded);
        tracing::info!(
            upload = %upload.id,
            "Extracted {} rows into {}",
            table.rows.len(),
            sheet.file_name
        );

        Ok(ProcessedStatement {
            upload_id: upload.id,
            table,
            sheet,
            download_url,
            state: run.state,
        })
    }

    /// Check the upload is a PDF, then acquire its text off the async runtime.
    async fn acquire(&self, upload: &StoredUpload) -> Result<ExtractedText, PipelineError> {
        let path = upload.path.clone();
        let extractor = self.extractor.clone();

        tokio::task::spawn_blocking(move || {
            if !has_pdf_header(&path)? {
                return Err(PipelineError::ExtractionFailure(
                    "Uploaded file is not a PDF".to_string(),
                ));
            }
            extractor.acquire_text(&path).map_err(PipelineError::from)
        })
        .await
        .map_err(|e| PipelineError::ExtractionFailure(format!("extraction task failed: {}", e)))?
    }

    async fn export(&self, table: &RowTable, upload_id: &str) -> Result<SheetArtifact, PipelineError> {
        let table = table.clone();
        let dir = self.upload_dir.clone();
        let upload_id = upload_id.to_string();

        tokio::task::spawn_blocking(move || sheet::export(&table, &dir, &upload_id))
            .await
            .map_err(|e| PipelineError::IoFailure(format!("export task failed: {}", e)))?
            .map_err(PipelineError::from)
    }

    /// Hand out a generated workbook once, removing it from disk.
    pub async fn take_sheet(&self, file_name: &str) -> Result<Vec<u8>, SheetError> {
        sheet::take_artifact(&self.upload_dir, file_name).await
    }
}

/// True if `%PDF-` appears within the header window.
fn has_pdf_header(path: &Path) -> std::io::Result<bool> {
    let mut head = Vec::with_capacity(PDF_HEADER_WINDOW as usize);
    File::open(path)?
        .take(PDF_HEADER_WINDOW)
        .read_to_end(&mut head)?;
    Ok(head.windows(5).any(|w| w == b"%PDF-"))
}

async fn remove_upload(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            tracing::warn!("Failed to remove upload {}: {}", path.display(), e);
            Err(e)
        }
    }
}
