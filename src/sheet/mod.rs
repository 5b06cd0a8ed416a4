//! Tabular export of statement rows.
//!
//! Rows are laid out under a fixed header and written as a single-sheet
//! xlsx workbook. Workbooks live in the upload directory until their first
//! download, which removes them.

mod xlsx;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::statement::{StatementRow, COLUMN_COUNT};

pub use xlsx::{write_workbook, SHEET_NAME};

/// Column titles, in field order.
pub const HEADER: [&str; COLUMN_COUNT] = ["Date", "Type", "Description", "Amount", "Dr Amount"];

/// File extension of generated workbooks.
pub const SHEET_EXTENSION: &str = "xlsx";

/// Errors from building or serving a workbook.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Spreadsheet not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Header plus rows, in document order.
///
/// Serializes as an array of arrays with the header first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTable {
    pub rows: Vec<StatementRow>,
}

impl RowTable {
    /// Number of rows including the header.
    pub fn len(&self) -> usize {
        self.rows.len() + 1
    }

    /// True if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major grid of cells, header first.
    pub fn grid(&self) -> impl Iterator<Item = [Option<&str>; COLUMN_COUNT]> + '_ {
        std::iter::once(HEADER.map(Some)).chain(self.rows.iter().map(StatementRow::cells))
    }
}

impl Serialize for RowTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        seq.serialize_element(&HEADER)?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

/// Wrap `rows` in a table; the header is supplied by `grid()` and serialization.
pub fn build_sheet(rows: Vec<StatementRow>) -> RowTable {
    RowTable { rows }
}

/// A workbook written to disk for one upload.
#[derive(Debug, Clone)]
pub struct SheetArtifact {
    /// `<upload id>.xlsx`
    pub file_name: String,
    pub path: PathBuf,
    /// Rows written, including the header.
    pub row_count: usize,
}

/// Write `table` as `<upload_id>.xlsx` inside `dir`.
///
/// A partially written file is removed if serialization fails.
pub fn export(table: &RowTable, dir: &Path, upload_id: &str) -> Result<SheetArtifact, SheetError> {
    let file_name = format!("{}.{}", upload_id, SHEET_EXTENSION);
    let path = dir.join(&file_name);

    if let Err(e) = write_workbook(table, &path) {
        if let Err(cleanup) = std::fs::remove_file(&path) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove partial workbook {}: {}", path.display(), cleanup);
            }
        }
        return Err(e);
    }

    Ok(SheetArtifact {
        file_name,
        path,
        row_count: table.len(),
    })
}

/// Check that a requested download name is a bare workbook file name.
pub fn is_valid_artifact_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && !file_name.contains("..")
        && !file_name.contains('/')
        && !file_name.contains('\\')
        && Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext == SHEET_EXTENSION)
}

/// Read a generated workbook and remove it from disk.
///
/// Each workbook can be taken once; later requests get `NotFound`.
pub async fn take_artifact(dir: &Path, file_name: &str) -> Result<Vec<u8>, SheetError> {
    if !is_valid_artifact_name(file_name) {
        return Err(SheetError::NotFound(file_name.to_string()));
    }

    let path = dir.join(file_name);
    let content = match tokio::fs::read(&path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SheetError::NotFound(file_name.to_string()));
        }
        Err(e) => return Err(SheetError::Io(e)),
    };

    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(content),
        // Another request took it between our read and remove
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SheetError::NotFound(file_name.to_string()))
        }
        Err(e) => Err(SheetError::Io(e)),
    }
}
