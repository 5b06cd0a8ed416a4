//! One-shot extraction from the command line.

use std::path::{Path, PathBuf};

use crate::cli::icons::{info, success};
use crate::config::Settings;
use crate::pipeline::PipelineError;
use crate::sheet::{build_sheet, write_workbook, SHEET_EXTENSION};
use crate::statement::extract_rows;

/// Extract rows from a local PDF and write them as a workbook or JSON.
pub async fn cmd_extract(
    settings: &Settings,
    input: &Path,
    output: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    if !input.is_file() {
        anyhow::bail!("File not found: {}", input.display());
    }
    settings.ensure_directories()?;

    let extractor = settings.text_extractor();
    let pdf_path = input.to_path_buf();
    let extracted = tokio::task::spawn_blocking(move || extractor.acquire_text(&pdf_path))
        .await?
        .map_err(PipelineError::from)?;

    tracing::info!(
        "Read {} characters from {} ({})",
        extracted.text.len(),
        input.display(),
        extracted.method.as_str()
    );

    let rows = extract_rows(&extracted.text);
    if rows.is_empty() {
        return Err(PipelineError::NoDataFound.into());
    }
    let table = build_sheet(rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));
    eprintln!(
        "{} Writing {} rows to {}",
        info(),
        table.rows.len(),
        output.display()
    );

    let table_path = output.clone();
    tokio::task::spawn_blocking(move || write_workbook(&table, &table_path))
        .await?
        .map_err(PipelineError::from)?;

    eprintln!("{} Saved {}", success(), output.display());
    Ok(())
}

/// Input path with its extension replaced by `.xlsx`.
fn default_output(input: &Path) -> PathBuf {
    input.with_extension(SHEET_EXTENSION)
}
