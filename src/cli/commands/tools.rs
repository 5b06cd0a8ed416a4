//! External tool availability report.

use console::style;

use crate::cli::icons::{error, success};
use crate::config::Settings;
use crate::ocr::{OcrBackend, TesseractBackend, TextExtractor};

/// Print which extraction tools are on PATH.
pub fn cmd_tools(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", style("External tools").bold());

    let tools = TextExtractor::check_tools();
    let total = tools.len();
    let mut missing = 0;
    for (tool, available) in tools {
        if available {
            println!("  {} {}", success(), tool);
        } else {
            missing += 1;
            println!("  {} {} {}", error(), tool, style("(not found)").dim());
        }
    }

    let tesseract = TesseractBackend::with_language(&settings.ocr_language);
    println!("\nOCR language: {}", style(tesseract.language()).cyan());
    if !tesseract.is_available() {
        println!("{}", style(tesseract.availability_hint()).yellow());
    }

    if missing > 0 {
        println!(
            "\n{} of {} tools missing; some statements cannot be read without them.",
            missing, total
        );
    }

    Ok(())
}
