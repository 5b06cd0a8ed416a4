//! stmtx - bank statement PDF to spreadsheet converter.
//!
//! Pulls transaction rows out of statement PDFs (native text or OCR) and
//! exports them as xlsx workbooks, from the command line or over HTTP.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let default_filter = if stmtx::cli::is_verbose() {
        "stmtx=info"
    } else {
        "stmtx=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    stmtx::cli::run().await
}
