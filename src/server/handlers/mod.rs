//! HTTP request handlers for the web server.

mod download;
mod helpers;
mod static_files;
mod upload;

// Re-export handlers for use by the router
pub use download::download_sheet;
pub use static_files::{health, index, serve_css, serve_js};
pub use upload::upload_statement;
