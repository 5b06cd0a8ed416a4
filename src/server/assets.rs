//! Static asset constants (HTML, CSS and JavaScript).

/// Upload page.
pub const INDEX_HTML: &str = include_str!("index.html");

/// Stylesheet for the web interface.
pub const CSS: &str = include_str!("styles.css");

/// Drag-and-drop upload and result table rendering.
pub const JS: &str = include_str!("scripts.js");
