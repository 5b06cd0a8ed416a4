//! Configuration management for stmtx.
//!
//! Settings are resolved in layers: built-in defaults, then a config file
//! (explicit `--config`, or auto-discovered with the prefer crate), then
//! environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ocr::{RasterOptions, TextExtractor};
use crate::pipeline::Pipeline;

/// Name used for config discovery (`stmtx.toml`, `stmtx.yaml`, ...).
pub const CONFIG_NAME: &str = "stmtx";

/// Default public base URL for download links.
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// Default maximum upload size in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory for uploaded PDFs, page images and generated workbooks.
    pub upload_dir: PathBuf,
    /// Base URL used to build download links.
    pub public_url: String,
    /// Tesseract language code.
    pub ocr_language: String,
    /// Rendering parameters for scanned pages.
    pub raster: RasterOptions,
    /// Maximum accepted request body in megabytes.
    pub max_upload_mb: usize,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: data dir -> home dir -> current dir
        let upload_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stmtx")
            .join("uploads");

        Self {
            upload_dir,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            ocr_language: crate::ocr::DEFAULT_LANGUAGE.to_string(),
            raster: RasterOptions::default(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl Settings {
    /// Create settings with a custom upload directory.
    pub fn with_upload_dir(upload_dir: PathBuf) -> Self {
        Self {
            upload_dir,
            ..Default::default()
        }
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.upload_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create upload directory '{}': {}",
                    self.upload_dir.display(),
                    e
                ),
            )
        })
    }

    /// Build a text extractor from these settings.
    pub fn text_extractor(&self) -> TextExtractor {
        TextExtractor::new(self.raster, &self.ocr_language).with_scratch_dir(&self.upload_dir)
    }

    /// Build the request pipeline from these settings.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.text_extractor(), self.upload_dir.clone(), &self.public_url)
    }

    /// Maximum request body size in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Page rendering section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Configuration file contents. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upload directory (relative paths resolve against the config file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<String>,
    /// Base URL for download links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    /// Tesseract language code, e.g. "eng".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_language: Option<String>,
    /// Page rendering overrides.
    #[serde(default)]
    pub raster: RasterConfig,
    /// Maximum upload size in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_mb: Option<usize>,

    /// Path of the file this config was read from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no config file is found or it cannot be parsed.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref upload_dir) = self.upload_dir {
            settings.upload_dir = self.resolve_path(upload_dir, base_dir);
        }
        if let Some(ref url) = self.public_url {
            settings.public_url = url.clone();
        }
        if let Some(ref lang) = self.ocr_language {
            settings.ocr_language = lang.clone();
        }
        if let Some(dpi) = self.raster.dpi {
            settings.raster.dpi = dpi;
        }
        if let Some(width) = self.raster.width {
            settings.raster.width = width;
        }
        if let Some(height) = self.raster.height {
            settings.raster.height = height;
        }
        if let Some(mb) = self.max_upload_mb {
            settings.max_upload_mb = mb;
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Read a non-empty environment variable.
fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Apply `STMTX_*` environment variables, which take precedence over files.
fn apply_env_overrides(settings: &mut Settings) {
    if let Some(dir) = env_override("STMTX_UPLOAD_DIR") {
        tracing::debug!("Using STMTX_UPLOAD_DIR from environment: {}", dir);
        settings.upload_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
    }
    if let Some(url) = env_override("STMTX_PUBLIC_URL") {
        tracing::debug!("Using STMTX_PUBLIC_URL from environment: {}", url);
        settings.public_url = url;
    }
    if let Some(lang) = env_override("STMTX_OCR_LANGUAGE") {
        tracing::debug!("Using STMTX_OCR_LANGUAGE from environment: {}", lang);
        settings.ocr_language = lang;
    }
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    // Priority 1: Explicit --config flag, Priority 2: auto-discover via prefer
    let config = match options.config_path {
        Some(ref path) => match Config::load_from_path(path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Config::default()
            }
        },
        None => Config::load().await,
    };

    let mut settings = Settings::default();
    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    config.apply_to_settings(&mut settings, &base_dir);
    apply_env_overrides(&mut settings);

    (settings, config)
}
