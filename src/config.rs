use crate::error::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gallery.toml";

/// Overrides `api_base` from the environment
pub const API_BASE_ENV: &str = "GALLERY_API_BASE";

/// Static client configuration (`gallery.toml`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Base URL of the gallery API server
    pub api_base: String,
    /// SQLite file holding the session
    pub database_path: PathBuf,
    /// Page size for category and media listings
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            database_path: PathBuf::from("./data/family-gallery.db"),
            page_size: 12,
            request_timeout_secs: 60,
        }
    }
}

impl GalleryConfig {
    /// Load config from an explicit path, or `gallery.toml` when present
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Ok(api_base) = std::env::var(API_BASE_ENV) {
            if !api_base.trim().is_empty() {
                log::debug!("Using {} from environment", API_BASE_ENV);
                config.api_base = api_base.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        toml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        if self.page_size == 0 || self.page_size > 100 {
            return Err(AppError::Config(
                "page_size must be between 1 and 100".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
