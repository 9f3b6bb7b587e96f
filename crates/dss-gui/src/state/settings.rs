//! Application settings - persisted user preferences.
//!
//! Settings are loaded from disk at startup and saved when changed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application settings.
///
/// Serialized to TOML and stored in the user's config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Override for the specification cache directory. `None` uses the
    /// platform cache directory.
    pub cache_dir: Option<PathBuf>,

    /// Log level filter, e.g. `"info"` or `"dss_loader=debug"`.
    pub log_level: String,

    /// Start the application in the favorites view.
    pub show_favorites_on_start: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "info".to_string(),
            show_favorites_on_start: false,
        }
    }
}

impl Settings {
    /// Load settings from the default path.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path, falling back to defaults on any
    /// read or parse failure.
    #[must_use]
    pub fn load_from(path: &PathBuf) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize settings: {e}"))?;

        std::fs::write(path, content).map_err(|e| format!("Failed to write settings: {e}"))
    }

    /// Get the default config file path.
    #[must_use]
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "DicomSpecStudio", "DSS")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Path of the favorites file, next to the settings file.
    #[must_use]
    pub fn favorites_path() -> PathBuf {
        directories::ProjectDirs::from("com", "DicomSpecStudio", "DSS")
            .map(|dirs| dirs.config_dir().join(dss_persistence::FAVORITES_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(dss_persistence::FAVORITES_FILE_NAME))
    }

    /// Resolve the specification cache root.
    #[must_use]
    pub fn cache_root(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("com", "DicomSpecStudio", "DSS")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("cache"))
    }
}

/// Initialize the global tracing subscriber from the settings log level.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(settings: &Settings) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
