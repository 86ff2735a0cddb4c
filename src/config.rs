//! Configuration file support for Placemark.
//!
//! Settings are stored as JSON: in the platform config directory on native
//! builds and in `localStorage` on the web.

use serde::{Deserialize, Serialize};

use crate::constants::map;
use crate::controller::{ControllerSettings, EditPolicy};
use crate::dialog::DialogSettings;
use crate::model::Coordinates;
use crate::validation::LogoLimits;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Convert to log crate's Level, if logging is enabled at all.
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// File name of the native config file.
pub const CONFIG_FILENAME: &str = "placemark-config.json";

#[cfg(target_arch = "wasm32")]
const LOCAL_STORAGE_KEY: &str = "placemark-config";

/// Initial map view handed to the map engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center")]
    pub center: Coordinates,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
    #[serde(default = "default_detect_retina")]
    pub detect_retina: bool,
    /// Put a plain pin at `center` when the map is ready
    #[serde(default = "default_center_marker")]
    pub center_marker: bool,
}

fn default_center() -> Coordinates {
    Coordinates::from(map::CENTER)
}

fn default_zoom() -> f64 {
    map::ZOOM
}

fn default_max_zoom() -> f64 {
    map::MAX_ZOOM
}

fn default_tile_url() -> String {
    map::TILE_URL.to_string()
}

fn default_attribution() -> String {
    map::ATTRIBUTION.to_string()
}

fn default_detect_retina() -> bool {
    true
}

fn default_center_marker() -> bool {
    true
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            max_zoom: default_max_zoom(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            detect_retina: default_detect_retina(),
            center_marker: default_center_marker(),
        }
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub dialog: DialogSettings,

    /// Accepted logo size window
    #[serde(default)]
    pub logo: LogoLimits,

    /// What a submitted edit does to its marker
    #[serde(default)]
    pub edit_policy: EditPolicy,

    #[serde(default)]
    pub preferences: UserPreferences,
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            map: MapConfig::default(),
            dialog: DialogSettings::default(),
            logo: LogoLimits::default(),
            edit_policy: EditPolicy::default(),
            preferences: UserPreferences::default(),
        }
    }

    /// Settings for the annotation controller.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            dialog: self.dialog.clone(),
            edit_policy: self.edit_policy,
            center_marker: self.map.center_marker.then_some(self.map.center),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Where the native build keeps its config file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("placemark").join(CONFIG_FILENAME))
    }

    /// Read a config file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write a config file, creating its directory if needed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("⚙️ Saved configuration to {}", path.display());
        Ok(())
    }

    /// Load `path`, falling back to defaults when it is missing or unreadable.
    ///
    /// The flag is true when no file existed yet.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: &std::path::Path) -> (Self, bool) {
        if !path.exists() {
            return (Self::default(), true);
        }
        match Self::load_from(path) {
            Ok(config) => (config, false),
            Err(e) => {
                log::warn!("⚙️ Ignoring config {}: {}", path.display(), e);
                (Self::default(), false)
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn local_storage() -> Result<web_sys::Storage, ConfigError> {
        web_sys::window()
            .ok_or_else(|| ConfigError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(|e| ConfigError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| ConfigError::Storage("localStorage disabled".to_string()))
    }

    /// Read the stored config, `None` if nothing was stored yet.
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_local_storage() -> Result<Option<Self>, ConfigError> {
        let stored = Self::local_storage()?
            .get_item(LOCAL_STORAGE_KEY)
            .map_err(|e| ConfigError::Storage(format!("{:?}", e)))?;
        stored.as_deref().map(Self::from_json).transpose()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save_to_local_storage(&self) -> Result<(), ConfigError> {
        Self::local_storage()?
            .set_item(LOCAL_STORAGE_KEY, &self.to_json()?)
            .map_err(|e| ConfigError::Storage(format!("{:?}", e)))?;
        log::info!("⚙️ Saved configuration to localStorage");
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config version {found} is newer than supported version {supported}")]
    VersionTooNew { found: u32, supported: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Browser `localStorage` is unavailable or refused the operation
    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.map.zoom, 14.0);
        assert_eq!(config.map.max_zoom, 19.0);
        assert_eq!(config.map.center, Coordinates::new(51.2404030496661, -0.6119522539693528));
        assert_eq!(config.dialog.width, "40vw");
        assert_eq!(config.logo, LogoLimits::default());
        assert_eq!(config.edit_policy, EditPolicy::Discard);
        assert_eq!(config.preferences.log_level, LogLevel::Info);
    }

    #[test]
    fn test_json_roundtrip_keeps_changes() {
        let mut config = AppConfig::default();
        config.edit_policy = EditPolicy::ReplaceInPlace;
        config.logo.max_kb = 250.0;
        config.preferences.log_level = LogLevel::Debug;

        let json = config.to_json().unwrap();
        assert!(json.contains("\"replace_in_place\""));
        assert!(json.contains("\"debug\""));

        let loaded = AppConfig::from_json(&json).unwrap();
        assert_eq!(loaded.edit_policy, EditPolicy::ReplaceInPlace);
        assert_eq!(loaded.logo.max_kb, 250.0);
        assert_eq!(loaded.preferences.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AppConfig::from_json(r#"{ "version": 1, "logo": { "max_kb": 50 } }"#).unwrap();
        assert_eq!(config.logo.min_kb, 1.0);
        assert_eq!(config.logo.max_kb, 50.0);
        assert_eq!(config.map, MapConfig::default());
        assert_eq!(config.dialog, DialogSettings::default());
    }

    #[test]
    fn test_version_too_new() {
        let result = AppConfig::from_json(r#"{ "version": 99 }"#);
        assert!(matches!(
            result,
            Err(ConfigError::VersionTooNew {
                found: 99,
                supported: CONFIG_VERSION
            })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            AppConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_center_marker_setting() {
        let mut config = AppConfig::default();
        assert_eq!(config.controller_settings().center_marker, Some(config.map.center));

        config.map.center_marker = false;
        assert_eq!(config.controller_settings().center_marker, None);
    }

    #[test]
    #[cfg(not(target_arch = "wasm32"))]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILENAME);

        let (config, first_run) = AppConfig::load_or_default(&path);
        assert!(first_run);

        let mut config = config;
        config.edit_policy = EditPolicy::Duplicate;
        config.save_to(&path).unwrap();

        let (loaded, first_run) = AppConfig::load_or_default(&path);
        assert!(!first_run);
        assert_eq!(loaded.edit_policy, EditPolicy::Duplicate);
        assert_eq!(AppConfig::load_from(&path).unwrap().edit_policy, EditPolicy::Duplicate);
    }

    #[test]
    #[cfg(not(target_arch = "wasm32"))]
    fn test_broken_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"{ broken").unwrap();

        assert!(matches!(AppConfig::load_from(file.path()), Err(ConfigError::Parse(_))));
        let (config, first_run) = AppConfig::load_or_default(file.path());
        assert!(!first_run);
        assert_eq!(config.edit_policy, EditPolicy::Discard);
    }

    #[test]
    #[cfg(not(target_arch = "wasm32"))]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppConfig::load_from(&dir.path().join("absent.json")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Trace.to_level(), log::Level::Trace);
    }
}
