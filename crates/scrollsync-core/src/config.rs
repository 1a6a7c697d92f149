use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (progress store, log file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit diagnostic events from the scroll tracking subsystem
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            debug_logging: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Track and restore reading position
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Offsets closer than this to the restore target are left untouched
    #[serde(default = "default_restore_tolerance")]
    pub restore_tolerance: f64,
    /// Minimum milliseconds between progress store writes
    #[serde(default = "default_persist_debounce")]
    pub persist_debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            restore_tolerance: default_restore_tolerance(),
            persist_debounce_ms: default_persist_debounce(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Theme configuration
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Progress indicator geometry and tint
    #[serde(default)]
    pub indicator: IndicatorConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            theme: ThemeConfig::default(),
            indicator: IndicatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Smallest track height in logical units
    #[serde(default = "default_min_track_height")]
    pub min_track_height: f64,
    /// Fixed thumb height in logical units
    #[serde(default = "default_thumb_height")]
    pub thumb_height: f64,
    /// Thumb tint as a hex string; falls back to the theme accent when unset
    #[serde(default)]
    pub tint: Option<String>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            min_track_height: default_min_track_height(),
            thumb_height: default_thumb_height(),
            tint: None,
        }
    }
}

/// Theme selection, written either as `theme = "nord"` or as a table with
/// `name` and `colors`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ThemeSetting")]
pub struct ThemeConfig {
    /// Theme name (e.g., "gruvbox-dark", "nord")
    pub name: String,
    /// Per-slot color overrides
    pub colors: ThemeColorOverrides,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: default_theme_name(),
            colors: ThemeColorOverrides::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ThemeSetting {
    Name(String),
    Table {
        #[serde(default = "default_theme_name")]
        name: String,
        #[serde(default)]
        colors: ThemeColorOverrides,
    },
}

impl From<ThemeSetting> for ThemeConfig {
    fn from(setting: ThemeSetting) -> Self {
        match setting {
            ThemeSetting::Name(name) => Self {
                name,
                colors: ThemeColorOverrides::default(),
            },
            ThemeSetting::Table { name, colors } => Self { name, colors },
        }
    }
}

fn default_theme_name() -> String {
    "gruvbox-dark".to_string()
}

/// Hex overrides ("#rrggbb" or "rgb") for individual theme slots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeColorOverrides {
    pub bg0: Option<String>,
    /// Status bar background
    pub bg2: Option<String>,
    pub fg0: Option<String>,
    pub grey: Option<String>,
    /// Default indicator tint
    pub accent: Option<String>,
    /// Indicator track
    pub track: Option<String>,
}

/// Key bindings in Vim notation: "j", "G", "<C-d>", "<PageDown>", "gg"
///
/// Missing entries keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    pub quit: String,
    pub line_down: String,
    pub line_up: String,
    pub scroll_half_down: String,
    pub scroll_half_up: String,
    pub scroll_page_down: String,
    pub scroll_page_up: String,
    pub jump_to_top: String,
    pub jump_to_bottom: String,
    /// Pause or resume position tracking
    pub toggle_tracking: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        let key = |notation: &str| notation.to_string();
        Self {
            quit: key("q"),
            line_down: key("j"),
            line_up: key("k"),
            scroll_half_down: key("<C-d>"),
            scroll_half_up: key("<C-u>"),
            scroll_page_down: key("<C-f>"),
            scroll_page_up: key("<C-b>"),
            jump_to_top: key("gg"),
            jump_to_bottom: key("G"),
            toggle_tracking: key("t"),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scrollsync")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_restore_tolerance() -> f64 {
    crate::restorer::RESTORE_TOLERANCE
}

fn default_persist_debounce() -> u64 {
    500
}

fn default_tick_rate() -> u64 {
    100
}

fn default_min_track_height() -> f64 {
    crate::indicator::MIN_TRACK_HEIGHT
}

fn default_thumb_height() -> f64 {
    crate::indicator::THUMB_HEIGHT
}

/// Resolve a leading `~` against the home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, falling back to defaults when missing
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Render configuration as pretty TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollsync/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollsync")
            .join("config.toml")
    }

    /// Get the progress store file path
    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("progress.json")
    }

    /// Get the log file path used while the terminal UI owns stdout
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("scrollsync.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}
