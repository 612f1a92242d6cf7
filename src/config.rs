// Configuration for the surface client
//
// Configuration is loaded in order of precedence:
// 1. Environment variables (highest priority)
// 2. Config file (~/.config/surfcast/config.toml)
// 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Feature flags for optional modules (opt-out: default enabled)
#[derive(Debug, Clone)]
pub struct Features {
    /// Storage module: write turn events to JSONL files
    pub storage: bool,

    /// Log pane: show captured tracing output inside the TUI
    pub log_pane: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            storage: true,
            log_pane: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the agent endpoints (`{endpoint}/chat`, `{endpoint}/action`)
    pub endpoint: String,

    /// Directory for session event logs
    pub log_dir: PathBuf,

    /// Demo mode: replay a scripted frame sequence, no network
    pub demo_mode: bool,

    /// Feature flags for optional modules
    pub features: Features,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Feature flags as loaded from config file
#[derive(Debug, Deserialize, Default)]
struct FileFeatures {
    storage: Option<bool>,
    log_pane: Option<bool>,
}

/// Logging settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
struct FileLogging {
    level: Option<String>,
}

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    endpoint: Option<String>,
    log_dir: Option<String>,

    /// Optional [features] section
    features: Option<FileFeatures>,

    /// Optional [logging] section
    logging: Option<FileLogging>,
}

impl Config {
    /// Get the config file path: ~/.config/surfcast/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("surfcast").join("config.toml"))
    }

    /// Create config template if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        // Create parent directory
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        let template = r#"# surfcast configuration
# Uncomment and modify options as needed

# Agent endpoint base URL (default: http://127.0.0.1:3001/api)
# endpoint = "http://127.0.0.1:3001/api"

# Log directory for session files (default: ./logs)
# log_dir = "./logs"

# Feature flags (default: all enabled)
# [features]
# storage = true   # Write turn events to JSONL files
# log_pane = true  # Show captured logs inside the TUI

# Logging configuration
# [logging]
# level = "info"  # trace, debug, info, warn, error (RUST_LOG env var overrides this)
"#;

        // Write template (ignore errors - config is optional)
        let _ = std::fs::write(&path, template);
    }

    /// Load file config if it exists
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                FileConfig::default()
            }),
            Err(_) => FileConfig::default(), // File doesn't exist, use defaults
        }
    }

    /// Serialize config to TOML string (single source of truth for format)
    pub fn to_toml(&self) -> String {
        format!(
            r#"# surfcast configuration

# Agent endpoint base URL
endpoint = "{endpoint}"

# Log directory for session files
log_dir = "{log_dir}"

# Feature flags
[features]
storage = {storage}
log_pane = {log_pane}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
"#,
            endpoint = self.endpoint,
            log_dir = self.log_dir.display(),
            storage = self.features.storage,
            log_pane = self.features.log_pane,
            log_level = self.logging.level,
        )
    }

    /// Save current configuration to file
    pub fn save(&self) -> Result<(), std::io::Error> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            ));
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml())
    }

    /// Load configuration: file -> env vars -> defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();

        // Endpoint: env > file > default
        let endpoint = std::env::var("SURFCAST_ENDPOINT")
            .ok()
            .or(file.endpoint)
            .unwrap_or_else(|| "http://127.0.0.1:3001/api".to_string());

        // Log directory: env > file > default
        let log_dir = std::env::var("SURFCAST_LOG_DIR")
            .ok()
            .or(file.log_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"));

        // Demo mode: env only (runtime flag, also settable via --demo)
        let demo_mode = std::env::var("SURFCAST_DEMO")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        // Feature flags: file config only (env vars would be verbose)
        // Default: enabled (opt-out pattern)
        let file_features = file.features.unwrap_or_default();
        let features = Features {
            storage: file_features.storage.unwrap_or(true),
            log_pane: file_features.log_pane.unwrap_or(true),
        };

        // Logging settings: file config only (RUST_LOG env var handled in main.rs)
        let file_logging = file.logging.unwrap_or_default();
        let logging = LoggingConfig {
            level: file_logging.level.unwrap_or_else(|| "info".to_string()),
        };

        Self {
            endpoint,
            log_dir,
            demo_mode,
            features,
            logging,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3001/api".to_string(),
            log_dir: PathBuf::from("./logs"),
            demo_mode: false,
            features: Features::default(),
            logging: LoggingConfig::default(),
        }
    }
}
