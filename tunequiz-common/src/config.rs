//! Bootstrap configuration loading and config file discovery
//!
//! Settings resolve in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! This module owns steps 3 and 4. A missing config file is not an error:
//! the service starts on compiled defaults and logs where it looked.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application name used for config directories
const APP_DIR: &str = "tunequiz";

/// Bootstrap configuration loaded from TOML file
///
/// All fields are optional in the file; anything missing takes the compiled
/// default. Changes require a restart.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Root for per-round scratch directories (downloads and clips)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Curation service (Gemini) API key
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Fallback search API (SerpAPI) key; absence disables that tier
    #[serde(default)]
    pub serpapi_api_key: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// External command-line tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Curation service settings
    #[serde(default)]
    pub curation: CurationConfig,

    /// Outbound HTTP settings (fallback search, metadata lookup)
    #[serde(default)]
    pub http: HttpConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// External tool locations and time budgets
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Media search/download tool binary
    #[serde(default = "default_yt_dlp")]
    pub yt_dlp: String,

    /// Audio trimming tool binary
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// Media search ceiling
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,

    /// Single-link duration probe ceiling
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Audio download ceiling
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Trim ceiling
    #[serde(default = "default_trim_timeout")]
    pub trim_timeout_secs: u64,
}

/// Curation (generative text) service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CurationConfig {
    /// Model name passed to the generateContent endpoint
    #[serde(default = "default_model")]
    pub model: String,

    /// Ceiling for crafting a search query
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Ceiling for requesting a song batch
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_secs: u64,
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request ceiling for fallback search and metadata lookup
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_yt_dlp() -> String {
    "yt-dlp".to_string()
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_search_timeout() -> u64 {
    20
}

fn default_probe_timeout() -> u64 {
    8
}

fn default_download_timeout() -> u64 {
    180
}

fn default_trim_timeout() -> u64 {
    60
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_query_timeout() -> u64 {
    15
}

fn default_batch_timeout() -> u64 {
    20
}

fn default_http_timeout() -> u64 {
    15
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            scratch_dir: None,
            gemini_api_key: None,
            serpapi_api_key: None,
            logging: LoggingConfig::default(),
            tools: ToolsConfig::default(),
            curation: CurationConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    ///
    /// A bare level applies to the TuneQuiz crates; a value that already holds
    /// directives (`,` or `=`) is used unchanged.
    pub fn filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.contains(',') || level.contains('=') {
            level.to_string()
        } else {
            format!("tunequiz_server={0},tunequiz_common={0},tower_http=info", level)
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp: default_yt_dlp(),
            ffmpeg: default_ffmpeg(),
            search_timeout_secs: default_search_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            download_timeout_secs: default_download_timeout(),
            trim_timeout_secs: default_trim_timeout(),
        }
    }
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            query_timeout_secs: default_query_timeout(),
            batch_timeout_secs: default_batch_timeout(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
        }
    }
}

impl TomlConfig {
    /// Scratch root, defaulting to `<system temp>/tunequiz`
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR))
    }
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate the config file for this platform
///
/// `~/.config/tunequiz/config.toml` first, then `/etc/tunequiz/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Load bootstrap configuration
///
/// An explicit path must exist and parse. Without one, the discovered file is
/// used if present, otherwise compiled defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        let config = read_toml_config(path)?;
        info!("Configuration loaded from {}", path.display());
        return Ok(config);
    }

    match find_config_file() {
        Some(path) => {
            let config = read_toml_config(&path)?;
            info!("Configuration loaded from {}", path.display());
            Ok(config)
        }
        None => {
            debug!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Non-blank value check for secrets and overrides
pub fn is_set(value: &str) -> bool {
    !value.trim().is_empty()
}
