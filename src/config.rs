//! Configuration system for Persona Panel
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (PANEL_* prefix, plus OPENAI_API_KEY as a key fallback)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::OpenAiConfig;
use crate::error::{Error, Result};

/// Main panel configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// HTTP listener settings
    pub server: ServerSettings,

    /// Generation backend settings
    pub generation: GenerationSettings,

    /// Fan-out behavior
    pub panel: FanOutSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// TCP port (0 = auto-assign)
    pub port: u16,

    /// Allow cross-origin requests from any origin
    pub cors: bool,

    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

/// OpenAI-compatible generation backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// API base URL (e.g., "https://api.openai.com/v1", "http://localhost:11434/v1")
    pub base_url: String,

    /// API key (empty string for local servers like Ollama)
    pub api_key: String,

    /// Model identifier sent with every persona call
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum tokens per persona response (unset = backend default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (unset = backend default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Fan-out settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanOutSettings {
    /// Maximum persona calls in flight per request (0 = unbounded)
    pub max_concurrency: usize,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

/// Default request body limit (16 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

// Default implementations

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4-turbo".to_string(),
            timeout_secs: 120,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl ServerSettings {
    /// `host:port` string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl GenerationSettings {
    /// Connection settings for the OpenAI-compatible client
    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl PanelConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            config = Self::from_file(&path)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without applying overrides
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::config_parse(format!("{}: {}", path.display(), e.message()), e))
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::config_not_found(path))
            };
        }

        let search_paths = [
            Some(PathBuf::from("persona-panel.toml")),
            dirs::config_dir().map(|p| p.join("persona-panel").join("config.toml")),
            dirs::home_dir().map(|p| p.join(".persona-panel").join("config.toml")),
            Some(PathBuf::from("/etc/persona-panel/config.toml")),
        ];

        for path in search_paths.into_iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Server settings
        if let Ok(val) = std::env::var("PANEL_HOST") {
            self.server.host = val;
        }
        if let Some(n) = env_parse("PANEL_PORT") {
            self.server.port = n;
        }
        if let Some(b) = env_flag("PANEL_CORS") {
            self.server.cors = b;
        }
        if let Some(n) = env_parse("PANEL_MAX_BODY_BYTES") {
            self.server.max_body_bytes = n;
        }

        // Generation settings
        if let Ok(val) = std::env::var("PANEL_OPENAI_BASE_URL") {
            self.generation.base_url = val;
        }
        if let Ok(val) = std::env::var("PANEL_OPENAI_API_KEY") {
            self.generation.api_key = val;
        }
        if self.generation.api_key.is_empty() {
            if let Ok(val) = std::env::var("OPENAI_API_KEY") {
                self.generation.api_key = val;
            }
        }
        if let Ok(val) = std::env::var("PANEL_MODEL") {
            self.generation.model = val;
        }
        if let Some(n) = env_parse("PANEL_TIMEOUT_SECS") {
            self.generation.timeout_secs = n;
        }
        if let Some(n) = env_parse("PANEL_MAX_TOKENS") {
            self.generation.max_tokens = Some(n);
        }
        if let Some(t) = env_parse("PANEL_TEMPERATURE") {
            self.generation.temperature = Some(t);
        }

        // Fan-out settings
        if let Some(n) = env_parse("PANEL_MAX_CONCURRENCY") {
            self.panel.max_concurrency = n;
        }

        // Logging settings
        if let Ok(val) = std::env::var("PANEL_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("PANEL_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Some(b) = env_flag("PANEL_LOG_JSON") {
            self.logging.json_format = b;
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "server.host",
                "Server host cannot be empty",
            ));
        }
        if self.server.max_body_bytes == 0 {
            return Err(Error::config_field_invalid(
                "server.max_body_bytes",
                "max_body_bytes must be greater than 0",
            ));
        }

        let base_url = &self.generation.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::config_field_invalid(
                "generation.base_url",
                format!("Base URL must start with http:// or https:// (got '{}')", base_url),
            ));
        }
        if self.generation.model.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "generation.model",
                "Model identifier cannot be empty",
            ));
        }
        if self.generation.timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "generation.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }
        if let Some(t) = self.generation.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(Error::config_field_invalid(
                    "generation.temperature",
                    "temperature must be between 0.0 and 2.0",
                ));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|val| val.to_lowercase() == "true" || val == "1")
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".persona-panel")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::config_validation(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
pub fn generate_default_config() -> String {
    r#"# Persona Panel Configuration

[server]
# Interface to bind
host = "127.0.0.1"

# TCP port (0 = auto-assign)
port = 3000

# Allow cross-origin requests from any origin
cors = true

# Largest accepted request body in bytes (16 MiB)
max_body_bytes = 16777216

[generation]
# API base URL (OpenAI, Ollama, vLLM, LM Studio, gateways)
base_url = "https://api.openai.com/v1"

# API key (leave empty for local servers; OPENAI_API_KEY is used as a fallback)
api_key = ""

# Model identifier sent with every persona call
model = "gpt-4-turbo"

# Request timeout in seconds
timeout_secs = 120

# Maximum tokens per persona response
# max_tokens = 800

# Sampling temperature (0.0 - 2.0)
# temperature = 0.7

[panel]
# Maximum persona calls in flight per request (0 = unbounded)
max_concurrency = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.persona-panel/logs/panel.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PanelConfig::default();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.generation.model, "gpt-4-turbo");
        assert_eq!(config.panel.max_concurrency, 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_override() {
        env::set_var("PANEL_PORT", "8088");
        env::set_var("PANEL_MODEL", "llama3");
        env::set_var("PANEL_MAX_CONCURRENCY", "2");
        env::set_var("PANEL_LOG_JSON", "1");

        let mut config = PanelConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.generation.model, "llama3");
        assert_eq!(config.panel.max_concurrency, 2);
        assert!(config.logging.json_format);

        env::remove_var("PANEL_PORT");
        env::remove_var("PANEL_MODEL");
        env::remove_var("PANEL_MAX_CONCURRENCY");
        env::remove_var("PANEL_LOG_JSON");
    }

    #[test]
    fn test_env_override_ignores_unparseable_numbers() {
        env::set_var("PANEL_TIMEOUT_SECS", "soon");
        let mut config = PanelConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.generation.timeout_secs, 120);
        env::remove_var("PANEL_TIMEOUT_SECS");
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let mut config = PanelConfig::default();
        config.generation.base_url = "ftp://example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigValidation { field: Some(ref f), .. } if f == "generation.base_url"
        ));
    }

    #[test]
    fn test_validation_zero_body_limit() {
        let mut config = PanelConfig::default();
        config.server.max_body_bytes = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigValidation { field: Some(ref f), .. } if f == "server.max_body_bytes"
        ));
    }

    #[test]
    fn test_validation_empty_model() {
        let mut config = PanelConfig::default();
        config.generation.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut config = PanelConfig::default();
        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_temperature_range() {
        let mut config = PanelConfig::default();
        config.generation.temperature = Some(2.5);
        assert!(config.validate().is_err());
        config.generation.temperature = Some(0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = PanelConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(PanelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = PanelConfig::default();
        config.logging.file = Some("~/logs/panel.log".to_string());
        config.expand_paths();
        assert!(!config.logging.file.unwrap().contains('~'));
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = PanelConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PanelConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_default_config_file_parses() {
        let parsed: PanelConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, PanelConfig::default());
    }

    #[test]
    fn test_parse_config_file() {
        let config_str = r#"
[server]
host = "0.0.0.0"
port = 8080

[generation]
base_url = "http://localhost:11434/v1"
model = "llama3"
temperature = 0.3

[panel]
max_concurrency = 2
"#;

        let config: PanelConfig = toml::from_str(config_str).unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert!(config.server.cors);
        assert_eq!(config.generation.model, "llama3");
        assert_eq!(config.generation.temperature, Some(0.3));
        assert_eq!(config.generation.timeout_secs, 120);
        assert_eq!(config.panel.max_concurrency, 2);
    }

    #[test]
    fn test_openai_config_from_settings() {
        let settings = GenerationSettings {
            api_key: "sk-abc".into(),
            timeout_secs: 30,
            ..Default::default()
        };
        let openai = settings.openai_config();
        assert_eq!(openai.api_key, "sk-abc");
        assert_eq!(openai.timeout_secs, 30);
        assert_eq!(openai.base_url, settings.base_url);
    }

    #[test]
    fn test_explicit_missing_file_is_not_found() {
        let err = PanelConfig::load(Some("/nonexistent/persona-panel.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let path_str = path.to_str().unwrap();

        let written = init_config(Some(path_str), false).unwrap();
        assert_eq!(written, path);
        assert!(path.exists());

        assert!(init_config(Some(path_str), false).is_err());
        assert!(init_config(Some(path_str), true).is_ok());
    }
}
