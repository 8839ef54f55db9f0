//! Configuration management for wxmd.
//!
//! Parses `wxmd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `diagrams.kroki_url` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! ## Example
//!
//! ```toml
//! [theme]
//! name = "clean"
//! file = "themes/mine.toml"
//!
//! [diagrams]
//! kroki_url = "${KROKI_URL:-https://kroki.io}"
//! timeout_secs = 30
//! security_level = "loose"
//!
//! [adapter.emoji_list]
//! enabled = true
//! min_lines = 2
//! ranges = [[0x1F300, 0x1F9FF]]
//! ```

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wxmd.toml";

/// Default built-in theme name.
pub const DEFAULT_THEME_NAME: &str = "default";

/// Default diagram request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Security levels accepted by the diagram engine.
const SECURITY_LEVELS: &[&str] = &["strict", "loose", "antiscript", "sandbox"];

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override built-in theme name.
    pub theme: Option<String>,
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Force diagram rendering on or off.
    pub diagrams_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme selection (paths are relative strings from TOML).
    theme: ThemeConfigRaw,
    /// Diagram rendering configuration (optional section).
    diagrams: Option<DiagramsConfigRaw>,
    /// Platform adapter policy.
    pub adapter: AdapterConfig,

    /// Resolved theme configuration (set after loading).
    #[serde(skip)]
    pub theme_resolved: ThemeConfig,
    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw theme configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ThemeConfigRaw {
    name: Option<String>,
    file: Option<String>,
}

/// Resolved theme configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    /// Built-in theme name.
    pub name: String,
    /// Custom theme file; takes precedence over `name`.
    pub file: Option<PathBuf>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_THEME_NAME.to_owned(),
            file: None,
        }
    }
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    kroki_url: Option<String>,
    timeout_secs: Option<u64>,
    security_level: Option<String>,
}

/// Resolved diagram rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramsConfig {
    /// Kroki server URL. Diagram rendering is disabled when unset.
    pub kroki_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Engine security level name.
    pub security_level: String,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            kroki_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            security_level: "loose".to_owned(),
        }
    }
}

impl DiagramsConfig {
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.kroki_url.is_some()
    }
}

/// Platform adapter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Emoji-paragraph promotion policy.
    pub emoji_list: EmojiListConfig,
}

/// Emoji-paragraph promotion policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmojiListConfig {
    pub enabled: bool,
    /// Minimum number of emoji-led lines for promotion.
    pub min_lines: usize,
    /// Inclusive code point ranges counted as emoji.
    pub ranges: Vec<[u32; 2]>,
}

impl Default for EmojiListConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_lines: 2,
            ranges: vec![[0x1F300, 0x1F9FF]],
        }
    }
}

impl EmojiListConfig {
    /// Ranges as characters. Ranges with invalid code points are skipped.
    #[must_use]
    pub fn char_ranges(&self) -> Vec<RangeInclusive<char>> {
        self.ranges
            .iter()
            .filter_map(|&[start, end]| Some(char::from_u32(start)?..=char::from_u32(end)?))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_lines == 0 {
            return Err(ConfigError::Validation(
                "adapter.emoji_list.min_lines must be at least 1".to_owned(),
            ));
        }
        if self.enabled && self.ranges.is_empty() {
            return Err(ConfigError::Validation(
                "adapter.emoji_list.ranges cannot be empty when enabled".to_owned(),
            ));
        }
        for &[start, end] in &self.ranges {
            if char::from_u32(start).is_none() || char::from_u32(end).is_none() {
                return Err(ConfigError::Validation(format!(
                    "adapter.emoji_list.ranges: [{start:#X}, {end:#X}] is not a valid code point range"
                )));
            }
            if start > end {
                return Err(ConfigError::Validation(format!(
                    "adapter.emoji_list.ranges: start {start:#X} exceeds end {end:#X}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Expand `${VAR}` and `${VAR:-default}` references in a field value.
///
/// Values without `${` are returned as is, so a bare `$` in a URL path
/// survives.
fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    let lookup = |var: &str| std::env::var(var).map(Some).map_err(|_| var.to_owned());
    match shellexpand::env_with_context(value, lookup) {
        Ok(expanded) => Ok(expanded.into_owned()),
        Err(err) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.cause),
        }),
    }
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wxmd.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, taking precedence over config
    /// file values, and the result is validated again.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(theme) = &settings.theme {
            self.theme_resolved.name.clone_from(theme);
            self.theme_resolved.file = None;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams_resolved.kroki_url = Some(kroki_url.clone());
        }
        if settings.diagrams_enabled == Some(false) {
            self.diagrams_resolved.kroki_url = None;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_config_from(&cwd)
    }

    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.theme_resolved.name, "theme.name")?;
        self.validate_diagrams()?;
        self.adapter.emoji_list.validate()?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams_resolved;

        if let Some(ref kroki_url) = diagrams.kroki_url {
            require_non_empty(kroki_url, "diagrams.kroki_url")?;
            require_http_url(kroki_url, "diagrams.kroki_url")?;
        }

        if diagrams.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        if !SECURITY_LEVELS.contains(&diagrams.security_level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "diagrams.security_level must be one of: {}",
                SECURITY_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut diagrams) = self.diagrams
            && let Some(ref url) = diagrams.kroki_url
        {
            diagrams.kroki_url = Some(expand_env(url, "diagrams.kroki_url")?);
        }
        Ok(())
    }

    /// Resolve raw sections, making paths absolute against the config directory.
    fn resolve(&mut self, config_dir: &Path) {
        self.theme_resolved = ThemeConfig {
            name: self
                .theme
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_THEME_NAME.to_owned()),
            file: self.theme.file.as_deref().map(|file| config_dir.join(file)),
        };

        let defaults = DiagramsConfig::default();
        self.diagrams_resolved = match &self.diagrams {
            Some(diagrams) => DiagramsConfig {
                kroki_url: diagrams.kroki_url.clone(),
                timeout: diagrams
                    .timeout_secs
                    .map_or(defaults.timeout, Duration::from_secs),
                security_level: diagrams
                    .security_level
                    .clone()
                    .unwrap_or(defaults.security_level),
            },
            None => defaults,
        };
    }
}
