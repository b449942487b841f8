//! Configuration management for Press.
//!
//! Parses `press.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. Every section is
//! optional; missing keys take the defaults documented on each field.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `pdf.html_engine`, `pdf.font_dir`
//! - `docx.pandoc`
//! - `diagrams.mmdc`, `diagrams.mermaid_ink_url`, `diagrams.kroki_url`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override font directory for the direct PDF backend.
    pub font_dir: Option<PathBuf>,
    /// Override mermaid.ink base URL.
    pub mermaid_ink_url: Option<String>,
    /// Override Kroki base URL.
    pub kroki_url: Option<String>,
    /// Disable both remote diagram services.
    pub offline: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "press.toml";

/// Largest accepted diagram canvas edge in pixels.
const MAX_DIAGRAM_EDGE: u32 = 10_000;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// PDF backends configuration.
    pub pdf: PdfConfig,
    /// DOCX backends configuration.
    pub docx: DocxConfig,
    /// Diagram rendering configuration.
    pub diagrams: DiagramsConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

/// PDF backends configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// HTML-to-PDF engine command.
    pub html_engine: String,
    /// Whether the HTML engine path may be used.
    pub html_engine_enabled: bool,
    /// Whether the structural (direct) PDF path may be used.
    pub direct_enabled: bool,
    /// Directory holding the TrueType fonts for the direct path.
    pub font_dir: PathBuf,
    /// Proportional font family name (files `{family}-Regular.ttf` etc.).
    pub font_family: String,
    /// Monospace font family name for code blocks.
    pub code_font_family: String,
    /// Marker printed in every page footer.
    pub marker: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            html_engine: "weasyprint".to_owned(),
            html_engine_enabled: true,
            direct_enabled: true,
            font_dir: PathBuf::from("/usr/share/fonts/truetype/liberation"),
            font_family: "LiberationSans".to_owned(),
            code_font_family: "LiberationMono".to_owned(),
            marker: "Confidential".to_owned(),
        }
    }
}

/// DOCX backends configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocxConfig {
    /// Pandoc command.
    pub pandoc: String,
    /// Whether the pandoc path may be used.
    pub pandoc_enabled: bool,
    /// Whether the structural (direct) DOCX path may be used.
    pub direct_enabled: bool,
    /// Marker printed in every page header.
    pub marker: String,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            pandoc: "pandoc".to_owned(),
            pandoc_enabled: true,
            direct_enabled: true,
            marker: "Confidential".to_owned(),
        }
    }
}

/// Diagram rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Mermaid CLI command.
    pub mmdc: String,
    /// Whether the CLI renderer may be used.
    pub cli_enabled: bool,
    /// CLI deadline in seconds.
    pub cli_timeout_secs: u64,
    /// Canvas width in pixels passed to the CLI.
    pub width: u32,
    /// Canvas height in pixels passed to the CLI.
    pub height: u32,
    /// Canvas background passed to the CLI.
    pub background: String,
    /// mermaid.ink base URL.
    pub mermaid_ink_url: String,
    /// Whether mermaid.ink may be used.
    pub mermaid_ink_enabled: bool,
    /// Kroki base URL.
    pub kroki_url: String,
    /// Whether Kroki may be used.
    pub kroki_enabled: bool,
    /// HTTP deadline in seconds for both services.
    pub service_timeout_secs: u64,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            mmdc: "mmdc".to_owned(),
            cli_enabled: true,
            cli_timeout_secs: 30,
            width: 800,
            height: 600,
            background: "white".to_owned(),
            mermaid_ink_url: "https://mermaid.ink".to_owned(),
            mermaid_ink_enabled: true,
            kroki_url: "https://kroki.io".to_owned(),
            kroki_enabled: true,
            service_timeout_secs: 15,
        }
    }
}

impl DiagramsConfig {
    /// CLI deadline.
    #[must_use]
    pub fn cli_timeout(&self) -> Duration {
        Duration::from_secs(self.cli_timeout_secs)
    }

    /// HTTP deadline for the diagram services.
    #[must_use]
    pub fn service_timeout(&self) -> Duration {
        Duration::from_secs(self.service_timeout_secs)
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

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a numeric field to lie in `1..=max`.
fn require_range(value: u64, max: u64, field: &str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    if value > max {
        return Err(ConfigError::Validation(format!(
            "{field} cannot exceed {max}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `press.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        config.finish(cli_settings)
    }

    /// Apply `cli_settings` and validate the result.
    fn finish(mut self, cli_settings: Option<&CliSettings>) -> Result<Self, ConfigError> {
        if let Some(settings) = cli_settings {
            self.apply_cli_settings(settings);
        }
        self.validate()?;
        Ok(self)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(font_dir) = &settings.font_dir {
            self.pdf.font_dir.clone_from(font_dir);
        }
        if let Some(url) = &settings.mermaid_ink_url {
            self.diagrams.mermaid_ink_url.clone_from(url);
        }
        if let Some(url) = &settings.kroki_url {
            self.diagrams.kroki_url.clone_from(url);
        }
        if settings.offline == Some(true) {
            self.diagrams.mermaid_ink_enabled = false;
            self.diagrams.kroki_enabled = false;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_backends()?;
        self.validate_diagrams()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_backends(&self) -> Result<(), ConfigError> {
        if self.pdf.html_engine_enabled {
            require_non_empty(&self.pdf.html_engine, "pdf.html_engine")?;
        }
        if self.pdf.direct_enabled {
            require_non_empty(&self.pdf.font_family, "pdf.font_family")?;
            require_non_empty(&self.pdf.code_font_family, "pdf.code_font_family")?;
        }
        if self.docx.pandoc_enabled {
            require_non_empty(&self.docx.pandoc, "docx.pandoc")?;
        }
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        const MAX_TIMEOUT_SECS: u64 = 600;

        let diagrams = &self.diagrams;
        if diagrams.cli_enabled {
            require_non_empty(&diagrams.mmdc, "diagrams.mmdc")?;
            require_range(
                diagrams.cli_timeout_secs,
                MAX_TIMEOUT_SECS,
                "diagrams.cli_timeout_secs",
            )?;
            require_range(diagrams.width.into(), MAX_DIAGRAM_EDGE.into(), "diagrams.width")?;
            require_range(diagrams.height.into(), MAX_DIAGRAM_EDGE.into(), "diagrams.height")?;
        }
        if diagrams.mermaid_ink_enabled {
            require_non_empty(&diagrams.mermaid_ink_url, "diagrams.mermaid_ink_url")?;
            require_http_url(&diagrams.mermaid_ink_url, "diagrams.mermaid_ink_url")?;
        }
        if diagrams.kroki_enabled {
            require_non_empty(&diagrams.kroki_url, "diagrams.kroki_url")?;
            require_http_url(&diagrams.kroki_url, "diagrams.kroki_url")?;
        }
        if diagrams.mermaid_ink_enabled || diagrams.kroki_enabled {
            require_range(
                diagrams.service_timeout_secs,
                MAX_TIMEOUT_SECS,
                "diagrams.service_timeout_secs",
            )?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        self.pdf.html_engine = expand::expand_env(&self.pdf.html_engine, "pdf.html_engine")?;
        let mut font_dir = self.pdf.font_dir.to_str().map(str::to_owned);
        expand::expand_opt(&mut font_dir, "pdf.font_dir")?;
        if let Some(font_dir) = font_dir {
            self.pdf.font_dir = PathBuf::from(font_dir);
        }

        self.docx.pandoc = expand::expand_env(&self.docx.pandoc, "docx.pandoc")?;

        let diagrams = &mut self.diagrams;
        diagrams.mmdc = expand::expand_env(&diagrams.mmdc, "diagrams.mmdc")?;
        diagrams.mermaid_ink_url =
            expand::expand_env(&diagrams.mermaid_ink_url, "diagrams.mermaid_ink_url")?;
        diagrams.kroki_url = expand::expand_env(&diagrams.kroki_url, "diagrams.kroki_url")?;

        Ok(())
    }

    /// Resolve relative paths against the config file directory and strip
    /// trailing slashes from service URLs.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if self.pdf.font_dir.is_relative() {
            self.pdf.font_dir = config_dir.join(&self.pdf.font_dir);
        }
        let diagrams = &mut self.diagrams;
        for url in [&mut diagrams.mermaid_ink_url, &mut diagrams.kroki_url] {
            let trimmed_len = url.trim_end_matches('/').len();
            url.truncate(trimmed_len);
        }
    }
}
